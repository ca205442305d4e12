//! Persistence layer: PostgreSQL interest archive.
//!
//! Optional write-behind mirror of the in-process store's mutations.
//! The store stays authoritative; archive failures are logged and
//! never fail the triggering operation.

pub mod models;
pub mod postgres;

pub use postgres::InterestArchive;
