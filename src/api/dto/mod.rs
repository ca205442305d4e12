//! Data Transfer Objects for REST request/response serialization.
//!
//! All wire fields are camelCase, matching the WebSocket protocol.

pub mod interest_dto;

pub use interest_dto::*;
