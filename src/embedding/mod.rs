//! Embedding service client.
//!
//! Interest text is turned into a fixed-dimension vector by an external
//! HTTP service. The gateway never computes embeddings itself.

pub mod client;

pub use client::EmbeddingClient;
