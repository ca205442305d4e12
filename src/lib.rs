//! # affinity-gateway
//!
//! REST API and WebSocket gateway that anonymously pairs concurrent users
//! for live video/chat sessions based on a free-text interest. Interest
//! text is turned into a semantic embedding by an external service, the
//! best-matching waiting user is found by cosine similarity, and the
//! matched pair is joined into a two-party room through which WebRTC
//! signaling and chat payloads are relayed verbatim.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── MatchService + SignalingRelay + PresenceTracker (service/)
//!     ├── EventBus (domain/)
//!     │
//!     ├── InterestStore + RoomRegistry (domain/)
//!     ├── Matcher (matching/)
//!     ├── EmbeddingClient (embedding/)
//!     │
//!     └── PostgreSQL Interest Archive (persistence/, optional)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod embedding;
pub mod error;
pub mod matching;
pub mod persistence;
pub mod service;
pub mod ws;
