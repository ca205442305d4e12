//! WebSocket layer: connection loop, wire messages, upgrade handler.
//!
//! The endpoint at `/ws` carries the whole real-time protocol: interest
//! submission, the waiting-list and user-count broadcasts, match
//! notifications, and the signaling/chat relay. One JSON object per
//! text frame, discriminated by an `"event"` tag.

pub mod connection;
pub mod handler;
pub mod messages;
