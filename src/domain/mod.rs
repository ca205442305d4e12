//! Domain layer: core types, interest store, room registry, and events.
//!
//! This module contains the server-side domain model: connection and
//! interest identity, interest records with their match state, the
//! authoritative interest store, live room membership, and the event
//! bus that fans session events out to WebSocket connections.

pub mod connection_id;
pub mod event;
pub mod event_bus;
pub mod interest;
pub mod interest_id;
pub mod interest_store;
pub mod room_id;
pub mod room_registry;

pub use connection_id::ConnectionId;
pub use event::{SessionEvent, SignalKind};
pub use event_bus::EventBus;
pub use interest::{InterestRecord, WaitingInterest};
pub use interest_id::InterestId;
pub use interest_store::InterestStore;
pub use room_id::RoomId;
pub use room_registry::{Room, RoomRegistry};
