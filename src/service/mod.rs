//! Service layer: matchmaking orchestration and presence tracking.
//!
//! [`MatchService`] coordinates the full submission flow (embed, store,
//! scan, claim, room creation) and relays signaling and chat through
//! the [`crate::domain::EventBus`]. [`PresenceTracker`] holds the set
//! of live connections.

pub mod match_service;
pub mod presence;

pub use match_service::MatchService;
pub use presence::PresenceTracker;
