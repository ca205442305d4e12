//! Session events fanned out to WebSocket connections.
//!
//! Every state change publishes a [`SessionEvent`] through the
//! [`super::EventBus`]. Unlike a plain broadcast, most session events
//! are directed: each event names its recipient connection, and the
//! connection loops drop events addressed elsewhere. Presence events
//! carry no recipient and reach every client.

use serde_json::Value;

use super::interest::WaitingInterest;
use super::{ConnectionId, InterestId, RoomId};

/// Kind of WebRTC signaling payload being relayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    /// Session description offer from the initiator.
    Offer,
    /// Session description answer from the callee.
    Answer,
    /// Trickled ICE candidate.
    IceCandidate,
}

/// Event published after a state change or on behalf of a relay.
///
/// Signaling and chat payloads are carried verbatim; the gateway never
/// inspects them.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The number of connected clients changed.
    UserCountChanged {
        /// Current connected-client count.
        count: usize,
    },

    /// The waiting list changed; carries the full snapshot, oldest first.
    WaitingListChanged {
        /// Current unmatched interests.
        interests: Vec<WaitingInterest>,
    },

    /// A match succeeded; sent once per member of the new room.
    MatchFound {
        /// Recipient connection.
        to: ConnectionId,
        /// Room assigned to the pair.
        room_id: RoomId,
        /// Whether the recipient sends the first offer.
        is_initiator: bool,
    },

    /// A signaling payload relayed to the other room member.
    SignalRelayed {
        /// Recipient connection.
        to: ConnectionId,
        /// Room the payload belongs to.
        room_id: RoomId,
        /// Offer, answer, or ICE candidate.
        kind: SignalKind,
        /// Opaque signaling payload, forwarded verbatim.
        payload: Value,
    },

    /// A chat message relayed to the other room member.
    ChatRelayed {
        /// Recipient connection.
        to: ConnectionId,
        /// Room the message belongs to.
        room_id: RoomId,
        /// Message text, forwarded verbatim.
        text: String,
        /// Sender-supplied timestamp, forwarded verbatim.
        timestamp: String,
        /// Sender-supplied identity, forwarded verbatim.
        sender: String,
    },

    /// A manual pairing request forwarded to its target.
    PairRequested {
        /// Recipient connection (the request target).
        to: ConnectionId,
        /// Connection asking to pair.
        from: ConnectionId,
        /// The requester's waiting interest record.
        request_id: InterestId,
        /// Interest text shown to the target.
        interest: String,
    },

    /// A manual pairing request was denied by its target.
    PairDenied {
        /// Recipient connection (the original requester).
        to: ConnectionId,
        /// Connection that denied the request.
        from: ConnectionId,
    },
}

impl SessionEvent {
    /// Returns the recipient connection, or `None` for broadcast events.
    #[must_use]
    pub fn recipient(&self) -> Option<ConnectionId> {
        match self {
            Self::UserCountChanged { .. } | Self::WaitingListChanged { .. } => None,
            Self::MatchFound { to, .. }
            | Self::SignalRelayed { to, .. }
            | Self::ChatRelayed { to, .. }
            | Self::PairRequested { to, .. }
            | Self::PairDenied { to, .. } => Some(*to),
        }
    }

    /// Returns `true` if the event should be delivered to `connection_id`.
    #[must_use]
    pub fn delivers_to(&self, connection_id: ConnectionId) -> bool {
        self.recipient().is_none_or(|to| to == connection_id)
    }
}
