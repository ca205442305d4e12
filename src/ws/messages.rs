//! WebSocket wire messages.
//!
//! Every frame is a JSON object with an `"event"` discriminator and
//! camelCase payload fields. Signaling payloads are opaque
//! [`serde_json::Value`]s carried verbatim.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{
    ConnectionId, InterestId, InterestRecord, RoomId, SessionEvent, SignalKind, WaitingInterest,
};

/// Frames a client may send.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    /// Submit an interest for matchmaking.
    SubmitInterest {
        /// Free-text interest.
        text: String,
    },
    /// Relay a WebRTC offer to the other room member.
    Offer {
        /// Opaque session description.
        payload: Value,
        /// Target room.
        room_id: RoomId,
    },
    /// Relay a WebRTC answer to the other room member.
    Answer {
        /// Opaque session description.
        payload: Value,
        /// Target room.
        room_id: RoomId,
    },
    /// Relay an ICE candidate to the other room member.
    IceCandidate {
        /// Opaque candidate payload.
        payload: Value,
        /// Target room.
        room_id: RoomId,
    },
    /// Relay a chat message to the other room member.
    ChatMessage {
        /// Target room.
        room_id: RoomId,
        /// Message text, forwarded verbatim.
        text: String,
        /// Sender-supplied timestamp, forwarded verbatim.
        timestamp: String,
        /// Sender-supplied identity, forwarded verbatim.
        sender: String,
    },
    /// Ask another waiting connection for a manual pairing.
    ConnectionRequest {
        /// The connection being asked.
        target_connection_id: ConnectionId,
        /// The requester's waiting interest record.
        request_id: InterestId,
        /// Interest text as displayed by the requester's client. The
        /// server forwards its own authoritative copy.
        #[serde(default)]
        interest: String,
    },
    /// Accept or deny a manual pairing request.
    ConnectionResponse {
        /// The original requester.
        target_connection_id: ConnectionId,
        /// The requester's interest record; required when accepting.
        #[serde(default)]
        request_id: Option<InterestId>,
        /// `true` drives the match, `false` forwards a denial.
        accepted: bool,
    },
}

/// Frames the server sends.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// First frame after upgrade; carries the assigned connection id.
    Connected {
        /// Identifier assigned to this connection.
        connection_id: ConnectionId,
    },
    /// A submission was stored (and possibly already matched).
    InterestAccepted {
        /// The stored record, embedding omitted.
        record: InterestRecord,
    },
    /// A submission failed; no record was created.
    InterestError {
        /// Failure description.
        message: String,
    },
    /// The waiting list changed.
    ActiveListUpdated {
        /// Current unmatched interests, oldest first.
        interests: Vec<WaitingInterest>,
    },
    /// This connection was paired.
    MatchFound {
        /// Room shared with the peer.
        room_id: RoomId,
        /// Whether this connection sends the first offer.
        is_initiator: bool,
    },
    /// Relayed WebRTC offer from the peer.
    Offer {
        /// Opaque session description.
        payload: Value,
        /// Originating room.
        room_id: RoomId,
    },
    /// Relayed WebRTC answer from the peer.
    Answer {
        /// Opaque session description.
        payload: Value,
        /// Originating room.
        room_id: RoomId,
    },
    /// Relayed ICE candidate from the peer.
    IceCandidate {
        /// Opaque candidate payload.
        payload: Value,
        /// Originating room.
        room_id: RoomId,
    },
    /// Relayed chat message from the peer.
    ChatMessage {
        /// Originating room.
        room_id: RoomId,
        /// Message text.
        text: String,
        /// Sender-supplied timestamp.
        timestamp: String,
        /// Sender-supplied identity.
        sender: String,
    },
    /// Another connection asks for a manual pairing.
    IncomingRequest {
        /// The requesting connection.
        from_connection_id: ConnectionId,
        /// The requester's waiting interest record.
        request_id: InterestId,
        /// The requester's interest text.
        interest: String,
    },
    /// A manual pairing request was denied.
    RequestDenied {
        /// The denying connection.
        from_connection_id: ConnectionId,
    },
    /// The connected-client count changed.
    UpdateUserCount {
        /// Current connected-client count.
        count: usize,
    },
    /// A request failed; sent to the offending connection only.
    Error {
        /// Failure description.
        message: String,
    },
}

impl ServerMessage {
    /// Converts a bus event into its wire frame.
    #[must_use]
    pub fn from_event(event: SessionEvent) -> Self {
        match event {
            SessionEvent::UserCountChanged { count } => Self::UpdateUserCount { count },
            SessionEvent::WaitingListChanged { interests } => Self::ActiveListUpdated { interests },
            SessionEvent::MatchFound {
                room_id,
                is_initiator,
                ..
            } => Self::MatchFound {
                room_id,
                is_initiator,
            },
            SessionEvent::SignalRelayed {
                room_id,
                kind,
                payload,
                ..
            } => match kind {
                SignalKind::Offer => Self::Offer { payload, room_id },
                SignalKind::Answer => Self::Answer { payload, room_id },
                SignalKind::IceCandidate => Self::IceCandidate { payload, room_id },
            },
            SessionEvent::ChatRelayed {
                room_id,
                text,
                timestamp,
                sender,
                ..
            } => Self::ChatMessage {
                room_id,
                text,
                timestamp,
                sender,
            },
            SessionEvent::PairRequested {
                from,
                request_id,
                interest,
                ..
            } => Self::IncomingRequest {
                from_connection_id: from,
                request_id,
                interest,
            },
            SessionEvent::PairDenied { from, .. } => Self::RequestDenied {
                from_connection_id: from,
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn submit_interest_frame_deserializes() {
        let frame = r#"{"event": "submitInterest", "text": "hiking"}"#;
        let message: Result<ClientMessage, _> = serde_json::from_str(frame);
        let Ok(ClientMessage::SubmitInterest { text }) = message else {
            panic!("expected submitInterest");
        };
        assert_eq!(text, "hiking");
    }

    #[test]
    fn offer_frame_deserializes_with_camel_case_room_id() {
        let frame = r#"{"event": "offer", "payload": {"sdp": "v=0"}, "roomId": "1700-abc"}"#;
        let message: Result<ClientMessage, _> = serde_json::from_str(frame);
        let Ok(ClientMessage::Offer { room_id, payload }) = message else {
            panic!("expected offer");
        };
        assert_eq!(room_id.as_str(), "1700-abc");
        assert_eq!(payload.get("sdp").and_then(Value::as_str), Some("v=0"));
    }

    #[test]
    fn connection_response_defaults_optional_request_id() {
        let frame = format!(
            r#"{{"event": "connectionResponse", "targetConnectionId": "{}", "accepted": false}}"#,
            uuid::Uuid::new_v4()
        );
        let message: Result<ClientMessage, _> = serde_json::from_str(&frame);
        let Ok(ClientMessage::ConnectionResponse {
            request_id,
            accepted,
            ..
        }) = message
        else {
            panic!("expected connectionResponse");
        };
        assert!(request_id.is_none());
        assert!(!accepted);
    }

    #[test]
    fn unknown_event_is_rejected() {
        let frame = r#"{"event": "selfDestruct"}"#;
        assert!(serde_json::from_str::<ClientMessage>(frame).is_err());
    }

    #[test]
    fn match_found_frame_serializes_camel_case() {
        let message = ServerMessage::MatchFound {
            room_id: RoomId::from("1700-abc"),
            is_initiator: true,
        };
        let json = serde_json::to_string(&message).unwrap_or_default();
        assert!(json.contains(r#""event":"matchFound""#));
        assert!(json.contains(r#""roomId":"1700-abc""#));
        assert!(json.contains(r#""isInitiator":true"#));
    }

    #[test]
    fn user_count_event_maps_to_update_user_count() {
        let message = ServerMessage::from_event(SessionEvent::UserCountChanged { count: 4 });
        let json = serde_json::to_string(&message).unwrap_or_default();
        assert!(json.contains(r#""event":"updateUserCount""#));
        assert!(json.contains(r#""count":4"#));
    }

    #[test]
    fn relayed_signal_maps_to_its_kind() {
        let event = SessionEvent::SignalRelayed {
            to: ConnectionId::new(),
            room_id: RoomId::from("1700-abc"),
            kind: SignalKind::IceCandidate,
            payload: serde_json::json!({"candidate": "udp 1 2"}),
        };
        let json = serde_json::to_string(&ServerMessage::from_event(event)).unwrap_or_default();
        assert!(json.contains(r#""event":"iceCandidate""#));
        assert!(json.contains("udp 1 2"));
    }

    #[test]
    fn pair_request_maps_to_incoming_request() {
        let from = ConnectionId::new();
        let event = SessionEvent::PairRequested {
            to: ConnectionId::new(),
            from,
            request_id: InterestId::new(),
            interest: "chess".to_string(),
        };
        let json = serde_json::to_string(&ServerMessage::from_event(event)).unwrap_or_default();
        assert!(json.contains(r#""event":"incomingRequest""#));
        assert!(json.contains(r#""fromConnectionId""#));
        assert!(json.contains("chess"));
    }
}
