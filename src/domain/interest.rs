//! Interest records: one per active submission.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{ConnectionId, InterestId, RoomId};

/// A submitted interest with its embedding and match state.
///
/// Created unmatched by [`super::InterestStore::create`]; the matching
/// transaction flips `matched` and sets `room_id`, after which the
/// record is terminal. Unmatched records are deleted on disconnect;
/// matched records are retained as history.
///
/// Serializes as the wire shape of `interestAccepted` and the REST
/// create response; the embedding is never sent to clients.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InterestRecord {
    /// Store-assigned identifier (immutable after creation).
    pub id: InterestId,

    /// The live connection that submitted this interest.
    pub connection_id: ConnectionId,

    /// Raw submitted interest text.
    pub text: String,

    /// Semantic embedding of `text`. Same dimension across all records.
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub embedding: Vec<f32>,

    /// Whether this record has been claimed by a match.
    pub matched: bool,

    /// Room assigned by the match; set if and only if `matched` is true.
    pub room_id: Option<RoomId>,

    /// Creation timestamp, used for ordering and "waiting since" display.
    pub created_at: DateTime<Utc>,
}

/// Public projection of a waiting (unmatched) interest.
///
/// The shape broadcast in `activeListUpdated` and returned by
/// `GET /api/interests/active`. Carries no embedding.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WaitingInterest {
    /// Interest record identifier.
    pub id: InterestId,
    /// The connection waiting on this interest.
    pub connection_id: ConnectionId,
    /// Raw submitted interest text.
    pub text: String,
    /// Submission timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<&InterestRecord> for WaitingInterest {
    fn from(record: &InterestRecord) -> Self {
        Self {
            id: record.id,
            connection_id: record.connection_id,
            text: record.text.clone(),
            created_at: record.created_at,
        }
    }
}
