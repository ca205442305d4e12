//! Database models for the interest archive.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A row from the `interests` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchivedInterest {
    /// Interest record identifier.
    pub id: Uuid,
    /// Connection that submitted the interest.
    pub connection_id: Uuid,
    /// Raw submitted text.
    pub text: String,
    /// Embedding vector stored as JSONB.
    pub embedding: serde_json::Value,
    /// Whether the record was claimed by a match.
    pub matched: bool,
    /// Room assigned by the match, if any.
    pub room_id: Option<String>,
    /// Submission timestamp.
    pub created_at: DateTime<Utc>,
}
