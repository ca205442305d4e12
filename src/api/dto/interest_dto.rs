//! Interest-related DTOs for submit, list, and manual-match endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{RoomId, WaitingInterest};

/// Request body for `POST /api/interests`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitInterestRequest {
    /// The submitting live connection, as issued in the `connected`
    /// frame.
    pub connection_id: Uuid,
    /// Free-text interest.
    pub text: String,
}

/// Request body for `POST /api/interests/{id}/match`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManualMatchRequest {
    /// The calling connection; must hold a waiting interest of its own.
    pub connection_id: Uuid,
}

/// Response body for a successful manual match.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManualMatchResponse {
    /// Room assigned to the pair.
    pub room_id: RoomId,
    /// The matched peer's former waiting entry.
    pub peer: WaitingInterest,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn submit_request_accepts_camel_case() {
        let body = format!(
            r#"{{"connectionId": "{}", "text": "hiking"}}"#,
            Uuid::new_v4()
        );
        let request: Result<SubmitInterestRequest, _> = serde_json::from_str(&body);
        let Ok(request) = request else {
            panic!("expected valid request");
        };
        assert_eq!(request.text, "hiking");
    }

    #[test]
    fn submit_request_rejects_missing_text() {
        let body = format!(r#"{{"connectionId": "{}"}}"#, Uuid::new_v4());
        assert!(serde_json::from_str::<SubmitInterestRequest>(&body).is_err());
    }

    #[test]
    fn manual_match_request_rejects_missing_connection() {
        assert!(serde_json::from_str::<ManualMatchRequest>("{}").is_err());
    }
}
