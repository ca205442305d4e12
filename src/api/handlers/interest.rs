//! Interest handlers: submit, list waiting, manual match.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{ManualMatchRequest, ManualMatchResponse, SubmitInterestRequest};
use crate::app_state::AppState;
use crate::domain::{ConnectionId, InterestId, InterestRecord, WaitingInterest};
use crate::error::{ErrorResponse, GatewayError};

/// `POST /interests` — Submit an interest for matchmaking.
///
/// Runs the full flow: embedding, storage, candidate scan, and — when a
/// candidate clears the threshold — the atomic claim. The returned
/// record reflects any match made during the call; the matched pair is
/// additionally notified over their WebSocket connections.
///
/// # Errors
///
/// Returns [`GatewayError::Validation`] for a missing field, empty
/// text, or an unknown connection; embedding failures map to 502/504.
#[utoipa::path(
    post,
    path = "/api/interests",
    tag = "Interests",
    summary = "Submit an interest",
    description = "Computes a semantic embedding for the text, stores a waiting record for the connection, and pairs it with the closest waiting peer when one clears the similarity threshold.",
    request_body = SubmitInterestRequest,
    responses(
        (status = 201, description = "Interest stored (and possibly matched)", body = InterestRecord),
        (status = 400, description = "Missing field, empty text, or unknown connection", body = ErrorResponse),
        (status = 502, description = "Embedding service failure", body = ErrorResponse),
        (status = 504, description = "Embedding service timeout", body = ErrorResponse),
    )
)]
pub async fn submit_interest(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<impl IntoResponse, GatewayError> {
    let req: SubmitInterestRequest = parse_body(body)?;
    let record = state
        .match_service
        .submit_interest(ConnectionId::from_uuid(req.connection_id), &req.text)
        .await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// `GET /interests/active` — List waiting interests, oldest first.
#[utoipa::path(
    get,
    path = "/api/interests/active",
    tag = "Interests",
    summary = "List waiting interests",
    description = "Returns every unmatched interest in submission order, the same snapshot broadcast as activeListUpdated.",
    responses(
        (status = 200, description = "Waiting interests, oldest first", body = Vec<WaitingInterest>),
    )
)]
pub async fn list_active(State(state): State<AppState>) -> impl IntoResponse {
    let waiting = state.match_service.store().waiting_list().await;
    Json(waiting)
}

/// `POST /interests/{id}/match` — Pair the caller with a waiting interest.
///
/// Drives the same atomic claim as automatic matching; the caller
/// becomes the signaling initiator. Both peers are notified over their
/// WebSocket connections.
///
/// # Errors
///
/// - [`GatewayError::InterestNotFound`] / [`GatewayError::AlreadyMatched`]
///   (both 404) when the target is unknown or was claimed first; no
///   room is created.
/// - [`GatewayError::Validation`] when the field is missing or the
///   caller has no waiting interest of its own.
#[utoipa::path(
    post,
    path = "/api/interests/{id}/match",
    tag = "Interests",
    summary = "Manually match a waiting interest",
    description = "Atomically pairs the caller's waiting interest with the target record. Fails without side effects when either side was already claimed.",
    params(
        ("id" = uuid::Uuid, Path, description = "Target interest record UUID"),
    ),
    request_body = ManualMatchRequest,
    responses(
        (status = 200, description = "Pair matched", body = ManualMatchResponse),
        (status = 400, description = "Missing field or caller has no waiting interest", body = ErrorResponse),
        (status = 404, description = "Unknown id or already matched", body = ErrorResponse),
    )
)]
pub async fn manual_match(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(body): Json<serde_json::Value>,
) -> Result<impl IntoResponse, GatewayError> {
    let req: ManualMatchRequest = parse_body(body)?;
    let (room_id, peer) = state
        .match_service
        .manual_match(
            InterestId::from_uuid(id),
            ConnectionId::from_uuid(req.connection_id),
        )
        .await?;
    Ok(Json(ManualMatchResponse { room_id, peer }))
}

/// Decodes a request body, mapping missing or mistyped fields to a 400
/// instead of the extractor's 422.
fn parse_body<T: serde::de::DeserializeOwned>(body: serde_json::Value) -> Result<T, GatewayError> {
    serde_json::from_value(body).map_err(|e| GatewayError::Validation(e.to_string()))
}

/// Interest routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/interests", post(submit_interest))
        .route("/interests/active", get(list_active))
        .route("/interests/{id}/match", post(manual_match))
}
