//! Axum WebSocket upgrade handler.

use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::response::IntoResponse;

use super::connection::run_connection;
use crate::app_state::AppState;
use crate::domain::ConnectionId;

/// `GET /ws` — Upgrade to the real-time session protocol.
///
/// Assigns a fresh [`ConnectionId`] and subscribes to the event bus
/// before the connection loop starts, so the client observes its own
/// arrival broadcasts.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    let connection_id = ConnectionId::new();
    let event_rx = state.event_bus.subscribe();
    let service = std::sync::Arc::clone(&state.match_service);

    ws.on_upgrade(move |socket| run_connection(socket, connection_id, event_rx, service))
}
