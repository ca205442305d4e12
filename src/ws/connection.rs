//! WebSocket connection loop.
//!
//! Runs the read/write loop for a single connection: dispatches
//! incoming frames to the [`MatchService`] and forwards bus events
//! addressed to this connection (or to all).

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::messages::{ClientMessage, ServerMessage};
use crate::domain::{ConnectionId, SessionEvent, SignalKind};
use crate::service::MatchService;

/// Runs the read/write loop for one WebSocket connection.
///
/// The caller subscribes the event receiver before this runs, so the
/// connection observes its own arrival broadcasts. On any exit path the
/// service's disconnect cleanup runs exactly once.
pub async fn run_connection(
    socket: WebSocket,
    connection_id: ConnectionId,
    mut event_rx: broadcast::Receiver<SessionEvent>,
    service: Arc<MatchService>,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    service.connect(connection_id).await;
    let hello = ServerMessage::Connected { connection_id };
    if send_frame(&mut ws_tx, &hello).await.is_err() {
        service.disconnect(connection_id).await;
        return;
    }

    loop {
        tokio::select! {
            frame = ws_rx.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        let reply = handle_frame(&service, connection_id, &text).await;
                        if let Some(reply) = reply
                            && send_frame(&mut ws_tx, &reply).await.is_err()
                        {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    _ => {}
                }
            }
            event = event_rx.recv() => {
                match event {
                    Ok(event) => {
                        if event.delivers_to(connection_id) {
                            let frame = ServerMessage::from_event(event);
                            if send_frame(&mut ws_tx, &frame).await.is_err() {
                                break;
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(%connection_id, lagged = n, "client lagged behind event bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    service.disconnect(connection_id).await;
}

/// Serializes and sends one server frame.
async fn send_frame(
    ws_tx: &mut SplitSink<WebSocket, Message>,
    message: &ServerMessage,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(message).unwrap_or_default();
    ws_tx.send(Message::text(json)).await
}

/// Parses and dispatches one client frame, returning the direct reply
/// to the sender, if any. Broadcast effects travel through the bus.
async fn handle_frame(
    service: &MatchService,
    connection_id: ConnectionId,
    text: &str,
) -> Option<ServerMessage> {
    let Ok(message) = serde_json::from_str::<ClientMessage>(text) else {
        return Some(ServerMessage::Error {
            message: "malformed message".to_string(),
        });
    };
    dispatch(service, connection_id, message).await
}

async fn dispatch(
    service: &MatchService,
    connection_id: ConnectionId,
    message: ClientMessage,
) -> Option<ServerMessage> {
    match message {
        ClientMessage::SubmitInterest { text } => {
            match service.submit_interest(connection_id, &text).await {
                Ok(record) => Some(ServerMessage::InterestAccepted { record }),
                Err(e) => Some(ServerMessage::InterestError {
                    message: e.to_string(),
                }),
            }
        }
        ClientMessage::Offer { payload, room_id } => {
            relay_reply(
                service
                    .relay_signal(connection_id, &room_id, SignalKind::Offer, payload)
                    .await,
            )
        }
        ClientMessage::Answer { payload, room_id } => {
            relay_reply(
                service
                    .relay_signal(connection_id, &room_id, SignalKind::Answer, payload)
                    .await,
            )
        }
        ClientMessage::IceCandidate { payload, room_id } => {
            relay_reply(
                service
                    .relay_signal(connection_id, &room_id, SignalKind::IceCandidate, payload)
                    .await,
            )
        }
        ClientMessage::ChatMessage {
            room_id,
            text,
            timestamp,
            sender,
        } => relay_reply(
            service
                .relay_chat(connection_id, &room_id, text, timestamp, sender)
                .await,
        ),
        ClientMessage::ConnectionRequest {
            target_connection_id,
            request_id,
            ..
        } => relay_reply(
            service
                .request_pairing(connection_id, target_connection_id, request_id)
                .await,
        ),
        ClientMessage::ConnectionResponse {
            target_connection_id,
            request_id,
            accepted,
        } => {
            if !accepted {
                service
                    .deny_pairing(connection_id, target_connection_id)
                    .await;
                return None;
            }
            let Some(request_id) = request_id else {
                return Some(ServerMessage::Error {
                    message: "accepted response requires requestId".to_string(),
                });
            };
            // The match notification reaches both peers through the bus.
            match service.manual_match(request_id, connection_id).await {
                Ok(_) => None,
                Err(e) => Some(ServerMessage::Error {
                    message: e.to_string(),
                }),
            }
        }
    }
}

/// A successful relay has no direct reply; failures come back to the
/// sender alone.
fn relay_reply(result: Result<(), crate::error::GatewayError>) -> Option<ServerMessage> {
    match result {
        Ok(()) => None,
        Err(e) => Some(ServerMessage::Error {
            message: e.to_string(),
        }),
    }
}
