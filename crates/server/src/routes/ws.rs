//! WebSocket notification channel for admin clients.
//!
//! Admission happens before the upgrade completes: the connection must
//! present a token (via the `token` query parameter, since browser WebSocket
//! clients cannot set headers) that verifies to an admin principal, or the
//! request is rejected with 401 and no events are ever delivered.
//!
//! Delivery is at-most-once, best-effort. A subscriber that lags behind the
//! broadcast buffer skips ahead and permanently misses the dropped events;
//! reconnecting clients are expected to refetch `/api/order/all`.

use axum::{
    extract::{
        Query, State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::broadcast;

use crate::error::AppError;
use crate::events::OrderEvent;
use crate::state::AppState;

/// `GET /ws` query parameters.
#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub token: Option<String>,
}

/// `GET /ws?token=...`
///
/// # Errors
///
/// Returns 401 before upgrading if the token is missing, invalid, or not an
/// admin token.
pub async fn subscribe(
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> Result<Response, AppError> {
    let token = query
        .token
        .ok_or_else(|| AppError::Unauthorized("authentication error".to_owned()))?;

    let claims = state.signer().verify(&token)?;
    if !claims.role.is_admin() {
        return Err(AppError::Unauthorized("not authorized as admin".to_owned()));
    }

    let rx = state.events().subscribe();
    tracing::info!(admin = %claims.sub, "admin socket connected");

    Ok(ws.on_upgrade(move |socket| stream_events(socket, rx)))
}

/// Forward broadcast events to one admin socket until either side closes.
async fn stream_events(socket: WebSocket, mut rx: broadcast::Receiver<OrderEvent>) {
    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Ok(event) => {
                    let text = match serde_json::to_string(&event) {
                        Ok(text) => text,
                        Err(e) => {
                            tracing::error!(error = %e, "failed to serialize order event");
                            continue;
                        }
                    };
                    if sender.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    // At-most-once: the missed events are gone for this
                    // client; it must refetch to resynchronize.
                    tracing::warn!(missed, "admin socket lagged, events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            message = receiver.next() => match message {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(Message::Ping(payload))) => {
                    if sender.send(Message::Pong(payload)).await.is_err() {
                        break;
                    }
                }
                // The channel is push-only; client text is ignored.
                Some(Ok(_)) => {}
            },
        }
    }

    tracing::info!("admin socket disconnected");
}
