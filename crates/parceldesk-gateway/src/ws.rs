// SPDX-FileCopyrightText: 2026 Parceldesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WebSocket endpoint streaming a ticket's message events.
//!
//! `GET /ws?ticket={id}&actor={profile}&token={bearer}` upgrades to a
//! WebSocket that receives one JSON `MessageEvent` per message published to
//! the ticket from the moment of subscription onward. Auth happens during
//! the handshake (query parameters, since browsers cannot set headers on a
//! WebSocket upgrade), not via the `/v1` middleware.
//!
//! There is no history replay: clients fetch the ordered log over REST and
//! deduplicate by message id after reconnecting.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::StatusCode,
    response::Response,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;

use parceldesk_core::DeskError;

use crate::server::GatewayState;

/// Query parameters of the upgrade request.
#[derive(Debug, Deserialize)]
pub struct WsQuery {
    /// Ticket to subscribe to.
    pub ticket: String,
    /// Acting profile id.
    pub actor: String,
    #[serde(default)]
    pub token: Option<String>,
}

/// WebSocket upgrade handler.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<GatewayState>,
    Query(query): Query<WsQuery>,
) -> Result<Response, StatusCode> {
    if !state.auth.token_matches(query.token.as_deref()) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    let principal = state
        .service
        .resolve_principal(&query.actor)
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;
    // Entitlement check before the upgrade, so denial is an HTTP status.
    match state.service.get_ticket(&principal, &query.ticket).await {
        Ok(_) => {}
        Err(DeskError::NotFound { .. }) => return Err(StatusCode::NOT_FOUND),
        Err(DeskError::Unauthorized) => return Err(StatusCode::FORBIDDEN),
        Err(_) => return Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
    let ticket_id = query.ticket;
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, ticket_id)))
}

/// Forward published events to the socket until either side disconnects.
///
/// The subscription is removed on every exit path: client close, client
/// disconnect, or send failure.
async fn handle_socket(socket: WebSocket, state: GatewayState, ticket_id: String) {
    let (mut ws_sender, mut ws_receiver) = socket.split();

    let subscription = state.service.channels().subscribe(&ticket_id);
    let subscription_id = subscription.id.clone();
    let mut rx = subscription.rx;

    let sender_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let payload = match serde_json::to_string(&event) {
                Ok(payload) => payload,
                Err(e) => {
                    tracing::warn!(error = %e, "failed to encode message event");
                    continue;
                }
            };
            if ws_sender.send(Message::Text(payload.into())).await.is_err() {
                break;
            }
        }
    });

    // Drain client frames; this endpoint is server-push only.
    while let Some(Ok(msg)) = ws_receiver.next().await {
        if let Message::Close(_) = msg {
            break;
        }
    }

    state
        .service
        .channels()
        .unsubscribe(&ticket_id, &subscription_id);
    sender_task.abort();
    tracing::debug!(ticket_id, subscription = %subscription_id, "websocket closed");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ws_query_requires_ticket_and_actor() {
        let q: WsQuery =
            serde_json::from_str(r#"{"ticket": "t1", "actor": "driver-1"}"#).unwrap();
        assert_eq!(q.ticket, "t1");
        assert_eq!(q.actor, "driver-1");
        assert!(q.token.is_none());

        assert!(serde_json::from_str::<WsQuery>(r#"{"ticket": "t1"}"#).is_err());
    }
}
