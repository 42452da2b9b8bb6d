// SPDX-FileCopyrightText: 2026 Parceldesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use parceldesk_archive::ArchiveEngine;
use parceldesk_core::DeskError;
use parceldesk_ticket::TicketService;

use crate::auth::{auth_middleware, AuthConfig};
use crate::handlers;
use crate::ws;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub service: Arc<TicketService>,
    pub engine: Arc<ArchiveEngine>,
    pub auth: AuthConfig,
    /// Cap for `GET /v1/archive/log`.
    pub archive_log_limit: i64,
}

/// Gateway server configuration (mirrors GatewayConfig from parceldesk-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Bearer token for auth (None rejects every request, fail-closed).
    pub bearer_token: Option<String>,
}

/// Build the full gateway router.
///
/// - `/health` is public.
/// - `/v1/*` requires the bearer token and an `X-Actor-Id` header.
/// - `/ws` authenticates during the handshake via query parameters.
pub fn router(state: GatewayState) -> Router {
    let auth_state = state.auth.clone();

    let public_routes = Router::new().route("/health", get(handlers::get_public_health));

    let api_routes = Router::new()
        .route(
            "/v1/tickets",
            get(handlers::list_tickets).post(handlers::create_ticket),
        )
        .route(
            "/v1/tickets/{id}",
            get(handlers::get_ticket).patch(handlers::update_ticket),
        )
        .route("/v1/tickets/{id}/status", post(handlers::set_status))
        .route(
            "/v1/tickets/{id}/messages",
            get(handlers::list_messages).post(handlers::post_message),
        )
        .route("/v1/tickets/{id}/history", get(handlers::list_history))
        .route(
            "/v1/tickets/{id}/attachments",
            get(handlers::list_attachments).post(handlers::record_attachment),
        )
        .route("/v1/tickets/{id}/read", post(handlers::mark_ticket_read))
        .route("/v1/notifications", get(handlers::list_notifications))
        .route(
            "/v1/notifications/unread_count",
            get(handlers::unread_count),
        )
        .route("/v1/notifications/read_all", post(handlers::mark_all_read))
        .route("/v1/profiles", get(handlers::list_profiles))
        .route("/v1/archive/run", post(handlers::run_archive))
        .route("/v1/archive/tickets", get(handlers::list_archived))
        .route("/v1/archive/tickets/{id}", get(handlers::get_archived))
        .route("/v1/archive/log", get(handlers::archive_log))
        .route("/v1/archive/stats", get(handlers::archive_stats))
        .route("/v1/stats", get(handlers::status_tallies))
        .route_layer(axum_middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ));

    let ws_routes = Router::new().route("/ws", get(ws::ws_handler));

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .merge(ws_routes)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the gateway HTTP/WebSocket server.
pub async fn start_server(config: &ServerConfig, state: GatewayState) -> Result<(), DeskError> {
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| DeskError::Channel {
            message: format!("failed to bind gateway to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| DeskError::Channel {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    Ok(())
}
