// SPDX-FileCopyrightText: 2026 Parceldesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.
//!
//! Every `/v1` handler resolves the acting principal from the `X-Actor-Id`
//! header and delegates to the ticket service; errors map onto HTTP status
//! codes in [`ApiError`].

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use parceldesk_core::types::{NewAttachment, NewTicket, TicketFilter, TicketPatch, TicketStatus};
use parceldesk_core::{DeskError, Principal};

use crate::server::GatewayState;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// A [`DeskError`] carried to its HTTP representation.
pub struct ApiError(pub DeskError);

impl From<DeskError> for ApiError {
    fn from(e: DeskError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            DeskError::Validation(_) => StatusCode::BAD_REQUEST,
            DeskError::NotFound { .. } => StatusCode::NOT_FOUND,
            DeskError::Unauthorized => StatusCode::FORBIDDEN,
            DeskError::Conflict { .. } => StatusCode::CONFLICT,
            DeskError::Channel { .. } => StatusCode::BAD_GATEWAY,
            DeskError::Storage { .. } | DeskError::Config(_) | DeskError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

/// Resolve the acting principal from the `X-Actor-Id` header.
pub(crate) async fn actor(
    state: &GatewayState,
    headers: &HeaderMap,
) -> Result<Principal, ApiError> {
    let actor_id = headers
        .get("x-actor-id")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError(DeskError::Validation("missing X-Actor-Id header".into())))?;
    Ok(state.service.resolve_principal(actor_id).await?)
}

// --- Public ---

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// GET /health (unauthenticated, for liveness probes)
pub async fn get_public_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

// --- Tickets ---

#[derive(Debug, Deserialize)]
pub struct ListTicketsQuery {
    #[serde(default)]
    pub status: Option<TicketStatus>,
    #[serde(default)]
    pub circuit: Option<u16>,
    /// Free-text match over package number, case reference, and address.
    #[serde(default)]
    pub q: Option<String>,
}

/// GET /v1/tickets
pub async fn list_tickets(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    Query(query): Query<ListTicketsQuery>,
) -> Result<Response, ApiError> {
    let principal = actor(&state, &headers).await?;
    let filter = TicketFilter {
        status: query.status,
        circuit: query.circuit,
        query: query.q,
    };
    let tickets = state.service.list_tickets(&principal, filter).await?;
    Ok(Json(tickets).into_response())
}

/// POST /v1/tickets
pub async fn create_ticket(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    Json(body): Json<NewTicket>,
) -> Result<Response, ApiError> {
    let principal = actor(&state, &headers).await?;
    let ticket = state.service.create_ticket(&principal, body).await?;
    Ok((StatusCode::CREATED, Json(ticket)).into_response())
}

/// GET /v1/tickets/{id}
pub async fn get_ticket(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let principal = actor(&state, &headers).await?;
    let ticket = state.service.get_ticket(&principal, &id).await?;
    Ok(Json(ticket).into_response())
}

#[derive(Debug, Deserialize)]
pub struct UpdateTicketRequest {
    /// The version the caller read; the update fails with 409 if stale.
    pub expected_version: i64,
    #[serde(flatten)]
    pub patch: TicketPatch,
}

/// PATCH /v1/tickets/{id}
pub async fn update_ticket(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<UpdateTicketRequest>,
) -> Result<Response, ApiError> {
    let principal = actor(&state, &headers).await?;
    let ticket = state
        .service
        .update_fields(&principal, &id, body.patch, body.expected_version)
        .await?;
    Ok(Json(ticket).into_response())
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: TicketStatus,
    pub expected_version: i64,
}

/// POST /v1/tickets/{id}/status
pub async fn set_status(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<StatusRequest>,
) -> Result<Response, ApiError> {
    let principal = actor(&state, &headers).await?;
    let ticket = state
        .service
        .set_status(&principal, &id, body.status, body.expected_version)
        .await?;
    Ok(Json(ticket).into_response())
}

// --- Messages ---

#[derive(Debug, Deserialize)]
pub struct PostMessageRequest {
    pub body: String,
}

/// POST /v1/tickets/{id}/messages
pub async fn post_message(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<PostMessageRequest>,
) -> Result<Response, ApiError> {
    let principal = actor(&state, &headers).await?;
    let message = state
        .service
        .post_message(&principal, &id, &body.body)
        .await?;
    Ok((StatusCode::CREATED, Json(message)).into_response())
}

/// GET /v1/tickets/{id}/messages
pub async fn list_messages(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let principal = actor(&state, &headers).await?;
    let messages = state.service.messages(&principal, &id).await?;
    Ok(Json(messages).into_response())
}

// --- History ---

/// GET /v1/tickets/{id}/history
pub async fn list_history(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let principal = actor(&state, &headers).await?;
    let history = state.service.history(&principal, &id).await?;
    Ok(Json(history).into_response())
}

// --- Attachments ---

/// POST /v1/tickets/{id}/attachments
pub async fn record_attachment(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<NewAttachment>,
) -> Result<Response, ApiError> {
    let principal = actor(&state, &headers).await?;
    let attachment = state
        .service
        .record_attachment(&principal, &id, body)
        .await?;
    Ok((StatusCode::CREATED, Json(attachment)).into_response())
}

/// GET /v1/tickets/{id}/attachments
pub async fn list_attachments(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let principal = actor(&state, &headers).await?;
    let attachments = state.service.attachments(&principal, &id).await?;
    Ok(Json(attachments).into_response())
}

// --- Notifications ---

#[derive(Debug, Deserialize)]
pub struct NotificationsQuery {
    #[serde(default)]
    pub unread: bool,
}

#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct MarkReadResponse {
    /// Notifications flipped to read.
    pub updated: u64,
}

/// GET /v1/notifications
pub async fn list_notifications(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    Query(query): Query<NotificationsQuery>,
) -> Result<Response, ApiError> {
    let principal = actor(&state, &headers).await?;
    let notifications = state
        .service
        .notifications(&principal, query.unread)
        .await?;
    Ok(Json(notifications).into_response())
}

/// GET /v1/notifications/unread_count
pub async fn unread_count(
    State(state): State<GatewayState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let principal = actor(&state, &headers).await?;
    let count = state.service.unread_count(&principal).await?;
    Ok(Json(UnreadCountResponse { count }).into_response())
}

/// POST /v1/notifications/read_all
pub async fn mark_all_read(
    State(state): State<GatewayState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let principal = actor(&state, &headers).await?;
    let updated = state.service.mark_all_read(&principal).await?;
    Ok(Json(MarkReadResponse { updated }).into_response())
}

/// POST /v1/tickets/{id}/read
pub async fn mark_ticket_read(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let principal = actor(&state, &headers).await?;
    let updated = state.service.mark_ticket_read(&principal, &id).await?;
    Ok(Json(MarkReadResponse { updated }).into_response())
}

// --- Profiles ---

/// GET /v1/profiles (administrative)
pub async fn list_profiles(
    State(state): State<GatewayState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let principal = actor(&state, &headers).await?;
    let profiles = state.service.list_profiles(&principal).await?;
    Ok(Json(profiles).into_response())
}

// --- Archive ---

/// POST /v1/archive/run (administrative)
pub async fn run_archive(
    State(state): State<GatewayState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let principal = actor(&state, &headers).await?;
    if !principal.is_admin() {
        return Err(ApiError(DeskError::Unauthorized));
    }
    let summary = state.engine.run().await?;
    Ok(Json(summary).into_response())
}

/// GET /v1/archive/tickets (administrative)
pub async fn list_archived(
    State(state): State<GatewayState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let principal = actor(&state, &headers).await?;
    let archived = state.service.list_archived(&principal).await?;
    Ok(Json(archived).into_response())
}

/// GET /v1/archive/tickets/{id} (administrative)
pub async fn get_archived(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let principal = actor(&state, &headers).await?;
    let archived = state.service.get_archived(&principal, &id).await?;
    Ok(Json(archived).into_response())
}

/// GET /v1/archive/log (administrative)
pub async fn archive_log(
    State(state): State<GatewayState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let principal = actor(&state, &headers).await?;
    let log = state
        .service
        .archive_log(&principal, state.archive_log_limit)
        .await?;
    Ok(Json(log).into_response())
}

/// GET /v1/archive/stats (administrative)
pub async fn archive_stats(
    State(state): State<GatewayState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let principal = actor(&state, &headers).await?;
    let stats = state.service.archive_stats(&principal).await?;
    Ok(Json(stats).into_response())
}

// --- Reporting ---

/// GET /v1/stats
pub async fn status_tallies(
    State(state): State<GatewayState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    actor(&state, &headers).await?;
    let tallies = state.service.status_tallies().await?;
    Ok(Json(tallies).into_response())
}
