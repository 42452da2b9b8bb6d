// SPDX-FileCopyrightText: 2026 Parceldesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP and WebSocket surface for the Parceldesk ticket system.
//!
//! Exposes the ticket service over a bearer-token-protected REST API plus a
//! per-ticket WebSocket event stream, with a public health endpoint for
//! liveness probes.

pub mod auth;
pub mod handlers;
pub mod server;
pub mod ws;

pub use auth::AuthConfig;
pub use server::{router, start_server, GatewayState, ServerConfig};
