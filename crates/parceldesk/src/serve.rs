// SPDX-FileCopyrightText: 2026 Parceldesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `parceldesk serve` command implementation.
//!
//! Opens the SQLite store, assembles the ticket service and archive engine,
//! and runs the HTTP/WebSocket gateway until a shutdown signal arrives.

use std::sync::Arc;

use tracing::{info, warn};

use parceldesk_archive::ArchiveEngine;
use parceldesk_channel::TicketChannels;
use parceldesk_config::DeskConfig;
use parceldesk_core::{Clock, DeskError, SystemClock, TicketStore};
use parceldesk_gateway::{start_server, AuthConfig, GatewayState, ServerConfig};
use parceldesk_storage::SqliteStore;
use parceldesk_ticket::TicketService;

/// Runs the `parceldesk serve` command.
pub async fn run_serve(config: DeskConfig) -> Result<(), DeskError> {
    init_tracing(&config.app.log_level);

    info!(
        database = %config.storage.database_path,
        "starting parceldesk serve"
    );

    let store = SqliteStore::open(&config.storage).await?;
    let store: Arc<dyn TicketStore> = Arc::new(store);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let channels = Arc::new(TicketChannels::new());
    let service = Arc::new(TicketService::new(
        store.clone(),
        channels,
        clock.clone(),
    ));
    let engine = Arc::new(ArchiveEngine::new(store, clock, &config.archive));

    if config.gateway.bearer_token.is_none() {
        warn!("gateway.bearer_token is not set; every API request will be rejected");
    }

    let state = GatewayState {
        service,
        engine,
        auth: AuthConfig {
            bearer_token: config.gateway.bearer_token.clone(),
        },
        archive_log_limit: config.archive.log_limit,
    };
    let server_config = ServerConfig {
        host: config.gateway.host.clone(),
        port: config.gateway.port,
        bearer_token: config.gateway.bearer_token.clone(),
    };

    tokio::select! {
        result = start_server(&server_config, state) => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
        }
    }

    info!("parceldesk serve shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("parceldesk={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
