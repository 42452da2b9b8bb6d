// SPDX-FileCopyrightText: 2026 Parceldesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `parceldesk archive` command implementation.
//!
//! Runs one archival sweep against the configured database and prints the
//! run summary. The same sweep is reachable over the gateway via
//! `POST /v1/archive/run`; this command exists for cron jobs and operators.

use std::sync::Arc;

use parceldesk_archive::ArchiveEngine;
use parceldesk_config::DeskConfig;
use parceldesk_core::{Clock, DeskError, SystemClock, TicketStore};
use parceldesk_storage::SqliteStore;

/// Run the `parceldesk archive` command.
pub async fn run_archive(config: &DeskConfig, json: bool) -> Result<(), DeskError> {
    let store = SqliteStore::open(&config.storage).await?;
    let store: Arc<dyn TicketStore> = Arc::new(store);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let engine = ArchiveEngine::new(store, clock, &config.archive);
    let summary = engine.run().await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).unwrap_or_else(|_| "{}".to_string())
        );
    } else {
        println!("parceldesk archive: {}", summary.message);
    }

    Ok(())
}
