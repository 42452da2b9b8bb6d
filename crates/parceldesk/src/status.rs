// SPDX-FileCopyrightText: 2026 Parceldesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `parceldesk status` command implementation.
//!
//! Opens the configured database read-style and prints ticket tallies plus
//! archive totals. Works whether or not the server is running; SQLite WAL
//! mode allows a concurrent reader.

use parceldesk_config::DeskConfig;
use parceldesk_core::{Clock, DeskError, SystemClock, TicketStore};
use parceldesk_storage::SqliteStore;
use serde::Serialize;

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub database_path: String,
    pub total: i64,
    pub pending: i64,
    pub in_progress: i64,
    pub closed: i64,
    pub cancelled: i64,
    /// Not closed and past their due-before date.
    pub overdue: i64,
    pub archived: i64,
}

/// Run the `parceldesk status` command.
pub async fn run_status(config: &DeskConfig, json: bool) -> Result<(), DeskError> {
    let store = SqliteStore::open(&config.storage).await?;

    let now = SystemClock.now_timestamp();
    let tallies = store.status_tallies(&now).await?;
    let archive = store.archive_stats().await?;

    let report = StatusReport {
        database_path: config.storage.database_path.clone(),
        total: tallies.total,
        pending: tallies.pending,
        in_progress: tallies.in_progress,
        closed: tallies.closed,
        cancelled: tallies.cancelled,
        overdue: tallies.overdue,
        archived: archive.total,
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).unwrap_or_else(|_| "{}".to_string())
        );
    } else {
        print_report(&report);
    }

    Ok(())
}

fn print_report(report: &StatusReport) {
    println!();
    println!("  parceldesk status");
    println!("  {}", "-".repeat(35));
    println!("    Database:    {}", report.database_path);
    println!("    Tickets:     {}", report.total);
    println!("      pending:     {}", report.pending);
    println!("      in progress: {}", report.in_progress);
    println!("      closed:      {}", report.closed);
    println!("      cancelled:   {}", report.cancelled);
    println!("      overdue:     {}", report.overdue);
    println!("    Archived:    {}", report.archived);
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_report_serializes() {
        let report = StatusReport {
            database_path: "parceldesk.db".to_string(),
            total: 3,
            pending: 1,
            in_progress: 1,
            closed: 1,
            cancelled: 0,
            overdue: 2,
            archived: 5,
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"total\":3"));
        assert!(json.contains("\"archived\":5"));
    }

    #[tokio::test]
    async fn status_runs_against_a_fresh_database() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = DeskConfig::default();
        config.storage.database_path = dir
            .path()
            .join("status.db")
            .to_string_lossy()
            .to_string();

        run_status(&config, true).await.unwrap();
    }
}
