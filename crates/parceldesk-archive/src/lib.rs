// SPDX-FileCopyrightText: 2026 Parceldesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retention-based ticket archival.
//!
//! A ticket qualifies once it is closed and its latest closure is at least
//! the retention window in the past. Each qualifying ticket is moved in its
//! own transaction; a failure skips that ticket and the run continues, so
//! one poisoned row cannot wedge the whole sweep.

use std::sync::Arc;

use chrono::Months;
use serde::Serialize;
use tracing::{info, warn};

use parceldesk_config::model::ArchiveConfig;
use parceldesk_core::time::format_timestamp;
use parceldesk_core::{Clock, DeskError, TicketStore};

/// Outcome of one archival sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveRunSummary {
    /// Tickets moved to the archive.
    pub archived: u64,
    /// Candidates that could not be moved (reopened mid-run, storage error).
    pub skipped: u64,
    pub message: String,
}

/// Runs the retention sweep on demand.
pub struct ArchiveEngine {
    store: Arc<dyn TicketStore>,
    clock: Arc<dyn Clock>,
    retention_months: u32,
}

impl ArchiveEngine {
    pub fn new(store: Arc<dyn TicketStore>, clock: Arc<dyn Clock>, config: &ArchiveConfig) -> Self {
        Self {
            store,
            clock,
            retention_months: config.retention_months,
        }
    }

    /// The retention cutoff as of the current clock: tickets closed at or
    /// before this instant qualify.
    pub fn cutoff(&self) -> String {
        format_timestamp(self.clock.now() - Months::new(self.retention_months))
    }

    /// Sweep once. A run with no qualifying tickets is a safe no-op.
    pub async fn run(&self) -> Result<ArchiveRunSummary, DeskError> {
        let cutoff = self.cutoff();
        let archived_at = self.clock.now_timestamp();
        let candidates = self.store.archive_candidates(&cutoff).await?;

        if candidates.is_empty() {
            info!(%cutoff, "archival sweep: nothing to do");
            return Ok(ArchiveRunSummary {
                archived: 0,
                skipped: 0,
                message: "no tickets qualified for archival".into(),
            });
        }

        let mut archived = 0u64;
        let mut skipped = 0u64;
        for id in &candidates {
            match self.store.archive_ticket(id, &archived_at, &cutoff).await {
                Ok(true) => archived += 1,
                Ok(false) => {
                    // Reopened, freshly re-closed, or removed between
                    // candidate listing and the move.
                    skipped += 1;
                    warn!(ticket_id = %id, "archival skipped: ticket no longer qualifies");
                }
                Err(e) => {
                    skipped += 1;
                    warn!(ticket_id = %id, error = %e, "archival failed for ticket, continuing");
                }
            }
        }

        info!(%cutoff, archived, skipped, "archival sweep complete");
        Ok(ArchiveRunSummary {
            archived,
            skipped,
            message: format!("archived {archived} tickets, skipped {skipped}"),
        })
    }
}
