// SPDX-FileCopyrightText: 2026 Parceldesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Activity history operations.
//!
//! Rows are only ever inserted from inside the transaction of the mutation
//! they record, via [`insert_history_row`]; there is no standalone insert
//! path, so the trail cannot drift from the data. Each row is stamped with
//! the mutation's own clock-derived timestamp, never with SQLite time.

use parceldesk_core::DeskError;
use rusqlite::params;

use crate::database::Database;
use crate::models::{HistoryEntry, NewHistoryEntry};
use crate::queries::rows;

/// Insert one history row stamped `recorded_at`. Must be called inside the
/// mutation's transaction, with the mutation's timestamp.
pub(crate) fn insert_history_row(
    conn: &rusqlite::Connection,
    entry: &NewHistoryEntry,
    recorded_at: &str,
) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO history (ticket_id, actor_id, actor_role, action, field,
                              old_value, new_value, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            entry.ticket_id,
            entry.actor_id,
            entry.actor_role.map(|r| r.to_string()),
            entry.action.to_string(),
            entry.field,
            entry.old_value,
            entry.new_value,
            recorded_at,
        ],
    )?;
    Ok(())
}

/// History entries for a ticket in chronological order.
pub async fn history_for_ticket(
    db: &Database,
    ticket_id: &str,
) -> Result<Vec<HistoryEntry>, DeskError> {
    let ticket_id = ticket_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, ticket_id, actor_id, actor_role, action, field,
                        old_value, new_value, created_at
                 FROM history WHERE ticket_id = ?1
                 ORDER BY created_at ASC, id ASC",
            )?;
            let mut entries = Vec::new();
            let rows = stmt.query_map(params![ticket_id], rows::history_from_row)?;
            for row in rows {
                entries.push(row?);
            }
            Ok(entries)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
