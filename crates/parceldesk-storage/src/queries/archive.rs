// SPDX-FileCopyrightText: 2026 Parceldesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Archive operations.
//!
//! A ticket is moved to the archive in one transaction: copy the full field
//! set into `ticket_archives`, append one `archive_log` row, delete the
//! active row. The full candidate predicate, cutoff included, is repeated
//! inside the transaction so a ticket reopened (or reopened and re-closed)
//! between candidate listing and the move is left alone.

use parceldesk_core::DeskError;
use rusqlite::params;

use crate::database::Database;
use crate::models::{ArchiveLogEntry, ArchiveStats, ArchivedTicket};
use crate::queries::rows::{self, TICKET_COLUMNS};

/// Ids of active tickets whose latest closure is at or before `cutoff`.
pub async fn archive_candidates(db: &Database, cutoff: &str) -> Result<Vec<String>, DeskError> {
    let cutoff = cutoff.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id FROM tickets
                 WHERE status = 'closed' AND closed_at IS NOT NULL AND closed_at <= ?1
                 ORDER BY closed_at ASC, id ASC",
            )?;
            let mut ids = Vec::new();
            let rows = stmt.query_map(params![cutoff], |row| row.get::<_, String>(0))?;
            for row in rows {
                ids.push(row?);
            }
            Ok(ids)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Move one closed ticket into the archive. Returns `false` when the ticket
/// is gone, no longer closed, or its latest closure is newer than `cutoff`.
pub async fn archive_ticket(
    db: &Database,
    id: &str,
    archived_at: &str,
    cutoff: &str,
) -> Result<bool, DeskError> {
    let id = id.to_string();
    let archived_at = archived_at.to_string();
    let cutoff = cutoff.to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let copied = tx.execute(
                &format!(
                    "INSERT INTO ticket_archives ({TICKET_COLUMNS}, archived_at)
                     SELECT {TICKET_COLUMNS}, ?2 FROM tickets
                     WHERE id = ?1 AND status = 'closed'
                       AND closed_at IS NOT NULL AND closed_at <= ?3"
                ),
                params![id, archived_at, cutoff],
            )?;
            if copied == 0 {
                tx.commit()?;
                return Ok(false);
            }
            tx.execute(
                "INSERT INTO archive_log (action, ticket_id, package_number, case_reference,
                                          circuit, closed_at, created_at)
                 SELECT 'archived', id, package_number, case_reference, circuit, closed_at, ?2
                 FROM tickets WHERE id = ?1",
                params![id, archived_at],
            )?;
            tx.execute("DELETE FROM tickets WHERE id = ?1", params![id])?;
            tx.commit()?;
            Ok(true)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Archived tickets, newest archival first.
pub async fn list_archived(db: &Database) -> Result<Vec<ArchivedTicket>, DeskError> {
    db.connection()
        .call(move |conn| {
            let sql = format!(
                "SELECT {TICKET_COLUMNS}, archived_at FROM ticket_archives
                 ORDER BY archived_at DESC, id DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let mut archived = Vec::new();
            let rows = stmt.query_map([], rows::archived_ticket_from_row)?;
            for row in rows {
                archived.push(row?);
            }
            Ok(archived)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fetch one archived ticket by its original id.
pub async fn get_archived(db: &Database, id: &str) -> Result<Option<ArchivedTicket>, DeskError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let sql = format!(
                "SELECT {TICKET_COLUMNS}, archived_at FROM ticket_archives WHERE id = ?1"
            );
            let mut stmt = conn.prepare(&sql)?;
            let archived = stmt
                .query_row(params![id], rows::archived_ticket_from_row)
                .map(Some)
                .or_else(|e| match e {
                    rusqlite::Error::QueryReturnedNoRows => Ok(None),
                    other => Err(other),
                })?;
            Ok(archived)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Most recent archive log entries, newest first.
pub async fn archive_log(db: &Database, limit: i64) -> Result<Vec<ArchiveLogEntry>, DeskError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, action, ticket_id, package_number, case_reference, circuit,
                        closed_at, created_at
                 FROM archive_log ORDER BY created_at DESC, id DESC LIMIT ?1",
            )?;
            let mut entries = Vec::new();
            let rows = stmt.query_map(params![limit], rows::archive_log_from_row)?;
            for row in rows {
                entries.push(row?);
            }
            Ok(entries)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Aggregate statistics over the archive store.
pub async fn archive_stats(db: &Database) -> Result<ArchiveStats, DeskError> {
    db.connection()
        .call(move |conn| {
            let stats = conn.query_row(
                "SELECT COUNT(*), COUNT(DISTINCT circuit),
                        MIN(archived_at), MAX(archived_at)
                 FROM ticket_archives",
                [],
                |row| {
                    Ok(ArchiveStats {
                        total: row.get(0)?,
                        circuits: row.get(1)?,
                        first_archived_at: row.get(2)?,
                        last_archived_at: row.get(3)?,
                    })
                },
            )?;
            Ok(stats)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HistoryAction, NewHistoryEntry, Principal, Profile, Role, Ticket,
        TicketStatus};
    use crate::queries::profiles::create_profile;
    use crate::queries::tickets::{get_ticket, insert_ticket, update_ticket};
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        create_profile(
            &db,
            &Profile {
                id: "admin-1".into(),
                email: "ada@example.com".into(),
                full_name: "Ada Admin".into(),
                role: Role::Admin,
                circuit: None,
                phone: None,
                created_at: "2026-01-01T00:00:00.000Z".into(),
                updated_at: "2026-01-01T00:00:00.000Z".into(),
            },
        )
        .await
        .unwrap();
        (db, dir)
    }

    fn admin() -> Principal {
        Principal {
            id: "admin-1".into(),
            name: "Ada Admin".into(),
            role: Role::Admin,
            circuit: None,
        }
    }

    async fn closed_ticket(db: &Database, id: &str, closed_at: &str) -> Ticket {
        let mut ticket = crate::queries::tickets::tests::sample_ticket(id, 541);
        let entry = NewHistoryEntry::action(&admin(), id, HistoryAction::Created);
        insert_ticket(db, &ticket, entry, Vec::new()).await.unwrap();

        ticket.status = TicketStatus::Closed;
        ticket.closed_at = Some(closed_at.to_string());
        ticket.version = 1;
        let entry = NewHistoryEntry::action(&admin(), id, HistoryAction::StatusChanged);
        update_ticket(db, &ticket, 0, vec![entry], Vec::new())
            .await
            .unwrap();
        ticket
    }

    #[tokio::test]
    async fn candidates_respect_cutoff() {
        let (db, _dir) = setup_db().await;
        closed_ticket(&db, "old", "2026-01-15T10:00:00.000Z").await;
        closed_ticket(&db, "fresh", "2026-05-01T10:00:00.000Z").await;

        let ids = archive_candidates(&db, "2026-04-15T00:00:00.000Z")
            .await
            .unwrap();
        assert_eq!(ids, vec!["old".to_string()]);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn archive_moves_ticket_and_logs_once() {
        let (db, _dir) = setup_db().await;
        let ticket = closed_ticket(&db, "t1", "2026-01-15T10:00:00.000Z").await;

        let moved = archive_ticket(&db, "t1", "2026-04-15T10:00:00.000Z", "2026-01-15T10:00:00.000Z")
            .await
            .unwrap();
        assert!(moved);

        // gone from the active table, intact in the archive
        assert!(get_ticket(&db, "t1").await.unwrap().is_none());
        let archived = get_archived(&db, "t1").await.unwrap().unwrap();
        assert_eq!(archived.ticket, ticket);
        assert_eq!(archived.archived_at, "2026-04-15T10:00:00.000Z");

        let log = archive_log(&db, 10).await.unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].ticket_id, "t1");
        assert_eq!(log[0].action, "archived");
        assert_eq!(log[0].closed_at, "2026-01-15T10:00:00.000Z");

        // a second attempt finds nothing to move
        let moved_again = archive_ticket(&db, "t1", "2026-04-16T10:00:00.000Z", "2026-01-16T10:00:00.000Z")
            .await
            .unwrap();
        assert!(!moved_again);
        assert_eq!(archive_log(&db, 10).await.unwrap().len(), 1);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn reopened_ticket_is_not_archived() {
        let (db, _dir) = setup_db().await;
        let mut ticket = closed_ticket(&db, "t1", "2026-01-15T10:00:00.000Z").await;

        ticket.status = TicketStatus::InProgress;
        ticket.closed_at = None;
        ticket.version = 2;
        let entry = NewHistoryEntry::action(&admin(), "t1", HistoryAction::StatusChanged);
        update_ticket(&db, &ticket, 1, vec![entry], Vec::new())
            .await
            .unwrap();

        let moved = archive_ticket(&db, "t1", "2026-04-15T10:00:00.000Z", "2026-01-15T10:00:00.000Z")
            .await
            .unwrap();
        assert!(!moved);
        assert!(get_ticket(&db, "t1").await.unwrap().is_some());
        assert!(archive_log(&db, 10).await.unwrap().is_empty());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn reclosed_ticket_past_the_cutoff_is_not_archived() {
        let (db, _dir) = setup_db().await;
        let mut ticket = closed_ticket(&db, "t1", "2026-01-15T10:00:00.000Z").await;

        // Reopened and re-closed after candidate listing: the closure that
        // counts is now fresh.
        ticket.status = TicketStatus::InProgress;
        ticket.closed_at = None;
        ticket.version = 2;
        let entry = NewHistoryEntry::action(&admin(), "t1", HistoryAction::StatusChanged);
        update_ticket(&db, &ticket, 1, vec![entry], Vec::new())
            .await
            .unwrap();
        ticket.status = TicketStatus::Closed;
        ticket.closed_at = Some("2026-04-15T09:00:00.000Z".into());
        ticket.version = 3;
        let entry = NewHistoryEntry::action(&admin(), "t1", HistoryAction::StatusChanged);
        update_ticket(&db, &ticket, 2, vec![entry], Vec::new())
            .await
            .unwrap();

        let moved = archive_ticket(&db, "t1", "2026-04-15T10:00:00.000Z", "2026-01-15T10:00:00.000Z")
            .await
            .unwrap();
        assert!(!moved);
        assert!(get_ticket(&db, "t1").await.unwrap().is_some());
        assert!(get_archived(&db, "t1").await.unwrap().is_none());
        assert!(archive_log(&db, 10).await.unwrap().is_empty());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn stats_aggregate_the_archive() {
        let (db, _dir) = setup_db().await;

        let empty = archive_stats(&db).await.unwrap();
        assert_eq!(empty.total, 0);
        assert!(empty.first_archived_at.is_none());

        closed_ticket(&db, "t1", "2026-01-10T10:00:00.000Z").await;
        closed_ticket(&db, "t2", "2026-01-20T10:00:00.000Z").await;
        archive_ticket(&db, "t1", "2026-04-10T10:00:00.000Z", "2026-01-10T10:00:00.000Z")
            .await
            .unwrap();
        archive_ticket(&db, "t2", "2026-04-20T10:00:00.000Z", "2026-01-20T10:00:00.000Z")
            .await
            .unwrap();

        let stats = archive_stats(&db).await.unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.circuits, 1);
        assert_eq!(
            stats.first_archived_at.as_deref(),
            Some("2026-04-10T10:00:00.000Z")
        );
        assert_eq!(
            stats.last_archived_at.as_deref(),
            Some("2026-04-20T10:00:00.000Z")
        );

        let listed = list_archived(&db).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].ticket.id, "t2");

        db.close().await.unwrap();
    }
}
