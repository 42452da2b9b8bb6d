// SPDX-FileCopyrightText: 2026 Parceldesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reporting over the active ticket table.

use parceldesk_core::DeskError;
use rusqlite::params;

use crate::database::Database;
use crate::models::StatusTallies;

/// Status tallies over the active store. `now` fixes the overdue cutoff so
/// the numbers are stable for a given report time.
pub async fn status_tallies(db: &Database, now: &str) -> Result<StatusTallies, DeskError> {
    let now = now.to_string();
    db.connection()
        .call(move |conn| {
            let tallies = conn.query_row(
                "SELECT COUNT(*),
                        COALESCE(SUM(status = 'pending'), 0),
                        COALESCE(SUM(status = 'in_progress'), 0),
                        COALESCE(SUM(status = 'closed'), 0),
                        COALESCE(SUM(status = 'cancelled'), 0),
                        COALESCE(SUM(status NOT IN ('closed', 'cancelled')
                                     AND due_before < ?1), 0)
                 FROM tickets",
                params![now],
                |row| {
                    Ok(StatusTallies {
                        total: row.get(0)?,
                        pending: row.get(1)?,
                        in_progress: row.get(2)?,
                        closed: row.get(3)?,
                        cancelled: row.get(4)?,
                        overdue: row.get(5)?,
                    })
                },
            )?;
            Ok(tallies)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HistoryAction, NewHistoryEntry, Principal, Profile, Role, TicketStatus};
    use crate::queries::profiles::create_profile;
    use crate::queries::tickets::tests::sample_ticket;
    use crate::queries::tickets::{insert_ticket, update_ticket};
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

    #[tokio::test]
    async fn empty_store_tallies_zero() {
        let (db, _dir) = setup_db().await;
        let t = status_tallies(&db, "2026-02-01T00:00:00.000Z").await.unwrap();
        assert_eq!(t, StatusTallies::default());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn tallies_count_statuses_and_overdue() {
        let (db, _dir) = setup_db().await;

        // pending, due 2026-02-08
        let entry = NewHistoryEntry::action(&admin(), "t1", HistoryAction::Created);
        insert_ticket(&db, &sample_ticket("t1", 541), entry, Vec::new())
            .await
            .unwrap();

        // in_progress, same due date
        let mut t2 = sample_ticket("t2", 542);
        let entry = NewHistoryEntry::action(&admin(), "t2", HistoryAction::Created);
        insert_ticket(&db, &t2, entry, Vec::new()).await.unwrap();
        t2.status = TicketStatus::InProgress;
        t2.version = 1;
        let entry = NewHistoryEntry::action(&admin(), "t2", HistoryAction::StatusChanged);
        update_ticket(&db, &t2, 0, vec![entry], Vec::new())
            .await
            .unwrap();

        // closed, never overdue
        let mut t3 = sample_ticket("t3", 543);
        let entry = NewHistoryEntry::action(&admin(), "t3", HistoryAction::Created);
        insert_ticket(&db, &t3, entry, Vec::new()).await.unwrap();
        t3.status = TicketStatus::Closed;
        t3.closed_at = Some("2026-02-05T00:00:00.000Z".into());
        t3.version = 1;
        let entry = NewHistoryEntry::action(&admin(), "t3", HistoryAction::StatusChanged);
        update_ticket(&db, &t3, 0, vec![entry], Vec::new())
            .await
            .unwrap();

        let before_due = status_tallies(&db, "2026-02-07T00:00:00.000Z").await.unwrap();
        assert_eq!(before_due.total, 3);
        assert_eq!(before_due.pending, 1);
        assert_eq!(before_due.in_progress, 1);
        assert_eq!(before_due.closed, 1);
        assert_eq!(before_due.cancelled, 0);
        assert_eq!(before_due.overdue, 0);

        let after_due = status_tallies(&db, "2026-03-01T00:00:00.000Z").await.unwrap();
        assert_eq!(after_due.overdue, 2);

        db.close().await.unwrap();
    }
}
