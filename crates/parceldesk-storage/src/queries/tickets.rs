// SPDX-FileCopyrightText: 2026 Parceldesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ticket CRUD operations.
//!
//! Every mutation writes its history entries and notification rows inside
//! the same transaction as the ticket row, so the audit trail cannot be
//! bypassed. Updates are guarded by the ticket's version counter; the
//! caller supplies the version it read and the update only applies when
//! that version is still current.

use parceldesk_core::DeskError;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter};

use crate::database::Database;
use crate::models::{NewHistoryEntry, NewNotification, Ticket, TicketFilter, UpdateOutcome};
use crate::queries::rows::{self, TICKET_COLUMNS};
use crate::queries::{history, notifications};

fn insert_ticket_row(tx: &rusqlite::Transaction<'_>, ticket: &Ticket) -> rusqlite::Result<()> {
    tx.execute(
        "INSERT INTO tickets (id, package_number, case_reference, client_address, circuit,
                              complaint_type, motive, submitted_at, due_before,
                              driver_return_date, remark, requested_action, status, priority,
                              closed_at, version, created_by, assigned_to, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
                 ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)",
        params![
            ticket.id,
            ticket.package_number,
            ticket.case_reference,
            ticket.client_address,
            ticket.circuit,
            ticket.complaint_type.to_string(),
            ticket.motive,
            ticket.submitted_at,
            ticket.due_before,
            ticket.driver_return_date,
            ticket.remark,
            ticket.requested_action,
            ticket.status.to_string(),
            ticket.priority.to_string(),
            ticket.closed_at,
            ticket.version,
            ticket.created_by,
            ticket.assigned_to,
            ticket.created_at,
            ticket.updated_at,
        ],
    )?;
    Ok(())
}

/// Insert a new ticket with its creation history entry and notifications.
pub async fn insert_ticket(
    db: &Database,
    ticket: &Ticket,
    history_entry: NewHistoryEntry,
    notification_rows: Vec<NewNotification>,
) -> Result<(), DeskError> {
    let ticket = ticket.clone();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            insert_ticket_row(&tx, &ticket)?;
            history::insert_history_row(&tx, &history_entry, &ticket.created_at)?;
            for notification in &notification_rows {
                notifications::insert_notification_row(&tx, notification, &ticket.created_at)?;
            }
            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fetch a ticket by id.
pub async fn get_ticket(db: &Database, id: &str) -> Result<Option<Ticket>, DeskError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let sql = format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE id = ?1");
            let mut stmt = conn.prepare(&sql)?;
            let ticket = stmt
                .query_row(params![id], rows::ticket_from_row)
                .map(Some)
                .or_else(|e| match e {
                    rusqlite::Error::QueryReturnedNoRows => Ok(None),
                    other => Err(other),
                })?;
            Ok(ticket)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List tickets matching the filter, newest first.
pub async fn list_tickets(db: &Database, filter: &TicketFilter) -> Result<Vec<Ticket>, DeskError> {
    let filter = filter.clone();
    db.connection()
        .call(move |conn| {
            let mut conditions: Vec<&str> = Vec::new();
            let mut values: Vec<Value> = Vec::new();
            if let Some(status) = filter.status {
                conditions.push("status = ?");
                values.push(Value::Text(status.to_string()));
            }
            if let Some(circuit) = filter.circuit {
                conditions.push("circuit = ?");
                values.push(Value::Integer(i64::from(circuit)));
            }
            if let Some(query) = &filter.query {
                conditions.push(
                    "(package_number LIKE ? OR case_reference LIKE ? \
                     OR client_address LIKE ?)",
                );
                let pattern = format!("%{query}%");
                values.push(Value::Text(pattern.clone()));
                values.push(Value::Text(pattern.clone()));
                values.push(Value::Text(pattern));
            }
            let mut sql = format!("SELECT {TICKET_COLUMNS} FROM tickets");
            if !conditions.is_empty() {
                sql.push_str(" WHERE ");
                sql.push_str(&conditions.join(" AND "));
            }
            sql.push_str(" ORDER BY created_at DESC, id DESC");

            let mut stmt = conn.prepare(&sql)?;
            let mut tickets = Vec::new();
            let mapped = stmt.query_map(params_from_iter(values), rows::ticket_from_row)?;
            for row in mapped {
                tickets.push(row?);
            }
            Ok(tickets)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Conditionally update a ticket.
///
/// `updated` carries the new column values including the already bumped
/// version; the UPDATE only applies while the stored version still equals
/// `expected_version`. History and notification rows are written in the
/// same transaction, and only when the update applied.
pub async fn update_ticket(
    db: &Database,
    updated: &Ticket,
    expected_version: i64,
    history_entries: Vec<NewHistoryEntry>,
    notification_rows: Vec<NewNotification>,
) -> Result<UpdateOutcome, DeskError> {
    let updated = updated.clone();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let changed = tx.execute(
                "UPDATE tickets SET
                     package_number = ?1, case_reference = ?2, client_address = ?3,
                     motive = ?4, due_before = ?5, driver_return_date = ?6,
                     remark = ?7, requested_action = ?8, status = ?9, priority = ?10,
                     closed_at = ?11, version = ?12, assigned_to = ?13, updated_at = ?14
                 WHERE id = ?15 AND version = ?16",
                params![
                    updated.package_number,
                    updated.case_reference,
                    updated.client_address,
                    updated.motive,
                    updated.due_before,
                    updated.driver_return_date,
                    updated.remark,
                    updated.requested_action,
                    updated.status.to_string(),
                    updated.priority.to_string(),
                    updated.closed_at,
                    updated.version,
                    updated.assigned_to,
                    updated.updated_at,
                    updated.id,
                    expected_version,
                ],
            )?;
            if changed == 0 {
                // Distinguish a missing row from a concurrent writer.
                let actual: Option<i64> = tx
                    .query_row(
                        "SELECT version FROM tickets WHERE id = ?1",
                        params![updated.id],
                        |row| row.get(0),
                    )
                    .map(Some)
                    .or_else(|e| match e {
                        rusqlite::Error::QueryReturnedNoRows => Ok(None),
                        other => Err(other),
                    })?;
                tx.commit()?;
                return Ok(match actual {
                    None => UpdateOutcome::Missing,
                    Some(actual) => UpdateOutcome::VersionMismatch { actual },
                });
            }
            for entry in &history_entries {
                history::insert_history_row(&tx, entry, &updated.updated_at)?;
            }
            for notification in &notification_rows {
                notifications::insert_notification_row(&tx, notification, &updated.updated_at)?;
            }
            tx.commit()?;
            Ok(UpdateOutcome::Applied)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{
        ComplaintType, HistoryAction, NotificationKind, Priority, Principal, Role, TicketStatus,
    };
    use crate::models::Profile;
    use crate::queries::history::history_for_ticket;
    use crate::queries::notifications::notifications_for_user;
    use crate::queries::profiles::create_profile;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        // tickets.created_by references profiles
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

    pub(crate) fn sample_ticket(id: &str, circuit: u16) -> Ticket {
        Ticket {
            id: id.to_string(),
            package_number: format!("PKG-{id}"),
            case_reference: format!("CASE-{id}"),
            client_address: Some("12 Quay Street".into()),
            circuit,
            complaint_type: ComplaintType::Local,
            motive: "damaged parcel".into(),
            submitted_at: "2026-02-01T08:00:00.000Z".into(),
            due_before: "2026-02-08T08:00:00.000Z".into(),
            driver_return_date: None,
            remark: None,
            requested_action: None,
            status: TicketStatus::Pending,
            priority: Priority::Normal,
            closed_at: None,
            version: 0,
            created_by: Some("admin-1".into()),
            assigned_to: None,
            created_at: "2026-02-01T08:00:00.000Z".into(),
            updated_at: "2026-02-01T08:00:00.000Z".into(),
        }
    }

    async fn insert_sample(db: &Database, id: &str, circuit: u16) -> Ticket {
        let ticket = sample_ticket(id, circuit);
        let entry = NewHistoryEntry::action(&admin(), id, HistoryAction::Created);
        insert_ticket(db, &ticket, entry, Vec::new()).await.unwrap();
        ticket
    }

    #[tokio::test]
    async fn insert_and_get_round_trip() {
        let (db, _dir) = setup_db().await;
        let ticket = insert_sample(&db, "t1", 541).await;

        let fetched = get_ticket(&db, "t1").await.unwrap().unwrap();
        assert_eq!(fetched, ticket);
        assert!(get_ticket(&db, "nope").await.unwrap().is_none());

        let trail = history_for_ticket(&db, "t1").await.unwrap();
        assert_eq!(trail.len(), 1);
        assert_eq!(trail[0].action, HistoryAction::Created);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn list_applies_filters() {
        let (db, _dir) = setup_db().await;
        insert_sample(&db, "t1", 541).await;
        insert_sample(&db, "t2", 542).await;
        insert_sample(&db, "t3", 542).await;

        let all = list_tickets(&db, &TicketFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);

        let circuit = list_tickets(
            &db,
            &TicketFilter {
                circuit: Some(542),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(circuit.len(), 2);

        let text = list_tickets(
            &db,
            &TicketFilter {
                query: Some("PKG-t1".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(text.len(), 1);
        assert_eq!(text[0].id, "t1");

        let none = list_tickets(
            &db,
            &TicketFilter {
                status: Some(TicketStatus::Closed),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(none.is_empty());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn update_bumps_version_and_records_history() {
        let (db, _dir) = setup_db().await;
        let mut ticket = insert_sample(&db, "t1", 541).await;

        ticket.priority = Priority::Urgent;
        ticket.version = 1;
        ticket.updated_at = "2026-02-02T09:00:00.000Z".into();
        let entry = NewHistoryEntry::change(
            &admin(),
            "t1",
            HistoryAction::PriorityChanged,
            "priority",
            Some("normal".into()),
            Some("urgent".into()),
        );
        let notify = NewNotification {
            user_id: "driver-1".into(),
            ticket_id: "t1".into(),
            kind: NotificationKind::Updated,
            body: "priority raised".into(),
        };
        let outcome = update_ticket(&db, &ticket, 0, vec![entry], vec![notify])
            .await
            .unwrap();
        assert_eq!(outcome, UpdateOutcome::Applied);

        let fetched = get_ticket(&db, "t1").await.unwrap().unwrap();
        assert_eq!(fetched.priority, Priority::Urgent);
        assert_eq!(fetched.version, 1);

        let trail = history_for_ticket(&db, "t1").await.unwrap();
        assert_eq!(trail.len(), 2);
        assert_eq!(trail[1].action, HistoryAction::PriorityChanged);
        assert_eq!(trail[1].old_value.as_deref(), Some("normal"));
        // The trail row carries the mutation's own timestamp.
        assert_eq!(trail[0].created_at, "2026-02-01T08:00:00.000Z");
        assert_eq!(trail[1].created_at, "2026-02-02T09:00:00.000Z");

        let notified = notifications_for_user(&db, "driver-1", true).await.unwrap();
        assert_eq!(notified.len(), 1);
        assert_eq!(notified[0].created_at, "2026-02-02T09:00:00.000Z");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn stale_version_is_rejected_without_side_effects() {
        let (db, _dir) = setup_db().await;
        let mut ticket = insert_sample(&db, "t1", 541).await;

        ticket.version = 1;
        let outcome = update_ticket(&db, &ticket, 7, Vec::new(), Vec::new())
            .await
            .unwrap();
        assert_eq!(outcome, UpdateOutcome::VersionMismatch { actual: 0 });

        let fetched = get_ticket(&db, "t1").await.unwrap().unwrap();
        assert_eq!(fetched.version, 0);
        assert_eq!(history_for_ticket(&db, "t1").await.unwrap().len(), 1);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn update_of_missing_ticket_reports_missing() {
        let (db, _dir) = setup_db().await;
        let ticket = sample_ticket("ghost", 541);
        let outcome = update_ticket(&db, &ticket, 0, Vec::new(), Vec::new())
            .await
            .unwrap();
        assert_eq!(outcome, UpdateOutcome::Missing);
        db.close().await.unwrap();
    }
}
