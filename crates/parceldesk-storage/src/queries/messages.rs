// SPDX-FileCopyrightText: 2026 Parceldesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ticket thread messages.
//!
//! Ordering is `(created_at, seq)`: `seq` is the AUTOINCREMENT insertion
//! number and breaks ties between messages stamped in the same millisecond.

use parceldesk_core::DeskError;
use rusqlite::params;

use crate::database::Database;
use crate::models::{Message, NewHistoryEntry, NewNotification};
use crate::queries::rows;
use crate::queries::{history, notifications};

/// Append a message to a ticket thread, with its history entry and
/// notifications in the same transaction. Returns the stored message with
/// its assigned sequence number.
pub async fn append_message(
    db: &Database,
    message: &Message,
    history_entry: NewHistoryEntry,
    notification_rows: Vec<NewNotification>,
) -> Result<Message, DeskError> {
    let mut message = message.clone();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO messages (id, ticket_id, author_id, body, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    message.id,
                    message.ticket_id,
                    message.author_id,
                    message.body,
                    message.created_at,
                ],
            )?;
            message.seq = tx.last_insert_rowid();
            history::insert_history_row(&tx, &history_entry, &message.created_at)?;
            for notification in &notification_rows {
                notifications::insert_notification_row(&tx, notification, &message.created_at)?;
            }
            tx.commit()?;
            Ok(message)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Messages of a ticket thread in chronological order.
pub async fn messages_for_ticket(db: &Database, ticket_id: &str) -> Result<Vec<Message>, DeskError> {
    let ticket_id = ticket_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT seq, id, ticket_id, author_id, body, created_at
                 FROM messages WHERE ticket_id = ?1
                 ORDER BY created_at ASC, seq ASC",
            )?;
            let mut messages = Vec::new();
            let rows = stmt.query_map(params![ticket_id], rows::message_from_row)?;
            for row in rows {
                messages.push(row?);
            }
            Ok(messages)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HistoryAction, Principal, Profile, Role};
    use crate::queries::profiles::create_profile;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        // messages.author_id references profiles
        create_profile(
            &db,
            &Profile {
                id: "driver-1".into(),
                email: "dina@example.com".into(),
                full_name: "Dina Driver".into(),
                role: Role::Driver,
                circuit: Some(541),
                phone: None,
                created_at: "2026-01-01T00:00:00.000Z".into(),
                updated_at: "2026-01-01T00:00:00.000Z".into(),
            },
        )
        .await
        .unwrap();
        (db, dir)
    }

    fn driver() -> Principal {
        Principal {
            id: "driver-1".into(),
            name: "Dina Driver".into(),
            role: Role::Driver,
            circuit: Some(541),
        }
    }

    fn message(id: &str, body: &str, created_at: &str) -> Message {
        Message {
            seq: 0,
            id: id.to_string(),
            ticket_id: "t1".to_string(),
            author_id: "driver-1".to_string(),
            body: body.to_string(),
            created_at: created_at.to_string(),
        }
    }

    async fn append(db: &Database, msg: &Message) -> Message {
        let entry = NewHistoryEntry::action(&driver(), &msg.ticket_id, HistoryAction::MessageSent);
        append_message(db, msg, entry, Vec::new()).await.unwrap()
    }

    #[tokio::test]
    async fn append_assigns_increasing_seq() {
        let (db, _dir) = setup_db().await;

        let m1 = append(&db, &message("m1", "first", "2026-02-01T08:00:00.000Z")).await;
        let m2 = append(&db, &message("m2", "second", "2026-02-01T08:00:01.000Z")).await;
        assert!(m2.seq > m1.seq);

        let thread = messages_for_ticket(&db, "t1").await.unwrap();
        assert_eq!(thread.len(), 2);
        assert_eq!(thread[0].id, "m1");
        assert_eq!(thread[1].id, "m2");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn equal_timestamps_order_by_insertion() {
        let (db, _dir) = setup_db().await;

        let ts = "2026-02-01T08:00:00.000Z";
        append(&db, &message("m1", "first", ts)).await;
        append(&db, &message("m2", "second", ts)).await;
        append(&db, &message("m3", "third", ts)).await;

        let thread = messages_for_ticket(&db, "t1").await.unwrap();
        let ids: Vec<&str> = thread.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["m1", "m2", "m3"]);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn empty_thread_lists_nothing() {
        let (db, _dir) = setup_db().await;
        assert!(messages_for_ticket(&db, "t1").await.unwrap().is_empty());
        db.close().await.unwrap();
    }
}
