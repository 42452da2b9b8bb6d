// SPDX-FileCopyrightText: 2026 Parceldesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification operations.
//!
//! Unread counts are derived from unread rows, so they can never go
//! negative; mark-read operations are plain idempotent flag flips.

use parceldesk_core::DeskError;
use rusqlite::params;

use crate::database::Database;
use crate::models::{NewNotification, Notification};
use crate::queries::rows;

/// Insert one notification row stamped `recorded_at`. Must be called inside
/// the mutation's transaction, with the mutation's timestamp.
pub(crate) fn insert_notification_row(
    conn: &rusqlite::Connection,
    notification: &NewNotification,
    recorded_at: &str,
) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO notifications (user_id, ticket_id, kind, body, is_read, created_at)
         VALUES (?1, ?2, ?3, ?4, 0, ?5)",
        params![
            notification.user_id,
            notification.ticket_id,
            notification.kind.to_string(),
            notification.body,
            recorded_at,
        ],
    )?;
    Ok(())
}

/// Notifications for a user, newest first.
pub async fn notifications_for_user(
    db: &Database,
    user_id: &str,
    unread_only: bool,
) -> Result<Vec<Notification>, DeskError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let sql = if unread_only {
                "SELECT id, user_id, ticket_id, kind, body, is_read, created_at
                 FROM notifications WHERE user_id = ?1 AND is_read = 0
                 ORDER BY created_at DESC, id DESC"
            } else {
                "SELECT id, user_id, ticket_id, kind, body, is_read, created_at
                 FROM notifications WHERE user_id = ?1
                 ORDER BY created_at DESC, id DESC"
            };
            let mut stmt = conn.prepare(sql)?;
            let mut notifications = Vec::new();
            let rows = stmt.query_map(params![user_id], rows::notification_from_row)?;
            for row in rows {
                notifications.push(row?);
            }
            Ok(notifications)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Count of unread notifications for a user.
pub async fn unread_count(db: &Database, user_id: &str) -> Result<i64, DeskError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM notifications WHERE user_id = ?1 AND is_read = 0",
                params![user_id],
                |row| row.get(0),
            )?;
            Ok(count)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Mark every notification for the user as read. Returns rows flipped.
pub async fn mark_all_read(db: &Database, user_id: &str) -> Result<u64, DeskError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE notifications SET is_read = 1 WHERE user_id = ?1 AND is_read = 0",
                params![user_id],
            )?;
            Ok(changed as u64)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Mark the user's notifications for one ticket as read. Returns rows flipped.
pub async fn mark_ticket_read(
    db: &Database,
    user_id: &str,
    ticket_id: &str,
) -> Result<u64, DeskError> {
    let user_id = user_id.to_string();
    let ticket_id = ticket_id.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE notifications SET is_read = 1
                 WHERE user_id = ?1 AND ticket_id = ?2 AND is_read = 0",
                params![user_id, ticket_id],
            )?;
            Ok(changed as u64)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
