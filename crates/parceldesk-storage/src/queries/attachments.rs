// SPDX-FileCopyrightText: 2026 Parceldesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Attachment metadata. The file bytes live in external blob storage; only
//! the opaque locator is persisted here.

use parceldesk_core::DeskError;
use rusqlite::params;

use crate::database::Database;
use crate::models::{Attachment, NewHistoryEntry, NewNotification};
use crate::queries::rows;
use crate::queries::{history, notifications};

/// Record an attachment with its history entry and notifications, atomically.
pub async fn insert_attachment(
    db: &Database,
    attachment: &Attachment,
    history_entry: NewHistoryEntry,
    notification_rows: Vec<NewNotification>,
) -> Result<(), DeskError> {
    let attachment = attachment.clone();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO attachments (id, ticket_id, file_name, storage_locator,
                                          mime_type, size_bytes, uploaded_by, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    attachment.id,
                    attachment.ticket_id,
                    attachment.file_name,
                    attachment.storage_locator,
                    attachment.mime_type,
                    attachment.size_bytes,
                    attachment.uploaded_by,
                    attachment.created_at,
                ],
            )?;
            history::insert_history_row(&tx, &history_entry, &attachment.created_at)?;
            for notification in &notification_rows {
                notifications::insert_notification_row(&tx, notification, &attachment.created_at)?;
            }
            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Attachments of a ticket in upload order.
pub async fn attachments_for_ticket(
    db: &Database,
    ticket_id: &str,
) -> Result<Vec<Attachment>, DeskError> {
    let ticket_id = ticket_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, ticket_id, file_name, storage_locator, mime_type,
                        size_bytes, uploaded_by, created_at
                 FROM attachments WHERE ticket_id = ?1
                 ORDER BY created_at ASC, id ASC",
            )?;
            let mut attachments = Vec::new();
            let rows = stmt.query_map(params![ticket_id], rows::attachment_from_row)?;
            for row in rows {
                attachments.push(row?);
            }
            Ok(attachments)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
