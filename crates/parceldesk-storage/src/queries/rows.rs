// SPDX-FileCopyrightText: 2026 Parceldesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared row-to-model mapping helpers.
//!
//! Column orders here must match the SELECT lists in the query modules.

use std::str::FromStr;

use rusqlite::Row;
use rusqlite::types::Type;

use crate::models::{
    ArchiveLogEntry, ArchivedTicket, Attachment, HistoryEntry, Message, Notification, Profile,
    Ticket,
};

/// Columns shared by `tickets` and `ticket_archives`, in SELECT order.
pub(crate) const TICKET_COLUMNS: &str = "id, package_number, case_reference, client_address, \
     circuit, complaint_type, motive, submitted_at, due_before, driver_return_date, \
     remark, requested_action, status, priority, closed_at, version, created_by, \
     assigned_to, created_at, updated_at";

/// Parse a stored enum string, reporting failures as column conversion errors.
pub(crate) fn parse_enum<T>(idx: usize, raw: &str) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn ticket_from_row(row: &Row<'_>) -> rusqlite::Result<Ticket> {
    let complaint_type: String = row.get(5)?;
    let status: String = row.get(12)?;
    let priority: String = row.get(13)?;
    Ok(Ticket {
        id: row.get(0)?,
        package_number: row.get(1)?,
        case_reference: row.get(2)?,
        client_address: row.get(3)?,
        circuit: row.get(4)?,
        complaint_type: parse_enum(5, &complaint_type)?,
        motive: row.get(6)?,
        submitted_at: row.get(7)?,
        due_before: row.get(8)?,
        driver_return_date: row.get(9)?,
        remark: row.get(10)?,
        requested_action: row.get(11)?,
        status: parse_enum(12, &status)?,
        priority: parse_enum(13, &priority)?,
        closed_at: row.get(14)?,
        version: row.get(15)?,
        created_by: row.get(16)?,
        assigned_to: row.get(17)?,
        created_at: row.get(18)?,
        updated_at: row.get(19)?,
    })
}

/// Maps a `ticket_archives` row: the ticket columns followed by `archived_at`.
pub(crate) fn archived_ticket_from_row(row: &Row<'_>) -> rusqlite::Result<ArchivedTicket> {
    Ok(ArchivedTicket {
        ticket: ticket_from_row(row)?,
        archived_at: row.get(20)?,
    })
}

pub(crate) fn profile_from_row(row: &Row<'_>) -> rusqlite::Result<Profile> {
    let role: String = row.get(3)?;
    Ok(Profile {
        id: row.get(0)?,
        email: row.get(1)?,
        full_name: row.get(2)?,
        role: parse_enum(3, &role)?,
        circuit: row.get(4)?,
        phone: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

pub(crate) fn message_from_row(row: &Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        seq: row.get(0)?,
        id: row.get(1)?,
        ticket_id: row.get(2)?,
        author_id: row.get(3)?,
        body: row.get(4)?,
        created_at: row.get(5)?,
    })
}

pub(crate) fn attachment_from_row(row: &Row<'_>) -> rusqlite::Result<Attachment> {
    Ok(Attachment {
        id: row.get(0)?,
        ticket_id: row.get(1)?,
        file_name: row.get(2)?,
        storage_locator: row.get(3)?,
        mime_type: row.get(4)?,
        size_bytes: row.get(5)?,
        uploaded_by: row.get(6)?,
        created_at: row.get(7)?,
    })
}

pub(crate) fn history_from_row(row: &Row<'_>) -> rusqlite::Result<HistoryEntry> {
    let actor_role: Option<String> = row.get(3)?;
    let action: String = row.get(4)?;
    Ok(HistoryEntry {
        id: row.get(0)?,
        ticket_id: row.get(1)?,
        actor_id: row.get(2)?,
        actor_role: actor_role.as_deref().map(|r| parse_enum(3, r)).transpose()?,
        action: parse_enum(4, &action)?,
        field: row.get(5)?,
        old_value: row.get(6)?,
        new_value: row.get(7)?,
        created_at: row.get(8)?,
    })
}

pub(crate) fn notification_from_row(row: &Row<'_>) -> rusqlite::Result<Notification> {
    let kind: String = row.get(3)?;
    Ok(Notification {
        id: row.get(0)?,
        user_id: row.get(1)?,
        ticket_id: row.get(2)?,
        kind: parse_enum(3, &kind)?,
        body: row.get(4)?,
        is_read: row.get(5)?,
        created_at: row.get(6)?,
    })
}

pub(crate) fn archive_log_from_row(row: &Row<'_>) -> rusqlite::Result<ArchiveLogEntry> {
    Ok(ArchiveLogEntry {
        id: row.get(0)?,
        action: row.get(1)?,
        ticket_id: row.get(2)?,
        package_number: row.get(3)?,
        case_reference: row.get(4)?,
        circuit: row.get(5)?,
        closed_at: row.get(6)?,
        created_at: row.get(7)?,
    })
}
