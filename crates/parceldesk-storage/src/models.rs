// SPDX-FileCopyrightText: 2026 Parceldesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities.
//!
//! The canonical types are defined in `parceldesk-core::types` for use
//! across the `TicketStore` trait boundary. This module re-exports them for
//! convenience within the storage crate.

pub use parceldesk_core::types::{
    ArchiveLogEntry, ArchiveStats, ArchivedTicket, Attachment, ComplaintType, HistoryAction,
    HistoryEntry, Message, NewAttachment, NewHistoryEntry, NewNotification, Notification,
    NotificationKind, Principal, Priority, Profile, Role, StatusTallies, Ticket, TicketFilter,
    TicketStatus, UpdateOutcome,
};
