// SPDX-FileCopyrightText: 2026 Parceldesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence trait for the ticket store.
//!
//! Mutating operations accept the history entries and notifications to be
//! written in the same transaction, so the activity trail cannot be bypassed
//! by any caller that mutates a ticket.

use async_trait::async_trait;

use crate::error::DeskError;
use crate::types::{
    ArchiveLogEntry, ArchiveStats, ArchivedTicket, Attachment, HistoryEntry, Message,
    NewHistoryEntry, NewNotification, Notification, Profile, StatusTallies, Ticket, TicketFilter,
    UpdateOutcome,
};

/// Storage backend for tickets, messages, attachments, profiles,
/// notifications, history, and the archive.
#[async_trait]
pub trait TicketStore: Send + Sync {
    // --- Tickets ---

    /// Insert a ticket with its `created` history entry and any
    /// notifications, atomically.
    async fn create_ticket(
        &self,
        ticket: &Ticket,
        history: NewHistoryEntry,
        notifications: Vec<NewNotification>,
    ) -> Result<(), DeskError>;

    async fn get_ticket(&self, id: &str) -> Result<Option<Ticket>, DeskError>;

    async fn list_tickets(&self, filter: &TicketFilter) -> Result<Vec<Ticket>, DeskError>;

    /// Write the full updated row conditionally on `expected_version`,
    /// together with its history entries and notifications. The caller has
    /// already bumped `updated.version` to `expected_version + 1`.
    async fn update_ticket(
        &self,
        updated: &Ticket,
        expected_version: i64,
        history: Vec<NewHistoryEntry>,
        notifications: Vec<NewNotification>,
    ) -> Result<UpdateOutcome, DeskError>;

    // --- Messages ---

    /// Append an immutable message with its history entry and notifications,
    /// atomically. Returns the stored message with its insertion sequence.
    async fn append_message(
        &self,
        message: &Message,
        history: NewHistoryEntry,
        notifications: Vec<NewNotification>,
    ) -> Result<Message, DeskError>;

    /// Messages for a ticket, ordered by `(created_at, seq)` ascending.
    async fn messages_for_ticket(&self, ticket_id: &str) -> Result<Vec<Message>, DeskError>;

    // --- Attachments ---

    async fn insert_attachment(
        &self,
        attachment: &Attachment,
        history: NewHistoryEntry,
        notifications: Vec<NewNotification>,
    ) -> Result<(), DeskError>;

    async fn attachments_for_ticket(&self, ticket_id: &str)
    -> Result<Vec<Attachment>, DeskError>;

    // --- History ---

    /// History entries for a ticket, chronological.
    async fn history_for_ticket(&self, ticket_id: &str) -> Result<Vec<HistoryEntry>, DeskError>;

    // --- Profiles ---

    async fn create_profile(&self, profile: &Profile) -> Result<(), DeskError>;

    async fn get_profile(&self, id: &str) -> Result<Option<Profile>, DeskError>;

    async fn list_profiles(&self) -> Result<Vec<Profile>, DeskError>;

    // --- Notifications ---

    async fn notifications_for_user(
        &self,
        user_id: &str,
        unread_only: bool,
    ) -> Result<Vec<Notification>, DeskError>;

    /// Count of unread notifications. Derived state; never negative.
    async fn unread_count(&self, user_id: &str) -> Result<i64, DeskError>;

    /// Mark every notification for the user as read. Idempotent; returns the
    /// number of rows flipped.
    async fn mark_all_read(&self, user_id: &str) -> Result<u64, DeskError>;

    /// Mark the user's notifications for one ticket as read. Idempotent.
    async fn mark_ticket_read(&self, user_id: &str, ticket_id: &str) -> Result<u64, DeskError>;

    // --- Archive ---

    /// Ids of active tickets whose latest closure is at or before `cutoff`.
    async fn archive_candidates(&self, cutoff: &str) -> Result<Vec<String>, DeskError>;

    /// Move one ticket into the archive in a single transaction: copy the
    /// full field set, append one archive log row, delete the active row.
    /// The full candidate predicate, `cutoff` included, is re-checked inside
    /// the transaction; returns `false` if the ticket no longer qualifies
    /// (reopened, re-closed after the cutoff, or gone).
    async fn archive_ticket(
        &self,
        id: &str,
        archived_at: &str,
        cutoff: &str,
    ) -> Result<bool, DeskError>;

    /// Archived tickets, newest archival first.
    async fn list_archived(&self) -> Result<Vec<ArchivedTicket>, DeskError>;

    async fn get_archived(&self, id: &str) -> Result<Option<ArchivedTicket>, DeskError>;

    /// Archive log entries, newest first, capped at `limit`.
    async fn archive_log(&self, limit: i64) -> Result<Vec<ArchiveLogEntry>, DeskError>;

    async fn archive_stats(&self) -> Result<ArchiveStats, DeskError>;

    // --- Reporting ---

    /// Status tallies over the active store; `now` fixes the overdue cutoff.
    async fn status_tallies(&self, now: &str) -> Result<StatusTallies, DeskError>;
}
