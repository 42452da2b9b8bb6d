// SPDX-FileCopyrightText: 2026 Parceldesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the `TicketStore` trait.

use async_trait::async_trait;
use tracing::debug;

use parceldesk_config::model::StorageConfig;
use parceldesk_core::{DeskError, TicketStore};

use crate::database::Database;
use crate::models::{
    ArchiveLogEntry, ArchiveStats, ArchivedTicket, Attachment, HistoryEntry, Message,
    NewHistoryEntry, NewNotification, Notification, Profile, StatusTallies, Ticket, TicketFilter,
    UpdateOutcome,
};
use crate::queries;

/// SQLite-backed ticket store.
///
/// Wraps a [`Database`] handle and delegates all operations to the typed
/// query modules.
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    /// Open the database at the configured path, running migrations.
    pub async fn open(config: &StorageConfig) -> Result<Self, DeskError> {
        let db = Database::open_with_options(&config.database_path, config.wal_mode).await?;
        debug!(path = %config.database_path, "ticket store opened");
        Ok(Self { db })
    }

    /// Checkpoint and close the underlying connection.
    pub async fn close(self) -> Result<(), DeskError> {
        self.db.close().await
    }
}

#[async_trait]
impl TicketStore for SqliteStore {
    async fn create_ticket(
        &self,
        ticket: &Ticket,
        history: NewHistoryEntry,
        notifications: Vec<NewNotification>,
    ) -> Result<(), DeskError> {
        queries::tickets::insert_ticket(&self.db, ticket, history, notifications).await
    }

    async fn get_ticket(&self, id: &str) -> Result<Option<Ticket>, DeskError> {
        queries::tickets::get_ticket(&self.db, id).await
    }

    async fn list_tickets(&self, filter: &TicketFilter) -> Result<Vec<Ticket>, DeskError> {
        queries::tickets::list_tickets(&self.db, filter).await
    }

    async fn update_ticket(
        &self,
        updated: &Ticket,
        expected_version: i64,
        history: Vec<NewHistoryEntry>,
        notifications: Vec<NewNotification>,
    ) -> Result<UpdateOutcome, DeskError> {
        queries::tickets::update_ticket(&self.db, updated, expected_version, history, notifications)
            .await
    }

    async fn append_message(
        &self,
        message: &Message,
        history: NewHistoryEntry,
        notifications: Vec<NewNotification>,
    ) -> Result<Message, DeskError> {
        queries::messages::append_message(&self.db, message, history, notifications).await
    }

    async fn messages_for_ticket(&self, ticket_id: &str) -> Result<Vec<Message>, DeskError> {
        queries::messages::messages_for_ticket(&self.db, ticket_id).await
    }

    async fn insert_attachment(
        &self,
        attachment: &Attachment,
        history: NewHistoryEntry,
        notifications: Vec<NewNotification>,
    ) -> Result<(), DeskError> {
        queries::attachments::insert_attachment(&self.db, attachment, history, notifications).await
    }

    async fn attachments_for_ticket(
        &self,
        ticket_id: &str,
    ) -> Result<Vec<Attachment>, DeskError> {
        queries::attachments::attachments_for_ticket(&self.db, ticket_id).await
    }

    async fn history_for_ticket(&self, ticket_id: &str) -> Result<Vec<HistoryEntry>, DeskError> {
        queries::history::history_for_ticket(&self.db, ticket_id).await
    }

    async fn create_profile(&self, profile: &Profile) -> Result<(), DeskError> {
        queries::profiles::create_profile(&self.db, profile).await
    }

    async fn get_profile(&self, id: &str) -> Result<Option<Profile>, DeskError> {
        queries::profiles::get_profile(&self.db, id).await
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>, DeskError> {
        queries::profiles::list_profiles(&self.db).await
    }

    async fn notifications_for_user(
        &self,
        user_id: &str,
        unread_only: bool,
    ) -> Result<Vec<Notification>, DeskError> {
        queries::notifications::notifications_for_user(&self.db, user_id, unread_only).await
    }

    async fn unread_count(&self, user_id: &str) -> Result<i64, DeskError> {
        queries::notifications::unread_count(&self.db, user_id).await
    }

    async fn mark_all_read(&self, user_id: &str) -> Result<u64, DeskError> {
        queries::notifications::mark_all_read(&self.db, user_id).await
    }

    async fn mark_ticket_read(&self, user_id: &str, ticket_id: &str) -> Result<u64, DeskError> {
        queries::notifications::mark_ticket_read(&self.db, user_id, ticket_id).await
    }

    async fn archive_candidates(&self, cutoff: &str) -> Result<Vec<String>, DeskError> {
        queries::archive::archive_candidates(&self.db, cutoff).await
    }

    async fn archive_ticket(
        &self,
        id: &str,
        archived_at: &str,
        cutoff: &str,
    ) -> Result<bool, DeskError> {
        queries::archive::archive_ticket(&self.db, id, archived_at, cutoff).await
    }

    async fn list_archived(&self) -> Result<Vec<ArchivedTicket>, DeskError> {
        queries::archive::list_archived(&self.db).await
    }

    async fn get_archived(&self, id: &str) -> Result<Option<ArchivedTicket>, DeskError> {
        queries::archive::get_archived(&self.db, id).await
    }

    async fn archive_log(&self, limit: i64) -> Result<Vec<ArchiveLogEntry>, DeskError> {
        queries::archive::archive_log(&self.db, limit).await
    }

    async fn archive_stats(&self) -> Result<ArchiveStats, DeskError> {
        queries::archive::archive_stats(&self.db).await
    }

    async fn status_tallies(&self, now: &str) -> Result<StatusTallies, DeskError> {
        queries::stats::status_tallies(&self.db, now).await
    }
}
