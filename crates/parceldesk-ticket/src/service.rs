// SPDX-FileCopyrightText: 2026 Parceldesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The ticket service.
//!
//! Authorization model: administrators see every ticket; drivers see the
//! tickets of their own circuit. Denials use the fixed `access denied`
//! message so a caller cannot distinguish a hidden ticket from a missing
//! one by probing.
//!
//! Every mutation is conditional on the version the caller read
//! (`expected_version`); a concurrent writer surfaces as
//! [`DeskError::Conflict`] and the caller re-reads and retries.

use std::sync::Arc;

use tracing::{debug, info};

use parceldesk_channel::TicketChannels;
use parceldesk_core::lifecycle::{self, TransitionPlan};
use parceldesk_core::time::normalize_timestamp;
use parceldesk_core::types::{
    circuit_is_recognized, ArchiveLogEntry, ArchiveStats, ArchivedTicket, Attachment,
    HistoryAction, HistoryEntry, Message, MessageEvent, NewAttachment, NewHistoryEntry,
    NewNotification, NewTicket, Notification, NotificationKind, Profile, StatusTallies,
    TicketFilter, TicketPatch, UpdateOutcome,
};
use parceldesk_core::{Clock, DeskError, Principal, Ticket, TicketStatus, TicketStore};

/// Orchestrates ticket operations over a [`TicketStore`], publishing
/// realtime events through [`TicketChannels`].
pub struct TicketService {
    store: Arc<dyn TicketStore>,
    channels: Arc<TicketChannels>,
    clock: Arc<dyn Clock>,
}

impl TicketService {
    pub fn new(
        store: Arc<dyn TicketStore>,
        channels: Arc<TicketChannels>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            channels,
            clock,
        }
    }

    /// The realtime fan-out registry, for WS subscription handling.
    pub fn channels(&self) -> &Arc<TicketChannels> {
        &self.channels
    }

    // --- Principals and profiles ---

    /// Resolve the acting principal from a profile id.
    pub async fn resolve_principal(&self, actor_id: &str) -> Result<Principal, DeskError> {
        let profile = self
            .store
            .get_profile(actor_id)
            .await?
            .ok_or_else(|| DeskError::profile_not_found(actor_id))?;
        Ok(profile.principal())
    }

    /// Register a profile. Administrative.
    pub async fn create_profile(
        &self,
        principal: &Principal,
        profile: &Profile,
    ) -> Result<(), DeskError> {
        if !principal.is_admin() {
            return Err(DeskError::Unauthorized);
        }
        self.store.create_profile(profile).await
    }

    pub async fn get_profile(&self, id: &str) -> Result<Option<Profile>, DeskError> {
        self.store.get_profile(id).await
    }

    /// All profiles. Administrative.
    pub async fn list_profiles(&self, principal: &Principal) -> Result<Vec<Profile>, DeskError> {
        if !principal.is_admin() {
            return Err(DeskError::Unauthorized);
        }
        self.store.list_profiles().await
    }

    // --- Tickets ---

    /// Create a ticket. Drivers may only file against their own circuit.
    pub async fn create_ticket(
        &self,
        principal: &Principal,
        input: NewTicket,
    ) -> Result<Ticket, DeskError> {
        let package_number = required_field(&input.package_number, "package_number")?;
        let case_reference = required_field(&input.case_reference, "case_reference")?;
        let motive = required_field(&input.motive, "motive")?;
        if !circuit_is_recognized(input.circuit) {
            return Err(DeskError::Validation(format!(
                "unrecognized circuit: {}",
                input.circuit
            )));
        }
        if !principal.is_admin() && principal.circuit != Some(input.circuit) {
            return Err(DeskError::Unauthorized);
        }
        let submitted_at = normalize_timestamp(&input.submitted_at)?;
        let due_before = normalize_timestamp(&input.due_before)?;
        if due_before < submitted_at {
            return Err(DeskError::Validation(
                "due_before precedes submitted_at".into(),
            ));
        }
        if let Some(assignee) = &input.assigned_to {
            self.store
                .get_profile(assignee)
                .await?
                .ok_or_else(|| DeskError::profile_not_found(assignee))?;
        }

        let now = self.clock.now_timestamp();
        let ticket = Ticket {
            id: uuid::Uuid::new_v4().to_string(),
            package_number,
            case_reference,
            client_address: input.client_address,
            circuit: input.circuit,
            complaint_type: input.complaint_type,
            motive,
            submitted_at,
            due_before,
            driver_return_date: input.driver_return_date,
            remark: input.remark,
            requested_action: input.requested_action,
            status: TicketStatus::Pending,
            priority: input.priority,
            closed_at: None,
            version: 0,
            created_by: Some(principal.id.clone()),
            assigned_to: input.assigned_to,
            created_at: now.clone(),
            updated_at: now,
        };

        let history = NewHistoryEntry::action(principal, &ticket.id, HistoryAction::Created);
        let notifications = notify_recipients(
            &ticket,
            principal,
            NotificationKind::Created,
            format!("ticket {} created", ticket.case_reference),
        );
        self.store
            .create_ticket(&ticket, history, notifications)
            .await?;
        info!(ticket_id = %ticket.id, actor = %principal.id, "ticket created");
        Ok(ticket)
    }

    /// Fetch a ticket the principal is entitled to see.
    pub async fn get_ticket(&self, principal: &Principal, id: &str) -> Result<Ticket, DeskError> {
        let ticket = self
            .store
            .get_ticket(id)
            .await?
            .ok_or_else(|| DeskError::ticket_not_found(id))?;
        ensure_access(principal, &ticket)?;
        Ok(ticket)
    }

    /// List tickets. Drivers are confined to their own circuit regardless of
    /// the filter they pass.
    pub async fn list_tickets(
        &self,
        principal: &Principal,
        mut filter: TicketFilter,
    ) -> Result<Vec<Ticket>, DeskError> {
        if !principal.is_admin() {
            let Some(circuit) = principal.circuit else {
                return Err(DeskError::Unauthorized);
            };
            filter.circuit = Some(circuit);
        }
        self.store.list_tickets(&filter).await
    }

    /// Apply a partial update to a ticket's mutable fields.
    ///
    /// Each changed field produces its own history entry. A patch that
    /// changes nothing returns the ticket unchanged, without a version bump.
    pub async fn update_fields(
        &self,
        principal: &Principal,
        id: &str,
        patch: TicketPatch,
        expected_version: i64,
    ) -> Result<Ticket, DeskError> {
        let current = self.get_ticket(principal, id).await?;
        let mut updated = current.clone();
        let mut history = Vec::new();

        apply_text_field(
            principal,
            &mut updated.package_number,
            patch.package_number,
            "package_number",
            id,
            &mut history,
        )?;
        apply_text_field(
            principal,
            &mut updated.case_reference,
            patch.case_reference,
            "case_reference",
            id,
            &mut history,
        )?;
        apply_opt_field(
            principal,
            &mut updated.client_address,
            patch.client_address,
            "client_address",
            id,
            &mut history,
        );
        apply_text_field(
            principal,
            &mut updated.motive,
            patch.motive,
            "motive",
            id,
            &mut history,
        )?;
        if let Some(due_before) = patch.due_before {
            let due_before = normalize_timestamp(&due_before)?;
            if due_before < updated.submitted_at {
                return Err(DeskError::Validation(
                    "due_before precedes submitted_at".into(),
                ));
            }
            if due_before != updated.due_before {
                history.push(NewHistoryEntry::change(
                    principal,
                    id,
                    HistoryAction::FieldUpdated,
                    "due_before",
                    Some(updated.due_before.clone()),
                    Some(due_before.clone()),
                ));
                updated.due_before = due_before;
            }
        }
        apply_opt_field(
            principal,
            &mut updated.driver_return_date,
            patch.driver_return_date,
            "driver_return_date",
            id,
            &mut history,
        );
        apply_opt_field(
            principal,
            &mut updated.remark,
            patch.remark,
            "remark",
            id,
            &mut history,
        );
        apply_opt_field(
            principal,
            &mut updated.requested_action,
            patch.requested_action,
            "requested_action",
            id,
            &mut history,
        );
        if let Some(priority) = patch.priority {
            if priority != updated.priority {
                history.push(NewHistoryEntry::change(
                    principal,
                    id,
                    HistoryAction::PriorityChanged,
                    "priority",
                    Some(updated.priority.to_string()),
                    Some(priority.to_string()),
                ));
                updated.priority = priority;
            }
        }
        let mut new_assignee = None;
        if let Some(assignee) = patch.assigned_to {
            if updated.assigned_to.as_deref() != Some(assignee.as_str()) {
                self.store
                    .get_profile(&assignee)
                    .await?
                    .ok_or_else(|| DeskError::profile_not_found(&assignee))?;
                history.push(NewHistoryEntry::change(
                    principal,
                    id,
                    HistoryAction::Assigned,
                    "assigned_to",
                    updated.assigned_to.clone(),
                    Some(assignee.clone()),
                ));
                updated.assigned_to = Some(assignee.clone());
                new_assignee = Some(assignee);
            }
        }

        if history.is_empty() {
            return Ok(current);
        }

        updated.version = expected_version + 1;
        updated.updated_at = self.clock.now_timestamp();

        let mut notifications = notify_recipients(
            &updated,
            principal,
            NotificationKind::Updated,
            format!("ticket {} updated", updated.case_reference),
        );
        if let Some(assignee) = new_assignee {
            if assignee != principal.id {
                notifications.push(NewNotification {
                    user_id: assignee,
                    ticket_id: id.to_string(),
                    kind: NotificationKind::Assigned,
                    body: format!("ticket {} assigned to you", updated.case_reference),
                });
            }
        }

        self.commit_update(&updated, expected_version, history, notifications)
            .await?;
        debug!(ticket_id = %id, actor = %principal.id, version = updated.version, "fields updated");
        Ok(updated)
    }

    /// Request a status transition.
    ///
    /// Same-state requests are no-ops: the ticket is returned unchanged and
    /// in particular re-closing does not move `closed_at`. Cancellation is
    /// restricted to administrators.
    pub async fn set_status(
        &self,
        principal: &Principal,
        id: &str,
        requested: TicketStatus,
        expected_version: i64,
    ) -> Result<Ticket, DeskError> {
        let current = self.get_ticket(principal, id).await?;
        let plan = lifecycle::plan(current.status, requested)?;

        let mut updated = current.clone();
        match plan {
            TransitionPlan::NoOp => return Ok(current),
            TransitionPlan::Start => {}
            TransitionPlan::Close => {
                updated.closed_at = Some(self.clock.now_timestamp());
            }
            TransitionPlan::Reopen => {
                updated.closed_at = None;
            }
            TransitionPlan::Cancel => {
                if !principal.is_admin() {
                    return Err(DeskError::Unauthorized);
                }
            }
        }
        updated.status = requested;
        updated.version = expected_version + 1;
        updated.updated_at = self.clock.now_timestamp();

        let history = vec![NewHistoryEntry::change(
            principal,
            id,
            HistoryAction::StatusChanged,
            "status",
            Some(current.status.to_string()),
            Some(requested.to_string()),
        )];
        let kind = if plan == TransitionPlan::Close {
            NotificationKind::Closed
        } else {
            NotificationKind::Updated
        };
        let notifications = notify_recipients(
            &updated,
            principal,
            kind,
            format!("ticket {} is now {}", updated.case_reference, requested),
        );

        self.commit_update(&updated, expected_version, history, notifications)
            .await?;
        info!(
            ticket_id = %id,
            actor = %principal.id,
            from = %current.status,
            to = %requested,
            "status changed"
        );
        Ok(updated)
    }

    // --- Messages ---

    /// Append a message to the ticket thread and publish it to live
    /// subscribers after the transaction commits.
    pub async fn post_message(
        &self,
        principal: &Principal,
        ticket_id: &str,
        body: &str,
    ) -> Result<Message, DeskError> {
        let ticket = self.get_ticket(principal, ticket_id).await?;
        let body = body.trim();
        if body.is_empty() {
            return Err(DeskError::Validation("empty message body".into()));
        }

        let message = Message {
            seq: 0,
            id: uuid::Uuid::new_v4().to_string(),
            ticket_id: ticket_id.to_string(),
            author_id: principal.id.clone(),
            body: body.to_string(),
            created_at: self.clock.now_timestamp(),
        };
        let history = NewHistoryEntry::action(principal, ticket_id, HistoryAction::MessageSent);
        let notifications = notify_recipients(
            &ticket,
            principal,
            NotificationKind::Message,
            format!("new message on ticket {}", ticket.case_reference),
        );

        let stored = self
            .store
            .append_message(&message, history, notifications)
            .await?;

        let delivered = self.channels.publish(&MessageEvent {
            message: stored.clone(),
            author_name: principal.name.clone(),
            author_role: principal.role,
        });
        debug!(
            ticket_id,
            message_id = %stored.id,
            subscribers = delivered,
            "message posted"
        );
        Ok(stored)
    }

    /// The ticket's message thread in `(created_at, seq)` order.
    pub async fn messages(
        &self,
        principal: &Principal,
        ticket_id: &str,
    ) -> Result<Vec<Message>, DeskError> {
        self.get_ticket(principal, ticket_id).await?;
        self.store.messages_for_ticket(ticket_id).await
    }

    // --- Attachments ---

    /// Record the metadata of an externally uploaded file.
    pub async fn record_attachment(
        &self,
        principal: &Principal,
        ticket_id: &str,
        input: NewAttachment,
    ) -> Result<Attachment, DeskError> {
        let ticket = self.get_ticket(principal, ticket_id).await?;
        let file_name = required_field(&input.file_name, "file_name")?;
        let storage_locator = required_field(&input.storage_locator, "storage_locator")?;
        let mime_type = required_field(&input.mime_type, "mime_type")?;

        let attachment = Attachment {
            id: uuid::Uuid::new_v4().to_string(),
            ticket_id: ticket_id.to_string(),
            file_name: file_name.clone(),
            storage_locator,
            mime_type,
            size_bytes: input.size_bytes,
            uploaded_by: Some(principal.id.clone()),
            created_at: self.clock.now_timestamp(),
        };
        let history = NewHistoryEntry::change(
            principal,
            ticket_id,
            HistoryAction::DocumentUploaded,
            "attachment",
            None,
            Some(file_name.clone()),
        );
        let notifications = notify_recipients(
            &ticket,
            principal,
            NotificationKind::Updated,
            format!("document {file_name} added to ticket {}", ticket.case_reference),
        );
        self.store
            .insert_attachment(&attachment, history, notifications)
            .await?;
        Ok(attachment)
    }

    pub async fn attachments(
        &self,
        principal: &Principal,
        ticket_id: &str,
    ) -> Result<Vec<Attachment>, DeskError> {
        self.get_ticket(principal, ticket_id).await?;
        self.store.attachments_for_ticket(ticket_id).await
    }

    // --- History ---

    /// The ticket's activity trail in chronological order.
    pub async fn history(
        &self,
        principal: &Principal,
        ticket_id: &str,
    ) -> Result<Vec<HistoryEntry>, DeskError> {
        self.get_ticket(principal, ticket_id).await?;
        self.store.history_for_ticket(ticket_id).await
    }

    // --- Notifications ---

    pub async fn notifications(
        &self,
        principal: &Principal,
        unread_only: bool,
    ) -> Result<Vec<Notification>, DeskError> {
        self.store
            .notifications_for_user(&principal.id, unread_only)
            .await
    }

    pub async fn unread_count(&self, principal: &Principal) -> Result<i64, DeskError> {
        self.store.unread_count(&principal.id).await
    }

    pub async fn mark_all_read(&self, principal: &Principal) -> Result<u64, DeskError> {
        self.store.mark_all_read(&principal.id).await
    }

    pub async fn mark_ticket_read(
        &self,
        principal: &Principal,
        ticket_id: &str,
    ) -> Result<u64, DeskError> {
        self.store.mark_ticket_read(&principal.id, ticket_id).await
    }

    // --- Archive browsing (administrative) ---

    pub async fn list_archived(
        &self,
        principal: &Principal,
    ) -> Result<Vec<ArchivedTicket>, DeskError> {
        if !principal.is_admin() {
            return Err(DeskError::Unauthorized);
        }
        self.store.list_archived().await
    }

    pub async fn get_archived(
        &self,
        principal: &Principal,
        id: &str,
    ) -> Result<ArchivedTicket, DeskError> {
        if !principal.is_admin() {
            return Err(DeskError::Unauthorized);
        }
        self.store
            .get_archived(id)
            .await?
            .ok_or_else(|| DeskError::ticket_not_found(id))
    }

    pub async fn archive_log(
        &self,
        principal: &Principal,
        limit: i64,
    ) -> Result<Vec<ArchiveLogEntry>, DeskError> {
        if !principal.is_admin() {
            return Err(DeskError::Unauthorized);
        }
        self.store.archive_log(limit).await
    }

    pub async fn archive_stats(&self, principal: &Principal) -> Result<ArchiveStats, DeskError> {
        if !principal.is_admin() {
            return Err(DeskError::Unauthorized);
        }
        self.store.archive_stats().await
    }

    // --- Reporting ---

    /// Status tallies over the active store, as of the current clock.
    pub async fn status_tallies(&self) -> Result<StatusTallies, DeskError> {
        self.store
            .status_tallies(&self.clock.now_timestamp())
            .await
    }

    async fn commit_update(
        &self,
        updated: &Ticket,
        expected_version: i64,
        history: Vec<NewHistoryEntry>,
        notifications: Vec<NewNotification>,
    ) -> Result<(), DeskError> {
        match self
            .store
            .update_ticket(updated, expected_version, history, notifications)
            .await?
        {
            UpdateOutcome::Applied => Ok(()),
            UpdateOutcome::Missing => Err(DeskError::ticket_not_found(&updated.id)),
            UpdateOutcome::VersionMismatch { actual } => Err(DeskError::Conflict {
                expected: expected_version,
                actual,
            }),
        }
    }
}

/// Admins see everything; drivers see their own circuit.
fn ensure_access(principal: &Principal, ticket: &Ticket) -> Result<(), DeskError> {
    if principal.is_admin() || principal.circuit == Some(ticket.circuit) {
        Ok(())
    } else {
        Err(DeskError::Unauthorized)
    }
}

fn required_field(value: &str, name: &str) -> Result<String, DeskError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DeskError::Validation(format!("{name} must not be empty")));
    }
    Ok(trimmed.to_string())
}

/// One notification per ticket participant other than the actor.
fn notify_recipients(
    ticket: &Ticket,
    actor: &Principal,
    kind: NotificationKind,
    body: String,
) -> Vec<NewNotification> {
    let mut recipients: Vec<&String> = Vec::new();
    for candidate in [&ticket.created_by, &ticket.assigned_to] {
        if let Some(id) = candidate {
            if *id != actor.id && !recipients.contains(&id) {
                recipients.push(id);
            }
        }
    }
    recipients
        .into_iter()
        .map(|user_id| NewNotification {
            user_id: user_id.clone(),
            ticket_id: ticket.id.clone(),
            kind,
            body: body.clone(),
        })
        .collect()
}

fn apply_text_field(
    principal: &Principal,
    target: &mut String,
    patch: Option<String>,
    name: &'static str,
    ticket_id: &str,
    history: &mut Vec<NewHistoryEntry>,
) -> Result<(), DeskError> {
    if let Some(value) = patch {
        let value = required_field(&value, name)?;
        if value != *target {
            history.push(NewHistoryEntry::change(
                principal,
                ticket_id,
                HistoryAction::FieldUpdated,
                name,
                Some(target.clone()),
                Some(value.clone()),
            ));
            *target = value;
        }
    }
    Ok(())
}

fn apply_opt_field(
    principal: &Principal,
    target: &mut Option<String>,
    patch: Option<String>,
    name: &'static str,
    ticket_id: &str,
    history: &mut Vec<NewHistoryEntry>,
) {
    if let Some(value) = patch {
        if target.as_deref() != Some(value.as_str()) {
            history.push(NewHistoryEntry::change(
                principal,
                ticket_id,
                HistoryAction::FieldUpdated,
                name,
                target.clone(),
                Some(value.clone()),
            ));
            *target = Some(value);
        }
    }
}
