// SPDX-FileCopyrightText: 2026 Parceldesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types shared across the Parceldesk workspace.
//!
//! All timestamps are RFC 3339 strings in UTC with millisecond precision
//! (see [`crate::time`]), which makes them directly comparable both in Rust
//! and in SQL.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Lowest recognized delivery circuit number.
pub const CIRCUIT_MIN: u16 = 541;
/// Highest recognized delivery circuit number.
pub const CIRCUIT_MAX: u16 = 549;

/// Returns true if `circuit` is one of the recognized delivery routes.
pub fn circuit_is_recognized(circuit: u16) -> bool {
    (CIRCUIT_MIN..=CIRCUIT_MAX).contains(&circuit)
}

/// Role of an authenticated actor.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Driver,
}

/// Lifecycle status of a ticket.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Pending,
    InProgress,
    Closed,
    Cancelled,
}

/// Ticket priority level.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Normal,
    High,
    Urgent,
}

/// Category of a delivery complaint.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ComplaintType {
    Local,
    National,
    International,
    ReturnToSender,
}

/// Kind of a user notification.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Created,
    Assigned,
    Updated,
    Closed,
    Message,
}

/// Action recorded in the activity history.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    Created,
    StatusChanged,
    PriorityChanged,
    FieldUpdated,
    Assigned,
    MessageSent,
    DocumentUploaded,
}

/// An authenticated actor, passed explicitly into every core operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: String,
    pub name: String,
    pub role: Role,
    /// Circuit assignment; set for drivers, `None` for administrators.
    pub circuit: Option<u16>,
}

impl Principal {
    /// Returns true for administrators.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// A user profile. The id is shared with the external identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub circuit: Option<u16>,
    pub phone: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Profile {
    /// Derive the [`Principal`] acting on behalf of this profile.
    pub fn principal(&self) -> Principal {
        Principal {
            id: self.id.clone(),
            name: self.full_name.clone(),
            role: self.role,
            circuit: self.circuit,
        }
    }
}

/// A delivery complaint ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: String,
    pub package_number: String,
    pub case_reference: String,
    pub client_address: Option<String>,
    pub circuit: u16,
    pub complaint_type: ComplaintType,
    pub motive: String,
    pub submitted_at: String,
    pub due_before: String,
    pub driver_return_date: Option<String>,
    pub remark: Option<String>,
    pub requested_action: Option<String>,
    pub status: TicketStatus,
    pub priority: Priority,
    /// Timestamp of the most recent closure; cleared on reopen.
    pub closed_at: Option<String>,
    /// Monotonic version counter; every mutation bumps it by one.
    pub version: i64,
    pub created_by: Option<String>,
    pub assigned_to: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Input for creating a new ticket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTicket {
    pub package_number: String,
    pub case_reference: String,
    #[serde(default)]
    pub client_address: Option<String>,
    pub circuit: u16,
    pub complaint_type: ComplaintType,
    pub motive: String,
    pub submitted_at: String,
    pub due_before: String,
    #[serde(default)]
    pub driver_return_date: Option<String>,
    #[serde(default)]
    pub remark: Option<String>,
    #[serde(default)]
    pub requested_action: Option<String>,
    #[serde(default = "default_priority")]
    pub priority: Priority,
    #[serde(default)]
    pub assigned_to: Option<String>,
}

fn default_priority() -> Priority {
    Priority::Normal
}

/// Partial update of mutable ticket fields. `None` means "leave unchanged".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TicketPatch {
    #[serde(default)]
    pub package_number: Option<String>,
    #[serde(default)]
    pub case_reference: Option<String>,
    #[serde(default)]
    pub client_address: Option<String>,
    #[serde(default)]
    pub motive: Option<String>,
    #[serde(default)]
    pub due_before: Option<String>,
    #[serde(default)]
    pub driver_return_date: Option<String>,
    #[serde(default)]
    pub remark: Option<String>,
    #[serde(default)]
    pub requested_action: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub assigned_to: Option<String>,
}

/// Filter for ticket listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TicketFilter {
    #[serde(default)]
    pub status: Option<TicketStatus>,
    #[serde(default)]
    pub circuit: Option<u16>,
    /// Free-text match over package number, case reference, and address.
    #[serde(default)]
    pub query: Option<String>,
}

/// A chat message on a ticket thread. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Insertion sequence number; breaks ordering ties between equal timestamps.
    pub seq: i64,
    pub id: String,
    pub ticket_id: String,
    pub author_id: String,
    pub body: String,
    pub created_at: String,
}

/// A realtime event carrying a newly posted message.
///
/// Self-contained by design: the author's display name and role are resolved
/// at emission time so consumers never need a follow-up lookup to render it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEvent {
    pub message: Message,
    pub author_name: String,
    pub author_role: Role,
}

/// Metadata record for an uploaded file. The bytes live in external blob
/// storage; only the opaque locator is kept here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: String,
    pub ticket_id: String,
    pub file_name: String,
    pub storage_locator: String,
    pub mime_type: String,
    pub size_bytes: Option<i64>,
    pub uploaded_by: Option<String>,
    pub created_at: String,
}

/// Input for recording an attachment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAttachment {
    pub file_name: String,
    pub storage_locator: String,
    pub mime_type: String,
    #[serde(default)]
    pub size_bytes: Option<i64>,
}

/// An entry in a ticket's activity history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub ticket_id: String,
    pub actor_id: Option<String>,
    pub actor_role: Option<Role>,
    pub action: HistoryAction,
    pub field: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub created_at: String,
}

/// A history entry to be written alongside a mutation.
#[derive(Debug, Clone)]
pub struct NewHistoryEntry {
    pub ticket_id: String,
    pub actor_id: Option<String>,
    pub actor_role: Option<Role>,
    pub action: HistoryAction,
    pub field: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

impl NewHistoryEntry {
    /// History entry with no field detail (created, message_sent, ...).
    pub fn action(principal: &Principal, ticket_id: &str, action: HistoryAction) -> Self {
        Self {
            ticket_id: ticket_id.to_string(),
            actor_id: Some(principal.id.clone()),
            actor_role: Some(principal.role),
            action,
            field: None,
            old_value: None,
            new_value: None,
        }
    }

    /// History entry recording a before/after change of one field.
    pub fn change(
        principal: &Principal,
        ticket_id: &str,
        action: HistoryAction,
        field: &str,
        old_value: Option<String>,
        new_value: Option<String>,
    ) -> Self {
        Self {
            ticket_id: ticket_id.to_string(),
            actor_id: Some(principal.id.clone()),
            actor_role: Some(principal.role),
            action,
            field: Some(field.to_string()),
            old_value,
            new_value,
        }
    }
}

/// A notification row for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub user_id: String,
    pub ticket_id: String,
    pub kind: NotificationKind,
    pub body: String,
    pub is_read: bool,
    pub created_at: String,
}

/// A notification to be written alongside a mutation.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: String,
    pub ticket_id: String,
    pub kind: NotificationKind,
    pub body: String,
}

/// A ticket moved out of the active store by the archival engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchivedTicket {
    #[serde(flatten)]
    pub ticket: Ticket,
    pub archived_at: String,
}

/// Audit row written when a ticket is archived. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveLogEntry {
    pub id: i64,
    pub action: String,
    pub ticket_id: String,
    pub package_number: String,
    pub case_reference: String,
    pub circuit: u16,
    pub closed_at: String,
    pub created_at: String,
}

/// Aggregate statistics over the archive store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveStats {
    pub total: i64,
    pub circuits: i64,
    pub first_archived_at: Option<String>,
    pub last_archived_at: Option<String>,
}

/// Status tallies over the active store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusTallies {
    pub total: i64,
    pub pending: i64,
    pub in_progress: i64,
    pub closed: i64,
    pub cancelled: i64,
    /// Not closed and past their due-before date.
    pub overdue: i64,
}

/// Result of a conditional ticket update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The row was updated and the version bumped.
    Applied,
    /// No row with that id exists.
    Missing,
    /// The row exists but its version no longer matches.
    VersionMismatch { actual: i64 },
}
