// SPDX-FileCopyrightText: 2026 Parceldesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Parceldesk ticket system.

use thiserror::Error;

/// The primary error type used across all Parceldesk crates.
#[derive(Debug, Error)]
pub enum DeskError {
    /// Malformed or missing input (empty message body, unrecognized circuit,
    /// due-before earlier than submission, invalid status transition).
    #[error("validation error: {0}")]
    Validation(String),

    /// A referenced ticket, message, or profile does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The principal lacks the role or circuit entitlement for the target.
    ///
    /// Carries a fixed denial message so callers cannot learn whether the
    /// resource existed.
    #[error("access denied")]
    Unauthorized,

    /// A concurrent update changed the ticket since the caller read it.
    /// The caller must re-read and retry with the current version.
    #[error("version conflict: expected {expected}, found {actual}")]
    Conflict { expected: i64, actual: i64 },

    /// Storage backend errors (database connection, query failure, migration).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Transport or gateway errors (bind failure, upstream unavailable).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration errors (invalid TOML, missing required fields).
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DeskError {
    /// Shorthand for a [`DeskError::NotFound`] referencing a ticket.
    pub fn ticket_not_found(id: impl Into<String>) -> Self {
        DeskError::NotFound {
            entity: "ticket",
            id: id.into(),
        }
    }

    /// Shorthand for a [`DeskError::NotFound`] referencing a profile.
    pub fn profile_not_found(id: impl Into<String>) -> Self {
        DeskError::NotFound {
            entity: "profile",
            id: id.into(),
        }
    }
}
