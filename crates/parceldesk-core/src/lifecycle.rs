// SPDX-FileCopyrightText: 2026 Parceldesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ticket lifecycle state machine.
//!
//! The transition rules are a small fixed enumeration, evaluated as a pure
//! function so the service layer can decide the effect before touching the
//! store. `cancelled` is a dead end; `closed` can be reopened, in which case
//! archival age is measured from the next closure, not the first.

use crate::error::DeskError;
use crate::types::TicketStatus;

/// The planned effect of a status transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionPlan {
    /// Requested status equals the current one. Nothing changes; in
    /// particular, re-closing a closed ticket must not move `closed_at`.
    NoOp,
    /// `pending -> in_progress`.
    Start,
    /// `pending|in_progress -> closed`; stamps `closed_at`.
    Close,
    /// `closed -> in_progress`; clears `closed_at`.
    Reopen,
    /// Any non-cancelled state `-> cancelled`. Administrative action.
    Cancel,
}

/// Decide the effect of moving a ticket from `current` to `requested`.
///
/// Returns [`DeskError::Validation`] for transitions outside the fixed set.
pub fn plan(current: TicketStatus, requested: TicketStatus) -> Result<TransitionPlan, DeskError> {
    use TicketStatus::*;

    if current == requested {
        return Ok(TransitionPlan::NoOp);
    }
    match (current, requested) {
        (Cancelled, _) => Err(invalid(current, requested)),
        (_, Cancelled) => Ok(TransitionPlan::Cancel),
        (Pending, InProgress) => Ok(TransitionPlan::Start),
        (Pending, Closed) | (InProgress, Closed) => Ok(TransitionPlan::Close),
        (Closed, InProgress) => Ok(TransitionPlan::Reopen),
        _ => Err(invalid(current, requested)),
    }
}

fn invalid(current: TicketStatus, requested: TicketStatus) -> DeskError {
    DeskError::Validation(format!(
        "invalid status transition: {current} -> {requested}"
    ))
}
