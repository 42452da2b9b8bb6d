// SPDX-FileCopyrightText: 2026 Parceldesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Parceldesk complaint-ticket system.
//!
//! This crate provides the error taxonomy, domain model types, the ticket
//! lifecycle state machine, and the trait seams (`Clock`, `TicketStore`)
//! used throughout the Parceldesk workspace.

pub mod error;
pub mod lifecycle;
pub mod time;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::DeskError;
pub use traits::{Clock, SystemClock, TicketStore};
pub use types::{Principal, Priority, Role, Ticket, TicketStatus};
