// SPDX-FileCopyrightText: 2026 Parceldesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ticket service for Parceldesk.
//!
//! [`TicketService`] is the single entry point for every ticket mutation:
//! it validates input, enforces role/circuit authorization, plans lifecycle
//! transitions, and hands the store the history entries and notifications
//! to write in the same transaction as the mutation itself.

pub mod service;

pub use service::TicketService;
