// SPDX-FileCopyrightText: 2026 Parceldesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the core and its collaborators.

pub mod clock;
pub mod store;

pub use clock::{Clock, SystemClock};
pub use store::TicketStore;
