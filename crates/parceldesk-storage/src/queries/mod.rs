// SPDX-FileCopyrightText: 2026 Parceldesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for CRUD operations on storage entities.

pub mod archive;
pub mod attachments;
pub mod history;
pub mod messages;
pub mod notifications;
pub mod profiles;
pub(crate) mod rows;
pub mod stats;
pub mod tickets;
