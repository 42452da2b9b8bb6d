// SPDX-FileCopyrightText: 2026 Parceldesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Parceldesk integration tests.
//!
//! This crate provides shared testing infrastructure:
//!
//! - [`ManualClock`]: a settable [`parceldesk_core::Clock`] so tests can
//!   advance simulated time instead of waiting out retention windows
//! - [`TestHarness`]: a complete desk stack (temp SQLite store, channel
//!   registry, ticket service, archive engine) with seeded profiles

pub mod clock;
pub mod harness;

pub use clock::ManualClock;
pub use harness::{TestHarness, TestHarnessBuilder};
