// SPDX-FileCopyrightText: 2026 Parceldesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A manually driven clock for deterministic tests.

use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use parceldesk_core::time::parse_timestamp;
use parceldesk_core::Clock;

/// A [`Clock`] that only moves when told to.
///
/// Archival eligibility depends on months of wall time having passed, so
/// tests set the clock explicitly instead of sleeping.
pub struct ManualClock(Mutex<DateTime<Utc>>);

impl ManualClock {
    /// Create a clock frozen at the given stored-format or date-only timestamp.
    ///
    /// # Panics
    ///
    /// Panics if `timestamp` does not parse; test fixtures use literals.
    pub fn at(timestamp: &str) -> Self {
        Self(Mutex::new(parse_timestamp(timestamp).unwrap()))
    }

    /// Move the clock forward (or backward, with a negative delta).
    pub fn advance(&self, delta: Duration) {
        *self.0.lock().unwrap() += delta;
    }

    /// Jump the clock to an absolute instant.
    pub fn set(&self, instant: DateTime<Utc>) {
        *self.0.lock().unwrap() = instant;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}
