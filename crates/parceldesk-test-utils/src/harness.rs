// SPDX-FileCopyrightText: 2026 Parceldesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles a complete desk stack: temp SQLite store, channel
//! registry, ticket service, and archive engine, all driven by a shared
//! [`ManualClock`]. Three profiles are seeded (one admin, two drivers on
//! different circuits) so entitlement paths can be exercised directly.

use std::sync::Arc;

use parceldesk_archive::ArchiveEngine;
use parceldesk_channel::TicketChannels;
use parceldesk_config::model::{ArchiveConfig, StorageConfig};
use parceldesk_core::types::{ComplaintType, NewTicket, Priority, Profile, Role};
use parceldesk_core::{Clock, DeskError, Principal, TicketStore};
use parceldesk_storage::SqliteStore;
use parceldesk_ticket::TicketService;

use crate::clock::ManualClock;

const SEED_TIMESTAMP: &str = "2026-02-01T08:00:00.000Z";

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    clock_at: String,
    retention_months: u32,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            clock_at: SEED_TIMESTAMP.to_string(),
            retention_months: 3,
        }
    }

    /// Start the simulated clock at the given timestamp.
    pub fn with_clock_at(mut self, timestamp: &str) -> Self {
        self.clock_at = timestamp.to_string();
        self
    }

    /// Override the archival retention window.
    pub fn with_retention_months(mut self, months: u32) -> Self {
        self.retention_months = months;
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, DeskError> {
        let temp_dir = tempfile::TempDir::new().map_err(|e| DeskError::Storage {
            source: Box::new(e),
        })?;
        let db_path = temp_dir.path().join("test.db");

        let store = SqliteStore::open(&StorageConfig {
            database_path: db_path.to_string_lossy().to_string(),
            wal_mode: true,
        })
        .await?;
        let store: Arc<dyn TicketStore> = Arc::new(store);

        for (id, name, role, circuit) in [
            ("admin-1", "Ada Admin", Role::Admin, None),
            ("driver-1", "Dina Driver", Role::Driver, Some(541u16)),
            ("driver-2", "Omar Other", Role::Driver, Some(545)),
        ] {
            store
                .create_profile(&Profile {
                    id: id.into(),
                    email: format!("{id}@example.com"),
                    full_name: name.into(),
                    role,
                    circuit,
                    phone: None,
                    created_at: SEED_TIMESTAMP.into(),
                    updated_at: SEED_TIMESTAMP.into(),
                })
                .await?;
        }

        let clock = Arc::new(ManualClock::at(&self.clock_at));
        let clock_dyn: Arc<dyn Clock> = clock.clone();

        let channels = Arc::new(TicketChannels::new());
        let service = Arc::new(TicketService::new(
            store.clone(),
            channels.clone(),
            clock_dyn.clone(),
        ));
        let engine = Arc::new(ArchiveEngine::new(
            store.clone(),
            clock_dyn,
            &ArchiveConfig {
                retention_months: self.retention_months,
                log_limit: 100,
            },
        ));

        let admin = service.resolve_principal("admin-1").await?;
        let driver = service.resolve_principal("driver-1").await?;
        let other_driver = service.resolve_principal("driver-2").await?;

        Ok(TestHarness {
            store,
            channels,
            service,
            engine,
            clock,
            admin,
            driver,
            other_driver,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment with a temp database and seeded profiles.
pub struct TestHarness {
    /// The ticket store backing every subsystem.
    pub store: Arc<dyn TicketStore>,
    /// Realtime fan-out registry (also reachable via `service.channels()`).
    pub channels: Arc<TicketChannels>,
    /// The ticket service under test.
    pub service: Arc<TicketService>,
    /// The archive engine, sharing the service's store and clock.
    pub engine: Arc<ArchiveEngine>,
    /// The simulated clock driving every server-assigned timestamp.
    pub clock: Arc<ManualClock>,
    /// Seeded administrator (`admin-1`).
    pub admin: Principal,
    /// Seeded driver on circuit 541 (`driver-1`).
    pub driver: Principal,
    /// Seeded driver on circuit 545 (`driver-2`).
    pub other_driver: Principal,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// A valid ticket input for the given circuit, dated within the seeded
    /// clock's first week.
    pub fn sample_ticket(circuit: u16) -> NewTicket {
        NewTicket {
            package_number: "PKG-100".into(),
            case_reference: "CASE-100".into(),
            client_address: Some("12 Quay Street".into()),
            circuit,
            complaint_type: ComplaintType::Local,
            motive: "damaged parcel".into(),
            submitted_at: "2026-02-01".into(),
            due_before: "2026-02-08".into(),
            driver_return_date: None,
            remark: None,
            requested_action: None,
            priority: Priority::Normal,
            assigned_to: None,
        }
    }
}
