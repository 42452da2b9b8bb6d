// SPDX-FileCopyrightText: 2026 Parceldesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Parceldesk.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Parceldesk configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DeskConfig {
    /// Application identity and logging settings.
    #[serde(default)]
    pub app: AppConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// HTTP/WebSocket gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Archival policy settings.
    #[serde(default)]
    pub archive: ArchiveConfig,
}

/// Application identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Display name of the installation.
    #[serde(default = "default_app_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_app_name() -> String {
    "parceldesk".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL journal mode.
    #[serde(default = "default_true")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: true,
        }
    }
}

fn default_database_path() -> String {
    "parceldesk.db".to_string()
}

fn default_true() -> bool {
    true
}

/// Gateway (HTTP + WebSocket) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Shared bearer token. `None` disables the gateway (fail-closed).
    #[serde(default)]
    pub bearer_token: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            bearer_token: None,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8431
}

/// Archival policy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ArchiveConfig {
    /// Retention window: closed tickets older than this many months become
    /// archival-eligible.
    #[serde(default = "default_retention_months")]
    pub retention_months: u32,

    /// Maximum archive log rows returned by listing endpoints.
    #[serde(default = "default_log_limit")]
    pub log_limit: i64,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            retention_months: default_retention_months(),
            log_limit: default_log_limit(),
        }
    }
}

fn default_retention_months() -> u32 {
    3
}

fn default_log_limit() -> i64 {
    100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = DeskConfig::default();
        assert_eq!(config.app.name, "parceldesk");
        assert_eq!(config.app.log_level, "info");
        assert_eq!(config.storage.database_path, "parceldesk.db");
        assert!(config.storage.wal_mode);
        assert_eq!(config.gateway.port, 8431);
        assert!(config.gateway.bearer_token.is_none());
        assert_eq!(config.archive.retention_months, 3);
    }

    #[test]
    fn rejects_unknown_section_key() {
        let toml = "[archive]\nretention_weeks = 4\n";
        let result: Result<DeskConfig, _> = toml::from_str(toml);
        assert!(result.is_err());
    }
}
