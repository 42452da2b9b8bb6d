// SPDX-FileCopyrightText: 2026 Parceldesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports the XDG hierarchy: `./parceldesk.toml` >
//! `~/.config/parceldesk/parceldesk.toml` > `/etc/parceldesk/parceldesk.toml`
//! with environment variable overrides via the `PARCELDESK_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::DeskConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/parceldesk/parceldesk.toml` (system-wide)
/// 3. `~/.config/parceldesk/parceldesk.toml` (user XDG config)
/// 4. `./parceldesk.toml` (local directory)
/// 5. `PARCELDESK_*` environment variables
pub fn load_config() -> Result<DeskConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(DeskConfig::default()))
        .merge(Toml::file("/etc/parceldesk/parceldesk.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("parceldesk/parceldesk.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("parceldesk.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<DeskConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(DeskConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<DeskConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(DeskConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider with explicit section mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` so underscore-containing
/// key names stay unambiguous: `PARCELDESK_APP_LOG_LEVEL` must map to
/// `app.log_level`, not `app.log.level`.
fn env_provider() -> Env {
    Env::prefixed("PARCELDESK_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("app_", "app.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("gateway_", "gateway.", 1)
            .replacen("archive_", "archive.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn str_loader_merges_over_defaults() {
        let config = load_config_from_str(
            "[gateway]\nport = 9000\n\n[archive]\nretention_months = 6\n",
        )
        .unwrap();
        assert_eq!(config.gateway.port, 9000);
        assert_eq!(config.archive.retention_months, 6);
        // Untouched sections keep their defaults.
        assert_eq!(config.app.log_level, "info");
    }

    #[test]
    fn str_loader_rejects_unknown_keys() {
        let result = load_config_from_str("[gateway]\nportt = 9000\n");
        assert!(result.is_err());
    }
}
