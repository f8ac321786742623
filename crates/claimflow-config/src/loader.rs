// SPDX-FileCopyrightText: 2026 Claimflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports `./claimflow.toml` > `~/.config/claimflow/claimflow.toml` >
//! `/etc/claimflow/claimflow.toml` with environment variable overrides via
//! the `CLAIMFLOW_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::ClaimflowConfig;

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/claimflow/claimflow.toml` (system-wide)
/// 3. `~/.config/claimflow/claimflow.toml` (user XDG config)
/// 4. `./claimflow.toml` (local directory)
/// 5. `CLAIMFLOW_*` environment variables
pub fn load_config() -> Result<ClaimflowConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ClaimflowConfig::default()))
        .merge(Toml::file("/etc/claimflow/claimflow.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("claimflow/claimflow.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("claimflow.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from an inline TOML string (tests, embedding).
pub fn load_config_from_str(toml_content: &str) -> Result<ClaimflowConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ClaimflowConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ClaimflowConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ClaimflowConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `CLAIMFLOW_STORAGE_DATABASE_PATH` must
/// map to `storage.database_path`, not `storage.database.path`.
fn env_provider() -> Env {
    Env::prefixed("CLAIMFLOW_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("server_", "server.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("identity_", "identity.", 1)
            .replacen("log_", "log.", 1);
        mapped.into()
    })
}
