// SPDX-FileCopyrightText: 2026 Claimflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for config loading and layering.

use claimflow_config::{load_config_from_str, ClaimflowConfig};

#[test]
fn defaults_apply_with_empty_input() {
    let config = load_config_from_str("").unwrap();
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 3000);
    assert_eq!(config.storage.database_path, "claimflow.db");
    assert!(config.storage.wal_mode);
    assert_eq!(config.identity.timeout_secs, 5);
    assert_eq!(config.log.level, "info");
}

#[test]
fn file_values_override_defaults() {
    let toml = r#"
        [server]
        host = "0.0.0.0"
        port = 8080

        [identity]
        base_url = "http://auth.internal:3001"
        timeout_secs = 2

        [log]
        level = "debug"
    "#;
    let config = load_config_from_str(toml).unwrap();
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.identity.base_url, "http://auth.internal:3001");
    assert_eq!(config.identity.timeout_secs, 2);
    assert_eq!(config.log.level, "debug");
    // Untouched sections keep their defaults.
    assert_eq!(config.storage.database_path, "claimflow.db");
}

#[test]
fn unknown_keys_are_rejected() {
    let toml = r#"
        [server]
        hsot = "typo"
    "#;
    assert!(load_config_from_str(toml).is_err());
}

#[test]
fn unknown_sections_are_rejected() {
    let toml = r#"
        [gateway]
        port = 1
    "#;
    assert!(load_config_from_str(toml).is_err());
}

#[test]
fn default_struct_matches_empty_load() {
    let loaded = load_config_from_str("").unwrap();
    let default = ClaimflowConfig::default();
    assert_eq!(loaded.server.port, default.server.port);
    assert_eq!(loaded.storage.database_path, default.storage.database_path);
    assert_eq!(loaded.identity.base_url, default.identity.base_url);
}
