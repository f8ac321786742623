// SPDX-FileCopyrightText: 2026 Claimflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Claimflow service.
//!
//! Layered TOML configuration with environment overrides, modeled as plain
//! serde structs with compiled defaults.

pub mod loader;
pub mod model;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::ClaimflowConfig;
