// SPDX-FileCopyrightText: 2026 Claimflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Claimflow service.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a
//! single-writer concurrency model via `tokio-rusqlite`, and typed query
//! modules for claims (with append-only history), messages, reference
//! lookups, and dashboard aggregations.

pub mod database;
pub mod directory;
pub mod migrations;
pub mod models;
pub mod queries;

pub use database::Database;
pub use directory::StoreDirectory;
pub use models::*;
