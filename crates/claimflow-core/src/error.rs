// SPDX-FileCopyrightText: 2026 Claimflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Claimflow service.

use thiserror::Error;

/// The primary error type used across all Claimflow crates.
#[derive(Debug, Error)]
pub enum ClaimflowError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, constraint violation).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A claim, message, or reference record has no matching row.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The requester is not permitted to perform this operation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Malformed or incomplete input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// An upstream collaborator (identity provider) failed or answered garbage.
    #[error("upstream error: {message}")]
    Upstream {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ClaimflowError {
    /// Shorthand for a [`ClaimflowError::NotFound`] with the given entity label.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }
}
