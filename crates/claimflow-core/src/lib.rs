// SPDX-FileCopyrightText: 2026 Claimflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Claimflow service.
//!
//! This crate provides the error type, shared domain types, timestamp
//! helpers, and the capability traits the domain crates depend on instead
//! of depending on each other.

pub mod error;
pub mod time;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::ClaimflowError;
pub use traits::{ClaimLookup, ClientDirectory, IdentityResolver};
pub use types::{
    Claim, ClaimDetail, ClaimPatch, ClientRecord, HistoryDirective, HistoryEntry, Identity,
    Message, NewClaim, NewMessage, Role, Sender, SenderKind,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_variants_construct() {
        let _config = ClaimflowError::Config("bad".into());
        let _storage = ClaimflowError::Storage {
            source: Box::new(std::io::Error::other("io")),
        };
        let _not_found = ClaimflowError::not_found("claim", "c-1");
        let _forbidden = ClaimflowError::Forbidden("no thread access".into());
        let _bad = ClaimflowError::BadRequest("empty description".into());
        let _upstream = ClaimflowError::Upstream {
            message: "identity provider unreachable".into(),
            source: None,
        };
        let _timeout = ClaimflowError::Timeout {
            duration: std::time::Duration::from_secs(5),
        };
        let _internal = ClaimflowError::Internal("unexpected".into());
    }

    #[test]
    fn not_found_display_names_entity_and_id() {
        let err = ClaimflowError::not_found("message", "m-7");
        assert_eq!(err.to_string(), "message not found: m-7");
    }
}
