// SPDX-FileCopyrightText: 2026 Claimflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Narrow claim-lookup capability consumed by the messaging subsystem.

use async_trait::async_trait;

use crate::error::ClaimflowError;

/// Existence checks against the claim collection.
///
/// Messaging needs to know that a claim exists before accepting a message
/// for it; it never mutates claims and never needs the full lifecycle API.
#[async_trait]
pub trait ClaimLookup: Send + Sync {
    /// Returns true when a claim with this id exists.
    async fn claim_exists(&self, id: &str) -> Result<bool, ClaimflowError>;
}
