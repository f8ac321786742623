// SPDX-FileCopyrightText: 2026 Claimflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client reference lookups consumed by claim scoping and sender naming.

use async_trait::async_trait;

use crate::error::ClaimflowError;
use crate::types::ClientRecord;

/// Read-only access to the client reference collection.
#[async_trait]
pub trait ClientDirectory: Send + Sync {
    /// Resolve the client record linked to an identity-provider user id.
    async fn find_by_user_id(
        &self,
        user_id: &str,
    ) -> Result<Option<ClientRecord>, ClaimflowError>;

    /// Fetch a client record by its own id.
    async fn find_by_id(&self, id: &str) -> Result<Option<ClientRecord>, ClaimflowError>;
}
