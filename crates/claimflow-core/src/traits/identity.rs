// SPDX-FileCopyrightText: 2026 Claimflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identity-provider capability.

use async_trait::async_trait;

use crate::error::ClaimflowError;
use crate::types::Identity;

/// Resolves bearer credentials and user profiles via the external identity
/// provider.
///
/// `resolve` sits on the authorization path: failures MUST propagate so the
/// caller can fail closed. `lookup_display_name` is cosmetic: failures
/// degrade to `None` and the caller substitutes a generic label.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Resolve a bearer credential to `(id, role, name)`.
    async fn resolve(&self, bearer: &str) -> Result<Identity, ClaimflowError>;

    /// Best-effort display-name lookup for a user id.
    async fn lookup_display_name(&self, user_id: &str) -> Option<String>;
}
