// SPDX-FileCopyrightText: 2026 Claimflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Requester-based visibility scoping.
//!
//! Claim listing and every analytics operation apply the same rule, so it
//! lives here once: staff sees everything; a client requester sees only the
//! claims of the client record linked to their user id; a client requester
//! with no linked record sees nothing (fail-closed, never the full set).

use claimflow_core::{ClaimflowError, ClientDirectory, Identity, Role};

/// Visibility scope derived from the requester's identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientScope {
    /// Unfiltered access (staff, or no requester context).
    All,
    /// Restricted to one client's claims.
    Client(String),
    /// Client role with no resolvable client record: empty results.
    Denied,
}

/// Resolve the scope for a requester.
///
/// Directory failures propagate: an authorization decision is never made on
/// a failed lookup.
pub async fn resolve_client_scope(
    directory: &dyn ClientDirectory,
    requester: Option<&Identity>,
) -> Result<ClientScope, ClaimflowError> {
    match requester {
        Some(identity) if identity.role == Role::Client => {
            match directory.find_by_user_id(&identity.user_id).await? {
                Some(client) => Ok(ClientScope::Client(client.id)),
                None => {
                    tracing::warn!(
                        user_id = identity.user_id.as_str(),
                        "client requester has no linked client record, denying visibility"
                    );
                    Ok(ClientScope::Denied)
                }
            }
        }
        _ => Ok(ClientScope::All),
    }
}

impl ClientScope {
    /// The client filter to pass down to storage, if any.
    pub fn filter(&self) -> Option<&str> {
        match self {
            ClientScope::Client(id) => Some(id),
            ClientScope::All | ClientScope::Denied => None,
        }
    }

    /// True when the requester should see nothing at all.
    pub fn is_denied(&self) -> bool {
        matches!(self, ClientScope::Denied)
    }
}
