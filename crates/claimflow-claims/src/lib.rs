// SPDX-FileCopyrightText: 2026 Claimflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Claim lifecycle manager.
//!
//! Owns claim creation (defaults, initial-state resolution, seeded audit
//! trail), requester-scoped listing, partial updates with history appends,
//! and hard deletion. Messaging reaches claims only through the narrow
//! [`ClaimLookup`] capability implemented here.

pub mod scope;

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use claimflow_core::types::{
    DEFAULT_CRITICALITY, DEFAULT_PRIORITY, INITIAL_STATE_NAME,
};
use claimflow_core::{
    time, Claim, ClaimDetail, ClaimLookup, ClaimPatch, ClaimflowError, ClientDirectory,
    HistoryEntry, Identity, NewClaim,
};
use claimflow_storage::queries::{claims, refs};
use claimflow_storage::Database;

use crate::scope::resolve_client_scope;

/// Action label of the seeded first history entry.
pub const CREATED_ACTION: &str = "Claim created";

/// Actor label for system-originated history entries.
pub const SYSTEM_ACTOR: &str = "System";

/// Claim lifecycle manager.
pub struct ClaimService {
    db: Arc<Database>,
    directory: Arc<dyn ClientDirectory>,
}

impl ClaimService {
    pub fn new(db: Arc<Database>, directory: Arc<dyn ClientDirectory>) -> Self {
        Self { db, directory }
    }

    /// Create a claim.
    ///
    /// Absent priority/criticality fall back to domain defaults; an absent
    /// state resolves to the reference state named "Received"; the history
    /// sequence is seeded with its first entry in the same transaction as
    /// the claim row.
    pub async fn create(&self, dto: NewClaim) -> Result<ClaimDetail, ClaimflowError> {
        for (field, value) in [
            ("claim_type", &dto.claim_type),
            ("description", &dto.description),
            ("client", &dto.client),
            ("project", &dto.project),
        ] {
            if value.trim().is_empty() {
                return Err(ClaimflowError::BadRequest(format!("{field} is required")));
            }
        }

        let state = match dto.state {
            Some(state) => Some(state),
            None => refs::find_state_by_name(&self.db, INITIAL_STATE_NAME)
                .await?
                .map(|s| s.id),
        };

        let now = time::now();
        let claim = Claim {
            id: Uuid::new_v4().to_string(),
            claim_type: dto.claim_type,
            priority: dto.priority.unwrap_or_else(|| DEFAULT_PRIORITY.to_string()),
            criticality: dto
                .criticality
                .unwrap_or_else(|| DEFAULT_CRITICALITY.to_string()),
            description: dto.description,
            evidence: dto.evidence,
            state,
            area: dto.area,
            client: dto.client,
            project: dto.project,
            assignees: dto.assignees,
            history: vec![HistoryEntry {
                occurred_at: now.clone(),
                action: CREATED_ACTION.to_string(),
                actor: SYSTEM_ACTOR.to_string(),
            }],
            created_at: now.clone(),
            updated_at: now,
        };

        claims::insert_claim(&self.db, &claim).await?;
        tracing::info!(claim_id = claim.id.as_str(), "claim created");

        claims::get_claim(&self.db, &claim.id)
            .await?
            .ok_or_else(|| ClaimflowError::Internal("created claim vanished".to_string()))
    }

    /// List claims visible to the requester, newest first.
    pub async fn find_all(
        &self,
        requester: Option<&Identity>,
    ) -> Result<Vec<ClaimDetail>, ClaimflowError> {
        let scope = resolve_client_scope(self.directory.as_ref(), requester).await?;
        if scope.is_denied() {
            return Ok(Vec::new());
        }
        claims::list_claims(&self.db, scope.filter()).await
    }

    /// Fetch one claim aggregate.
    pub async fn find_one(&self, id: &str) -> Result<ClaimDetail, ClaimflowError> {
        claims::get_claim(&self.db, id)
            .await?
            .ok_or_else(|| ClaimflowError::not_found("claim", id))
    }

    /// Apply a partial update.
    ///
    /// A history directive in the patch is translated into an append on the
    /// audit trail; existing entries are never touched.
    pub async fn update(&self, id: &str, patch: ClaimPatch) -> Result<ClaimDetail, ClaimflowError> {
        let now = time::now();
        let entry = patch.history.as_ref().map(|directive| HistoryEntry {
            occurred_at: now.clone(),
            action: directive.action.clone(),
            actor: directive.actor.clone(),
        });

        let matched = claims::update_claim(&self.db, id, &patch, &now, entry).await?;
        if !matched {
            return Err(ClaimflowError::not_found("claim", id));
        }
        self.find_one(id).await
    }

    /// Permanently delete a claim (history and messages cascade).
    pub async fn remove(&self, id: &str) -> Result<(), ClaimflowError> {
        if !claims::delete_claim(&self.db, id).await? {
            return Err(ClaimflowError::not_found("claim", id));
        }
        tracing::info!(claim_id = id, "claim deleted");
        Ok(())
    }
}

#[async_trait]
impl ClaimLookup for ClaimService {
    async fn claim_exists(&self, id: &str) -> Result<bool, ClaimflowError> {
        claims::claim_exists(&self.db, id).await
    }
}
