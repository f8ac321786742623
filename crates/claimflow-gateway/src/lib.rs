// SPDX-FileCopyrightText: 2026 Claimflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP/WebSocket gateway for the Claimflow service.
//!
//! REST handlers cover the claim lifecycle, message threads, and dashboard
//! analytics; the WebSocket layer binds connections to claim rooms and fans
//! persisted messages out to them.

pub mod handlers;
pub mod server;
pub mod ws;

pub use server::{build_router, start_server, AppState, ServerConfig};

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use async_trait::async_trait;

    use claimflow_analytics::AnalyticsService;
    use claimflow_claims::ClaimService;
    use claimflow_core::{
        ClaimflowError, ClientRecord, Identity, IdentityResolver, Role,
    };
    use claimflow_messaging::{MessageService, RoomRegistry};
    use claimflow_storage::queries::refs;
    use claimflow_storage::{Database, StoreDirectory};

    use crate::server::AppState;

    /// Identity resolver stub: a fixed identity, or upstream failure.
    pub struct StubIdentity(pub Option<Identity>);

    #[async_trait]
    impl IdentityResolver for StubIdentity {
        async fn resolve(&self, _bearer: &str) -> Result<Identity, ClaimflowError> {
            self.0.clone().ok_or_else(|| ClaimflowError::Upstream {
                message: "identity provider unreachable".to_string(),
                source: None,
            })
        }

        async fn lookup_display_name(&self, _user_id: &str) -> Option<String> {
            None
        }
    }

    pub fn staff_identity() -> Identity {
        Identity {
            user_id: "staff-1".to_string(),
            role: Role::Staff,
            name: Some("Ana".to_string()),
        }
    }

    pub fn client_identity() -> Identity {
        Identity {
            user_id: "u-acme".to_string(),
            role: Role::Client,
            name: None,
        }
    }

    /// Build an [`AppState`] over a scratch database with one seeded client
    /// and project. The returned guard keeps the database directory alive.
    pub async fn test_state_with(
        resolved: Option<Identity>,
    ) -> (AppState, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("gateway.db");
        let db = Arc::new(Database::open(db_path.to_str().unwrap()).await.unwrap());

        refs::insert_client(
            &db,
            &ClientRecord {
                id: "cl-1".to_string(),
                name: "Acme".to_string(),
                user_id: Some("u-acme".to_string()),
            },
        )
        .await
        .unwrap();
        refs::insert_project(&db, "p-1", "Portal", Some("cl-1")).await.unwrap();
        refs::seed_claim_states(&db).await.unwrap();

        let directory = Arc::new(StoreDirectory::new(Arc::clone(&db)));
        let claims = Arc::new(ClaimService::new(Arc::clone(&db), directory.clone()));
        let identity: Arc<dyn IdentityResolver> = Arc::new(StubIdentity(resolved));
        let messages = Arc::new(MessageService::new(
            Arc::clone(&db),
            claims.clone(),
            directory.clone(),
            identity.clone(),
        ));
        let analytics = Arc::new(AnalyticsService::new(Arc::clone(&db), directory));

        let state = AppState {
            claims,
            messages,
            analytics,
            identity,
            rooms: Arc::new(RoomRegistry::new()),
            started_at: std::time::Instant::now(),
        };
        (state, dir)
    }

    pub async fn test_state() -> (AppState, tempfile::TempDir) {
        test_state_with(Some(staff_identity())).await
    }
}
