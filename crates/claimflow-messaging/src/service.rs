// SPDX-FileCopyrightText: 2026 Claimflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message service: access policy, sender resolution, persistence.
//!
//! Access policy: message threads are internal staff notes. Client-role
//! requesters are denied on every read and write path, regardless of claim
//! ownership. The whole policy lives in [`ensure_thread_access`] so a future
//! relaxation (owner-scoped client access) is a one-function change.

use std::sync::Arc;

use uuid::Uuid;

use claimflow_core::{
    time, ClaimLookup, ClaimflowError, ClientDirectory, Identity, IdentityResolver, Message,
    NewMessage, Role, Sender, SenderKind,
};
use claimflow_storage::queries::messages;
use claimflow_storage::Database;

/// Display name used when profile resolution fails.
pub const FALLBACK_SENDER_NAME: &str = "User";

/// Reject requesters that may not touch a claim's message thread.
pub fn ensure_thread_access(identity: &Identity) -> Result<(), ClaimflowError> {
    match identity.role {
        Role::Client => Err(ClaimflowError::Forbidden(
            "clients have no access to claim message threads".to_string(),
        )),
        Role::Staff => Ok(()),
    }
}

/// Message service bound to the claim collection via [`ClaimLookup`].
pub struct MessageService {
    db: Arc<Database>,
    claims: Arc<dyn ClaimLookup>,
    directory: Arc<dyn ClientDirectory>,
    identity: Arc<dyn IdentityResolver>,
}

impl MessageService {
    pub fn new(
        db: Arc<Database>,
        claims: Arc<dyn ClaimLookup>,
        directory: Arc<dyn ClientDirectory>,
        identity: Arc<dyn IdentityResolver>,
    ) -> Self {
        Self {
            db,
            claims,
            directory,
            identity,
        }
    }

    /// Persist a message on a claim's thread.
    ///
    /// The referenced claim must exist and the access policy must pass.
    /// Broadcasting is the real-time layer's job, strictly after this
    /// returns.
    pub async fn create(
        &self,
        dto: NewMessage,
        identity: &Identity,
    ) -> Result<Message, ClaimflowError> {
        if !self.claims.claim_exists(&dto.claim_id).await? {
            return Err(ClaimflowError::not_found("claim", dto.claim_id));
        }
        ensure_thread_access(identity)?;

        let name = self.resolve_sender_name(identity).await;
        let sender = match identity.role {
            Role::Client => Sender::Client {
                id: identity.user_id.clone(),
                name,
            },
            Role::Staff => Sender::Staff {
                id: identity.user_id.clone(),
                name,
            },
        };

        let message = Message {
            id: Uuid::new_v4().to_string(),
            claim_id: dto.claim_id,
            content: dto.content,
            sender,
            read: false,
            created_at: time::now(),
            deleted_at: None,
        };
        messages::insert_message(&self.db, &message).await?;
        tracing::debug!(
            message_id = message.id.as_str(),
            claim_id = message.claim_id.as_str(),
            "message persisted"
        );
        Ok(message)
    }

    /// All live messages on a claim's thread, oldest first.
    pub async fn find_by_claim(
        &self,
        claim_id: &str,
        identity: &Identity,
    ) -> Result<Vec<Message>, ClaimflowError> {
        ensure_thread_access(identity)?;
        messages::list_by_claim(&self.db, claim_id).await
    }

    /// Flag a message as read and return it.
    pub async fn mark_read(&self, message_id: &str) -> Result<Message, ClaimflowError> {
        if !messages::mark_read(&self.db, message_id).await? {
            return Err(ClaimflowError::not_found("message", message_id));
        }
        messages::get_message(&self.db, message_id)
            .await?
            .ok_or_else(|| ClaimflowError::not_found("message", message_id))
    }

    /// Messages the other party has not read yet, seen from `kind`'s side.
    pub async fn unread_count(
        &self,
        claim_id: &str,
        kind: SenderKind,
    ) -> Result<i64, ClaimflowError> {
        messages::unread_count(&self.db, claim_id, kind).await
    }

    /// Resolve a human-readable sender name.
    ///
    /// Prefers the already-known display name; otherwise consults the
    /// matching profile source. Resolution failure is cosmetic and degrades
    /// to a generic label.
    async fn resolve_sender_name(&self, identity: &Identity) -> String {
        if let Some(name) = &identity.name {
            if !name.trim().is_empty() {
                return name.clone();
            }
        }
        let resolved = match identity.role {
            Role::Client => match self.directory.find_by_user_id(&identity.user_id).await {
                Ok(record) => record.map(|r| r.name),
                Err(e) => {
                    tracing::warn!(error = %e, "client profile lookup failed, using fallback name");
                    None
                }
            },
            Role::Staff => self.identity.lookup_display_name(&identity.user_id).await,
        };
        resolved.unwrap_or_else(|| FALLBACK_SENDER_NAME.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use claimflow_claims::ClaimService;
    use claimflow_core::types::NewClaim;
    use claimflow_core::ClientRecord;
    use claimflow_storage::queries::refs;
    use claimflow_storage::StoreDirectory;
    use tempfile::tempdir;

    struct FixedNames(Option<String>);

    #[async_trait]
    impl IdentityResolver for FixedNames {
        async fn resolve(&self, _bearer: &str) -> Result<Identity, ClaimflowError> {
            Err(ClaimflowError::Upstream {
                message: "not wired in tests".to_string(),
                source: None,
            })
        }

        async fn lookup_display_name(&self, _user_id: &str) -> Option<String> {
            self.0.clone()
        }
    }

    async fn setup(
        staff_name: Option<&str>,
    ) -> (Arc<Database>, MessageService, String, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
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
        let created = claims
            .create(NewClaim {
                claim_type: "incident".to_string(),
                description: "broken".to_string(),
                client: "cl-1".to_string(),
                project: "p-1".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let service = MessageService::new(
            Arc::clone(&db),
            claims,
            directory,
            Arc::new(FixedNames(staff_name.map(|n| n.to_string()))),
        );
        (db, service, created.claim.id, dir)
    }

    fn staff(user_id: &str, name: Option<&str>) -> Identity {
        Identity {
            user_id: user_id.to_string(),
            role: Role::Staff,
            name: name.map(|n| n.to_string()),
        }
    }

    fn client(user_id: &str) -> Identity {
        Identity {
            user_id: user_id.to_string(),
            role: Role::Client,
            name: None,
        }
    }

    #[tokio::test]
    async fn create_persists_with_staff_sender() {
        let (db, service, claim_id, _dir) = setup(None).await;
        let msg = service
            .create(
                NewMessage {
                    claim_id: claim_id.clone(),
                    content: "checking logs".to_string(),
                },
                &staff("agent-1", Some("Ana")),
            )
            .await
            .unwrap();

        assert_eq!(msg.sender.kind(), SenderKind::Staff);
        assert_eq!(msg.sender.name(), "Ana");
        assert!(!msg.read);

        let thread = service
            .find_by_claim(&claim_id, &staff("agent-2", None))
            .await
            .unwrap();
        assert_eq!(thread.len(), 1);
        assert_eq!(thread[0].content, "checking logs");
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn create_for_missing_claim_is_not_found() {
        let (db, service, _claim_id, _dir) = setup(None).await;
        let err = service
            .create(
                NewMessage {
                    claim_id: "ghost".to_string(),
                    content: "x".to_string(),
                },
                &staff("agent-1", Some("Ana")),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ClaimflowError::NotFound { .. }));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn clients_are_denied_on_every_path() {
        let (db, service, claim_id, _dir) = setup(None).await;

        // Write path: denied even for the claim's own client.
        let err = service
            .create(
                NewMessage {
                    claim_id: claim_id.clone(),
                    content: "hello?".to_string(),
                },
                &client("u-acme"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ClaimflowError::Forbidden(_)));

        // Read path too.
        let err = service
            .find_by_claim(&claim_id, &client("u-acme"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClaimflowError::Forbidden(_)));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn sender_name_prefers_known_then_profile_then_fallback() {
        // Known display name wins without any lookup.
        let (db, service, claim_id, _dir) = setup(Some("Directory Name")).await;
        let msg = service
            .create(
                NewMessage {
                    claim_id: claim_id.clone(),
                    content: "a".to_string(),
                },
                &staff("agent-1", Some("Handshake Name")),
            )
            .await
            .unwrap();
        assert_eq!(msg.sender.name(), "Handshake Name");

        // No known name: the identity-provider profile is used.
        let msg = service
            .create(
                NewMessage {
                    claim_id: claim_id.clone(),
                    content: "b".to_string(),
                },
                &staff("agent-1", None),
            )
            .await
            .unwrap();
        assert_eq!(msg.sender.name(), "Directory Name");
        db.close().await.unwrap();

        // Profile lookup fails: generic label.
        let (db, service, claim_id, _dir) = setup(None).await;
        let msg = service
            .create(
                NewMessage {
                    claim_id,
                    content: "c".to_string(),
                },
                &staff("agent-1", None),
            )
            .await
            .unwrap();
        assert_eq!(msg.sender.name(), FALLBACK_SENDER_NAME);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn mark_read_round_trips() {
        let (db, service, claim_id, _dir) = setup(None).await;
        let msg = service
            .create(
                NewMessage {
                    claim_id,
                    content: "read me".to_string(),
                },
                &staff("agent-1", Some("Ana")),
            )
            .await
            .unwrap();

        let updated = service.mark_read(&msg.id).await.unwrap();
        assert!(updated.read);

        let err = service.mark_read("ghost").await.unwrap_err();
        assert!(matches!(err, ClaimflowError::NotFound { .. }));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn unread_count_counts_only_the_other_party() {
        let (db, service, claim_id, _dir) = setup(None).await;
        for content in ["one", "two"] {
            service
                .create(
                    NewMessage {
                        claim_id: claim_id.clone(),
                        content: content.to_string(),
                    },
                    &staff("agent-1", Some("Ana")),
                )
                .await
                .unwrap();
        }

        // Staff messages are unseen from the client side only.
        assert_eq!(
            service
                .unread_count(&claim_id, SenderKind::Client)
                .await
                .unwrap(),
            2
        );
        assert_eq!(
            service
                .unread_count(&claim_id, SenderKind::Staff)
                .await
                .unwrap(),
            0
        );
        db.close().await.unwrap();
    }
}
