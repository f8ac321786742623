// SPDX-FileCopyrightText: 2026 Claimflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`ClientDirectory`] implementation backed by the reference tables.

use std::sync::Arc;

use async_trait::async_trait;

use claimflow_core::{ClaimflowError, ClientDirectory, ClientRecord};

use crate::database::Database;
use crate::queries::refs;

/// Client lookups answered from the local reference tables.
pub struct StoreDirectory {
    db: Arc<Database>,
}

impl StoreDirectory {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ClientDirectory for StoreDirectory {
    async fn find_by_user_id(
        &self,
        user_id: &str,
    ) -> Result<Option<ClientRecord>, ClaimflowError> {
        refs::find_client_by_user_id(&self.db, user_id).await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<ClientRecord>, ClaimflowError> {
        refs::get_client(&self.db, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn directory_answers_from_reference_tables() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Arc::new(Database::open(db_path.to_str().unwrap()).await.unwrap());

        refs::insert_client(
            &db,
            &ClientRecord {
                id: "cl-1".to_string(),
                name: "Acme".to_string(),
                user_id: Some("u-1".to_string()),
            },
        )
        .await
        .unwrap();

        let directory = StoreDirectory::new(Arc::clone(&db));
        let found = directory.find_by_user_id("u-1").await.unwrap().unwrap();
        assert_eq!(found.id, "cl-1");
        assert!(directory.find_by_user_id("u-9").await.unwrap().is_none());
        assert!(directory.find_by_id("cl-1").await.unwrap().is_some());

        db.close().await.unwrap();
    }
}
