// SPDX-FileCopyrightText: 2026 Claimflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reference-data lookups.
//!
//! Reference CRUD belongs to an external collaborator; the core only needs
//! the lookups below (state by name, client by linked user, display names)
//! plus insert helpers used by startup seeding and tests.

use claimflow_core::types::INITIAL_STATE_NAME;
use claimflow_core::ClaimflowError;
use rusqlite::params;
use uuid::Uuid;

use crate::database::Database;
use crate::models::{ClientRecord, RefRecord};

/// Claim state ladder, in lifecycle order. Seeded at startup so the
/// default-state lookup always resolves.
pub const STATE_LADDER: [&str; 8] = [
    INITIAL_STATE_NAME,
    "Assigned",
    "Classified",
    "In Process",
    "Reassigned",
    "Resolved",
    "Awaiting Confirmation",
    "Closed",
];

/// Insert a client record.
pub async fn insert_client(db: &Database, client: &ClientRecord) -> Result<(), ClaimflowError> {
    let client = client.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO clients (id, name, user_id) VALUES (?1, ?2, ?3)",
                params![client.id, client.name, client.user_id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Insert a project record.
pub async fn insert_project(
    db: &Database,
    id: &str,
    name: &str,
    client_id: Option<&str>,
) -> Result<(), ClaimflowError> {
    let id = id.to_string();
    let name = name.to_string();
    let client_id = client_id.map(|c| c.to_string());
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO projects (id, name, client_id) VALUES (?1, ?2, ?3)",
                params![id, name, client_id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Insert an area record.
pub async fn insert_area(db: &Database, area: &RefRecord) -> Result<(), ClaimflowError> {
    let area = area.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO areas (id, name) VALUES (?1, ?2)",
                params![area.id, area.name],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Insert a claim-type record.
pub async fn insert_claim_type(db: &Database, kind: &RefRecord) -> Result<(), ClaimflowError> {
    let kind = kind.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO claim_types (id, name) VALUES (?1, ?2)",
                params![kind.id, kind.name],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Seed the claim-state ladder. Idempotent: existing names are left alone.
pub async fn seed_claim_states(db: &Database) -> Result<(), ClaimflowError> {
    let rows: Vec<(String, String)> = STATE_LADDER
        .iter()
        .map(|name| (Uuid::new_v4().to_string(), name.to_string()))
        .collect();
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare("INSERT OR IGNORE INTO claim_states (id, name) VALUES (?1, ?2)")?;
            for (id, name) in &rows {
                stmt.execute(params![id, name])?;
            }
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Resolve a claim state by display name.
pub async fn find_state_by_name(
    db: &Database,
    name: &str,
) -> Result<Option<RefRecord>, ClaimflowError> {
    let name = name.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare("SELECT id, name FROM claim_states WHERE name = ?1")?;
            let result = stmt.query_row(params![name], |row| {
                Ok(RefRecord {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            });
            match result {
                Ok(state) => Ok(Some(state)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Resolve the client record linked to an identity-provider user id.
pub async fn find_client_by_user_id(
    db: &Database,
    user_id: &str,
) -> Result<Option<ClientRecord>, ClaimflowError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare("SELECT id, name, user_id FROM clients WHERE user_id = ?1")?;
            let result = stmt.query_row(params![user_id], client_row);
            match result {
                Ok(client) => Ok(Some(client)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fetch a client record by id.
pub async fn get_client(db: &Database, id: &str) -> Result<Option<ClientRecord>, ClaimflowError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare("SELECT id, name, user_id FROM clients WHERE id = ?1")?;
            let result = stmt.query_row(params![id], client_row);
            match result {
                Ok(client) => Ok(Some(client)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

fn client_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ClientRecord> {
    Ok(ClientRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        user_id: row.get(2)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn seed_states_is_idempotent() {
        let (db, _dir) = setup_db().await;
        seed_claim_states(&db).await.unwrap();
        let first = find_state_by_name(&db, "Received").await.unwrap().unwrap();

        // Re-seeding must not duplicate or reassign ids.
        seed_claim_states(&db).await.unwrap();
        let second = find_state_by_name(&db, "Received").await.unwrap().unwrap();
        assert_eq!(first.id, second.id);

        for name in STATE_LADDER {
            assert!(
                find_state_by_name(&db, name).await.unwrap().is_some(),
                "state {name} should be seeded"
            );
        }
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn find_state_by_name_misses_cleanly() {
        let (db, _dir) = setup_db().await;
        seed_claim_states(&db).await.unwrap();
        assert!(find_state_by_name(&db, "Vanished").await.unwrap().is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn client_lookup_by_linked_user() {
        let (db, _dir) = setup_db().await;
        insert_client(
            &db,
            &ClientRecord {
                id: "cl-1".to_string(),
                name: "Acme".to_string(),
                user_id: Some("u-1".to_string()),
            },
        )
        .await
        .unwrap();

        let found = find_client_by_user_id(&db, "u-1").await.unwrap().unwrap();
        assert_eq!(found.id, "cl-1");
        assert!(find_client_by_user_id(&db, "u-2").await.unwrap().is_none());

        let by_id = get_client(&db, "cl-1").await.unwrap().unwrap();
        assert_eq!(by_id.name, "Acme");
        db.close().await.unwrap();
    }
}
