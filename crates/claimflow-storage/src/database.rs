// SPDX-FileCopyrightText: 2026 Claimflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes.

use claimflow_config::model::StorageConfig;
use claimflow_core::ClaimflowError;
use tokio_rusqlite::Connection;

use crate::migrations;

/// Async handle to the SQLite database.
///
/// Migrations run on open, before any other operation.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database at `path` with WAL mode enabled.
    pub async fn open(path: &str) -> Result<Self, ClaimflowError> {
        Self::open_with(&StorageConfig {
            database_path: path.to_string(),
            wal_mode: true,
        })
        .await
    }

    /// Open (or create) the database described by a [`StorageConfig`].
    pub async fn open_with(config: &StorageConfig) -> Result<Self, ClaimflowError> {
        let conn = Connection::open(&config.database_path)
            .await
            .map_err(map_tr_err)?;

        let wal_mode = config.wal_mode;
        conn.call(move |conn| {
            if wal_mode {
                conn.pragma_update(None, "journal_mode", "WAL")?;
            }
            conn.pragma_update(None, "foreign_keys", "ON")?;
            migrations::run_migrations(conn)
                .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        tracing::debug!(path = %config.database_path, "database opened");
        Ok(Self { conn })
    }

    /// Returns the underlying tokio-rusqlite connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Checkpoint the WAL so all committed data lands in the main file.
    pub async fn close(&self) -> Result<(), ClaimflowError> {
        self.conn
            .call(|conn| {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        tracing::debug!("WAL checkpoint complete");
        Ok(())
    }
}

/// Map a tokio-rusqlite error into the workspace error type.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error) -> ClaimflowError {
    ClaimflowError::Storage {
        source: Box::new(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn open_creates_database_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("open.db");
        let db = Database::open(path.to_str().unwrap()).await.unwrap();
        assert!(path.exists(), "database file should be created");
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn reopen_is_idempotent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reopen.db");

        let db = Database::open(path.to_str().unwrap()).await.unwrap();
        db.close().await.unwrap();
        drop(db);

        // Second open re-runs the migration runner against applied history.
        let db = Database::open(path.to_str().unwrap()).await.unwrap();
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn foreign_keys_are_enforced() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fk.db");
        let db = Database::open(path.to_str().unwrap()).await.unwrap();

        let result = db
            .connection()
            .call(|conn| {
                conn.execute(
                    "INSERT INTO claims (id, claim_type, priority, criticality, description,
                                         client, project, created_at, updated_at)
                     VALUES ('c1', 't1', 'Normal', 'Medium', 'x',
                             'missing-client', 'missing-project', '2026-01-01T00:00:00.000Z',
                             '2026-01-01T00:00:00.000Z')",
                    [],
                )?;
                Ok(())
            })
            .await;
        assert!(result.is_err(), "insert with dangling references should fail");
    }
}
