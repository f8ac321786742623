// SPDX-FileCopyrightText: 2026 Claimflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message CRUD operations.
//!
//! Messages are soft-deleted: reads filter through the shared
//! [`NOT_DELETED`](crate::queries::NOT_DELETED) predicate, never restating
//! the column check inline.

use claimflow_core::ClaimflowError;
use rusqlite::params;

use crate::database::Database;
use crate::models::{Message, Sender, SenderKind};
use crate::queries::NOT_DELETED;

/// Insert a new message.
pub async fn insert_message(db: &Database, msg: &Message) -> Result<(), ClaimflowError> {
    let msg = msg.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO messages (id, claim_id, content, sender_kind, sender_id,
                                       sender_name, read, created_at, deleted_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    msg.id,
                    msg.claim_id,
                    msg.content,
                    msg.sender.kind().to_string(),
                    msg.sender.id(),
                    msg.sender.name(),
                    msg.read as i64,
                    msg.created_at,
                    msg.deleted_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All live messages for a claim in chronological order.
pub async fn list_by_claim(db: &Database, claim_id: &str) -> Result<Vec<Message>, ClaimflowError> {
    let claim_id = claim_id.to_string();
    db.connection()
        .call(move |conn| {
            let sql = format!(
                "SELECT id, claim_id, content, sender_kind, sender_id, sender_name,
                        read, created_at, deleted_at
                 FROM messages WHERE claim_id = ?1 AND {NOT_DELETED}
                 ORDER BY created_at ASC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![claim_id], message_row)?;
            let mut messages = Vec::new();
            for row in rows {
                messages.push(row?);
            }
            Ok(messages)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fetch one message by id (soft-deleted included; callers decide).
pub async fn get_message(db: &Database, id: &str) -> Result<Option<Message>, ClaimflowError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, claim_id, content, sender_kind, sender_id, sender_name,
                        read, created_at, deleted_at
                 FROM messages WHERE id = ?1",
            )?;
            let result = stmt.query_row(params![id], message_row);
            match result {
                Ok(msg) => Ok(Some(msg)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Set the read flag. Returns false when no message matched.
pub async fn mark_read(db: &Database, id: &str) -> Result<bool, ClaimflowError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let rows = conn.execute("UPDATE messages SET read = 1 WHERE id = ?1", params![id])?;
            Ok(rows > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Count live unread messages authored by the *other* party.
pub async fn unread_count(
    db: &Database,
    claim_id: &str,
    kind: SenderKind,
) -> Result<i64, ClaimflowError> {
    let claim_id = claim_id.to_string();
    let kind = kind.to_string();
    db.connection()
        .call(move |conn| {
            let sql = format!(
                "SELECT COUNT(*) FROM messages
                 WHERE claim_id = ?1 AND sender_kind != ?2 AND read = 0 AND {NOT_DELETED}"
            );
            let count = conn.query_row(&sql, params![claim_id, kind], |row| row.get(0))?;
            Ok(count)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Soft-delete a message by stamping `deleted_at`. Returns false when no
/// message matched.
pub async fn soft_delete_message(
    db: &Database,
    id: &str,
    deleted_at: &str,
) -> Result<bool, ClaimflowError> {
    let id = id.to_string();
    let deleted_at = deleted_at.to_string();
    db.connection()
        .call(move |conn| {
            let rows = conn.execute(
                "UPDATE messages SET deleted_at = ?2 WHERE id = ?1",
                params![id, deleted_at],
            )?;
            Ok(rows > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

fn message_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Message> {
    let kind: String = row.get(3)?;
    let sender_id: String = row.get(4)?;
    let sender_name: String = row.get(5)?;
    let sender = match kind.as_str() {
        "client" => Sender::Client {
            id: sender_id,
            name: sender_name,
        },
        "staff" => Sender::Staff {
            id: sender_id,
            name: sender_name,
        },
        other => {
            return Err(rusqlite::Error::FromSqlConversionFailure(
                3,
                rusqlite::types::Type::Text,
                format!("unknown sender kind: {other}").into(),
            ))
        }
    };
    Ok(Message {
        id: row.get(0)?,
        claim_id: row.get(1)?,
        content: row.get(2)?,
        sender,
        read: row.get::<_, i64>(6)? != 0,
        created_at: row.get(7)?,
        deleted_at: row.get(8)?,
    })
}
