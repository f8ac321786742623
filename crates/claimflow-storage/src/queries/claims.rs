// SPDX-FileCopyrightText: 2026 Claimflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Claim CRUD and history-append operations.
//!
//! Reads return fully assembled aggregates (claim + resolved reference
//! display names + assignees + history) via explicit joins and follow-up
//! statements inside one connection call, so fetch cost stays visible.

use claimflow_core::{ClaimflowError, HistoryEntry};
use rusqlite::params;

use crate::database::Database;
use crate::models::{Claim, ClaimDetail, ClaimPatch};

/// Insert a new claim together with its assignees and seeded history.
///
/// Runs in one transaction: the claim row never exists without its first
/// history entry.
pub async fn insert_claim(db: &Database, claim: &Claim) -> Result<(), ClaimflowError> {
    let claim = claim.clone();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO claims (id, claim_type, priority, criticality, description,
                                     evidence, state, area, client, project,
                                     created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    claim.id,
                    claim.claim_type,
                    claim.priority,
                    claim.criticality,
                    claim.description,
                    claim.evidence,
                    claim.state,
                    claim.area,
                    claim.client,
                    claim.project,
                    claim.created_at,
                    claim.updated_at,
                ],
            )?;
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO claim_assignees (claim_id, position, assignee_id)
                     VALUES (?1, ?2, ?3)",
                )?;
                for (position, assignee) in claim.assignees.iter().enumerate() {
                    stmt.execute(params![claim.id, position as i64, assignee])?;
                }
            }
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO claim_history (claim_id, occurred_at, action, actor)
                     VALUES (?1, ?2, ?3, ?4)",
                )?;
                for entry in &claim.history {
                    stmt.execute(params![
                        claim.id,
                        entry.occurred_at,
                        entry.action,
                        entry.actor
                    ])?;
                }
            }
            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get one claim aggregate by id.
pub async fn get_claim(db: &Database, id: &str) -> Result<Option<ClaimDetail>, ClaimflowError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!("{DETAIL_SELECT} WHERE c.id = ?1"))?;
            let result = stmt.query_row(params![id], detail_row);
            match result {
                Ok(mut detail) => {
                    load_children(conn, &mut detail)?;
                    Ok(Some(detail))
                }
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List claim aggregates, optionally filtered to one client, newest first.
pub async fn list_claims(
    db: &Database,
    client: Option<&str>,
) -> Result<Vec<ClaimDetail>, ClaimflowError> {
    let client = client.map(|c| c.to_string());
    db.connection()
        .call(move |conn| {
            let mut details = Vec::new();
            match &client {
                Some(client_id) => {
                    let mut stmt = conn.prepare(&format!(
                        "{DETAIL_SELECT} WHERE c.client = ?1 ORDER BY c.created_at DESC"
                    ))?;
                    let rows = stmt.query_map(params![client_id], detail_row)?;
                    for row in rows {
                        details.push(row?);
                    }
                }
                None => {
                    let mut stmt =
                        conn.prepare(&format!("{DETAIL_SELECT} ORDER BY c.created_at DESC"))?;
                    let rows = stmt.query_map([], detail_row)?;
                    for row in rows {
                        details.push(row?);
                    }
                }
            }
            for detail in &mut details {
                load_children(conn, detail)?;
            }
            Ok(details)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Apply a partial update, optionally appending one history entry.
///
/// Fields present in the patch replace the stored value; the history entry
/// is a strict append (single INSERT) so concurrent appends never lose
/// records. Returns false when no claim matched the id.
pub async fn update_claim(
    db: &Database,
    id: &str,
    patch: &ClaimPatch,
    updated_at: &str,
    history: Option<HistoryEntry>,
) -> Result<bool, ClaimflowError> {
    let id = id.to_string();
    let patch = patch.clone();
    let updated_at = updated_at.to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let rows = tx.execute(
                "UPDATE claims SET
                     claim_type = COALESCE(?2, claim_type),
                     priority = COALESCE(?3, priority),
                     criticality = COALESCE(?4, criticality),
                     description = COALESCE(?5, description),
                     evidence = COALESCE(?6, evidence),
                     state = COALESCE(?7, state),
                     area = COALESCE(?8, area),
                     updated_at = ?9
                 WHERE id = ?1",
                params![
                    id,
                    patch.claim_type,
                    patch.priority,
                    patch.criticality,
                    patch.description,
                    patch.evidence,
                    patch.state,
                    patch.area,
                    updated_at,
                ],
            )?;
            if rows == 0 {
                return Ok(false);
            }
            if let Some(assignees) = &patch.assignees {
                tx.execute(
                    "DELETE FROM claim_assignees WHERE claim_id = ?1",
                    params![id],
                )?;
                let mut stmt = tx.prepare(
                    "INSERT INTO claim_assignees (claim_id, position, assignee_id)
                     VALUES (?1, ?2, ?3)",
                )?;
                for (position, assignee) in assignees.iter().enumerate() {
                    stmt.execute(params![id, position as i64, assignee])?;
                }
            }
            if let Some(entry) = &history {
                tx.execute(
                    "INSERT INTO claim_history (claim_id, occurred_at, action, actor)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![id, entry.occurred_at, entry.action, entry.actor],
                )?;
            }
            tx.commit()?;
            Ok(true)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Hard-delete a claim; history and messages cascade. Returns false when
/// no claim matched.
pub async fn delete_claim(db: &Database, id: &str) -> Result<bool, ClaimflowError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let rows = conn.execute("DELETE FROM claims WHERE id = ?1", params![id])?;
            Ok(rows > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Existence probe used by the messaging access path.
pub async fn claim_exists(db: &Database, id: &str) -> Result<bool, ClaimflowError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare("SELECT 1 FROM claims WHERE id = ?1")?;
            Ok(stmt.exists(params![id])?)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

const DETAIL_SELECT: &str = "SELECT c.id, c.claim_type, c.priority, c.criticality,
        c.description, c.evidence, c.state, c.area, c.client, c.project,
        c.created_at, c.updated_at,
        cl.name, p.name, s.name, a.name
 FROM claims c
 LEFT JOIN clients cl ON cl.id = c.client
 LEFT JOIN projects p ON p.id = c.project
 LEFT JOIN claim_states s ON s.id = c.state
 LEFT JOIN areas a ON a.id = c.area";

fn detail_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ClaimDetail> {
    Ok(ClaimDetail {
        claim: Claim {
            id: row.get(0)?,
            claim_type: row.get(1)?,
            priority: row.get(2)?,
            criticality: row.get(3)?,
            description: row.get(4)?,
            evidence: row.get(5)?,
            state: row.get(6)?,
            area: row.get(7)?,
            client: row.get(8)?,
            project: row.get(9)?,
            created_at: row.get(10)?,
            updated_at: row.get(11)?,
            assignees: Vec::new(),
            history: Vec::new(),
        },
        client_name: row.get(12)?,
        project_name: row.get(13)?,
        state_name: row.get(14)?,
        area_name: row.get(15)?,
    })
}

/// Fill in the assignee list and history sequence for one aggregate.
fn load_children(
    conn: &rusqlite::Connection,
    detail: &mut ClaimDetail,
) -> rusqlite::Result<()> {
    let mut stmt = conn.prepare(
        "SELECT assignee_id FROM claim_assignees WHERE claim_id = ?1 ORDER BY position ASC",
    )?;
    let rows = stmt.query_map(params![detail.claim.id], |row| row.get(0))?;
    for row in rows {
        detail.claim.assignees.push(row?);
    }

    let mut stmt = conn.prepare(
        "SELECT occurred_at, action, actor FROM claim_history
         WHERE claim_id = ?1 ORDER BY id ASC",
    )?;
    let rows = stmt.query_map(params![detail.claim.id], |row| {
        Ok(HistoryEntry {
            occurred_at: row.get(0)?,
            action: row.get(1)?,
            actor: row.get(2)?,
        })
    })?;
    for row in rows {
        detail.claim.history.push(row?);
    }
    Ok(())
}
