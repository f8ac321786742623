// SPDX-FileCopyrightText: 2026 Claimflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Aggregation queries backing the analytics service.
//!
//! Every function takes an optional client scope (`?1 IS NULL OR ...`) so
//! the caller applies the same visibility rule as claim listing. Timestamps
//! are fixed-width RFC 3339 text, so range predicates are plain string
//! comparisons.

use claimflow_core::types::{AssigneeStats, NamedCount};
use claimflow_core::ClaimflowError;
use rusqlite::params;

use crate::database::Database;

/// Total claim count.
pub async fn count_claims(db: &Database, client: Option<&str>) -> Result<i64, ClaimflowError> {
    let client = client.map(|c| c.to_string());
    db.connection()
        .call(move |conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM claims WHERE (?1 IS NULL OR client = ?1)",
                params![client],
                |row| row.get(0),
            )?;
            Ok(count)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Claims created in `[from, to)`; `to = None` means no upper bound.
pub async fn count_created_between(
    db: &Database,
    from: &str,
    to: Option<&str>,
    client: Option<&str>,
) -> Result<i64, ClaimflowError> {
    let from = from.to_string();
    let to = to.map(|t| t.to_string());
    let client = client.map(|c| c.to_string());
    db.connection()
        .call(move |conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM claims
                 WHERE created_at >= ?1
                   AND (?2 IS NULL OR created_at < ?2)
                   AND (?3 IS NULL OR client = ?3)",
                params![from, to, client],
                |row| row.get(0),
            )?;
            Ok(count)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Claims whose state equals the given reference id.
pub async fn count_in_state(
    db: &Database,
    state_id: &str,
    client: Option<&str>,
) -> Result<i64, ClaimflowError> {
    let state_id = state_id.to_string();
    let client = client.map(|c| c.to_string());
    db.connection()
        .call(move |conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM claims
                 WHERE state = ?1 AND (?2 IS NULL OR client = ?2)",
                params![state_id, client],
                |row| row.get(0),
            )?;
            Ok(count)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Creation timestamps of claims created at or after `from`.
pub async fn created_since(
    db: &Database,
    from: &str,
    client: Option<&str>,
) -> Result<Vec<String>, ClaimflowError> {
    let from = from.to_string();
    let client = client.map(|c| c.to_string());
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT created_at FROM claims
                 WHERE created_at >= ?1 AND (?2 IS NULL OR client = ?2)",
            )?;
            let rows = stmt.query_map(params![from, client], |row| row.get(0))?;
            let mut timestamps = Vec::new();
            for row in rows {
                timestamps.push(row?);
            }
            Ok(timestamps)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Claim counts grouped by area, joined to the area display name.
/// Areas without claims are omitted, as are claims without an area.
pub async fn count_by_area(
    db: &Database,
    client: Option<&str>,
) -> Result<Vec<NamedCount>, ClaimflowError> {
    let client = client.map(|c| c.to_string());
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT a.name, COUNT(*) AS n
                 FROM claims c
                 JOIN areas a ON a.id = c.area
                 WHERE (?1 IS NULL OR c.client = ?1)
                 GROUP BY a.id, a.name
                 ORDER BY n DESC, a.name ASC",
            )?;
            let rows = stmt.query_map(params![client], |row| {
                Ok(NamedCount {
                    name: row.get(0)?,
                    count: row.get(1)?,
                })
            })?;
            let mut counts = Vec::new();
            for row in rows {
                counts.push(row?);
            }
            Ok(counts)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Claim counts grouped by claim type. The raw reference id stands in for
/// types with no display name on record.
pub async fn count_by_type(
    db: &Database,
    client: Option<&str>,
) -> Result<Vec<NamedCount>, ClaimflowError> {
    let client = client.map(|c| c.to_string());
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT COALESCE(t.name, c.claim_type) AS label, COUNT(*) AS n
                 FROM claims c
                 LEFT JOIN claim_types t ON t.id = c.claim_type
                 WHERE (?1 IS NULL OR c.client = ?1)
                 GROUP BY label
                 ORDER BY n DESC, label ASC",
            )?;
            let rows = stmt.query_map(params![client], |row| {
                Ok(NamedCount {
                    name: row.get(0)?,
                    count: row.get(1)?,
                })
            })?;
            let mut counts = Vec::new();
            for row in rows {
                counts.push(row?);
            }
            Ok(counts)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Per-assignee workload: total assigned, resolved (in the closed state),
/// and still in process. Descending by total, top 10.
pub async fn assignee_breakdown(
    db: &Database,
    closed_state_id: Option<&str>,
    client: Option<&str>,
) -> Result<Vec<AssigneeStats>, ClaimflowError> {
    let closed = closed_state_id.map(|s| s.to_string());
    let client = client.map(|c| c.to_string());
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT ca.assignee_id,
                        COUNT(*) AS total,
                        SUM(CASE WHEN c.state = ?1 THEN 1 ELSE 0 END) AS resolved
                 FROM claim_assignees ca
                 JOIN claims c ON c.id = ca.claim_id
                 WHERE (?2 IS NULL OR c.client = ?2)
                 GROUP BY ca.assignee_id
                 ORDER BY total DESC, ca.assignee_id ASC
                 LIMIT 10",
            )?;
            let rows = stmt.query_map(params![closed, client], |row| {
                let total: i64 = row.get(1)?;
                let resolved: i64 = row.get(2)?;
                Ok(AssigneeStats {
                    assignee: row.get(0)?,
                    total,
                    in_process: total - resolved,
                    resolved,
                })
            })?;
            let mut stats = Vec::new();
            for row in rows {
                stats.push(row?);
            }
            Ok(stats)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// `(first_history_entry, updated_at)` pairs for closed claims.
///
/// The inner join drops claims with no history, which guards the
/// resolution-time average against the empty-history edge case.
pub async fn resolution_spans(
    db: &Database,
    closed_state_id: &str,
    client: Option<&str>,
) -> Result<Vec<(String, String)>, ClaimflowError> {
    let closed = closed_state_id.to_string();
    let client = client.map(|c| c.to_string());
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT MIN(h.occurred_at), c.updated_at
                 FROM claims c
                 JOIN claim_history h ON h.claim_id = c.id
                 WHERE c.state = ?1 AND (?2 IS NULL OR c.client = ?2)
                 GROUP BY c.id",
            )?;
            let rows = stmt.query_map(params![closed, client], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })?;
            let mut spans = Vec::new();
            for row in rows {
                spans.push(row?);
            }
            Ok(spans)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
