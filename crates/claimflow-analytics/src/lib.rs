// SPDX-FileCopyrightText: 2026 Claimflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Analytics aggregator.
//!
//! Derives dashboard metrics and categorical/time-series breakdowns from the
//! claim collection, on demand, with no caching. Results are a best-effort
//! snapshot: aggregations run concurrently with claim mutations and never
//! take locks. Requester scoping follows the exact claim-listing rule,
//! including the fail-closed branch for unlinked client requesters.

use std::sync::Arc;

use chrono::{Datelike, Duration, TimeZone, Utc};

use claimflow_claims::scope::{resolve_client_scope, ClientScope};
use claimflow_core::types::{
    AssigneeStats, DashboardStats, NamedCount, WeekdayCount, CLOSED_STATE_NAME,
};
use claimflow_core::{time, ClaimflowError, ClientDirectory, Identity};
use claimflow_storage::queries::{refs, stats};
use claimflow_storage::Database;

/// Fixed weekday bucket order for the trailing-7-day chart.
const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Analytics aggregator over the claim collection.
pub struct AnalyticsService {
    db: Arc<Database>,
    directory: Arc<dyn ClientDirectory>,
}

impl AnalyticsService {
    pub fn new(db: Arc<Database>, directory: Arc<dyn ClientDirectory>) -> Self {
        Self { db, directory }
    }

    /// Scalar dashboard metrics.
    pub async fn dashboard_stats(
        &self,
        requester: Option<&Identity>,
    ) -> Result<DashboardStats, ClaimflowError> {
        let scope = self.scope(requester).await?;
        if scope.is_denied() {
            return Ok(DashboardStats {
                total: 0,
                growth_pct: growth_percentage(0, 0),
                in_process: 0,
                closed: 0,
                average_resolution_days: 0.0,
            });
        }
        let filter = scope.filter();

        let total = stats::count_claims(&self.db, filter).await?;

        let now = Utc::now();
        let this_month = month_start(now.year(), now.month())?;
        let last_month = match now.month() {
            1 => month_start(now.year() - 1, 12)?,
            m => month_start(now.year(), m - 1)?,
        };
        let this_count = stats::count_created_between(
            &self.db,
            &time::format(this_month),
            None,
            filter,
        )
        .await?;
        let last_count = stats::count_created_between(
            &self.db,
            &time::format(last_month),
            Some(&time::format(this_month)),
            filter,
        )
        .await?;

        let closed_state = refs::find_state_by_name(&self.db, CLOSED_STATE_NAME).await?;
        let closed = match &closed_state {
            Some(state) => stats::count_in_state(&self.db, &state.id, filter).await?,
            None => 0,
        };
        let average_resolution_days = match &closed_state {
            Some(state) => {
                let spans = stats::resolution_spans(&self.db, &state.id, filter).await?;
                average_resolution_days(&spans)
            }
            None => 0.0,
        };

        Ok(DashboardStats {
            total,
            growth_pct: growth_percentage(last_count, this_count),
            // Every non-closed claim counts as in process, null states included.
            in_process: total - closed,
            closed,
            average_resolution_days,
        })
    }

    /// Claims created in the trailing 7 days (today inclusive), bucketed
    /// per weekday. Always exactly 7 buckets, Monday first, zero-filled.
    pub async fn claims_by_weekday(
        &self,
        requester: Option<&Identity>,
    ) -> Result<Vec<WeekdayCount>, ClaimflowError> {
        let mut counts = [0i64; 7];

        let scope = self.scope(requester).await?;
        if !scope.is_denied() {
            let now = Utc::now();
            let today_start = Utc
                .with_ymd_and_hms(now.year(), now.month(), now.day(), 0, 0, 0)
                .single()
                .ok_or_else(|| ClaimflowError::Internal("invalid day start".to_string()))?;
            let window_start = today_start - Duration::days(6);

            let timestamps =
                stats::created_since(&self.db, &time::format(window_start), scope.filter())
                    .await?;
            for ts in &timestamps {
                if let Some(instant) = time::parse(ts) {
                    counts[instant.weekday().num_days_from_monday() as usize] += 1;
                }
            }
        }

        Ok(WEEKDAYS
            .iter()
            .zip(counts)
            .map(|(weekday, count)| WeekdayCount {
                weekday: weekday.to_string(),
                count,
            })
            .collect())
    }

    /// Claim counts per area, joined to display names. Areas without claims
    /// are omitted.
    pub async fn claims_by_area(
        &self,
        requester: Option<&Identity>,
    ) -> Result<Vec<NamedCount>, ClaimflowError> {
        let scope = self.scope(requester).await?;
        if scope.is_denied() {
            return Ok(Vec::new());
        }
        stats::count_by_area(&self.db, scope.filter()).await
    }

    /// Claim counts per claim type.
    pub async fn claims_by_type(
        &self,
        requester: Option<&Identity>,
    ) -> Result<Vec<NamedCount>, ClaimflowError> {
        let scope = self.scope(requester).await?;
        if scope.is_denied() {
            return Ok(Vec::new());
        }
        stats::count_by_type(&self.db, scope.filter()).await
    }

    /// Per-assignee workload split, descending by total, top 10.
    pub async fn claims_by_assignee(
        &self,
        requester: Option<&Identity>,
    ) -> Result<Vec<AssigneeStats>, ClaimflowError> {
        let scope = self.scope(requester).await?;
        if scope.is_denied() {
            return Ok(Vec::new());
        }
        let closed_state = refs::find_state_by_name(&self.db, CLOSED_STATE_NAME).await?;
        stats::assignee_breakdown(&self.db, closed_state.as_ref().map(|s| s.id.as_str()), scope.filter())
            .await
    }

    async fn scope(&self, requester: Option<&Identity>) -> Result<ClientScope, ClaimflowError> {
        resolve_client_scope(self.directory.as_ref(), requester).await
    }
}

/// Month-over-month growth as a signed percentage string.
///
/// A zero baseline cannot be divided: any growth from zero reports +100.0%,
/// and zero-to-zero reports +0.0%.
fn growth_percentage(last_month: i64, this_month: i64) -> String {
    if last_month == 0 {
        if this_month == 0 {
            return "+0.0%".to_string();
        }
        return "+100.0%".to_string();
    }
    let pct = (this_month - last_month) as f64 / last_month as f64 * 100.0;
    if pct >= 0.0 {
        format!("+{pct:.1}%")
    } else {
        format!("{pct:.1}%")
    }
}

/// Mean elapsed days across `(first_history, last_update)` span pairs,
/// rounded to two decimals. Unparseable spans are skipped.
fn average_resolution_days(spans: &[(String, String)]) -> f64 {
    let mut total_days = 0.0;
    let mut counted = 0usize;
    for (opened, closed) in spans {
        if let (Some(from), Some(to)) = (time::parse(opened), time::parse(closed)) {
            total_days += (to - from).num_milliseconds() as f64 / 86_400_000.0;
            counted += 1;
        }
    }
    if counted == 0 {
        return 0.0;
    }
    (total_days / counted as f64 * 100.0).round() / 100.0
}

fn month_start(year: i32, month: u32) -> Result<chrono::DateTime<Utc>, ClaimflowError> {
    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| ClaimflowError::Internal(format!("invalid month start {year}-{month}")))
}
