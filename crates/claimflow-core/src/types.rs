// SPDX-FileCopyrightText: 2026 Claimflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Claimflow workspace.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Default priority label assigned to claims created without one.
pub const DEFAULT_PRIORITY: &str = "Normal";

/// Default criticality label assigned to claims created without one.
pub const DEFAULT_CRITICALITY: &str = "Medium";

/// Name of the reference state assigned to freshly created claims.
pub const INITIAL_STATE_NAME: &str = "Received";

/// Name of the reference state analytics treats as terminal.
pub const CLOSED_STATE_NAME: &str = "Closed";

/// Requester role as resolved by the identity provider.
///
/// Anything that is not the client role is staff: the original system
/// distinguishes only "client" from every internal role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Client,
    Staff,
}

impl Role {
    /// Map a raw role name from the identity provider onto [`Role`].
    pub fn from_role_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("client") {
            Role::Client
        } else {
            Role::Staff
        }
    }
}

/// A resolved caller identity: id, role, and optionally a display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub role: Role,
    pub name: Option<String>,
}

/// Discriminant for message authorship, derived from the sender's role.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SenderKind {
    Client,
    Staff,
}

/// Message author, tagged by origin.
///
/// The kind is always derived from the caller's resolved role, never taken
/// from the request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Sender {
    Client { id: String, name: String },
    Staff { id: String, name: String },
}

impl Sender {
    pub fn kind(&self) -> SenderKind {
        match self {
            Sender::Client { .. } => SenderKind::Client,
            Sender::Staff { .. } => SenderKind::Staff,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Sender::Client { id, .. } | Sender::Staff { id, .. } => id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Sender::Client { name, .. } | Sender::Staff { name, .. } => name,
        }
    }
}

/// One immutable audit record owned by a claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub occurred_at: String,
    pub action: String,
    pub actor: String,
}

/// A support claim raised by a client against a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub id: String,
    pub claim_type: String,
    pub priority: String,
    pub criticality: String,
    pub description: String,
    pub evidence: Option<String>,
    pub state: Option<String>,
    pub area: Option<String>,
    pub client: String,
    pub project: String,
    pub assignees: Vec<String>,
    pub history: Vec<HistoryEntry>,
    pub created_at: String,
    pub updated_at: String,
}

/// A claim with its reference display names resolved via an explicit join.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClaimDetail {
    #[serde(flatten)]
    pub claim: Claim,
    pub client_name: Option<String>,
    pub project_name: Option<String>,
    pub state_name: Option<String>,
    pub area_name: Option<String>,
}

/// Input for claim creation. Absent optional fields fall back to domain
/// defaults; an absent state is resolved to the initial reference state.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewClaim {
    pub claim_type: String,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub criticality: Option<String>,
    pub description: String,
    #[serde(default)]
    pub evidence: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub area: Option<String>,
    pub client: String,
    pub project: String,
    #[serde(default)]
    pub assignees: Vec<String>,
}

/// Directive carried by a claim patch: append one history entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HistoryDirective {
    pub action: String,
    pub actor: String,
}

/// Partial claim update. Fields present replace the stored value wholesale;
/// the `history` directive appends and never overwrites.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClaimPatch {
    #[serde(default)]
    pub claim_type: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub criticality: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub evidence: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub assignees: Option<Vec<String>>,
    #[serde(default)]
    pub history: Option<HistoryDirective>,
}

impl ClaimPatch {
    /// True when no field and no history directive is present.
    pub fn is_empty(&self) -> bool {
        self.claim_type.is_none()
            && self.priority.is_none()
            && self.criticality.is_none()
            && self.description.is_none()
            && self.evidence.is_none()
            && self.state.is_none()
            && self.area.is_none()
            && self.assignees.is_none()
            && self.history.is_none()
    }
}

/// A chat message bound to one claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub claim_id: String,
    pub content: String,
    pub sender: Sender,
    pub read: bool,
    pub created_at: String,
    pub deleted_at: Option<String>,
}

/// Input for message creation.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMessage {
    pub claim_id: String,
    pub content: String,
}

/// A client record from the reference store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRecord {
    pub id: String,
    pub name: String,
    /// Identity-provider user id linked to this client, if any.
    pub user_id: Option<String>,
}

/// A named reference record (state, area, claim type).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefRecord {
    pub id: String,
    pub name: String,
}

/// Scalar dashboard metrics, computed fresh per request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total: i64,
    /// Signed month-over-month growth, e.g. "+100.0%" or "-50.0%".
    pub growth_pct: String,
    pub in_process: i64,
    pub closed: i64,
    /// Mean days from first history entry to last update, closed claims only.
    pub average_resolution_days: f64,
}

/// One weekday bucket of the trailing-7-day chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekdayCount {
    pub weekday: String,
    pub count: i64,
}

/// A `{name, count}` pair for the area and type breakdowns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedCount {
    pub name: String,
    pub count: i64,
}

/// Per-assignee workload split.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssigneeStats {
    pub assignee: String,
    pub total: i64,
    pub in_process: i64,
    pub resolved: i64,
}
