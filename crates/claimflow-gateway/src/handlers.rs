// SPDX-FileCopyrightText: 2026 Claimflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.
//!
//! Identity-scoped routes (claim listing, dashboards, message threads)
//! resolve the caller from the bearer credential before delegating. A
//! missing credential or a failed resolution is answered with an error,
//! never with a silently broadened (or silently emptied) result.

use std::str::FromStr;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use claimflow_core::types::{
    AssigneeStats, ClaimDetail, DashboardStats, NamedCount, WeekdayCount,
};
use claimflow_core::{
    ClaimPatch, ClaimflowError, Identity, Message, NewClaim, NewMessage, SenderKind,
};

use crate::server::AppState;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error description.
    pub error: String,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Health status string.
    pub status: String,
    /// Binary version.
    pub version: String,
    /// Uptime in seconds.
    pub uptime_secs: u64,
}

/// Error wrapper carrying the HTTP status to answer with.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn unauthorized(message: &str) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.to_string(),
        }
    }

    #[cfg(test)]
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<ClaimflowError> for ApiError {
    fn from(err: ClaimflowError) -> Self {
        let status = match &err {
            ClaimflowError::NotFound { .. } => StatusCode::NOT_FOUND,
            ClaimflowError::Forbidden(_) => StatusCode::FORBIDDEN,
            ClaimflowError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ClaimflowError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            ClaimflowError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            ClaimflowError::Config(_)
            | ClaimflowError::Storage { .. }
            | ClaimflowError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let message = if status.is_server_error() {
            tracing::error!(error = %err, "request failed");
            "internal error".to_string()
        } else {
            err.to_string()
        };
        Self { status, message }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

/// Extract the bearer token from an Authorization header.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// Resolve the caller identity or fail closed.
async fn require_identity(state: &AppState, headers: &HeaderMap) -> Result<Identity, ApiError> {
    let token =
        bearer_token(headers).ok_or_else(|| ApiError::unauthorized("bearer credential required"))?;
    Ok(state.identity.resolve(token).await?)
}

/// GET /health
pub async fn get_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}

/// POST /claim
pub async fn create_claim(
    State(state): State<AppState>,
    Json(body): Json<NewClaim>,
) -> Result<(StatusCode, Json<ClaimDetail>), ApiError> {
    let detail = state.claims.create(body).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// GET /claim, scoped by the resolved caller identity.
pub async fn list_claims(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<ClaimDetail>>, ApiError> {
    let identity = require_identity(&state, &headers).await?;
    Ok(Json(state.claims.find_all(Some(&identity)).await?))
}

/// GET /claim/{id}
pub async fn get_claim(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ClaimDetail>, ApiError> {
    Ok(Json(state.claims.find_one(&id).await?))
}

/// PATCH /claim/{id}
pub async fn update_claim(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<ClaimPatch>,
) -> Result<Json<ClaimDetail>, ApiError> {
    Ok(Json(state.claims.update(&id, patch).await?))
}

/// DELETE /claim/{id}
pub async fn delete_claim(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.claims.remove(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /claim/dashboard/stats
pub async fn dashboard_stats(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<DashboardStats>, ApiError> {
    let identity = require_identity(&state, &headers).await?;
    Ok(Json(state.analytics.dashboard_stats(Some(&identity)).await?))
}

/// GET /claim/dashboard/chart-days
pub async fn chart_days(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<WeekdayCount>>, ApiError> {
    let identity = require_identity(&state, &headers).await?;
    Ok(Json(
        state.analytics.claims_by_weekday(Some(&identity)).await?,
    ))
}

/// GET /claim/dashboard/chart-areas
pub async fn chart_areas(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<NamedCount>>, ApiError> {
    let identity = require_identity(&state, &headers).await?;
    Ok(Json(state.analytics.claims_by_area(Some(&identity)).await?))
}

/// GET /claim/dashboard/chart-types
pub async fn chart_types(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<NamedCount>>, ApiError> {
    let identity = require_identity(&state, &headers).await?;
    Ok(Json(state.analytics.claims_by_type(Some(&identity)).await?))
}

/// GET /claim/dashboard/chart-assignees
pub async fn chart_assignees(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<AssigneeStats>>, ApiError> {
    let identity = require_identity(&state, &headers).await?;
    Ok(Json(
        state.analytics.claims_by_assignee(Some(&identity)).await?,
    ))
}

/// GET /message/claim/{claim_id}
pub async fn list_messages(
    State(state): State<AppState>,
    Path(claim_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Vec<Message>>, ApiError> {
    let identity = require_identity(&state, &headers).await?;
    Ok(Json(
        state.messages.find_by_claim(&claim_id, &identity).await?,
    ))
}

/// PATCH /message/{id}/read
pub async fn mark_message_read(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Message>, ApiError> {
    Ok(Json(state.messages.mark_read(&id).await?))
}

/// GET /message/claim/{claim_id}/unread/{kind}
pub async fn unread_count(
    State(state): State<AppState>,
    Path((claim_id, kind)): Path<(String, String)>,
) -> Result<Json<i64>, ApiError> {
    let kind = SenderKind::from_str(&kind).map_err(|_| {
        ApiError::from(ClaimflowError::BadRequest(format!(
            "unknown sender kind: {kind}"
        )))
    })?;
    Ok(Json(state.messages.unread_count(&claim_id, kind).await?))
}

/// Persist a message then broadcast it to the claim's room. Shared by the
/// WebSocket send path.
pub(crate) async fn create_and_broadcast(
    state: &AppState,
    dto: NewMessage,
    identity: &Identity,
) -> Result<Message, ClaimflowError> {
    let claim_id = dto.claim_id.clone();
    // Persist first: broadcast order equals persistence order.
    let message = state.messages.create(dto, identity).await?;
    let payload = serde_json::json!({
        "event": crate::ws::events::NEW_MESSAGE,
        "message": message,
    });
    state.rooms.broadcast(&claim_id, &payload.to_string()).await;
    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_mapping_follows_the_taxonomy() {
        let cases = [
            (
                ApiError::from(ClaimflowError::not_found("claim", "c-1")),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::from(ClaimflowError::Forbidden("no".into())),
                StatusCode::FORBIDDEN,
            ),
            (
                ApiError::from(ClaimflowError::BadRequest("bad".into())),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::from(ClaimflowError::Upstream {
                    message: "down".into(),
                    source: None,
                }),
                StatusCode::BAD_GATEWAY,
            ),
            (
                ApiError::from(ClaimflowError::Timeout {
                    duration: std::time::Duration::from_secs(5),
                }),
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (
                ApiError::from(ClaimflowError::Internal("boom".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.status(), expected);
        }
    }

    #[test]
    fn server_errors_do_not_leak_details() {
        let err = ApiError::from(ClaimflowError::Internal("secret path /x".into()));
        assert_eq!(err.message, "internal error");

        let err = ApiError::from(ClaimflowError::BadRequest("description is required".into()));
        assert!(err.message.contains("description is required"));
    }

    #[test]
    fn bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        assert!(bearer_token(&headers).is_none());

        headers.insert("authorization", "Bearer tok-123".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("tok-123"));

        headers.insert("authorization", "Basic dXNlcg==".parse().unwrap());
        assert!(bearer_token(&headers).is_none());
    }

    #[test]
    fn health_response_serializes() {
        let resp = HealthResponse {
            status: "ok".to_string(),
            version: "0.1.0".to_string(),
            uptime_secs: 42,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"status\":\"ok\""));
        assert!(json.contains("\"uptime_secs\":42"));
    }

    #[test]
    fn error_response_serializes() {
        let resp = ErrorResponse {
            error: "something went wrong".to_string(),
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("something went wrong"));
    }
}
