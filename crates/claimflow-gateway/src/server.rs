// SPDX-FileCopyrightText: 2026 Claimflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;

use axum::{
    routing::{get, patch, post},
    Router,
};
use tower_http::cors::CorsLayer;

use claimflow_analytics::AnalyticsService;
use claimflow_claims::ClaimService;
use claimflow_core::{ClaimflowError, IdentityResolver};
use claimflow_messaging::{MessageService, RoomRegistry};

use crate::handlers;
use crate::ws;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Claim lifecycle manager.
    pub claims: Arc<ClaimService>,
    /// Message service (policy + persistence).
    pub messages: Arc<MessageService>,
    /// Analytics aggregator.
    pub analytics: Arc<AnalyticsService>,
    /// External identity provider.
    pub identity: Arc<dyn IdentityResolver>,
    /// Real-time room registry shared by all WebSocket connections.
    pub rooms: Arc<RoomRegistry>,
    /// Process start time for uptime reporting.
    pub started_at: std::time::Instant,
}

/// Gateway server configuration (mirrors ServerConfig from claimflow-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

/// Assemble the full route tree.
pub fn build_router(state: AppState) -> Router {
    // Unauthenticated liveness probe.
    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .with_state(state.clone());

    let claim_routes = Router::new()
        .route(
            "/claim",
            post(handlers::create_claim).get(handlers::list_claims),
        )
        .route("/claim/dashboard/stats", get(handlers::dashboard_stats))
        .route("/claim/dashboard/chart-days", get(handlers::chart_days))
        .route("/claim/dashboard/chart-areas", get(handlers::chart_areas))
        .route("/claim/dashboard/chart-types", get(handlers::chart_types))
        .route(
            "/claim/dashboard/chart-assignees",
            get(handlers::chart_assignees),
        )
        .route(
            "/claim/{id}",
            get(handlers::get_claim)
                .patch(handlers::update_claim)
                .delete(handlers::delete_claim),
        )
        .with_state(state.clone());

    let message_routes = Router::new()
        .route("/message/claim/{claim_id}", get(handlers::list_messages))
        .route(
            "/message/claim/{claim_id}/unread/{kind}",
            get(handlers::unread_count),
        )
        .route("/message/{id}/read", patch(handlers::mark_message_read))
        .with_state(state.clone());

    // WebSocket route (identity resolved during the handshake).
    let ws_routes = Router::new()
        .route("/ws", get(ws::ws_handler))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(claim_routes)
        .merge(message_routes)
        .merge(ws_routes)
        .layer(CorsLayer::permissive())
}

/// Start the gateway HTTP/WebSocket server.
pub async fn start_server(config: &ServerConfig, state: AppState) -> Result<(), ClaimflowError> {
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener =
        tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| ClaimflowError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("gateway server listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| ClaimflowError::Internal(format!("gateway server error: {e}")))?;

    Ok(())
}
