// SPDX-FileCopyrightText: 2026 Claimflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `claimflow serve` command implementation.
//!
//! Opens the SQLite store, seeds the claim-state ladder, wires the domain
//! services behind their capability traits, and runs the gateway until a
//! shutdown signal arrives.

use std::sync::Arc;

use tracing::info;

use claimflow_analytics::AnalyticsService;
use claimflow_claims::ClaimService;
use claimflow_config::ClaimflowConfig;
use claimflow_core::{ClaimflowError, ClientDirectory, IdentityResolver};
use claimflow_gateway::{start_server, AppState, ServerConfig};
use claimflow_identity::HttpIdentityProvider;
use claimflow_messaging::{MessageService, RoomRegistry};
use claimflow_storage::queries::refs;
use claimflow_storage::{Database, StoreDirectory};

/// Runs the `claimflow serve` command.
pub async fn run_serve(config: ClaimflowConfig) -> Result<(), ClaimflowError> {
    init_tracing(&config.log.level);
    info!("starting claimflow serve");

    // Storage first: everything else hangs off the database handle.
    let db = Arc::new(Database::open_with(&config.storage).await?);
    refs::seed_claim_states(&db).await?;
    info!(path = config.storage.database_path.as_str(), "storage ready");

    let directory: Arc<dyn ClientDirectory> = Arc::new(StoreDirectory::new(Arc::clone(&db)));
    let claims = Arc::new(ClaimService::new(Arc::clone(&db), directory.clone()));
    let identity: Arc<dyn IdentityResolver> =
        Arc::new(HttpIdentityProvider::new(&config.identity)?);
    let messages = Arc::new(MessageService::new(
        Arc::clone(&db),
        claims.clone(),
        directory.clone(),
        identity.clone(),
    ));
    let analytics = Arc::new(AnalyticsService::new(Arc::clone(&db), directory));
    info!(
        identity_base_url = config.identity.base_url.as_str(),
        "services wired"
    );

    let state = AppState {
        claims,
        messages,
        analytics,
        identity,
        rooms: Arc::new(RoomRegistry::new()),
        started_at: std::time::Instant::now(),
    };

    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
    };

    tokio::select! {
        result = start_server(&server_config, state) => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
        }
    }

    db.close().await?;
    info!("claimflow serve shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("claimflow={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
