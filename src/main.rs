//! affinity-gateway server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::Router;
use axum::routing::get;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use affinity_gateway::api;
use affinity_gateway::app_state::AppState;
use affinity_gateway::config::GatewayConfig;
use affinity_gateway::domain::{EventBus, InterestStore, RoomRegistry};
use affinity_gateway::embedding::EmbeddingClient;
use affinity_gateway::persistence::InterestArchive;
use affinity_gateway::service::{MatchService, PresenceTracker};
use affinity_gateway::ws::handler::ws_handler;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = GatewayConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting affinity-gateway");

    // Build domain layer
    let store = Arc::new(InterestStore::new());
    let rooms = Arc::new(RoomRegistry::new());
    let presence = Arc::new(PresenceTracker::new());
    let event_bus = EventBus::new(config.event_bus_capacity);

    let embedding =
        EmbeddingClient::new(config.embedding_url.clone(), config.embedding_timeout_secs);

    // Optional write-behind archive; the in-process store stays
    // authoritative either way.
    let archive = if config.persistence_enabled {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await
            .context("connecting to the interest archive database")?;
        let archive = InterestArchive::new(pool);
        archive
            .ensure_schema()
            .await
            .context("preparing the interests table")?;
        tracing::info!("interest archive enabled");
        Some(archive)
    } else {
        None
    };

    // Build service layer
    let match_service = Arc::new(MatchService::new(
        store,
        rooms,
        presence,
        embedding,
        event_bus.clone(),
        config.match_threshold,
        archive,
    ));

    // Build application state
    let app_state = AppState {
        match_service,
        event_bus,
    };

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
