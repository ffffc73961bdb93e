//! ScholarGraph Server - Main entry point

use anyhow::Result;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use scholargraph_common::logging::{init_logging, LogConfig};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::info;

use scholargraph_server::{
    config::Config,
    features,
    graph::Neo4jStore,
    ingest::{FreshnessPolicy, IngestOrchestrator},
    middleware,
    openalex::OpenAlexClient,
};

/// Application state shared across handlers
#[derive(Clone)]
struct AppState {
    store: Neo4jStore,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging with configuration from environment
    let log_config = LogConfig::default()
        .with_file_prefix("scholargraph-server")
        .with_filter("scholargraph_server=debug,tower_http=debug,axum=trace,neo4rs=info");

    // Merge with environment variables (they take precedence)
    let log_config = LogConfig::from_env().unwrap_or(log_config);

    init_logging(&log_config)?;

    info!("Starting ScholarGraph Server");

    // Load configuration
    let config = Config::load()?;
    info!(
        "Configuration loaded - server will bind to {}:{}",
        config.server.host, config.server.port
    );

    // Connect to Neo4j and verify the connection
    let store = Neo4jStore::connect(&config.graph).await?;
    info!("Graph store connection established");

    // Upstream source client
    let source = OpenAlexClient::new(&config.openalex)?;
    info!("OpenAlex client initialized (base url: {})", config.openalex.base_url);

    let source = Arc::new(source);
    let shared_store: Arc<dyn scholargraph_server::graph::GraphStore> = Arc::new(store.clone());
    let orchestrator = Arc::new(IngestOrchestrator::new(
        source.clone(),
        shared_store.clone(),
        config.ingest.clone(),
    ));

    let state = AppState { store };

    let feature_state = features::FeatureState {
        orchestrator,
        store: shared_store,
        source,
        freshness: FreshnessPolicy::new(config.ingest.staleness_days),
    };

    // Build the application router
    let app = create_router(state, feature_state, &config);

    // Create socket address
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Start server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.server.shutdown_timeout_secs))
        .await?;

    info!("Server shut down gracefully");

    Ok(())
}

/// Create the application router with all routes and middleware
fn create_router(state: AppState, feature_state: features::FeatureState, config: &Config) -> Router {
    let feature_routes = features::router(feature_state);

    Router::new()
        .route("/health", get(health_check))
        .with_state(state)
        .nest("/api/v1", feature_routes)
        // Apply layers from innermost to outermost
        .layer(middleware::tracing_layer())
        .layer(middleware::cors_layer(&config.cors))
}

/// Health check handler
async fn health_check(State(state): State<AppState>) -> Result<Response, StatusCode> {
    match state.store.ping().await {
        Ok(()) => Ok((
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "graph": "connected"
            })),
        )
            .into_response()),
        Err(e) => {
            tracing::error!("Graph health check failed: {:?}", e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        },
    }
}

/// Wait for a shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal(timeout_secs: u64) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }

    // Give ongoing requests and background ingestion time to complete
    info!("Waiting up to {} seconds for connections to close", timeout_secs);
    tokio::time::sleep(Duration::from_secs(timeout_secs.min(5))).await;
}
