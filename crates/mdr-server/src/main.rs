//! MDR Server - Main entry point

use anyhow::Result;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use mdr_common::logging::{init_logging, LogConfig};
use serde_json::json;
use sqlx::postgres::PgPoolOptions;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::signal;
use tower_http::compression::CompressionLayer;
use tracing::info;

use mdr_server::{
    config::{Config, StoreBackend},
    features, middleware,
    store::{EntityStore, MemoryEntityStore, PgEntityStore},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging with configuration from environment
    let log_config = LogConfig::builder()
        .log_file_prefix("mdr-server".to_string())
        .filter_directives("mdr_server=debug,tower_http=debug,axum=trace,sqlx=info".to_string())
        .build();

    // Merge with environment variables (they take precedence)
    let log_config = LogConfig::from_env().unwrap_or(log_config);

    init_logging(&log_config)?;

    info!("Starting MDR Server");

    // Load configuration
    let config = Config::load()?;
    info!(
        "Configuration loaded - server will bind to {}:{}",
        config.server.host, config.server.port
    );

    // Initialize the entity store backend
    let store = build_store(&config).await?;

    // Build the application router
    let app = create_router(store, &config);

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

/// Construct the configured entity store backend
async fn build_store(config: &Config) -> Result<Arc<dyn EntityStore>> {
    match config.store.backend {
        StoreBackend::Postgres => {
            let pool = PgPoolOptions::new()
                .max_connections(config.store.max_connections)
                .min_connections(config.store.min_connections)
                .acquire_timeout(Duration::from_secs(config.store.connect_timeout_secs))
                .idle_timeout(Duration::from_secs(config.store.idle_timeout_secs))
                .connect(&config.store.url)
                .await?;

            info!("Database connection pool established");

            sqlx::migrate!("../../migrations")
                .run(&pool)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))?;

            info!("Database migrations completed");

            Ok(Arc::new(PgEntityStore::new(pool)))
        },
        StoreBackend::Memory => {
            info!("Using in-memory entity store (records will not survive a restart)");
            Ok(Arc::new(MemoryEntityStore::new()))
        },
    }
}

/// Create the application router with all routes and middleware
fn create_router(store: Arc<dyn EntityStore>, config: &Config) -> Router {
    let feature_state = features::FeatureState { store };

    let feature_routes = features::router(feature_state.clone());

    // Apply layers from innermost to outermost
    Router::new()
        .route("/health", get(health_check))
        .with_state(feature_state)
        .nest("/api/v1", feature_routes)
        .layer(CompressionLayer::new())
        .layer(middleware::tracing_layer())
        .layer(middleware::cors_layer(&config.cors))
}

/// Health check handler
async fn health_check(State(state): State<features::FeatureState>) -> Result<Response, StatusCode> {
    match state.store.ping().await {
        Ok(()) => Ok((
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "store": "connected"
            })),
        )
            .into_response()),
        Err(e) => {
            tracing::error!("Store health check failed: {:?}", e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        },
    }
}

/// Graceful shutdown signal handler
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
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            },
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

    // Give ongoing requests time to complete
    info!("Waiting up to {} seconds for connections to close", timeout_secs);
    tokio::time::sleep(Duration::from_secs(timeout_secs.min(5))).await;
}
