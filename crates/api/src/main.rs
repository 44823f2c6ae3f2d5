use std::net::SocketAddr;
use std::sync::Arc;

use bounce_store::{JsonSlot, SnapshotCache, StoreConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bounce_api::config::ServerConfig;
use bounce_api::router::build_app_router;
use bounce_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "bounce_api=debug,bounce_store=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    let store_config = StoreConfig::from_env().expect("Invalid record store configuration");
    tracing::info!(store = %store_config.target.describe(), "Loaded store configuration");

    // --- Record store ---
    let store = bounce_store::connect(&store_config)
        .await
        .expect("Failed to initialise record store");

    if let Err(e) = store.ping().await {
        tracing::warn!(error = %e, "Record store did not answer the startup probe");
    }

    // --- Snapshot cache ---
    let cache = match &store_config.snapshot_path {
        Some(path) => SnapshotCache::persistent(JsonSlot::new(path)).await,
        None => SnapshotCache::in_memory(),
    };

    let config = Arc::new(config);
    let state = AppState {
        store,
        cache: Arc::new(cache),
        config: Arc::clone(&config),
    };
    let app = build_app_router(state);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
