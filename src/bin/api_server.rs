// API Server Binary Entry Point
//
// Purpose: Load the crop model and serve the recommendation API
// Usage: cargo run --features api --bin api_server

use crop_recommender::{create_router, AppState};
use std::net::SocketAddr;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (structured logging)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    // Default log level: info for our crate, warn for others
                    "crop_recommender=info,tower_http=debug,axum=debug,warn".into()
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting API server...");

    // Configuration from environment variables
    let model_path = std::env::var("MODEL_PATH")
        .unwrap_or_else(|_| "models/crop_model.json".to_string());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);

    let cache_capacity: u64 = std::env::var("CACHE_CAPACITY")
        .ok()
        .and_then(|c| c.parse().ok())
        .unwrap_or(10_000);

    let cache_ttl_secs: u64 = std::env::var("CACHE_TTL_SECS")
        .ok()
        .and_then(|t| t.parse().ok())
        .unwrap_or(300);

    tracing::info!("Configuration:");
    tracing::info!("  MODEL_PATH: {}", model_path);
    tracing::info!("  PORT: {}", port);
    tracing::info!("  CACHE_CAPACITY: {}", cache_capacity);
    tracing::info!("  CACHE_TTL_SECS: {}", cache_ttl_secs);

    // Model is loaded once and shared read-only for the process lifetime
    let state = AppState::from_model_path(
        &model_path,
        cache_capacity,
        Duration::from_secs(cache_ttl_secs),
    )?;
    tracing::info!("Application state initialized successfully");

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
