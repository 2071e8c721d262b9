//! bazaar-server — multi-vendor catalog backend
//!
//! Long-running service that:
//! - Manages vendor products, variants, stock, and pricing (JWT authenticated)
//! - Manages the category / sub-category tree
//! - Ingests bulk catalog uploads (CSV / XLSX)

mod api;
mod auth;
mod catalog;
mod config;
mod db;
mod error;
mod services;
mod state;

use config::Config;
use state::AppState;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bazaar_server=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    tracing::info!("Starting bazaar-server (env: {})", config.environment);

    // Initialize application state
    let state = AppState::new(&config).await?;

    // Periodic verification session eviction (every 5 minutes)
    let sessions = state.verification.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(300));
        loop {
            interval.tick().await;
            sessions.evict_expired().await;
        }
    });

    // Build router and serve
    let app = api::create_router(state);

    let http_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&http_addr).await?;
    tracing::info!("bazaar-server HTTP listening on {http_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
