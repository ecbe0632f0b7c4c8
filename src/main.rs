use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use feedguard_api::api::{create_router, AppState};
use feedguard_api::config::Config;
use feedguard_api::services::providers::{HttpSearchProvider, HttpTrendingProvider};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let addr = format!("{}:{}", config.host, config.port);

    // External collaborators
    let search = Arc::new(HttpSearchProvider::new(config.search_api_url.clone()));
    let trending = Arc::new(HttpTrendingProvider::new(config.trending_api_url.clone()));

    let state = AppState::new(config, search, trending);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "feedguard API listening");
    axum::serve(listener, app).await?;

    Ok(())
}
