use anyhow::Context;
use lawn_estimator::{api::create_router, Settings};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::load().context("failed to load settings")?;
    info!(?settings, "settings");

    let app = create_router(settings.bing_pipeline()?);

    let listener = tokio::net::TcpListener::bind(settings.server.address)
        .await
        .with_context(|| format!("failed to bind {}", settings.server.address))?;

    info!(address = %settings.server.address, "lawn estimator API listening");
    info!("POST /api/estimate-lawn  {{address}} or {{coordinates, zoom, mapWidth, mapHeight, mapBounds}}");
    info!("POST /api/geocode        {{address}}");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
