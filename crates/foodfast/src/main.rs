use actor_framework::tracing::setup_tracing;
use anyhow::Context;
use foodfast::config::Config;
use foodfast::http::{router, shutdown_signal};
use foodfast::lifecycle::FoodFastSystem;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_tracing();

    let config = Config::from_env()?;
    info!("Initializing system...");
    let system = FoodFastSystem::start(&config).await?;

    let address = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("binding {address}"))?;
    info!("Server running on {address}");

    axum::serve(listener, router(system.state()))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    system.shutdown().await?;
    info!("Server stopped");
    Ok(())
}
