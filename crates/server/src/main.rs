use anyhow::Context;
use clap::Parser;
use server::{DeploymentImpl, config::ServerConfig, routes};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = ServerConfig::parse();
    utils::logging::init("info");

    let deployment = DeploymentImpl::new(config.clone())
        .await
        .context("failed to initialise database")?;
    let app = routes::router(deployment);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("failed to bind {}:{}", config.host, config.port))?;
    let addr = listener.local_addr()?;

    info!(mode = %config.mode, "Backend server running on http://{}", addr);
    if let Some(frontend) = config.frontend_dir() {
        info!("Serving frontend from {}", frontend.display());
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install Ctrl+C handler: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
