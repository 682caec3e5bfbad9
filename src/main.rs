mod api;
mod config;
mod data_structs;
mod error;
mod resolution;
mod routes;

use std::net::SocketAddr;

use dotenvy::dotenv;
use tracing_subscriber::EnvFilter;

use config::BridgeConfig;
use routes::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cfg = BridgeConfig::from_env();
    let addr: SocketAddr = format!("{}:{}", cfg.bind, cfg.port).parse()?;

    tracing::info!(
        "upstream {} at {} (timeout {:?})",
        cfg.upstream.name(),
        cfg.upstream_url,
        cfg.upstream_timeout
    );

    let prefix = cfg.route_prefix.clone();
    let state = AppState::new(cfg)?;
    let app = routes::udf_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("UDF bridge listening on http://{addr}{prefix}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to install Ctrl+C handler: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received, stopping");
}
