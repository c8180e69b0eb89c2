use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use fulfillment_core::config::FulfillmentConfig;
use tracing::info;

mod app;
mod handlers;
mod http;

/// HTTP host for the fulfillment webhook.
#[derive(Debug, Parser)]
#[command(name = "fulfillment-gateway", version, about)]
struct Cli {
    /// Config file; falls back to FULFILLMENT_CONFIG, then
    /// ~/.fulfillment/fulfillment.toml.
    #[arg(long)]
    config: Option<String>,

    /// Override gateway.port from the config.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // config before tracing so the configured filter applies; RUST_LOG still wins
    let config_path = cli.config.or_else(|| std::env::var("FULFILLMENT_CONFIG").ok());
    let loaded = FulfillmentConfig::load(config_path.as_deref());
    let mut config = loaded.as_ref().cloned().unwrap_or_default();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.filter.as_str().into()),
        )
        .init();

    if let Err(e) = loaded {
        tracing::warn!("Config load failed ({}), using defaults", e);
    }
    if let Some(port) = cli.port {
        config.gateway.port = port;
    }

    let addr: SocketAddr = config.listen_addr().parse()?;
    let path = config.gateway.path.clone();
    let state = Arc::new(app::AppState::new(config, handlers::default_dispatch()));
    let router = app::build_router(state);

    info!(%addr, %path, "fulfillment gateway listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
