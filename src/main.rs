use std::sync::Arc;

use anyhow::{Error, Result, anyhow};
use communication_gateway::{
    api::{AppState, run_api_server},
    clients::{configured_providers, karma::KarmaTrackerClient},
    config::Config,
    gateway::{ChannelDispatcher, GatewayOrchestrator, RewardPublisher},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow!("Failed to install rustls crypto provider"))?;

    let config = Config::load()?;
    info!(services = ?config.summary(), "Configuration validated");

    let dispatcher = configured_providers(&config)?
        .into_iter()
        .fold(ChannelDispatcher::new(), |dispatcher, (channel, provider)| {
            dispatcher.with_provider(channel, provider)
        });

    let publisher = RewardPublisher::new(Arc::new(KarmaTrackerClient::new(&config)?));

    let state = Arc::new(AppState {
        gateway: GatewayOrchestrator::new(dispatcher, publisher),
        services: config.summary(),
    });

    run_api_server(state, config.server_port).await
}
