// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;
#[cfg(test)]
mod test_support;

use anyhow::Context;
use std::{net::SocketAddr, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::application::clone_service::CloneService;
use crate::application::clone_session::SessionStore;
use crate::application::dashboard_service::DashboardService;
use crate::application::platform_api::PlatformApi;
use crate::infrastructure::config::load_cloner_config;
use crate::infrastructure::superset_client::SupersetClient;
use crate::presentation::app_state::AppState;
use crate::presentation::routes::router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dashboard_cloner=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load_cloner_config().context("Failed to load cloner configuration")?;

    // Platform client (infrastructure layer); one login for the process
    let api: Arc<dyn PlatformApi> = Arc::new(SupersetClient::login(&config.superset).await?);

    // Services (application layer)
    let dashboard_service = DashboardService::new(api.clone(), &config.clone);
    let clone_service = CloneService::new(api, &config.clone);

    let state = Arc::new(AppState {
        dashboard_service,
        clone_service,
        sessions: Arc::new(SessionStore::default()),
    });

    let addr: SocketAddr = config
        .server
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", config.server.listen_addr))?;
    tracing::info!(%addr, "Starting dashboard-cloner service");

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router(state)).await?;

    Ok(())
}
