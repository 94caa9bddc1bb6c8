//! `invento serve` - prepare the database and run the dashboard.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use invento_audit::ActivityLogger;
use invento_core::AppConfig;
use invento_dashboard::{AppState, DashboardServer};
use invento_store::InitOptions;
use tokio::net::{TcpListener, TcpStream};
use tracing::{info, warn};

const PORT_PROBE_TIMEOUT: Duration = Duration::from_millis(500);

/// Whether something already accepts connections on the local `port`.
pub async fn port_in_use(port: u16) -> bool {
    matches!(
        tokio::time::timeout(PORT_PROBE_TIMEOUT, TcpStream::connect(("127.0.0.1", port))).await,
        Ok(Ok(_))
    )
}

pub async fn run(config: &AppConfig) -> Result<()> {
    let port = config.server.port;
    if port_in_use(port).await {
        bail!("port {port} is already in use");
    }

    let opts = InitOptions::from_config(&config.database)?;
    let store = invento_store::prepare(&config.database.path, &opts)
        .await
        .with_context(|| {
            format!("failed to prepare database {}", config.database.path.display())
        })?;
    info!(path = %config.database.path.display(), "database ready");

    let activity = Arc::new(
        ActivityLogger::new(&config.logging).context("failed to open the activity log")?,
    );
    activity.system("Application started").await;

    let state = AppState::new(store.clone(), activity.clone(), &config.session)?;
    let address = config.server.address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;

    DashboardServer::new(state)
        .serve(listener, shutdown_signal())
        .await?;

    activity.system("Application stopped").await;
    store.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
