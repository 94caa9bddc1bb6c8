//! Dashboard server implementation.

use std::future::Future;
use std::net::SocketAddr;

use tokio::net::TcpListener;

use crate::error::DashboardError;
use crate::routes;
use crate::state::AppState;

/// The dashboard server.
pub struct DashboardServer {
    state: AppState,
}

impl DashboardServer {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    ///
    /// Client addresses are recorded, so handlers see the real IP.
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> Result<(), DashboardError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if let Ok(addr) = listener.local_addr() {
            tracing::info!(address = %addr, "Starting Invento dashboard");
        }

        let app = routes::create_router(self.state.clone());

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| DashboardError::StartupFailed(e.to_string()))?;

        tracing::info!("Invento dashboard stopped");
        Ok(())
    }
}
