//! Dashboard application state.

use std::sync::Arc;
use std::time::Duration;

use invento_audit::ActivityLogger;
use invento_core::SessionConfig;
use invento_store::Store;

use crate::error::DashboardError;
use crate::session::SessionCodec;

/// Shared application state for the dashboard.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Store,
    activity: Arc<ActivityLogger>,
    sessions: SessionCodec,
    session_lifetime: Duration,
}

impl AppState {
    /// State with a freshly generated session key.
    pub fn new(
        store: Store,
        activity: Arc<ActivityLogger>,
        session: &SessionConfig,
    ) -> Result<Self, DashboardError> {
        let lifetime = session
            .lifetime()
            .map_err(|e| DashboardError::StartupFailed(e.to_string()))?;
        let codec = SessionCodec::generate(session.cookie_secure)?;
        Ok(Self::with_codec(store, activity, codec, lifetime))
    }

    pub fn with_codec(
        store: Store,
        activity: Arc<ActivityLogger>,
        sessions: SessionCodec,
        session_lifetime: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                store,
                activity,
                sessions,
                session_lifetime,
            }),
        }
    }

    pub fn store(&self) -> &Store {
        &self.inner.store
    }

    pub fn activity(&self) -> &Arc<ActivityLogger> {
        &self.inner.activity
    }

    pub fn sessions(&self) -> &SessionCodec {
        &self.inner.sessions
    }

    /// Idle time after which the login gate ends a session.
    pub fn session_lifetime(&self) -> Duration {
        self.inner.session_lifetime
    }
}
