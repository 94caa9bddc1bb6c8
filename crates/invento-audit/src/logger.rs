//! Activity logger.
//!
//! `ActivityLogger` is the single entry point handlers use to record what
//! users did. Each event is mirrored to `tracing`, kept in a bounded
//! in-memory ring for the activity page, and written to storage.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use invento_core::LoggingConfig;

use crate::error::ActivityError;
use crate::event::{ActivityEvent, ActivityKind, ActivityLevel};
use crate::storage::{ActivityStorage, DualStorage, NullStorage, RotatingFileStorage};

/// Events kept in memory for [`ActivityLogger::recent`].
pub const RECENT_CAPACITY: usize = 500;

pub struct ActivityLogger {
    storage: Arc<dyn ActivityStorage>,
    recent: Mutex<VecDeque<ActivityEvent>>,
    enabled: bool,
}

impl std::fmt::Debug for ActivityLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivityLogger")
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

impl ActivityLogger {
    /// File logger from configuration, echoing to stdout when
    /// `logging.stdout` is set.
    pub fn new(config: &LoggingConfig) -> Result<Self, ActivityError> {
        let file = RotatingFileStorage::new(&config.activity_file, config.max_bytes, config.backups)?;
        let storage: Arc<dyn ActivityStorage> = if config.stdout {
            Arc::new(DualStorage::new(file))
        } else {
            Arc::new(file)
        };
        Ok(Self::with_storage(storage))
    }

    /// Create a logger with a custom storage backend.
    pub fn with_storage(storage: Arc<dyn ActivityStorage>) -> Self {
        Self {
            storage,
            recent: Mutex::new(VecDeque::with_capacity(RECENT_CAPACITY)),
            enabled: true,
        }
    }

    /// Create a disabled (no-op) logger.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::with_storage(Arc::new(NullStorage::new()))
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Log an event, returning storage failures.
    pub async fn log(&self, event: ActivityEvent) -> Result<(), ActivityError> {
        if !self.enabled {
            return Ok(());
        }

        mirror_to_tracing(&event);

        if let Ok(mut recent) = self.recent.lock() {
            if recent.len() == RECENT_CAPACITY {
                recent.pop_front();
            }
            recent.push_back(event.clone());
        }

        self.storage.store(&event).await
    }

    /// Log an event; a storage failure is reported through `tracing` only.
    pub async fn record(&self, event: ActivityEvent) {
        if let Err(e) = self.log(event).await {
            tracing::error!(error = %e, "failed to write activity log");
        }
    }

    /// Newest events first, at most `limit`.
    pub fn recent(&self, limit: usize) -> Vec<ActivityEvent> {
        match self.recent.lock() {
            Ok(recent) => recent.iter().rev().take(limit).cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Log a system event not tied to any request.
    pub async fn system(&self, message: impl Into<String>) {
        self.record(ActivityEvent::new(ActivityKind::System, message))
            .await;
    }
}

fn mirror_to_tracing(event: &ActivityEvent) {
    macro_rules! emit {
        ($level:ident) => {
            tracing::$level!(
                event_id = %event.event_id,
                kind = %event.kind,
                client_ip = %event.client_ip,
                user = %event.user,
                "{}",
                event.message
            )
        };
    }
    match event.level {
        ActivityLevel::Debug => emit!(debug),
        ActivityLevel::Info => emit!(info),
        ActivityLevel::Warning => emit!(warn),
        ActivityLevel::Error => emit!(error),
    }
}
