//! Activity event types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Client IP recorded when the connection address is not known.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Acting user recorded for events not tied to a session.
pub const SYSTEM_USER: &str = "system";

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    // ===== Session events =====
    LoggedIn,
    LoginFailed,
    LoggedOut,
    /// Idle session cleared by the login gate.
    SessionExpired,

    // ===== Inventory events =====
    ItemAdded,
    ItemDeleted,

    // ===== Request workflow =====
    RequestSubmitted,
    RequestApproved,
    RequestRejected,

    // ===== Failures =====
    /// A worker reached an admin-only action.
    AccessDenied,
    /// Form input failed validation.
    InvalidInput,
    DatabaseError,

    /// Startup, shutdown and maintenance.
    System,
}

impl ActivityKind {
    /// Severity used when the builder is not told otherwise.
    pub fn default_level(&self) -> ActivityLevel {
        match self {
            Self::LoginFailed | Self::AccessDenied | Self::InvalidInput => ActivityLevel::Warning,
            Self::DatabaseError => ActivityLevel::Error,
            _ => ActivityLevel::Info,
        }
    }
}

impl std::fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LoggedIn => write!(f, "LOGGED_IN"),
            Self::LoginFailed => write!(f, "LOGIN_FAILED"),
            Self::LoggedOut => write!(f, "LOGGED_OUT"),
            Self::SessionExpired => write!(f, "SESSION_EXPIRED"),
            Self::ItemAdded => write!(f, "ITEM_ADDED"),
            Self::ItemDeleted => write!(f, "ITEM_DELETED"),
            Self::RequestSubmitted => write!(f, "REQUEST_SUBMITTED"),
            Self::RequestApproved => write!(f, "REQUEST_APPROVED"),
            Self::RequestRejected => write!(f, "REQUEST_REJECTED"),
            Self::AccessDenied => write!(f, "ACCESS_DENIED"),
            Self::InvalidInput => write!(f, "INVALID_INPUT"),
            Self::DatabaseError => write!(f, "DATABASE_ERROR"),
            Self::System => write!(f, "SYSTEM"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActivityLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        };
        f.write_str(s)
    }
}

/// One entry in the activity log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub kind: ActivityKind,
    pub level: ActivityLevel,
    pub message: String,

    /// Remote address of the HTTP client, or `unknown`.
    pub client_ip: String,

    /// Session user id, `anonymous`, or `system`.
    pub user: String,

    /// Structured extras (item ids, quantities, prices).
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub detail: serde_json::Value,
}

impl ActivityEvent {
    pub fn new(kind: ActivityKind, message: impl Into<String>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            kind,
            level: kind.default_level(),
            message: message.into(),
            client_ip: UNKNOWN_CLIENT.to_string(),
            user: SYSTEM_USER.to_string(),
            detail: serde_json::Value::Null,
        }
    }

    pub fn builder(kind: ActivityKind, message: impl Into<String>) -> ActivityEventBuilder {
        ActivityEventBuilder {
            event: Self::new(kind, message),
        }
    }

    /// Format the event as a human-readable log line.
    ///
    /// Format: `timestamp - LEVEL - message - IP: ip - User: user`
    pub fn to_log_line(&self) -> String {
        format!(
            "{} - {} - {} - IP: {} - User: {}",
            self.occurred_at.format("%Y-%m-%d %H:%M:%S%.3f"),
            self.level,
            self.message,
            self.client_ip,
            self.user,
        )
    }
}

/// Builder for [`ActivityEvent`].
#[derive(Debug)]
pub struct ActivityEventBuilder {
    event: ActivityEvent,
}

impl ActivityEventBuilder {
    pub fn client_ip(mut self, ip: impl Into<String>) -> Self {
        self.event.client_ip = ip.into();
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.event.user = user.into();
        self
    }

    /// Override the kind's default severity.
    pub fn level(mut self, level: ActivityLevel) -> Self {
        self.event.level = level;
        self
    }

    pub fn detail(mut self, detail: serde_json::Value) -> Self {
        self.event.detail = detail;
        self
    }

    pub fn build(self) -> ActivityEvent {
        self.event
    }
}
