//! # invento-core
//!
//! Types shared across the Invento crates:
//! - the domain model for the `inventory`, `users` and `requests` tables
//! - validation of the form input accepted by the dashboard
//! - configuration loaded from `invento.toml`

pub mod config;
pub mod error;
pub mod model;
pub mod validate;

pub use config::{AppConfig, DatabaseConfig, LoggingConfig, ServerConfig, SessionConfig};
pub use error::{ConfigError, ValidationError};
pub use model::{
    InventoryItem, RequestAction, RequestStatus, RequestSummary, RestockRequest, Role, User,
};
pub use validate::{LoginAttempt, NewItem, NewRequest, parse_approval_price};
