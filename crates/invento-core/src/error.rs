//! Error types for the core crate.

use thiserror::Error;

/// Rejected form input.
///
/// The message is shown to the user as-is, so it never carries internal
/// details.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    message: &'static str,
}

impl ValidationError {
    pub(crate) const fn new(message: &'static str) -> Self {
        Self { message }
    }

    /// The user-facing message.
    pub fn message(&self) -> &'static str {
        self.message
    }

    pub const MISSING_FIELDS: Self = Self::new("Missing or invalid fields");
    pub const INVALID_LOGIN: Self = Self::new("Invalid or missing login details");
    pub const ITEM_FORMAT: Self = Self::new("Invalid quantity or price format");
    pub const ITEM_NEGATIVE: Self = Self::new("Quantity and price must be non-negative");
    pub const QUANTITY_FORMAT: Self = Self::new("Invalid quantity format");
    pub const QUANTITY_NOT_POSITIVE: Self = Self::new("Quantity must be positive");
    pub const PRICE_REQUIRED: Self = Self::new("Price is required for approval");
    pub const PRICE_FORMAT: Self = Self::new("Invalid price format");
    pub const PRICE_NEGATIVE: Self = Self::new("Price must be non-negative");
    pub const QUANTITY_TOO_LARGE: Self = Self::new("Resulting quantity is too large");
    pub const INVALID_ACTION: Self = Self::new("Invalid action");
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`crate::AppConfig`].
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// A duration field could not be parsed.
    #[error("invalid duration for {field}: {value:?}")]
    InvalidDuration { field: &'static str, value: String },

    /// An environment override is malformed.
    #[error("invalid value for {var}: {value:?}")]
    InvalidEnv { var: &'static str, value: String },
}
