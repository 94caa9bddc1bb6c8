//! Application configuration.
//!
//! Loaded from a TOML file (`invento.toml` by default). Every field has a
//! default so an empty file, or no file at all, yields a working setup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};

use crate::error::ConfigError;

/// Env var naming the config file.
pub const CONFIG_ENV: &str = "INVENTO_CONFIG";
/// Env var overriding `database.path`.
pub const DATABASE_PATH_ENV: &str = "INVENTO_DATABASE_PATH";
/// Env var overriding `server.port`.
pub const PORT_ENV: &str = "INVENTO_PORT";

const DEFAULT_CONFIG_FILE: &str = "invento.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind, e.g. "0.0.0.0".
    #[serde(default = "default_bind")]
    pub bind: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// `bind:port`, ready for `TcpListener::bind`.
    pub fn address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    /// Attempts made by startup initialization before giving up.
    #[serde(default = "default_init_retries")]
    pub init_retries: u32,

    /// Pause between initialization attempts, e.g. "2s".
    #[serde(default = "default_retry_delay")]
    pub retry_delay: String,

    /// Insert the default stock and accounts into empty tables.
    #[serde(default = "default_true")]
    pub seed_defaults: bool,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("inventory.db")
}

fn default_init_retries() -> u32 {
    3
}

fn default_retry_delay() -> String {
    "2s".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            init_retries: default_init_retries(),
            retry_delay: default_retry_delay(),
            seed_defaults: true,
        }
    }
}

impl DatabaseConfig {
    pub fn retry_delay(&self) -> Result<Duration, ConfigError> {
        parse_duration("database.retry_delay", &self.retry_delay)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Idle time after which a session must log in again, e.g. "30m".
    #[serde(default = "default_lifetime")]
    pub lifetime: String,

    /// Mark the session cookie `Secure` (HTTPS only).
    #[serde(default)]
    pub cookie_secure: bool,
}

fn default_lifetime() -> String {
    "30m".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            lifetime: default_lifetime(),
            cookie_secure: false,
        }
    }
}

impl SessionConfig {
    pub fn lifetime(&self) -> Result<Duration, ConfigError> {
        parse_duration("session.lifetime", &self.lifetime)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default `tracing` filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_level")]
    pub level: String,

    /// Activity log file (JSON Lines).
    #[serde(default = "default_activity_file")]
    pub activity_file: PathBuf,

    /// Size at which the activity log is rotated.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,

    /// Rotated files kept next to the active one.
    #[serde(default = "default_backups")]
    pub backups: u32,

    /// Also print activity events on stdout.
    #[serde(default)]
    pub stdout: bool,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_activity_file() -> PathBuf {
    PathBuf::from("app.log")
}

fn default_max_bytes() -> u64 {
    1_000_000
}

fn default_backups() -> u32 {
    5
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            activity_file: default_activity_file(),
            max_bytes: default_max_bytes(),
            backups: default_backups(),
            stdout: false,
        }
    }
}

impl AppConfig {
    /// Parse a TOML document.
    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        let cfg: AppConfig = toml::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load configuration, then apply environment overrides.
    ///
    /// Path precedence: `explicit`, then `INVENTO_CONFIG`, then
    /// `invento.toml`. Only the implicit default file may be absent.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match explicit {
            Some(p) => (p.to_path_buf(), true),
            None => match env::var(CONFIG_ENV) {
                Ok(p) => (PathBuf::from(p), true),
                Err(_) => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
            },
        };

        let mut cfg = if !required && !path.exists() {
            AppConfig::default()
        } else {
            let raw = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
                path: path.display().to_string(),
                source,
            })?;
            Self::from_toml(&raw)?
        };

        cfg.apply_env()?;
        Ok(cfg)
    }

    fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(p) = env::var(DATABASE_PATH_ENV) {
            self.database.path = PathBuf::from(p);
        }
        if let Ok(port) = env::var(PORT_ENV) {
            self.server.port = port.parse().map_err(|_| ConfigError::InvalidEnv {
                var: PORT_ENV,
                value: port,
            })?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.database.retry_delay()?;
        self.session.lifetime()?;
        Ok(())
    }
}

fn parse_duration(field: &'static str, value: &str) -> Result<Duration, ConfigError> {
    humantime::parse_duration(value).map_err(|_| ConfigError::InvalidDuration {
        field,
        value: value.to_string(),
    })
}
