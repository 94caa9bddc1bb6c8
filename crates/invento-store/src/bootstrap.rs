//! Startup initialization of the database file.

use std::fs;
use std::path::Path;
use std::time::Duration;

use invento_core::{DatabaseConfig, ConfigError, Role};

use crate::error::StoreError;
use crate::store::Store;

/// Stock inserted into an empty inventory table.
const DEFAULT_ITEMS: [(&str, i64, f64); 3] = [
    ("Steel Rods", 100, 99.99),
    ("Copper Sheets", 50, 149.50),
    ("Aluminum Pipes", 75, 75.25),
];

/// Accounts inserted into an empty users table.
const DEFAULT_USERS: [(&str, &str, Role); 4] = [
    ("admin", "admin123", Role::Admin),
    ("worker1", "worker123", Role::Worker),
    ("worker2", "worker123", Role::Worker),
    ("worker3", "worker123", Role::Worker),
];

#[derive(Debug, Clone)]
pub struct InitOptions {
    /// Remove the existing file before creating the schema.
    pub reset: bool,
    /// Attempts before giving up; zero is treated as one.
    pub retries: u32,
    pub retry_delay: Duration,
    pub seed_defaults: bool,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            reset: false,
            retries: 3,
            retry_delay: Duration::from_secs(2),
            seed_defaults: true,
        }
    }
}

impl InitOptions {
    pub fn from_config(cfg: &DatabaseConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            reset: false,
            retries: cfg.init_retries,
            retry_delay: cfg.retry_delay()?,
            seed_defaults: cfg.seed_defaults,
        })
    }
}

/// Create the schema and default data, retrying on failure.
///
/// Each failed attempt is logged; the error of the last one is returned.
pub async fn initialize(path: &Path, opts: &InitOptions) -> Result<Store, StoreError> {
    let attempts = opts.retries.max(1);
    let mut attempt = 1;
    loop {
        match try_initialize(path, opts).await {
            Ok(store) => {
                tracing::info!(path = %path.display(), "database initialized");
                return Ok(store);
            }
            Err(e) if attempt < attempts => {
                tracing::error!(attempt, error = %e, "database initialization failed, retrying");
                tokio::time::sleep(opts.retry_delay).await;
                attempt += 1;
            }
            Err(e) => {
                tracing::error!(attempt, error = %e, "database initialization failed");
                return Err(e);
            }
        }
    }
}

/// Open the database for serving.
///
/// A missing file, or one lacking any required table, is rebuilt from
/// scratch. Otherwise the existing file is only integrity-checked.
pub async fn prepare(path: &Path, opts: &InitOptions) -> Result<Store, StoreError> {
    if !path.exists() {
        tracing::info!(path = %path.display(), "database file not found, creating it");
        return initialize(path, &InitOptions { reset: true, ..opts.clone() }).await;
    }

    let store = Store::connect(path).await?;
    let missing = store.missing_tables().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "could not list tables");
        crate::store::REQUIRED_TABLES.to_vec()
    });
    if !missing.is_empty() {
        tracing::warn!(?missing, "required tables missing, reinitializing database");
        store.close().await;
        return initialize(path, &InitOptions { reset: true, ..opts.clone() }).await;
    }

    store.integrity_check().await?;
    Ok(store)
}

async fn try_initialize(path: &Path, opts: &InitOptions) -> Result<Store, StoreError> {
    ensure_writable_dir(path)?;

    if opts.reset && path.exists() {
        match fs::remove_file(path) {
            Ok(()) => tracing::info!(path = %path.display(), "removed existing database"),
            Err(e) => tracing::warn!(
                path = %path.display(),
                error = %e,
                "could not remove database, it may be in use; keeping existing file"
            ),
        }
    }

    let store = Store::open(path).await?;

    if opts.seed_defaults {
        seed_defaults(&store).await?;
    }

    store.integrity_check().await?;
    Ok(store)
}

async fn seed_defaults(store: &Store) -> Result<(), StoreError> {
    if store.count_rows("inventory").await? == 0 {
        let mut tx = store.pool().begin().await?;
        for (name, quantity, price) in DEFAULT_ITEMS {
            sqlx::query("INSERT INTO inventory (name, quantity, price) VALUES (?, ?, ?)")
                .bind(name)
                .bind(quantity)
                .bind(price)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        tracing::info!(count = DEFAULT_ITEMS.len(), "seeded default inventory");
    }

    if store.count_rows("users").await? == 0 {
        for (username, password, role) in DEFAULT_USERS {
            store.create_user(username, password, role).await?;
        }
        tracing::warn!(
            count = DEFAULT_USERS.len(),
            "seeded default accounts with well-known passwords; change them before exposing the server"
        );
    }

    Ok(())
}

/// Create the database's parent directory and check it accepts new files.
fn ensure_writable_dir(path: &Path) -> Result<(), StoreError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let marker = dir.join(".invento-write-test");
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&marker)
        .map_err(|_| StoreError::NotWritable(dir.display().to_string()))?;
    if let Err(e) = fs::remove_file(&marker) {
        tracing::debug!(path = %marker.display(), error = %e, "could not remove write test file");
    }
    Ok(())
}
