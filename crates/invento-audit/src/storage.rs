//! Activity storage backends.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::ActivityError;
use crate::event::ActivityEvent;

/// Trait for activity storage backends.
#[async_trait]
pub trait ActivityStorage: Send + Sync {
    async fn store(&self, event: &ActivityEvent) -> Result<(), ActivityError>;
}

/// Console storage (human-readable lines on stdout).
#[derive(Debug, Default)]
pub struct ConsoleStorage;

impl ConsoleStorage {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ActivityStorage for ConsoleStorage {
    async fn store(&self, event: &ActivityEvent) -> Result<(), ActivityError> {
        println!("{}", event.to_log_line());
        Ok(())
    }
}

/// Discards everything.
#[derive(Debug, Default)]
pub struct NullStorage;

impl NullStorage {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ActivityStorage for NullStorage {
    async fn store(&self, _event: &ActivityEvent) -> Result<(), ActivityError> {
        Ok(())
    }
}

/// JSON Lines file rotated by size.
///
/// When appending would push the file to `max_bytes`, `app.log` becomes
/// `app.log.1`, `app.log.1` becomes `app.log.2` and so on; the oldest of
/// `backups` files is dropped. With `backups == 0` the file is truncated.
#[derive(Debug)]
pub struct RotatingFileStorage {
    path: PathBuf,
    max_bytes: u64,
    backups: u32,
    // Serializes rotation and appends.
    write_lock: Mutex<()>,
}

impl RotatingFileStorage {
    pub fn new(path: impl Into<PathBuf>, max_bytes: u64, backups: u32) -> Result<Self, ActivityError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Ok(Self {
            path,
            max_bytes,
            backups,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn backup_path(&self, n: u32) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(format!(".{n}"));
        PathBuf::from(name)
    }

    async fn rotate(&self) -> Result<(), ActivityError> {
        if self.backups == 0 {
            fs::write(&self.path, b"").await?;
            return Ok(());
        }

        for n in (1..self.backups).rev() {
            let from = self.backup_path(n);
            if fs::try_exists(&from).await? {
                fs::rename(&from, self.backup_path(n + 1)).await?;
            }
        }
        fs::rename(&self.path, self.backup_path(1)).await?;
        Ok(())
    }
}

#[async_trait]
impl ActivityStorage for RotatingFileStorage {
    async fn store(&self, event: &ActivityEvent) -> Result<(), ActivityError> {
        let mut line = serde_json::to_string(event)?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;

        let current = match fs::metadata(&self.path).await {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => 0,
            Err(e) => return Err(e.into()),
        };
        if self.max_bytes > 0 && current > 0 && current + line.len() as u64 >= self.max_bytes {
            self.rotate().await?;
        }

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

/// File plus console.
#[derive(Debug)]
pub struct DualStorage {
    file: RotatingFileStorage,
    console: ConsoleStorage,
}

impl DualStorage {
    pub fn new(file: RotatingFileStorage) -> Self {
        Self {
            file,
            console: ConsoleStorage,
        }
    }
}

#[async_trait]
impl ActivityStorage for DualStorage {
    async fn store(&self, event: &ActivityEvent) -> Result<(), ActivityError> {
        self.console.store(event).await?;
        self.file.store(event).await
    }
}
