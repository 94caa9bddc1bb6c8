//! `invento init-db` - create the schema and default data.

use anyhow::{Context, Result};
use invento_core::AppConfig;
use invento_store::InitOptions;

pub async fn run(config: &AppConfig, reset: bool) -> Result<()> {
    let opts = InitOptions {
        reset,
        ..InitOptions::from_config(&config.database)?
    };
    let path = &config.database.path;
    let store = invento_store::initialize(path, &opts)
        .await
        .with_context(|| format!("failed to initialize {}", path.display()))?;

    let items = store.count_rows("inventory").await?;
    let users = store.count_rows("users").await?;
    store.close().await;

    println!("Initialized {} ({items} items, {users} users)", path.display());
    Ok(())
}
