//! `invento add-user` - create a login account.

use anyhow::{Result, bail};
use invento_core::validate::MAX_USERNAME_LEN;
use invento_core::{AppConfig, Role};
use invento_store::{InitOptions, Store};

pub async fn run(config: &AppConfig, username: &str, password: &str, role: Role) -> Result<()> {
    let opts = InitOptions::from_config(&config.database)?;
    let store = invento_store::prepare(&config.database.path, &opts).await?;
    let id = create(&store, username, password, role).await;
    store.close().await;

    let id = id?;
    println!("Created {role} account {username} (id {id})");
    Ok(())
}

async fn create(store: &Store, username: &str, password: &str, role: Role) -> Result<i64> {
    let username = username.trim();
    if username.is_empty() || username.chars().count() > MAX_USERNAME_LEN {
        bail!("username must be 1 to {MAX_USERNAME_LEN} characters");
    }
    if password.is_empty() {
        bail!("password must not be empty");
    }
    if store.find_user_by_username(username).await?.is_some() {
        bail!("user {username} already exists");
    }
    Ok(store.create_user(username, password, role).await?)
}
