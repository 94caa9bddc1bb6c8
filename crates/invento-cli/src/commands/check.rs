//! `invento check` - report on the health of the database file.

use anyhow::Result;
use invento_core::AppConfig;
use invento_store::{REQUIRED_TABLES, Store};

/// Print a report; `false` when anything is wrong.
pub async fn run(config: &AppConfig) -> Result<bool> {
    let path = &config.database.path;
    if !path.exists() {
        println!("[ERROR] {} does not exist (run `invento init-db`)", path.display());
        return Ok(false);
    }

    let store = Store::connect(path).await?;
    let healthy = report(&store).await;
    store.close().await;

    println!();
    if healthy {
        println!("{}: ok", path.display());
    } else {
        println!("{}: problems found", path.display());
    }
    Ok(healthy)
}

async fn report(store: &Store) -> bool {
    let mut healthy = true;

    match store.missing_tables().await {
        Ok(missing) if missing.is_empty() => {
            for table in REQUIRED_TABLES {
                match store.count_rows(table).await {
                    Ok(n) => println!("[OK] table {table}: {n} rows"),
                    Err(e) => {
                        println!("[ERROR] table {table}: {e}");
                        healthy = false;
                    }
                }
            }
        }
        Ok(missing) => {
            println!("[ERROR] missing tables: {}", missing.join(", "));
            healthy = false;
        }
        Err(e) => {
            println!("[ERROR] could not list tables: {e}");
            healthy = false;
        }
    }

    match store.integrity_check().await {
        Ok(()) => println!("[OK] integrity check"),
        Err(e) => {
            println!("[ERROR] integrity check: {e}");
            healthy = false;
        }
    }

    healthy
}
