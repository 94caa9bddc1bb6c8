use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use invento_core::{AppConfig, Role};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "invento", version, about = "Invento inventory dashboard")]
struct Cli {
    /// Config file (defaults to $INVENTO_CONFIG, then ./invento.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Prepare the database and serve the dashboard (the default).
    Serve,

    /// Create the schema and default data.
    InitDb {
        /// Delete the existing database file first
        #[arg(long, default_value_t = false)]
        reset: bool,
    },

    /// Report missing tables and run the SQLite integrity check.
    Check,

    /// Add a login account.
    AddUser {
        #[arg(long)]
        username: String,

        /// "admin" or "worker"
        #[arg(long)]
        role: Role,

        #[arg(long, env = "INVENTO_NEW_USER_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    init_tracing(&config);

    match cli.cmd.unwrap_or(Command::Serve) {
        Command::Serve => commands::serve::run(&config).await?,
        Command::InitDb { reset } => commands::init_db::run(&config, reset).await?,
        Command::Check => {
            if !commands::check::run(&config).await? {
                std::process::exit(1);
            }
        }
        Command::AddUser {
            username,
            role,
            password,
        } => commands::add_user::run(&config, &username, &password, role).await?,
    }

    Ok(())
}
