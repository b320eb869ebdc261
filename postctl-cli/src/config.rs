//! Environment and database settings for the CLI
//!
//! With `APP_ENV=local` (or `GO_ENV=local`), variables are first loaded from
//! `./.env`. Variables already present in the environment are never
//! overwritten.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use postctl_server::db::pool::DEFAULT_MAX_CONNECTIONS;
use postctl_server::db::{create_pool_with_options, DatabaseConfig};
use sqlx::PgPool;

/// Variables selecting the runtime mode, first non-empty one wins.
///
/// `GO_ENV` is the name older deployments set.
pub const MODE_VARS: [&str; 2] = ["APP_ENV", "GO_ENV"];

/// Mode in which `.env` is loaded
pub const LOCAL_MODE: &str = "local";

/// Load `.env` when running in local mode.
///
/// Returns the loaded file path, or `None` outside local mode. A missing or
/// unreadable file in local mode is an error.
pub fn load_env() -> Result<Option<PathBuf>> {
    let mode = mode_from(|name| std::env::var(name).ok());
    load_env_from(
        Path::new(".env"),
        mode.as_ref().map(|(name, value)| (*name, value.as_str())),
    )
}

/// Find the mode variable in effect and its value
fn mode_from<F>(lookup: F) -> Option<(&'static str, String)>
where
    F: Fn(&str) -> Option<String>,
{
    MODE_VARS
        .into_iter()
        .find_map(|name| lookup(name).filter(|value| !value.is_empty()).map(|value| (name, value)))
}

fn load_env_from(path: &Path, mode: Option<(&str, &str)>) -> Result<Option<PathBuf>> {
    let var = match mode {
        Some((var, LOCAL_MODE)) => var,
        _ => return Ok(None),
    };

    dotenvy::from_path(path)
        .with_context(|| format!("{}={} but {} could not be loaded", var, LOCAL_MODE, path.display()))?;
    Ok(Some(path.to_path_buf()))
}

/// Database connection arguments shared by subcommands
#[derive(Args, Debug, Clone)]
pub struct DatabaseArgs {
    /// Database URL (overrides DB_USERNAME/DB_PASSWORD/DB_NAME/DB_HOST/DB_PORT)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Maximum number of pooled connections
    #[arg(long, default_value_t = DEFAULT_MAX_CONNECTIONS)]
    pub max_connections: u32,
}

impl DatabaseArgs {
    /// Resolve where the database lives
    pub fn config(&self) -> Result<DatabaseConfig> {
        match &self.database_url {
            Some(url) if !url.is_empty() => Ok(DatabaseConfig::Url(url.clone())),
            _ => DatabaseConfig::from_env().context(
                "database is not configured. Set --database-url, DATABASE_URL, or the DB_* variables",
            ),
        }
    }

    /// Connect and return the shared pool
    pub async fn connect(&self) -> Result<PgPool> {
        let options = self
            .config()?
            .connect_options()
            .context("Invalid database settings")?;

        create_pool_with_options(options, self.max_connections)
            .await
            .context("Failed to create database pool")
    }
}
