//! Schema setup command

use anyhow::{Context, Result};
use clap::Parser;

use postctl_server::db::schema;

use crate::config::DatabaseArgs;

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(flatten)]
    pub database: DatabaseArgs,
}

/// Create any missing schema objects and exit
pub async fn run_migrate(args: MigrateArgs) -> Result<()> {
    let pool = args.database.connect().await?;

    schema::run(&pool)
        .await
        .context("Failed to initialise database schema")?;

    pool.close().await;
    tracing::info!("Database schema is up to date");
    Ok(())
}
