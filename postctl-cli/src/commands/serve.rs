//! HTTP server command for the blog content API

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use postctl_server::db::{schema, PgContentStore};
use postctl_server::http::{run_server, ServerConfig};

use crate::config::DatabaseArgs;

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to
    #[arg(long, short = 'b', env = "POSTCTL_BIND", default_value = "0.0.0.0:7878")]
    pub bind: SocketAddr,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Do not create missing schema objects at startup
    #[arg(long)]
    pub skip_migrate: bool,

    #[command(flatten)]
    pub database: DatabaseArgs,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    tracing::info!("Starting postctl server on {}", args.bind);

    let pool = args.database.connect().await?;

    if args.skip_migrate {
        tracing::info!("Skipping schema setup");
    } else {
        schema::run(&pool)
            .await
            .context("Failed to initialise database schema")?;
    }

    let config = ServerConfig {
        bind_addr: args.bind,
        cors_permissive: args.cors_permissive,
    };

    // Blocks until shutdown
    run_server(Arc::new(PgContentStore::new(pool)), config)
        .await
        .context("Server error")?;

    Ok(())
}
