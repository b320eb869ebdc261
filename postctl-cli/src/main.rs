//! postctl CLI - blog content API server and schema tooling
//!
//! Subcommands:
//! - `serve`: run the HTTP API (creates missing schema objects first)
//! - `migrate`: create missing schema objects and exit

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;
mod tracing_setup;

use tracing_setup::TracingConfig;

#[derive(Parser, Debug)]
#[command(
    name = "postctl",
    author,
    version,
    about = "Blog content API with tags, backed by PostgreSQL",
    after_help = "Set APP_ENV=local (or GO_ENV=local) to load ./.env before reading other settings."
)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Only log warnings and errors
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(commands::serve::ServeArgs),
    /// Create missing database schema objects
    Migrate(commands::migrate::MigrateArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before parsing so env-backed flags can see it
    let env_file = config::load_env()?;
    let cli = Cli::parse();

    tracing_setup::init(&TracingConfig {
        debug: cli.debug,
        quiet: cli.quiet,
    })
    .ok();

    if let Some(path) = env_file {
        tracing::info!("Loaded environment from {}", path.display());
    }

    match cli.command {
        Commands::Serve(args) => commands::run_serve(args).await?,
        Commands::Migrate(args) => commands::run_migrate(args).await?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn serve_defaults() {
        let cli = Cli::try_parse_from(["postctl", "serve"]).unwrap();
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.bind.port(), 7878);
                assert!(!args.cors_permissive);
                assert!(!args.skip_migrate);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["postctl", "migrate", "--debug"]).unwrap();
        assert!(cli.debug);
    }
}
