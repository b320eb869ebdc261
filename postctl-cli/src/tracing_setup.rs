//! Tracing setup for the postctl CLI
//!
//! Usage:
//!   postctl --debug serve             # Debug logging to console
//!   postctl --quiet serve             # Warnings and errors only
//!   RUST_LOG=postctl_server=debug     # Fine-grained log control
//!
//! `RUST_LOG` always wins over the flags.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Tracing configuration options
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingConfig {
    /// Enable debug logging
    pub debug: bool,
    /// Only log warnings and errors
    pub quiet: bool,
}

impl TracingConfig {
    /// Filter used when `RUST_LOG` is not set. `debug` beats `quiet`.
    pub fn default_level(&self) -> &'static str {
        if self.debug {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }
}

/// Initialize console tracing
pub fn init(config: &TracingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_level()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.debug) // Show targets in debug mode
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}
