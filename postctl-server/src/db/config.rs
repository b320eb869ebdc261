//! Database connection settings
//!
//! Loaded from environment variables:
//! - `DATABASE_URL`: full connection string, takes precedence when set
//! - `DB_USERNAME`, `DB_PASSWORD`, `DB_NAME`, `DB_HOST`: required otherwise
//! - `DB_PORT`: optional, defaults to 5432

use sqlx::postgres::{PgConnectOptions, PgSslMode};

const DEFAULT_PORT: u16 = 5432;

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    Missing(&'static str),

    #[error("invalid value for {name}: '{value}'")]
    Invalid { name: &'static str, value: String },

    #[error("invalid database url: {0}")]
    Url(#[from] sqlx::Error),
}

/// Where to find the database
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseConfig {
    /// A complete `postgres://` connection string
    Url(String),

    /// Discrete connection parameters
    Parts {
        username: String,
        password: String,
        database: String,
        host: String,
        port: u16,
    },
}

impl DatabaseConfig {
    /// Create config from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Create config from an arbitrary variable lookup (for testing)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL").filter(|url| !url.is_empty()) {
            return Ok(Self::Url(url));
        }

        let required = |name: &'static str| lookup(name).ok_or(ConfigError::Missing(name));

        let port = match lookup("DB_PORT").filter(|p| !p.is_empty()) {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: "DB_PORT",
                value: raw,
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self::Parts {
            username: required("DB_USERNAME")?,
            password: required("DB_PASSWORD")?,
            database: required("DB_NAME")?,
            host: required("DB_HOST")?,
            port,
        })
    }

    /// Build sqlx connect options. Discrete parameters connect without TLS.
    pub fn connect_options(&self) -> Result<PgConnectOptions, ConfigError> {
        match self {
            Self::Url(url) => Ok(url.parse()?),
            Self::Parts {
                username,
                password,
                database,
                host,
                port,
            } => Ok(PgConnectOptions::new()
                .host(host)
                .port(*port)
                .username(username)
                .password(password)
                .database(database)
                .ssl_mode(PgSslMode::Disable)),
        }
    }
}
