//! Database layer - connection pool, schema and content stores
//!
//! # Design Principles
//!
//! - One shared pool, injected through `AppState` - no global handle
//! - Reads use a single LEFT JOIN - no N+1 queries
//! - Tag lookup tolerates concurrent inserts - no unique violations on races
//! - Every write operation runs in one transaction

pub mod config;
pub mod pool;
pub mod schema;
pub mod store;
pub mod postgres;
pub mod memory;
mod rows;

pub use config::{ConfigError, DatabaseConfig};
pub use pool::{create_pool, create_pool_with_options};
pub use store::{ContentStore, StoreError};
pub use postgres::PgContentStore;
pub use memory::MemoryContentStore;
