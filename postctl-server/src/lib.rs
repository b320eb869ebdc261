//! postctl-server: blog content API over PostgreSQL
//!
//! Serves create/read/update/delete for content records and their tags
//! under `/api/posts/`. Storage sits behind [`db::ContentStore`], so the
//! router runs unchanged against PostgreSQL or an in-memory store.

pub mod db;
pub mod http;
pub mod models;

pub use db::{ContentStore, MemoryContentStore, PgContentStore, StoreError};
pub use http::{build_router, run_server, AppState, ServerConfig, ServerError};
