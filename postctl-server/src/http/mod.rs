//! HTTP server layer
//!
//! Axum server with:
//! - CORS (localhost only by default)
//! - Request tracing
//! - Graceful shutdown
//! - Plain-text error bodies, JSON envelopes for everything else

pub mod server;
pub mod error;
pub mod routes;

pub use server::{build_router, run_server, AppState, ServerConfig, ServerError};
pub use error::ApiError;
