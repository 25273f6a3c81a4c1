//! leserve - HTTP Server
//!
//! *Le Serve* (The Server) - Axum-based HTTP API and command-line front end for LeBrique part search

#![warn(missing_docs)]
#![warn(unused_extern_crates)]

/// API error types
pub mod error;

/// HTTP handlers for REST endpoints
pub mod handlers;

/// Server configuration from TOML or environment
pub mod config;

/// API response types
pub mod responses;

/// Server instance management
pub mod server;

/// Command-line interface
pub mod cli;

pub use cli::{Cli, Commands};
pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};
pub use handlers::{create_router, AppState};
pub use server::LeServeServer;

/// leserve library initialization
pub fn init() {
    let _ = tracing::subscriber::set_default(tracing::subscriber::NoSubscriber::default());
}
