//! HTTP server startup with lifecycle management.
//!
//! Binds the gateway router to the configured address and serves it
//! with graceful shutdown on SIGTERM/Ctrl+C.

mod error;
mod http_server;
mod shutdown;

pub use error::{Result, ServerError};
pub use http_server::serve;
pub use shutdown::shutdown_signal;

/// Tracing target for server startup events.
pub const TRACING_TARGET_STARTUP: &str = "visage_cli::server::startup";

/// Tracing target for server shutdown events.
pub const TRACING_TARGET_SHUTDOWN: &str = "visage_cli::server::shutdown";
