//! CLI configuration management.
//!
//! The `visage` binary exposes one subcommand per tier of the system:
//!
//! ```text
//! visage serve   # HTTP upload gateway
//! visage work    # avatar processing worker
//! visage poll    # client-side poller
//! ```
//!
//! All configuration can be provided via CLI arguments or environment
//! variables. Use `--help` to see all available options.
//!
//! # Example
//!
//! ```bash
//! # Configure database and server
//! visage serve --postgres-url "postgresql://..." --port 8080
//!
//! # Or via environment variables
//! POSTGRES_URL="postgresql://..." PORT=8080 visage serve
//! ```

mod server;

use std::time::Duration;

use clap::{Args, Parser, Subcommand};
pub use server::ServerConfig;
use visage_server::service::ServiceConfig;
use visage_worker::WorkerConfig;

use crate::poll::PollConfig;

/// Complete CLI configuration.
#[derive(Debug, Parser)]
#[command(name = "visage")]
#[command(about = "Visage profile picture service")]
#[command(version)]
pub struct Cli {
    /// The tier to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP upload gateway
    Serve(ServeArgs),
    /// Run an avatar processing worker
    Work(WorkArgs),
    /// Poll the gateway until the processed picture URL appears
    Poll(PollArgs),
}

/// Arguments for the gateway tier.
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Server network and lifecycle configuration.
    #[clap(flatten)]
    pub server: ServerConfig,

    /// External service configuration (database, queue, auth keys).
    #[clap(flatten)]
    pub service: ServiceConfig,
}

/// Arguments for the worker tier.
#[derive(Debug, Args)]
pub struct WorkArgs {
    /// External service and worker behavior configuration.
    #[clap(flatten)]
    pub worker: WorkerConfig,
}

/// Arguments for the client poller.
#[derive(Debug, Args)]
pub struct PollArgs {
    /// Base URL of the upload gateway
    #[arg(long, env = "GATEWAY_URL", default_value = "http://127.0.0.1:3000")]
    pub gateway_url: String,

    /// Bearer token for the user whose profile is polled
    #[arg(long, env = "GATEWAY_TOKEN")]
    pub token: String,

    /// Number of poll attempts before giving up
    #[arg(long, default_value_t = 10)]
    pub attempts: u32,

    /// Seconds to wait between attempts
    #[arg(long, default_value_t = 3)]
    pub interval_secs: u64,
}

impl PollArgs {
    /// Builds the poller configuration.
    pub fn poll_config(&self) -> PollConfig {
        PollConfig {
            attempts: self.attempts,
            interval: Duration::from_secs(self.interval_secs),
        }
    }
}
