#![forbid(unsafe_code)]

mod config;
mod poll;
mod server;

use std::process;
use std::time::Duration;

use anyhow::Context;
use axum::Router;
use axum::extract::FromRef;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use visage_postgres::{PgClient, run_pending_migrations};
use visage_server::handler::routes;
use visage_server::middleware::{
    DEFAULT_BODY_LIMIT, RouterObservabilityExt, RouterSecurityExt,
};
use visage_server::service::ServiceState;
use visage_worker::{AvatarWorker, WorkerState};

use crate::config::{Cli, Command, PollArgs, ServeArgs, WorkArgs};
use crate::server::shutdown_signal;

// Tracing target constants
pub const TRACING_TARGET_SERVER_STARTUP: &str = "visage_cli::server::startup";
pub const TRACING_TARGET_SERVER_SHUTDOWN: &str = "visage_cli::server::shutdown";
pub const TRACING_TARGET_WORKER: &str = "visage_cli::worker";
pub const TRACING_TARGET_POLL: &str = "visage_cli::poll";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            "application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error = %error,
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    #[cfg(feature = "dotenv")]
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    init_tracing();
    log_startup_info();

    match cli.command {
        Command::Serve(args) => serve(args).await,
        Command::Work(args) => work(args).await,
        Command::Poll(args) => poll_profile(args).await,
    }
}

/// Runs the HTTP upload gateway.
async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    args.server
        .validate()
        .context("invalid server configuration")?;

    let state = ServiceState::from_config(&args.service)
        .await
        .context("failed to create service state")?;

    let pg_client = PgClient::from_ref(&state);
    run_pending_migrations(&pg_client)
        .await
        .context("failed to run database migrations")?;

    let router = create_router(state);
    server::serve(router, args.server).await?;

    Ok(())
}

/// Creates the router with all middleware layers applied.
///
/// Middleware is applied in reverse order (last added = outermost):
/// 1. Observability (outermost) - request tracing spans
/// 2. Body limit - rejects oversized uploads early
/// 3. Routes (innermost) - actual request handlers
fn create_router(state: ServiceState) -> Router {
    routes(state)
        .with_body_limit(DEFAULT_BODY_LIMIT)
        .with_observability()
}

/// Runs an avatar processing worker until a shutdown signal arrives.
async fn work(args: WorkArgs) -> anyhow::Result<()> {
    let consumer_name = args.worker.consumer_name.clone();

    let state = WorkerState::from_config(&args.worker)
        .await
        .context("failed to create worker state")?;

    let cancel_token = CancellationToken::new();
    let worker = AvatarWorker::new(state, consumer_name, cancel_token.clone());
    let handle = worker.spawn();

    tracing::info!(
        target: TRACING_TARGET_WORKER,
        "Worker running, waiting for shutdown signal"
    );

    shutdown_signal(Duration::from_secs(30)).await;
    cancel_token.cancel();

    handle
        .await
        .context("worker task panicked")?
        .context("worker terminated with error")?;

    Ok(())
}

/// Polls the gateway until the processed picture URL appears.
async fn poll_profile(args: PollArgs) -> anyhow::Result<()> {
    let cancel_token = CancellationToken::new();

    // Let Ctrl+C stop the poller without killing the in-flight job
    tokio::spawn({
        let cancel_token = cancel_token.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel_token.cancel();
            }
        }
    });

    let profile = poll::wait_for_profile(
        &args.gateway_url,
        &args.token,
        &args.poll_config(),
        &cancel_token,
    )
    .await
    .context("processing took too long or polling failed")?;

    println!("{}", serde_json::to_string_pretty(&profile)?);
    Ok(())
}

/// Initializes tracing with environment-based filtering.
fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Logs startup information.
fn log_startup_info() {
    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        version = env!("CARGO_PKG_VERSION"),
        "starting visage"
    );

    tracing::debug!(
        target: TRACING_TARGET_SERVER_STARTUP,
        pid = process::id(),
        arch = std::env::consts::ARCH,
        os = std::env::consts::OS,
        "build information"
    );
}
