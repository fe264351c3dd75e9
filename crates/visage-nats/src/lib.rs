#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for NATS client operations.
///
/// Use this target for logging client initialization, configuration, and client-level errors.
pub const TRACING_TARGET_CLIENT: &str = "visage_nats::client";

/// Tracing target for NATS job queue operations.
///
/// Use this target for logging stream operations, publishing, consuming, and queue-level errors.
pub const TRACING_TARGET_QUEUE: &str = "visage_nats::queue";

/// Tracing target for NATS connection operations.
///
/// Use this target for logging connection establishment, reconnection, and connection errors.
pub const TRACING_TARGET_CONNECTION: &str = "visage_nats::connection";

mod client;
mod error;
pub mod queue;

// Re-export async_nats types needed by consumers
pub use async_nats::jetstream;
pub use client::{NatsClient, NatsConfig, NatsCredentials};
pub use error::{Error, Result};
