//! NATS client and connection configuration.

mod client;
mod config;

pub use client::NatsClient;
pub use config::{NatsConfig, NatsCredentials};
