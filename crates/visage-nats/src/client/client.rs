//! NATS client wrapper and connection management.

use std::time::Duration;

use async_nats::{Client, ConnectOptions, jetstream};
use tokio::time::timeout;

use super::config::{NatsConfig, NatsCredentials};
use crate::{Error, Result, TRACING_TARGET_CLIENT, TRACING_TARGET_CONNECTION};

/// NATS client wrapper with connection management
#[derive(Debug, Clone)]
pub struct NatsClient {
    client: Client,
    jetstream: jetstream::Context,
    config: NatsConfig,
}

impl NatsClient {
    /// Create a new NATS client and connect
    #[tracing::instrument(skip(config), target = TRACING_TARGET_CONNECTION, fields(url = %config.nats_url))]
    pub async fn connect(config: NatsConfig) -> Result<Self> {
        tracing::info!(
            target: TRACING_TARGET_CONNECTION,
            url = %config.nats_url,
            name = %config.nats_name,
            "Connecting to NATS server"
        );

        let mut connect_opts = ConnectOptions::new()
            .name(&config.nats_name)
            .connection_timeout(config.connect_timeout());

        // Set authentication if provided
        if let Some(credentials) = config.credentials() {
            connect_opts = match credentials {
                NatsCredentials::UserPassword { user, pass } => {
                    connect_opts.user_and_password(user, pass)
                }
                NatsCredentials::Token { token } => connect_opts.token(token),
                NatsCredentials::CredsFile { path } => connect_opts
                    .credentials_file(path)
                    .await
                    .map_err(|e| Error::operation("credentials_file", e.to_string()))?,
            };
        }

        // Connect to NATS
        let client = timeout(
            config.connect_timeout(),
            async_nats::connect_with_options(&config.nats_url, connect_opts),
        )
        .await
        .map_err(|_| Error::timeout(config.connect_timeout()))?
        .map_err(|e| Error::Connection(Box::new(e)))?;

        // Initialize JetStream context
        let jetstream = jetstream::new(client.clone());

        let server_info = client.server_info();
        tracing::info!(
            target: TRACING_TARGET_CONNECTION,
            server_host = %server_info.host,
            server_version = %server_info.version,
            server_id = %server_info.server_id,
            max_payload = server_info.max_payload,
            "Successfully connected to NATS"
        );

        Ok(Self {
            client,
            jetstream,
            config,
        })
    }

    /// Get the underlying NATS client
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Get the JetStream context
    pub fn jetstream(&self) -> &jetstream::Context {
        &self.jetstream
    }

    /// Get the configuration
    pub fn config(&self) -> &NatsConfig {
        &self.config
    }

    /// Test connectivity with a flush round trip
    #[tracing::instrument(skip(self), target = TRACING_TARGET_CLIENT)]
    pub async fn ping(&self) -> Result<Duration> {
        let start = std::time::Instant::now();

        timeout(Duration::from_secs(10), self.client.flush())
            .await
            .map_err(|_| Error::timeout(Duration::from_secs(10)))?
            .map_err(|e| Error::Connection(Box::new(e)))?;

        let ping_time = start.elapsed();
        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            duration_ms = ping_time.as_millis(),
            "NATS ping successful"
        );
        Ok(ping_time)
    }

    /// Checks whether the NATS connection is currently established.
    ///
    /// Used by health endpoints.
    pub fn is_healthy(&self) -> bool {
        matches!(
            self.client.connection_state(),
            async_nats::connection::State::Connected
        )
    }
}
