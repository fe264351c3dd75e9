//! Worker application state.

use std::sync::Arc;

use tokio::sync::Semaphore;
use visage_nats::NatsClient;
use visage_opendal::StorageBackend;
use visage_postgres::PgClient;

use super::{AvatarProcessor, WorkerConfig};
use crate::{Result, WorkerError};

/// Application state for avatar workers.
///
/// Contains the clients a processing worker needs. Can be created either
/// directly with [`WorkerState::new`] (e.g. sharing connections with an
/// HTTP server) or from configuration with [`WorkerState::from_config`].
#[derive(Clone)]
pub struct WorkerState {
    /// PostgreSQL profile store client.
    pub postgres: PgClient,
    /// NATS messaging client.
    pub nats: NatsClient,
    /// Object storage backend for processed blobs.
    pub storage: StorageBackend,
    /// Image processor applied to every job.
    pub processor: AvatarProcessor,
    /// Maximum concurrent jobs a worker can process simultaneously.
    pub max_concurrent_jobs: usize,
}

impl WorkerState {
    /// Creates a new worker state from existing service instances.
    pub fn new(postgres: PgClient, nats: NatsClient, storage: StorageBackend) -> Self {
        Self {
            postgres,
            nats,
            storage,
            processor: AvatarProcessor::default(),
            max_concurrent_jobs: super::DEFAULT_MAX_CONCURRENT_JOBS,
        }
    }

    /// Sets the maximum concurrent jobs for this worker state.
    pub fn with_max_concurrent_jobs(mut self, max_concurrent_jobs: usize) -> Self {
        self.max_concurrent_jobs = max_concurrent_jobs;
        self
    }

    /// Creates a semaphore for limiting concurrent job processing.
    pub(crate) fn create_semaphore(&self) -> Arc<Semaphore> {
        Arc::new(Semaphore::new(self.max_concurrent_jobs))
    }

    /// Creates a new worker state from configuration.
    ///
    /// Connects to PostgreSQL, NATS, and object storage. Fails fast if
    /// any required connection cannot be established.
    pub async fn from_config(config: &WorkerConfig) -> Result<Self> {
        let postgres = PgClient::new(config.postgres.clone()).map_err(|e| {
            WorkerError::processing_with_source("Failed to create database client", e)
        })?;

        let nats = NatsClient::connect(config.nats.clone())
            .await
            .map_err(|e| WorkerError::processing_with_source("Failed to connect to NATS", e))?;

        let storage = StorageBackend::new(config.storage.clone())
            .await
            .map_err(|e| {
                WorkerError::processing_with_source("Failed to initialize object storage", e)
            })?;

        Ok(Self {
            postgres,
            nats,
            storage,
            processor: AvatarProcessor::default(),
            max_concurrent_jobs: config.max_concurrent_jobs,
        })
    }
}
