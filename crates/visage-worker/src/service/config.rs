//! Worker configuration.

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use visage_nats::NatsConfig;
use visage_opendal::StorageConfig;
use visage_postgres::PgConfig;

/// Default maximum concurrent jobs per worker.
pub const DEFAULT_MAX_CONCURRENT_JOBS: usize = 10;

/// Default durable consumer name shared by worker instances.
const DEFAULT_CONSUMER_NAME: &str = "avatar-worker";

/// Complete worker configuration.
///
/// Combines connection configuration for external services with worker
/// behavior settings. This is the main configuration type passed to
/// [`WorkerState::from_config`].
///
/// [`WorkerState::from_config`]: super::WorkerState::from_config
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct WorkerConfig {
    /// Postgres database configuration.
    #[cfg_attr(feature = "config", command(flatten))]
    pub postgres: PgConfig,

    /// NATS configuration.
    #[cfg_attr(feature = "config", command(flatten))]
    pub nats: NatsConfig,

    /// Object storage configuration.
    #[cfg_attr(feature = "config", command(flatten))]
    pub storage: StorageConfig,

    /// Maximum concurrent jobs a worker can process simultaneously.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "worker-max-concurrent-jobs",
            env = "WORKER_MAX_CONCURRENT_JOBS",
            default_value_t = DEFAULT_MAX_CONCURRENT_JOBS
        )
    )]
    #[serde(default = "default_max_concurrent_jobs")]
    pub max_concurrent_jobs: usize,

    /// Durable consumer name for this worker fleet.
    ///
    /// Worker instances sharing a consumer name split the queue between
    /// them; each message is delivered to exactly one instance.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "worker-consumer-name",
            env = "WORKER_CONSUMER_NAME",
            default_value = DEFAULT_CONSUMER_NAME
        )
    )]
    #[serde(default = "default_consumer_name")]
    pub consumer_name: String,
}

fn default_max_concurrent_jobs() -> usize {
    DEFAULT_MAX_CONCURRENT_JOBS
}

fn default_consumer_name() -> String {
    DEFAULT_CONSUMER_NAME.to_string()
}

impl WorkerConfig {
    /// Creates a new worker configuration.
    pub fn new(postgres: PgConfig, nats: NatsConfig, storage: StorageConfig) -> Self {
        Self {
            postgres,
            nats,
            storage,
            max_concurrent_jobs: DEFAULT_MAX_CONCURRENT_JOBS,
            consumer_name: DEFAULT_CONSUMER_NAME.to_string(),
        }
    }

    /// Creates a new worker config with the specified concurrency limit.
    pub fn with_max_concurrent_jobs(mut self, max_concurrent_jobs: usize) -> Self {
        self.max_concurrent_jobs = max_concurrent_jobs;
        self
    }
}
