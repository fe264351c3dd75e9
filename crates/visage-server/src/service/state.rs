//! Application state and dependency injection.

use visage_nats::NatsClient;
use visage_nats::queue::AvatarJobPublisher;
use visage_postgres::PgClient;

use super::{Result, ServiceConfig};
use crate::TRACING_TARGET_SERVICE;
use crate::extract::AuthKeys;

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection). All
/// contained clients are safe for concurrent use from multiple request
/// handling tasks.
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Clone)]
pub struct ServiceState {
    pg_client: PgClient,
    nats_client: NatsClient,
    job_publisher: AvatarJobPublisher,
    auth_keys: AuthKeys,
}

impl ServiceState {
    /// Initializes application state from configuration.
    ///
    /// Connects to all external collaborators and loads key material.
    /// Fails fast on any missing credential or unreachable dependency
    /// so the process exits instead of serving with broken wiring.
    pub async fn from_config(config: &ServiceConfig) -> Result<Self> {
        let auth_keys = config.load_auth_keys().await?;
        let pg_client = config.connect_postgres().await?;
        let nats_client = config.connect_nats().await?;
        let job_publisher = AvatarJobPublisher::new(nats_client.jetstream()).await?;

        tracing::info!(
            target: TRACING_TARGET_SERVICE,
            "Service state initialized"
        );

        Ok(Self {
            pg_client,
            nats_client,
            job_publisher,
            auth_keys,
        })
    }

    /// Creates state from already connected clients.
    ///
    /// Useful when the gateway shares connections with an in-process
    /// worker.
    pub fn new(
        pg_client: PgClient,
        nats_client: NatsClient,
        job_publisher: AvatarJobPublisher,
        auth_keys: AuthKeys,
    ) -> Self {
        Self {
            pg_client,
            nats_client,
            job_publisher,
            auth_keys,
        }
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+ $(,)?) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

impl_di!(pg_client: PgClient);
impl_di!(nats_client: NatsClient);
impl_di!(job_publisher: AvatarJobPublisher);
impl_di!(auth_keys: AuthKeys);
