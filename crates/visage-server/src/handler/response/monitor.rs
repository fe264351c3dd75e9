//! Health check response body.

use serde::Serialize;

/// Health status of the gateway and its dependencies.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Overall status: `ok` or `degraded`.
    pub status: &'static str,
    /// Whether the profile store is reachable.
    pub postgres: bool,
    /// Whether the job queue connection is established.
    pub nats: bool,
}

impl HealthResponse {
    /// Builds a response from individual dependency states.
    pub fn new(postgres: bool, nats: bool) -> Self {
        Self {
            status: if postgres && nats { "ok" } else { "degraded" },
            postgres,
            nats,
        }
    }

    /// Returns whether every dependency is healthy.
    pub fn is_healthy(&self) -> bool {
        self.postgres && self.nats
    }
}
