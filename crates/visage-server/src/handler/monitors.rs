//! System health monitoring handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use visage_nats::NatsClient;
use visage_postgres::PgClient;

use crate::handler::response::HealthResponse;

/// Tracing target for monitor operations.
const TRACING_TARGET: &str = "visage_server::handler::monitors";

/// Reports gateway liveness and dependency connectivity.
///
/// Public endpoint; returns 503 when any dependency is unreachable so
/// load balancers can rotate the instance out.
#[tracing::instrument(skip_all)]
pub(crate) async fn health_status(
    State(pg_client): State<PgClient>,
    State(nats_client): State<NatsClient>,
) -> (StatusCode, Json<HealthResponse>) {
    let postgres = pg_client.is_healthy().await;
    let nats = nats_client.is_healthy();

    let response = HealthResponse::new(postgres, nats);

    tracing::debug!(
        target: TRACING_TARGET,
        postgres = postgres,
        nats = nats,
        "Health status checked"
    );

    let status = if response.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}
