//! All `axum::`[`Router`]s with related `axum::`[`Handler`]s.
//!
//! [`Router`]: axum::routing::Router
//! [`Handler`]: axum::handler::Handler

mod error;
mod monitors;
mod profiles;
pub mod response;

use axum::Router;
use axum::routing::get;

pub use crate::handler::error::{Error, ErrorKind, Result};
use crate::service::ServiceState;

/// Returns the complete gateway router.
pub fn routes(state: ServiceState) -> Router {
    Router::new()
        .route(
            "/api/profile",
            get(profiles::fetch_profile)
                .post(profiles::upload_profile)
                .put(profiles::upload_profile)
                .delete(profiles::remove_profile),
        )
        .route("/health", get(monitors::health_status))
        .with_state(state)
}
