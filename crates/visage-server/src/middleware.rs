//! Router middleware extensions.

use axum::Router;
use axum::extract::DefaultBodyLimit;
use tower_http::trace::TraceLayer;

/// Default request body cap, sized for one picture plus multipart overhead.
pub const DEFAULT_BODY_LIMIT: usize = 12 * 1024 * 1024;

/// Extension trait for `axum::`[`Router`] to apply observability middleware.
pub trait RouterObservabilityExt {
    /// Adds HTTP request tracing spans.
    fn with_observability(self) -> Self;
}

impl RouterObservabilityExt for Router {
    fn with_observability(self) -> Self {
        self.layer(TraceLayer::new_for_http())
    }
}

/// Extension trait for `axum::`[`Router`] to apply security middleware.
pub trait RouterSecurityExt {
    /// Caps request body size, rejecting oversized uploads before the
    /// handler buffers them.
    fn with_body_limit(self, max_bytes: usize) -> Self;
}

impl RouterSecurityExt for Router {
    fn with_body_limit(self, max_bytes: usize) -> Self {
        self.layer(DefaultBodyLimit::max(max_bytes))
    }
}
