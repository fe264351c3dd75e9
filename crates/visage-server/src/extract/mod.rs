//! Request extractors.

mod auth;

pub use auth::{AuthClaims, AuthKeys, AuthState};
