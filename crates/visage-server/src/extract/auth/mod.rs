//! Bearer token authentication.
//!
//! Token verification is delegated to the external identity provider in
//! the sense that the provider issues the tokens and publishes the key
//! material; the gateway verifies signatures locally and trusts the
//! `sub` claim as the stable user identifier.

mod auth_claims;
mod auth_keys;
mod auth_state;

pub use auth_claims::AuthClaims;
pub use auth_keys::AuthKeys;
pub use auth_state::AuthState;
