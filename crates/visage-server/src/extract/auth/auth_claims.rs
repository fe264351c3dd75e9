//! Verified token claims.

use serde::{Deserialize, Serialize};

/// Claims carried by a verified identity provider token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthClaims {
    /// Opaque stable user identifier.
    pub sub: String,
    /// Expiry as seconds since the Unix epoch.
    pub exp: u64,
}

impl AuthClaims {
    /// Returns the stable user identifier asserted by the token.
    #[inline]
    pub fn subject(&self) -> &str {
        &self.sub
    }
}
