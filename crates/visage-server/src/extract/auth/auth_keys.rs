//! Verification keys for identity provider tokens.

use std::sync::Arc;

use jsonwebtoken::{Algorithm, DecodingKey, Validation};

use super::AuthClaims;

/// Key material used to verify bearer tokens.
///
/// Constructed once at startup from the identity provider's shared
/// secret or public key, then cloned into request handlers. Cloning is
/// cheap.
#[derive(Clone)]
pub struct AuthKeys {
    decoding_key: Arc<DecodingKey>,
    validation: Arc<Validation>,
}

impl AuthKeys {
    /// Creates verification keys for HS256 tokens from a shared secret.
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            decoding_key: Arc::new(DecodingKey::from_secret(secret)),
            validation: Arc::new(Validation::new(Algorithm::HS256)),
        }
    }

    /// Creates verification keys for RS256 tokens from a public key PEM.
    pub fn from_rsa_pem(pem: &[u8]) -> Result<Self, jsonwebtoken::errors::Error> {
        Ok(Self {
            decoding_key: Arc::new(DecodingKey::from_rsa_pem(pem)?),
            validation: Arc::new(Validation::new(Algorithm::RS256)),
        })
    }

    /// Verifies a token and returns its claims.
    pub fn decode(&self, token: &str) -> Result<AuthClaims, jsonwebtoken::errors::Error> {
        let data = jsonwebtoken::decode::<AuthClaims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }
}

impl std::fmt::Debug for AuthKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthKeys").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::{EncodingKey, Header, encode};

    use super::*;

    fn token_for(sub: &str, secret: &[u8], exp: u64) -> String {
        let claims = AuthClaims {
            sub: sub.to_string(),
            exp,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret)).unwrap()
    }

    fn far_future() -> u64 {
        4_102_444_800 // 2100-01-01
    }

    #[test]
    fn valid_token_yields_subject() {
        let keys = AuthKeys::from_secret(b"test-secret");
        let token = token_for("user-1", b"test-secret", far_future());

        let claims = keys.decode(&token).unwrap();
        assert_eq!(claims.subject(), "user-1");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let keys = AuthKeys::from_secret(b"test-secret");
        let token = token_for("user-1", b"other-secret", far_future());

        assert!(keys.decode(&token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let keys = AuthKeys::from_secret(b"test-secret");
        let token = token_for("user-1", b"test-secret", 1);

        assert!(keys.decode(&token).is_err());
    }

    #[test]
    fn garbage_token_is_rejected() {
        let keys = AuthKeys::from_secret(b"test-secret");
        assert!(keys.decode("not-a-jwt").is_err());
    }
}
