//! Gateway service configuration.

use std::path::PathBuf;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use visage_nats::{NatsClient, NatsConfig};
use visage_postgres::{PgClient, PgConfig};

use super::{Result, ServiceError};
use crate::TRACING_TARGET_SERVICE;
use crate::extract::AuthKeys;

/// Token verification configuration.
///
/// Exactly one source of key material must be provided. A missing or
/// unreadable key file is a fatal startup error; the gateway never
/// serves requests it cannot authenticate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct AuthConfig {
    /// Shared HS256 secret issued by the identity provider
    #[cfg_attr(
        feature = "config",
        arg(long = "auth-jwt-secret", env = "AUTH_JWT_SECRET")
    )]
    pub auth_jwt_secret: Option<String>,

    /// Path to the identity provider's RS256 public key (PEM)
    #[cfg_attr(
        feature = "config",
        arg(long = "auth-public-key-file", env = "AUTH_PUBLIC_KEY_FILE")
    )]
    pub auth_public_key_file: Option<PathBuf>,
}

impl AuthConfig {
    /// Validates that exactly one key source is configured.
    pub fn validate(&self) -> Result<()> {
        match (&self.auth_jwt_secret, &self.auth_public_key_file) {
            (Some(_), Some(_)) => Err(ServiceError::config(
                "auth_jwt_secret and auth_public_key_file are mutually exclusive",
            )),
            (None, None) => Err(ServiceError::config(
                "either auth_jwt_secret or auth_public_key_file is required",
            )),
            _ => Ok(()),
        }
    }

    /// Loads the verification keys from the configured source.
    pub async fn load_keys(&self) -> Result<AuthKeys> {
        self.validate()?;

        if let Some(secret) = &self.auth_jwt_secret {
            tracing::debug!(
                target: TRACING_TARGET_SERVICE,
                "Loaded HS256 token verification secret"
            );
            return Ok(AuthKeys::from_secret(secret.as_bytes()));
        }

        // validate() guarantees the file path is present here
        let path = self
            .auth_public_key_file
            .as_ref()
            .ok_or_else(|| ServiceError::config("auth key source missing"))?;

        let pem = tokio::fs::read(path).await.map_err(|err| {
            tracing::error!(
                target: TRACING_TARGET_SERVICE,
                path = %path.display(),
                error = %err,
                "Failed to read auth public key file"
            );
            ServiceError::Io(err)
        })?;

        let keys = AuthKeys::from_rsa_pem(&pem)?;
        tracing::debug!(
            target: TRACING_TARGET_SERVICE,
            path = %path.display(),
            "Loaded RS256 token verification key"
        );
        Ok(keys)
    }
}

/// Complete gateway configuration.
///
/// Combines connection configuration for all external collaborators.
/// This is the main configuration type passed to
/// [`ServiceState::from_config`].
///
/// [`ServiceState::from_config`]: super::ServiceState::from_config
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct ServiceConfig {
    /// Postgres database configuration.
    #[cfg_attr(feature = "config", command(flatten))]
    pub postgres: PgConfig,

    /// NATS configuration.
    #[cfg_attr(feature = "config", command(flatten))]
    pub nats: NatsConfig,

    /// Token verification configuration.
    #[cfg_attr(feature = "config", command(flatten))]
    pub auth: AuthConfig,
}

impl ServiceConfig {
    /// Connects to the profile store, verifying connectivity.
    pub async fn connect_postgres(&self) -> Result<PgClient> {
        Ok(PgClient::new_with_test(self.postgres.clone()).await?)
    }

    /// Connects to the job queue.
    pub async fn connect_nats(&self) -> Result<NatsClient> {
        Ok(NatsClient::connect(self.nats.clone()).await?)
    }

    /// Loads the token verification keys.
    pub async fn load_auth_keys(&self) -> Result<AuthKeys> {
        self.auth.load_keys().await
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn secret_only() -> AuthConfig {
        AuthConfig {
            auth_jwt_secret: Some("secret".into()),
            auth_public_key_file: None,
        }
    }

    #[test]
    fn exactly_one_key_source_is_required() {
        assert!(secret_only().validate().is_ok());

        let neither = AuthConfig {
            auth_jwt_secret: None,
            auth_public_key_file: None,
        };
        assert!(neither.validate().is_err());

        let both = AuthConfig {
            auth_jwt_secret: Some("secret".into()),
            auth_public_key_file: Some("/tmp/key.pem".into()),
        };
        assert!(both.validate().is_err());
    }

    #[tokio::test]
    async fn secret_source_loads_keys() {
        assert!(secret_only().load_keys().await.is_ok());
    }

    #[tokio::test]
    async fn missing_key_file_is_fatal() {
        let config = AuthConfig {
            auth_jwt_secret: None,
            auth_public_key_file: Some("/nonexistent/key.pem".into()),
        };

        assert!(matches!(
            config.load_keys().await,
            Err(ServiceError::Io(_))
        ));
    }

    #[tokio::test]
    async fn unparseable_key_file_is_fatal() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"not a pem").unwrap();

        let config = AuthConfig {
            auth_jwt_secret: None,
            auth_public_key_file: Some(file.path().to_path_buf()),
        };

        assert!(matches!(
            config.load_keys().await,
            Err(ServiceError::Key(_))
        ));
    }
}
