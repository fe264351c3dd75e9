//! NATS connection configuration and credentials.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Configuration for NATS connections
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct NatsConfig {
    /// NATS server URL
    #[cfg_attr(
        feature = "config",
        arg(long = "nats-url", env = "NATS_URL", default_value = "nats://127.0.0.1:4222")
    )]
    pub nats_url: String,

    /// Connection name for debugging
    #[cfg_attr(
        feature = "config",
        arg(long = "nats-name", env = "NATS_CLIENT_NAME", default_value = "visage")
    )]
    pub nats_name: String,

    /// Connection timeout in seconds
    #[cfg_attr(
        feature = "config",
        arg(
            long = "nats-connect-timeout-secs",
            env = "NATS_CONNECT_TIMEOUT_SECS",
            default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS
        )
    )]
    pub nats_connect_timeout_secs: u64,

    /// Username for authentication (paired with `nats_pass`)
    #[cfg_attr(feature = "config", arg(long = "nats-user", env = "NATS_USER"))]
    pub nats_user: Option<String>,

    /// Password for authentication (paired with `nats_user`)
    #[cfg_attr(feature = "config", arg(long = "nats-pass", env = "NATS_PASS"))]
    pub nats_pass: Option<String>,

    /// Token for authentication
    #[cfg_attr(feature = "config", arg(long = "nats-token", env = "NATS_TOKEN"))]
    pub nats_token: Option<String>,

    /// Path to a NATS credentials file
    #[cfg_attr(
        feature = "config",
        arg(long = "nats-creds-file", env = "NATS_CREDS_FILE")
    )]
    pub nats_creds_file: Option<String>,
}

impl Default for NatsConfig {
    fn default() -> Self {
        Self {
            nats_url: "nats://127.0.0.1:4222".to_string(),
            nats_name: "visage".to_string(),
            nats_connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            nats_user: None,
            nats_pass: None,
            nats_token: None,
            nats_creds_file: None,
        }
    }
}

impl NatsConfig {
    /// Create a new configuration with the given server URL
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            nats_url: server_url.into(),
            ..Default::default()
        }
    }

    /// Set connection name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.nats_name = name.into();
        self
    }

    /// Set authentication credentials
    pub fn with_credentials(mut self, credentials: NatsCredentials) -> Self {
        match credentials {
            NatsCredentials::UserPassword { user, pass } => {
                self.nats_user = Some(user);
                self.nats_pass = Some(pass);
            }
            NatsCredentials::Token { token } => self.nats_token = Some(token),
            NatsCredentials::CredsFile { path } => self.nats_creds_file = Some(path),
        }
        self
    }

    /// Returns the connection timeout as a [`Duration`].
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.nats_connect_timeout_secs)
    }

    /// Returns the request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)
    }

    /// Resolves the configured credentials, if any.
    pub fn credentials(&self) -> Option<NatsCredentials> {
        if let (Some(user), Some(pass)) = (&self.nats_user, &self.nats_pass) {
            return Some(NatsCredentials::UserPassword {
                user: user.clone(),
                pass: pass.clone(),
            });
        }
        if let Some(token) = &self.nats_token {
            return Some(NatsCredentials::Token {
                token: token.clone(),
            });
        }
        if let Some(path) = &self.nats_creds_file {
            return Some(NatsCredentials::CredsFile { path: path.clone() });
        }
        None
    }
}

/// NATS authentication credentials
#[derive(Debug, Clone)]
pub enum NatsCredentials {
    /// Username and password
    UserPassword { user: String, pass: String },
    /// Static token
    Token { token: String },
    /// Credentials file path
    CredsFile { path: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_no_credentials() {
        let config = NatsConfig::default();
        assert!(config.credentials().is_none());
    }

    #[test]
    fn user_password_takes_precedence() {
        let config = NatsConfig::new("nats://localhost:4222").with_credentials(
            NatsCredentials::UserPassword {
                user: "visage".into(),
                pass: "secret".into(),
            },
        );

        assert!(matches!(
            config.credentials(),
            Some(NatsCredentials::UserPassword { .. })
        ));
    }

    #[test]
    fn token_credentials_resolve() {
        let config = NatsConfig::new("nats://localhost:4222")
            .with_credentials(NatsCredentials::Token {
                token: "tok".into(),
            });

        assert!(matches!(
            config.credentials(),
            Some(NatsCredentials::Token { .. })
        ));
    }
}
