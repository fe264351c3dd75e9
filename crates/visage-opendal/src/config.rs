//! Storage configuration.

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{StorageError, StorageResult};

/// S3-compatible object storage configuration.
///
/// The bucket is expected to be publicly readable; processed avatars are
/// served directly from the storage host without going through the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct StorageConfig {
    /// Bucket the processed avatars are written to
    #[cfg_attr(feature = "config", arg(long = "storage-bucket", env = "STORAGE_BUCKET"))]
    pub storage_bucket: String,

    /// Storage region
    #[cfg_attr(
        feature = "config",
        arg(long = "storage-region", env = "STORAGE_REGION", default_value = "us-east-1")
    )]
    pub storage_region: String,

    /// Custom endpoint URL (for S3-compatible storage like MinIO or R2)
    #[cfg_attr(
        feature = "config",
        arg(long = "storage-endpoint", env = "STORAGE_ENDPOINT")
    )]
    pub storage_endpoint: Option<String>,

    /// Access key ID
    #[cfg_attr(
        feature = "config",
        arg(long = "storage-access-key-id", env = "STORAGE_ACCESS_KEY_ID")
    )]
    pub storage_access_key_id: Option<String>,

    /// Secret access key
    #[cfg_attr(
        feature = "config",
        arg(long = "storage-secret-access-key", env = "STORAGE_SECRET_ACCESS_KEY")
    )]
    pub storage_secret_access_key: Option<String>,

    /// Base URL blobs are publicly served from.
    ///
    /// Defaults to the endpoint host (or the regional S3 host) over HTTPS.
    #[cfg_attr(
        feature = "config",
        arg(long = "storage-public-url", env = "STORAGE_PUBLIC_URL")
    )]
    pub storage_public_url: Option<String>,
}

impl StorageConfig {
    /// Creates a new storage configuration.
    pub fn new(bucket: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            storage_bucket: bucket.into(),
            storage_region: region.into(),
            storage_endpoint: None,
            storage_access_key_id: None,
            storage_secret_access_key: None,
            storage_public_url: None,
        }
    }

    /// Sets the custom endpoint (for S3-compatible storage).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.storage_endpoint = Some(endpoint.into());
        self
    }

    /// Sets the access credentials.
    pub fn with_credentials(
        mut self,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        self.storage_access_key_id = Some(access_key_id.into());
        self.storage_secret_access_key = Some(secret_access_key.into());
        self
    }

    /// Sets the public base URL.
    pub fn with_public_url(mut self, public_url: impl Into<String>) -> Self {
        self.storage_public_url = Some(public_url.into());
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> StorageResult<()> {
        if self.storage_bucket.trim().is_empty() {
            return Err(StorageError::config("storage_bucket must not be empty"));
        }

        if let Some(endpoint) = &self.storage_endpoint {
            Url::parse(endpoint).map_err(|e| {
                StorageError::config(format!("storage_endpoint is not a valid URL: {}", e))
            })?;
        }

        if let Some(public_url) = &self.storage_public_url {
            Url::parse(public_url).map_err(|e| {
                StorageError::config(format!("storage_public_url is not a valid URL: {}", e))
            })?;
        }

        Ok(())
    }

    /// Returns the base URL blobs are publicly served from, without a
    /// trailing slash.
    pub fn public_base(&self) -> String {
        if let Some(public_url) = &self.storage_public_url {
            return public_url.trim_end_matches('/').to_string();
        }

        if let Some(endpoint) = &self.storage_endpoint
            && let Ok(url) = Url::parse(endpoint)
            && let Some(host) = url.host_str()
        {
            return format!("https://{}", host);
        }

        format!("https://s3.{}.amazonaws.com", self.storage_region)
    }

    /// Returns the public URL for a blob key: `<base>/<bucket>/<key>`.
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.public_base(), self.storage_bucket, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_url_uses_configured_base() {
        let config = StorageConfig::new("avatars", "us-east-1")
            .with_public_url("https://storage.googleapis.com/");

        assert_eq!(
            config.public_url("processed-a.jpg"),
            "https://storage.googleapis.com/avatars/processed-a.jpg"
        );
    }

    #[test]
    fn public_url_falls_back_to_endpoint_host() {
        let config = StorageConfig::new("avatars", "us-east-1")
            .with_endpoint("http://minio.internal:9000");

        assert_eq!(
            config.public_url("processed-a.jpg"),
            "https://minio.internal/avatars/processed-a.jpg"
        );
    }

    #[test]
    fn public_url_falls_back_to_regional_host() {
        let config = StorageConfig::new("avatars", "eu-west-1");

        assert_eq!(
            config.public_url("processed-a.jpg"),
            "https://s3.eu-west-1.amazonaws.com/avatars/processed-a.jpg"
        );
    }

    #[test]
    fn empty_bucket_is_rejected() {
        let config = StorageConfig::new("", "us-east-1");
        assert!(config.validate().is_err());
    }

    #[test]
    fn invalid_endpoint_is_rejected() {
        let config = StorageConfig::new("avatars", "us-east-1").with_endpoint("not a url");
        assert!(config.validate().is_err());
    }
}
