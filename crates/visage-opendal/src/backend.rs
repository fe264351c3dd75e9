//! Storage backend implementation.

use opendal::Operator;

use crate::TRACING_TARGET;
use crate::config::StorageConfig;
use crate::error::StorageResult;

/// Storage backend for processed avatar blobs.
///
/// Wraps an OpenDAL operator together with the configuration used to
/// derive public URLs. Cloning is cheap.
#[derive(Clone)]
pub struct StorageBackend {
    operator: Operator,
    config: StorageConfig,
}

impl StorageBackend {
    /// Creates a new S3-backed storage backend from configuration.
    #[cfg(feature = "s3")]
    pub async fn new(config: StorageConfig) -> StorageResult<Self> {
        use crate::error::StorageError;

        config.validate()?;

        let mut builder = opendal::services::S3::default()
            .bucket(&config.storage_bucket)
            .region(&config.storage_region);

        if let Some(ref endpoint) = config.storage_endpoint {
            builder = builder.endpoint(endpoint);
        }

        if let Some(ref access_key_id) = config.storage_access_key_id {
            builder = builder.access_key_id(access_key_id);
        }

        if let Some(ref secret_access_key) = config.storage_secret_access_key {
            builder = builder.secret_access_key(secret_access_key);
        }

        let operator = Operator::new(builder)
            .map(|op| op.finish())
            .map_err(|e| StorageError::init(e.to_string()))?;

        tracing::info!(
            target: TRACING_TARGET,
            bucket = %config.storage_bucket,
            region = %config.storage_region,
            endpoint = ?config.storage_endpoint,
            "Storage backend initialized"
        );

        Ok(Self { operator, config })
    }

    /// Creates a backend from an existing operator.
    ///
    /// Intended for tests and custom wiring.
    pub fn from_operator(operator: Operator, config: StorageConfig) -> Self {
        Self { operator, config }
    }

    /// Returns the configuration for this backend.
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Returns the public URL for a blob key.
    pub fn public_url(&self, key: &str) -> String {
        self.config.public_url(key)
    }

    /// Writes a blob with the given content type.
    pub async fn write(&self, key: &str, data: Vec<u8>, content_type: &str) -> StorageResult<()> {
        tracing::debug!(
            target: TRACING_TARGET,
            key = %key,
            size = data.len(),
            content_type = %content_type,
            "Writing blob"
        );

        let mut write = self.operator.write_with(key, data);
        // Not every service records content types (the in-memory one
        // used by tests does not)
        if self.operator.info().full_capability().write_with_content_type {
            write = write.content_type(content_type);
        }
        write.await?;

        tracing::debug!(
            target: TRACING_TARGET,
            key = %key,
            "Blob write complete"
        );

        Ok(())
    }

    /// Reads a blob from storage.
    pub async fn read(&self, key: &str) -> StorageResult<Vec<u8>> {
        let data = self.operator.read(key).await?.to_vec();

        tracing::debug!(
            target: TRACING_TARGET,
            key = %key,
            size = data.len(),
            "Blob read complete"
        );

        Ok(data)
    }

    /// Deletes a blob from storage.
    pub async fn delete(&self, key: &str) -> StorageResult<()> {
        tracing::debug!(
            target: TRACING_TARGET,
            key = %key,
            "Deleting blob"
        );

        self.operator.delete(key).await?;

        Ok(())
    }

    /// Checks if a blob exists.
    pub async fn exists(&self, key: &str) -> StorageResult<bool> {
        Ok(self.operator.exists(key).await?)
    }

    /// Gets metadata for a blob.
    pub async fn stat(&self, key: &str) -> StorageResult<FileMetadata> {
        let meta = self.operator.stat(key).await?;

        Ok(FileMetadata {
            size: meta.content_length(),
            content_type: meta.content_type().map(|s| s.to_string()),
        })
    }
}

/// Blob metadata.
#[derive(Debug, Clone)]
pub struct FileMetadata {
    /// Blob size in bytes.
    pub size: u64,
    /// Content type / MIME type.
    pub content_type: Option<String>,
}

impl std::fmt::Debug for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageBackend")
            .field("bucket", &self.config.storage_bucket)
            .field("region", &self.config.storage_region)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_backend() -> StorageBackend {
        let operator = Operator::new(opendal::services::Memory::default())
            .unwrap()
            .finish();
        let config = StorageConfig::new("avatars", "us-east-1")
            .with_public_url("https://cdn.example");
        StorageBackend::from_operator(operator, config)
    }

    #[tokio::test]
    async fn write_read_round_trip() {
        let backend = memory_backend();
        backend
            .write("processed-a.jpg", vec![0xFF, 0xD8, 0xFF], "image/jpeg")
            .await
            .unwrap();

        let data = backend.read("processed-a.jpg").await.unwrap();
        assert_eq!(data, vec![0xFF, 0xD8, 0xFF]);
        assert!(backend.exists("processed-a.jpg").await.unwrap());
    }

    #[tokio::test]
    async fn overwrite_replaces_content() {
        let backend = memory_backend();
        backend
            .write("processed-a.jpg", vec![1], "image/jpeg")
            .await
            .unwrap();
        backend
            .write("processed-a.jpg", vec![2, 3], "image/jpeg")
            .await
            .unwrap();

        assert_eq!(backend.read("processed-a.jpg").await.unwrap(), vec![2, 3]);
    }

    #[tokio::test]
    async fn delete_removes_blob() {
        let backend = memory_backend();
        backend
            .write("processed-a.jpg", vec![1], "image/jpeg")
            .await
            .unwrap();
        backend.delete("processed-a.jpg").await.unwrap();

        assert!(!backend.exists("processed-a.jpg").await.unwrap());
    }

    #[tokio::test]
    async fn missing_blob_read_is_not_found() {
        let backend = memory_backend();
        let err = backend.read("missing").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn public_url_matches_bucket_key_pattern() {
        let backend = memory_backend();
        assert_eq!(
            backend.public_url("processed-a.jpg"),
            "https://cdn.example/avatars/processed-a.jpg"
        );
    }
}
