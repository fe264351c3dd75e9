//! Avatar processing job message.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Fallback file name for uploads without a usable original name.
const FALLBACK_FILE_NAME: &str = "upload";

/// Prefix for processed blobs in object storage.
const PROCESSED_KEY_PREFIX: &str = "processed-";

/// Avatar processing job.
///
/// One job is published per upload. The `file_name` carries a freshly
/// generated unique prefix, so two uploads racing each other never
/// collide on the derived storage key. Re-processing the same job is
/// idempotent: the storage key and the profile row it targets are both
/// functions of the job alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvatarJob {
    /// Unique job identifier (UUID v7 for time-ordering).
    pub job_id: Uuid,
    /// Target profile owner.
    pub user_id: String,
    /// Unique-prefixed name of the uploaded file.
    pub file_name: String,
    /// Declared content type of the source bytes.
    pub mime_type: String,
    /// Raw source payload (base64-encoded on the wire).
    #[serde(with = "base64_bytes")]
    pub image_buffer: Vec<u8>,
    /// When the job was created.
    pub created_at: Timestamp,
}

impl AvatarJob {
    /// Creates a new avatar job.
    ///
    /// `file_name` should come from [`unique_file_name`] so concurrent
    /// uploads derive distinct storage keys.
    pub fn new(
        user_id: impl Into<String>,
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        image_buffer: Vec<u8>,
    ) -> Self {
        Self {
            job_id: Uuid::now_v7(),
            user_id: user_id.into(),
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            image_buffer,
            created_at: Timestamp::now(),
        }
    }

    /// Validates required fields.
    ///
    /// Messages missing any required field are rejected at the consumer
    /// boundary; redelivery cannot fix them.
    pub fn validate(&self) -> Result<()> {
        if self.user_id.trim().is_empty() {
            return Err(Error::invalid_job("userId must not be empty"));
        }
        if self.file_name.trim().is_empty() {
            return Err(Error::invalid_job("fileName must not be empty"));
        }
        if self.image_buffer.is_empty() {
            return Err(Error::invalid_job("imageBuffer must not be empty"));
        }
        Ok(())
    }

    /// Returns the object storage key the processed blob is written to.
    ///
    /// Deterministic per job, which makes redelivered jobs overwrite
    /// their own output instead of creating duplicates.
    pub fn storage_key(&self) -> String {
        format!("{}{}", PROCESSED_KEY_PREFIX, self.file_name)
    }
}

/// Builds a collision-resistant file name from a client-supplied one.
///
/// Path components are stripped from the original name and a fresh UUID
/// prefix is attached, so concurrent uploads (by the same or different
/// users) never overwrite each other's in-flight blobs.
pub fn unique_file_name(original: &str) -> String {
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(FALLBACK_FILE_NAME);

    format!("{}-{}", Uuid::new_v4(), base)
}

mod base64_bytes {
    //! Base64 transport encoding for the binary payload.

    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> AvatarJob {
        AvatarJob::new(
            "user-1",
            unique_file_name("selfie.png"),
            "image/png",
            vec![1, 2, 3, 4],
        )
    }

    #[test]
    fn wire_format_uses_camel_case_and_base64() {
        let job = job();
        let value = serde_json::to_value(&job).unwrap();

        assert!(value.get("userId").is_some());
        assert!(value.get("fileName").is_some());
        assert!(value.get("mimeType").is_some());
        assert_eq!(
            value.get("imageBuffer").and_then(|v| v.as_str()),
            Some("AQIDBA==")
        );
    }

    #[test]
    fn wire_format_round_trips() {
        let job = job();
        let encoded = serde_json::to_vec(&job).unwrap();
        let decoded: AvatarJob = serde_json::from_slice(&encoded).unwrap();
        assert_eq!(decoded, job);
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let message = serde_json::json!({
            "jobId": Uuid::now_v7(),
            "userId": "user-1",
            "mimeType": "image/png",
            "imageBuffer": "AQIDBA==",
            "createdAt": Timestamp::now(),
        });

        assert!(serde_json::from_value::<AvatarJob>(message).is_err());
    }

    #[test]
    fn empty_fields_fail_validation() {
        let mut empty_user = job();
        empty_user.user_id = "  ".into();
        assert!(empty_user.validate().is_err());

        let mut empty_name = job();
        empty_name.file_name = String::new();
        assert!(empty_name.validate().is_err());

        let mut empty_payload = job();
        empty_payload.image_buffer.clear();
        assert!(empty_payload.validate().is_err());

        assert!(job().validate().is_ok());
    }

    #[test]
    fn storage_key_is_prefixed_and_stable() {
        let job = job();
        let key = job.storage_key();
        assert!(key.starts_with("processed-"));
        assert_eq!(key, job.storage_key());
    }

    #[test]
    fn unique_file_name_strips_path_components() {
        let name = unique_file_name("../../etc/passwd");
        assert!(name.ends_with("-passwd"));
        assert!(!name.contains('/'));

        let name = unique_file_name("C:\\Users\\me\\selfie.png");
        assert!(name.ends_with("-selfie.png"));
    }

    #[test]
    fn unique_file_name_falls_back_for_empty_names() {
        let name = unique_file_name("");
        assert!(name.ends_with("-upload"));
    }

    #[test]
    fn unique_file_names_differ_between_calls() {
        assert_ne!(unique_file_name("a.png"), unique_file_name("a.png"));
    }
}
