//! Profile response bodies.

use jiff::Timestamp;
use serde::Serialize;
use visage_postgres::model::Profile;

/// The profile record returned by `GET /api/profile`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    /// Stable identifier asserted by the identity provider.
    pub user_id: String,
    /// Public URL of the processed picture, absent while processing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture_url: Option<String>,
    /// When the row was created.
    pub created_at: Timestamp,
    /// When the row was last updated.
    pub updated_at: Timestamp,
}

impl From<Profile> for ProfileResponse {
    fn from(profile: Profile) -> Self {
        Self {
            user_id: profile.user_id,
            picture_url: profile.picture_url,
            created_at: profile.created_at.into(),
            updated_at: profile.updated_at.into(),
        }
    }
}

/// Acknowledgment returned by the enqueue endpoints.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadAccepted {
    /// Human-readable acknowledgment.
    pub message: String,
    /// Opaque handle of the queued job.
    pub message_id: String,
}

/// Simple message-only response body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    /// Human-readable outcome.
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_accepted_serializes_message_id() {
        let body = UploadAccepted {
            message: "queued".into(),
            message_id: "AVATAR_JOBS/7".into(),
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json.get("messageId").and_then(|v| v.as_str()),
            Some("AVATAR_JOBS/7")
        );
    }

    #[test]
    fn absent_picture_url_is_omitted() {
        let body = ProfileResponse {
            user_id: "user-1".into(),
            picture_url: None,
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
        };

        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("pictureUrl").is_none());
        assert_eq!(json.get("userId").and_then(|v| v.as_str()), Some("user-1"));
    }
}
