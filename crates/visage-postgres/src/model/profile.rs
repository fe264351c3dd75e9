//! Profile model for PostgreSQL database operations.
//!
//! A profile tracks the single processed picture a user currently owns.
//! Rows are created and overwritten by the processing worker and removed
//! by an explicit deletion request.
//!
//! ## Models
//!
//! - [`Profile`] - The stored profile row
//! - [`UpsertProfile`] - Data for creating or overwriting a profile row

use diesel::prelude::*;
use jiff_diesel::Timestamp;

use crate::schema::profiles;

/// A user's profile row.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Profile {
    /// Opaque stable identifier asserted by the identity provider.
    pub user_id: String,
    /// Public URL of the most recently processed picture.
    ///
    /// `None` until the first processing job for this user completes.
    pub picture_url: Option<String>,
    /// Timestamp when the row was created.
    pub created_at: Timestamp,
    /// Timestamp when the row was last updated.
    pub updated_at: Timestamp,
}

/// Data for creating or overwriting a profile row.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpsertProfile {
    /// Opaque stable identifier asserted by the identity provider.
    pub user_id: String,
    /// Public URL of the processed picture.
    pub picture_url: Option<String>,
}

impl UpsertProfile {
    /// Creates an upsert payload for a processed picture.
    pub fn new(user_id: impl Into<String>, picture_url: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            picture_url: Some(picture_url.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_profile_sets_url() {
        let upsert = UpsertProfile::new("user-1", "https://cdn.example/avatars/processed-a.jpg");
        assert_eq!(upsert.user_id, "user-1");
        assert_eq!(
            upsert.picture_url.as_deref(),
            Some("https://cdn.example/avatars/processed-a.jpg")
        );
    }
}
