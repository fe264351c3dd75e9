//! Profile repository for managing user profile rows.

use std::future::Future;

use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;

use crate::model::{Profile, UpsertProfile};
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for profile database operations.
///
/// The profile table is the single serialization point between
/// concurrently running workers: the uniqueness constraint on `user_id`
/// makes the upsert last-write-wins, so two jobs for the same user may
/// finish in either order and the row reflects whichever recorded last.
pub trait ProfileRepository {
    /// Creates or overwrites the profile row for a user.
    ///
    /// Uses `INSERT ... ON CONFLICT (user_id) DO UPDATE`, so a second
    /// picture for an existing user overwrites `picture_url` and never
    /// creates a duplicate row.
    fn upsert_profile(
        &mut self,
        upsert: UpsertProfile,
    ) -> impl Future<Output = PgResult<Profile>> + Send;

    /// Finds the profile row for a user.
    ///
    /// Returns `None` when no row exists, which is the expected state
    /// while a processing job is still in flight.
    fn find_profile(
        &mut self,
        user_id: &str,
    ) -> impl Future<Output = PgResult<Option<Profile>>> + Send;

    /// Removes the profile row for a user.
    ///
    /// This is a hard delete of the whole row. Returns `None` when no
    /// row existed.
    fn delete_profile(
        &mut self,
        user_id: &str,
    ) -> impl Future<Output = PgResult<Option<Profile>>> + Send;
}

impl ProfileRepository for PgConnection {
    async fn upsert_profile(&mut self, upsert: UpsertProfile) -> PgResult<Profile> {
        use schema::profiles::{self, dsl};

        diesel::insert_into(profiles::table)
            .values(&upsert)
            .on_conflict(dsl::user_id)
            .do_update()
            .set((
                dsl::picture_url.eq(excluded(dsl::picture_url)),
                dsl::updated_at.eq(diesel::dsl::now),
            ))
            .returning(Profile::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn find_profile(&mut self, user_id: &str) -> PgResult<Option<Profile>> {
        use schema::profiles::{self, dsl};

        profiles::table
            .filter(dsl::user_id.eq(user_id))
            .select(Profile::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn delete_profile(&mut self, user_id: &str) -> PgResult<Option<Profile>> {
        use schema::profiles::{self, dsl};

        diesel::delete(profiles::table.filter(dsl::user_id.eq(user_id)))
            .returning(Profile::as_returning())
            .get_result(self)
            .await
            .optional()
            .map_err(PgError::from)
    }
}
