//! Profile picture upload and management handlers.
//!
//! Uploads are fire-and-forget: the gateway verifies the caller, reads
//! the picture into memory, and publishes an avatar job. It never writes
//! the profile row itself; the worker does that once processing
//! succeeds, and clients poll the read endpoint until the URL appears.

use axum::Json;
use axum::extract::{Multipart, State};
use visage_nats::queue::{AvatarJob, AvatarJobPublisher, unique_file_name};
use visage_postgres::PgClient;
use visage_postgres::query::ProfileRepository;

use crate::extract::AuthState;
use crate::handler::response::{MessageResponse, ProfileResponse, UploadAccepted};
use crate::handler::{ErrorKind, Result};

/// Tracing target for profile operations.
const TRACING_TARGET: &str = "visage_server::handler::profiles";

/// Multipart field carrying the picture.
const UPLOAD_FIELD: &str = "profilePic";

/// Maximum accepted picture size: 10MB
const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// One picture read out of a multipart request.
struct Upload {
    file_name: String,
    content_type: String,
    data: Vec<u8>,
}

/// Queues a profile picture for processing.
///
/// Serves both POST (create) and PUT (replace): the worker's upsert
/// makes the two indistinguishable on the write path. Returns as soon as
/// the job is durably enqueued; no profile row or blob is touched here,
/// so a failed publish leaves no partial state behind.
#[tracing::instrument(skip_all, fields(user_id = %auth_state.subject()))]
pub(crate) async fn upload_profile(
    State(publisher): State<AvatarJobPublisher>,
    auth_state: AuthState,
    multipart: Multipart,
) -> Result<Json<UploadAccepted>> {
    let upload = read_upload(multipart).await?;

    tracing::debug!(
        target: TRACING_TARGET,
        file_name = %upload.file_name,
        content_type = %upload.content_type,
        size = upload.data.len(),
        "Accepted profile picture upload"
    );

    let file_name = unique_file_name(&upload.file_name);
    let job = AvatarJob::new(
        auth_state.subject(),
        file_name,
        upload.content_type,
        upload.data,
    );

    let handle = publisher.publish(&job).await.map_err(|err| {
        tracing::error!(
            target: TRACING_TARGET,
            job_id = %job.job_id,
            error = %err,
            "Failed to publish avatar job"
        );
        ErrorKind::InternalServerError
            .with_message("Failed to queue picture for processing")
            .into_static()
    })?;

    tracing::debug!(
        target: TRACING_TARGET,
        job_id = %job.job_id,
        message_id = %handle,
        "Avatar job published"
    );

    Ok(Json(UploadAccepted {
        message: "Profile picture queued for processing".to_string(),
        message_id: handle.to_string(),
    }))
}

/// Returns the caller's profile record.
///
/// A 404 here is the expected state while a processing job is still in
/// flight; callers poll until the record appears.
#[tracing::instrument(skip_all, fields(user_id = %auth_state.subject()))]
pub(crate) async fn fetch_profile(
    State(pg_client): State<PgClient>,
    auth_state: AuthState,
) -> Result<Json<ProfileResponse>> {
    let mut conn = pg_client.get_connection().await?;

    let Some(profile) = conn.find_profile(auth_state.subject()).await? else {
        return Err(ErrorKind::NotFound
            .with_message("Profile not found")
            .with_resource("profile")
            .into_static());
    };

    Ok(Json(ProfileResponse::from(profile)))
}

/// Removes the caller's profile record.
///
/// Deletion is synchronous and does not coordinate with in-flight jobs;
/// a job completing afterwards recreates the row.
#[tracing::instrument(skip_all, fields(user_id = %auth_state.subject()))]
pub(crate) async fn remove_profile(
    State(pg_client): State<PgClient>,
    auth_state: AuthState,
) -> Result<Json<MessageResponse>> {
    let mut conn = pg_client.get_connection().await?;

    let Some(_) = conn.delete_profile(auth_state.subject()).await? else {
        return Err(ErrorKind::NotFound
            .with_message("Profile not found")
            .with_resource("profile")
            .into_static());
    };

    tracing::debug!(target: TRACING_TARGET, "Profile deleted");

    Ok(Json(MessageResponse {
        message: "Profile deleted successfully".to_string(),
    }))
}

/// Reads the picture field out of a multipart request.
///
/// Exactly one `profilePic` file field is required; its absence is a
/// client error, not a server fault.
async fn read_upload(mut multipart: Multipart) -> Result<Upload> {
    while let Some(field) = multipart.next_field().await.map_err(|err| {
        tracing::debug!(target: TRACING_TARGET, error = %err, "Failed to read multipart field");
        ErrorKind::BadRequest
            .with_message("Invalid multipart data")
            .with_context(format!("Failed to parse multipart form: {}", err))
            .into_static()
    })? {
        if field.name() != Some(UPLOAD_FIELD) {
            tracing::debug!(
                target: TRACING_TARGET,
                field = ?field.name(),
                "Skipping unexpected multipart field"
            );
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field
            .content_type()
            .map(|ct| ct.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        // Read the field chunkwise so the size cap applies before the
        // whole payload is buffered
        let mut data = Vec::new();
        let mut field = field;
        while let Some(chunk) = field.chunk().await.map_err(|err| {
            tracing::debug!(target: TRACING_TARGET, error = %err, "Failed to read file chunk");
            ErrorKind::BadRequest
                .with_message("Failed to read file data")
                .with_context(err.to_string())
                .into_static()
        })? {
            if data.len() + chunk.len() > MAX_FILE_SIZE {
                return Err(ErrorKind::BadRequest
                    .with_message("File too large")
                    .with_context(format!(
                        "Picture exceeds maximum size of {} MB",
                        MAX_FILE_SIZE / (1024 * 1024)
                    ))
                    .into_static());
            }
            data.extend_from_slice(&chunk);
        }

        if data.is_empty() {
            return Err(ErrorKind::BadRequest
                .with_message("Profile picture is required")
                .into_static());
        }

        return Ok(Upload {
            file_name,
            content_type,
            data,
        });
    }

    Err(ErrorKind::BadRequest
        .with_message("Profile picture is required")
        .into_static())
}
