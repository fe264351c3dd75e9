//! JetStream work queue for avatar processing jobs.
//!
//! The upload gateway publishes one [`AvatarJob`] per upload; processing
//! workers consume them through a durable pull consumer. The stream uses
//! work-queue retention, so each message is handed to exactly one
//! consumer at a time and redelivered after the acknowledgement window
//! if the worker did not finish.

mod avatar_job;
mod avatar_job_pub;
mod avatar_job_sub;

use async_nats::jetstream::{self, stream};

pub use avatar_job::{AvatarJob, unique_file_name};
pub use avatar_job_pub::{AvatarJobPublisher, JobHandle};
pub use avatar_job_sub::{AvatarJobMessage, AvatarJobStream, AvatarJobSubscriber};

use crate::{Error, Result, TRACING_TARGET_QUEUE};

/// JetStream stream carrying avatar processing jobs.
pub const STREAM_NAME: &str = "AVATAR_JOBS";

/// Subject avatar jobs are published to.
pub const JOB_SUBJECT: &str = "jobs.avatars.process";

/// Returns the job stream, creating it if it does not exist yet.
pub(crate) async fn ensure_stream(
    jetstream: &jetstream::Context,
) -> Result<jetstream::stream::Stream> {
    let stream_config = stream::Config {
        name: STREAM_NAME.to_string(),
        description: Some("Avatar processing job queue".to_string()),
        subjects: vec!["jobs.avatars.>".to_string()],
        retention: stream::RetentionPolicy::WorkQueue,
        ..Default::default()
    };

    match jetstream.get_stream(STREAM_NAME).await {
        Ok(stream) => {
            tracing::debug!(
                target: TRACING_TARGET_QUEUE,
                stream = %STREAM_NAME,
                "Using existing job stream"
            );
            Ok(stream)
        }
        Err(_) => {
            tracing::debug!(
                target: TRACING_TARGET_QUEUE,
                stream = %STREAM_NAME,
                "Creating new job stream"
            );
            jetstream
                .create_stream(stream_config)
                .await
                .map_err(|e| Error::stream_error(STREAM_NAME, e.to_string()))
        }
    }
}
