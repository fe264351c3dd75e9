//! Avatar job publisher.

use std::fmt;

use async_nats::jetstream;

use super::{AvatarJob, JOB_SUBJECT, ensure_stream};
use crate::{Error, Result, TRACING_TARGET_QUEUE};

/// Opaque handle for a published job.
///
/// Returned to the uploading client as the acknowledgment that the job
/// was durably placed on the queue. Carries no ordering or status
/// semantics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    stream: String,
    sequence: u64,
}

impl JobHandle {
    /// Returns the stream the job was persisted to.
    pub fn stream(&self) -> &str {
        &self.stream
    }

    /// Returns the stream sequence assigned to the job.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.stream, self.sequence)
    }
}

/// Publisher for avatar processing jobs.
#[derive(Debug, Clone)]
pub struct AvatarJobPublisher {
    jetstream: jetstream::Context,
}

impl AvatarJobPublisher {
    /// Creates a new publisher, ensuring the job stream exists.
    #[tracing::instrument(skip(jetstream), target = TRACING_TARGET_QUEUE)]
    pub async fn new(jetstream: &jetstream::Context) -> Result<Self> {
        ensure_stream(jetstream).await?;
        Ok(Self {
            jetstream: jetstream.clone(),
        })
    }

    /// Publishes a job to the queue.
    ///
    /// Suspends only for the duration of the JetStream publish
    /// acknowledgment. The returned [`JobHandle`] proves the message was
    /// durably stored.
    #[tracing::instrument(skip(self, job), fields(job_id = %job.job_id), target = TRACING_TARGET_QUEUE)]
    pub async fn publish(&self, job: &AvatarJob) -> Result<JobHandle> {
        let payload = serde_json::to_vec(job)?;
        let payload_size = payload.len();

        let ack = self
            .jetstream
            .publish(JOB_SUBJECT, payload.into())
            .await
            .map_err(|e| Error::delivery_failed(JOB_SUBJECT, e.to_string()))?
            .await
            .map_err(|e| Error::operation("publish_ack", e.to_string()))?;

        tracing::debug!(
            target: TRACING_TARGET_QUEUE,
            job_id = %job.job_id,
            user_id = %job.user_id,
            subject = %JOB_SUBJECT,
            sequence = ack.sequence,
            payload_size = payload_size,
            "Published avatar job"
        );

        Ok(JobHandle {
            stream: ack.stream,
            sequence: ack.sequence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_handle_display_is_stream_slash_sequence() {
        let handle = JobHandle {
            stream: "AVATAR_JOBS".to_string(),
            sequence: 42,
        };
        assert_eq!(handle.to_string(), "AVATAR_JOBS/42");
    }
}
