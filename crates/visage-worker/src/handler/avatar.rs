//! Avatar processing worker.
//!
//! Consumes avatar jobs from the work queue and runs each through the
//! pipeline: decode, resize, upload to object storage, record the public
//! URL in the profile store, then acknowledge the message.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use visage_nats::queue::{AvatarJob, AvatarJobMessage, AvatarJobSubscriber};
use visage_postgres::model::UpsertProfile;
use visage_postgres::query::ProfileRepository;

use crate::error::Result;
use crate::service::WorkerState;

/// Tracing target for the avatar worker.
const TRACING_TARGET: &str = "visage_worker::avatar";

/// Redelivery delay after a transient failure.
const RETRY_DELAY: Duration = Duration::from_secs(10);

/// Background worker for avatar processing jobs.
///
/// Multiple instances may run concurrently; the shared durable consumer
/// hands each message to exactly one of them.
pub struct AvatarWorker {
    state: WorkerState,
    consumer_name: String,
    cancel_token: CancellationToken,
    semaphore: Arc<Semaphore>,
}

impl AvatarWorker {
    /// Creates a new avatar worker.
    ///
    /// # Arguments
    ///
    /// * `state` - Application state with access to NATS, database, and storage
    /// * `consumer_name` - Durable consumer name shared by the worker fleet
    /// * `cancel_token` - Token for graceful shutdown signaling
    pub fn new(
        state: WorkerState,
        consumer_name: impl Into<String>,
        cancel_token: CancellationToken,
    ) -> Self {
        let semaphore = state.create_semaphore();
        Self {
            state,
            consumer_name: consumer_name.into(),
            cancel_token,
            semaphore,
        }
    }

    /// Spawns the worker as a background task.
    ///
    /// Returns a join handle that can be used to await worker completion
    /// or observe failures on shutdown.
    pub fn spawn(self) -> JoinHandle<Result<()>> {
        tokio::spawn(async move { self.run().await })
    }

    /// Runs the worker loop, processing jobs as they arrive.
    #[tracing::instrument(
        skip(self),
        fields(consumer = %self.consumer_name),
        target = TRACING_TARGET,
        name = "avatar_worker"
    )]
    pub async fn run(self) -> Result<()> {
        tracing::info!(target: TRACING_TARGET, "Starting avatar worker");

        let subscriber =
            AvatarJobSubscriber::new(self.state.nats.jetstream(), &self.consumer_name).await?;
        let mut stream = subscriber.messages().await?;

        tracing::info!(
            target: TRACING_TARGET,
            consumer = %self.consumer_name,
            max_concurrent_jobs = self.state.max_concurrent_jobs,
            "Subscribed to avatar jobs"
        );

        loop {
            tokio::select! {
                biased;

                () = self.cancel_token.cancelled() => {
                    tracing::info!(
                        target: TRACING_TARGET,
                        "Shutdown requested, stopping avatar worker"
                    );
                    break;
                }

                result = stream.next() => {
                    let msg = match result {
                        Ok(Some(msg)) => msg,
                        Ok(None) => {
                            tracing::warn!(
                                target: TRACING_TARGET,
                                "Job stream ended, stopping avatar worker"
                            );
                            break;
                        }
                        Err(err) => {
                            tracing::error!(
                                target: TRACING_TARGET,
                                error = %err,
                                "Failed to receive message"
                            );
                            continue;
                        }
                    };

                    // Bound in-flight jobs per instance
                    let permit = match self.semaphore.clone().acquire_owned().await {
                        Ok(permit) => permit,
                        Err(_) => {
                            tracing::error!(
                                target: TRACING_TARGET,
                                "Semaphore closed, stopping worker"
                            );
                            break;
                        }
                    };

                    let state = self.state.clone();
                    tokio::spawn(async move {
                        // Hold permit until the job completes
                        let _permit = permit;
                        process_message(&state, msg).await;
                    });
                }
            }
        }

        Ok(())
    }
}

/// Processes one delivered message through parse, pipeline, and ack.
async fn process_message(state: &WorkerState, msg: AvatarJobMessage) {
    let job = match msg.parse() {
        Ok(job) => job,
        Err(err) => {
            // A message failing validation cannot be fixed by redelivery
            tracing::error!(
                target: TRACING_TARGET,
                error = %err,
                "Rejecting invalid job message"
            );
            if let Err(err) = msg.term().await {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %err,
                    "Failed to terminate invalid message"
                );
            }
            return;
        }
    };

    tracing::info!(
        target: TRACING_TARGET,
        job_id = %job.job_id,
        user_id = %job.user_id,
        file_name = %job.file_name,
        mime_type = %job.mime_type,
        size = job.image_buffer.len(),
        "Processing avatar job"
    );

    match handle_job(state, &job).await {
        Ok(picture_url) => {
            tracing::info!(
                target: TRACING_TARGET,
                job_id = %job.job_id,
                user_id = %job.user_id,
                picture_url = %picture_url,
                "Avatar job completed"
            );

            // Ack only after the profile row is recorded; a crash before
            // this point redelivers the idempotent job
            if let Err(err) = msg.ack().await {
                tracing::error!(
                    target: TRACING_TARGET,
                    job_id = %job.job_id,
                    error = %err,
                    "Failed to ack completed job"
                );
            }
        }
        Err(err) if err.is_terminal() => {
            tracing::error!(
                target: TRACING_TARGET,
                job_id = %job.job_id,
                user_id = %job.user_id,
                error = %err,
                "Avatar job failed permanently, dropping"
            );
            if let Err(err) = msg.term().await {
                tracing::error!(
                    target: TRACING_TARGET,
                    job_id = %job.job_id,
                    error = %err,
                    "Failed to terminate failed job"
                );
            }
        }
        Err(err) => {
            tracing::warn!(
                target: TRACING_TARGET,
                job_id = %job.job_id,
                user_id = %job.user_id,
                error = %err,
                retry_delay_secs = RETRY_DELAY.as_secs(),
                "Avatar job failed, requesting redelivery"
            );
            if let Err(err) = msg.nak(Some(RETRY_DELAY)).await {
                tracing::error!(
                    target: TRACING_TARGET,
                    job_id = %job.job_id,
                    error = %err,
                    "Failed to nak failed job"
                );
            }
        }
    }
}

/// Runs the processing pipeline for one job.
///
/// Returns the public URL recorded in the profile store.
async fn handle_job(state: &WorkerState, job: &AvatarJob) -> Result<String> {
    // decode + resize + re-encode
    let processed = state.processor.process(&job.image_buffer)?;

    // upload under the job-derived key; redelivery overwrites the same blob
    let storage_key = job.storage_key();
    state
        .storage
        .write(&storage_key, processed, state.processor.content_type())
        .await?;

    let picture_url = state.storage.public_url(&storage_key);

    // record: sole writer of picture_url, last write wins per user
    let mut conn = state.postgres.get_connection().await?;
    conn.upsert_profile(UpsertProfile::new(job.user_id.as_str(), picture_url.as_str()))
        .await?;

    Ok(picture_url)
}
