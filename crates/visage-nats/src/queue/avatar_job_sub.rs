//! Avatar job subscriber.

use std::time::Duration;

use async_nats::jetstream::consumer::PullConsumer;
use async_nats::jetstream::{self, AckKind};
use futures::StreamExt;

use super::{AvatarJob, STREAM_NAME, ensure_stream};
use crate::{Error, Result, TRACING_TARGET_QUEUE};

/// How long a delivered message stays unacknowledged before redelivery.
const ACK_WAIT: Duration = Duration::from_secs(60);

/// Maximum deliveries per message before the queue drops it.
const MAX_DELIVER: i64 = 5;

/// Durable pull consumer for avatar processing jobs.
///
/// Multiple subscriber instances (one per worker) share the durable
/// consumer, so each message is handed to exactly one worker at a time.
pub struct AvatarJobSubscriber {
    consumer: PullConsumer,
    consumer_name: String,
}

impl AvatarJobSubscriber {
    /// Creates a subscriber bound to a durable consumer.
    #[tracing::instrument(skip(jetstream), target = TRACING_TARGET_QUEUE)]
    pub async fn new(jetstream: &jetstream::Context, consumer_name: &str) -> Result<Self> {
        let stream = ensure_stream(jetstream).await?;

        let consumer_config = jetstream::consumer::pull::Config {
            name: Some(consumer_name.to_string()),
            durable_name: Some(consumer_name.to_string()),
            description: Some("Avatar processing worker consumer".to_string()),
            ack_wait: ACK_WAIT,
            max_deliver: MAX_DELIVER,
            ..Default::default()
        };

        let consumer = stream
            .create_consumer(consumer_config)
            .await
            .map_err(|e| Error::consumer_error(consumer_name, e.to_string()))?;

        tracing::debug!(
            target: TRACING_TARGET_QUEUE,
            consumer = %consumer_name,
            stream = %STREAM_NAME,
            ack_wait_secs = ACK_WAIT.as_secs(),
            max_deliver = MAX_DELIVER,
            "Created durable job consumer"
        );

        Ok(Self {
            consumer,
            consumer_name: consumer_name.to_string(),
        })
    }

    /// Opens a continuous message stream.
    pub async fn messages(&self) -> Result<AvatarJobStream> {
        let inner = self
            .consumer
            .messages()
            .await
            .map_err(|e| Error::consumer_error(&self.consumer_name, e.to_string()))?;

        Ok(AvatarJobStream { inner })
    }

    /// Returns the durable consumer name.
    pub fn consumer_name(&self) -> &str {
        &self.consumer_name
    }
}

/// Continuous stream of avatar job messages.
pub struct AvatarJobStream {
    inner: jetstream::consumer::pull::Stream,
}

impl AvatarJobStream {
    /// Waits for the next message.
    ///
    /// Returns `Ok(None)` when the stream ends.
    pub async fn next(&mut self) -> Result<Option<AvatarJobMessage>> {
        match self.inner.next().await {
            None => Ok(None),
            Some(Err(e)) => Err(Error::consumer_error("avatar_jobs", e.to_string())),
            Some(Ok(message)) => Ok(Some(AvatarJobMessage { message })),
        }
    }
}

/// A delivered job message with acknowledgement control.
///
/// Parsing is separated from delivery so the consumer can TERM messages
/// that fail validation instead of letting them redeliver forever.
pub struct AvatarJobMessage {
    message: jetstream::Message,
}

impl AvatarJobMessage {
    /// Parses and validates the job payload.
    pub fn parse(&self) -> Result<AvatarJob> {
        let job: AvatarJob = serde_json::from_slice(&self.message.payload)?;
        job.validate()?;
        Ok(job)
    }

    /// Acknowledges the message, removing it from the work queue.
    ///
    /// Call only after all side effects of the job have been recorded;
    /// a crash before the ack simply redelivers the idempotent job.
    pub async fn ack(&self) -> Result<()> {
        self.message
            .ack()
            .await
            .map_err(|e| Error::Ack(e.to_string()))
    }

    /// Negatively acknowledges the message, requesting redelivery after `delay`.
    pub async fn nak(&self, delay: Option<Duration>) -> Result<()> {
        self.message
            .ack_with(AckKind::Nak(delay))
            .await
            .map_err(|e| Error::Ack(e.to_string()))
    }

    /// Terminates the message: no further redeliveries.
    ///
    /// Used for poison messages that no amount of retrying can fix.
    pub async fn term(&self) -> Result<()> {
        self.message
            .ack_with(AckKind::Term)
            .await
            .map_err(|e| Error::Ack(e.to_string()))
    }
}
