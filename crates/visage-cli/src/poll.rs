//! Bounded profile polling.
//!
//! After an upload the gateway returns immediately; the processed
//! picture URL only appears once the worker finishes. This module polls
//! `GET /api/profile` at a fixed interval for a bounded number of
//! attempts. Giving up does not cancel the underlying job; the caller
//! has simply stopped waiting.

use std::time::Duration;

use reqwest::StatusCode;
use tokio_util::sync::CancellationToken;

use crate::TRACING_TARGET_POLL;

/// Poller behavior parameters.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Number of attempts before giving up.
    pub attempts: u32,
    /// Fixed delay between attempts.
    pub interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            attempts: 10,
            interval: Duration::from_secs(3),
        }
    }
}

/// Errors raised while polling for a processed profile.
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    /// The HTTP request itself failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The gateway rejected the credential; retrying cannot help.
    #[error("authentication rejected by the gateway")]
    Forbidden,

    /// The gateway answered with an unexpected status.
    #[error("unexpected gateway status: {0}")]
    UnexpectedStatus(u16),

    /// All attempts were used up without the picture URL appearing.
    #[error("processing took too long: no picture after {attempts} attempts")]
    TimedOut { attempts: u32 },

    /// The caller cancelled the poll.
    #[error("polling cancelled")]
    Cancelled,
}

/// Polls the gateway until the profile carries a picture URL.
///
/// Returns the profile JSON once `pictureUrl` is present and non-empty.
/// Cancellable between attempts via `cancel_token`.
pub async fn wait_for_profile(
    gateway_url: &str,
    token: &str,
    config: &PollConfig,
    cancel_token: &CancellationToken,
) -> Result<serde_json::Value, PollError> {
    let client = reqwest::Client::new();
    let url = format!("{}/api/profile", gateway_url.trim_end_matches('/'));

    for attempt in 1..=config.attempts {
        if cancel_token.is_cancelled() {
            return Err(PollError::Cancelled);
        }

        let response = client.get(&url).bearer_auth(token).send().await?;

        match response.status() {
            StatusCode::OK => {
                let profile: serde_json::Value = response.json().await?;
                let has_picture = profile
                    .get("pictureUrl")
                    .and_then(|v| v.as_str())
                    .is_some_and(|s| !s.is_empty());

                if has_picture {
                    tracing::info!(
                        target: TRACING_TARGET_POLL,
                        attempt = attempt,
                        "Processed picture available"
                    );
                    return Ok(profile);
                }

                tracing::debug!(
                    target: TRACING_TARGET_POLL,
                    attempt = attempt,
                    "Profile exists but picture is not ready yet"
                );
            }
            StatusCode::NOT_FOUND => {
                tracing::debug!(
                    target: TRACING_TARGET_POLL,
                    attempt = attempt,
                    max_attempts = config.attempts,
                    "Profile not available yet"
                );
            }
            StatusCode::FORBIDDEN => return Err(PollError::Forbidden),
            other => return Err(PollError::UnexpectedStatus(other.as_u16())),
        }

        if attempt < config.attempts {
            tokio::select! {
                () = cancel_token.cancelled() => return Err(PollError::Cancelled),
                () = tokio::time::sleep(config.interval) => {}
            }
        }
    }

    Err(PollError::TimedOut {
        attempts: config.attempts,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use axum::Json;
    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::routing::get;

    use super::*;

    /// Serves a profile endpoint that 404s for `ready_after` requests,
    /// then returns a record with a picture URL.
    async fn spawn_gateway(ready_after: u32) -> String {
        let hits = Arc::new(AtomicU32::new(0));

        let app = axum::Router::new()
            .route(
                "/api/profile",
                get(move |State(hits): State<Arc<AtomicU32>>| async move {
                    let hit = hits.fetch_add(1, Ordering::SeqCst) + 1;
                    if hit <= ready_after {
                        StatusCode::NOT_FOUND.into_response()
                    } else {
                        Json(serde_json::json!({
                            "userId": "user-1",
                            "pictureUrl": "https://cdn.example/avatars/processed-a.jpg",
                        }))
                        .into_response()
                    }
                }),
            )
            .with_state(hits);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{}", addr)
    }

    fn quick_config(attempts: u32) -> PollConfig {
        PollConfig {
            attempts,
            interval: Duration::from_millis(20),
        }
    }

    #[tokio::test]
    async fn returns_profile_once_picture_appears() {
        let url = spawn_gateway(2).await;
        let cancel_token = CancellationToken::new();

        let profile = wait_for_profile(&url, "token", &quick_config(5), &cancel_token)
            .await
            .unwrap();

        assert_eq!(
            profile.get("pictureUrl").and_then(|v| v.as_str()),
            Some("https://cdn.example/avatars/processed-a.jpg")
        );
    }

    #[tokio::test]
    async fn times_out_after_bounded_attempts() {
        let url = spawn_gateway(100).await;
        let cancel_token = CancellationToken::new();

        let err = wait_for_profile(&url, "token", &quick_config(3), &cancel_token)
            .await
            .unwrap_err();

        assert!(matches!(err, PollError::TimedOut { attempts: 3 }));
    }

    #[tokio::test]
    async fn cancellation_stops_polling_early() {
        let url = spawn_gateway(100).await;
        let cancel_token = CancellationToken::new();
        cancel_token.cancel();

        let err = wait_for_profile(&url, "token", &quick_config(10), &cancel_token)
            .await
            .unwrap_err();

        assert!(matches!(err, PollError::Cancelled));
    }
}
