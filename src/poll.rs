// Status polling: ask the server for a job snapshot at a fixed interval
// until the job reaches a terminal status or the attempt budget runs out.
// Failed polls are counted against the budget and retried.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use uuid::Uuid;

use crate::api::RetrievalStatus;
use crate::error::ApiError;

/// Interval and attempt budget for [`poll_until_done`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(2000),
            max_attempts: 60,
        }
    }
}

/// Something that can report the current state of a job.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch_status(&self, request_id: Uuid) -> Result<RetrievalStatus, ApiError>;
}

/// Suspends the polling loop between attempts.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Production sleeper backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Progress notifications emitted once per attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum PollEvent {
    Attempt {
        attempt: u32,
        max_attempts: u32,
        status: RetrievalStatus,
    },
    AttemptFailed {
        attempt: u32,
        max_attempts: u32,
        error: ApiError,
    },
}

/// How a polling run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// The job finished and its content (if any) is ready.
    Complete(RetrievalStatus),
    /// The job ended as failed or canceled; `error` carries the reason.
    Terminal(RetrievalStatus),
    /// No terminal status was seen within the attempt budget.
    TimedOut { attempts: u32 },
}

/// Poll `source` for `request_id` until a terminal status or until
/// `config.max_attempts` attempts have been made.
///
/// The sleeper runs after every non-terminal attempt except the last, so
/// the loop never waits once the budget is spent.
pub async fn poll_until_done<S, Z, F>(
    source: &S,
    sleeper: &Z,
    request_id: Uuid,
    config: &PollConfig,
    mut on_event: F,
) -> PollOutcome
where
    S: StatusSource + ?Sized,
    Z: Sleeper + ?Sized,
    F: FnMut(&PollEvent),
{
    let max_attempts = config.max_attempts;
    for attempt in 1..=max_attempts {
        match source.fetch_status(request_id).await {
            Ok(status) => {
                debug!("poll {attempt}/{max_attempts} for {request_id}: {}", status.status);
                on_event(&PollEvent::Attempt {
                    attempt,
                    max_attempts,
                    status: status.clone(),
                });
                if status.status.is_success() {
                    info!("request {request_id} complete after {attempt} attempt(s)");
                    return PollOutcome::Complete(status);
                }
                if status.status.is_terminal() {
                    warn!(
                        "request {request_id} ended as {}: {}",
                        status.status,
                        status.error.as_deref().unwrap_or("no error given")
                    );
                    return PollOutcome::Terminal(status);
                }
            }
            Err(error) => {
                warn!("poll {attempt}/{max_attempts} for {request_id} failed: {error}");
                on_event(&PollEvent::AttemptFailed {
                    attempt,
                    max_attempts,
                    error,
                });
            }
        }

        if attempt < max_attempts {
            sleeper.sleep(config.interval).await;
        }
    }

    warn!("request {request_id}: no terminal status after {max_attempts} attempts");
    PollOutcome::TimedOut {
        attempts: max_attempts,
    }
}
