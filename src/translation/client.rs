/*!
 * Retrying client adapter over a translation backend.
 *
 * Wraps any [`TranslationBackend`] with bounded exponential-backoff retry.
 * Calls are strictly serial: the delay between attempts blocks the whole
 * pipeline, which is what keeps budget accounting exact.
 */

use std::time::Duration;

use log::warn;

use crate::errors::TranslationError;
use crate::providers::{TranslationBackend, TranslationOutput};

/// Default attempt ceiling for one text
pub const DEFAULT_MAX_ATTEMPTS: usize = 5;

/// Default first retry delay
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Default retry delay cap
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(20);

/// Exponential backoff state: the next delay, doubling up to a cap.
///
/// Kept as its own small state machine so the delay growth is testable
/// independently of any network call.
#[derive(Debug, Clone)]
pub struct BackoffSchedule {
    delay: Duration,
    cap: Duration,
}

impl BackoffSchedule {
    /// Create a schedule starting at `base` and capped at `cap`.
    pub fn new(base: Duration, cap: Duration) -> Self {
        Self { delay: base, cap }
    }

    /// Take the next delay and advance the schedule.
    pub fn next_delay(&mut self) -> Duration {
        let current = self.delay;
        self.delay = (self.delay * 2).min(self.cap);
        current
    }
}

impl Default for BackoffSchedule {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_DELAY, DEFAULT_MAX_DELAY)
    }
}

/// Backend wrapper that retries transient failures with backoff.
pub struct RetryingClient<'a, B> {
    backend: &'a B,
    max_attempts: usize,
    base_delay: Duration,
    max_delay: Duration,
}

impl<'a, B: TranslationBackend> RetryingClient<'a, B> {
    /// Wrap a backend with the default retry policy.
    pub fn new(backend: &'a B) -> Self {
        Self {
            backend,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }

    /// Override the retry policy (used by tests).
    pub fn with_policy(
        backend: &'a B,
        max_attempts: usize,
        base_delay: Duration,
        max_delay: Duration,
    ) -> Self {
        Self {
            backend,
            max_attempts,
            base_delay,
            max_delay,
        }
    }

    /// Translate one transport-encoded text, retrying transient failures.
    ///
    /// When the service does not report a billed amount, the character length
    /// of the transmitted text is used as the estimate. Exhausting every
    /// attempt yields [`TranslationError::RetriesExhausted`]; no cache or
    /// state is touched by this adapter.
    pub async fn translate(
        &self,
        text: &str,
        target_language: &str,
    ) -> Result<TranslationOutput, TranslationError> {
        let mut backoff = BackoffSchedule::new(self.base_delay, self.max_delay);
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.backend.translate(text, target_language).await {
                Ok(mut output) => {
                    if output.billed_characters.is_none() {
                        output.billed_characters = Some(text.chars().count() as u64);
                    }
                    return Ok(output);
                }
                Err(err) if attempt < self.max_attempts => {
                    let delay = backoff.next_delay();
                    warn!(
                        "Translation attempt {}/{} failed ({}), retrying in {:?}",
                        attempt, self.max_attempts, err, delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => {
                    return Err(TranslationError::RetriesExhausted {
                        attempts: attempt,
                        source: err,
                    });
                }
            }
        }
    }
}
