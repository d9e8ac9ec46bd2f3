/*!
 * Mock backend implementations for testing.
 *
 * This module provides mock backends that simulate different behaviors:
 * - `MockBackend::echo()` - No-op translation, returns the input unchanged
 * - `MockBackend::marking()` - Prefixes translated content so tests can see it
 * - `MockBackend::fail_times(n)` - Fails the first n calls, then succeeds
 * - `MockBackend::failing()` - Always fails with an error
 * - `MockBackend::dropping_placeholders()` - Simulates a backend that mangles markers
 */

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::ProviderError;
use crate::providers::{TranslationBackend, TranslationOutput, UsageInfo};

static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<ph\s+id='\d+'\s*/>").unwrap());

/// Behavior mode for the mock backend
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Returns the input text unchanged (no-op translation stub)
    Echo,
    /// Inserts a visible target-language marker inside the transport wrapper
    Marking,
    /// Fails the first `failures` calls with a 503, then behaves like Echo
    FailTimes {
        /// Number of leading calls that fail
        failures: usize,
    },
    /// Always fails with an error
    Failing,
    /// Strips placeholder elements from the response (marker corruption)
    DroppingPlaceholders,
}

/// Mock backend for testing translation behavior
#[derive(Debug)]
pub struct MockBackend {
    /// Behavior mode
    behavior: MockBehavior,
    /// Total calls made against this backend (shared across clones)
    call_count: Arc<AtomicUsize>,
    /// Usage reported by `usage()`
    usage: UsageInfo,
}

impl MockBackend {
    /// Create a new mock backend with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            call_count: Arc::new(AtomicUsize::new(0)),
            usage: UsageInfo {
                character_count: 0,
                character_limit: 500_000,
            },
        }
    }

    /// Create a no-op backend that echoes its input
    pub fn echo() -> Self {
        Self::new(MockBehavior::Echo)
    }

    /// Create a backend that visibly marks translated content
    pub fn marking() -> Self {
        Self::new(MockBehavior::Marking)
    }

    /// Create a backend that fails the first `failures` calls, then succeeds
    pub fn fail_times(failures: usize) -> Self {
        Self::new(MockBehavior::FailTimes { failures })
    }

    /// Create a backend that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a backend that loses placeholder elements
    pub fn dropping_placeholders() -> Self {
        Self::new(MockBehavior::DroppingPlaceholders)
    }

    /// Override the usage reported by `usage()`
    pub fn with_usage(mut self, character_count: u64, character_limit: u64) -> Self {
        self.usage = UsageInfo {
            character_count,
            character_limit,
        };
        self
    }

    /// Number of translate calls made so far
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

impl Clone for MockBackend {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior,
            call_count: Arc::clone(&self.call_count),
            usage: self.usage,
        }
    }
}

#[async_trait]
impl TranslationBackend for MockBackend {
    async fn translate(
        &self,
        text: &str,
        target_language: &str,
    ) -> Result<TranslationOutput, ProviderError> {
        let count = self.call_count.fetch_add(1, Ordering::SeqCst);
        let billed = Some(text.chars().count() as u64);

        match self.behavior {
            MockBehavior::Echo => Ok(TranslationOutput {
                text: text.to_string(),
                billed_characters: billed,
            }),

            MockBehavior::Marking => {
                // Keep the transport wrapper intact; mark only the content
                let marked = text.replacen("<t>", &format!("<t>[{}] ", target_language), 1);
                Ok(TranslationOutput {
                    text: marked,
                    billed_characters: billed,
                })
            }

            MockBehavior::FailTimes { failures } => {
                if count < failures {
                    Err(ProviderError::ApiError {
                        status_code: 503,
                        message: format!("Simulated transient failure (call #{})", count + 1),
                    })
                } else {
                    Ok(TranslationOutput {
                        text: text.to_string(),
                        billed_characters: billed,
                    })
                }
            }

            MockBehavior::Failing => Err(ProviderError::ApiError {
                status_code: 500,
                message: "Simulated backend failure".to_string(),
            }),

            MockBehavior::DroppingPlaceholders => Ok(TranslationOutput {
                text: PLACEHOLDER_RE.replace_all(text, "").into_owned(),
                billed_characters: billed,
            }),
        }
    }

    async fn usage(&self) -> Result<UsageInfo, ProviderError> {
        Ok(self.usage)
    }
}
