/*!
 * Translation backend clients.
 *
 * This module defines the trait every backend implements plus the concrete
 * clients:
 * - `providers::deepl`: DeepL REST API client
 * - `providers::mock`: Mock backend for testing
 */

use async_trait::async_trait;

use crate::errors::ProviderError;

pub mod deepl;
pub mod mock;

pub use deepl::DeepL;
pub use mock::{MockBackend, MockBehavior};

/// Result of one translation call.
#[derive(Debug, Clone)]
pub struct TranslationOutput {
    /// Translated text, still in transport (XML) form
    pub text: String,

    /// Characters billed by the service, when it reports them
    pub billed_characters: Option<u64>,
}

/// Account quota usage as reported by the service.
#[derive(Debug, Clone, Copy)]
pub struct UsageInfo {
    /// Characters consumed in the current billing period
    pub character_count: u64,

    /// Character allowance for the billing period
    pub character_limit: u64,
}

/// A translation service reachable over the network.
///
/// Calls may fail transiently; retry policy lives in the client adapter,
/// not in implementations of this trait.
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    /// Translate one transport-encoded text into the target language.
    async fn translate(
        &self,
        text: &str,
        target_language: &str,
    ) -> Result<TranslationOutput, ProviderError>;

    /// Query current quota usage for the account.
    async fn usage(&self) -> Result<UsageInfo, ProviderError>;
}
