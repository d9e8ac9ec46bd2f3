use std::time::Duration;

use async_trait::async_trait;
use log::error;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;
use crate::providers::{TranslationBackend, TranslationOutput, UsageInfo};

const FREE_API_ENDPOINT: &str = "https://api-free.deepl.com";
const PRO_API_ENDPOINT: &str = "https://api.deepl.com";

/// DeepL client for interacting with the DeepL REST API
pub struct DeepL {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    auth_key: String,
    /// API endpoint URL
    endpoint: String,
}

/// DeepL translate request
#[derive(Debug, Serialize)]
struct DeepLRequest<'a> {
    /// Texts to translate (we always send exactly one)
    text: Vec<&'a str>,

    /// Target language code
    target_lang: &'a str,

    /// Treat input as XML so placeholder elements survive untouched
    tag_handling: &'a str,

    /// Keep whitespace and punctuation as-is
    preserve_formatting: bool,

    /// Only split sentences on newlines
    split_sentences: &'a str,

    /// Ask the service to report the billed character count
    show_billed_characters: bool,
}

/// DeepL translate response
#[derive(Debug, Deserialize)]
struct DeepLResponse {
    translations: Vec<DeepLTranslation>,
}

/// One translated text in a DeepL response
#[derive(Debug, Deserialize)]
struct DeepLTranslation {
    text: String,
    billed_characters: Option<u64>,
}

/// DeepL usage response
#[derive(Debug, Deserialize)]
struct DeepLUsage {
    character_count: u64,
    character_limit: u64,
}

impl DeepL {
    /// Create a new DeepL client.
    ///
    /// Free-tier keys (suffix `:fx`) are routed to the free API host,
    /// everything else to the pro host.
    pub fn new(auth_key: impl Into<String>) -> Self {
        let auth_key = auth_key.into();
        let endpoint = if auth_key.ends_with(":fx") {
            FREE_API_ENDPOINT.to_string()
        } else {
            PRO_API_ENDPOINT.to_string()
        };
        Self::with_endpoint(auth_key, endpoint)
    }

    /// Create a client against a specific endpoint (used by tests).
    pub fn with_endpoint(auth_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .unwrap_or_default(),
            auth_key: auth_key.into(),
            endpoint: endpoint.into(),
        }
    }

    /// The API host this client talks to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint.trim_end_matches('/'), path)
    }

    fn auth_header(&self) -> String {
        format!("DeepL-Auth-Key {}", self.auth_key)
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to get error response text".to_string());
        error!("DeepL API error ({}): {}", status, message);

        match status.as_u16() {
            401 | 403 => Err(ProviderError::AuthenticationError(message)),
            429 => Err(ProviderError::RateLimitExceeded(message)),
            // 456 is DeepL's quota-exceeded status
            456 => Err(ProviderError::RateLimitExceeded(format!(
                "character quota exceeded: {}",
                message
            ))),
            code => Err(ProviderError::ApiError {
                status_code: code,
                message,
            }),
        }
    }
}

#[async_trait]
impl TranslationBackend for DeepL {
    async fn translate(
        &self,
        text: &str,
        target_language: &str,
    ) -> Result<TranslationOutput, ProviderError> {
        let request = DeepLRequest {
            text: vec![text],
            target_lang: target_language,
            tag_handling: "xml",
            preserve_formatting: true,
            split_sentences: "nonewlines",
            show_billed_characters: true,
        };

        let response = self
            .client
            .post(self.api_url("/v2/translate"))
            .header("Authorization", self.auth_header())
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::ConnectionError(e.to_string()))?;

        let response = Self::check_status(response).await?;
        let parsed = response
            .json::<DeepLResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        let translation = parsed
            .translations
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::ParseError("empty translations array".to_string()))?;

        Ok(TranslationOutput {
            text: translation.text,
            billed_characters: translation.billed_characters,
        })
    }

    async fn usage(&self) -> Result<UsageInfo, ProviderError> {
        let response = self
            .client
            .get(self.api_url("/v2/usage"))
            .header("Authorization", self.auth_header())
            .send()
            .await
            .map_err(|e| ProviderError::ConnectionError(e.to_string()))?;

        let response = Self::check_status(response).await?;
        let usage = response
            .json::<DeepLUsage>()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        Ok(UsageInfo {
            character_count: usage.character_count,
            character_limit: usage.character_limit,
        })
    }
}
