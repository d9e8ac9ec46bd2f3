/*!
 * Error types for the statloc application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

// Allow dead code - error types are for library consumers
#![allow(dead_code)]

use thiserror::Error;

/// Errors that can occur when talking to the translation backend
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

/// Errors that can occur while translating a document tree
#[derive(Error, Debug)]
pub enum TranslationError {
    /// The next external call would overdraw the character budget.
    ///
    /// Recoverable at the run level: the driver persists cache and state and
    /// stops cleanly without writing a partial output file.
    #[error("budget would be exceeded by next text ({needed} chars needed, {remaining} left)")]
    BudgetExceeded {
        /// Estimated character cost of the text that could not be afforded
        needed: u64,
        /// Characters still spendable when the reservation was refused
        remaining: u64,
    },

    /// All retry attempts against the backend failed
    #[error("translation failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        /// Number of attempts made before giving up
        attempts: usize,
        /// The error returned by the final attempt
        #[source]
        source: ProviderError,
    },

    /// The backend returned fewer placeholders than were sent.
    ///
    /// Restoring must reproduce every protected token; a lost marker means
    /// the output would silently drop mechanics text, so this is fatal for
    /// the current document.
    #[error("placeholder count mismatch after translation: sent {sent}, got back {restored}")]
    MarkerMismatch {
        /// Placeholders emitted during protection
        sent: usize,
        /// Placeholders found in the translated text
        restored: usize,
    },

    /// The backend returned a placeholder id that was never sent
    #[error("translated text references unknown placeholder id {id}")]
    UnknownMarker {
        /// The placeholder id text as it appeared in the reply
        id: String,
    },

    /// Cache or run-state could not be persisted
    #[error("failed to persist cache or state: {0}")]
    Persist(String),

    /// Error from the provider that is not retryable in context
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// The translation backend credential is absent from the environment
    #[error("missing DEEPL_AUTH_KEY environment variable")]
    MissingCredential,

    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error in the configuration surface
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from the provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
