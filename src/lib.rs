/*!
 * # statloc - Stat-block Localization
 *
 * A Rust library for translating game-content JSON records into another
 * language through a quota-billed translation service.
 *
 * ## Features
 *
 * - Selective tree traversal: per-field decisions to translate, map
 *   locally, convert units, or pass through
 * - Protection of game-mechanics tokens (dice, DCs, modifiers, fractions,
 *   unit measures) across the external call
 * - Imperial-to-metric unit conversion with game-friendly or exact ratios
 * - Glossary normalization for consistent terminology
 * - Persistent translation cache so quota is never spent twice
 * - Depletable character budget with a clean stop before exhaustion
 * - Retry with exponential backoff on transient backend failures
 * - Incremental checkpointing for exact resumption across restarts
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `translation`: The orchestration pipeline:
 *   - `translation::protect`: Token protection and transport encoding
 *   - `translation::units`: Unit conversion
 *   - `translation::glossary`: Terminology rules
 *   - `translation::cache`: Persistent translation cache
 *   - `translation::budget`: Character budget ledger
 *   - `translation::client`: Retrying client adapter
 *   - `translation::walker`: Recursive document translation
 *   - `translation::checkpoint`: Cache/state persistence
 * - `file_utils`: File system operations
 * - `app_controller`: Run driver
 * - `providers`: Translation backend clients:
 *   - `providers::deepl`: DeepL API client
 *   - `providers::mock`: Mock backend for testing
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod providers;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, RunSummary};
pub use errors::{AppError, ProviderError, TranslationError};
pub use providers::TranslationBackend;
pub use translation::{
    BudgetLedger, Glossary, PrecisionMode, TranslationCache, TreeTranslator,
};
