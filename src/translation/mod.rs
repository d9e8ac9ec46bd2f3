/*!
 * Translation pipeline for game-content documents.
 *
 * This module contains the core of the orchestration pipeline, split into
 * several submodules:
 *
 * - `protect`: Token protection and XML transport encoding
 * - `units`: Imperial-to-metric unit conversion
 * - `glossary`: Terminology normalization rules
 * - `cache`: Persistent translation cache
 * - `budget`: Depletable character budget ledger
 * - `client`: Retry-with-backoff adapter over a backend
 * - `fields`: Per-key field classification
 * - `walker`: Recursive document translation
 * - `checkpoint`: Incremental cache/state persistence
 */

// Re-export main types for easier usage
pub use self::budget::BudgetLedger;
pub use self::cache::{CacheKey, TranslationCache};
pub use self::checkpoint::{CheckpointManager, RunState};
pub use self::client::{BackoffSchedule, RetryingClient};
pub use self::fields::FieldClass;
pub use self::glossary::{Glossary, GlossaryRule};
pub use self::protect::{ProtectedText, protect};
pub use self::units::PrecisionMode;
pub use self::walker::{TranslationParams, TreeTranslator};

// Submodules
pub mod budget;
pub mod cache;
pub mod checkpoint;
pub mod client;
pub mod fields;
pub mod glossary;
pub mod protect;
pub mod units;
pub mod walker;
