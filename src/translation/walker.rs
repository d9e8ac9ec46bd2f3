/*!
 * Recursive document translation.
 *
 * Walks an arbitrary JSON document tree and decides per field whether to
 * translate externally, map locally, localize units, or pass through. The
 * traversal is strictly sequential so the budget check-then-debit sequence
 * can never race.
 */

use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::Value;

use super::budget::BudgetLedger;
use super::cache::{CacheKey, TranslationCache};
use super::checkpoint::CheckpointManager;
use super::client::RetryingClient;
use super::fields::{FieldClass, classify, local_enum_value};
use super::glossary::Glossary;
use super::protect::protect;
use super::units::{self, PrecisionMode};
use crate::errors::TranslationError;
use crate::providers::TranslationBackend;

/// Per-run knobs the walker needs for every string decision.
#[derive(Debug, Clone)]
pub struct TranslationParams {
    /// Target language code (e.g. "DE")
    pub target_language: String,

    /// Whether `name` fields are sent for translation
    pub translate_names: bool,

    /// Unit-conversion ratio selection
    pub precision: PrecisionMode,
}

/// Recursive visitor that rewrites one document tree.
///
/// Holds the shared run components by reference; the caller owns them so
/// multiple documents (and tests) can reuse cache, ledger, and checkpoint
/// state across walks.
pub struct TreeTranslator<'a, B: TranslationBackend> {
    client: &'a RetryingClient<'a, B>,
    cache: &'a mut TranslationCache,
    ledger: &'a mut BudgetLedger,
    checkpoint: &'a mut CheckpointManager,
    glossary: &'a Glossary,
    params: &'a TranslationParams,
    localize: bool,
}

impl<'a, B: TranslationBackend> TreeTranslator<'a, B> {
    /// Wire a walker to the run's shared components.
    pub fn new(
        client: &'a RetryingClient<'a, B>,
        cache: &'a mut TranslationCache,
        ledger: &'a mut BudgetLedger,
        checkpoint: &'a mut CheckpointManager,
        glossary: &'a Glossary,
        params: &'a TranslationParams,
    ) -> Self {
        let localize = units::localizes_units(&params.target_language);
        Self {
            client,
            cache,
            ledger,
            checkpoint,
            glossary,
            params,
            localize,
        }
    }

    /// Translate a whole document, producing a new tree.
    pub async fn translate_document(&mut self, doc: &Value) -> Result<Value, TranslationError> {
        self.translate_node(doc, "").await
    }

    /// Translate one node. `key` is the nearest enclosing map key, so list
    /// elements inherit the key of the list they belong to.
    fn translate_node<'b>(
        &'b mut self,
        value: &'b Value,
        key: &'b str,
    ) -> BoxFuture<'b, Result<Value, TranslationError>> {
        async move {
            match value {
                Value::String(text) => {
                    self.translate_string(text, key).await.map(Value::String)
                }
                Value::Array(items) => {
                    let mut out = Vec::with_capacity(items.len());
                    for item in items {
                        out.push(self.translate_node(item, key).await?);
                    }
                    Ok(Value::Array(out))
                }
                Value::Object(map) => {
                    let mut out = serde_json::Map::new();
                    for (k, v) in map {
                        out.insert(k.clone(), self.translate_node(v, k).await?);
                    }
                    Ok(Value::Object(out))
                }
                other => Ok(other.clone()),
            }
        }
        .boxed()
    }

    async fn translate_string(&mut self, text: &str, key: &str) -> Result<String, TranslationError> {
        match classify(key, self.params.translate_names) {
            FieldClass::LocalEnum => {
                if let Some(mapped) = local_enum_value(key, text) {
                    return Ok(mapped);
                }
                // Outside the closed vocabulary: treat like any other
                // non-translated string
                Ok(self.localize_only(text))
            }
            FieldClass::Translate => self.translate_external(text, key).await,
            // Identifiers and canonical mechanics stay byte-identical
            FieldClass::Never | FieldClass::Canonical => Ok(text.to_string()),
            FieldClass::PassThrough => Ok(self.localize_only(text)),
        }
    }

    /// Unit conversion and glossary for strings that never leave the process.
    fn localize_only(&self, text: &str) -> String {
        if !self.localize {
            return text.to_string();
        }
        let converted = units::convert(text, self.params.precision);
        self.glossary.apply(&converted)
    }

    async fn translate_external(&mut self, text: &str, key: &str) -> Result<String, TranslationError> {
        let source = text.trim();
        if source.is_empty() {
            return Ok(text.to_string());
        }

        let cache_key = CacheKey {
            target_language: &self.params.target_language,
            field_key: key,
            source,
            precision: self.params.precision,
            glossary_fingerprint: self.glossary.fingerprint(),
        };
        if let Some(cached) = self.cache.get(&cache_key) {
            return Ok(cached);
        }

        let estimate = source.chars().count() as u64;
        if !self.ledger.reserve(estimate) {
            return Err(TranslationError::BudgetExceeded {
                needed: estimate,
                remaining: self.ledger.remaining(),
            });
        }

        let protected = protect(source);
        let transport = protected.to_transport();

        let output = match self
            .client
            .translate(&transport, &self.params.target_language)
            .await
        {
            Ok(output) => output,
            Err(err) => {
                // The call never billed anything
                self.ledger.release(estimate);
                return Err(err);
            }
        };

        let billed = output
            .billed_characters
            .unwrap_or_else(|| transport.chars().count() as u64);
        self.ledger.settle(estimate, billed);

        let restored = protected.restore_transport(&output.text)?;
        let finished = if self.localize {
            let converted = units::convert(&restored, self.params.precision);
            self.glossary.apply(&converted)
        } else {
            restored
        };

        self.cache.insert(&cache_key, &finished);
        self.checkpoint
            .record_translation(&*self.cache)
            .map_err(|e| TranslationError::Persist(e.to_string()))?;

        Ok(finished)
    }
}
