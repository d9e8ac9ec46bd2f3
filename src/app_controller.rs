use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use serde::Serialize;

use crate::app_config::Config;
use crate::errors::{AppError, TranslationError};
use crate::file_utils::FileManager;
use crate::providers::{DeepL, TranslationBackend};
use crate::translation::{
    BudgetLedger, CheckpointManager, Glossary, RetryingClient, TranslationCache,
    TranslationParams, TreeTranslator,
};

// @module: Run driver for document translation

/// Environment variable holding the DeepL credential
const AUTH_KEY_VAR: &str = "DEEPL_AUTH_KEY";

/// Output index document: `{"files": [...]}`
#[derive(Debug, Serialize)]
struct OutputIndex<'a> {
    files: &'a [String],
}

/// What one run accomplished.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Filenames listed in the output index (skipped and newly written)
    pub output_files: Vec<String>,

    /// Documents translated and written by this run
    pub documents_written: usize,

    /// Documents skipped because their output already existed
    pub documents_skipped: usize,

    /// Characters still spendable when the run ended
    pub budget_remaining: u64,

    /// Whether the run stopped early to avoid overdrawing the quota
    pub budget_stopped: bool,
}

/// Main application controller: iterates documents, drives the tree
/// translator, and owns run-level failure handling.
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Run against the real DeepL backend.
    ///
    /// The credential is read from the environment before any filesystem
    /// side effect; its absence is a fatal startup error.
    pub async fn run(&self) -> Result<RunSummary> {
        let auth_key =
            std::env::var(AUTH_KEY_VAR).map_err(|_| AppError::MissingCredential)?;
        let backend = DeepL::new(auth_key);
        self.run_with_backend(&backend).await
    }

    /// Run the full pipeline against any backend.
    pub async fn run_with_backend<B: TranslationBackend>(
        &self,
        backend: &B,
    ) -> Result<RunSummary> {
        let usage = backend.usage().await?;
        let mut ledger = BudgetLedger::from_usage(
            usage.character_limit,
            usage.character_count,
            self.config.safety_margin,
        );
        if ledger.remaining() == 0 {
            warn!(
                "Stop: remaining budget is 0 (used {} / limit {}, margin {})",
                usage.character_count, usage.character_limit, self.config.safety_margin
            );
            return Ok(RunSummary {
                output_files: Vec::new(),
                documents_written: 0,
                documents_skipped: 0,
                budget_remaining: 0,
                budget_stopped: true,
            });
        }
        info!(
            "Budget for this run: ~{} chars (used {} / limit {}, margin {})",
            ledger.remaining(),
            usage.character_count,
            usage.character_limit,
            self.config.safety_margin
        );

        FileManager::ensure_dir(&self.config.output_dir)?;
        let mut cache = TranslationCache::load(&self.config.cache_path);
        let mut checkpoint =
            CheckpointManager::load(&self.config.state_path, self.config.save_every);
        let glossary = Glossary::load(&self.config.glossary_path);
        let client = RetryingClient::new(backend);
        let params = TranslationParams {
            target_language: self.config.target_language.clone(),
            translate_names: self.config.translate_names,
            precision: self.config.precision,
        };

        let files = FileManager::list_documents(&self.config.input_dir)?;
        let progress = ProgressBar::new(files.len() as u64);
        if let Ok(style) =
            ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
        {
            progress.set_style(style);
        }

        let mut output_files: Vec<String> = Vec::new();
        let mut documents_written = 0usize;
        let mut documents_skipped = 0usize;
        let mut budget_stopped = false;

        for filename in &files {
            let in_path = self.config.input_dir.join(filename);
            let out_path = self.config.output_dir.join(filename);
            progress.set_message(filename.clone());

            if !self.config.overwrite && FileManager::file_exists(&out_path) {
                output_files.push(filename.clone());
                documents_skipped += 1;
                progress.inc(1);
                continue;
            }

            let doc: serde_json::Value = FileManager::read_json(&in_path)
                .with_context(|| format!("Failed to load document {:?}", in_path))?;

            let mut walker = TreeTranslator::new(
                &client,
                &mut cache,
                &mut ledger,
                &mut checkpoint,
                &glossary,
                &params,
            );

            match walker.translate_document(&doc).await {
                Ok(translated) => {
                    FileManager::write_json_atomic(&out_path, &translated)?;
                    output_files.push(filename.clone());
                    documents_written += 1;
                    checkpoint.mark_completed(filename, &cache)?;
                    info!(
                        "Wrote {:?} (budget left ~{} chars)",
                        out_path,
                        ledger.remaining()
                    );
                    progress.inc(1);
                }
                Err(TranslationError::BudgetExceeded { needed, remaining }) => {
                    cache.flush()?;
                    checkpoint.flush()?;
                    warn!(
                        "Stopped before quota: next text needs {} chars, only {} left",
                        needed, remaining
                    );
                    budget_stopped = true;
                    break;
                }
                Err(err) => {
                    // Preserve everything billed so far before bailing out;
                    // the in-flight document gets no output file.
                    cache.flush()?;
                    checkpoint.flush()?;
                    progress.finish_and_clear();
                    return Err(err.into());
                }
            }
        }
        progress.finish_and_clear();

        FileManager::write_json_atomic(
            self.config.output_dir.join("index.json"),
            &OutputIndex {
                files: &output_files,
            },
        )?;
        cache.flush()?;
        checkpoint.flush()?;

        let (hits, misses) = cache.stats();
        info!(
            "Done. Output files: {} ({} written, {} skipped). Cache: {} hits / {} misses. Budget left ~{} chars.",
            output_files.len(),
            documents_written,
            documents_skipped,
            hits,
            misses,
            ledger.remaining()
        );

        Ok(RunSummary {
            output_files,
            documents_written,
            documents_skipped,
            budget_remaining: ledger.remaining(),
            budget_stopped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::MockBackend;
    use serde_json::{Value, json};
    use tempfile::{TempDir, tempdir};

    struct RunDirs {
        _root: TempDir,
        config: Config,
    }

    fn setup(docs: &[(&str, Value)]) -> RunDirs {
        let root = tempdir().unwrap();
        let input_dir = root.path().join("monsters");
        let output_dir = root.path().join("monsters_de");
        std::fs::create_dir_all(&input_dir).unwrap();
        for (name, doc) in docs {
            FileManager::write_json_atomic(input_dir.join(name), doc).unwrap();
        }

        let mut config = Config::new(input_dir, output_dir);
        config.cache_path = root.path().join("cache.json");
        config.state_path = root.path().join("state.json");
        config.glossary_path = root.path().join("glossary.json");
        RunDirs { _root: root, config }
    }

    #[tokio::test]
    async fn test_run_shouldWriteOutputsAndIndex() {
        let dirs = setup(&[
            (
                "owlbear.json",
                json!({"name": "Owlbear", "hp": {"average": 13, "formula": "3d8"}}),
            ),
            ("zombie.json", json!({"name": "Zombie"})),
        ]);
        let backend = MockBackend::marking();
        let controller = Controller::with_config(dirs.config.clone()).unwrap();

        let summary = controller.run_with_backend(&backend).await.unwrap();

        assert_eq!(summary.documents_written, 2);
        assert!(!summary.budget_stopped);
        assert_eq!(
            summary.output_files,
            vec!["owlbear.json".to_string(), "zombie.json".to_string()]
        );

        let owlbear: Value =
            FileManager::read_json(dirs.config.output_dir.join("owlbear.json")).unwrap();
        assert_eq!(owlbear["name"], "[DE] Owlbear");
        assert_eq!(owlbear["hp"]["formula"], "3d8");

        let index: Value =
            FileManager::read_json(dirs.config.output_dir.join("index.json")).unwrap();
        assert_eq!(index["files"], json!(["owlbear.json", "zombie.json"]));
    }

    #[tokio::test]
    async fn test_run_shouldSkipExistingOutputsUnlessOverwrite() {
        let dirs = setup(&[("owlbear.json", json!({"name": "Owlbear"}))]);
        std::fs::create_dir_all(&dirs.config.output_dir).unwrap();
        FileManager::write_json_atomic(
            dirs.config.output_dir.join("owlbear.json"),
            &json!({"name": "Eulenbär"}),
        )
        .unwrap();

        let backend = MockBackend::marking();
        let controller = Controller::with_config(dirs.config.clone()).unwrap();
        let summary = controller.run_with_backend(&backend).await.unwrap();

        assert_eq!(summary.documents_skipped, 1);
        assert_eq!(summary.documents_written, 0);
        assert_eq!(backend.call_count(), 0);
        // The existing translation is untouched but still indexed
        let existing: Value =
            FileManager::read_json(dirs.config.output_dir.join("owlbear.json")).unwrap();
        assert_eq!(existing["name"], "Eulenbär");
        assert_eq!(summary.output_files, vec!["owlbear.json".to_string()]);
    }

    #[tokio::test]
    async fn test_run_shouldBeIdempotentWithOverwriteDisabled() {
        let dirs = setup(&[(
            "owlbear.json",
            json!({"name": "Owlbear", "text": "Reach 5 ft., one target."}),
        )]);
        let backend = MockBackend::echo();
        let controller = Controller::with_config(dirs.config.clone()).unwrap();

        controller.run_with_backend(&backend).await.unwrap();
        let calls_after_first = backend.call_count();
        let first_bytes =
            std::fs::read(dirs.config.output_dir.join("owlbear.json")).unwrap();

        let summary = controller.run_with_backend(&backend).await.unwrap();
        let second_bytes =
            std::fs::read(dirs.config.output_dir.join("owlbear.json")).unwrap();

        // Second run issues zero external calls and leaves output bytes alone
        assert_eq!(backend.call_count(), calls_after_first);
        assert_eq!(summary.documents_skipped, 1);
        assert_eq!(first_bytes, second_bytes);
    }

    #[tokio::test]
    async fn test_run_shouldStopCleanlyOnBudgetExhaustion() {
        let dirs = setup(&[
            ("a.json", json!({"text": "Tiny text."})),
            (
                "b.json",
                json!({"text": "This description is much too long for the leftover budget to cover."}),
            ),
        ]);
        // Enough for the first document only
        let backend = MockBackend::marking().with_usage(0, 30);
        let mut config = dirs.config.clone();
        config.safety_margin = 0;
        let controller = Controller::with_config(config.clone()).unwrap();

        let summary = controller.run_with_backend(&backend).await.unwrap();

        assert!(summary.budget_stopped);
        assert_eq!(summary.documents_written, 1);
        assert_eq!(summary.output_files, vec!["a.json".to_string()]);
        // No partial output for the in-flight document
        assert!(!config.output_dir.join("b.json").exists());
        // Cache and state survived the stop
        assert!(config.cache_path.exists());
        assert!(config.state_path.exists());

        let index: Value = FileManager::read_json(config.output_dir.join("index.json")).unwrap();
        assert_eq!(index["files"], json!(["a.json"]));
    }

    #[tokio::test]
    async fn test_run_shouldRefuseWhenQuotaAlreadySpent() {
        let dirs = setup(&[("a.json", json!({"text": "Hello"}))]);
        let backend = MockBackend::marking().with_usage(499_000, 500_000);
        // Default margin (15000) exceeds the 1000 chars left
        let controller = Controller::with_config(dirs.config.clone()).unwrap();

        let summary = controller.run_with_backend(&backend).await.unwrap();

        assert!(summary.budget_stopped);
        assert_eq!(summary.documents_written, 0);
        assert_eq!(backend.call_count(), 0);
        assert!(!dirs.config.output_dir.join("a.json").exists());
    }

    #[tokio::test]
    async fn test_run_shouldPersistStateAcrossRuns() {
        let dirs = setup(&[("a.json", json!({"text": "Hello"}))]);
        let backend = MockBackend::marking();
        let controller = Controller::with_config(dirs.config.clone()).unwrap();

        controller.run_with_backend(&backend).await.unwrap();

        let state: serde_json::Value =
            FileManager::read_json(&dirs.config.state_path).unwrap();
        assert_eq!(state["translated_count"], 1);
        assert_eq!(state["completed_files"], json!(["a.json"]));
    }

    #[tokio::test]
    async fn test_run_shouldAbortRunOnUnrecoverableFailure() {
        let dirs = setup(&[("a.json", json!({"text": "deals 3d8 damage"}))]);
        let backend = MockBackend::dropping_placeholders();
        let controller = Controller::with_config(dirs.config.clone()).unwrap();

        let result = controller.run_with_backend(&backend).await;

        assert!(result.is_err());
        assert!(!dirs.config.output_dir.join("a.json").exists());
        // Cache was still flushed for whatever completed before the failure
        assert!(dirs.config.cache_path.exists());
    }
}
