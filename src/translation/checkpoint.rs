/*!
 * Incremental checkpointing of cache and run state.
 *
 * Persists the translation cache and run bookkeeping after every N external
 * translations and after each completed document, so a restart loses at most
 * (save-interval - 1) already-billed translations to cache misses.
 */

use std::path::{Path, PathBuf};

use anyhow::Result;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::cache::TranslationCache;
use crate::file_utils::FileManager;

/// Persisted run bookkeeping: observability and resume state, not needed for
/// cache correctness.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunState {
    /// External translations performed across all runs
    #[serde(default)]
    pub translated_count: u64,

    /// Filenames whose output documents were fully written
    #[serde(default)]
    pub completed_files: Vec<String>,
}

/// Flushes cache and run state at a configurable cadence.
pub struct CheckpointManager {
    state: RunState,
    state_path: PathBuf,
    save_every: u64,
}

impl CheckpointManager {
    /// Load run state from `state_path`, defaulting to empty when the file
    /// is absent or unparseable.
    pub fn load<P: AsRef<Path>>(state_path: P, save_every: u64) -> Self {
        let state_path = state_path.as_ref().to_path_buf();
        let state = if FileManager::file_exists(&state_path) {
            match FileManager::read_json::<RunState, _>(&state_path) {
                Ok(state) => state,
                Err(err) => {
                    warn!("Ignoring corrupt state file {:?}: {}", state_path, err);
                    RunState::default()
                }
            }
        } else {
            RunState::default()
        };

        Self {
            state,
            state_path,
            save_every: save_every.max(1),
        }
    }

    /// Current run state.
    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Record one completed external translation, flushing cache and state
    /// when the save interval is reached.
    pub fn record_translation(&mut self, cache: &TranslationCache) -> Result<()> {
        self.state.translated_count += 1;
        if self.state.translated_count % self.save_every == 0 {
            debug!(
                "Checkpoint at {} translations ({} cache entries)",
                self.state.translated_count,
                cache.len()
            );
            cache.flush()?;
            self.flush()?;
        }
        Ok(())
    }

    /// Record a fully written output document and flush both files.
    pub fn mark_completed(&mut self, filename: &str, cache: &TranslationCache) -> Result<()> {
        if !self.state.completed_files.iter().any(|f| f == filename) {
            self.state.completed_files.push(filename.to_string());
            self.state.completed_files.sort();
        }
        cache.flush()?;
        self.flush()
    }

    /// Persist run state atomically.
    pub fn flush(&self) -> Result<()> {
        FileManager::write_json_atomic(&self.state_path, &self.state)
    }
}
