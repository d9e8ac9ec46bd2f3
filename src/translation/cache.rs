/*!
 * Persistent translation cache.
 *
 * A pure memoization layer over the external translation service: identical
 * composite keys always yield the same stored output, and no entry is ever
 * invalidated except by a change to one of the key components. The cache is
 * loaded at startup (tolerating an absent or corrupt file) and flushed
 * atomically by the checkpoint manager and the run driver.
 */

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use log::{debug, warn};

use super::units::PrecisionMode;
use crate::file_utils::FileManager;

/// Composite cache key: every parameter that affects the final output.
#[derive(Debug, Clone)]
pub struct CacheKey<'a> {
    /// Target language code
    pub target_language: &'a str,

    /// Key of the field the text sits under
    pub field_key: &'a str,

    /// Trimmed source text
    pub source: &'a str,

    /// Unit-precision mode in effect
    pub precision: PrecisionMode,

    /// Fingerprint of the active glossary rule set
    pub glossary_fingerprint: &'a str,
}

impl CacheKey<'_> {
    /// Render the composite key as the string stored in the cache file.
    pub fn composite(&self) -> String {
        format!(
            "{}::{}::{}::{}::{}",
            self.target_language,
            self.field_key,
            self.source,
            self.precision.cache_tag(),
            self.glossary_fingerprint
        )
    }
}

/// Persistent key → translated-text store.
pub struct TranslationCache {
    entries: HashMap<String, String>,
    path: PathBuf,
    hits: usize,
    misses: usize,
}

impl TranslationCache {
    /// Load the cache from `path`, defaulting to empty when the file is
    /// absent or unparseable (availability over strict resume fidelity).
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = if FileManager::file_exists(&path) {
            match FileManager::read_json::<HashMap<String, String>, _>(&path) {
                Ok(entries) => entries,
                Err(err) => {
                    warn!("Ignoring corrupt cache file {:?}: {}", path, err);
                    HashMap::new()
                }
            }
        } else {
            HashMap::new()
        };

        debug!("Loaded translation cache with {} entries", entries.len());
        Self {
            entries,
            path,
            hits: 0,
            misses: 0,
        }
    }

    /// Look up a translation by its composite key.
    pub fn get(&mut self, key: &CacheKey<'_>) -> Option<String> {
        let composite = key.composite();
        match self.entries.get(&composite) {
            Some(text) => {
                self.hits += 1;
                debug!("Cache hit for field '{}'", key.field_key);
                Some(text.clone())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Store the final processed text for a composite key.
    pub fn insert(&mut self, key: &CacheKey<'_>, text: &str) {
        self.entries.insert(key.composite(), text.to_string());
    }

    /// Persist all entries to the cache file atomically.
    pub fn flush(&self) -> Result<()> {
        FileManager::write_json_atomic(&self.path, &self.entries)
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// (hits, misses) counters for this process lifetime.
    pub fn stats(&self) -> (usize, usize) {
        (self.hits, self.misses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn key<'a>(source: &'a str, fingerprint: &'a str) -> CacheKey<'a> {
        CacheKey {
            target_language: "DE",
            field_key: "text",
            source,
            precision: PrecisionMode::GameFriendly,
            glossary_fingerprint: fingerprint,
        }
    }

    #[test]
    fn test_insertAndGet_shouldRoundTrip() {
        let dir = tempdir().unwrap();
        let mut cache = TranslationCache::load(dir.path().join("cache.json"));

        let k = key("Hello", "fp");
        assert!(cache.get(&k).is_none());
        cache.insert(&k, "Hallo");
        assert_eq!(cache.get(&k).as_deref(), Some("Hallo"));
        assert_eq!(cache.stats(), (1, 1));
    }

    #[test]
    fn test_flushAndLoad_shouldPersistEntries() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.json");

        let mut cache = TranslationCache::load(&path);
        cache.insert(&key("Hello", "fp"), "Hallo");
        cache.flush().unwrap();

        let mut reloaded = TranslationCache::load(&path);
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.get(&key("Hello", "fp")).as_deref(), Some("Hallo"));
    }

    #[test]
    fn test_load_shouldTreatCorruptFileAsEmpty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(&path, "{{ definitely not json").unwrap();

        let cache = TranslationCache::load(&path);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_get_shouldMissWhenAnyKeyComponentDiffers() {
        let dir = tempdir().unwrap();
        let mut cache = TranslationCache::load(dir.path().join("cache.json"));
        cache.insert(&key("Hello", "fp"), "Hallo");

        let mut exact = key("Hello", "fp");
        exact.precision = PrecisionMode::Exact;
        assert!(cache.get(&exact).is_none());

        assert!(cache.get(&key("Hello", "other-fp")).is_none());

        let mut other_field = key("Hello", "fp");
        other_field.field_key = "blurb";
        assert!(cache.get(&other_field).is_none());
    }
}
