use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use walkdir::WalkDir;

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    /// Read and deserialize a JSON file
    pub fn read_json<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON in: {:?}", path.as_ref()))
    }

    /// Serialize a value and write it to a JSON file atomically.
    ///
    /// The value is written to a temporary file in the same directory and
    /// moved into place with a rename, so a reader can never observe a
    /// partially written file and a crash mid-write cannot truncate an
    /// existing one.
    pub fn write_json_atomic<T: Serialize, P: AsRef<Path>>(path: P, value: &T) -> Result<()> {
        let path = path.as_ref();
        let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
        if let Some(dir) = dir {
            Self::ensure_dir(dir)?;
        }

        let mut tmp = NamedTempFile::new_in(dir.unwrap_or_else(|| Path::new(".")))
            .with_context(|| format!("Failed to create temp file next to: {:?}", path))?;
        let json = serde_json::to_string_pretty(value)?;
        tmp.write_all(json.as_bytes())
            .with_context(|| format!("Failed to write temp file for: {:?}", path))?;
        tmp.write_all(b"\n")?;
        tmp.persist(path)
            .with_context(|| format!("Failed to move temp file into place: {:?}", path))?;
        Ok(())
    }

    /// List the JSON document filenames in a directory.
    ///
    /// Returns bare filenames (not paths) of the top-level `*.json` entries,
    /// excluding `index.json`, sorted case-insensitively so runs iterate in a
    /// stable order.
    pub fn list_documents<P: AsRef<Path>>(dir: P) -> Result<Vec<String>> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).min_depth(1).max_depth(1) {
            let entry = entry.context("Failed to read directory entry")?;
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if name.ends_with(".json") && name != "index.json" {
                result.push(name);
            }
        }

        result.sort_by_key(|name| name.to_lowercase());
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use tempfile::tempdir;

    #[test]
    fn test_writeJsonAtomic_shouldRoundTrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.json");
        let value = json!({"name": "Owlbear", "hp": {"average": 13}});

        FileManager::write_json_atomic(&path, &value).unwrap();
        let read: Value = FileManager::read_json(&path).unwrap();
        assert_eq!(read, value);
    }

    #[test]
    fn test_writeJsonAtomic_shouldReplaceExistingFile() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.json");

        FileManager::write_json_atomic(&path, &json!({"v": 1})).unwrap();
        FileManager::write_json_atomic(&path, &json!({"v": 2})).unwrap();

        let read: Value = FileManager::read_json(&path).unwrap();
        assert_eq!(read, json!({"v": 2}));
    }

    #[test]
    fn test_listDocuments_shouldSortAndExcludeIndex() {
        let dir = tempdir().unwrap();
        for name in ["Zombie.json", "aboleth.json", "index.json", "notes.txt"] {
            std::fs::write(dir.path().join(name), "{}").unwrap();
        }

        let files = FileManager::list_documents(dir.path()).unwrap();
        assert_eq!(files, vec!["aboleth.json".to_string(), "Zombie.json".to_string()]);
    }

    #[test]
    fn test_listDocuments_shouldIgnoreSubdirectories() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested").join("deep.json"), "{}").unwrap();
        std::fs::write(dir.path().join("top.json"), "{}").unwrap();

        let files = FileManager::list_documents(dir.path()).unwrap();
        assert_eq!(files, vec!["top.json".to_string()]);
    }
}
