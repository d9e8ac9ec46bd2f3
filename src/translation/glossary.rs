/*!
 * Glossary normalization for consistent target-language terminology.
 *
 * A glossary is an ordered list of regex substitution rules loaded from a
 * JSON file. Rules are applied in list order, so later rules see the output
 * of earlier ones. A rule whose pattern fails to compile is skipped with a
 * warning rather than aborting the batch.
 */

use std::path::Path;

use log::warn;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::file_utils::FileManager;

/// One substitution rule as it appears in the glossary file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GlossaryRule {
    /// Regex pattern to match
    pub pattern: String,

    /// Replacement text; `$1`-style group references are supported
    pub replace: String,
}

#[derive(Debug, Default, Deserialize)]
struct GlossaryFile {
    #[serde(default)]
    rules: Vec<GlossaryRule>,
}

/// An ordered set of compiled terminology rules.
pub struct Glossary {
    rules: Vec<(Regex, String)>,
    fingerprint: String,
}

impl Glossary {
    /// Build a glossary from in-memory rules, skipping any that fail to compile.
    pub fn from_rules(rules: Vec<GlossaryRule>) -> Self {
        let mut compiled = Vec::with_capacity(rules.len());
        let mut retained = Vec::with_capacity(rules.len());

        for rule in rules {
            match Regex::new(&rule.pattern) {
                Ok(re) => {
                    compiled.push((re, rule.replace.clone()));
                    retained.push(rule);
                }
                Err(err) => {
                    warn!("Skipping malformed glossary rule '{}': {}", rule.pattern, err);
                }
            }
        }

        let fingerprint = fingerprint_rules(&retained);
        Self {
            rules: compiled,
            fingerprint,
        }
    }

    /// Load a glossary from a JSON file of the form
    /// `{"rules": [{"pattern": "...", "replace": "..."}]}`.
    ///
    /// An absent or unparseable file yields an empty glossary.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !FileManager::file_exists(path) {
            return Self::from_rules(Vec::new());
        }

        match FileManager::read_json::<GlossaryFile, _>(path) {
            Ok(file) => Self::from_rules(file.rules),
            Err(err) => {
                warn!("Ignoring unreadable glossary file {:?}: {}", path, err);
                Self::from_rules(Vec::new())
            }
        }
    }

    /// Apply every rule to `text` in list order.
    pub fn apply(&self, text: &str) -> String {
        if text.is_empty() || self.rules.is_empty() {
            return text.to_string();
        }

        let mut out = text.to_string();
        for (pattern, replace) in &self.rules {
            out = pattern.replace_all(&out, replace.as_str()).into_owned();
        }
        out
    }

    /// Stable digest of the active rule set, used inside cache keys so a
    /// glossary change can never surface a stale cached translation.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Number of active (compiled) rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the glossary has no active rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn fingerprint_rules(rules: &[GlossaryRule]) -> String {
    let serialized = serde_json::to_string(rules).unwrap_or_default();
    let digest = Sha256::digest(serialized.as_bytes());
    format!("{:x}", digest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn rule(pattern: &str, replace: &str) -> GlossaryRule {
        GlossaryRule {
            pattern: pattern.to_string(),
            replace: replace.to_string(),
        }
    }

    #[test]
    fn test_apply_shouldSubstituteInOrder() {
        // The second rule sees the output of the first
        let glossary = Glossary::from_rules(vec![
            rule(r"(?i)\bRettungsprobe\b", "Rettungswurf"),
            rule(r"\bRettungswurf\b", "RW"),
        ]);
        assert_eq!(glossary.apply("eine Rettungsprobe ablegen"), "eine RW ablegen");
    }

    #[test]
    fn test_apply_shouldSupportGroupReferences() {
        let glossary = Glossary::from_rules(vec![rule(r"(\d+) Punkte", "$1 Pkt.")]);
        assert_eq!(glossary.apply("verliert 5 Punkte"), "verliert 5 Pkt.");
    }

    #[test]
    fn test_fromRules_shouldSkipMalformedRule() {
        let glossary = Glossary::from_rules(vec![
            rule(r"[unclosed", "x"),
            rule(r"\bZauber\b", "Spruch"),
        ]);
        assert_eq!(glossary.len(), 1);
        assert_eq!(glossary.apply("ein Zauber"), "ein Spruch");
    }

    #[test]
    fn test_fingerprint_shouldChangeWithRuleSet() {
        let a = Glossary::from_rules(vec![rule(r"\ba\b", "b")]);
        let b = Glossary::from_rules(vec![rule(r"\ba\b", "c")]);
        let empty = Glossary::from_rules(Vec::new());

        assert_ne!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), empty.fingerprint());
    }

    #[test]
    fn test_fingerprint_shouldIgnoreSkippedRules() {
        let with_bad = Glossary::from_rules(vec![
            rule(r"[unclosed", "x"),
            rule(r"\bZauber\b", "Spruch"),
        ]);
        let without_bad = Glossary::from_rules(vec![rule(r"\bZauber\b", "Spruch")]);
        assert_eq!(with_bad.fingerprint(), without_bad.fingerprint());
    }

    #[test]
    fn test_load_shouldDefaultToEmptyWhenFileMissing() {
        let glossary = Glossary::load("does/not/exist.json");
        assert!(glossary.is_empty());
    }

    #[test]
    fn test_load_shouldReadRulesFile() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("glossary_de.json");
        std::fs::write(
            &path,
            r#"{"rules":[{"pattern":"(?i)\\bRettungsprobe\\b","replace":"Rettungswurf"}]}"#,
        )
        .unwrap();

        let glossary = Glossary::load(&path);
        assert_eq!(glossary.len(), 1);
        assert_eq!(glossary.apply("Rettungsprobe"), "Rettungswurf");
    }

    #[test]
    fn test_load_shouldTreatCorruptFileAsEmpty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("glossary_de.json");
        std::fs::write(&path, "not json {").unwrap();

        let glossary = Glossary::load(&path);
        assert!(glossary.is_empty());
    }
}
