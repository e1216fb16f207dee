//! Knowledge texts fed into every objection prompt.
//!
//! Both files are read once at startup and never reloaded. A missing file
//! never stops the process: a fixed fallback sentence is used instead.

use std::fs;
use std::path::Path;

use crate::config::KnowledgeConfig;

pub const PLAYBOOK_FALLBACK: &str = "No playbook strategy was loaded";
pub const CASES_FALLBACK: &str = "No success case available";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeStore {
    pub playbook_text: String,
    pub cases_text: String,
}

impl KnowledgeStore {
    pub fn new(playbook_text: impl Into<String>, cases_text: impl Into<String>) -> Self {
        Self { playbook_text: playbook_text.into(), cases_text: cases_text.into() }
    }

    /// Read the playbook and the success-case library from disk.
    pub fn load(config: &KnowledgeConfig) -> Self {
        let playbook_text = match fs::read_to_string(&config.playbook_path) {
            Ok(text) => {
                tracing::info!(
                    "Loaded playbook from {} ({} bytes)",
                    config.playbook_path,
                    text.len()
                );
                text
            },
            Err(e) => {
                tracing::error!(
                    severity = "critical",
                    "Failed to load playbook from {}: {}. Continuing without it",
                    config.playbook_path,
                    e
                );
                PLAYBOOK_FALLBACK.to_string()
            },
        };

        let cases_text = match fs::read_to_string(&config.cases_path) {
            Ok(text) => {
                tracing::info!(
                    "Loaded success cases from {} ({} bytes)",
                    config.cases_path,
                    text.len()
                );
                text
            },
            Err(e) => {
                tracing::debug!("Success cases not loaded from {}: {}", config.cases_path, e);
                CASES_FALLBACK.to_string()
            },
        };

        Self::new(playbook_text, cases_text)
    }

    #[cfg(test)]
    pub fn playbook_loaded(&self) -> bool {
        self.playbook_text != PLAYBOOK_FALLBACK
    }

    #[cfg(test)]
    pub fn from_paths(playbook: &Path, cases: &Path) -> Self {
        Self::load(&KnowledgeConfig {
            playbook_path: playbook.to_string_lossy().into_owned(),
            cases_path: cases.to_string_lossy().into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_reads_both_files_verbatim() {
        let dir = tempfile::tempdir().expect("tempdir");
        let playbook = dir.path().join("playbook.txt");
        let cases = dir.path().join("cases.txt");
        fs::write(&playbook, "  Estratégia 1\nEstratégia 2\n").unwrap();
        fs::write(&cases, "Caso A").unwrap();

        let store = KnowledgeStore::from_paths(&playbook, &cases);

        assert_eq!(store.playbook_text, "  Estratégia 1\nEstratégia 2\n");
        assert_eq!(store.cases_text, "Caso A");
        assert!(store.playbook_loaded());
    }

    #[test]
    fn test_missing_files_use_fallbacks() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = KnowledgeStore::from_paths(
            &dir.path().join("absent-playbook.txt"),
            &dir.path().join("absent-cases.txt"),
        );

        assert_eq!(store.playbook_text, PLAYBOOK_FALLBACK);
        assert_eq!(store.cases_text, CASES_FALLBACK);
        assert!(!store.playbook_loaded());
    }

    #[test]
    fn test_missing_cases_only() {
        let dir = tempfile::tempdir().expect("tempdir");
        let playbook = dir.path().join("playbook.txt");
        fs::write(&playbook, "Playbook").unwrap();

        let store = KnowledgeStore::from_paths(&playbook, &dir.path().join("nope.txt"));

        assert_eq!(store.playbook_text, "Playbook");
        assert_eq!(store.cases_text, CASES_FALLBACK);
    }
}
