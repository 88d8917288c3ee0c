//! Process-wide cache of parsed ontology documents.
//!
//! Entries are keyed by path and validated against the file's modification
//! time and length on every access, so an edited file is reloaded on the next
//! lookup and callers observe the same results as an uncached load.

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::time::SystemTime;

use dashmap::DashMap;

use super::OntologyDocument;
use crate::error::OntologyError;

static GLOBAL: OnceLock<Arc<DocumentCache>> = OnceLock::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fingerprint {
    modified: Option<SystemTime>,
    len: u64,
}

impl Fingerprint {
    fn of(path: &Path) -> Result<Self, OntologyError> {
        let meta = std::fs::metadata(path).map_err(|e| OntologyError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(Self {
            modified: meta.modified().ok(),
            len: meta.len(),
        })
    }
}

#[derive(Debug)]
struct CachedDocument {
    fingerprint: Fingerprint,
    document: Arc<OntologyDocument>,
}

/// Parsed documents keyed by path.
#[derive(Debug, Default)]
pub struct DocumentCache {
    entries: DashMap<PathBuf, CachedDocument>,
}

impl DocumentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cache shared by every [`crate::HpoLookup`] in the process.
    pub fn global() -> Arc<DocumentCache> {
        GLOBAL.get_or_init(|| Arc::new(DocumentCache::new())).clone()
    }

    /// Return the cached document for `path`, loading it when absent or stale.
    pub fn get_or_load(&self, path: &Path) -> Result<Arc<OntologyDocument>, OntologyError> {
        let fingerprint = match Fingerprint::of(path) {
            Ok(fingerprint) => fingerprint,
            Err(e) => {
                self.invalidate(path);
                return Err(e);
            }
        };

        if let Some(entry) = self.entries.get(path) {
            // Without an mtime the length alone cannot prove freshness.
            if entry.fingerprint == fingerprint && fingerprint.modified.is_some() {
                tracing::debug!(path = %path.display(), "ontology cache hit");
                return Ok(Arc::clone(&entry.document));
            }
        }

        let document = match OntologyDocument::load(path) {
            Ok(document) => Arc::new(document),
            Err(e) => {
                // A stale copy must not outlive a file that no longer parses.
                self.invalidate(path);
                return Err(e);
            }
        };
        self.entries.insert(
            path.to_path_buf(),
            CachedDocument {
                fingerprint,
                document: Arc::clone(&document),
            },
        );
        tracing::debug!(path = %path.display(), "ontology cache refreshed");
        Ok(document)
    }

    /// Drop the entry for `path`, if any.
    pub fn invalidate(&self, path: &Path) -> bool {
        self.entries.remove(path).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(path: &Path, json: &str) {
        std::fs::write(path, json).unwrap();
    }

    #[test]
    fn second_load_reuses_document() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("hpo.json");
        write(&path, r#"{"lbl": "Fever", "id": "HP:0001945"}"#);

        let cache = DocumentCache::new();
        let first = cache.get_or_load(&path).unwrap();
        let second = cache.get_or_load(&path).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn changed_file_is_reloaded() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("hpo.json");
        write(&path, r#"{"lbl": "Fever", "id": "HP:0001945"}"#);

        let cache = DocumentCache::new();
        let first = cache.get_or_load(&path).unwrap();

        // Different length guarantees a new fingerprint even on coarse mtimes.
        write(&path, r#"{"lbl": "Fever", "id": "HP:0001945", "extra": true}"#);
        let second = cache.get_or_load(&path).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert!(second.root().get("extra").is_some());
    }

    #[test]
    fn missing_file_propagates_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let cache = DocumentCache::new();
        let err = cache.get_or_load(&tmp.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, OntologyError::Io { .. }));
        assert!(cache.is_empty());
    }

    #[test]
    fn failed_reload_drops_stale_entry() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("hpo.json");
        write(&path, "[]");

        let cache = DocumentCache::new();
        cache.get_or_load(&path).unwrap();
        assert_eq!(cache.len(), 1);

        write(&path, "[{\"lbl\": ");
        let err = cache.get_or_load(&path).unwrap_err();
        assert!(matches!(err, OntologyError::Parse { .. }));
        assert!(cache.is_empty());
        assert!(!cache.invalidate(&path));
    }

    #[test]
    fn deleted_file_drops_stale_entry() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("hpo.json");
        write(&path, "[]");

        let cache = DocumentCache::new();
        cache.get_or_load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(
            cache.get_or_load(&path).unwrap_err(),
            OntologyError::Io { .. }
        ));
        assert!(cache.is_empty());
    }
}
