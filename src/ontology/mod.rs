//! Ontology documents: loading, caching and term matching.
//!
//! An ontology document is the full JSON tree of an ontology release (for HPO,
//! the obographs `hp.json`). No schema is enforced; the [`matcher`] picks out
//! label, synonym and identifier fields wherever they appear in the tree.

pub mod cache;
pub mod matcher;

use std::path::Path;

use serde_json::Value;

use crate::error::OntologyError;

pub use cache::DocumentCache;
pub use matcher::{FieldNames, TermMatch, match_term};

/// Parsed, read-only ontology tree.
#[derive(Debug, Clone, PartialEq)]
pub struct OntologyDocument {
    root: Value,
}

impl OntologyDocument {
    /// Wrap an already-parsed JSON tree.
    pub fn from_value(root: Value) -> Self {
        Self { root }
    }

    /// Parse a document from an in-memory JSON string.
    pub fn parse_str(json: &str) -> Result<Self, OntologyError> {
        Self::parse_with_origin(json, "<memory>")
    }

    /// Read and parse the whole file at `path`.
    ///
    /// Every call hits the filesystem; use [`DocumentCache`] to reuse a parsed
    /// document across calls.
    pub fn load(path: &Path) -> Result<Self, OntologyError> {
        let content = std::fs::read_to_string(path).map_err(|e| OntologyError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let doc = Self::parse_with_origin(&content, &path.display().to_string())?;
        tracing::debug!(
            path = %path.display(),
            bytes = content.len(),
            "loaded ontology document"
        );
        Ok(doc)
    }

    fn parse_with_origin(json: &str, origin: &str) -> Result<Self, OntologyError> {
        let root = serde_json::from_str(json).map_err(|e| OntologyError::Parse {
            path: origin.to_string(),
            line: e.line(),
            column: e.column(),
            message: e.to_string(),
        })?;
        Ok(Self { root })
    }

    /// The root node of the tree.
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Find the node matching an already-normalized query.
    pub fn find(&self, normalized_query: &str, fields: &FieldNames) -> TermMatch {
        match_term(self, normalized_query, fields)
    }
}
