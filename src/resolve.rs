//! Batch resolution of delimited clinical term lists.
//!
//! A raw string such as `"Short stature; developmental delay, fever"` is split
//! on commas and semicolons, each fragment is trimmed and lower-cased, empty
//! fragments are dropped, and every surviving term is matched independently.
//! Results are kept in a [`ResultMapping`] in first-seen order.

use std::collections::HashMap;
use std::path::Path;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::PersistError;
use crate::ontology::{FieldNames, OntologyDocument, TermMatch, match_term};

/// Characters that separate candidate terms in a raw input string.
pub const DELIMITERS: [char; 2] = [',', ';'];

/// Trim and lower-case a single query term.
pub fn normalize_term(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Split a raw input into normalized, non-empty candidate terms.
///
/// Duplicates are preserved here; [`ResultMapping`] collapses them.
pub fn split_terms(raw: &str) -> Vec<String> {
    raw.split(DELIMITERS)
        .map(normalize_term)
        .filter(|t| !t.is_empty())
        .collect()
}

/// Ordered mapping from normalized term to match outcome.
///
/// Serializes as a JSON object whose values are identifiers or the
/// `"No mapping found"` sentinel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultMapping {
    entries: Vec<(String, TermMatch)>,
    /// Term to position in `entries`.
    index: HashMap<String, usize>,
}

impl ResultMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome for `term`. A repeated term keeps its first position
    /// and takes the new outcome.
    pub fn insert(&mut self, term: impl Into<String>, outcome: TermMatch) {
        let term = term.into();
        match self.index.get(&term) {
            Some(&pos) => self.entries[pos].1 = outcome,
            None => {
                self.index.insert(term.clone(), self.entries.len());
                self.entries.push((term, outcome));
            }
        }
    }

    pub fn get(&self, term: &str) -> Option<&TermMatch> {
        self.index.get(term).map(|&pos| &self.entries[pos].1)
    }

    pub fn contains(&self, term: &str) -> bool {
        self.index.contains_key(term)
    }

    /// Terms in insertion order.
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(t, _)| t.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TermMatch)> {
        self.entries.iter().map(|(t, m)| (t.as_str(), m))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of terms that resolved to an identifier.
    pub fn found_count(&self) -> usize {
        self.entries.iter().filter(|(_, m)| m.is_found()).count()
    }

    /// Render as a JSON object value.
    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .entries
            .iter()
            .map(|(t, m)| (t.clone(), serde_json::Value::String(m.as_output().to_string())))
            .collect();
        serde_json::Value::Object(map)
    }

    /// Pretty-printed JSON object with 2-space indentation.
    pub fn to_json_pretty(&self) -> Result<String, PersistError> {
        serde_json::to_string_pretty(self).map_err(|e| PersistError::Serialization {
            message: e.to_string(),
        })
    }

    /// Write the mapping to `path`, replacing any previous content.
    pub fn write_to(&self, path: &Path) -> Result<(), PersistError> {
        let json = self.to_json_pretty()?;
        std::fs::write(path, json).map_err(|e| PersistError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        tracing::info!(path = %path.display(), terms = self.len(), "saved result mapping");
        Ok(())
    }
}

impl Serialize for ResultMapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (term, outcome) in &self.entries {
            map.serialize_entry(term, outcome.as_output())?;
        }
        map.end()
    }
}

impl<'a> IntoIterator for &'a ResultMapping {
    type Item = &'a (String, TermMatch);
    type IntoIter = std::slice::Iter<'a, (String, TermMatch)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Resolve every term of `raw_input` against `document`, one after another.
pub fn resolve_terms(
    document: &OntologyDocument,
    raw_input: &str,
    fields: &FieldNames,
) -> ResultMapping {
    let mut mapping = ResultMapping::new();
    for term in split_terms(raw_input) {
        if mapping.contains(&term) {
            continue;
        }
        let outcome = match_term(document, &term, fields);
        mapping.insert(term, outcome);
    }
    mapping
}

/// Same result as [`resolve_terms`], with the per-term traversals spread
/// across the rayon thread pool.
///
/// Each distinct term owns one output slot; the document is only read.
pub fn resolve_terms_parallel(
    document: &OntologyDocument,
    raw_input: &str,
    fields: &FieldNames,
) -> ResultMapping {
    use rayon::prelude::*;

    let mut terms = split_terms(raw_input);
    let mut seen = std::collections::HashSet::new();
    terms.retain(|t| seen.insert(t.clone()));

    let outcomes: Vec<TermMatch> = terms
        .par_iter()
        .map(|term| match_term(document, term, fields))
        .collect();

    let mut mapping = ResultMapping::new();
    for (term, outcome) in terms.into_iter().zip(outcomes) {
        mapping.insert(term, outcome);
    }
    mapping
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn fixture() -> OntologyDocument {
        OntologyDocument::from_value(json!({"graphs": [{"nodes": [
            {"id": "HP:0001891", "lbl": "Iron deficiency anaemia"},
            {"id": "HP:0004322", "lbl": "Short stature",
             "meta": {"synonyms": [{"val": "Small stature"}]}},
            {"id": "HP:0001263", "lbl": "Global developmental delay",
             "meta": {"synonyms": [{"val": "Developmental delay"}]}},
            {"lbl": "Orphan term"}
        ]}]}))
    }

    #[test]
    fn split_on_commas_and_semicolons() {
        assert_eq!(split_terms("A, B; C"), ["a", "b", "c"]);
    }

    #[test]
    fn split_drops_empty_fragments() {
        assert_eq!(split_terms("A,, B"), ["a", "b"]);
        assert_eq!(split_terms(" ; ,\t, "), Vec::<String>::new());
        assert!(split_terms("").is_empty());
    }

    #[test]
    fn split_keeps_duplicates_and_inner_whitespace() {
        assert_eq!(
            split_terms("Short  Stature;short  stature"),
            ["short  stature", "short  stature"]
        );
    }

    #[test]
    fn normalize_trims_and_lowercases() {
        assert_eq!(normalize_term("  Iron Deficiency Anaemia\n"), "iron deficiency anaemia");
    }

    #[test]
    fn resolve_maps_each_term() {
        let mapping = resolve_terms(
            &fixture(),
            "Iron deficiency anaemia; developmental delay, unknown condition",
            &FieldNames::default(),
        );
        assert_eq!(mapping.len(), 3);
        assert_eq!(
            mapping.terms().collect::<Vec<_>>(),
            ["iron deficiency anaemia", "developmental delay", "unknown condition"]
        );
        assert_eq!(
            mapping.get("iron deficiency anaemia"),
            Some(&TermMatch::Found("HP:0001891".into()))
        );
        assert_eq!(
            mapping.get("developmental delay").and_then(TermMatch::id),
            Some("HP:0001263")
        );
        assert_eq!(mapping.get("unknown condition"), Some(&TermMatch::NotFound));
        assert_eq!(mapping.found_count(), 2);
    }

    #[test]
    fn duplicates_collapse_to_one_key() {
        let mapping = resolve_terms(&fixture(), "Short stature, SHORT STATURE; fever", &FieldNames::default());
        assert_eq!(mapping.terms().collect::<Vec<_>>(), ["short stature", "fever"]);
    }

    #[test]
    fn repeated_insert_keeps_first_position() {
        let mut mapping = ResultMapping::new();
        mapping.insert("fever", TermMatch::NotFound);
        mapping.insert("chills", TermMatch::NotFound);
        mapping.insert("fever", TermMatch::Found("HP:0001945".into()));

        assert_eq!(mapping.terms().collect::<Vec<_>>(), ["fever", "chills"]);
        assert_eq!(mapping.get("fever").and_then(TermMatch::id), Some("HP:0001945"));
        assert!(mapping.contains("chills"));
        assert!(!mapping.contains("rash"));
    }

    #[test]
    fn large_batch_with_repeats_collapses() {
        let input = (0..5_000)
            .map(|i| format!("term {}", i % 1_000))
            .collect::<Vec<_>>()
            .join(", ");
        let mapping = resolve_terms(&fixture(), &input, &FieldNames::default());
        assert_eq!(mapping.len(), 1_000);
        assert_eq!(mapping.terms().next(), Some("term 0"));
        assert_eq!(mapping.terms().last(), Some("term 999"));
    }

    #[test]
    fn serializes_with_sentinel() {
        let mapping = resolve_terms(&fixture(), "short stature, orphan term, nothing", &FieldNames::default());
        assert_eq!(
            mapping.to_json(),
            json!({
                "short stature": "HP:0004322",
                "orphan term": "No mapping found",
                "nothing": "No mapping found"
            })
        );
        assert_eq!(mapping.get("orphan term"), Some(&TermMatch::Unidentified));
    }

    #[test]
    fn pretty_json_keeps_term_order() {
        let mapping = resolve_terms(&fixture(), "small stature, iron deficiency anaemia", &FieldNames::default());
        let text = mapping.to_json_pretty().unwrap();
        assert_eq!(
            text,
            "{\n  \"small stature\": \"HP:0004322\",\n  \"iron deficiency anaemia\": \"HP:0001891\"\n}"
        );
    }

    #[test]
    fn parallel_matches_sequential() {
        let doc = fixture();
        let fields = FieldNames::default();
        let input = "Short stature; a, b, iron deficiency anaemia, short stature;;developmental delay";
        assert_eq!(
            resolve_terms_parallel(&doc, input, &fields),
            resolve_terms(&doc, input, &fields)
        );
    }

    #[test]
    fn resolve_is_idempotent() {
        let doc = fixture();
        let fields = FieldNames::default();
        let input = "Short stature; unknown";
        assert_eq!(resolve_terms(&doc, input, &fields), resolve_terms(&doc, input, &fields));
    }

    #[test]
    fn write_to_overwrites_previous_content() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("output_mappings.json");
        std::fs::write(&path, "stale content that is longer than the new mapping").unwrap();

        let mut mapping = ResultMapping::new();
        mapping.insert("fever", TermMatch::NotFound);
        mapping.write_to(&path).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, json!({"fever": "No mapping found"}));
    }

    #[test]
    fn write_to_missing_directory_fails() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mapping = ResultMapping::new();
        let err = mapping
            .write_to(&tmp.path().join("missing").join("out.json"))
            .unwrap_err();
        assert!(matches!(err, PersistError::Io { .. }));
    }
}
