//! Exact label/synonym matching over an ontology tree.
//!
//! The walk is a depth-first, pre-order traversal that visits object fields in
//! document order and array elements in index order. A node matches when its
//! label, or one of its synonym values, lower-cased, equals the query. There is
//! no fuzzy, stemmed or partial matching.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::OntologyDocument;

/// Sentinel written in place of an identifier when a term has no mapping.
pub const NO_MAPPING: &str = "No mapping found";

/// Outcome of matching one query against a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TermMatch {
    /// A node matched and carries an identifier. Numeric ids are rendered as
    /// text; an empty id is only returned when no other match has one.
    Found(String),
    /// A node matched but its identifier is absent, null, boolean or nested.
    Unidentified,
    /// No label or synonym in the document equals the query.
    NotFound,
}

impl TermMatch {
    /// The identifier, if one was found.
    pub fn id(&self) -> Option<&str> {
        match self {
            TermMatch::Found(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, TermMatch::Found(_))
    }

    /// Identifier or the [`NO_MAPPING`] sentinel, as emitted to callers.
    pub fn as_output(&self) -> &str {
        self.id().unwrap_or(NO_MAPPING)
    }
}

impl std::fmt::Display for TermMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_output())
    }
}

/// Field names the matcher reads from each node.
///
/// Several spellings may be accepted for the label, metadata and synonym value
/// fields; they are tried in order. The defaults accept both the obographs
/// spelling used by HPO releases (`lbl`, `meta`, `val`) and the long spelling
/// (`label`, `metadata`, `value`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldNames {
    #[serde(default = "default_label")]
    pub label: Vec<String>,
    #[serde(default = "default_metadata")]
    pub metadata: Vec<String>,
    #[serde(default = "default_synonyms")]
    pub synonyms: String,
    #[serde(default = "default_synonym_value")]
    pub synonym_value: Vec<String>,
    #[serde(default = "default_id")]
    pub id: String,
}

fn default_label() -> Vec<String> {
    vec!["lbl".into(), "label".into()]
}
fn default_metadata() -> Vec<String> {
    vec!["meta".into(), "metadata".into()]
}
fn default_synonyms() -> String {
    "synonyms".into()
}
fn default_synonym_value() -> Vec<String> {
    vec!["val".into(), "value".into()]
}
fn default_id() -> String {
    "id".into()
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            label: default_label(),
            metadata: default_metadata(),
            synonyms: default_synonyms(),
            synonym_value: default_synonym_value(),
            id: default_id(),
        }
    }
}

impl FieldNames {
    /// Only the obographs spelling (`lbl`, `meta.synonyms[].val`, `id`).
    pub fn obographs() -> Self {
        Self {
            label: vec!["lbl".into()],
            metadata: vec!["meta".into()],
            synonym_value: vec!["val".into()],
            ..Default::default()
        }
    }

    /// Whether any accepted spelling is missing. An empty list can never match.
    pub fn has_empty(&self) -> bool {
        self.label.is_empty()
            || self.metadata.is_empty()
            || self.synonym_value.is_empty()
            || self.synonyms.is_empty()
            || self.id.is_empty()
    }

    fn label_matches(&self, node: &Map<String, Value>, query: &str) -> bool {
        self.label
            .iter()
            .filter_map(|key| node.get(key).and_then(Value::as_str))
            .any(|label| label.to_lowercase() == query)
    }

    fn synonym_matches(&self, node: &Map<String, Value>, query: &str) -> bool {
        self.metadata
            .iter()
            .filter_map(|key| node.get(key))
            .filter_map(|meta| meta.get(&self.synonyms).and_then(Value::as_array))
            .flatten()
            .any(|synonym| {
                self.synonym_value
                    .iter()
                    .filter_map(|key| synonym.get(key).and_then(Value::as_str))
                    .any(|value| value.to_lowercase() == query)
            })
    }
}

/// Identifier stored on a matched node, if it is a string or a number.
fn identifier(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(id) => Some(id.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Match an already-normalized (trimmed, lower-cased) query against `document`.
///
/// The first node carrying a non-empty identifier wins. A matching node with an
/// empty or unusable identifier does not end the walk: its subtree is skipped
/// and later siblings are still searched. When nothing better turns up, an
/// empty id yields `Found("")`, and otherwise [`TermMatch::Unidentified`].
pub fn match_term(
    document: &OntologyDocument,
    normalized_query: &str,
    fields: &FieldNames,
) -> TermMatch {
    if normalized_query.is_empty() {
        return TermMatch::NotFound;
    }

    let mut outcome = TermMatch::NotFound;
    let mut stack: Vec<&Value> = vec![document.root()];

    while let Some(node) = stack.pop() {
        match node {
            Value::Object(map) => {
                if fields.label_matches(map, normalized_query)
                    || fields.synonym_matches(map, normalized_query)
                {
                    match identifier(map.get(&fields.id)) {
                        Some(id) if !id.is_empty() => return TermMatch::Found(id),
                        Some(_) => {
                            if !outcome.is_found() {
                                outcome = TermMatch::Found(String::new());
                            }
                        }
                        None => {
                            tracing::warn!(
                                query = normalized_query,
                                id = ?map.get(&fields.id),
                                "matched node has no usable identifier"
                            );
                            if outcome == TermMatch::NotFound {
                                outcome = TermMatch::Unidentified;
                            }
                        }
                    }
                    continue;
                }
                // Reversed so that the first field is popped first.
                stack.extend(map.values().rev());
            }
            Value::Array(items) => stack.extend(items.iter().rev()),
            _ => {}
        }
    }

    outcome
}
