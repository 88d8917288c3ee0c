// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # hpo-lookup
//!
//! Maps free-text clinical terms to Human Phenotype Ontology (HPO) identifiers
//! by exact, case-insensitive label and synonym matching against an ontology
//! JSON document.
//!
//! ## Architecture
//!
//! - **Ontology** (`ontology`): document loading, an optional mtime-validated
//!   cache, and the depth-first term matcher
//! - **Batch resolution** (`resolve`): delimiter splitting, normalization and the
//!   ordered result mapping with its JSON persistence
//! - **Lookup service** (`lookup`): [`HpoLookup`], tying configuration, loading
//!   and matching together
//! - **Tools** (`tool`): the `hpo_lookup` tool an orchestrating agent calls
//!
//! ## Library usage
//!
//! ```no_run
//! use hpo_lookup::HpoLookup;
//!
//! let lookup = HpoLookup::with_ontology("hpo.json").unwrap();
//! let id = lookup.lookup("Iron deficiency anaemia").unwrap();
//! println!("{id}");
//!
//! let mapping = lookup.resolve("short stature; developmental delay").unwrap();
//! for (term, outcome) in mapping.iter() {
//!     println!("{term}: {outcome}");
//! }
//! ```

pub mod config;
pub mod error;
pub mod lookup;
pub mod ontology;
pub mod paths;
pub mod resolve;
pub mod tool;

pub use error::{HpoError, HpoResult};
pub use lookup::HpoLookup;
pub use ontology::{FieldNames, OntologyDocument, TermMatch};
pub use resolve::ResultMapping;
