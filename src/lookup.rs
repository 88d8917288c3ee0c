//! The lookup service: single-term and batch HPO lookups against one ontology file.

use std::path::Path;
use std::sync::Arc;

use crate::config::LookupConfig;
use crate::error::HpoResult;
use crate::ontology::{DocumentCache, OntologyDocument, TermMatch, match_term};
use crate::resolve::{ResultMapping, normalize_term, resolve_terms, resolve_terms_parallel};

/// Looks up clinical terms in the ontology named by its [`LookupConfig`].
///
/// Without caching, every call re-reads and re-parses the ontology file, so
/// edits to the file are picked up immediately. With `cache = true` the
/// process-wide [`DocumentCache`] is used and reloads only when the file's
/// modification time or size changes.
pub struct HpoLookup {
    config: LookupConfig,
    cache: Option<Arc<DocumentCache>>,
}

impl HpoLookup {
    /// Create a lookup service, validating the configuration.
    pub fn new(config: LookupConfig) -> HpoResult<Self> {
        config.validate()?;
        let cache = config.cache.then(DocumentCache::global);
        tracing::debug!(
            ontology = %config.ontology_path.display(),
            cache = config.cache,
            persist = config.persist,
            "initializing hpo lookup"
        );
        Ok(Self { config, cache })
    }

    /// Default configuration for the ontology at `path`.
    pub fn with_ontology(path: impl AsRef<Path>) -> HpoResult<Self> {
        Self::new(LookupConfig::with_ontology(path.as_ref()))
    }

    /// Use a private cache instead of the process-wide one.
    pub fn with_cache(mut self, cache: Arc<DocumentCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn config(&self) -> &LookupConfig {
        &self.config
    }

    /// Load the configured ontology document.
    pub fn document(&self) -> HpoResult<Arc<OntologyDocument>> {
        let path = &self.config.ontology_path;
        let doc = match &self.cache {
            Some(cache) => cache.get_or_load(path)?,
            None => Arc::new(OntologyDocument::load(path)?),
        };
        Ok(doc)
    }

    /// Look up a single term. The query is trimmed and lower-cased first.
    pub fn lookup(&self, query: &str) -> HpoResult<TermMatch> {
        let document = self.document()?;
        let term = normalize_term(query);
        let outcome = match_term(&document, &term, &self.config.fields);
        tracing::debug!(term = %term, outcome = %outcome, "single-term lookup");
        Ok(outcome)
    }

    /// Split `raw_input` into terms, look each one up, and persist the mapping
    /// when configured.
    ///
    /// A load failure aborts the whole call: nothing is matched and nothing is
    /// written.
    pub fn resolve(&self, raw_input: &str) -> HpoResult<ResultMapping> {
        let mapping = self.resolve_unsaved(raw_input)?;
        if self.config.persist {
            mapping.write_to(&self.config.resolved_output_path())?;
        }
        Ok(mapping)
    }

    /// Like [`HpoLookup::resolve`] but never writes the mapping.
    pub fn resolve_unsaved(&self, raw_input: &str) -> HpoResult<ResultMapping> {
        let document = self.document()?;
        let fields = &self.config.fields;
        let mapping = if self.config.parallel {
            resolve_terms_parallel(&document, raw_input, fields)
        } else {
            resolve_terms(&document, raw_input, fields)
        };
        tracing::info!(
            terms = mapping.len(),
            found = mapping.found_count(),
            "resolved term batch"
        );
        Ok(mapping)
    }
}

impl std::fmt::Debug for HpoLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HpoLookup")
            .field("config", &self.config)
            .field("cached", &self.cache.is_some())
            .finish()
    }
}
