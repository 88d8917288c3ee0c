//! Rich diagnostic error types for hpo-lookup.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes, help text, and source chains so users know exactly what
//! went wrong and how to fix it.

use miette::Diagnostic;
use thiserror::Error;

use crate::config::ConfigError;
use crate::paths::PathError;

/// Top-level error type for hpo-lookup.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text, sources) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum HpoError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Ontology(#[from] OntologyError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Persist(#[from] PersistError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Tool(#[from] ToolError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Path(#[from] PathError),
}

// ---------------------------------------------------------------------------
// Ontology errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum OntologyError {
    #[error("failed to read ontology document: {path}")]
    #[diagnostic(
        code(hpo::ontology::io),
        help(
            "The ontology file could not be read. Check that the path is correct \
             and readable, or point to it with `--ontology` or `ontology_path` \
             in the config file."
        )
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed ontology document {path} at line {line}, column {column}: {message}")]
    #[diagnostic(
        code(hpo::ontology::parse),
        help(
            "The file is not valid JSON. Download a fresh copy of hp.json from \
             the HPO release page, or validate the file with a JSON linter."
        )
    )]
    Parse {
        path: String,
        line: usize,
        column: usize,
        message: String,
    },
}

// ---------------------------------------------------------------------------
// Persistence errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum PersistError {
    #[error("failed to write result mapping: {path}")]
    #[diagnostic(
        code(hpo::persist::io),
        help(
            "Ensure the output directory exists and is writable, choose another \
             destination with `--output`, or disable saving with `--no-save`."
        )
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize result mapping: {message}")]
    #[diagnostic(
        code(hpo::persist::serde),
        help("This is a bug in hpo-lookup. Please report it with the input that triggered it.")
    )]
    Serialization { message: String },
}

// ---------------------------------------------------------------------------
// Tool errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ToolError {
    #[error("tool not found: \"{name}\"")]
    #[diagnostic(
        code(hpo::tool::not_found),
        help("List registered tools with `hpo-lookup tools`.")
    )]
    NotFound { name: String },

    #[error("tool \"{tool_name}\" is missing required parameter \"{param}\"")]
    #[diagnostic(
        code(hpo::tool::missing_param),
        help("Provide every parameter marked as required in the tool signature.")
    )]
    MissingParam { tool_name: String, param: String },

    #[error("tool \"{tool_name}\" got an invalid value for \"{param}\": {message}")]
    #[diagnostic(
        code(hpo::tool::invalid_param),
        help("Check the parameter description in the tool signature.")
    )]
    InvalidParam {
        tool_name: String,
        param: String,
        message: String,
    },
}

/// Convenience alias for functions returning hpo-lookup results.
pub type HpoResult<T> = std::result::Result<T, HpoError>;
