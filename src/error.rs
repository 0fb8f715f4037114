//! Error types for the templating compiler

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub const MALFORMED_BINDING: &str = "MALFORMED_BINDING";
pub const UNRESOLVED_BINDING: &str = "UNRESOLVED_BINDING";
pub const UNRESOLVED_IMPORT: &str = "UNRESOLVED_IMPORT";
pub const IMPORT_CYCLE: &str = "IMPORT_CYCLE";
pub const HOST_ERROR: &str = "HOST_ERROR";

/// The syntactic construct a binding error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Variable,
    Property,
    Event,
    Import,
}

impl BindingKind {
    /// Long form used in shape-violation messages
    pub fn construct(&self) -> &'static str {
        match self {
            BindingKind::Variable => "compiler variable declaration",
            BindingKind::Property => "reactive property binding",
            BindingKind::Event => "reactive event assignment",
            BindingKind::Import => "component import",
        }
    }
}

impl fmt::Display for BindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BindingKind::Variable => "variable",
            BindingKind::Property => "property",
            BindingKind::Event => "event",
            BindingKind::Import => "import",
        };
        f.write_str(name)
    }
}

/// Recoverable failures. Each one is reported and the pipeline carries on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("incorrect {}:\n\tExpected: {expected}\n\tFound: {found}", .kind.construct())]
    MalformedBinding {
        kind: BindingKind,
        expected: &'static str,
        found: String,
    },

    #[error("could not find compiler variable '{var_name}' for {kind} {selector}")]
    UnresolvedBinding {
        kind: BindingKind,
        var_name: String,
        selector: String,
    },

    #[error("could not resolve component import '{path}': {reason}")]
    UnresolvedImport { path: String, reason: String },

    #[error("circular component import: {chain}")]
    ImportCycle { chain: String },
}

impl TemplateError {
    pub fn code(&self) -> &'static str {
        match self {
            TemplateError::MalformedBinding { .. } => MALFORMED_BINDING,
            TemplateError::UnresolvedBinding { .. } => UNRESOLVED_BINDING,
            TemplateError::UnresolvedImport { .. } => UNRESOLVED_IMPORT,
            TemplateError::ImportCycle { .. } => IMPORT_CYCLE,
        }
    }
}

/// Failures of the component resolution collaborator
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("component not found at {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read component {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Host-level conditions. These are the only fatal errors.
#[derive(Error, Debug)]
pub enum HostError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid compiler config: {0}")]
    Config(#[from] serde_json::Error),
}

impl HostError {
    pub fn code(&self) -> &'static str {
        HOST_ERROR
    }
}
