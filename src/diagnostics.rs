//! Per-compilation diagnostic collection.
//!
//! Stages never abort on a malformed construct. They hand back an
//! [`Accumulated`] value and the orchestrator merges its errors into the
//! [`Diagnostics`] of the unit being compiled, tagged with the file path.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

use crate::error::{HostError, TemplateError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub file_path: String,
    pub code: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(file_path: &str, error: &TemplateError) -> Self {
        Self {
            file_path: file_path.to_string(),
            code: error.code().to_string(),
            message: error.to_string(),
        }
    }

    /// A fatal condition that stopped the file from compiling at all
    pub fn fatal(file_path: &str, error: &HostError) -> Self {
        Self {
            file_path: file_path.to_string(),
            code: error.code().to_string(),
            message: error.to_string(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: [{}] {}", self.file_path, self.code, self.message)
    }
}

/// Ordered, append-only error log for one compilation invocation
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, file_path: &str, error: TemplateError) {
        self.entries.push(Diagnostic::new(file_path, &error));
    }

    pub fn extend<I>(&mut self, file_path: &str, errors: I)
    where
        I: IntoIterator<Item = TemplateError>,
    {
        for error in errors {
            self.push(file_path, error);
        }
    }

    /// Take over entries already tagged by another unit
    pub fn append(&mut self, entries: Vec<Diagnostic>) {
        self.entries.extend(entries);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Log every entry at warn level
    pub fn report(&self) {
        for entry in &self.entries {
            warn!(file = %entry.file_path, code = %entry.code, "{}", entry.message);
        }
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

/// A stage result: the value it produced plus every error met on the way
#[derive(Debug)]
pub struct Accumulated<T> {
    pub value: T,
    pub errors: Vec<TemplateError>,
}

impl<T> Accumulated<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            errors: Vec::new(),
        }
    }

    pub fn with_errors(value: T, errors: Vec<TemplateError>) -> Self {
        Self { value, errors }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Accumulated<U> {
        Accumulated {
            value: f(self.value),
            errors: self.errors,
        }
    }

    /// Move the errors into `diagnostics` and return the value
    pub fn merge_into(self, diagnostics: &mut Diagnostics, file_path: &str) -> T {
        diagnostics.extend(file_path, self.errors);
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BindingKind;

    fn unresolved(name: &str) -> TemplateError {
        TemplateError::UnresolvedBinding {
            kind: BindingKind::Event,
            var_name: name.to_string(),
            selector: format!("@click=\"{} = 1\"", name),
        }
    }

    #[test]
    fn test_merge_tags_file_and_keeps_order() {
        let mut diagnostics = Diagnostics::new();
        let stage = Accumulated::with_errors(7, vec![unresolved("a"), unresolved("b")]);

        let value = stage.merge_into(&mut diagnostics, "pages/index.html");

        assert_eq!(value, 7);
        assert_eq!(diagnostics.len(), 2);
        let entries = diagnostics.into_vec();
        assert!(entries[0].message.contains("'a'"));
        assert!(entries[1].message.contains("'b'"));
        assert!(entries.iter().all(|d| d.file_path == "pages/index.html"));
        assert!(entries.iter().all(|d| d.code == "UNRESOLVED_BINDING"));
    }

    #[test]
    fn test_map_preserves_errors() {
        let stage = Accumulated::with_errors("x", vec![unresolved("a")]).map(|s| s.len());
        assert_eq!(stage.value, 1);
        assert_eq!(stage.errors.len(), 1);
    }
}
