//! Compiler configuration.
//!
//! Every fixed token shared with the extraction layer lives here so hosts can
//! load a dialect from JSON instead of recompiling.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::HostError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CompilerConfig {
    /// Prefix of a property binding attribute, e.g. `:text="count"`
    pub property_prefix: String,
    /// Prefix of an event binding attribute, e.g. `@click="count = count + 1"`
    pub event_prefix: String,
    /// Keyword that opens a compiler variable declaration
    pub variable_token: String,
    /// Keyword that opens a component import
    pub import_prefix: String,
    pub statement_end_token: String,
    pub line_comment_start: String,
    pub new_line: String,
    pub block_comment_start: String,
    pub block_comment_end: String,
    /// Attribute marking a `<script>` block as compiler-only
    pub compiler_script_attribute: String,
    /// Attribute that, next to the compiler attribute, marks a mixed block
    pub runtime_script_attribute: String,
    /// File extensions picked up by page discovery
    pub page_extensions: Vec<String>,
    /// Directory for the persistent component cache. Memory only when unset.
    pub cache_dir: Option<PathBuf>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            property_prefix: ":".to_string(),
            event_prefix: "@".to_string(),
            variable_token: "var".to_string(),
            import_prefix: "import".to_string(),
            statement_end_token: ";".to_string(),
            line_comment_start: "//".to_string(),
            new_line: "\n".to_string(),
            block_comment_start: "/*".to_string(),
            block_comment_end: "*/".to_string(),
            compiler_script_attribute: "compiled".to_string(),
            runtime_script_attribute: "runtime".to_string(),
            page_extensions: vec!["html".to_string(), "htm".to_string()],
            cache_dir: None,
        }
    }
}

impl CompilerConfig {
    pub fn from_json(json: &str) -> Result<Self, HostError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, HostError> {
        let data = fs::read_to_string(path).map_err(|source| HostError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&data)
    }

    pub fn is_page_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                self.page_extensions
                    .iter()
                    .any(|candidate| candidate.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }
}
