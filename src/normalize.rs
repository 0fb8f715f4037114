//! Text normalization passes run before extraction.
//!
//! None of these passes are idempotent, so the orchestrator calls each one
//! exactly once per unit.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::config::CompilerConfig;

lazy_static! {
    /// `{{ $count }}` mustache shorthand
    static ref MUSTACHE_RE: Regex = Regex::new(r"\{\{\s*([^{}]*?)\s*\}\}").unwrap();
}

/// Markup rewrites the compiler consumes but does not own
pub trait Normalizer: Send + Sync {
    /// Expand loop/conditional directives into plain elements
    fn expand_control_flow(&self, file_path: &str, text: &str) -> String;

    /// Expand element references. Only called for HTML files.
    fn expand_element_refs(&self, text: &str) -> String;

    /// Expand text-node shorthands into bindable elements
    fn expand_text_nodes(&self, text: &str) -> String;
}

/// Passes control flow and element refs through untouched and expands the
/// mustache shorthand into a span with a single `innerText` property binding.
#[derive(Debug, Clone)]
pub struct DefaultNormalizer {
    property_prefix: String,
}

impl DefaultNormalizer {
    pub fn new(config: &CompilerConfig) -> Self {
        Self {
            property_prefix: config.property_prefix.clone(),
        }
    }
}

impl Default for DefaultNormalizer {
    fn default() -> Self {
        Self::new(&CompilerConfig::default())
    }
}

impl Normalizer for DefaultNormalizer {
    fn expand_control_flow(&self, _file_path: &str, text: &str) -> String {
        text.to_string()
    }

    fn expand_element_refs(&self, text: &str) -> String {
        text.to_string()
    }

    fn expand_text_nodes(&self, text: &str) -> String {
        MUSTACHE_RE
            .replace_all(text, |caps: &Captures| {
                format!(
                    "<span {}innerText=\"{}\"></span>",
                    self.property_prefix, &caps[1]
                )
            })
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mustache_expansion() {
        let normalizer = DefaultNormalizer::default();
        let out = normalizer.expand_text_nodes("<p>Count: {{ $count }}!</p>");
        assert_eq!(out, r#"<p>Count: <span :innerText="$count"></span>!</p>"#);
    }

    #[test]
    fn test_mustache_uses_configured_prefix() {
        let config = CompilerConfig {
            property_prefix: "bind:".to_string(),
            ..CompilerConfig::default()
        };
        let normalizer = DefaultNormalizer::new(&config);
        let out = normalizer.expand_text_nodes("{{name}}");
        assert_eq!(out, r#"<span bind:innerText="name"></span>"#);
    }

    #[test]
    fn test_passthrough_passes() {
        let normalizer = DefaultNormalizer::default();
        let text = "<ul><li>{{ item }}</li></ul>";
        assert_eq!(normalizer.expand_control_flow("a.html", text), text);
        assert_eq!(normalizer.expand_element_refs(text), text);
    }
}
