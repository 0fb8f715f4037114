//! Page model: the unit of compilation.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::CompilerConfig;

lazy_static! {
    /// Script block regex
    static ref SCRIPT_REGEX: Regex = Regex::new(r"(?is)<script\b([^>]*)>([\s\S]*?)</script>").unwrap();

    /// Attribute regex for parsing script attributes
    static ref ATTR_REGEX: Regex = Regex::new(r#"(?i)([a-z0-9-]+)(?:=(?:"([^"]*)"|'([^']*)'|([^>\s]+)))?"#).unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScriptKind {
    /// Evaluated only while compiling, never emitted
    CompilerOnly,
    Runtime,
    /// Compiler and runtime in one block. Not supported; skipped by the scanner.
    Mixed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptBlock {
    /// The whole `<script ...>...</script>` element as written in the markup
    pub selector: String,
    pub content: String,
    pub attributes: HashMap<String, String>,
    pub kind: ScriptKind,
}

impl ScriptBlock {
    pub fn is_compiler_only(&self) -> bool {
        self.kind == ScriptKind::CompilerOnly
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// Rewritten in place by each stage
    pub html_content: String,
    pub java_script: Vec<ScriptBlock>,
}

impl Page {
    pub fn new(html_content: impl Into<String>, java_script: Vec<ScriptBlock>) -> Self {
        Self {
            html_content: html_content.into(),
            java_script,
        }
    }

    /// Build a page from raw markup, collecting every `<script>` element
    pub fn from_source(source: &str, config: &CompilerConfig) -> Self {
        let mut java_script = Vec::new();

        for caps in SCRIPT_REGEX.captures_iter(source) {
            let attr_string = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            let content = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            let attributes = parse_attributes(attr_string);

            let compiled = attributes.contains_key(&config.compiler_script_attribute);
            let runtime = attributes.contains_key(&config.runtime_script_attribute);
            let kind = match (compiled, runtime) {
                (true, true) => ScriptKind::Mixed,
                (true, false) => ScriptKind::CompilerOnly,
                _ => ScriptKind::Runtime,
            };

            java_script.push(ScriptBlock {
                selector: caps[0].to_string(),
                content: content.to_string(),
                attributes,
                kind,
            });
        }

        Self {
            html_content: source.to_string(),
            java_script,
        }
    }
}

fn parse_attributes(attr_string: &str) -> HashMap<String, String> {
    let mut attributes = HashMap::new();
    for attr_caps in ATTR_REGEX.captures_iter(attr_string) {
        if let Some(name) = attr_caps.get(1) {
            let value = attr_caps
                .get(2)
                .or_else(|| attr_caps.get(3))
                .or_else(|| attr_caps.get(4))
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| "true".to_string());
            attributes.insert(name.as_str().to_lowercase(), value);
        }
    }
    attributes
}

/// Private-use delimiter around a masked script index
const SCRIPT_MASK: char = '\u{E000}';

/// Swap every `<script>` element for an opaque placeholder.
///
/// Normalizers only see markup; script bodies come back byte for byte through
/// [`unmask_scripts`], so script selectors keep matching after normalization.
pub fn mask_scripts(html: &str) -> (String, Vec<String>) {
    let mut scripts = Vec::new();
    let masked = SCRIPT_REGEX
        .replace_all(html, |caps: &regex::Captures| {
            scripts.push(caps[0].to_string());
            format!("{}{}{}", SCRIPT_MASK, scripts.len() - 1, SCRIPT_MASK)
        })
        .to_string();
    (masked, scripts)
}

/// Put masked scripts back. Returns the indexes whose placeholder was lost.
pub fn unmask_scripts(html: &str, scripts: &[String]) -> (String, Vec<usize>) {
    let mut restored = html.to_string();
    let mut lost = Vec::new();
    for (i, script) in scripts.iter().enumerate() {
        let placeholder = format!("{}{}{}", SCRIPT_MASK, i, SCRIPT_MASK);
        if restored.contains(&placeholder) {
            restored = restored.replacen(&placeholder, script, 1);
        } else {
            lost.push(i);
        }
    }
    (restored, lost)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_kinds() {
        let html = r#"
            <script compiled>var count = 0;</script>
            <script>console.log('runtime');</script>
            <script compiled runtime>var mixed = 1;</script>
            <div></div>
        "#;
        let page = Page::from_source(html, &CompilerConfig::default());

        let kinds: Vec<_> = page.java_script.iter().map(|b| b.kind).collect();
        assert_eq!(
            kinds,
            vec![ScriptKind::CompilerOnly, ScriptKind::Runtime, ScriptKind::Mixed]
        );
        assert_eq!(page.java_script[0].content, "var count = 0;");
        assert_eq!(
            page.java_script[0].selector,
            "<script compiled>var count = 0;</script>"
        );
        assert_eq!(page.html_content, html);
    }

    #[test]
    fn test_script_attributes() {
        let html = r#"<script type="module" data-x='1' compiled>let y;</script>"#;
        let page = Page::from_source(html, &CompilerConfig::default());
        let block = &page.java_script[0];
        assert_eq!(block.attributes.get("type").map(|s| s.as_str()), Some("module"));
        assert_eq!(block.attributes.get("data-x").map(|s| s.as_str()), Some("1"));
        assert_eq!(block.attributes.get("compiled").map(|s| s.as_str()), Some("true"));
        assert!(block.is_compiler_only());
    }

    #[test]
    fn test_masked_scripts_survive_rewrites() {
        let html = "<p>{{ a }}</p><script compiled>// {{ note }}\nvar a = 1;</script><i></i>";

        let (masked, scripts) = mask_scripts(html);
        assert_eq!(scripts.len(), 1);
        assert!(!masked.contains("note"));

        let rewritten = masked.replace("<i></i>", "<b></b>");
        let (restored, lost) = unmask_scripts(&rewritten, &scripts);
        assert!(lost.is_empty());
        assert_eq!(
            restored,
            "<p>{{ a }}</p><script compiled>// {{ note }}\nvar a = 1;</script><b></b>"
        );

        let (_, lost) = unmask_scripts("<p></p>", &scripts);
        assert_eq!(lost, vec![0]);
    }
}
