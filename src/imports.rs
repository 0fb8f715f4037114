//! Component import resolution and inlining.
//!
//! Resolution is delegated to a [`ComponentResolver`]; the orchestrator
//! compiles each resolved component (re-entering the pipeline for its own
//! imports) and then substitutes the result for the import statement.

use std::collections::HashMap;
use std::fs;
use std::path::{Component as PathPart, Path, PathBuf};
use tracing::debug;

use crate::error::ResolveError;
use crate::models::{Component, ComponentImport};
use crate::page::Page;

/// Finds the component an import statement refers to
pub trait ComponentResolver: Send + Sync {
    fn resolve(&self, import: &ComponentImport, from_file: &Path) -> Result<Component, ResolveError>;

    /// Current source of an already resolved component
    fn read(&self, path: &Path) -> Result<String, ResolveError>;

    /// Stable key for a file, used to detect import cycles
    fn identity(&self, path: &Path) -> PathBuf {
        normalize_path(path)
    }
}

/// Reads components from disk relative to the importing file
#[derive(Debug, Clone, Copy, Default)]
pub struct FsComponentResolver;

impl ComponentResolver for FsComponentResolver {
    fn resolve(&self, import: &ComponentImport, from_file: &Path) -> Result<Component, ResolveError> {
        let base = from_file.parent().unwrap_or_else(|| Path::new(""));
        let path = self.identity(&base.join(&import.path));
        let content = self.read(&path)?;

        debug!("resolved component {}", path.display());
        Ok(Component {
            source_path: path,
            content,
        })
    }

    fn read(&self, path: &Path) -> Result<String, ResolveError> {
        if !path.is_file() {
            return Err(ResolveError::NotFound {
                path: path.to_path_buf(),
            });
        }

        fs::read_to_string(path).map_err(|source| ResolveError::Read {
            path: path.to_path_buf(),
            source,
        })
    }

    fn identity(&self, path: &Path) -> PathBuf {
        fs::canonicalize(path).unwrap_or_else(|_| normalize_path(path))
    }
}

/// Serves component sources held in memory, keyed by normalized path
#[derive(Debug, Clone, Default)]
pub struct InMemoryResolver {
    sources: HashMap<PathBuf, String>,
}

impl InMemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl AsRef<Path>, source: impl Into<String>) {
        self.sources
            .insert(normalize_path(path.as_ref()), source.into());
    }

    pub fn with_source(mut self, path: impl AsRef<Path>, source: impl Into<String>) -> Self {
        self.insert(path, source);
        self
    }
}

impl ComponentResolver for InMemoryResolver {
    fn resolve(&self, import: &ComponentImport, from_file: &Path) -> Result<Component, ResolveError> {
        let base = from_file.parent().unwrap_or_else(|| Path::new(""));
        let path = normalize_path(&base.join(&import.path));
        let content = self.read(&path)?;

        Ok(Component {
            source_path: path,
            content,
        })
    }

    fn read(&self, path: &Path) -> Result<String, ResolveError> {
        self.sources
            .get(path)
            .cloned()
            .ok_or_else(|| ResolveError::NotFound {
                path: path.to_path_buf(),
            })
    }
}

/// Lexically fold `.` and `..` segments
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for part in path.components() {
        match part {
            PathPart::CurDir => {}
            PathPart::ParentDir => {
                if !normalized.pop() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Replace the import statement with the compiled component content.
/// Returns false when the statement is no longer present in the markup.
pub fn inline_component(page: &mut Page, import: &ComponentImport, content: &str) -> bool {
    let selector = &import.node.selector;
    if !page.html_content.contains(selector.as_str()) {
        return false;
    }
    page.html_content = page.html_content.replacen(selector.as_str(), content, 1);
    true
}

/// Files currently being compiled, outermost first
#[derive(Debug, Clone, Default)]
pub struct ImportStack {
    files: Vec<PathBuf>,
}

impl ImportStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: PathBuf) {
        self.files.push(path);
    }

    pub fn pop(&mut self) -> Option<PathBuf> {
        self.files.pop()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.files.iter().any(|f| f == path)
    }

    /// `a.html -> b.html -> a.html` for a re-entry of `path`
    pub fn cycle_chain(&self, path: &Path) -> String {
        let start = self.files.iter().position(|f| f == path).unwrap_or(0);
        self.files[start..]
            .iter()
            .chain(std::iter::once(&path.to_path_buf()))
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::LexNode;

    fn import(path: &str) -> ComponentImport {
        ComponentImport {
            path: path.to_string(),
            binding: None,
            node: LexNode::new(format!("import \"{}\";", path), vec![]),
        }
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path(Path::new("pages/./sub/../components/a.html")),
            PathBuf::from("pages/components/a.html")
        );
        assert_eq!(normalize_path(Path::new("../a.html")), PathBuf::from("../a.html"));
    }

    #[test]
    fn test_in_memory_relative_resolution() {
        let resolver = InMemoryResolver::new().with_source("site/components/card.html", "<article/>");

        let component = resolver
            .resolve(&import("../components/card.html"), Path::new("site/pages/index.html"))
            .unwrap();
        assert_eq!(component.source_path, PathBuf::from("site/components/card.html"));
        assert_eq!(component.content, "<article/>");

        let err = resolver
            .resolve(&import("./missing.html"), Path::new("site/pages/index.html"))
            .unwrap_err();
        assert!(matches!(err, ResolveError::NotFound { .. }));
    }

    #[test]
    fn test_fs_resolver_reads_relative_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("components")).unwrap();
        fs::write(dir.path().join("components/nav.html"), "<nav></nav>").unwrap();
        let page_path = dir.path().join("index.html");

        let component = FsComponentResolver
            .resolve(&import("./components/nav.html"), &page_path)
            .unwrap();
        assert_eq!(component.content, "<nav></nav>");
        assert!(component.source_path.ends_with("components/nav.html"));
    }

    #[test]
    fn test_inline_replaces_exact_selector_once() {
        let statement = "import \"./a.html\";";
        let mut page = Page::new(format!("<main>{}</main>", statement), vec![]);

        assert!(inline_component(&mut page, &import("./a.html"), "<p>A</p>"));
        assert_eq!(page.html_content, "<main><p>A</p></main>");
        assert!(!inline_component(&mut page, &import("./a.html"), "<p>A</p>"));
    }

    #[test]
    fn test_cycle_chain() {
        let mut stack = ImportStack::new();
        stack.push(PathBuf::from("index.html"));
        stack.push(PathBuf::from("a.html"));
        stack.push(PathBuf::from("b.html"));

        assert!(stack.contains(Path::new("a.html")));
        assert_eq!(
            stack.cycle_chain(Path::new("a.html")),
            "a.html -> b.html -> a.html"
        );
    }
}
