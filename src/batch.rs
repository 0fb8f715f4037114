use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::compiler::{CompileOutput, Compiler};
use crate::config::CompilerConfig;
use crate::diagnostics::Diagnostic;

/// Recursively find every page file under `dir`, sorted by path
pub fn discover_pages(dir: &Path, config: &CompilerConfig) -> Vec<PathBuf> {
    let mut pages = Vec::new();

    for entry in WalkDir::new(dir).follow_links(true) {
        match entry {
            Ok(entry) => {
                let path = entry.path();
                if path.is_file() && config.is_page_extension(path) {
                    pages.push(path.to_path_buf());
                }
            }
            Err(e) => warn!("skipping unreadable entry under {}: {}", dir.display(), e),
        }
    }

    pages.sort();
    pages
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult {
    pub file_path: PathBuf,
    pub output: Option<CompileOutput>,
    /// Host-level failure for this page, if it could not be compiled at all
    pub fatal: Option<Diagnostic>,
}

#[derive(Debug, Serialize)]
pub struct BatchOutput {
    pub pages: Vec<PageResult>,
}

impl BatchOutput {
    /// All diagnostics of the batch in input order, fatal failures included
    pub fn errors(&self) -> Vec<&Diagnostic> {
        self.pages
            .iter()
            .flat_map(|p| {
                p.fatal
                    .iter()
                    .chain(p.output.iter().flat_map(|o| o.errors.iter()))
            })
            .collect()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors().is_empty()
    }
}

impl Compiler {
    /// Compile every path in parallel. Pages never share variables or
    /// diagnostics; the result keeps the order of `paths`.
    pub fn compile_batch(&self, paths: &[PathBuf]) -> BatchOutput {
        let pages: Vec<PageResult> = paths
            .par_iter()
            .map(|path| match self.compile_file(path) {
                Ok(output) => PageResult {
                    file_path: path.clone(),
                    output: Some(output),
                    fatal: None,
                },
                Err(e) => PageResult {
                    file_path: path.clone(),
                    output: None,
                    fatal: Some(Diagnostic::fatal(&path.to_string_lossy(), &e)),
                },
            })
            .collect();

        info!(pages = pages.len(), "compiled batch");
        BatchOutput { pages }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_discover_pages_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("blog")).unwrap();
        fs::write(dir.path().join("index.html"), "").unwrap();
        fs::write(dir.path().join("blog/post.htm"), "").unwrap();
        fs::write(dir.path().join("style.css"), "").unwrap();

        let pages = discover_pages(dir.path(), &CompilerConfig::default());

        assert_eq!(
            pages,
            vec![dir.path().join("blog/post.htm"), dir.path().join("index.html")]
        );
    }

    #[test]
    fn test_batch_isolates_pages_and_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.html");
        let b = dir.path().join("b.html");
        fs::write(
            &a,
            "<script compiled>var count = 0;</script><p :text=\"count\"></p>",
        )
        .unwrap();
        // `count` is declared only in a.html
        fs::write(&b, "<p :text=\"count\"></p>").unwrap();
        let missing = dir.path().join("gone.html");

        let batch = Compiler::default().compile_batch(&[a.clone(), b.clone(), missing.clone()]);

        let order: Vec<_> = batch.pages.iter().map(|p| p.file_path.clone()).collect();
        assert_eq!(order, vec![a, b.clone(), missing.clone()]);
        assert!(batch.pages[0].output.as_ref().unwrap().is_ok());
        assert!(batch.pages[2].fatal.is_some());

        let errors = batch.errors();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].file_path, b.to_string_lossy());
        assert_eq!(errors[0].code, "UNRESOLVED_BINDING");
        assert_eq!(errors[1].file_path, missing.to_string_lossy());
        assert_eq!(errors[1].code, "HOST_ERROR");
        assert!(batch.has_errors());
    }
}
