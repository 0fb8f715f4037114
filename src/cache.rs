use crate::diagnostics::Diagnostic;
use crate::reactivity::ReactiveModel;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

/// A component after it went through the whole pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledComponent {
    pub html: String,
    pub model: ReactiveModel,
    /// Replayed on every cache hit so each invocation reports them
    pub diagnostics: Vec<Diagnostic>,
    /// Every component inlined into `html`, transitively
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

/// A nested component as it was when its importer was compiled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    pub path: PathBuf,
    pub hash: String,
}

impl Dependency {
    pub fn new(path: PathBuf, source: &str) -> Self {
        Self {
            path,
            hash: ComponentCache::compute_hash(source),
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct CacheEntry {
    pub hash: String,
    pub component: CompiledComponent,
}

/// Compiled components keyed by path, invalidated by source hash
pub struct ComponentCache {
    memory: Mutex<HashMap<PathBuf, CacheEntry>>,
    cache_dir: Option<PathBuf>,
}

impl ComponentCache {
    pub fn in_memory() -> Self {
        Self {
            memory: Mutex::new(HashMap::new()),
            cache_dir: None,
        }
    }

    /// Memory cache backed by JSON files under `cache_dir`
    pub fn persistent(cache_dir: PathBuf) -> Self {
        if !cache_dir.exists() {
            if let Err(e) = fs::create_dir_all(&cache_dir) {
                warn!("cannot create cache dir {}: {}", cache_dir.display(), e);
            }
        }
        Self {
            memory: Mutex::new(HashMap::new()),
            cache_dir: Some(cache_dir),
        }
    }

    pub fn compute_hash(source: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(source.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    fn get_cache_path(&self, file_path: &Path) -> Option<PathBuf> {
        // Create a stable file name for the cache entry
        let safe_name = file_path
            .to_string_lossy()
            .replace('/', "_")
            .replace('\\', "_")
            .replace(':', "_");
        self.cache_dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.json", safe_name)))
    }

    pub fn get(&self, file_path: &Path, source: &str) -> Option<CompiledComponent> {
        let current_hash = Self::compute_hash(source);

        if let Ok(memory) = self.memory.lock() {
            if let Some(entry) = memory.get(file_path) {
                if entry.hash == current_hash {
                    debug!("component cache hit for {}", file_path.display());
                    return Some(entry.component.clone());
                }
            }
        }

        let entry = self.read_disk(file_path)?;
        if entry.hash != current_hash {
            return None;
        }

        let component = entry.component.clone();
        if let Ok(mut memory) = self.memory.lock() {
            memory.insert(file_path.to_path_buf(), entry);
        }
        Some(component)
    }

    fn read_disk(&self, file_path: &Path) -> Option<CacheEntry> {
        let cache_path = self.get_cache_path(file_path)?;
        if !cache_path.exists() {
            return None;
        }

        let data = fs::read_to_string(&cache_path).ok()?;
        match serde_json::from_str(&data) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(
                    "component cache deserialization failed for {}: {}",
                    file_path.display(),
                    e
                );
                // Invalidate corrupt cache file
                fs::remove_file(cache_path).ok();
                None
            }
        }
    }

    pub fn set(&self, file_path: &Path, source: &str, component: CompiledComponent) {
        let entry = CacheEntry {
            hash: Self::compute_hash(source),
            component,
        };

        if let Some(cache_path) = self.get_cache_path(file_path) {
            if let Ok(data) = serde_json::to_string(&entry) {
                fs::write(cache_path, data).ok();
            }
        }

        if let Ok(mut memory) = self.memory.lock() {
            memory.insert(file_path.to_path_buf(), entry);
        }
    }
}

impl Default for ComponentCache {
    fn default() -> Self {
        Self::in_memory()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compiled(html: &str) -> CompiledComponent {
        CompiledComponent {
            html: html.to_string(),
            model: ReactiveModel::default(),
            diagnostics: vec![],
            dependencies: vec![],
        }
    }

    #[test]
    fn test_hash_mismatch_misses() {
        let cache = ComponentCache::in_memory();
        let path = Path::new("components/counter.html");
        cache.set(path, "<b>v1</b>", compiled("<b>v1</b>"));

        assert_eq!(cache.get(path, "<b>v1</b>").unwrap().html, "<b>v1</b>");
        assert!(cache.get(path, "<b>v2</b>").is_none());
    }

    #[test]
    fn test_persistent_cache_survives_new_instance() {
        let dir = tempfile::tempdir().unwrap();
        let path = Path::new("/site/components/header.html");

        ComponentCache::persistent(dir.path().to_path_buf()).set(
            path,
            "<header></header>",
            compiled("<header></header>"),
        );

        let fresh = ComponentCache::persistent(dir.path().to_path_buf());
        let hit = fresh.get(path, "<header></header>").unwrap();
        assert_eq!(hit.html, "<header></header>");
    }

    #[test]
    fn test_corrupt_cache_file_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ComponentCache::persistent(dir.path().to_path_buf());
        let path = Path::new("broken.html");
        let cache_path = cache.get_cache_path(path).unwrap();
        fs::write(&cache_path, "{ not json").unwrap();

        assert!(cache.get(path, "anything").is_none());
        assert!(!cache_path.exists());
    }
}
