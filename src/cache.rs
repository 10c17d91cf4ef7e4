//! Incremental cache for the batch CLI.
//!
//! An entry is keyed by the document path and stores the output together with
//! the hash of everything that produced it (source text and compile options).

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

use log::{trace, warn};

use crate::config::CompileOptions;
use crate::finalize::CompiledView;

#[derive(Serialize, Deserialize)]
pub struct CacheEntry {
    pub hash: String,
    pub view: CompiledView,
}

pub struct IncrementalCache {
    cache_dir: PathBuf,
}

impl IncrementalCache {
    pub fn new(cache_dir: &Path) -> Self {
        if !cache_dir.exists() {
            if let Err(e) = fs::create_dir_all(cache_dir) {
                warn!("cannot create cache directory {}: {}", cache_dir.display(), e);
            }
        }
        Self {
            cache_dir: cache_dir.to_path_buf(),
        }
    }

    pub fn compute_hash(source: &str, options: &CompileOptions) -> String {
        let mut hasher = Sha256::new();
        hasher.update(source.as_bytes());
        hasher.update([0u8]);
        // Serializing a plain struct of strings cannot fail.
        hasher.update(serde_json::to_vec(options).unwrap_or_default());
        format!("{:x}", hasher.finalize())
    }

    fn entry_path(&self, file_path: &Path) -> PathBuf {
        let safe_name = file_path
            .to_string_lossy()
            .replace(['/', '\\', ':'], "_");
        self.cache_dir.join(format!("{}.json", safe_name))
    }

    pub fn get(&self, file_path: &Path, source: &str, options: &CompileOptions) -> Option<CompiledView> {
        let cache_path = self.entry_path(file_path);
        let data = fs::read_to_string(&cache_path).ok()?;

        let entry: CacheEntry = match serde_json::from_str(&data) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("discarding corrupt cache entry for {}: {}", file_path.display(), e);
                fs::remove_file(cache_path).ok();
                return None;
            }
        };

        if entry.hash == Self::compute_hash(source, options) {
            trace!("cache hit for {}", file_path.display());
            Some(entry.view)
        } else {
            None
        }
    }

    pub fn set(&self, file_path: &Path, source: &str, options: &CompileOptions, view: &CompiledView) {
        let entry = CacheEntry {
            hash: Self::compute_hash(source, options),
            view: view.clone(),
        };
        let cache_path = self.entry_path(file_path);
        match serde_json::to_string(&entry) {
            Ok(data) => {
                if let Err(e) = fs::write(&cache_path, data) {
                    warn!("cannot write cache entry {}: {}", cache_path.display(), e);
                }
            }
            Err(e) => warn!("cannot serialize cache entry for {}: {}", file_path.display(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> CompiledView {
        CompiledView {
            class_name: "Hud".to_string(),
            code: "export default class Hud {\n}\n".to_string(),
        }
    }

    #[test]
    fn test_hit_miss_and_corrupt_entry() {
        let dir = std::env::temp_dir().join(format!("inscribe-cache-{}", std::process::id()));
        let cache = IncrementalCache::new(&dir);
        let options = CompileOptions::default();
        let file = Path::new("views/Hud.xml");

        assert!(cache.get(file, "<View/>", &options).is_none());
        cache.set(file, "<View/>", &options, &view());
        assert_eq!(cache.get(file, "<View/>", &options), Some(view()));
        assert!(cache.get(file, "<View name=\"x\"/>", &options).is_none());

        let mut other = CompileOptions::default();
        other.libraries.runtime = "../runtime".to_string();
        assert!(cache.get(file, "<View/>", &other).is_none());

        fs::write(cache.entry_path(file), "{ not json").unwrap();
        assert!(cache.get(file, "<View/>", &options).is_none());
        assert!(!cache.entry_path(file).exists());

        fs::remove_dir_all(&dir).ok();
    }
}
