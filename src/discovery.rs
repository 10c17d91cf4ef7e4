//! Discovery module for the view compiler.
//!
//! Finds view documents on disk for the batch CLI.

use std::path::{Path, PathBuf};

use log::{debug, warn};
use walkdir::WalkDir;

/// All files under `dir` with the given extension, sorted.
pub fn find_view_files(dir: &Path, extension: &str) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("skipping unreadable entry under {}: {}", dir.display(), e);
                continue;
            }
        };
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == extension) {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    debug!("found {} view documents under {}", files.len(), dir.display());
    files
}

/// Expands CLI inputs: files are taken as given, directories are scanned.
/// No inputs means the configured source directory.
pub fn collect_inputs(inputs: &[PathBuf], source_dir: &Path, extension: &str) -> Vec<PathBuf> {
    if inputs.is_empty() {
        return find_view_files(source_dir, extension);
    }

    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            files.extend(find_view_files(input, extension));
        } else {
            files.push(input.clone());
        }
    }
    files.sort();
    files.dedup();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_find_view_files_sorted_by_extension() {
        let root = std::env::temp_dir().join(format!("inscribe-discovery-{}", std::process::id()));
        fs::create_dir_all(root.join("b")).unwrap();
        fs::create_dir_all(root.join("a")).unwrap();
        fs::write(root.join("b").join("Menu.xml"), "<View/>").unwrap();
        fs::write(root.join("a").join("Hud.xml"), "<View/>").unwrap();
        fs::write(root.join("a").join("notes.txt"), "").unwrap();

        let files = find_view_files(&root, "xml");
        assert_eq!(
            files,
            vec![root.join("a").join("Hud.xml"), root.join("b").join("Menu.xml")]
        );

        let explicit = collect_inputs(
            &[root.join("b").join("Menu.xml"), root.clone()],
            Path::new("unused"),
            "xml",
        );
        assert_eq!(explicit.len(), 2);

        fs::remove_dir_all(&root).ok();
    }
}
