//! Parallel, deterministic file discovery with efficient directory pruning.
//!
//! Three discovery modes feed the analysis:
//! - `.rs` source files for the program model
//! - configuration-extension files for the textual usage fallback
//! - crate roots for the directory-scan side of project discovery
//!
//! All use early subtree pruning via `WalkDir::filter_entry`; the source
//! scan additionally runs its per-entry checks through Rayon's `par_bridge`.

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Directories to exclude by default (standard Rust project conventions).
const EXCLUDED_DIRS: &[&str] = &["target", ".git", "node_modules", ".cargo"];

/// Checks if a directory entry should be pruned (excluded from traversal).
#[inline]
fn is_excluded_dir(entry: &walkdir::DirEntry, excludes: &HashSet<&str>) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| excludes.contains(name))
}

/// A subdirectory carrying its own Cargo.toml is a separate crate; its
/// sources belong to that crate's scan, not the enclosing one.
fn is_nested_crate_root(entry: &walkdir::DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry.path().join("Cargo.toml").exists()
}

/// Gathers the .rs files belonging to the crate rooted at `root`.
///
/// Automatically excludes `target/`, `.git/`, `node_modules/`, and `.cargo/`,
/// plus any subdirectory that is itself a crate root (those files are
/// gathered under their own crate, never double-counted here). Subtrees are
/// skipped in O(1) before iteration descends into them.
pub fn gather_rs_files(root: &Path) -> Result<Vec<PathBuf>> {
    let excludes: HashSet<&str> = EXCLUDED_DIRS.iter().copied().collect();

    WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| !is_excluded_dir(e, &excludes) && !is_nested_crate_root(e))
        .par_bridge()
        .filter_map(|entry| match entry {
            Ok(e) => {
                let path = e.path();
                if path.is_file() && path.extension().is_some_and(|ext| ext == "rs") {
                    Some(Ok(path.to_path_buf()))
                } else {
                    None
                }
            }
            Err(e) => Some(Err(e.into())),
        })
        .collect::<Result<Vec<_>>>()
        .context(format!("Failed to gather .rs files from {}", root.display()))
}

/// Gathers every file under `root` whose extension matches one of the
/// configured configuration-file extensions (e.g. `conf`, `toml`).
///
/// This feeds the textual usage fallback of the unused-type detector: a
/// qualified type name appearing verbatim in any of these files keeps the
/// type alive. Walk errors on individual entries are skipped rather than
/// failing the whole enumeration (the fallback is best-effort).
pub fn gather_config_files(root: &Path, extensions: &[String]) -> Vec<PathBuf> {
    let excludes: HashSet<&str> = EXCLUDED_DIRS.iter().copied().collect();
    let wanted: HashSet<&str> = extensions.iter().map(|s| s.as_str()).collect();

    WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| !is_excluded_dir(e, &excludes))
        .filter_map(|entry| entry.ok())
        .filter(|e| {
            let path = e.path();
            path.is_file()
                && path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| wanted.contains(ext))
        })
        .map(|e| e.path().to_path_buf())
        .collect()
}

/// Gathers every directory under `root` that carries a `Cargo.toml`, the
/// root itself included. This is the directory-scan side of project
/// discovery, used when `cargo metadata` is unavailable; nesting depth is
/// unrestricted (`crates/foo/` layouts included). Sorted for determinism.
pub fn gather_crate_roots(root: &Path) -> Vec<PathBuf> {
    let excludes: HashSet<&str> = EXCLUDED_DIRS.iter().copied().collect();

    let mut roots: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| !is_excluded_dir(e, &excludes))
        .filter_map(|entry| entry.ok())
        .filter(|e| e.file_type().is_file() && e.file_name() == "Cargo.toml")
        .filter_map(|e| e.path().parent().map(Path::to_path_buf))
        .collect();
    roots.sort();
    roots
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn create_tree(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("actorlint_scan_{}_{}", name, std::process::id()));
        if dir.exists() {
            fs::remove_dir_all(&dir).ok();
        }
        fs::create_dir_all(dir.join("src")).unwrap();
        fs::create_dir_all(dir.join("target/debug")).unwrap();
        fs::write(dir.join("src/lib.rs"), "").unwrap();
        fs::write(dir.join("src/messages.rs"), "").unwrap();
        fs::write(dir.join("target/debug/junk.rs"), "").unwrap();
        fs::write(dir.join("app.conf"), "").unwrap();
        fs::write(dir.join("Cargo.toml"), "[package]\nname = \"t\"").unwrap();
        dir
    }

    #[test]
    fn test_gather_rs_files_prunes_target() {
        let dir = create_tree("rs");
        let files = gather_rs_files(&dir).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| !f.starts_with(dir.join("target"))));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_gather_config_files_by_extension() {
        let dir = create_tree("conf");
        let files = gather_config_files(&dir, &["conf".to_string()]);
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("app.conf"));

        let files = gather_config_files(&dir, &["conf".to_string(), "toml".to_string()]);
        assert_eq!(files.len(), 2);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_gather_rs_files_skips_nested_crates() {
        let dir = create_tree("nested");
        fs::create_dir_all(dir.join("helper/src")).unwrap();
        fs::write(dir.join("helper/Cargo.toml"), "[package]\nname = \"helper\"").unwrap();
        fs::write(dir.join("helper/src/lib.rs"), "").unwrap();

        let files = gather_rs_files(&dir).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| !f.starts_with(dir.join("helper"))));

        let nested = gather_rs_files(&dir.join("helper")).unwrap();
        assert_eq!(nested.len(), 1);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_gather_crate_roots_is_recursive() {
        let dir = create_tree("roots");
        fs::create_dir_all(dir.join("crates/deep/src")).unwrap();
        fs::write(
            dir.join("crates/deep/Cargo.toml"),
            "[package]\nname = \"deep\"",
        )
        .unwrap();

        let roots = gather_crate_roots(&dir);
        assert_eq!(roots, vec![dir.clone(), dir.join("crates/deep")]);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_gather_config_files_missing_root() {
        let files = gather_config_files(Path::new("/nonexistent/actorlint"), &["conf".to_string()]);
        assert!(files.is_empty());
    }
}
