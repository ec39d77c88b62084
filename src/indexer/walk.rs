//! Repository enumeration shared by the chunk store and the call graph.
//!
//! Backed by the `ignore` walker: hidden files are visited, configured
//! directory names are pruned before descent, extra globs and the extension
//! allow-list filter files. Entries are sorted by file name so every walk
//! over an unchanged tree yields the same order.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use tracing::warn;

use super::IndexError;
use crate::config::Config;

/// A file selected for indexing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoFile {
    /// Absolute (or root-joined) location on disk.
    pub path: PathBuf,
    /// Repository-relative path with `/` separators.
    pub rel_path: String,
    /// Lowercased extension without the dot.
    pub extension: String,
}

/// Enumerate eligible files under `root`. `skip` names a file that must never
/// be returned, typically the index being written.
pub fn walk_repository(
    root: &Path,
    config: &Config,
    skip: Option<&Path>,
) -> Result<Vec<RepoFile>, IndexError> {
    if !root.is_dir() {
        return Err(IndexError::NotADirectory(root.to_path_buf()));
    }

    let globs = config
        .exclude_globs()
        .map_err(|e| IndexError::Config(format!("{e:#}")))?;
    let skip = skip.and_then(|p| std::fs::canonicalize(p).ok());

    let excluded_dirs = config.exclude_dirs.clone();
    let mut builder = WalkBuilder::new(root);
    builder
        .hidden(false)
        .parents(false)
        .git_ignore(config.respect_gitignore)
        .git_exclude(config.respect_gitignore)
        .git_global(config.respect_gitignore)
        .ignore(config.respect_gitignore)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |entry| {
            if entry.depth() == 0 {
                return true;
            }
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            !(is_dir
                && entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| excluded_dirs.iter().any(|d| d == name)))
        });

    let mut files = Vec::new();

    for result in builder.build() {
        let entry = match result {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {e}");
                continue;
            }
        };

        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }

        let path = entry.path();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        if !config.is_allowed_extension(&extension) {
            continue;
        }

        let rel_path = relative_path(root, path);
        if globs.is_match(&rel_path) {
            continue;
        }

        if let Some(skip) = &skip {
            if std::fs::canonicalize(path).is_ok_and(|p| &p == skip) {
                continue;
            }
        }

        files.push(RepoFile {
            path: path.to_path_buf(),
            rel_path,
            extension,
        });
    }

    Ok(files)
}

/// Repository-relative form of `path` with forward slashes.
pub fn relative_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn rel_paths(files: &[RepoFile]) -> Vec<&str> {
        files.iter().map(|f| f.rel_path.as_str()).collect()
    }

    #[test]
    fn test_walk_filters_and_sorts() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join("pkg")).unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::create_dir_all(root.join("node_modules/lib")).unwrap();
        fs::write(root.join("pkg/b.py"), "def b():\n    pass\n").unwrap();
        fs::write(root.join("pkg/a.py"), "def a():\n    pass\n").unwrap();
        fs::write(root.join("README.md"), "# Readme\n").unwrap();
        fs::write(root.join("logo.png"), [0u8, 1, 2]).unwrap();
        fs::write(root.join(".git/config.toml"), "[core]\n").unwrap();
        fs::write(root.join("node_modules/lib/index.js"), "function x() {}\n").unwrap();
        fs::write(root.join(".repo_index.json"), "[]").unwrap();

        let config = Config::default();
        let files =
            walk_repository(root, &config, Some(&root.join(".repo_index.json"))).unwrap();

        assert_eq!(rel_paths(&files), vec!["README.md", "pkg/a.py", "pkg/b.py"]);
        assert_eq!(files[1].extension, "py");
    }

    #[test]
    fn test_walk_applies_exclude_globs() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("static")).unwrap();
        fs::write(root.join("static/app.min.js"), "function a(){}\n").unwrap();
        fs::write(root.join("static/app.js"), "function a() {}\n").unwrap();

        let mut config = Config::default();
        config.exclude_patterns = vec!["**/*.min.js".to_string()];
        let files = walk_repository(root, &config, None).unwrap();

        assert_eq!(rel_paths(&files), vec!["static/app.js"]);
    }

    #[test]
    fn test_walk_rejects_missing_root() {
        let temp_dir = tempdir().unwrap();
        let err = walk_repository(&temp_dir.path().join("nope"), &Config::default(), None);
        assert!(matches!(err, Err(IndexError::NotADirectory(_))));
    }
}
