//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use venndex::Store;

/// Builder for directory trees to index
pub struct TreeBuilder {
    temp_dir: TempDir,
}

impl TreeBuilder {
    /// Create a new builder with an empty root directory
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self { temp_dir }
    }

    /// Get the root of the tree
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Add a file at `relative` with the given content, creating parent directories
    pub fn with_file(self, relative: &str, content: impl AsRef<[u8]>) -> Self {
        let path = self.temp_dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        fs::write(&path, content).expect("Failed to write file");
        self
    }

    /// Add a Takeout photo with its `.json` sidecar recording `taken` as capture time
    pub fn with_photo(self, relative: &str, content: impl AsRef<[u8]>, taken: i64) -> Self {
        let sidecar = format!(
            r#"{{"title": "{relative}", "photoTakenTime": {{"timestamp": "{taken}"}}}}"#
        );
        self.with_file(relative, content).with_file(&format!("{relative}.json"), sidecar)
    }

    /// Absolute, canonical path of a file in the tree, as the indexer records it
    pub fn recorded(&self, relative: &str) -> String {
        let root = fs::canonicalize(self.temp_dir.path()).expect("Failed to canonicalize root");
        root.join(relative).to_string_lossy().into_owned()
    }

    /// Build and return the temp directory (consumes self)
    pub fn build(self) -> TempDir {
        self.temp_dir
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A fresh store in its own temp directory
pub struct TestStore {
    pub dir: TempDir,
    pub store: Store,
}

impl TestStore {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = Store::initialize(dir.path().join("venndex.db")).expect("Failed to init store");
        Self { dir, store }
    }

    pub fn db_path(&self) -> PathBuf {
        self.dir.path().join("venndex.db")
    }
}

impl Default for TestStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Relative paths of every regular file under `root`, sorted
pub fn files_under(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().strip_prefix(root).unwrap().to_path_buf())
        .collect();
    files.sort();
    files
}
