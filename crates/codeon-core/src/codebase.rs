//! In-memory codebase assembled for a fix request.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Mapping of absolute file path to file content for one fix request.
///
/// Keys are unique; iteration order is the sorted path order, which keeps
/// the serialized request stable across runs over the same tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Codebase {
    files: BTreeMap<PathBuf, String>,
}

impl Codebase {
    /// Creates an empty codebase.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a file, replacing any previous content under the same path.
    pub fn insert(&mut self, path: PathBuf, content: String) {
        self.files.insert(path, content);
    }

    /// Content of the file at `path`, if it was loaded.
    pub fn get(&self, path: &Path) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    /// Whether `path` was part of this codebase.
    pub fn contains(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    /// Number of loaded files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether no file was loaded.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Iterates over (path, content) pairs in sorted path order.
    pub fn iter(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.files
            .iter()
            .map(|(path, content)| (path.as_path(), content.as_str()))
    }

    /// Loaded paths in sorted order.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.keys().map(PathBuf::as_path)
    }
}

impl FromIterator<(PathBuf, String)> for Codebase {
    fn from_iter<T: IntoIterator<Item = (PathBuf, String)>>(iter: T) -> Self {
        Self {
            files: iter.into_iter().collect(),
        }
    }
}
