//! Codebase loading for the fix workflow.
//!
//! Walks a file or directory, keeps files whose extension is on the
//! allow-list, and reads their content keyed by absolute path. Unreadable
//! entries are skipped and reported, never fatal to the overall load.

use codeon_core::codebase::Codebase;
use codeon_core::error::{CodeonError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File extensions eligible for the fix workflow.
pub const ALLOWED_EXTENSIONS: &[&str] = &[
    "py", "js", "ts", "java", "c", "cpp", "h", "hpp", "cs", "go", "rb", "php", "html", "css",
    "json", "xml", "yaml", "yml", "md", "txt",
];

/// Loader that assembles an in-memory [`Codebase`] from a path.
pub struct CodebaseLoader {
    root: PathBuf,
}

impl CodebaseLoader {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Loads the file or directory tree at the root path.
    ///
    /// A single file is included only when its extension is allowed; a
    /// directory is walked recursively with the same filter per file.
    /// Files that cannot be read (permissions, non-UTF-8 content) are
    /// skipped with a warning. Symlinked directories are not followed.
    ///
    /// # Returns
    ///
    /// - `Ok(Codebase)`: the loaded files, possibly empty
    /// - `Err(_)`: the root path itself does not exist or is not accessible
    pub fn load(&self) -> Result<Codebase> {
        let metadata = fs::metadata(&self.root)
            .map_err(|err| CodeonError::file_access(self.root.display().to_string(), err))?;

        let mut codebase = Codebase::new();
        if metadata.is_file() {
            self.load_single_file(&mut codebase);
        } else if metadata.is_dir() {
            self.load_directory(&mut codebase);
        } else {
            return Err(CodeonError::file_access(
                self.root.display().to_string(),
                "not a regular file or directory",
            ));
        }

        tracing::info!("Loaded {} code files from {}", codebase.len(), self.root.display());
        Ok(codebase)
    }

    fn load_single_file(&self, codebase: &mut Codebase) {
        if !has_allowed_extension(&self.root) {
            tracing::warn!(
                "Skipping {}: not a recognized code file extension",
                self.root.display()
            );
            return;
        }
        read_into(&self.root, codebase);
    }

    fn load_directory(&self, codebase: &mut Codebase) {
        for entry in WalkDir::new(&self.root) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!("Failed to read directory entry: {err}");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            if !has_allowed_extension(entry.path()) {
                continue;
            }
            read_into(entry.path(), codebase);
        }
    }
}

/// Check if the file's extension is on the allow-list.
pub fn has_allowed_extension(path: &Path) -> bool {
    if let Some(ext) = path.extension().and_then(|ext| ext.to_str()) {
        let ext = ext.to_lowercase();
        return ALLOWED_EXTENSIONS.iter().any(|candidate| candidate == &ext);
    }
    false
}

/// Reads one file and inserts it under its absolute path. Read failures
/// are reported and skipped.
fn read_into(path: &Path, codebase: &mut Codebase) {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            tracing::warn!("Skipping unreadable file {}: {err}", path.display());
            return;
        }
    };
    match std::path::absolute(path) {
        Ok(absolute) => codebase.insert(absolute, content),
        Err(err) => {
            tracing::warn!("Skipping {}: cannot resolve absolute path: {err}", path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn directory_load_keeps_only_allowed_extensions() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.py"), "print('a')").unwrap();
        fs::write(dir.path().join("a.bin"), [0u8, 159, 146, 150]).unwrap();

        let codebase = CodebaseLoader::new(dir.path()).load().unwrap();

        assert_eq!(codebase.len(), 1);
        let expected = std::path::absolute(dir.path().join("a.py")).unwrap();
        assert_eq!(codebase.get(&expected), Some("print('a')"));
    }

    #[test]
    fn directory_load_recurses() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src/nested")).unwrap();
        fs::write(dir.path().join("src/main.rs"), "fn main() {}").unwrap();
        fs::write(dir.path().join("src/nested/util.py"), "x = 1").unwrap();
        fs::write(dir.path().join("notes.md"), "# notes").unwrap();

        let codebase = CodebaseLoader::new(dir.path()).load().unwrap();

        // .rs is deliberately not on the allow-list; .py and .md are.
        assert_eq!(codebase.len(), 2);
    }

    #[test]
    fn single_allowed_file_loads() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("script.py");
        fs::write(&file, "pass").unwrap();

        let codebase = CodebaseLoader::new(&file).load().unwrap();

        assert_eq!(codebase.len(), 1);
        let expected = std::path::absolute(&file).unwrap();
        assert_eq!(codebase.get(&expected), Some("pass"));
    }

    #[test]
    fn single_disallowed_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("image.png");
        fs::write(&file, "not really an image").unwrap();

        let codebase = CodebaseLoader::new(&file).load().unwrap();
        assert!(codebase.is_empty());
    }

    #[test]
    fn uppercase_extension_is_recognized() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("LEGACY.PY");
        fs::write(&file, "pass").unwrap();

        let codebase = CodebaseLoader::new(&file).load().unwrap();
        assert_eq!(codebase.len(), 1);
    }

    #[test]
    fn nonexistent_path_is_an_error() {
        let err = CodebaseLoader::new("/definitely/not/here").load().unwrap_err();
        assert!(err.is_file_access());
    }

    #[test]
    fn non_utf8_file_is_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("ok.py"), "fine").unwrap();
        fs::write(dir.path().join("bad.txt"), [0xff, 0xfe, 0x00, 0x41]).unwrap();

        let codebase = CodebaseLoader::new(dir.path()).load().unwrap();
        assert_eq!(codebase.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_file_is_skipped_not_fatal() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("ok.py"), "fine").unwrap();
        let locked = dir.path().join("locked.py");
        fs::write(&locked, "secret").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::read_to_string(&locked).is_ok() {
            // Permission bits do not apply when running as root.
            return;
        }

        let codebase = CodebaseLoader::new(dir.path()).load().unwrap();

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();
        assert_eq!(codebase.len(), 1);
    }

    #[test]
    fn extension_predicate_handles_dotfiles_and_missing_extensions() {
        assert!(!has_allowed_extension(Path::new("Makefile")));
        assert!(!has_allowed_extension(Path::new(".gitignore")));
        assert!(has_allowed_extension(Path::new("read.me.txt")));
    }
}
