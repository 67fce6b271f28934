//! Backup-guarded application of one file change.

use codeon_core::error::{CodeonError, Result};
use codeon_core::fix::FileChange;
use std::fs;
use std::path::{Path, PathBuf};

/// Suffix appended to the original path when writing the backup copy.
pub const BACKUP_SUFFIX: &str = ".backup_codeon";

/// Outcome of a successfully applied change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedChange {
    /// The file that was overwritten.
    pub path: PathBuf,
    /// Where the pre-change content was backed up.
    pub backup_path: PathBuf,
}

/// Applies one file change: backs up the current content to
/// `<path>.backup_codeon`, then overwrites the file with the proposed code.
///
/// The target must already exist; the fix workflow never creates files.
/// A failed backup aborts before the target is touched. A failed overwrite
/// is restored from the backup, so the original content survives either
/// way.
pub fn apply_file_change(change: &FileChange) -> Result<AppliedChange> {
    let path = Path::new(&change.file_path);
    if !path.exists() {
        return Err(CodeonError::file_access(
            change.file_path.clone(),
            "file does not exist; fixes only modify existing files",
        ));
    }

    let current = fs::read_to_string(path)
        .map_err(|err| CodeonError::file_access(change.file_path.clone(), err))?;

    let backup_path = backup_path_for(path);
    if backup_path.exists() {
        tracing::debug!(
            "Overwriting stale backup {} from an earlier run",
            backup_path.display()
        );
    }
    fs::write(&backup_path, &current)
        .map_err(|err| CodeonError::file_access(backup_path.display().to_string(), err))?;

    if let Err(write_err) = fs::write(path, &change.fixed_code) {
        return Err(match fs::copy(&backup_path, path) {
            Ok(_) => CodeonError::file_access(
                change.file_path.clone(),
                format!("write failed, original content restored from backup: {write_err}"),
            ),
            Err(restore_err) => CodeonError::file_access(
                change.file_path.clone(),
                format!(
                    "write failed ({write_err}) and restore failed ({restore_err}); \
                     original content is in {}",
                    backup_path.display()
                ),
            ),
        });
    }

    Ok(AppliedChange {
        path: path.to_path_buf(),
        backup_path,
    })
}

/// Backup location for `path`: the same file name with [`BACKUP_SUFFIX`]
/// appended.
pub fn backup_path_for(path: &Path) -> PathBuf {
    let mut os_string = path.as_os_str().to_os_string();
    os_string.push(BACKUP_SUFFIX);
    PathBuf::from(os_string)
}
