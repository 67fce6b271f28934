//! Path resolution for CodeOn files.
//!
//! The transcript lives next to where the tool is run by default so every
//! project keeps its own history; the optional configuration file lives
//! under the user's config directory.

use codeon_core::error::{CodeonError, Result};
use std::path::PathBuf;

/// Default transcript file name, resolved relative to the working directory.
pub const HISTORY_FILE_NAME: &str = "chat_history.json";

/// Path resolution helpers for CodeOn.
///
/// # Directory Structure
///
/// ```text
/// ./chat_history.json          # Persisted transcript (per working directory)
/// ~/.config/codeon/            # Config directory
/// └── config.json              # API credential and service endpoints
/// ```
pub struct CodeonPaths;

impl CodeonPaths {
    /// Default location of the persisted transcript.
    pub fn default_history_path() -> PathBuf {
        PathBuf::from(HISTORY_FILE_NAME)
    }

    /// Location of the optional configuration file:
    /// `~/.config/codeon/config.json`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the home directory cannot be
    /// determined.
    pub fn config_file() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CodeonError::configuration("could not determine home directory"))?;
        Ok(home.join(".config").join("codeon").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_history_is_relative_to_cwd() {
        assert_eq!(
            CodeonPaths::default_history_path(),
            PathBuf::from("chat_history.json")
        );
    }

    #[test]
    fn config_file_lives_under_dot_config() {
        let path = CodeonPaths::config_file().unwrap();
        assert!(path.ends_with(".config/codeon/config.json"));
    }
}
