//! Configuration for the external service clients.
//!
//! The generation API key is required at startup; everything else is
//! optional. Values come from environment variables first, then from
//! `~/.config/codeon/config.json`.

use codeon_core::error::{CodeonError, Result};
use codeon_infrastructure::paths::CodeonPaths;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

/// Environment variable holding the generation API key.
pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";
/// Environment variable overriding the generation model name.
pub const MODEL_ENV: &str = "CODEON_GEMINI_MODEL";
/// Environment variable pointing at the snippet-search service.
pub const RETRIEVAL_URL_ENV: &str = "CODEON_RETRIEVAL_URL";
/// Environment variable holding the snippet-search bearer token.
pub const RETRIEVAL_TOKEN_ENV: &str = "CODEON_RETRIEVAL_TOKEN";

/// Resolved client configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Generation service API key.
    pub api_key: String,
    /// Generation model override; the client default applies when `None`.
    pub model: Option<String>,
    /// Snippet-search endpoint; retrieval is disabled when `None`.
    pub retrieval_url: Option<String>,
    /// Optional bearer token for the snippet-search endpoint.
    pub retrieval_token: Option<String>,
}

/// On-disk shape of `~/.config/codeon/config.json`. All keys optional.
#[derive(Debug, Clone, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    retrieval_url: Option<String>,
    #[serde(default)]
    retrieval_token: Option<String>,
}

/// Environment snapshot, captured once so resolution is a pure merge.
#[derive(Debug, Clone, Default)]
struct EnvValues {
    api_key: Option<String>,
    model: Option<String>,
    retrieval_url: Option<String>,
    retrieval_token: Option<String>,
}

impl EnvValues {
    fn capture() -> Self {
        Self {
            api_key: env::var(API_KEY_ENV).ok().filter(|v| !v.is_empty()),
            model: env::var(MODEL_ENV).ok().filter(|v| !v.is_empty()),
            retrieval_url: env::var(RETRIEVAL_URL_ENV).ok().filter(|v| !v.is_empty()),
            retrieval_token: env::var(RETRIEVAL_TOKEN_ENV).ok().filter(|v| !v.is_empty()),
        }
    }
}

impl ApiConfig {
    /// Loads configuration from the environment and the optional config
    /// file, environment winning on conflicts.
    ///
    /// # Errors
    ///
    /// - The config file exists but cannot be read or parsed
    /// - No API key was found in either source
    pub fn load() -> Result<Self> {
        let file = match CodeonPaths::config_file() {
            Ok(path) => read_file_config(&path)?,
            Err(err) => {
                tracing::debug!("Config file location unavailable: {err}");
                None
            }
        };
        Self::resolve(EnvValues::capture(), file.unwrap_or_default())
    }

    fn resolve(env: EnvValues, file: FileConfig) -> Result<Self> {
        let api_key = env.api_key.or(file.api_key).ok_or_else(|| {
            CodeonError::configuration(format!(
                "{API_KEY_ENV} not found in environment variables or config file"
            ))
        })?;

        Ok(Self {
            api_key,
            model: env.model.or(file.model),
            retrieval_url: env.retrieval_url.or(file.retrieval_url),
            retrieval_token: env.retrieval_token.or(file.retrieval_token),
        })
    }
}

/// Reads and parses the config file. A missing file is not an error; an
/// unreadable or unparseable one is, so a broken config never silently
/// degrades to defaults.
fn read_file_config(path: &Path) -> Result<Option<FileConfig>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path).map_err(|err| {
        CodeonError::configuration(format!(
            "failed to read configuration file at {}: {err}",
            path.display()
        ))
    })?;

    serde_json::from_str(&content).map(Some).map_err(|err| {
        CodeonError::configuration(format!(
            "failed to parse configuration file at {}: {err}",
            path.display()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_api_key_is_a_configuration_error() {
        let err = ApiConfig::resolve(EnvValues::default(), FileConfig::default()).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains(API_KEY_ENV));
    }

    #[test]
    fn environment_wins_over_file() {
        let env = EnvValues {
            api_key: Some("env-key".to_string()),
            model: None,
            retrieval_url: Some("https://env.example".to_string()),
            retrieval_token: None,
        };
        let file = FileConfig {
            api_key: Some("file-key".to_string()),
            model: Some("gemini-from-file".to_string()),
            retrieval_url: Some("https://file.example".to_string()),
            retrieval_token: Some("file-token".to_string()),
        };

        let config = ApiConfig::resolve(env, file).unwrap();
        assert_eq!(config.api_key, "env-key");
        assert_eq!(config.model.as_deref(), Some("gemini-from-file"));
        assert_eq!(config.retrieval_url.as_deref(), Some("https://env.example"));
        assert_eq!(config.retrieval_token.as_deref(), Some("file-token"));
    }

    #[test]
    fn file_alone_can_supply_everything() {
        let file = FileConfig {
            api_key: Some("file-key".to_string()),
            model: None,
            retrieval_url: None,
            retrieval_token: None,
        };

        let config = ApiConfig::resolve(EnvValues::default(), file).unwrap();
        assert_eq!(config.api_key, "file-key");
        assert_eq!(config.model, None);
        assert_eq!(config.retrieval_url, None);
    }

    #[test]
    fn file_config_tolerates_unknown_and_missing_keys() {
        let parsed: FileConfig =
            serde_json::from_str(r#"{"api_key": "k", "comment": "ignored"}"#).unwrap();
        assert_eq!(parsed.api_key.as_deref(), Some("k"));
        assert_eq!(parsed.model, None);
    }

    #[test]
    fn missing_file_reads_as_none() {
        let result = read_file_config(Path::new("/definitely/not/here.json")).unwrap();
        assert!(result.is_none());
    }
}
