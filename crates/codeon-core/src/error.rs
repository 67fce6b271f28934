//! Error types for the CodeOn application.

use thiserror::Error;

/// Maximum number of characters of raw model output carried in a
/// [`CodeonError::MalformedOutput`] for diagnosis.
const EXCERPT_LIMIT: usize = 500;

/// A shared error type for the entire CodeOn application.
///
/// This provides typed, structured error variants with constructor helpers
/// so callers can build errors without spelling out every field.
#[derive(Error, Debug, Clone)]
pub enum CodeonError {
    /// A backend service (retrieval or generation) is unreachable or overloaded
    #[error("{service} service unavailable: {reason}")]
    ServiceUnavailable {
        service: &'static str,
        reason: String,
        /// Seconds the backend asked us to wait, when it said so.
        retry_after_secs: Option<u64>,
    },

    /// The generation service stopped emitting output at its token cap
    #[error("response truncated by the output token limit")]
    ResponseTruncated { max_output_tokens: Option<u32> },

    /// Structured output was requested but the response does not decode
    #[error("malformed model output: {reason}")]
    MalformedOutput {
        reason: String,
        /// Leading excerpt of the raw response, bounded to keep messages readable.
        excerpt: String,
    },

    /// Persisted state on disk exists but does not decode
    #[error("malformed persisted state at {path}: {reason}")]
    MalformedPersistedState { path: String, reason: String },

    /// File system access failure (missing, unreadable, or unwritable file)
    #[error("file access error for {path}: {reason}")]
    FileAccess { path: String, reason: String },

    /// A fix proposal violated the expected schema
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration error (missing credential, bad config file)
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Generation request rejected for a reason that is none of the above
    #[error("generation request failed: {reason}")]
    Generation { status: Option<u16>, reason: String },
}

impl CodeonError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a ServiceUnavailable error without retry information
    pub fn service_unavailable(service: &'static str, reason: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            service,
            reason: reason.into(),
            retry_after_secs: None,
        }
    }

    /// Creates a ServiceUnavailable error carrying a server-suggested wait
    pub fn service_unavailable_with_retry(
        service: &'static str,
        reason: impl Into<String>,
        retry_after_secs: u64,
    ) -> Self {
        Self::ServiceUnavailable {
            service,
            reason: reason.into(),
            retry_after_secs: Some(retry_after_secs),
        }
    }

    /// Creates a ResponseTruncated error
    pub fn truncated(max_output_tokens: Option<u32>) -> Self {
        Self::ResponseTruncated { max_output_tokens }
    }

    /// Creates a MalformedOutput error, bounding the raw response excerpt
    pub fn malformed_output(reason: impl Into<String>, raw: &str) -> Self {
        Self::MalformedOutput {
            reason: reason.into(),
            excerpt: raw.chars().take(EXCERPT_LIMIT).collect(),
        }
    }

    /// Creates a MalformedPersistedState error
    pub fn malformed_state(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedPersistedState {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates a FileAccess error
    pub fn file_access(path: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::FileAccess {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates a Validation error
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation(reason.into())
    }

    /// Creates a Configuration error
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration(reason.into())
    }

    /// Creates a Generation error
    pub fn generation(status: Option<u16>, reason: impl Into<String>) -> Self {
        Self::Generation {
            status,
            reason: reason.into(),
        }
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a ServiceUnavailable error
    pub fn is_service_unavailable(&self) -> bool {
        matches!(self, Self::ServiceUnavailable { .. })
    }

    /// Check if this is a ResponseTruncated error
    pub fn is_truncated(&self) -> bool {
        matches!(self, Self::ResponseTruncated { .. })
    }

    /// Check if this is a MalformedOutput error
    pub fn is_malformed_output(&self) -> bool {
        matches!(self, Self::MalformedOutput { .. })
    }

    /// Check if this is a FileAccess error
    pub fn is_file_access(&self) -> bool {
        matches!(self, Self::FileAccess { .. })
    }

    /// Check if this is a Validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a Configuration error
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Check if retrying the same request later could plausibly succeed.
    ///
    /// Returns true for:
    /// - `ServiceUnavailable` (backend down or rate limited)
    /// - `ResponseTruncated` (a retry with a higher cap may complete)
    ///
    /// This helper centralizes the retryability decision so callers do not
    /// each match on variants.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ServiceUnavailable { .. } | Self::ResponseTruncated { .. }
        )
    }
}

/// A type alias for `Result<T, CodeonError>`.
pub type Result<T> = std::result::Result<T, CodeonError>;
