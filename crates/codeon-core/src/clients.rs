//! Boundary traits for the external retrieval and generation services.
//!
//! These traits decouple the conversation and fix workflows from the
//! concrete backends (HTTP snippet search, hosted LLM). Implementations
//! live in the interaction crate; tests substitute recording fakes.

use crate::error::Result;
use async_trait::async_trait;

/// Output shape constraint for a generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    /// Plain prose; no structural guarantee.
    #[default]
    FreeText,
    /// The service is instructed to emit a machine-parseable JSON document.
    StructuredJson,
}

/// Tuning knobs for a single generation request.
///
/// `None` fields leave the backend's own default in effect.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateOptions {
    /// Sampling temperature; lower values make output more deterministic.
    pub temperature: Option<f32>,
    /// Hard cap on response length in tokens.
    pub max_output_tokens: Option<u32>,
    /// Requested output shape.
    pub response_format: ResponseFormat,
}

impl GenerateOptions {
    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets the output token cap.
    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = Some(max_output_tokens);
        self
    }

    /// Sets the requested output shape.
    pub fn with_response_format(mut self, response_format: ResponseFormat) -> Self {
        self.response_format = response_format;
        self
    }
}

/// An abstract client for the hosted text-generation service.
///
/// # Errors
///
/// Implementations signal:
/// - [`CodeonError::ServiceUnavailable`](crate::CodeonError::ServiceUnavailable)
///   when the backend is unreachable, overloaded, or rate limited
/// - [`CodeonError::ResponseTruncated`](crate::CodeonError::ResponseTruncated)
///   when the response hit `max_output_tokens`
/// - [`CodeonError::MalformedOutput`](crate::CodeonError::MalformedOutput)
///   when `StructuredJson` was requested but the reply is not JSON
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Sends `prompt` to the generation service and returns the response text.
    ///
    /// # Arguments
    ///
    /// * `prompt` - The fully assembled prompt
    /// * `options` - Per-request tuning; [`GenerateOptions::default`] for
    ///   free-text generation with backend defaults
    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<String>;
}

/// An abstract client for the external similarity-search service.
///
/// Retrieval is best effort: an empty result is a valid, non-error outcome
/// and callers must not treat it as a failure.
#[async_trait]
pub trait RetrievalClient: Send + Sync {
    /// Returns up to `k` text snippets relevant to `query`, ranked by
    /// decreasing relevance.
    ///
    /// # Returns
    ///
    /// - `Ok(snippets)`: zero or more snippets, best match first
    /// - `Err(_)`: the backend could not be reached; callers degrade to a
    ///   no-context turn rather than failing
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_are_free_text_with_no_overrides() {
        let options = GenerateOptions::default();
        assert_eq!(options.temperature, None);
        assert_eq!(options.max_output_tokens, None);
        assert_eq!(options.response_format, ResponseFormat::FreeText);
    }

    #[test]
    fn builder_methods_set_fields() {
        let options = GenerateOptions::default()
            .with_temperature(0.1)
            .with_max_output_tokens(8192)
            .with_response_format(ResponseFormat::StructuredJson);

        assert_eq!(options.temperature, Some(0.1));
        assert_eq!(options.max_output_tokens, Some(8192));
        assert_eq!(options.response_format, ResponseFormat::StructuredJson);
    }
}
