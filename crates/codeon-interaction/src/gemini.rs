//! Gemini text generation client.
//!
//! Speaks the `generateContent` REST endpoint. Transport failures and
//! retryable HTTP statuses map to [`CodeonError::ServiceUnavailable`];
//! everything else surfaces as [`CodeonError::Generation`].

use codeon_core::clients::{GenerateOptions, GenerationClient, ResponseFormat};
use codeon_core::error::{CodeonError, Result};
use codeon_core::fix::strip_code_fences;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::config::ApiConfig;

/// Model used when no override is configured.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Client for the Gemini generation API.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
}

// ============================================================================
// Request wire format
// ============================================================================

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(rename = "maxOutputTokens", skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(rename = "responseMimeType", skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
}

// ============================================================================
// Response wire format
// ============================================================================

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ContentResponse {
    parts: Option<Vec<PartResponse>>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: Option<ErrorBody>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl GeminiClient {
    /// Creates a client with the default model.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
        }
    }

    /// Overrides the model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Builds a client from resolved configuration.
    pub fn from_config(config: &ApiConfig) -> Self {
        let client = Self::new(config.api_key.clone());
        match &config.model {
            Some(model) => client.with_model(model.clone()),
            None => client,
        }
    }

    /// Returns the model this client will call.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{BASE_URL}/{}:generateContent?key={}",
            self.model, self.api_key
        )
    }
}

/// Translates per-request options into the wire config block. Returns
/// `None` when every field is at its default so the request stays minimal.
fn generation_config(options: &GenerateOptions) -> Option<GenerationConfig> {
    let response_mime_type = match options.response_format {
        ResponseFormat::FreeText => None,
        ResponseFormat::StructuredJson => Some("application/json".to_string()),
    };

    if options.temperature.is_none()
        && options.max_output_tokens.is_none()
        && response_mime_type.is_none()
    {
        return None;
    }

    Some(GenerationConfig {
        temperature: options.temperature,
        max_output_tokens: options.max_output_tokens,
        response_mime_type,
    })
}

/// Maps an HTTP error status to the error taxonomy. Overload and server
/// errors are retryable; everything else is a plain generation failure.
fn map_http_error(status: StatusCode, body: &str, retry_after: Option<u64>) -> CodeonError {
    let message = serde_json::from_str::<ErrorWrapper>(body)
        .ok()
        .and_then(|wrapper| wrapper.error)
        .and_then(|error| error.message)
        .map(|msg| format!("{}: {msg}", status.as_u16()))
        .unwrap_or_else(|| format!("{}: {body}", status.as_u16()));

    match status {
        StatusCode::TOO_MANY_REQUESTS
        | StatusCode::INTERNAL_SERVER_ERROR
        | StatusCode::BAD_GATEWAY
        | StatusCode::SERVICE_UNAVAILABLE
        | StatusCode::GATEWAY_TIMEOUT => match retry_after {
            Some(secs) => CodeonError::service_unavailable_with_retry("generation", message, secs),
            None => CodeonError::service_unavailable("generation", message),
        },
        _ => CodeonError::generation(Some(status.as_u16()), message),
    }
}

/// Reads a numeric `Retry-After` header. Date forms are ignored.
fn parse_retry_after(response: &reqwest::Response) -> Option<u64> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Pulls the generated text out of a decoded response.
fn extract_text(response: GenerateContentResponse, options: &GenerateOptions) -> Result<String> {
    let candidate = response
        .candidates
        .unwrap_or_default()
        .into_iter()
        .next()
        .ok_or_else(|| CodeonError::generation(None, "no candidates in response"))?;

    if candidate.finish_reason.as_deref() == Some("MAX_TOKENS") {
        return Err(CodeonError::truncated(options.max_output_tokens));
    }

    // Long outputs arrive split across several parts; join them all.
    let text: String = candidate
        .content
        .and_then(|content| content.parts)
        .into_iter()
        .flatten()
        .filter_map(|part| part.text)
        .collect();

    if text.is_empty() {
        return Err(CodeonError::generation(
            None,
            "no text in response candidates",
        ));
    }

    Ok(text)
}

#[async_trait::async_trait]
impl GenerationClient for GeminiClient {
    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<String> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: generation_config(options),
        };

        let response = self
            .client
            .post(self.endpoint())
            .json(&request)
            .send()
            .await
            .map_err(|err| {
                if err.is_connect() || err.is_timeout() {
                    CodeonError::service_unavailable(
                        "generation",
                        format!("failed to reach Gemini API: {err}"),
                    )
                } else {
                    CodeonError::generation(None, format!("failed to send request: {err}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = parse_retry_after(&response);
            let body = response.text().await.unwrap_or_default();
            return Err(map_http_error(status, &body, retry_after));
        }

        let decoded: GenerateContentResponse = response.json().await.map_err(|err| {
            CodeonError::generation(None, format!("failed to parse Gemini response: {err}"))
        })?;

        let text = extract_text(decoded, options)?;

        if options.response_format == ResponseFormat::StructuredJson {
            let candidate = strip_code_fences(&text);
            if serde_json::from_str::<serde_json::Value>(candidate).is_err() {
                return Err(CodeonError::malformed_output(
                    "structured JSON was requested but the response is not valid JSON",
                    &text,
                ));
            }
        }

        Ok(text)
    }
}
