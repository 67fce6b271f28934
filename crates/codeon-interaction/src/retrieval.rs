//! HTTP snippet-search client.
//!
//! Queries an external search service for code snippets relevant to a
//! question. The service is optional: when no endpoint is configured the
//! client is simply not constructed and callers fall back to answering
//! without code context.

use codeon_core::clients::RetrievalClient;
use codeon_core::error::{CodeonError, Result};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::config::ApiConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the snippet-search HTTP API.
#[derive(Clone)]
pub struct HttpRetrievalClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

#[derive(Deserialize)]
struct SnippetsResponse {
    snippets: Vec<String>,
}

impl HttpRetrievalClient {
    /// Creates a client for the given endpoint.
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            token,
        }
    }

    /// Builds a client from resolved configuration, or `None` when no
    /// endpoint is configured.
    pub fn from_config(config: &ApiConfig) -> Option<Self> {
        config
            .retrieval_url
            .as_ref()
            .map(|url| Self::new(url.clone(), config.retrieval_token.clone()))
    }
}

#[async_trait::async_trait]
impl RetrievalClient for HttpRetrievalClient {
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<String>> {
        let url = format!("{}/search", self.base_url.trim_end_matches('/'));
        let k_param = k.to_string();

        let mut request = self
            .client
            .get(&url)
            .query(&[("q", query), ("k", k_param.as_str())])
            .timeout(REQUEST_TIMEOUT);

        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        let response = request.send().await.map_err(|err| {
            CodeonError::service_unavailable(
                "retrieval",
                format!("failed to reach snippet search service: {err}"),
            )
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CodeonError::service_unavailable(
                "retrieval",
                format!("snippet search error ({}): {body}", status.as_u16()),
            ));
        }

        let decoded: SnippetsResponse = response.json().await.map_err(|err| {
            CodeonError::service_unavailable(
                "retrieval",
                format!("failed to parse snippet search response: {err}"),
            )
        })?;

        let mut snippets = decoded.snippets;
        snippets.truncate(k);
        Ok(snippets)
    }
}
