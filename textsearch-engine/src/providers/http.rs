//! Remote embedding provider over HTTP.
//!
//! Speaks the common `/v1/embeddings` JSON shape. The document-type tag is
//! forwarded as `task_type` for models that distinguish queries from
//! documents.

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use textsearch_core::traits::IEmbeddingProvider;
use textsearch_core::{DocumentType, TextSearchError, TextSearchResult};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub struct HttpProvider {
    client: reqwest::blocking::Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    dimensions: usize,
}

impl HttpProvider {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        dimensions: usize,
    ) -> TextSearchResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| TextSearchError::ConfigurationError {
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: None,
            model: model.into(),
            dimensions,
        })
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    fn provider_err(&self, reason: impl Into<String>) -> TextSearchError {
        TextSearchError::ProviderFailure {
            model: self.model.clone(),
            reason: reason.into(),
        }
    }
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingRow>,
}

#[derive(Deserialize)]
struct EmbeddingRow {
    embedding: Vec<f32>,
}

impl IEmbeddingProvider for HttpProvider {
    fn embed(&self, content: &str, document_type: DocumentType) -> TextSearchResult<Vec<f32>> {
        let body = serde_json::json!({
            "model": self.model,
            "input": content,
            "task_type": document_type.as_str(),
        });

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().map_err(|e| self.provider_err(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(self.provider_err(format!("HTTP {status}")));
        }

        let parsed: EmbeddingsResponse = response
            .json()
            .map_err(|e| self.provider_err(format!("invalid response: {e}")))?;

        let row = parsed
            .data
            .into_iter()
            .next()
            .ok_or_else(|| self.provider_err("empty embedding response"))?;

        if row.embedding.len() != self.dimensions {
            return Err(self.provider_err(format!(
                "expected {} dimensions, got {}",
                self.dimensions,
                row.embedding.len()
            )));
        }

        debug!(model = %self.model, dims = row.embedding.len(), "embedding computed");
        Ok(row.embedding)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn is_available(&self) -> bool {
        true
    }
}
