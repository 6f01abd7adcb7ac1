//! OpenAI-compatible embedding provider.
//!
//! Implements [`EmbeddingProvider`] over `POST {base_url}/embeddings` with bearer auth.
//! Responses are validated for shape and dimension before being handed to callers.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::EmbeddingProvider;
use crate::config::EmbeddingConfig;

pub struct OpenAiEmbeddingProvider {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    dimensions: usize,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Deserialize)]
struct EmbeddingDatum {
    embedding: Vec<f32>,
}

impl OpenAiEmbeddingProvider {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .context("embedding API key is not configured (set OPENAI_API_KEY)")?;

        anyhow::ensure!(config.dimensions > 0, "embedding dimensions must be positive");

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .context("failed to build HTTP client")?;

        let endpoint = format!("{}/embeddings", config.base_url.trim_end_matches('/'));
        tracing::info!(endpoint = %endpoint, model = %config.model, "embedding provider configured");

        Ok(Self {
            client,
            endpoint,
            api_key,
            model: config.model.clone(),
            dimensions: config.dimensions,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest {
                model: &self.model,
                input: text,
            })
            .send()
            .await
            .with_context(|| format!("HTTP request failed for {}", self.endpoint))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("embedding request failed with HTTP {status}: {body}");
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .context("malformed embedding response")?;

        parse_embedding(parsed, self.dimensions)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Extract the first embedding and check its length.
fn parse_embedding(response: EmbeddingResponse, expected_dim: usize) -> Result<Vec<f32>> {
    let embedding = response
        .data
        .into_iter()
        .next()
        .map(|d| d.embedding)
        .context("embedding response contained no data")?;

    anyhow::ensure!(
        embedding.len() == expected_dim,
        "unexpected embedding length: {}, expected {expected_dim}",
        embedding.len()
    );
    anyhow::ensure!(
        embedding.iter().all(|x| x.is_finite()),
        "embedding contains non-finite values"
    );

    Ok(embedding)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(json: &str) -> EmbeddingResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn parses_first_embedding() {
        let parsed = parse_embedding(
            response(r#"{"data":[{"embedding":[0.1,0.2,0.3]}],"model":"m"}"#),
            3,
        )
        .unwrap();
        assert_eq!(parsed, vec![0.1, 0.2, 0.3]);
    }

    #[test]
    fn rejects_empty_data() {
        let err = parse_embedding(response(r#"{"data":[]}"#), 3).unwrap_err();
        assert!(err.to_string().contains("no data"));
    }

    #[test]
    fn rejects_wrong_length() {
        let err =
            parse_embedding(response(r#"{"data":[{"embedding":[0.1,0.2]}]}"#), 3).unwrap_err();
        assert!(err.to_string().contains("unexpected embedding length"));
    }

    #[test]
    fn endpoint_strips_trailing_slash() {
        let config = EmbeddingConfig {
            base_url: "http://localhost:1234/v1/".into(),
            api_key: Some("key".into()),
            ..Default::default()
        };
        let provider = OpenAiEmbeddingProvider::new(&config).unwrap();
        assert_eq!(provider.endpoint, "http://localhost:1234/v1/embeddings");
    }

    #[test]
    fn blank_key_is_rejected() {
        let config = EmbeddingConfig {
            api_key: Some("   ".into()),
            ..Default::default()
        };
        assert!(OpenAiEmbeddingProvider::new(&config).is_err());
    }
}
