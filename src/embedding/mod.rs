//! Text-to-vector embedding pipeline.
//!
//! Provides the [`EmbeddingProvider`] trait and an OpenAI-compatible HTTP
//! implementation. The provider is created via [`create_provider`] from configuration.

pub mod openai;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

/// Number of dimensions in the embedding vectors (text-embedding-3-small).
pub const EMBEDDING_DIM: usize = 1536;

/// Trait for embedding text into vectors.
///
/// Implementations produce vectors of exactly [`dimensions`](Self::dimensions) length and
/// fail rather than return a malformed vector.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text string into a vector.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Return the number of dimensions this provider produces.
    fn dimensions(&self) -> usize {
        EMBEDDING_DIM
    }
}

/// Create an embedding provider from config.
///
/// Currently only `"openai"` (any OpenAI-compatible `/embeddings` endpoint) is supported.
/// Returns an error if no API key is configured; callers run without a provider in that
/// case and vector-scored sources report `NotInitialized`.
pub fn create_provider(
    config: &crate::config::EmbeddingConfig,
) -> Result<Arc<dyn EmbeddingProvider>> {
    match config.provider.as_str() {
        "openai" => {
            let provider = openai::OpenAiEmbeddingProvider::new(config)?;
            Ok(Arc::new(provider))
        }
        other => anyhow::bail!("unknown embedding provider: {other}. Supported: openai"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EmbeddingConfig;

    #[test]
    fn unknown_provider_is_rejected() {
        let config = EmbeddingConfig {
            provider: "onnx".into(),
            ..Default::default()
        };
        let err = create_provider(&config).err().expect("should fail");
        assert!(err.to_string().contains("unknown embedding provider"));
    }

    #[test]
    fn openai_without_key_is_rejected() {
        let config = EmbeddingConfig {
            api_key: None,
            ..Default::default()
        };
        assert!(create_provider(&config).is_err());
    }

    #[test]
    fn openai_with_key_is_created() {
        let config = EmbeddingConfig {
            api_key: Some("sk-test".into()),
            dimensions: 8,
            ..Default::default()
        };
        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.dimensions(), 8);
    }
}
