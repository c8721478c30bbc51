//! OpenAI embedding gateway.
//!
//! Talks to the `/embeddings` endpoint of any OpenAI-compatible API
//! (OpenAI, Azure OpenAI, local servers). Inputs are validated before the
//! request so that empty or oversized texts never reach the network.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use docqa_core::config::EmbeddingSettings;
use docqa_core::traits::Embedder;
use docqa_core::types::Embedding;
use docqa_core::{Error, Result};

use crate::http::{build_client, endpoint, post_json};

pub struct OpenAiEmbedder {
    client: Client,
    api_key: String,
    url: String,
    model: String,
    model_id: String,
    max_input_chars: usize,
}

impl OpenAiEmbedder {
    pub fn new(settings: &EmbeddingSettings, api_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: build_client(settings.timeout_secs)?,
            api_key: api_key.into(),
            url: endpoint(&settings.base_url, "embeddings"),
            model: settings.model.clone(),
            model_id: format!("openai:{}", settings.model),
            max_input_chars: settings.max_input_chars,
        })
    }

    fn validate_inputs(&self, texts: &[String]) -> Result<()> {
        for (i, text) in texts.iter().enumerate() {
            if text.trim().is_empty() {
                return Err(Error::InvalidInput(format!("text #{} is empty", i)));
            }
            let len = text.chars().count();
            if len > self.max_input_chars {
                return Err(Error::InvalidInput(format!(
                    "text #{} has {} characters (limit {})",
                    i, len, self.max_input_chars
                )));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.validate_inputs(texts)?;

        debug!(model = %self.model, inputs = texts.len(), "requesting embeddings");
        let request = EmbeddingsRequest { model: &self.model, input: texts };
        let response: EmbeddingsResponse =
            post_json(&self.client, &self.url, &self.api_key, &request, "embedding service").await?;

        // Sort by index to maintain input order
        let mut data = response.data;
        data.sort_by_key(|d| d.index);
        if data.len() != texts.len() || data.iter().enumerate().any(|(i, d)| d.index != i) {
            return Err(Error::unavailable(
                format!("embedding service returned {} vectors for {} inputs", data.len(), texts.len()),
                false,
            ));
        }

        let dim = data[0].embedding.len();
        if let Some(odd) = data.iter().find(|d| d.embedding.len() != dim) {
            return Err(Error::DimensionMismatch { expected: dim, actual: odd.embedding.len() });
        }

        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}

// -- OpenAI API request/response types --

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}
