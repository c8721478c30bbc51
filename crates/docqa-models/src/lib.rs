//! Gateways to the external model services: text embedding and answer
//! generation, plus the prompt template shared by generators.

use std::sync::Arc;
use tracing::info;

use docqa_core::config::{EmbeddingProvider, EmbeddingSettings, GenerationSettings};
use docqa_core::traits::{Embedder, Generator};
use docqa_core::Result;

pub mod chat;
pub mod hash;
pub mod http;
pub mod openai;
pub mod prompt;

pub use chat::OpenAiChatGenerator;
pub use hash::HashEmbedder;
pub use openai::OpenAiEmbedder;
pub use prompt::PromptTemplate;

/// Embedder selected by `embedding.provider`.
pub fn get_default_embedder(settings: &EmbeddingSettings, api_key: &str) -> Result<Arc<dyn Embedder>> {
    match settings.provider {
        EmbeddingProvider::Hash => {
            info!(dim = settings.hash_dim, "using offline hash embedder");
            Ok(Arc::new(HashEmbedder::new(settings.hash_dim).with_max_input_chars(settings.max_input_chars)))
        }
        EmbeddingProvider::Openai => {
            info!(model = %settings.model, "using OpenAI embeddings");
            Ok(Arc::new(OpenAiEmbedder::new(settings, api_key)?))
        }
    }
}

pub fn get_default_generator(settings: &GenerationSettings, api_key: &str) -> Result<Arc<dyn Generator>> {
    info!(model = %settings.model, "using OpenAI chat completions");
    Ok(Arc::new(OpenAiChatGenerator::new(settings, api_key)?))
}
