use async_trait::async_trait;
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::{Chunk, Embedding, RetrievalResult};

/// Text to vector boundary. Implementations never retry on their own.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Stable identifier for the provider/model (e.g. `openai:text-embedding-ada-002`).
    fn model_id(&self) -> &str;

    /// One vector per input text, in input order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Embedding>>;

    async fn embed_one(&self, text: &str) -> Result<Embedding> {
        self.embed(&[text.to_string()])
            .await?
            .pop()
            .ok_or_else(|| Error::unavailable(format!("{} returned no embedding", self.model_id()), false))
    }
}

/// (context, question) to answer boundary.
#[async_trait]
pub trait Generator: Send + Sync {
    fn model_id(&self) -> &str;
    async fn generate(&self, context: &str, question: &str) -> Result<String>;
}

/// Nearest-neighbour store of chunks and their vectors.
pub trait VectorIndex: Send + Sync {
    fn insert_batch(&mut self, chunks: Vec<Chunk>, vectors: Vec<Embedding>) -> Result<()>;
    fn search(&self, query: &[f32], k: usize) -> Result<RetrievalResult>;
    fn len(&self) -> usize;
    fn dim(&self) -> Option<usize>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Extracts the ordered page texts of a document.
pub trait DocumentLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<Vec<String>>;
}
