use std::sync::Arc;
use tracing::debug;

use docqa_core::traits::{Embedder, VectorIndex};
use docqa_core::types::RetrievalResult;
use docqa_core::{Error, Result};

use crate::retry::RetryPolicy;

/// Question to top-k chunks. Holds a read-only handle on a built index, so
/// one retriever can serve several queries at once.
#[derive(Clone)]
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    retry: RetryPolicy,
    default_k: usize,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<dyn VectorIndex>, retry: RetryPolicy, default_k: usize) -> Self {
        Self { embedder, index, retry, default_k }
    }

    pub fn default_k(&self) -> usize {
        self.default_k
    }

    pub fn index(&self) -> &dyn VectorIndex {
        self.index.as_ref()
    }

    /// Embeds `question` and returns the `k` most similar chunks
    /// (`default_k` when `k` is `None`).
    pub async fn retrieve(&self, question: &str, k: Option<usize>) -> Result<RetrievalResult> {
        if question.trim().is_empty() {
            return Err(Error::InvalidInput("question is empty".into()));
        }
        let k = k.unwrap_or(self.default_k);
        let query = self.retry.execute("embed question", || self.embedder.embed_one(question)).await?;
        let hits = self.index.search(&query, k)?;
        debug!(k, hits = hits.len(), top_score = hits.first().map(|h| h.score), "retrieved");
        Ok(hits)
    }
}
