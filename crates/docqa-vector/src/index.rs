use tracing::debug;

use docqa_core::traits::VectorIndex;
use docqa_core::types::{Chunk, Embedding, EntryId, IndexedEntry, RetrievalResult};
use docqa_core::{Error, Result};

use crate::search::top_k;

/// Append-only index held entirely in memory.
///
/// The dimensionality is fixed by [`InMemoryIndex::with_dim`] or by the
/// first non-empty insert; every later vector and query must match it.
/// Entry ids are assigned sequentially from 0 in insertion order.
#[derive(Debug, Default, Clone)]
pub struct InMemoryIndex {
    dim: Option<usize>,
    entries: Vec<IndexedEntry>,
    next_id: EntryId,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dim(dim: usize) -> Self {
        Self { dim: Some(dim), ..Self::default() }
    }

    pub fn entries(&self) -> &[IndexedEntry] {
        &self.entries
    }

    fn check_dim(&self, expected: usize, actual: usize) -> Result<()> {
        if expected != actual {
            return Err(Error::DimensionMismatch { expected, actual });
        }
        Ok(())
    }
}

impl VectorIndex for InMemoryIndex {
    /// All-or-nothing: the batch is validated before anything is stored.
    fn insert_batch(&mut self, chunks: Vec<Chunk>, vectors: Vec<Embedding>) -> Result<()> {
        if chunks.len() != vectors.len() {
            return Err(Error::LengthMismatch { chunks: chunks.len(), vectors: vectors.len() });
        }
        let Some(first) = vectors.first() else {
            return Ok(());
        };
        let dim = self.dim.unwrap_or(first.len());
        if dim == 0 {
            return Err(Error::InvalidInput("embedding vectors must not be empty".to_string()));
        }
        for v in &vectors {
            self.check_dim(dim, v.len())?;
        }

        self.dim = Some(dim);
        for (chunk, vector) in chunks.into_iter().zip(vectors) {
            self.entries.push(IndexedEntry { id: self.next_id, chunk, vector });
            self.next_id += 1;
        }
        debug!(entries = self.entries.len(), dim, "inserted batch");
        Ok(())
    }

    fn search(&self, query: &[f32], k: usize) -> Result<RetrievalResult> {
        if let Some(dim) = self.dim {
            self.check_dim(dim, query.len())?;
        }
        Ok(top_k(&self.entries, query, k))
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn dim(&self) -> Option<usize> {
        self.dim
    }
}
