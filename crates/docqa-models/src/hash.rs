//! Offline embedder based on feature hashing.
//!
//! Deterministic and dependency-free at runtime, so development runs and
//! tests can exercise the whole pipeline without an embedding service.

use async_trait::async_trait;
use std::hash::{Hash, Hasher};
use twox_hash::XxHash64;

use docqa_core::traits::Embedder;
use docqa_core::types::Embedding;
use docqa_core::{Error, Result};

pub struct HashEmbedder {
    dim: usize,
    id: String,
    max_input_chars: Option<usize>,
}

impl HashEmbedder {
    pub fn new(dim: usize) -> Self {
        let dim = dim.max(1);
        Self { dim, id: format!("hash:d{}", dim), max_input_chars: None }
    }

    /// Rejects texts longer than `limit` characters, like the remote embedders do.
    pub fn with_max_input_chars(mut self, limit: usize) -> Self {
        self.max_input_chars = Some(limit);
        self
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// L2-normalised bag of hashed, lowercased word tokens.
    pub fn embed_text(&self, text: &str) -> Embedding {
        let mut v = vec![0f32; self.dim];
        let tokens = text
            .split_whitespace()
            .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
            .filter(|t| !t.is_empty());
        for (i, token) in tokens.enumerate() {
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            let val = (((h >> 32) as u32) as f32) / (u32::MAX as f32);
            v[idx] += val + (i as f32 % 3.0) * 0.01;
        }
        l2_normalize(&mut v);
        v
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    fn model_id(&self) -> &str {
        &self.id
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        for (i, text) in texts.iter().enumerate() {
            if text.trim().is_empty() {
                return Err(Error::InvalidInput(format!("text #{} is empty", i)));
            }
            if let Some(limit) = self.max_input_chars {
                let len = text.chars().count();
                if len > limit {
                    return Err(Error::InvalidInput(format!("text #{} has {} characters (limit {})", i, len, limit)));
                }
            }
        }
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }
}

pub fn l2_normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt().max(1e-6);
    for x in v.iter_mut() {
        *x /= norm;
    }
}
