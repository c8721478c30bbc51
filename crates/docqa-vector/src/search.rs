use docqa_core::types::{IndexedEntry, RetrievalResult, ScoredChunk};

use crate::similarity::cosine_similarity;

/// Exact top-k by cosine similarity.
///
/// Results are ordered by descending score; equal scores keep ascending
/// entry id so repeated queries always return the same list. Callers check
/// the query dimensionality beforehand.
pub fn top_k(entries: &[IndexedEntry], query: &[f32], k: usize) -> RetrievalResult {
    if k == 0 || entries.is_empty() {
        return Vec::new();
    }
    let mut scored: Vec<(f32, &IndexedEntry)> =
        entries.iter().map(|e| (cosine_similarity(query, &e.vector), e)).collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.id.cmp(&b.1.id)));
    scored
        .into_iter()
        .take(k)
        .map(|(score, e)| ScoredChunk { entry_id: e.id, chunk: e.chunk.clone(), score })
        .collect()
}
