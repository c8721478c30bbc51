//! Domain types shared by the chunker, the vector index and the session.

use serde::{Deserialize, Serialize};
use std::fmt;

pub type EntryId = usize;
pub type Embedding = Vec<f32>;

/// Paragraph break inserted between pages when they are joined.
pub const PAGE_SEPARATOR: &str = "\n\n";

/// The text of one source document, assembled from its extracted pages.
///
/// - `source`: identifier of the origin (usually the file path)
/// - `text`: all page texts joined with [`PAGE_SEPARATOR`]
/// - `page_count`: number of pages the text was built from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub source: String,
    pub text: String,
    pub page_count: usize,
}

impl Document {
    pub fn new(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self { source: source.into(), text: text.into(), page_count: 1 }
    }

    pub fn from_pages<S: AsRef<str>>(source: impl Into<String>, pages: &[S]) -> Self {
        let text = pages.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(PAGE_SEPARATOR);
        Self { source: source.into(), text, page_count: pages.len() }
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// A contiguous span of a document used as the retrieval unit.
///
/// `start`/`end` are character offsets (not bytes) into `Document::text`,
/// half-open. `source` only names the document, it does not own it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub index: usize,
    pub start: usize,
    pub end: usize,
    pub source: String,
    pub text: String,
}

impl Chunk {
    pub fn char_len(&self) -> usize {
        self.end - self.start
    }
}

/// A chunk together with its vector, as stored by an index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedEntry {
    pub id: EntryId,
    pub chunk: Chunk,
    pub vector: Embedding,
}

/// One retrieval hit. Higher `score` is more relevant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub entry_id: EntryId,
    pub chunk: Chunk,
    pub score: f32,
}

/// Hits ordered by descending score, ties by ascending entry id.
pub type RetrievalResult = Vec<ScoredChunk>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Uninitialized,
    Indexing,
    Ready,
    Querying,
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Uninitialized => "uninitialized",
            SessionState::Indexing => "indexing",
            SessionState::Ready => "ready",
            SessionState::Querying => "querying",
            SessionState::Closed => "closed",
        };
        f.write_str(name)
    }
}
