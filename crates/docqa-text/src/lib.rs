//! docqa-text
//!
//! Splits document text into overlapping, size-bounded chunks that end at the
//! most natural boundary available. See `chunker`.
pub mod chunker;

pub use chunker::{split, Chunker, ChunkingConfig};
