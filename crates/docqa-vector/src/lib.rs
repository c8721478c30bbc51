//! In-memory vector index over document chunks.
//!
//! Stores each chunk together with its embedding and answers exact
//! (brute-force) cosine top-k queries. Sized for a single document, so no
//! approximate structure is kept.

pub mod index;
pub mod search;
pub mod similarity;

pub use index::InMemoryIndex;
pub use search::top_k;
pub use similarity::cosine_similarity;
