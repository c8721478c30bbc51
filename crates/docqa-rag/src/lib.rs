//! Retrieval-augmented question answering over a single document.
//!
//! [`Session`] owns the pipeline: it chunks and embeds the document into a
//! vector index once, then answers questions by retrieving the most similar
//! chunks, assembling them into a context and asking the generator.

pub mod context;
pub mod retriever;
pub mod retry;
pub mod session;

pub use context::{ContextAssembler, CONTEXT_SEPARATOR};
pub use retriever::Retriever;
pub use retry::RetryPolicy;
pub use session::{Answer, IndexFactory, Session, SessionConfig};
