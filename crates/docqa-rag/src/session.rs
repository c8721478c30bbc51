//! The question-answering session state machine.
//!
//! ```text
//! Uninitialized -> Indexing -> Ready -> (Querying -> Ready)* -> Closed
//! ```
//!
//! A failed build falls back to `Uninitialized` and a failed query to
//! `Ready`. Nothing leaves `Closed`.

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use tracing::{debug, info, warn};

use docqa_core::config::{RetrySettings, Settings};
use docqa_core::traits::{Embedder, Generator, VectorIndex};
use docqa_core::types::{Document, RetrievalResult, SessionState};
use docqa_core::{Error, Result};
use docqa_text::{Chunker, ChunkingConfig};
use docqa_vector::InMemoryIndex;

use crate::context::ContextAssembler;
use crate::retriever::Retriever;
use crate::retry::RetryPolicy;

/// Creates the empty index a build writes into.
pub type IndexFactory = Box<dyn Fn() -> Box<dyn VectorIndex> + Send + Sync>;

fn in_memory_index() -> Box<dyn VectorIndex> {
    Box::new(InMemoryIndex::new())
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub chunking: ChunkingConfig,
    /// Chunks retrieved per question.
    pub k: usize,
    pub max_context_chars: Option<usize>,
    /// Chunk texts sent per embedding request during a build.
    pub batch_size: usize,
    pub retry: RetrySettings,
    /// Draw a progress bar on stderr while embedding.
    pub show_progress: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl SessionConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            chunking: ChunkingConfig::from(&settings.chunking),
            k: settings.retrieval.k,
            max_context_chars: settings.retrieval.max_context_chars,
            batch_size: settings.embedding.batch_size,
            retry: settings.retry.clone(),
            show_progress: false,
        }
    }
}

/// A generated answer and the chunks it was grounded on, best first.
#[derive(Debug, Clone)]
pub struct Answer {
    pub text: String,
    pub sources: RetrievalResult,
}

/// Stages a session runs; fixed once the session is created.
struct Pipeline {
    chunker: Chunker,
    k: usize,
    batch_size: usize,
    show_progress: bool,
    assembler: ContextAssembler,
    retry: RetryPolicy,
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn Generator>,
    index_factory: IndexFactory,
}

/// Holds the session in a transitional state for the duration of an async
/// operation. Dropping it (on return, error or cancellation) moves the
/// session to `restore`; `commit` replaces that target.
struct StateGuard<'a> {
    state: &'a mut SessionState,
    restore: SessionState,
}

impl<'a> StateGuard<'a> {
    fn enter(state: &'a mut SessionState, during: SessionState, restore: SessionState) -> Self {
        *state = during;
        Self { state, restore }
    }

    fn commit(mut self, next: SessionState) {
        self.restore = next;
    }
}

impl Drop for StateGuard<'_> {
    fn drop(&mut self) {
        *self.state = self.restore;
    }
}

pub struct Session {
    pipeline: Pipeline,
    state: SessionState,
    document: Option<Document>,
    retriever: Option<Retriever>,
}

impl Session {
    pub fn new(config: SessionConfig, embedder: Arc<dyn Embedder>, generator: Arc<dyn Generator>) -> Result<Self> {
        if config.k == 0 {
            return Err(Error::InvalidConfig("k must be greater than 0".into()));
        }
        if config.batch_size == 0 {
            return Err(Error::InvalidConfig("batch_size must be greater than 0".into()));
        }
        let pipeline = Pipeline {
            chunker: Chunker::new(config.chunking)?,
            k: config.k,
            batch_size: config.batch_size,
            show_progress: config.show_progress,
            assembler: ContextAssembler::new(config.max_context_chars),
            retry: RetryPolicy::from_settings(&config.retry)?,
            embedder,
            generator,
            index_factory: Box::new(in_memory_index),
        };
        Ok(Self { pipeline, state: SessionState::Uninitialized, document: None, retriever: None })
    }

    pub fn with_index_factory(mut self, factory: IndexFactory) -> Self {
        self.pipeline.index_factory = factory;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Number of indexed chunks; 0 until a build succeeds and after close.
    pub fn chunk_count(&self) -> usize {
        self.retriever.as_ref().map_or(0, |r| r.index().len())
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    /// Shared retriever over the built index, for callers that only need
    /// retrieval (it may be cloned and used concurrently).
    pub fn retriever(&self) -> Option<&Retriever> {
        self.retriever.as_ref()
    }

    /// Chunks, embeds and indexes `document`. Allowed once, from `Uninitialized`.
    ///
    /// Cancelling the returned future leaves the session `Uninitialized`.
    pub async fn build(&mut self, document: Document) -> Result<()> {
        match self.state {
            SessionState::Uninitialized => {}
            SessionState::Closed => return Err(Error::SessionClosed),
            SessionState::Ready | SessionState::Querying => return Err(Error::AlreadyBuilt),
            SessionState::Indexing => return Err(Error::NotReady(self.state)),
        }

        let guard = StateGuard::enter(&mut self.state, SessionState::Indexing, SessionState::Uninitialized);
        info!(source = %document.source, pages = document.page_count, "building index");
        match self.pipeline.index_document(&document).await {
            Ok(index) => {
                info!(source = %document.source, chunks = index.len(), dim = ?index.dim(), "index ready");
                let index: Arc<dyn VectorIndex> = Arc::from(index);
                let p = &self.pipeline;
                self.retriever = Some(Retriever::new(p.embedder.clone(), index, p.retry.clone(), p.k));
                self.document = Some(document);
                guard.commit(SessionState::Ready);
                Ok(())
            }
            Err(err) => {
                warn!(source = %document.source, error = %err, "build failed");
                Err(Error::build_failed(err))
            }
        }
    }

    /// Answers `question` from the indexed document.
    ///
    /// The session is back in `Ready` once the call returns or its future is
    /// dropped.
    pub async fn ask(&mut self, question: &str) -> Result<Answer> {
        match self.state {
            SessionState::Ready => {}
            SessionState::Closed => return Err(Error::SessionClosed),
            other => return Err(Error::NotReady(other)),
        }
        let Some(retriever) = self.retriever.as_ref() else {
            return Err(Error::NotReady(self.state));
        };

        let _guard = StateGuard::enter(&mut self.state, SessionState::Querying, SessionState::Ready);
        self.pipeline.run_query(retriever, question).await.map_err(|err| {
            warn!(error = %err, "query failed");
            Error::query_failed(err)
        })
    }

    pub async fn answer(&mut self, question: &str) -> Result<String> {
        self.ask(question).await.map(|answer| answer.text)
    }

    /// Releases the index and the document. Closing twice is a no-op.
    pub fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        self.retriever = None;
        self.document = None;
        self.state = SessionState::Closed;
        info!("session closed");
    }
}

impl Pipeline {
    async fn index_document(&self, document: &Document) -> Result<Box<dyn VectorIndex>> {
        if document.is_blank() {
            return Err(Error::InvalidInput(format!("document {} contains no text", document.source)));
        }
        let chunks = self.chunker.split(document);
        if chunks.is_empty() {
            return Err(Error::InvalidInput(format!("document {} produced no chunks", document.source)));
        }
        debug!(chunks = chunks.len(), batch_size = self.batch_size, "embedding chunks");

        let mut index = (self.index_factory)();
        let pb = self.progress_bar(chunks.len());
        for batch in chunks.chunks(self.batch_size) {
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let vectors = self.retry.execute("embed chunks", || self.embedder.embed(&texts)).await?;
            index.insert_batch(batch.to_vec(), vectors)?;
            pb.inc(batch.len() as u64);
        }
        pb.finish_and_clear();
        Ok(index)
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%)")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb
    }

    async fn run_query(&self, retriever: &Retriever, question: &str) -> Result<Answer> {
        let sources = retriever.retrieve(question, None).await?;
        let context = self.assembler.assemble(&sources);
        debug!(hits = sources.len(), context_chars = context.chars().count(), "generating answer");
        let text = self.retry.execute("generate answer", || self.generator.generate(&context, question)).await?;
        Ok(Answer { text, sources })
    }
}
