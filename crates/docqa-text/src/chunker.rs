use docqa_core::config::ChunkingSettings;
use docqa_core::types::{Chunk, Document};
use docqa_core::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingConfig {
    /// Upper bound on chunk length, in characters.
    pub chunk_size: usize,
    /// Characters shared by consecutive chunks.
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { chunk_size: 1000, chunk_overlap: 200 }
    }
}

impl ChunkingConfig {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        let config = Self { chunk_size, chunk_overlap };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::InvalidConfig("chunk_size must be > 0".into()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(Error::InvalidConfig(format!(
                "chunk_overlap ({}) must be < chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

impl From<&ChunkingSettings> for ChunkingConfig {
    fn from(s: &ChunkingSettings) -> Self {
        Self { chunk_size: s.chunk_size, chunk_overlap: s.chunk_overlap }
    }
}

/// Places a chunk may end, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Boundary {
    Paragraph,
    Line,
    Sentence,
    Word,
}

const PREFERENCE: [Boundary; 4] = [Boundary::Paragraph, Boundary::Line, Boundary::Sentence, Boundary::Word];

impl Boundary {
    /// Whether a split right before `chars[pos]` ends on this kind of boundary.
    /// The separator stays with the chunk on the left.
    fn ends_at(self, chars: &[char], pos: usize) -> bool {
        match self {
            Boundary::Paragraph => pos >= 2 && chars[pos - 1] == '\n' && chars[pos - 2] == '\n',
            Boundary::Line => pos >= 1 && chars[pos - 1] == '\n',
            Boundary::Sentence => {
                pos >= 2 && chars[pos - 1].is_whitespace() && matches!(chars[pos - 2], '.' | '!' | '?')
            }
            Boundary::Word => pos >= 1 && chars[pos - 1].is_whitespace(),
        }
    }
}

/// Recursive character splitter over a validated [`ChunkingConfig`].
#[derive(Debug, Clone)]
pub struct Chunker {
    config: ChunkingConfig,
}

impl Chunker {
    pub fn new(config: ChunkingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> ChunkingConfig {
        self.config
    }

    pub fn split(&self, document: &Document) -> Vec<Chunk> {
        split_text(&document.text, &document.source, self.config)
    }
}

/// Splits `text` into chunks of at most `chunk_size` characters, each starting
/// `overlap` characters before the end of the previous one.
pub fn split(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<Chunk>> {
    let config = ChunkingConfig::new(chunk_size, overlap)?;
    Ok(split_text(text, "", config))
}

fn split_text(text: &str, source: &str, config: ChunkingConfig) -> Vec<Chunk> {
    let chars: Vec<char> = text.chars().collect();
    let total = chars.len();
    let mut chunks = Vec::new();
    if total == 0 {
        return chunks;
    }

    let mut start = 0;
    loop {
        let end = if total - start <= config.chunk_size { total } else { find_split(&chars, start, config) };
        chunks.push(Chunk {
            index: chunks.len(),
            start,
            end,
            source: source.to_string(),
            text: chars[start..end].iter().collect(),
        });
        if end == total {
            break;
        }
        start = end - config.chunk_overlap;
    }
    chunks
}

/// Latest split point in `(start + overlap, start + chunk_size]` for the best
/// boundary kind present; a hard cut at `start + chunk_size` otherwise.
fn find_split(chars: &[char], start: usize, config: ChunkingConfig) -> usize {
    let window_end = start + config.chunk_size;
    let lowest = start + config.chunk_overlap + 1;
    PREFERENCE
        .iter()
        .find_map(|boundary| (lowest..=window_end).rev().find(|&pos| boundary.ends_at(chars, pos)))
        .unwrap_or(window_end)
}
