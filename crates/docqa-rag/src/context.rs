use docqa_core::types::ScoredChunk;

/// Placed between consecutive chunk texts.
pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// Turns ranked retrieval hits into the context string handed to the generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextAssembler {
    max_chars: Option<usize>,
}

impl ContextAssembler {
    /// `max_chars` bounds the context length in characters. Whole chunks are
    /// kept in rank order while they fit; the first chunk is always kept.
    pub fn new(max_chars: Option<usize>) -> Self {
        Self { max_chars }
    }

    pub fn assemble(&self, results: &[ScoredChunk]) -> String {
        let mut context = String::new();
        let mut used = 0usize;
        for (i, hit) in results.iter().enumerate() {
            let sep = if i == 0 { 0 } else { CONTEXT_SEPARATOR.len() };
            let len = hit.chunk.text.chars().count();
            if let Some(max) = self.max_chars {
                if i > 0 && used + sep + len > max {
                    break;
                }
            }
            if i > 0 {
                context.push_str(CONTEXT_SEPARATOR);
            }
            context.push_str(&hit.chunk.text);
            used += sep + len;
        }
        context
    }
}
