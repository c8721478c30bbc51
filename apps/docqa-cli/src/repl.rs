use std::io::{self, Write};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use docqa_core::types::ScoredChunk;
use docqa_core::Error;
use docqa_rag::Session;

const SNIPPET_CHARS: usize = 80;

/// Why the question loop stopped.
#[derive(Debug)]
pub enum LoopEnd {
    /// The user typed `exit`.
    Exit,
    EndOfInput,
    /// A query failed in a way the session cannot recover from.
    Fatal(Error),
}

/// Reads questions line by line until `exit` or end of input, writing the
/// transcript to `out`. Query errors are reported and the loop continues,
/// unless the error is fatal.
pub async fn run<R: AsyncBufRead + Unpin, W: Write>(
    session: &mut Session,
    mut input: R,
    out: &mut W,
    show_sources: bool,
) -> io::Result<LoopEnd> {
    writeln!(out, "Ask a question about the document (type 'exit' to quit).")?;
    loop {
        write!(out, "> ")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line).await? == 0 {
            return Ok(LoopEnd::EndOfInput);
        }
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if question.eq_ignore_ascii_case("exit") {
            return Ok(LoopEnd::Exit);
        }

        writeln!(out, "Question: {}", question)?;
        match session.ask(question).await {
            Ok(answer) => {
                writeln!(out, "Answer: {}", answer.text)?;
                if show_sources {
                    write_sources(out, &answer.sources)?;
                }
            }
            Err(err) if err.is_fatal() => return Ok(LoopEnd::Fatal(err)),
            Err(err) => writeln!(out, "Error: {}", err)?,
        }
        writeln!(out)?;
    }
}

fn write_sources<W: Write>(out: &mut W, sources: &[ScoredChunk]) -> io::Result<()> {
    writeln!(out, "Sources:")?;
    for (rank, hit) in sources.iter().enumerate() {
        let snippet: String = hit.chunk.text.split_whitespace().collect::<Vec<_>>().join(" ");
        let mut short: String = snippet.chars().take(SNIPPET_CHARS).collect();
        if snippet.chars().count() > SNIPPET_CHARS {
            short.push_str("...");
        }
        writeln!(
            out,
            "  [{}] chunk {} (chars {}-{}, score {:.3}): {}",
            rank + 1,
            hit.chunk.index,
            hit.chunk.start,
            hit.chunk.end,
            hit.score,
            short
        )?;
    }
    Ok(())
}
