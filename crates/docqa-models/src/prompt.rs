use docqa_core::{Error, Result};

pub const CONTEXT_SLOT: &str = "{context}";
pub const QUESTION_SLOT: &str = "{question}";

/// Version tag of [`DEFAULT_TEMPLATE`]; bump whenever its wording changes.
pub const PROMPT_VERSION: &str = "v1";

pub const DEFAULT_TEMPLATE: &str = "You answer questions about a single document. \
Use only the pieces of context below, which were retrieved from that document. \
If the context does not contain the answer, say that the answer was not found in the document. \
Answer in at most three sentences and keep it concise.\n\n\
Context:\n{context}\n\n\
Question: {question}\n\n\
Answer:";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Context,
    Question,
}

/// A prompt with one `{context}` and one `{question}` slot.
///
/// The template is split into segments once, so slot markers that appear in
/// the substituted context or question are copied verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    version: String,
    segments: Vec<Segment>,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self { version: PROMPT_VERSION.to_string(), segments: tokenize(DEFAULT_TEMPLATE).0 }
    }
}

impl PromptTemplate {
    /// Parses a user-supplied template; each slot must appear exactly once.
    pub fn parse(text: &str) -> Result<Self> {
        let (segments, contexts, questions) = tokenize(text);
        if contexts != 1 || questions != 1 {
            return Err(Error::InvalidConfig(format!(
                "prompt template needs exactly one {} and one {} (found {} and {})",
                CONTEXT_SLOT, QUESTION_SLOT, contexts, questions
            )));
        }
        Ok(Self { version: "custom".to_string(), segments })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn render(&self, context: &str, question: &str) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Context => out.push_str(context),
                Segment::Question => out.push_str(question),
            }
        }
        out
    }
}

fn tokenize(text: &str) -> (Vec<Segment>, usize, usize) {
    let mut segments = Vec::new();
    let (mut contexts, mut questions) = (0, 0);
    let mut rest = text;
    loop {
        let next = [(CONTEXT_SLOT, Segment::Context), (QUESTION_SLOT, Segment::Question)]
            .into_iter()
            .filter_map(|(slot, segment)| rest.find(slot).map(|pos| (pos, slot, segment)))
            .min_by_key(|(pos, _, _)| *pos);
        let Some((pos, slot, segment)) = next else {
            if !rest.is_empty() {
                segments.push(Segment::Literal(rest.to_string()));
            }
            break;
        };
        if pos > 0 {
            segments.push(Segment::Literal(rest[..pos].to_string()));
        }
        match segment {
            Segment::Context => contexts += 1,
            Segment::Question => questions += 1,
            Segment::Literal(_) => {}
        }
        segments.push(segment);
        rest = &rest[pos + slot.len()..];
    }
    (segments, contexts, questions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_template_has_both_slots() {
        let (_, contexts, questions) = tokenize(DEFAULT_TEMPLATE);
        assert_eq!((contexts, questions), (1, 1));
        assert_eq!(PromptTemplate::default().version(), PROMPT_VERSION);
    }

    #[test]
    fn render_fills_slots() {
        let t = PromptTemplate::parse("C={context};Q={question}").unwrap();
        assert_eq!(t.render("ctx", "why?"), "C=ctx;Q=why?");
        assert_eq!(t.version(), "custom");
    }

    #[test]
    fn substituted_text_is_not_expanded_again() {
        let t = PromptTemplate::parse("{question}|{context}").unwrap();
        assert_eq!(t.render("has {question}", "plain"), "plain|has {question}");
    }

    #[test]
    fn templates_must_use_each_slot_once() {
        assert!(matches!(PromptTemplate::parse("only {context}"), Err(Error::InvalidConfig(_))));
        assert!(matches!(
            PromptTemplate::parse("{context} {question} {context}"),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn empty_context_still_renders() {
        let rendered = PromptTemplate::default().render("", "What is X?");
        assert!(rendered.contains("Question: What is X?"));
        assert!(rendered.contains("Context:\n\n\n"));
    }
}
