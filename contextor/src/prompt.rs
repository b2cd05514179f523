//! Prompt template with `{context}` and `{question}` slots.

use rag_store::ScoredDocument;

use crate::error::ContextorError;

const CONTEXT_SLOT: &str = "{context}";
const QUESTION_SLOT: &str = "{question}";

/// Grounded-answer template used by the chat page.
pub const DEFAULT_TEMPLATE: &str = "You are an intelligent assistant. Use the following context to answer the user's question.
---
{context}
---
Question: {question}
Answer:";

#[derive(Clone, Debug)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    /// # Errors
    /// [`ContextorError::Template`] if either slot is missing.
    pub fn new(template: impl Into<String>) -> Result<Self, ContextorError> {
        let template = template.into();
        for slot in [CONTEXT_SLOT, QUESTION_SLOT] {
            if !template.contains(slot) {
                return Err(ContextorError::Template(format!("missing {slot} slot")));
            }
        }
        Ok(Self { template })
    }

    /// Fills the slots in one pass: document contents joined by a blank line,
    /// and the question verbatim. Slot markers inside the inserted text are
    /// left as they are.
    pub fn render(&self, docs: &[ScoredDocument], question: &str) -> String {
        let context = docs
            .iter()
            .map(|d| d.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let mut out = String::with_capacity(self.template.len() + context.len() + question.len());
        let mut rest = self.template.as_str();
        loop {
            let next = [(CONTEXT_SLOT, context.as_str()), (QUESTION_SLOT, question)]
                .into_iter()
                .filter_map(|(slot, value)| rest.find(slot).map(|at| (at, slot, value)))
                .min_by_key(|(at, _, _)| *at);
            match next {
                Some((at, slot, value)) => {
                    out.push_str(&rest[..at]);
                    out.push_str(value);
                    rest = &rest[at + slot.len()..];
                }
                None => {
                    out.push_str(rest);
                    return out;
                }
            }
        }
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(content: &str) -> ScoredDocument {
        ScoredDocument {
            id: rag_store::document_id(content),
            score: 1.0,
            content: content.into(),
        }
    }

    #[test]
    fn renders_default_template() {
        let p = PromptTemplate::default();
        let out = p.render(&[doc("A."), doc("B.")], "What is RAG?");
        assert_eq!(
            out,
            "You are an intelligent assistant. Use the following context to answer the user's question.\n---\nA.\n\nB.\n---\nQuestion: What is RAG?\nAnswer:"
        );
    }

    #[test]
    fn slot_markers_in_values_are_not_expanded() {
        let p = PromptTemplate::new("{context}|{question}").unwrap();
        assert_eq!(p.render(&[doc("{question}")], "q"), "{question}|q");
    }

    #[test]
    fn missing_slot_is_rejected() {
        assert!(matches!(
            PromptTemplate::new("Question: {question}"),
            Err(ContextorError::Template(_))
        ));
        assert!(PromptTemplate::new("{context}").is_err());
    }

    #[test]
    fn empty_context_renders_empty_block() {
        let out = PromptTemplate::default().render(&[], "hi");
        assert!(out.contains("---\n\n---"));
    }
}
