//! Grounded prompt construction.
//!
//! Every prompt has three sections, always in this order:
//!
//! 1. the grounding directive (persona + answer-only-from-context rules),
//! 2. the full document context, verbatim, or [`NO_DOCUMENT_MARKER`],
//! 3. the user's question, verbatim.
//!
//! The context is never truncated or summarized here. If the prompt exceeds
//! the model's input window, the inference layer reports it.

use crate::models::{ExtractedContext, Prompt};

/// Stands in for the context section when no document has been processed.
pub const NO_DOCUMENT_MARKER: &str = "[No document provided]";

/// Fixes the persona and the grounding contract.
pub const GROUNDING_DIRECTIVE: &str = "\
You are a financial analyst assistant. You answer questions about the financial \
document content supplied below and nothing else.

Rules:
- Answer only from the financial document content provided. Do not use outside \
knowledge, training data, or assumptions.
- If the requested information is not present in the document content, state \
explicitly that the information is not available in the document.
- Keep the answer concise and accurate, quoting figures exactly as they appear.";

pub struct PromptBuilder;

impl PromptBuilder {
    pub fn build(question: &str, context: Option<&ExtractedContext>) -> Prompt {
        let context_text = context.map(|c| c.text.as_str()).unwrap_or(NO_DOCUMENT_MARKER);
        let mut out = String::with_capacity(
            GROUNDING_DIRECTIVE.len() + context_text.len() + question.len() + 64,
        );
        out.push_str(GROUNDING_DIRECTIVE);
        out.push_str("\n\nFinancial Document Content:\n");
        out.push_str(context_text);
        out.push_str("\n\nUser Question: ");
        out.push_str(question);
        out.push('\n');
        Prompt::new(out)
    }
}
