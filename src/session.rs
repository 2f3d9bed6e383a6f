//! One question-answering session: the upload and chat boundaries.
//!
//! A [`Session`] owns the [`ConversationState`] and the inference backend.
//! It is constructed once, reset with [`Session::clear`], and torn down by
//! dropping it. Nothing here is global.
//!
//! # Failure policy
//!
//! - A failed upload leaves the previously active context in place.
//! - A failed question still records the user's turn, followed by an
//!   assistant turn whose content is the user-facing error message, so the
//!   log always alternates user/assistant. The typed error is returned to
//!   the caller as well.

use serde::Serialize;

use crate::config::UploadConfig;
use crate::conversation::{ConversationState, Snapshot};
use crate::extract::{self, ExtractionError, Preview, SheetWarning};
use crate::inference::{InferenceClient, InferenceError};
use crate::models::{ConversationTurn, DocumentKind};
use crate::prompt::PromptBuilder;

/// Questions offered to the user as a starting point.
pub const EXAMPLE_QUESTIONS: &[&str] = &[
    "What was the total revenue?",
    "How much did we spend on marketing?",
    "What are our largest expenses?",
    "What is the net profit?",
    "Show me the quarterly growth trends",
    "Compare expenses between quarters",
];

/// Metadata about the document whose text is the active context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveDocument {
    pub file_name: String,
    pub kind: DocumentKind,
    pub char_count: usize,
}

/// Result of a successful upload, for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadReport {
    pub file_name: String,
    pub kind: DocumentKind,
    pub char_count: usize,
    pub warnings: Vec<SheetWarning>,
    pub preview: Preview,
}

/// Document status plus conversation length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionStatus {
    pub document: Option<ActiveDocument>,
    pub model: String,
    pub turns: usize,
}

pub struct Session {
    state: ConversationState,
    client: Box<dyn InferenceClient>,
    upload: UploadConfig,
    document: Option<ActiveDocument>,
}

impl Session {
    pub fn new(client: Box<dyn InferenceClient>, upload: UploadConfig) -> Self {
        Self {
            state: ConversationState::new(),
            client,
            upload,
            document: None,
        }
    }

    /// Extracts `bytes` and, on success, makes the result the active context.
    pub fn upload(
        &mut self,
        bytes: &[u8],
        media_type: &str,
        file_name: &str,
    ) -> Result<UploadReport, ExtractionError> {
        let extraction = match extract::extract(bytes, media_type) {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!(file = file_name, media_type, error = %e, "upload rejected");
                return Err(e);
            }
        };

        let kind = extraction.context.source_kind;
        let char_count = extraction.context.char_count();
        let preview = match kind {
            DocumentKind::Spreadsheet => {
                extract::spreadsheet_preview(bytes, self.upload.preview_rows).unwrap_or_else(|e| {
                    tracing::debug!(error = %e, "table preview unavailable, using text preview");
                    extract::text_preview(&extraction.context.text, self.upload.preview_chars)
                })
            }
            _ => extract::text_preview(&extraction.context.text, self.upload.preview_chars),
        };

        tracing::info!(
            file = file_name,
            kind = %kind,
            chars = char_count,
            warnings = extraction.warnings.len(),
            "document processed"
        );

        self.state.set_context(extraction.context);
        self.document = Some(ActiveDocument {
            file_name: file_name.to_string(),
            kind,
            char_count,
        });

        Ok(UploadReport {
            file_name: file_name.to_string(),
            kind,
            char_count,
            warnings: extraction.warnings,
            preview,
        })
    }

    /// Asks one question against the active context and records the turn pair.
    ///
    /// Both turns are appended only once the model call settles, so a caller
    /// that drops this future mid-flight leaves the log untouched.
    pub async fn ask(&mut self, question: &str) -> Result<String, InferenceError> {
        let prompt = PromptBuilder::build(question, self.state.context());
        let outcome = self.client.ask(&prompt).await;

        self.state.append_turn(ConversationTurn::user(question));
        match outcome {
            Ok(answer) => {
                self.state.append_turn(ConversationTurn::assistant(answer.clone()));
                Ok(answer)
            }
            Err(e) => {
                tracing::warn!(model = self.client.model_name(), error = %e, "inference failed");
                self.state.append_turn(ConversationTurn::assistant(e.to_string()));
                Err(e)
            }
        }
    }

    /// Chat boundary: the answer, or the error message to display in its place.
    pub async fn reply(&mut self, question: &str) -> String {
        match self.ask(question).await {
            Ok(answer) => answer,
            Err(e) => e.to_string(),
        }
    }

    /// Resets the conversation. The active document stays loaded.
    pub fn clear(&mut self) {
        self.state.clear();
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        self.state.snapshot()
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            document: self.document.clone(),
            model: self.client.model_name().to_string(),
            turns: self.state.turns().len(),
        }
    }
}
