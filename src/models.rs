//! Core data models shared by the extraction, conversation, and prompt layers.
//!
//! These types represent the normalized document context, the conversation
//! turns, and the prompt that flow through the question-answering pipeline.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Classification of an uploaded document, derived solely from its declared
/// media type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Pdf,
    Spreadsheet,
    Unsupported,
}

impl DocumentKind {
    /// Human-readable label used by the status and preview views.
    pub fn label(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "PDF",
            DocumentKind::Spreadsheet => "Excel",
            DocumentKind::Unsupported => "Unsupported",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Normalized text of one uploaded document.
///
/// An empty `text` is a valid value: the document parsed but had nothing to
/// extract. Extraction failures never produce an `ExtractedContext`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedContext {
    pub text: String,
    pub source_kind: DocumentKind,
}

impl ExtractedContext {
    pub fn new(text: impl Into<String>, source_kind: DocumentKind) -> Self {
        Self {
            text: text.into(),
            source_kind,
        }
    }

    /// Number of characters (not bytes) in the context text.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Speaker of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One entry in the conversation log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
    pub at: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            at: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            at: Utc::now(),
        }
    }
}

/// A fully assembled instruction ready to send to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt(String);

impl Prompt {
    pub(crate) fn new(text: String) -> Self {
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
