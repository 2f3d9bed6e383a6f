//! Conversation log and active document context for one session.

use crate::models::{ConversationTurn, ExtractedContext};

/// Ordered, append-only turn log plus at most one active document context.
///
/// The context and the log have independent lifecycles: a new upload
/// replaces the context without touching the log, and clearing the log
/// keeps the context.
#[derive(Debug, Default, Clone)]
pub struct ConversationState {
    turns: Vec<ConversationTurn>,
    active_context: Option<ExtractedContext>,
}

/// Read-only view of the state.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub turns: &'a [ConversationTurn],
    pub active_context: Option<&'a ExtractedContext>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the active context wholesale.
    pub fn set_context(&mut self, ctx: ExtractedContext) {
        self.active_context = Some(ctx);
    }

    pub fn append_turn(&mut self, turn: ConversationTurn) {
        self.turns.push(turn);
    }

    /// Empties the turn log. The active context is left as it was.
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            turns: &self.turns,
            active_context: self.active_context.as_ref(),
        }
    }

    pub fn context(&self) -> Option<&ExtractedContext> {
        self.active_context.as_ref()
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }
}
