//! # finqa
//!
//! Local-first question answering over one financial document.
//!
//! A user uploads a PDF or spreadsheet; its text becomes the session's
//! context. Every question is wrapped in a grounded prompt that restricts a
//! locally hosted model (Ollama) to that context and requires it to say when
//! the answer is not in the document.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌────────────────────┐
//! │   upload     │──▶│  extract            │── ExtractedContext ──┐
//! │ bytes + type │   │  PDF / spreadsheet  │                      ▼
//! └──────────────┘   └────────────────────┘           ┌───────────────────┐
//!                                                      │ ConversationState │
//! ┌──────────────┐   ┌────────────────────┐           └─────────┬─────────┘
//! │  question    │──▶│  PromptBuilder      │◀──── context ───────┘
//! └──────────────┘   └─────────┬──────────┘
//!                              ▼
//!                    ┌────────────────────┐
//!                    │  InferenceClient    │──▶ answer → turn log
//!                    │  (Ollama generate)  │
//!                    └────────────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`extract`] | Document text extraction |
//! | [`conversation`] | Turn log and active context |
//! | [`prompt`] | Grounded prompt construction |
//! | [`inference`] | Model runtime client |
//! | [`session`] | Upload and chat boundaries over one session |
//! | [`server`] | HTTP front-end |

pub mod config;
pub mod conversation;
pub mod extract;
pub mod inference;
pub mod models;
pub mod prompt;
pub mod server;
pub mod session;
