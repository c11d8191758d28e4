//! `minutes-agent` — typed client for the hosted LLM behind meeting-minute
//! generation and email polishing.
//!
//! The crate knows nothing about the workspace data model: it takes raw
//! transcripts and drafts in, and hands structured [`MinutesDraft`] and
//! [`EmailDraft`] values back. Model routing is by transcript length, and
//! email polishing degrades to a local template when the API is unreachable.

pub mod client;
pub mod error;
pub mod prompt;
pub mod types;

pub use client::MinutesClient;
pub use error::MinutesError;
pub use prompt::SHORT_TRANSCRIPT_CHARS;
pub use types::{EmailDraft, LlmConfig, MinutesDraft, MinutesMode};
