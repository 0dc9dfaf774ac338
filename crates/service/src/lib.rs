//! Service layer for sofia-chat
//!
//! Turn orchestration (provider call, chunking, think-pauses, fallback) and
//! the day-keyed chat session that persists transcripts.

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(clippy::missing_errors_doc, reason = "Errors are self-explanatory from Result types")]
#![allow(missing_debug_implementations, reason = "Internal types")]
#![allow(clippy::missing_docs_in_private_items, reason = "Internal crate")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]
#![allow(clippy::min_ident_chars, reason = "Short error vars are idiomatic")]

mod chat_session;
mod delay;
mod error;
mod fallback;
mod provider;
#[cfg(test)]
mod tests;
mod turn_service;

pub use chat_session::ChatSession;
pub use delay::{Delay, NoDelay, Pause, TokioDelay, TypingCadence};
pub use error::ServiceError;
pub use fallback::{fallback_reply, fallback_reply_with};
pub use provider::{PROXY_PATH, ProxyClient, ReplyProvider};
pub use turn_service::{ChunkSink, TurnHandler, TurnReply, TurnService};
