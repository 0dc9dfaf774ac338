//! Core types and pure logic for sofia-chat
//!
//! This crate contains domain types shared across all other crates:
//! messages, persisted conversation records, day keys, the response chunker
//! and the profile-driven proactive messages.

mod chunker;
pub mod constants;
mod day_key;
mod env_config;
mod error;
mod message;
pub mod profile;
mod proxy;

pub use chunker::split_into_chunks;
pub use day_key::{Clock, DayKey, ManualClock, SystemClock};
pub use env_config::{env_parse_with_default, env_var_any};
pub use error::{CoreError, Result};
pub use message::{ConversationRecord, Message, Role};
pub use profile::UserProfile;
pub use proxy::{ProxyReply, ProxyRequest};
