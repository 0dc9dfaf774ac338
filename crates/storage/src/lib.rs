//! Storage layer for sofia-chat
//!
//! A string-valued key-value medium with namespaced keys, backed by `SQLite`
//! (r2d2 pool) or memory, plus typed helpers for transcripts and profiles.

mod error;
pub mod keys;
mod memory;
mod migrations;
mod sqlite;
mod sqlite_async;
#[cfg(test)]
mod tests;
mod traits;
pub mod transcripts;

pub use error::StorageError;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::KeyValueStore;
