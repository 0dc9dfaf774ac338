//! Test utilities and module declarations for storage tests.

use crate::SqliteStore;
use chrono::{TimeZone, Utc};
use sofia_core::{DayKey, Message};
use tempfile::TempDir;

#[expect(clippy::unwrap_used, reason = "test code")]
pub fn create_test_storage() -> (SqliteStore, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let storage = SqliteStore::new(&db_path).unwrap();
    (storage, temp_dir)
}

pub fn test_day() -> DayKey {
    DayKey::from_datetime(Utc.with_ymd_and_hms(2025, 9, 16, 12, 0, 0).unwrap())
}

pub fn user_message(content: &str) -> Message {
    Message::user(content, Utc.with_ymd_and_hms(2025, 9, 16, 12, 0, 0).unwrap())
}

pub fn assistant_message(content: &str) -> Message {
    Message::assistant(content, Utc.with_ymd_and_hms(2025, 9, 16, 12, 0, 1).unwrap())
}
