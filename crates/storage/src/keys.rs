//! Key layout: `{namespace}_{user_id}[_{day_key}]`.

use sofia_core::DayKey;
use sofia_core::constants::{PROFILE_NAMESPACE, TRANSCRIPT_NAMESPACE};

#[must_use]
pub fn transcript_key(user_id: &str, day_key: &DayKey) -> String {
    format!("{TRANSCRIPT_NAMESPACE}_{user_id}_{day_key}")
}

/// Prefix shared by every transcript of `user_id`.
#[must_use]
pub fn transcript_prefix(user_id: &str) -> String {
    format!("{TRANSCRIPT_NAMESPACE}_{user_id}_")
}

#[must_use]
pub fn profile_key(user_id: &str) -> String {
    format!("{PROFILE_NAMESPACE}_{user_id}")
}

/// Recovers the day key from a transcript key of `user_id`.
#[must_use]
pub fn day_from_transcript_key(user_id: &str, key: &str) -> Option<DayKey> {
    key.strip_prefix(&transcript_prefix(user_id))?.parse().ok()
}
