//! Typed access to transcripts and profiles stored as JSON strings.
//!
//! A transcript value is a JSON array of [`ConversationRecord`]; a profile
//! value is a JSON [`UserProfile`]. There is no schema versioning: callers
//! decide how to treat [`StorageError::DataCorruption`].

use sofia_core::{ConversationRecord, DayKey, Message, UserProfile};

use crate::error::StorageError;
use crate::keys::{day_from_transcript_key, profile_key, transcript_key, transcript_prefix};
use crate::traits::KeyValueStore;

fn corruption(key: &str, source: impl std::error::Error + Send + Sync + 'static) -> StorageError {
    StorageError::DataCorruption { key: key.to_owned(), source: Box::new(source) }
}

/// Raw records for one day. Missing key yields an empty list.
///
/// # Errors
/// Returns `DataCorruption` if the stored value is not a record array.
pub async fn load_records(
    store: &dyn KeyValueStore,
    user_id: &str,
    day: &DayKey,
) -> Result<Vec<ConversationRecord>, StorageError> {
    let key = transcript_key(user_id, day);
    match store.get(&key).await? {
        Some(raw) => serde_json::from_str(&raw).map_err(|e| corruption(&key, e)),
        None => Ok(Vec::new()),
    }
}

/// Messages for one day, in insertion order.
///
/// # Errors
/// Returns `DataCorruption` if the array or any timestamp cannot be parsed.
pub async fn load_messages(
    store: &dyn KeyValueStore,
    user_id: &str,
    day: &DayKey,
) -> Result<Vec<Message>, StorageError> {
    let records = load_records(store, user_id, day).await?;
    records
        .into_iter()
        .map(|record| {
            Message::try_from(record).map_err(|e| corruption(&transcript_key(user_id, day), e))
        })
        .collect()
}

/// Appends one message to the stored day array.
///
/// An unreadable stored array is replaced rather than blocking new writes.
///
/// # Errors
/// Returns error if the store read or write fails.
pub async fn append_message(
    store: &dyn KeyValueStore,
    user_id: &str,
    day: &DayKey,
    message: &Message,
) -> Result<(), StorageError> {
    let mut records = match load_records(store, user_id, day).await {
        Ok(records) => records,
        Err(e) if e.is_corruption() => {
            tracing::warn!(user_id, day = %day, error = %e, "discarding unreadable transcript");
            Vec::new()
        },
        Err(e) => return Err(e),
    };
    records.push(message.to_record(user_id, day));
    let raw = serde_json::to_string(&records)?;
    store.set(&transcript_key(user_id, day), &raw).await
}

/// Deletes the stored transcript for one day.
///
/// # Errors
/// Returns error if the store delete fails.
pub async fn clear_day(
    store: &dyn KeyValueStore,
    user_id: &str,
    day: &DayKey,
) -> Result<bool, StorageError> {
    store.remove(&transcript_key(user_id, day)).await
}

/// Days with a stored transcript for `user_id`, oldest first.
///
/// # Errors
/// Returns error if listing keys fails.
pub async fn list_days(
    store: &dyn KeyValueStore,
    user_id: &str,
) -> Result<Vec<DayKey>, StorageError> {
    let keys = store.keys_with_prefix(&transcript_prefix(user_id)).await?;
    Ok(keys.iter().filter_map(|key| day_from_transcript_key(user_id, key)).collect())
}

/// The saved onboarding profile, if any.
///
/// # Errors
/// Returns `DataCorruption` if the stored profile cannot be parsed.
pub async fn load_profile(
    store: &dyn KeyValueStore,
    user_id: &str,
) -> Result<Option<UserProfile>, StorageError> {
    let key = profile_key(user_id);
    match store.get(&key).await? {
        Some(raw) => serde_json::from_str(&raw).map(Some).map_err(|e| corruption(&key, e)),
        None => Ok(None),
    }
}

/// Saves the onboarding profile, replacing any previous one.
///
/// # Errors
/// Returns error if serialization or the store write fails.
pub async fn save_profile(
    store: &dyn KeyValueStore,
    user_id: &str,
    profile: &UserProfile,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(profile)?;
    store.set(&profile_key(user_id), &raw).await
}
