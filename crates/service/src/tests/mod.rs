//! Shared fakes for service tests.

mod chat_session_tests;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use sofia_core::ManualClock;
use sofia_storage::{KeyValueStore, StorageError};

use crate::delay::Delay;
use crate::error::ServiceError;
use crate::provider::ReplyProvider;
use crate::turn_service::{ChunkSink, TurnHandler, TurnReply};

/// Replies from a queue; answers "ok" once the queue is drained.
#[derive(Default)]
pub(crate) struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<String, ServiceError>>>,
    pub(crate) seen: Mutex<Vec<(String, Option<String>)>>,
}

impl ScriptedProvider {
    pub(crate) fn new(replies: Vec<Result<String, ServiceError>>) -> Self {
        Self { replies: Mutex::new(replies.into()), seen: Mutex::default() }
    }

    pub(crate) fn text(reply: &str) -> Self {
        Self::new(vec![Ok(reply.to_owned())])
    }

    pub(crate) fn failing() -> Self {
        Self::new(vec![Err(ServiceError::Proxy { status: 500, detail: "boom".to_owned() })])
    }
}

#[async_trait]
impl ReplyProvider for ScriptedProvider {
    async fn reply(&self, message: &str, context: Option<&str>) -> Result<String, ServiceError> {
        self.seen.lock().unwrap().push((message.to_owned(), context.map(str::to_owned)));
        self.replies.lock().unwrap().pop_front().unwrap_or_else(|| Ok("ok".to_owned()))
    }
}

/// Records requested pauses without sleeping.
#[derive(Default)]
pub(crate) struct RecordingDelay {
    pub(crate) pauses: Mutex<Vec<Duration>>,
}

#[async_trait]
impl Delay for RecordingDelay {
    async fn sleep(&self, duration: Duration) {
        self.pauses.lock().unwrap().push(duration);
    }
}

/// Turn handler that always fails.
pub(crate) struct FailingHandler;

#[async_trait]
impl TurnHandler for FailingHandler {
    async fn respond(&self, _text: &str, _on_chunk: ChunkSink<'_>) -> Result<TurnReply, ServiceError> {
        Err(ServiceError::Callback(anyhow::anyhow!("handler exploded")))
    }
}

/// Turn handler that waits for `release` before answering.
#[derive(Default)]
pub(crate) struct GatedHandler {
    pub(crate) entered: tokio::sync::Notify,
    pub(crate) release: tokio::sync::Notify,
}

#[async_trait]
impl TurnHandler for GatedHandler {
    async fn respond(&self, text: &str, _on_chunk: ChunkSink<'_>) -> Result<TurnReply, ServiceError> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(TurnReply { text: format!("re: {text}"), chunks: Vec::new(), degraded: false })
    }
}

/// Store that reads as empty and refuses every write.
pub(crate) struct ReadOnlyStore;

#[async_trait]
impl KeyValueStore for ReadOnlyStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Ok(None)
    }

    async fn set(&self, key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::DataCorruption { key: key.to_owned(), source: "store is read-only".into() })
    }

    async fn remove(&self, _key: &str) -> Result<bool, StorageError> {
        Ok(false)
    }

    async fn keys_with_prefix(&self, _prefix: &str) -> Result<Vec<String>, StorageError> {
        Ok(Vec::new())
    }
}

pub(crate) fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
}

pub(crate) fn clock_at(instant: DateTime<Utc>) -> Arc<ManualClock> {
    Arc::new(ManualClock::new(instant))
}
