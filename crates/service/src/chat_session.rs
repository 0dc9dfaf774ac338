//! Day-keyed chat session.
//!
//! Holds today's transcript in memory and mirrors every message into the
//! key-value store under `conversations_{user_id}_{day_key}`. The transcript
//! starts fresh whenever the UTC day rolls over.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use sofia_core::constants::ERROR_REPLY;
use sofia_core::profile::{self, Engagement};
use sofia_core::{Clock, DayKey, Message, UserProfile};
use sofia_storage::{KeyValueStore, transcripts};

use crate::error::ServiceError;
use crate::turn_service::{ChunkSink, TurnHandler};

#[derive(Debug)]
struct Transcript {
    day_key: DayKey,
    messages: Vec<Message>,
}

/// Clears the loading flag on every exit path.
struct LoadingGuard<'a>(&'a AtomicBool);

impl<'a> LoadingGuard<'a> {
    fn set(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct ChatSession {
    store: Arc<dyn KeyValueStore>,
    turns: Arc<dyn TurnHandler>,
    clock: Arc<dyn Clock>,
    transcript: Mutex<Transcript>,
    loading: AtomicBool,
    send_lock: tokio::sync::Mutex<()>,
}

impl ChatSession {
    #[must_use]
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        turns: Arc<dyn TurnHandler>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let day_key = clock.day_key();
        Self {
            store,
            turns,
            clock,
            transcript: Mutex::new(Transcript { day_key, messages: Vec::new() }),
            loading: AtomicBool::new(false),
            send_lock: tokio::sync::Mutex::new(()),
        }
    }

    fn transcript(&self) -> std::sync::MutexGuard<'_, Transcript> {
        self.transcript.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Switches `transcript` to `day_key` if it holds another day, dropping
    /// the turn handler's conversation history along with the messages.
    fn roll_over(&self, transcript: &mut Transcript, day_key: &DayKey) {
        if transcript.day_key == *day_key {
            return;
        }
        tracing::info!(from = %transcript.day_key, to = %day_key, "Day rolled over, starting new transcript");
        transcript.day_key = day_key.clone();
        transcript.messages.clear();
        self.turns.reset();
    }

    /// Loads today's transcript for `user_id`, replacing the in-memory one.
    ///
    /// Unreadable or unavailable storage yields an empty transcript.
    pub async fn load(&self, user_id: &str) -> Vec<Message> {
        let day_key = self.clock.day_key();
        let messages =
            match transcripts::load_messages(self.store.as_ref(), user_id, &day_key).await {
                Ok(messages) => messages,
                Err(e) => {
                    tracing::warn!(user_id, day = %day_key, error = %e, "Failed to load transcript, starting empty");
                    Vec::new()
                },
            };
        tracing::debug!(user_id, day = %day_key, count = messages.len(), "Transcript loaded");
        let mut transcript = self.transcript();
        self.roll_over(&mut transcript, &day_key);
        transcript.messages.clone_from(&messages);
        messages
    }

    /// Sends one user message and returns the assistant message that was
    /// recorded for it.
    pub async fn send(&self, content: &str, user_id: &str) -> Result<Message, ServiceError> {
        let mut ignore = |_: &str| -> anyhow::Result<()> { Ok(()) };
        self.send_with_typing(content, user_id, &mut ignore).await
    }

    /// Like [`send`](Self::send), revealing reply chunks through `on_chunk`.
    ///
    /// A failing turn handler does not fail the send: a fixed error message
    /// is recorded as the assistant reply instead.
    ///
    /// # Errors
    /// Returns error if persisting either message fails.
    pub async fn send_with_typing(
        &self,
        content: &str,
        user_id: &str,
        on_chunk: ChunkSink<'_>,
    ) -> Result<Message, ServiceError> {
        let _serial = self.send_lock.lock().await;

        let now = self.clock.now();
        let day_key = DayKey::from_datetime(now);
        let user = Message::user(content, now);
        let _loading = LoadingGuard::set(&self.loading);
        transcripts::append_message(self.store.as_ref(), user_id, &day_key, &user).await?;
        {
            let mut transcript = self.transcript();
            self.roll_over(&mut transcript, &day_key);
            transcript.messages.push(user);
        }

        let assistant = match self.turns.respond(content, on_chunk).await {
            Ok(reply) => Message::assistant(reply.text, self.clock.now()),
            Err(e) => {
                tracing::error!(user_id, error = %e, "Turn failed");
                Message::assistant(ERROR_REPLY, self.clock.now())
            },
        };
        self.record(user_id, &day_key, assistant.clone()).await?;
        Ok(assistant)
    }

    async fn record(
        &self,
        user_id: &str,
        day_key: &DayKey,
        message: Message,
    ) -> Result<(), ServiceError> {
        transcripts::append_message(self.store.as_ref(), user_id, day_key, &message).await?;
        let mut transcript = self.transcript();
        if transcript.day_key == *day_key {
            transcript.messages.push(message);
        }
        Ok(())
    }

    /// Empties the in-memory transcript and the turn handler's history.
    /// Stored messages are kept.
    pub fn clear(&self) {
        let mut transcript = self.transcript();
        transcript.day_key = self.clock.day_key();
        transcript.messages.clear();
        self.turns.reset();
    }

    pub fn messages(&self) -> Vec<Message> {
        self.transcript().messages.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    pub fn day_key(&self) -> DayKey {
        self.transcript().day_key.clone()
    }

    pub async fn save_profile(
        &self,
        user_id: &str,
        profile: &UserProfile,
    ) -> Result<(), ServiceError> {
        transcripts::save_profile(self.store.as_ref(), user_id, profile).await?;
        Ok(())
    }

    /// The saved profile; a malformed or unreadable one counts as absent.
    pub async fn load_profile(&self, user_id: &str) -> Option<UserProfile> {
        match transcripts::load_profile(self.store.as_ref(), user_id).await {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Ignoring unreadable profile");
                None
            },
        }
    }

    /// Opens an empty day with the personalised welcome, if a profile exists.
    pub async fn greet(&self, user_id: &str) -> Result<Option<Message>, ServiceError> {
        let _serial = self.send_lock.lock().await;
        let day_key = self.clock.day_key();
        if self.day_key() == day_key && !self.transcript().messages.is_empty() {
            return Ok(None);
        }
        if !transcripts::load_records(self.store.as_ref(), user_id, &day_key)
            .await
            .unwrap_or_default()
            .is_empty()
        {
            return Ok(None);
        }
        let Some(profile) = self.load_profile(user_id).await else {
            return Ok(None);
        };

        {
            let mut transcript = self.transcript();
            self.roll_over(&mut transcript, &day_key);
        }
        let welcome = Message::assistant(profile::welcome_message(&profile), self.clock.now());
        self.record(user_id, &day_key, welcome.clone()).await?;
        Ok(Some(welcome))
    }

    /// Sends an unprompted follow-up when the conversation has gone quiet.
    pub async fn check_in(
        &self,
        user_id: &str,
        engagement: Engagement,
    ) -> Result<Option<Message>, ServiceError> {
        let _serial = self.send_lock.lock().await;
        let now = self.clock.now();
        let (day_key, last_at, len) = {
            let transcript = self.transcript();
            let Some(last) = transcript.messages.last() else {
                return Ok(None);
            };
            (transcript.day_key.clone(), last.timestamp, transcript.messages.len())
        };
        if DayKey::from_datetime(now) != day_key
            || !profile::should_send_proactive(last_at, now, len, engagement)
        {
            return Ok(None);
        }
        let text = match self.load_profile(user_id).await {
            Some(profile) => profile::follow_up_message(&profile),
            None => profile::follow_up_message(&UserProfile::default()),
        };
        let message = Message::assistant(text, now);
        self.record(user_id, &day_key, message.clone()).await?;
        Ok(Some(message))
    }
}
