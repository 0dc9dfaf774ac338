use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use sofia_core::{Clock, Message, SystemClock, split_into_chunks};

use crate::delay::{Delay, TokioDelay, TypingCadence};
use crate::error::ServiceError;
use crate::fallback::fallback_reply;
use crate::provider::ReplyProvider;

/// Receives each revealed chunk in order.
pub type ChunkSink<'a> = &'a mut (dyn FnMut(&str) -> anyhow::Result<()> + Send);

/// Outcome of one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReply {
    /// Full assistant text, un-chunked.
    pub text: String,
    /// Pieces delivered to the sink, in order.
    pub chunks: Vec<String>,
    /// Set when the provider failed and a canned reply was used.
    pub degraded: bool,
}

/// Anything that can turn a user message into an assistant reply.
#[async_trait]
pub trait TurnHandler: Send + Sync {
    async fn respond(&self, text: &str, on_chunk: ChunkSink<'_>) -> Result<TurnReply, ServiceError>;

    /// Forgets any conversation state kept between turns.
    fn reset(&self) {}
}

/// Drives one chat turn: ask the provider, chunk the answer, reveal the
/// chunks with think-pauses, fall back to a canned reply on provider failure.
pub struct TurnService {
    provider: Arc<dyn ReplyProvider>,
    delay: Arc<dyn Delay>,
    clock: Arc<dyn Clock>,
    cadence: TypingCadence,
    context: Mutex<Option<String>>,
    history: Mutex<Vec<Message>>,
}

impl TurnService {
    #[must_use]
    pub fn new(provider: Arc<dyn ReplyProvider>) -> Self {
        Self {
            provider,
            delay: Arc::new(TokioDelay),
            clock: Arc::new(SystemClock),
            cadence: TypingCadence::default(),
            context: Mutex::new(None),
            history: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Arc<dyn Delay>) -> Self {
        self.delay = delay;
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub const fn with_cadence(mut self, cadence: TypingCadence) -> Self {
        self.cadence = cadence;
        self
    }

    /// Extra system-instruction context sent with every following turn.
    pub fn set_context(&self, context: Option<String>) {
        *self.context.lock().unwrap_or_else(PoisonError::into_inner) =
            context.filter(|c| !c.trim().is_empty());
    }

    pub fn history(&self) -> Vec<Message> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn clear_history(&self) {
        self.history.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }

    /// Runs one turn, revealing chunks through `on_chunk`.
    ///
    /// Provider failures never surface here; they produce a degraded reply.
    ///
    /// # Errors
    /// Returns `ServiceError::Callback` if `on_chunk` fails. The turn is then
    /// not recorded in history.
    pub async fn send_message(
        &self,
        text: &str,
        on_chunk: ChunkSink<'_>,
    ) -> Result<TurnReply, ServiceError> {
        let user = Message::user(text, self.clock.now());
        let context = self.context.lock().unwrap_or_else(PoisonError::into_inner).clone();

        let (reply, degraded) = match self.provider.reply(text, context.as_deref()).await {
            Ok(reply) if !reply.trim().is_empty() => (reply, false),
            Ok(_) => {
                tracing::warn!("Provider returned blank text, using fallback reply");
                (fallback_reply(text), true)
            },
            Err(e) => {
                tracing::warn!(error = %e, transient = e.is_transient(), "Provider failed, using fallback reply");
                (fallback_reply(text), true)
            },
        };

        let chunks = if degraded { vec![reply.clone()] } else { split_into_chunks(&reply) };
        let pauses = self.cadence.plan(chunks.len());
        for (chunk, pause) in chunks.iter().zip(pauses) {
            self.delay.sleep(pause).await;
            on_chunk(chunk).map_err(ServiceError::Callback)?;
        }
        tracing::debug!(chunks = chunks.len(), degraded, "Turn delivered");

        let assistant = Message::assistant(reply.clone(), self.clock.now());
        {
            let mut history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
            history.push(user);
            history.push(assistant);
        }
        Ok(TurnReply { text: reply, chunks, degraded })
    }
}

#[async_trait]
impl TurnHandler for TurnService {
    async fn respond(&self, text: &str, on_chunk: ChunkSink<'_>) -> Result<TurnReply, ServiceError> {
        self.send_message(text, on_chunk).await
    }

    fn reset(&self) {
        self.clear_history();
    }
}
