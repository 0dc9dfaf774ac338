//! Think-pauses between revealed chunks.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

/// Suspends the current turn for a while.
#[async_trait]
pub trait Delay: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real wall-clock pauses.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Returns immediately. For tests and non-interactive callers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

#[async_trait]
impl Delay for NoDelay {
    async fn sleep(&self, _duration: Duration) {}
}

/// A base pause plus uniform jitter in `[0, jitter]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pause {
    pub base: Duration,
    pub jitter: Duration,
}

impl Pause {
    pub const fn new(base: Duration, jitter: Duration) -> Self {
        Self { base, jitter }
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let jitter_ms = u64::try_from(self.jitter.as_millis()).unwrap_or(u64::MAX);
        self.base + Duration::from_millis(rng.gen_range(0..=jitter_ms))
    }
}

/// Pause before the first chunk and between later ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypingCadence {
    pub first: Pause,
    pub between: Pause,
}

impl Default for TypingCadence {
    fn default() -> Self {
        Self {
            first: Pause::new(Duration::from_millis(300), Duration::from_millis(200)),
            between: Pause::new(Duration::from_millis(800), Duration::from_millis(1200)),
        }
    }
}

impl TypingCadence {
    /// No pauses at all.
    pub const fn instant() -> Self {
        Self {
            first: Pause::new(Duration::ZERO, Duration::ZERO),
            between: Pause::new(Duration::ZERO, Duration::ZERO),
        }
    }

    /// One pause per chunk, the first drawn from `first`.
    pub fn plan(&self, chunks: usize) -> Vec<Duration> {
        let mut rng = rand::thread_rng();
        self.plan_with(chunks, &mut rng)
    }

    pub fn plan_with<R: Rng + ?Sized>(&self, chunks: usize, rng: &mut R) -> Vec<Duration> {
        (0..chunks)
            .map(|i| if i == 0 { self.first.sample(rng) } else { self.between.sample(rng) })
            .collect()
    }
}
