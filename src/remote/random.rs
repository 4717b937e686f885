use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use rand::Rng;

/// Source of uniformly distributed integers.
///
/// Injected wherever randomness drives behavior (failure simulation, remote
/// balance generation) so tests can substitute a deterministic implementation.
#[async_trait]
pub trait RandomSource: Send + Sync {
    /// Draw a uniformly distributed integer in the inclusive range `[min, max]`.
    async fn draw(&self, min: i64, max: i64) -> i64;
}

/// Production source backed by the thread-local RNG.
pub struct ThreadRngSource;

#[async_trait]
impl RandomSource for ThreadRngSource {
    async fn draw(&self, min: i64, max: i64) -> i64 {
        rand::thread_rng().gen_range(min..=max)
    }
}

/// Deterministic source replaying a scripted sequence of draws.
///
/// Scripted values are returned verbatim, ignoring the requested range. Once
/// the sequence is exhausted, every draw yields `min`.
pub struct SequenceSource {
    draws: Mutex<VecDeque<i64>>,
}

impl SequenceSource {
    pub fn new(draws: impl IntoIterator<Item = i64>) -> Self {
        Self {
            draws: Mutex::new(draws.into_iter().collect()),
        }
    }

    /// Number of scripted draws not yet consumed.
    pub fn remaining(&self) -> usize {
        self.draws.lock().expect("sequence lock poisoned").len()
    }
}

#[async_trait]
impl RandomSource for SequenceSource {
    async fn draw(&self, min: i64, _max: i64) -> i64 {
        self.draws
            .lock()
            .expect("sequence lock poisoned")
            .pop_front()
            .unwrap_or(min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_thread_rng_source_respects_bounds() {
        let source = ThreadRngSource;
        for _ in 0..100 {
            let value = source.draw(0, 10).await;
            assert!((0..=10).contains(&value));
        }
        assert_eq!(source.draw(7, 7).await, 7);
    }

    #[tokio::test]
    async fn test_sequence_source_replays_in_order() {
        let source = SequenceSource::new([3, 1, 4]);
        assert_eq!(source.draw(0, 100).await, 3);
        assert_eq!(source.draw(0, 100).await, 1);
        assert_eq!(source.draw(0, 100).await, 4);
        assert_eq!(source.remaining(), 0);
    }

    #[tokio::test]
    async fn test_sequence_source_yields_min_when_exhausted() {
        let source = SequenceSource::new([]);
        assert_eq!(source.draw(5, 10).await, 5);
    }
}
