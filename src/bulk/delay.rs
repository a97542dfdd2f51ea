//! Randomized pacing between bulk messages.

use super::cancel::CancellationToken;
use herald_core::config::BulkConfig;
use rand::Rng;
use std::time::Duration;
use tokio::time::Instant;

/// How an inter-message wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Elapsed,
    Cancelled,
}

/// Draws random delays and waits them out, reporting the countdown.
#[derive(Debug, Clone)]
pub struct DelayScheduler {
    min_secs: u64,
    max_secs: u64,
    tick: Duration,
}

impl DelayScheduler {
    pub fn new(min_secs: u64, max_secs: u64, tick: Duration) -> Self {
        Self {
            min_secs: min_secs.min(max_secs),
            max_secs: max_secs.max(min_secs),
            tick: tick.max(Duration::from_millis(1)),
        }
    }

    pub fn from_config(config: &BulkConfig) -> Self {
        Self::new(
            config.min_delay_secs,
            config.max_delay_secs,
            config.poll_interval(),
        )
    }

    /// Uniform whole-second delay in `[min, max]`, in milliseconds.
    pub fn next_delay_ms(&self) -> u64 {
        next_delay_ms(self.min_secs, self.max_secs)
    }

    /// Sleep for `duration` unless `cancel` fires first.
    ///
    /// `on_tick` receives the remaining milliseconds at the start and
    /// after every tick, and `0` when the wait ends either way.
    pub async fn wait(
        &self,
        duration: Duration,
        cancel: &CancellationToken,
        mut on_tick: impl FnMut(u64),
    ) -> WaitOutcome {
        let deadline = Instant::now() + duration;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                on_tick(0);
                return WaitOutcome::Elapsed;
            }
            on_tick(remaining.as_millis() as u64);

            tokio::select! {
                _ = cancel.cancelled() => {
                    on_tick(0);
                    return WaitOutcome::Cancelled;
                }
                _ = tokio::time::sleep(remaining.min(self.tick)) => {}
            }
        }
    }
}

/// Uniform whole-second delay in `[min_secs, max_secs]`, in milliseconds.
pub fn next_delay_ms(min_secs: u64, max_secs: u64) -> u64 {
    let (lo, hi) = if min_secs <= max_secs {
        (min_secs, max_secs)
    } else {
        (max_secs, min_secs)
    };
    rand::thread_rng().gen_range(lo..=hi) * 1000
}
