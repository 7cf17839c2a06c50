//! Timers for Scribble's background work.
//!
//! The round clock waits on a [`TickScheduler`] once per second to refresh
//! the countdown. Every pending timer lives in a [`TimerHandle`], so the
//! room cancels a superseded clock or restart by dropping its handle.
//!
//! ```ignore
//! let clock = TimerHandle::spawn(async move {
//!     let mut ticks = TickScheduler::with_interval(Duration::from_secs(1));
//!     loop {
//!         ticks.wait_for_tick().await;
//!         if !refresh(&room).await { break; }
//!     }
//! });
//! ```

mod timer;

pub use timer::TimerHandle;

use std::time::Duration;

use tokio::time::Instant;

/// Scheduler settings. A late tick is never made up: the next one is due
/// a full interval after it fires.
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Time between ticks, never below [`Self::MIN_INTERVAL`].
    pub interval: Duration,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self::with_interval(Duration::from_secs(1))
    }
}

impl TickConfig {
    pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

    pub fn with_interval(interval: Duration) -> Self {
        Self { interval }
    }

    /// Raises a too-short interval to [`Self::MIN_INTERVAL`].
    pub fn validated(self) -> Self {
        if self.interval >= Self::MIN_INTERVAL {
            return self;
        }
        tracing::warn!(requested = ?self.interval, "tick interval too short, clamping");
        Self {
            interval: Self::MIN_INTERVAL,
        }
    }
}

/// One fired tick.
#[derive(Debug, Clone, Copy)]
pub struct TickInfo {
    /// 1 for the first tick, then counting up.
    pub tick: u64,
    /// Fired more than a tenth of an interval late.
    pub overrun: bool,
    /// Whole intervals lost to the overrun.
    pub ticks_skipped: u64,
}

/// Fires at a fixed interval, starting one interval after construction.
pub struct TickScheduler {
    interval: Duration,
    fired: u64,
    due: Instant,
}

impl TickScheduler {
    pub fn new(config: TickConfig) -> Self {
        let TickConfig { interval } = config.validated();
        tracing::debug!(?interval, "tick scheduler created");
        Self {
            interval,
            fired: 0,
            due: Instant::now() + interval,
        }
    }

    pub fn with_interval(interval: Duration) -> Self {
        Self::new(TickConfig::with_interval(interval))
    }

    /// Sleeps until the next tick is due.
    pub async fn wait_for_tick(&mut self) -> TickInfo {
        let due = self.due;
        tokio::time::sleep_until(due).await;

        let now = Instant::now();
        let late = now.saturating_duration_since(due);
        let overrun = late > self.interval / 10;
        self.fired += 1;

        let ticks_skipped = if overrun {
            (late.as_nanos() / self.interval.as_nanos()) as u64
        } else {
            0
        };
        self.due = now + self.interval;

        if overrun {
            tracing::warn!(tick = self.fired, ?late, skipped = ticks_skipped, "tick fired late");
        } else {
            tracing::trace!(tick = self.fired, "tick");
        }

        TickInfo {
            tick: self.fired,
            overrun,
            ticks_skipped,
        }
    }

    pub fn tick_count(&self) -> u64 {
        self.fired
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}
