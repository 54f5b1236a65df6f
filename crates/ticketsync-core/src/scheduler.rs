//! Single repeating timer driving the refresh cycle.
//!
//! The scheduler is either idle or owns exactly one armed timer. Arming
//! while active cancels the running timer first, so a consumer can never
//! end up with two timers firing into it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, warn};

/// Shortest interval a timer can be armed with.
pub const MIN_INTERVAL: Duration = Duration::from_millis(100);

enum SchedulerState {
    Idle,
    Active {
        handle: JoinHandle<()>,
        interval: Duration,
    },
}

pub struct PollScheduler {
    state: SchedulerState,
    /// Bumped on every arm and cancel. A timer only fires while the
    /// generation it was armed under is still current.
    generation: Arc<AtomicU64>,
}

impl PollScheduler {
    pub fn new() -> Self {
        Self {
            state: SchedulerState::Idle,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Arm a timer calling `callback` every `interval`, replacing any timer
    /// already armed. The first call happens one full interval from now.
    /// Intervals below `MIN_INTERVAL` are raised to it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn arm<F>(&mut self, interval: Duration, mut callback: F)
    where
        F: FnMut() + Send + 'static,
    {
        self.cancel();

        if interval < MIN_INTERVAL {
            warn!(
                interval_ms = interval.as_millis() as u64,
                min_ms = MIN_INTERVAL.as_millis() as u64,
                "Poll interval below minimum, clamping"
            );
        }
        let interval = interval.max(MIN_INTERVAL);

        let armed_at = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let generation = Arc::clone(&self.generation);

        let handle = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if generation.load(Ordering::SeqCst) != armed_at {
                    break;
                }
                callback();
            }
        });

        debug!(interval_ms = interval.as_millis() as u64, generation = armed_at, "Poll timer armed");
        self.state = SchedulerState::Active { handle, interval };
    }

    /// Cancel the armed timer, if any. Safe to call any number of times.
    pub fn cancel(&mut self) {
        if let SchedulerState::Active { handle, .. } =
            std::mem::replace(&mut self.state, SchedulerState::Idle)
        {
            self.generation.fetch_add(1, Ordering::SeqCst);
            handle.abort();
            debug!("Poll timer cancelled");
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, SchedulerState::Active { .. })
    }

    /// Interval of the armed timer.
    pub fn interval(&self) -> Option<Duration> {
        match &self.state {
            SchedulerState::Active { interval, .. } => Some(*interval),
            SchedulerState::Idle => None,
        }
    }
}

impl Default for PollScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for PollScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}
