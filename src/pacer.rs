use std::time::Duration;
use tracing::debug;

/// Milliseconds between ticks at `wpm`, truncated like the slider readout.
pub fn tick_period(wpm: u32) -> Duration {
    Duration::from_millis(60_000 / u64::from(wpm.max(1)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum PacerState {
    Idle,
    Running,
}

/// Cancellable repeating deadline timer.
///
/// The pacer never sleeps itself. The owner asks for the next deadline, waits
/// on whatever it waits on, and then calls [`PacerClock::poll`]. The rate is
/// passed in on every scheduling decision so a WPM change applies to the
/// next tick that gets scheduled.
#[derive(Debug, Clone)]
pub struct PacerClock {
    state: PacerState,
    next_tick_at: Option<Duration>,
}

impl PacerClock {
    pub fn new() -> Self {
        Self {
            state: PacerState::Idle,
            next_tick_at: None,
        }
    }

    pub fn state(&self) -> PacerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == PacerState::Running
    }

    /// Begin ticking. Returns false when already running.
    pub fn start(&mut self, now: Duration, wpm: u32) -> bool {
        if self.is_running() {
            return false;
        }
        self.state = PacerState::Running;
        self.next_tick_at = Some(now + tick_period(wpm));
        debug!(wpm, "pacer started");
        true
    }

    /// Stop ticking and drop the pending deadline. Returns false when idle.
    pub fn pause(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.state = PacerState::Idle;
        self.next_tick_at = None;
        debug!("pacer paused");
        true
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.next_tick_at
    }

    /// How long the owner may wait before the next tick is due.
    pub fn time_until_next(&self, now: Duration) -> Option<Duration> {
        self.next_tick_at
            .map(|deadline| deadline.saturating_sub(now))
    }

    /// Fire at most one tick if the deadline has passed, scheduling the next
    /// one at the current rate.
    pub fn poll(&mut self, now: Duration, wpm: u32) -> bool {
        let Some(deadline) = self.next_tick_at else {
            return false;
        };
        if now < deadline {
            return false;
        }

        let mut next = deadline + tick_period(wpm);
        if next <= now {
            // Fell behind (host was busy); resync instead of bursting.
            next = now + tick_period(wpm);
        }
        self.next_tick_at = Some(next);
        true
    }
}

impl Default for PacerClock {
    fn default() -> Self {
        Self::new()
    }
}
