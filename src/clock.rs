use chrono::{DateTime, Local, TimeDelta};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Time source for pacing and session accounting.
///
/// `now` is monotonic and measured from an arbitrary origin; `wall_time` is
/// only used for timestamps that end up in records.
pub trait Clock: Send + Sync {
    fn now(&self) -> Duration;
    fn wall_time(&self) -> DateTime<Local>;
}

pub type SharedClock = Arc<dyn Clock>;

#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    pub fn shared() -> SharedClock {
        Arc::new(Self::new())
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn wall_time(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Virtual clock for tests and headless drivers. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    elapsed_ms: Arc<AtomicU64>,
    epoch: DateTime<Local>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::starting_at(Local::now())
    }

    pub fn starting_at(epoch: DateTime<Local>) -> Self {
        Self {
            elapsed_ms: Arc::new(AtomicU64::new(0)),
            epoch,
        }
    }

    pub fn advance(&self, by: Duration) {
        self.elapsed_ms
            .fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn advance_secs(&self, secs: u64) {
        self.advance(Duration::from_secs(secs));
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms.load(Ordering::SeqCst))
    }

    fn wall_time(&self) -> DateTime<Local> {
        let elapsed = TimeDelta::milliseconds(self.elapsed_ms.load(Ordering::SeqCst) as i64);
        self.epoch + elapsed
    }
}
