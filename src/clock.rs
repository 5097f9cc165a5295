// clock.rs

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Time source for a session. Everything that needs "now" asks a `Clock`,
/// so tests can drive sessions without sleeping.
pub trait Clock: Send {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    offset: Arc<Mutex<Duration>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        ManualClock {
            origin: Instant::now(),
            offset: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut offset) = self.offset.lock() {
            *offset += by;
        }
    }

    /// Moves the clock to `origin + at`. Going backwards is ignored.
    pub fn set_elapsed(&self, at: Duration) {
        if let Ok(mut offset) = self.offset.lock() {
            if at > *offset {
                *offset = at;
            }
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.offset.lock().map(|offset| *offset).unwrap_or_default()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }
}
