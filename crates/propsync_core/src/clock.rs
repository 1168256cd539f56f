//! Time sources.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Time source injected into every property.
pub trait Clock: Send + Sync {
    /// Monotonic milliseconds since an arbitrary origin.
    fn millis(&self) -> u64;

    /// Wall-clock seconds since the Unix epoch, or 0 if not yet known.
    fn unix_time(&self) -> u64;
}

/// Clock backed by the operating system.
#[derive(Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Creates a clock whose `millis` starts at zero now.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn millis(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    fn unix_time(&self) -> u64 {
        u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0)
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    millis: AtomicU64,
    unix_time: AtomicU64,
}

impl ManualClock {
    /// Creates a clock reading `millis` and `unix_time`.
    pub fn new(millis: u64, unix_time: u64) -> Self {
        Self {
            millis: AtomicU64::new(millis),
            unix_time: AtomicU64::new(unix_time),
        }
    }

    /// Moves both readings forward by `ms` milliseconds.
    pub fn advance(&self, ms: u64) {
        self.millis.fetch_add(ms, Ordering::SeqCst);
        self.unix_time.fetch_add(ms / 1000, Ordering::SeqCst);
    }

    /// Sets the monotonic reading.
    pub fn set_millis(&self, millis: u64) {
        self.millis.store(millis, Ordering::SeqCst);
    }

    /// Sets the wall-clock reading.
    pub fn set_unix_time(&self, unix_time: u64) {
        self.unix_time.store(unix_time, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn millis(&self) -> u64 {
        self.millis.load(Ordering::SeqCst)
    }

    fn unix_time(&self) -> u64 {
        self.unix_time.load(Ordering::SeqCst)
    }
}
