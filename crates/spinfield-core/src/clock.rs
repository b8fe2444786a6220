//! Time source for [`TimerQueue::tick_now`](crate::TimerQueue::tick_now).

use std::sync::OnceLock;
use std::time::Duration;
use web_time::Instant;

static CLOCK: OnceLock<Box<dyn Clock>> = OnceLock::new();

/// Current time from the installed clock, or the system time if none is.
pub fn now() -> Instant {
    CLOCK.get().map_or_else(Instant::now, |c| c.now())
}

pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> Instant;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Installs the process clock. The first install wins; later calls are
/// ignored and logged.
pub fn set_clock(clock: Box<dyn Clock>) {
    if CLOCK.set(clock).is_err() {
        log::debug!("clock already installed, keeping the first one");
    }
}

/// Installs [`SystemClock`] unless a clock is already set.
pub fn ensure_system_clock() {
    let _ = CLOCK.set(Box::new(SystemClock));
}

/// Fixed point in time, moved forward by hand.
#[derive(Clone, Copy, Debug)]
pub struct TestClock {
    pub t: Instant,
}

impl TestClock {
    pub fn new() -> Self {
        Self { t: Instant::now() }
    }

    pub fn advance(&mut self, by: Duration) -> Instant {
        self.t += by;
        self.t
    }
}

impl Default for TestClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TestClock {
    fn now(&self) -> Instant {
        self.t
    }
}
