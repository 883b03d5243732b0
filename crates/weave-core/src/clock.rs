use std::cell::Cell;
use std::rc::Rc;
use std::sync::OnceLock;
use std::time::Instant;

/// Abstracts "what time is it" for the [`crate::scheduler::UpdateScheduler`]
/// and [`crate::bridge_client::BridgeClient`] retry/backoff logic, the way
/// the teacher's tests inject a `MockScheduler` instead of driving a real
/// `LocalScheduler` off the OS timer (spec §9: debounce/cooldown should be
/// deterministically testable).
///
/// All times are milliseconds since an arbitrary, clock-specific epoch —
/// only differences between two calls are meaningful.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// The production clock, backed by [`std::time::Instant`].
#[derive(Debug, Default)]
pub struct SystemClock {
    start: OnceLock<Instant>,
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.start.get_or_init(Instant::now).elapsed().as_millis() as u64
    }
}

/// A manually-advanced clock for tests: nothing moves until [`ManualClock::advance`]
/// is called, so debounce/cooldown/timeout assertions never race real time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }

    pub fn set(&self, ms: u64) {
        self.now.set(ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}
