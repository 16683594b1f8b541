use std::cell::Cell;
use std::time::{Duration, Instant};

/// Source of monotonic time for the training budget.
///
/// `now` returns the time elapsed since an arbitrary, fixed origin; only
/// differences between two readings are meaningful.
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Wall-clock time via `std::time::Instant`.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> SystemClock {
        SystemClock { origin: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        SystemClock::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Deterministic clock that moves forward by `step` every time it is read.
///
/// The training loop reads the clock once when it starts and once after each
/// batch, so with `step = 1s` a budget of `n` seconds runs exactly `n` batches.
#[derive(Debug)]
pub struct SteppingClock {
    now: Cell<Duration>,
    step: Duration,
}

impl SteppingClock {
    pub fn new(step: Duration) -> SteppingClock {
        SteppingClock { now: Cell::new(Duration::ZERO), step }
    }

    /// Number of whole steps read so far.
    pub fn reads(&self) -> u128 {
        if self.step.is_zero() {
            0
        } else {
            self.now.get().as_nanos() / self.step.as_nanos()
        }
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> Duration {
        let current = self.now.get();
        self.now.set(current + self.step);
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stepping_clock_advances_per_read() {
        let clock = SteppingClock::new(Duration::from_millis(250));
        assert_eq!(clock.now(), Duration::ZERO);
        assert_eq!(clock.now(), Duration::from_millis(250));
        assert_eq!(clock.now(), Duration::from_millis(500));
        assert_eq!(clock.reads(), 3);
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
