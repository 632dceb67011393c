use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Sentinel stored in `resumed_at_us` while the stopwatch is idle.
const IDLE: u64 = u64::MAX;

/// A pausable stopwatch accumulating active time across resume/pause cycles.
///
/// Mutations (`resume`/`pause`/`reset`) belong to a single writer; reads go
/// through atomics, so another thread may poll [`elapsed`](Self::elapsed) or
/// [`sample`](Self::sample) while a run is in flight.
pub struct Stopwatch {
    base: Instant,
    accumulated_us: AtomicU64,
    resumed_at_us: AtomicU64,
}

impl Stopwatch {
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            accumulated_us: AtomicU64::new(0),
            resumed_at_us: AtomicU64::new(IDLE),
        }
    }

    /// Microseconds since the stopwatch was constructed, clamped below the
    /// idle sentinel.
    fn now_us(&self) -> u64 {
        u64::try_from(self.base.elapsed().as_micros()).unwrap_or(IDLE - 1)
    }

    /// Starts the stopwatch. No-op when already running.
    pub fn resume(&self) {
        let _ = self.resumed_at_us.compare_exchange(
            IDLE,
            self.now_us(),
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }

    /// Stops the stopwatch, folding the in-flight segment into the total.
    /// No-op when idle.
    pub fn pause(&self) {
        let started = self.resumed_at_us.swap(IDLE, Ordering::AcqRel);
        if started != IDLE {
            let segment = self.now_us().saturating_sub(started);
            self.accumulated_us.fetch_add(segment, Ordering::AcqRel);
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.resumed_at_us.load(Ordering::Acquire) != IDLE
    }

    /// Accumulated active time. Excludes the in-flight segment while running.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        Duration::from_micros(self.accumulated_us.load(Ordering::Acquire))
    }

    /// Accumulated active time including the in-flight segment, if any.
    #[must_use]
    pub fn sample(&self) -> Duration {
        let mut total = self.accumulated_us.load(Ordering::Acquire);
        let started = self.resumed_at_us.load(Ordering::Acquire);
        if started != IDLE {
            total = total.saturating_add(self.now_us().saturating_sub(started));
        }
        Duration::from_micros(total)
    }

    /// Clears the accumulated total and stops the stopwatch.
    pub fn reset(&self) {
        self.resumed_at_us.store(IDLE, Ordering::Release);
        self.accumulated_us.store(0, Ordering::Release);
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "stopwatch_tests.rs"]
mod tests;
