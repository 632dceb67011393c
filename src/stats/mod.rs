mod stopwatch;

pub use stopwatch::Stopwatch;

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Execution statistics for one checker instance.
///
/// The counter and the stopwatch are written by the thread driving the
/// pipeline (the parallel runner widens the counter to multiple writers,
/// which the atomic supports, and takes over the stopwatch itself). Reads
/// are safe from any thread, so a monitoring thread may poll throughput
/// while a run is in flight.
pub struct CheckerStats {
    subjects_checked: AtomicU64,
    duration: Stopwatch,
}

impl CheckerStats {
    #[must_use]
    pub fn new() -> Self {
        Self {
            subjects_checked: AtomicU64::new(0),
            duration: Stopwatch::new(),
        }
    }

    /// Number of subjects attempted so far. Failed checks count: "checked"
    /// means "attempted", not "succeeded".
    #[must_use]
    pub fn subjects_checked(&self) -> u64 {
        self.subjects_checked.load(Ordering::Acquire)
    }

    /// Counts one attempted subject.
    pub fn record_subject(&self) {
        self.subjects_checked.fetch_add(1, Ordering::AcqRel);
    }

    /// Resets the subject counter for a new run. The stopwatch keeps
    /// accumulating across runs; callers wanting per-run timing difference
    /// it around the run.
    pub fn reset_subjects(&self) {
        self.subjects_checked.store(0, Ordering::Release);
    }

    /// Cumulative active check time.
    #[must_use]
    pub const fn duration(&self) -> &Stopwatch {
        &self.duration
    }

    /// Mean active check time per attempted subject, or `None` before any
    /// subject was attempted.
    #[must_use]
    pub fn avg_duration(&self) -> Option<Duration> {
        let checked = self.subjects_checked();
        if checked == 0 {
            return None;
        }
        let micros = self.duration.elapsed().as_micros() / u128::from(checked);
        Some(Duration::from_micros(
            u64::try_from(micros).unwrap_or(u64::MAX),
        ))
    }

    /// Attempted subjects per second of active check time, or `None` while
    /// no time has accumulated.
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Precision loss is acceptable for a throughput figure
    pub fn checks_per_second(&self) -> Option<f64> {
        let elapsed = self.duration.elapsed();
        if elapsed.is_zero() {
            return None;
        }
        Some(self.subjects_checked() as f64 / elapsed.as_secs_f64())
    }
}

impl Default for CheckerStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
