use std::io::IsTerminal;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use indicatif::{ProgressBar, ProgressStyle};

/// Progress spinner for checker runs.
///
/// Subject sequences may be unbounded, so this counts instead of measuring:
/// it shows how many subjects were checked so far. Automatically disabled in
/// quiet mode or when stderr is not a TTY.
#[derive(Clone)]
pub struct CheckProgress {
    progress_bar: ProgressBar,
    counter: Arc<AtomicU64>,
}

impl CheckProgress {
    /// Creates a new progress spinner.
    ///
    /// The spinner outputs to stderr to avoid interfering with stdout
    /// output.
    ///
    /// # Panics
    ///
    /// This function will panic if the progress template is invalid.
    /// The template is a compile-time constant, so this should never happen.
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        let is_tty = std::io::stderr().is_terminal();
        Self::new_with_visibility(quiet, is_tty)
    }

    /// Creates a new progress spinner with explicit visibility control.
    ///
    /// This is an internal constructor that allows testing the visible
    /// spinner path even when running in non-TTY environments.
    fn new_with_visibility(quiet: bool, is_tty: bool) -> Self {
        let progress_bar = if quiet || !is_tty {
            ProgressBar::hidden()
        } else {
            Self::create_visible_spinner()
        };

        Self {
            progress_bar,
            counter: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Creates a visible spinner with styling.
    fn create_visible_spinner() -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} Checking {pos} subjects")
                // SAFETY: Template is a static string with valid format specifiers
                .expect("valid template"),
        );
        pb
    }

    /// Increments the progress counter by 1.
    ///
    /// Thread-safe for use with rayon parallel iterators.
    pub fn inc(&self) {
        let count = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        self.progress_bar.set_position(count);
    }

    /// Moves the progress counter to an externally tracked position.
    pub fn set(&self, position: u64) {
        self.counter.store(position, Ordering::Relaxed);
        self.progress_bar.set_position(position);
    }

    /// Finishes the spinner and clears it from the terminal.
    pub fn finish(&self) {
        self.progress_bar.finish_and_clear();
    }
}

#[cfg(test)]
#[path = "progress_tests.rs"]
mod tests;
