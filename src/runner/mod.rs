mod progress;

pub use progress::CheckProgress;

use std::time::Duration;

use rayon::prelude::*;
use tracing::error;

use crate::Result;
use crate::checker::{Checker, Lifecycle};
use crate::error::AuditKitError;

/// Outcome of driving one checker run to completion.
#[derive(Debug)]
pub struct RunReport<D> {
    /// Defects in subject order.
    pub defects: Vec<D>,
    /// Subjects attempted in this run.
    pub subjects_checked: u64,
    /// Active check time spent in this run (cumulative stopwatch
    /// differenced around the run).
    pub elapsed: Duration,
    /// Mean active check time per attempted subject, over the checker's
    /// whole lifetime.
    pub avg_duration: Option<Duration>,
    /// Attempted subjects per second of active check time, over the
    /// checker's whole lifetime.
    pub checks_per_second: Option<f64>,
}

/// Drives a checker to completion and reports its defects and throughput.
///
/// The sequential [`run`](Self::run) pulls the lazy defect stream to
/// exhaustion. The parallel [`run_parallel`](Self::run_parallel) is the
/// external-wrapper form of subject-level parallelism: it materializes the
/// subject sequence, fans the per-subject checks out over the rayon pool,
/// and takes over the stopwatch (one resume/pause around the whole batch).
pub struct CheckRunner {
    quiet: bool,
}

impl CheckRunner {
    #[must_use]
    pub const fn new() -> Self {
        Self { quiet: false }
    }

    /// Disables the progress spinner.
    #[must_use]
    pub const fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Runs the checker sequentially over its lazy defect stream.
    ///
    /// # Errors
    /// Propagates subject-source failures, `SetUp` and `TearDown` errors;
    /// per-subject failures are contained by the pipeline as usual.
    pub fn run<C: Checker>(&self, checker: &C) -> Result<RunReport<C::Defect>> {
        let started = checker.duration().elapsed();
        let mut stream = checker.check()?;
        let progress = CheckProgress::new(self.quiet);

        let mut defects = Vec::new();
        for defect in stream.by_ref() {
            defects.push(defect);
            progress.set(checker.stats().subjects_checked());
        }
        let closed = stream.close();
        progress.finish();
        closed?;

        Ok(Self::report(checker, defects, started))
    }

    /// Runs the checker with subject-level parallelism.
    ///
    /// The subject sequence is materialized up front, so this variant is
    /// only suitable for finite sources. Defects keep their subject order;
    /// the counter semantics and both hook failure modes match the
    /// sequential pipeline.
    ///
    /// # Errors
    /// Propagates subject-source failures, `SetUp` and `TearDown` errors.
    pub fn run_parallel<C>(&self, checker: &C) -> Result<RunReport<C::Defect>>
    where
        C: Checker + Sync,
        C::Subject: Send + Sync,
        C::Defect: Send,
    {
        let subjects = checker.subjects()?;
        if let Err(source) = checker.set_up() {
            checker.core().lifecycle().enter(Lifecycle::Failed);
            return Err(AuditKitError::SetUp {
                checker: checker.info().label().to_string(),
                source: Box::new(source),
            });
        }
        let stats = checker.stats();
        stats.reset_subjects();
        checker.core().lifecycle().enter(Lifecycle::Running);

        let subjects: Vec<_> = subjects.collect();
        let progress = CheckProgress::new(self.quiet);
        let started = stats.duration().elapsed();

        stats.duration().resume();
        let defects: Vec<C::Defect> = subjects
            .par_iter()
            .filter(|subject| checker.is_valid_subject(subject))
            .filter_map(|subject| {
                stats.record_subject();
                let outcome = checker.check_subject(subject);
                progress.inc();
                match outcome {
                    Ok(defect) => defect,
                    Err(e) => {
                        error!(
                            checker = %checker.info().label(),
                            subject = ?subject,
                            error = %e.messages(),
                            "checker failed on subject, skipping"
                        );
                        None
                    }
                }
            })
            .collect();
        stats.duration().pause();
        progress.finish();

        if let Err(source) = checker.tear_down() {
            checker.core().lifecycle().enter(Lifecycle::Failed);
            return Err(AuditKitError::TearDown {
                checker: checker.info().label().to_string(),
                source: Box::new(source),
            });
        }
        checker.core().lifecycle().enter(Lifecycle::Idle);

        Ok(Self::report(checker, defects, started))
    }

    fn report<C: Checker>(
        checker: &C,
        defects: Vec<C::Defect>,
        started: Duration,
    ) -> RunReport<C::Defect> {
        let stats = checker.stats();
        RunReport {
            defects,
            subjects_checked: stats.subjects_checked(),
            elapsed: stats.duration().elapsed().saturating_sub(started),
            avg_duration: stats.avg_duration(),
            checks_per_second: stats.checks_per_second(),
        }
    }
}

impl Default for CheckRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
