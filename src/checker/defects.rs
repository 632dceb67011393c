use std::iter::FusedIterator;

use tracing::error;

use crate::error::AuditKitError;
use crate::Result;

use super::{Checker, Lifecycle};

/// Lazy stream of defects produced by [`Checker::check`].
///
/// Subjects are pulled one at a time from the underlying source; invalid
/// subjects are skipped, failed checks are logged and contained, defects
/// come out in subject order. Finalization (`tear_down`) runs exactly once
/// on every exit path: exhaustion, explicit [`close`](Self::close), or drop.
pub struct Defects<'a, C: Checker> {
    checker: &'a C,
    subjects: C::Subjects,
    finished: bool,
    teardown: Option<AuditKitError>,
}

impl<'a, C: Checker> Defects<'a, C> {
    pub(crate) fn new(checker: &'a C, subjects: C::Subjects) -> Self {
        Self {
            checker,
            subjects,
            finished: false,
            teardown: None,
        }
    }

    /// Runs `tear_down` once the stream will produce no more defects.
    fn finalize(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        match self.checker.tear_down() {
            Ok(()) => self.checker.core().lifecycle().enter(Lifecycle::Idle),
            Err(source) => {
                self.checker.core().lifecycle().enter(Lifecycle::Failed);
                self.teardown = Some(AuditKitError::TearDown {
                    checker: self.checker.info().label().to_string(),
                    source: Box::new(source),
                });
            }
        }
    }

    /// Closes the stream, finalizing it if needed, and reports the
    /// `tear_down` outcome.
    ///
    /// Defects already produced stay valid even when teardown fails.
    ///
    /// # Errors
    /// Returns [`AuditKitError::TearDown`] if the teardown hook failed.
    pub fn close(mut self) -> Result<()> {
        self.finalize();
        match self.teardown.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl<C: Checker> std::fmt::Debug for Defects<'_, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Defects")
            .field("finished", &self.finished)
            .field("teardown", &self.teardown)
            .finish_non_exhaustive()
    }
}

impl<C: Checker> Iterator for Defects<'_, C> {
    type Item = C::Defect;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        loop {
            let Some(subject) = self.subjects.next() else {
                self.finalize();
                return None;
            };
            if !self.checker.is_valid_subject(&subject) {
                continue;
            }
            let stats = self.checker.core().stats();
            stats.record_subject();
            stats.duration().resume();
            let outcome = self.checker.check_subject(&subject);
            stats.duration().pause();
            match outcome {
                Ok(Some(defect)) => return Some(defect),
                Ok(None) => {}
                Err(e) => {
                    error!(
                        checker = %self.checker.info().label(),
                        subject = ?subject,
                        error = %e.messages(),
                        "checker failed on subject, skipping"
                    );
                }
            }
        }
    }
}

impl<C: Checker> FusedIterator for Defects<'_, C> {}

impl<C: Checker> Drop for Defects<'_, C> {
    fn drop(&mut self) {
        self.finalize();
        if let Some(e) = self.teardown.take() {
            error!(
                checker = %self.checker.info().label(),
                error = %e.messages(),
                "defect stream dropped after a failed teardown"
            );
        }
    }
}

#[cfg(test)]
#[path = "defects_tests.rs"]
mod tests;
