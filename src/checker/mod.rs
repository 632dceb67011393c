mod defects;
mod info;
mod lifecycle;

pub use defects::Defects;
pub use info::{CheckerInfo, VERSION_PREFIX};
pub use lifecycle::Lifecycle;

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{error, warn};

use crate::error::AuditKitError;
use crate::stats::{CheckerStats, Stopwatch};
use crate::Result;

use lifecycle::LifecycleCell;

/// State block embedded in every checker implementation: identity, run
/// statistics, lifecycle cell and the caller-owned configuration reference.
pub struct CheckerCore<Cfg> {
    info: CheckerInfo,
    stats: CheckerStats,
    lifecycle: LifecycleCell,
    config: Option<Arc<Cfg>>,
}

impl<Cfg> CheckerCore<Cfg> {
    /// Creates the state block for a concrete checker type.
    #[must_use]
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            info: CheckerInfo::new(class_name),
            stats: CheckerStats::new(),
            lifecycle: LifecycleCell::new(),
            config: None,
        }
    }

    #[must_use]
    pub const fn info(&self) -> &CheckerInfo {
        &self.info
    }

    pub fn info_mut(&mut self) -> &mut CheckerInfo {
        &mut self.info
    }

    #[must_use]
    pub const fn stats(&self) -> &CheckerStats {
        &self.stats
    }

    #[must_use]
    pub fn state(&self) -> Lifecycle {
        self.lifecycle.get()
    }

    pub(crate) const fn lifecycle(&self) -> &LifecycleCell {
        &self.lifecycle
    }

    /// The configuration stored by `init`, if any.
    #[must_use]
    pub const fn config(&self) -> Option<&Arc<Cfg>> {
        self.config.as_ref()
    }

    pub fn set_config(&mut self, config: Arc<Cfg>) {
        self.config = Some(config);
    }
}

/// A checker audits a stream of subjects and yields at most one defect per
/// subject.
///
/// Implementations supply the domain pieces: the subject source, the
/// validity filter, the per-subject check and the `set_up`/`tear_down`
/// hooks. The engine supplies the pipeline ([`check`](Self::check)), the
/// lifecycle, the statistics and the metadata persistence.
pub trait Checker {
    /// Domain object to audit. `Debug` so isolated failures can name it.
    type Subject: fmt::Debug;

    /// Finding produced when a subject fails a check; absence means "no
    /// issue found".
    type Defect;

    /// Caller-owned configuration scoped to this checker type.
    type Config;

    /// Lazy, single-pass subject sequence. Not restartable: a second
    /// [`subjects`](Self::subjects) call may yield a fresh sequence or
    /// fail, depending on the implementation.
    type Subjects: Iterator<Item = Self::Subject>;

    fn core(&self) -> &CheckerCore<Self::Config>;

    fn core_mut(&mut self) -> &mut CheckerCore<Self::Config>;

    /// Generates the subject sequence from the current configuration.
    ///
    /// # Errors
    /// Implementation-defined; a failure here aborts [`check`](Self::check)
    /// before any lifecycle hook runs.
    fn subjects(&self) -> Result<Self::Subjects>;

    /// Returns true if the subject should be checked at all. Invalid
    /// subjects are skipped entirely: not counted, not checked, never
    /// logged.
    fn is_valid_subject(&self, subject: &Self::Subject) -> bool;

    /// Runs once before any subject is checked.
    ///
    /// # Errors
    /// A failure aborts the run fatally before any subject is consumed.
    fn set_up(&self) -> Result<()>;

    /// Runs once after the last subject was checked, or when the consumer
    /// closed the stream early.
    ///
    /// # Errors
    /// A failure is fatal but surfaces only after all defects were
    /// delivered; it never invalidates defects already emitted.
    fn tear_down(&self) -> Result<()>;

    /// Checks one subject; `Ok(None)` means no defect found.
    ///
    /// # Errors
    /// A failure is contained by the pipeline: logged, the subject yields
    /// no defect, and the run continues.
    fn check_subject(&self, subject: &Self::Subject) -> Result<Option<Self::Defect>>;

    // ------------------------------------------------------------------
    // Provided operations
    // ------------------------------------------------------------------

    /// Stores the caller-owned configuration and moves the lifecycle to
    /// `Configured`. Reports failure when the configuration is absent.
    ///
    /// Concrete checkers may override to add validation.
    fn init(&mut self, config: Option<Arc<Self::Config>>) -> bool {
        match config {
            Some(config) => {
                self.core_mut().set_config(config);
                self.core().lifecycle().enter(Lifecycle::Configured);
                true
            }
            None => false,
        }
    }

    /// Returns true if the checker is well configured and can be used.
    fn is_valid(&self) -> bool {
        self.info().is_valid()
    }

    fn info(&self) -> &CheckerInfo {
        self.core().info()
    }

    fn stats(&self) -> &CheckerStats {
        self.core().stats()
    }

    fn state(&self) -> Lifecycle {
        self.core().state()
    }

    /// Cumulative active check time across runs.
    fn duration(&self) -> &Stopwatch {
        self.stats().duration()
    }

    /// Mean active check time per attempted subject, or `None` before any
    /// subject was attempted.
    fn avg_duration(&self) -> Option<Duration> {
        self.stats().avg_duration()
    }

    /// Attempted subjects per second of active check time, or `None` while
    /// no time has accumulated.
    fn checks_per_second(&self) -> Option<f64> {
        self.stats().checks_per_second()
    }

    /// Runs the checker over its subject sequence.
    ///
    /// The returned stream is lazy: subjects are pulled and checked as the
    /// consumer pulls defects. One subject's failure never aborts the run;
    /// only the lifecycle hooks can. Re-entrant runs on one instance are
    /// not supported.
    ///
    /// # Errors
    /// Propagates [`subjects`](Self::subjects) failures and returns
    /// [`AuditKitError::SetUp`] when the setup hook fails, before any
    /// subject is consumed or counted.
    fn check(&self) -> Result<Defects<'_, Self>>
    where
        Self: Sized,
    {
        if self.state() == Lifecycle::Running {
            warn!(
                checker = %self.info().label(),
                "starting a run while the previous one is still open"
            );
        }
        let subjects = self.subjects()?;
        if let Err(source) = self.set_up() {
            self.core().lifecycle().enter(Lifecycle::Failed);
            return Err(AuditKitError::SetUp {
                checker: self.info().label().to_string(),
                source: Box::new(source),
            });
        }
        self.stats().reset_subjects();
        self.core().lifecycle().enter(Lifecycle::Running);
        Ok(Defects::new(self, subjects))
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Merges a checker document into this instance's metadata.
    ///
    /// Malformed documents are logged and reported as `false`; fields
    /// merged before the malformed one stay in place.
    fn load_value(&mut self, root: &Value) -> bool {
        match self.core_mut().info_mut().merge_value(root) {
            Ok(()) => true,
            Err(e) => {
                error!(
                    checker = %self.info().label(),
                    error = %e.messages(),
                    "unable to deserialize checker document"
                );
                false
            }
        }
    }

    /// Parses a checker document from a reader, then merges it.
    fn load_reader<R: Read>(&mut self, reader: R) -> bool {
        match serde_json::from_reader::<_, Value>(reader) {
            Ok(root) => self.load_value(&root),
            Err(e) => {
                error!(
                    checker = %self.info().label(),
                    error = %e,
                    "unable to parse checker document from reader"
                );
                false
            }
        }
    }

    /// Loads a checker document from a file, then merges it.
    fn load_path<P: AsRef<Path>>(&mut self, path: P) -> bool {
        let path = path.as_ref();
        if !path.exists() {
            let e = AuditKitError::FileNotFound {
                path: path.to_path_buf(),
            };
            error!(checker = %self.info().label(), error = %e, "unable to load checker document");
            return false;
        }
        match File::open(path) {
            Ok(file) => self.load_reader(file),
            Err(e) => {
                error!(
                    checker = %self.info().label(),
                    path = %path.display(),
                    error = %e,
                    "unable to open checker file"
                );
                false
            }
        }
    }

    /// Serializes the metadata fields into their document form. Runtime
    /// counters are excluded.
    ///
    /// # Errors
    /// Returns [`AuditKitError::Json`] if serialization fails.
    fn save_value(&self) -> Result<Value> {
        self.info().to_value()
    }

    /// Writes the checker document to a file. Failures are logged and
    /// reported as `false`.
    fn save_path<P: AsRef<Path>>(&self, path: P) -> bool {
        let written = serde_json::to_string_pretty(self.info())
            .map_err(AuditKitError::from)
            .and_then(|json| std::fs::write(path.as_ref(), json).map_err(AuditKitError::from));
        match written {
            Ok(()) => true,
            Err(e) => {
                error!(
                    checker = %self.info().label(),
                    path = %path.as_ref().display(),
                    error = %e.messages(),
                    "unable to serialize checker document"
                );
                false
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
