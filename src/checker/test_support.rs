//! Shared probe checker for pipeline and runner tests.

use std::sync::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::Result;
use crate::checker::{Checker, CheckerCore};
use crate::error::AuditKitError;

/// Subject value whose check always fails.
pub(crate) const POISON: i64 = 13;

/// Configuration for [`ProbeChecker`] runs.
pub(crate) struct ProbeConfig {
    pub(crate) subjects: Vec<i64>,
}

/// Defect emitted for even subjects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EvenDefect {
    pub(crate) subject: i64,
}

/// Probe checker: subjects are integers, negatives are invalid, [`POISON`]
/// fails its check, even values yield a defect.
pub(crate) struct ProbeChecker {
    core: CheckerCore<ProbeConfig>,
    pub(crate) fail_set_up: bool,
    pub(crate) fail_tear_down: bool,
    pub(crate) set_ups: AtomicU32,
    pub(crate) tear_downs: AtomicU32,
    seen: Mutex<Vec<i64>>,
}

impl ProbeChecker {
    pub(crate) fn new(subjects: Vec<i64>) -> Self {
        let mut checker = Self::unconfigured();
        assert!(checker.init(Some(Arc::new(ProbeConfig { subjects }))));
        checker
    }

    pub(crate) fn unconfigured() -> Self {
        Self {
            core: CheckerCore::new("ProbeChecker"),
            fail_set_up: false,
            fail_tear_down: false,
            set_ups: AtomicU32::new(0),
            tear_downs: AtomicU32::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Subjects that reached `check_subject`, in order.
    pub(crate) fn seen(&self) -> Vec<i64> {
        self.seen.lock().unwrap().clone()
    }

    pub(crate) fn set_ups(&self) -> u32 {
        self.set_ups.load(Ordering::SeqCst)
    }

    pub(crate) fn tear_downs(&self) -> u32 {
        self.tear_downs.load(Ordering::SeqCst)
    }
}

impl Checker for ProbeChecker {
    type Subject = i64;
    type Defect = EvenDefect;
    type Config = ProbeConfig;
    type Subjects = std::vec::IntoIter<i64>;

    fn core(&self) -> &CheckerCore<ProbeConfig> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut CheckerCore<ProbeConfig> {
        &mut self.core
    }

    fn subjects(&self) -> Result<Self::Subjects> {
        let config = self.core.config().ok_or_else(|| {
            AuditKitError::Config("probe checker is not configured".to_string())
        })?;
        Ok(config.subjects.clone().into_iter())
    }

    fn is_valid_subject(&self, subject: &i64) -> bool {
        *subject >= 0
    }

    fn set_up(&self) -> Result<()> {
        self.set_ups.fetch_add(1, Ordering::SeqCst);
        if self.fail_set_up {
            Err(AuditKitError::Checker("set up refused".to_string()))
        } else {
            Ok(())
        }
    }

    fn tear_down(&self) -> Result<()> {
        self.tear_downs.fetch_add(1, Ordering::SeqCst);
        if self.fail_tear_down {
            Err(AuditKitError::Checker("tear down refused".to_string()))
        } else {
            Ok(())
        }
    }

    fn check_subject(&self, subject: &i64) -> Result<Option<EvenDefect>> {
        self.seen.lock().unwrap().push(*subject);
        if *subject == POISON {
            return Err(AuditKitError::Checker(format!(
                "poisoned subject {subject}"
            )));
        }
        if subject % 2 == 0 {
            Ok(Some(EvenDefect { subject: *subject }))
        } else {
            Ok(None)
        }
    }
}
