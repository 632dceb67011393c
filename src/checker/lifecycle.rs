use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle of a checker instance.
///
/// `Failed` is absorbing: once a lifecycle hook has failed, the instance
/// stays `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Lifecycle {
    /// Constructed, not yet configured.
    New = 0,
    /// `init` accepted a configuration.
    Configured = 1,
    /// Inside a run, between a successful `set_up` and stream finalization.
    Running = 2,
    /// A run finished cleanly; ready to run again.
    Idle = 3,
    /// A lifecycle hook failed.
    Failed = 4,
}

impl Lifecycle {
    const fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::New,
            1 => Self::Configured,
            2 => Self::Running,
            3 => Self::Idle,
            _ => Self::Failed,
        }
    }
}

/// Atomically readable lifecycle cell, written by the pipeline thread.
pub(crate) struct LifecycleCell(AtomicU8);

impl LifecycleCell {
    pub(crate) const fn new() -> Self {
        Self(AtomicU8::new(Lifecycle::New as u8))
    }

    pub(crate) fn get(&self) -> Lifecycle {
        Lifecycle::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Moves to `next` unless the cell is already `Failed`.
    pub(crate) fn enter(&self, next: Lifecycle) {
        let _ = self
            .0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |raw| {
                if raw == Lifecycle::Failed as u8 {
                    None
                } else {
                    Some(next as u8)
                }
            });
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
