//! Completion tracking: how far rasterization has progressed
//!
//! Draw calls retire in submission order, so a single "last completed id"
//! is enough to answer `wait(id)` for every id issued so far.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use crate::error::RasterError;

#[derive(Debug, Default)]
struct Progress {
    last_completed: u64,
    closed: bool,
}

/// Shared between the submitting side, the rasterize worker and waiters
#[derive(Debug, Default)]
pub struct Completion {
    last_issued: AtomicU64,
    progress: Mutex<Progress>,
    retired: Condvar,
}

impl Completion {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Progress> {
        self.progress.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record that `id` has been handed out
    pub fn issue(&self, id: u64) {
        self.last_issued.fetch_max(id, Ordering::AcqRel);
    }

    pub fn last_issued(&self) -> u64 {
        self.last_issued.load(Ordering::Acquire)
    }

    pub fn last_completed(&self) -> u64 {
        self.lock().last_completed
    }

    /// Every draw call up to and including `id` has been rasterized
    pub fn publish(&self, id: u64) {
        let mut progress = self.lock();
        if id > progress.last_completed {
            progress.last_completed = id;
        }
        drop(progress);
        self.retired.notify_all();
    }

    /// No further ids will be published. Wakes all waiters.
    pub fn close(&self) {
        self.lock().closed = true;
        self.retired.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Block until `id` has been published.
    ///
    /// Fails with `UnknownDrawCall` for ids never issued and with
    /// `ClosedPipeline` if the tracker closes before `id` retires.
    pub fn wait(&self, id: u64) -> Result<(), RasterError> {
        let last_issued = self.last_issued();
        if id > last_issued {
            return Err(RasterError::UnknownDrawCall { id, last_issued });
        }

        let mut progress = self.lock();
        loop {
            if progress.last_completed >= id {
                return Ok(());
            }
            if progress.closed {
                return Err(RasterError::ClosedPipeline);
            }
            progress = self.retired.wait(progress).unwrap_or_else(PoisonError::into_inner);
        }
    }
}

/// Closes the tracker when dropped, including on worker panic
pub(crate) struct CloseOnDrop<'a>(pub &'a Completion);

impl Drop for CloseOnDrop<'_> {
    fn drop(&mut self) {
        self.0.close();
    }
}
