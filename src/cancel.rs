//! Cooperative cancellation

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::result::*;

/// A flag the caller can raise (from any thread) to stop an operation.
///
/// Operations check it at fixed points: once per source file while building,
/// once per entry while extracting. Nothing is saved after it trips.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Returns `Err(ArchiveError::Cancelled)` once [`cancel()`] has been called.
    ///
    /// [`cancel()`]: struct.CancellationToken.html#method.cancel
    pub fn check(&self) -> ArchiveResult<()> {
        if self.is_cancelled() {
            Err(ArchiveError::Cancelled)
        } else {
            Ok(())
        }
    }
}
