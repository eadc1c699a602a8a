//! Group-scoped cooperative cancellation.
//!
//! One token is shared by the coordinator, every chunk worker and the progress
//! reporter. Workers check it at each write callback and stop without writing
//! further data once it is set. Callers may also hold a clone (e.g. to cancel
//! on Ctrl-C).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
