//! Coefficient Update Scheduler
//!
//! Debounces parameter changes into a single recomputation per audio block.
//! Any number of writes between two blocks flip one flag; the audio thread
//! consumes it at the start of the next block.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::params::{ParamId, ParamListener};

/// Whether coefficients need recomputing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateState {
    Clean,
    Dirty,
}

/// Shared dirty flag between the control thread and the audio thread
#[derive(Debug)]
pub struct UpdateScheduler {
    dirty: AtomicBool,
}

impl UpdateScheduler {
    /// Starts dirty so the first block computes coefficients
    pub fn new() -> Self {
        Self {
            dirty: AtomicBool::new(true),
        }
    }

    /// Request a recomputation before the next block
    #[inline]
    pub fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Release);
    }

    /// Consume the pending request, returning whether there was one
    ///
    /// A write that lands after this call marks the flag again and is
    /// picked up on the following block.
    #[inline]
    pub fn take_dirty(&self) -> bool {
        self.dirty.swap(false, Ordering::AcqRel)
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    pub fn state(&self) -> UpdateState {
        if self.is_dirty() {
            UpdateState::Dirty
        } else {
            UpdateState::Clean
        }
    }
}

impl Default for UpdateScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl ParamListener for UpdateScheduler {
    fn parameter_changed(&self, _id: ParamId, _value: f32) {
        self.mark_dirty();
    }
}
