//! Cooperative cancellation for the consumer thread.

use midiosc_midi::WakeSignal;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cancelling sets a flag and wakes the consumer, which checks the flag
/// whenever it would otherwise sleep.
#[derive(Debug, Clone)]
pub struct ShutdownToken {
    cancelled: Arc<AtomicBool>,
    wake: Arc<WakeSignal>,
}

impl ShutdownToken {
    pub fn new(wake: Arc<WakeSignal>) -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            wake,
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        self.wake.notify();
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}
