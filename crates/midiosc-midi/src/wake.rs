//! Wake-up signal from the realtime producer to the consumer thread.

use parking_lot::{Condvar, Mutex};
use std::time::Duration;

/// Mutex + condvar pair where the realtime side only ever *tries* the lock.
#[derive(Debug, Default)]
pub struct WakeSignal {
    lock: Mutex<()>,
    ready: Condvar,
}

impl WakeSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// RT-safe: never waits. Returns `false` if the lock was contended and no
    /// signal was sent; the consumer picks the data up on its next wake.
    #[inline]
    pub fn try_notify(&self) -> bool {
        match self.lock.try_lock() {
            Some(_guard) => {
                self.ready.notify_one();
                true
            }
            None => false,
        }
    }

    /// Blocking variant for non-realtime callers (shutdown).
    pub fn notify(&self) {
        let _guard = self.lock.lock();
        self.ready.notify_all();
    }

    /// Sleeps up to `timeout` if `should_wait` still holds once the lock is taken.
    ///
    /// Returns `true` if woken by a notification or if no wait was needed.
    pub fn wait_while(&self, timeout: Duration, should_wait: impl FnOnce() -> bool) -> bool {
        let mut guard = self.lock.lock();
        if !should_wait() {
            return true;
        }
        !self.ready.wait_for(&mut guard, timeout).timed_out()
    }
}
