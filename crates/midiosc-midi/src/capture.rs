//! Realtime side: turn a processing quantum's raw MIDI into queued `RawEvent`s.
//!
//! Everything reachable from [`EventCapture::process`] is allocation-free and
//! never blocks. No logging happens here.

use crate::event::RawEvent;
use crate::queue::EventProducer;
use crate::sync::SyncMode;
use crate::wake::WakeSignal;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared on/off switch for a capture. Closed captures ignore their input.
#[derive(Debug, Clone, Default)]
pub struct CaptureGate {
    open: Arc<AtomicBool>,
}

impl CaptureGate {
    #[inline]
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    pub fn open(&self) {
        self.open.store(true, Ordering::Release);
    }

    pub fn close(&self) {
        self.open.store(false, Ordering::Release);
    }
}

/// Owned by whatever thread runs the audio callback (single producer).
pub struct EventCapture {
    producer: EventProducer,
    sync_mode: SyncMode,
    wake: Arc<WakeSignal>,
    gate: CaptureGate,
}

impl EventCapture {
    /// Starts closed; call `gate().open()` once the consumer is running.
    pub fn new(producer: EventProducer, sync_mode: SyncMode, wake: Arc<WakeSignal>) -> Self {
        Self {
            producer,
            sync_mode,
            wake,
            gate: CaptureGate::default(),
        }
    }

    pub fn gate(&self) -> CaptureGate {
        self.gate.clone()
    }

    pub fn sync_mode(&self) -> SyncMode {
        self.sync_mode
    }

    pub fn dropped(&self) -> u64 {
        self.producer.dropped()
    }

    /// Process one quantum.
    ///
    /// `quantum_start` is the frame time of the quantum's first frame and
    /// `nframes` its length. `events` yields `(offset, bytes)` pairs in
    /// arrival order. Events outside 1..=3 bytes are discarded, full-queue
    /// events are counted as dropped. Returns how many events were queued.
    pub fn process<'a, I>(&mut self, quantum_start: u32, nframes: u32, events: I) -> usize
    where
        I: IntoIterator<Item = (u32, &'a [u8])>,
    {
        if !self.gate.is_open() {
            return 0;
        }

        let base = if self.sync_mode.lookahead() {
            quantum_start.wrapping_add(nframes)
        } else {
            quantum_start
        };

        let mut queued = 0;
        for (offset, data) in events {
            let Some(event) = RawEvent::new(data, base.wrapping_add(offset)) else {
                continue;
            };
            if self.producer.push(event) {
                queued += 1;
            }
        }

        if queued > 0 {
            // A contended lock means the consumer is busy and will re-check the queue.
            self.wake.try_notify();
        }
        queued
    }
}
