//! Bounded SPSC handoff between the realtime callback and the consumer thread.

use crate::error::{Error, Result};
use crate::event::RawEvent;
use ringbuf::{traits::*, HeapCons, HeapProd, HeapRb};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Pending events the queue holds before the producer starts dropping.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Producer side -- push events from the realtime thread.
pub struct EventProducer {
    producer: HeapProd<RawEvent>,
    dropped: Arc<AtomicU64>,
}

impl EventProducer {
    /// Never blocks. Returns `false` and counts a drop if the queue is full;
    /// queued events are left untouched.
    #[inline]
    pub fn push(&mut self, event: RawEvent) -> bool {
        if self.producer.try_push(event).is_ok() {
            true
        } else {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            false
        }
    }

    #[inline]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.producer.capacity().get()
    }
}

/// Consumer side -- drain events on the non-realtime thread.
pub struct EventConsumer {
    consumer: HeapCons<RawEvent>,
    dropped: Arc<AtomicU64>,
}

impl EventConsumer {
    #[inline]
    pub fn pop(&mut self) -> Option<RawEvent> {
        self.consumer.try_pop()
    }

    pub fn drain_all(&mut self) -> Vec<RawEvent> {
        let mut events = Vec::with_capacity(self.consumer.occupied_len());
        while let Some(event) = self.consumer.try_pop() {
            events.push(event);
        }
        events
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.consumer.is_empty()
    }

    #[inline]
    pub fn pending(&self) -> usize {
        self.consumer.occupied_len()
    }

    /// Total events the producer has discarded because the queue was full.
    #[inline]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

pub fn handoff_queue() -> Result<(EventProducer, EventConsumer)> {
    handoff_queue_with_capacity(DEFAULT_QUEUE_CAPACITY)
}

/// `capacity` counts events, not bytes. Zero is rejected.
pub fn handoff_queue_with_capacity(capacity: usize) -> Result<(EventProducer, EventConsumer)> {
    if capacity == 0 {
        return Err(Error::QueueAllocation(capacity));
    }
    let rb = HeapRb::<RawEvent>::new(capacity);
    let (producer, consumer) = rb.split();
    let dropped = Arc::new(AtomicU64::new(0));
    Ok((
        EventProducer {
            producer,
            dropped: Arc::clone(&dropped),
        },
        EventConsumer { consumer, dropped },
    ))
}
