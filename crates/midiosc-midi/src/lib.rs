//! Realtime MIDI capture for midiosc.
//!
//! The audio callback owns an [`EventCapture`] and feeds it raw bytes each
//! quantum; the consumer thread owns the matching [`EventConsumer`] and sleeps
//! on a [`WakeSignal`]. The producer side never blocks or allocates.
//!
//! Feature gates: `midi-io` (hardware input through midir).

pub mod error;
pub use error::{Error, Result};

pub(crate) mod event;
pub use event::{RawEvent, MAX_EVENT_LEN};

pub(crate) mod sync;
pub use sync::SyncMode;

pub mod clock;
pub use clock::{FrameClock, ManualClock, SystemClock};

pub mod queue;
pub use queue::{
    handoff_queue, handoff_queue_with_capacity, EventConsumer, EventProducer,
    DEFAULT_QUEUE_CAPACITY,
};

pub(crate) mod wake;
pub use wake::WakeSignal;

pub(crate) mod capture;
pub use capture::{CaptureGate, EventCapture};

#[cfg(feature = "midi-io")]
pub(crate) mod io;

#[cfg(feature = "midi-io")]
pub use io::{HardwareInput, INPUT_PORT_NAME};
