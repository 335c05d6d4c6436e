//! # midiosc - realtime MIDI to OSC bridge
//!
//! MIDI events are captured inside a realtime callback, handed to a consumer
//! thread through a lock-free queue, matched against byte-mask rules and
//! turned into OSC messages whose arguments are remapped from the event.
//!
//! ## Architecture
//!
//! midiosc is an umbrella crate that coordinates:
//! - **midiosc-midi** - event capture, handoff queue, frame clocks, hardware input
//! - **midiosc-rules** - rules, parameter expressions, config format
//!
//! and adds the consumer thread, the dispatcher and the OSC transport.
//!
//! ## Quick Start
//!
//! ```ignore
//! use midiosc::prelude::*;
//!
//! let config = parse_config("[rule]\nCC 7 ANY\n\"/gain\" \"f\" \"%2 [0,1]\"\n")?;
//! let mut bridge = Bridge::builder().config(config).build()?;
//!
//! let mut capture = bridge.take_capture().unwrap();
//! bridge.start()?;
//!
//! // in the realtime callback
//! capture.process(quantum_start, nframes, [(0, &[0xb0, 7, 100][..])]);
//! ```
//!
//! ## Feature Flags
//!
//! - `midi-io` - hardware MIDI input through midir

mod error;
pub use error::{Error, Result, TransportError};

pub mod dispatch;
pub use dispatch::{build_message, DispatchStats, Dispatcher, OscTransport, UdpTransport};

pub mod consumer;
pub use consumer::{ConsumerLoop, ConsumerReport, ConsumerState, MAX_DELAY_SLICE, WAKE_INTERVAL};

mod shutdown;
pub use shutdown::ShutdownToken;

mod builder;
pub use builder::{BridgeBuilder, DEFAULT_SAMPLE_RATE};

mod engine;
pub use engine::{Bridge, BridgeSummary};

/// Re-export of midiosc-midi for direct access
pub use midiosc_midi as midi;

/// Re-export of midiosc-rules for direct access
pub use midiosc_rules as rules;

pub use rosc::{OscMessage, OscType};

/// Common imports.
pub mod prelude {
    pub use crate::{Bridge, BridgeBuilder, BridgeSummary, Error, OscTransport, Result};
    pub use midiosc_midi::{EventCapture, FrameClock, ManualClock, RawEvent, SyncMode, SystemClock};
    pub use midiosc_rules::{parse_config, render_config, Destination, ParsedConfig, RuleSet};

    #[cfg(feature = "midi-io")]
    pub use midiosc_midi::HardwareInput;
}
