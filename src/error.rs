//! Centralized error type for the midiosc umbrella crate.
//!
//! Wraps subsystem errors so `?` propagates naturally across crate boundaries.

use midiosc_rules::ExpandError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("MIDI: {0}")]
    Midi(#[from] midiosc_midi::Error),

    #[error("Config: {0}")]
    Config(#[from] midiosc_rules::ConfigError),

    #[error("Cannot read config '{}': {source}", path.display())]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("OSC: {0}")]
    Transport(#[from] TransportError),

    #[error("Failed to expand parameter {index} of '{address}': {source}")]
    Expand {
        address: String,
        index: usize,
        #[source]
        source: ExpandError,
    },

    #[error("Realtime capture was already taken from this bridge")]
    CaptureTaken,

    #[error("No MIDI -> OSC rules configured")]
    NoRules,

    #[error("MIDI hardware input not available (built without the `midi-io` feature)")]
    NoMidiBackend,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failure to deliver one OSC message. Never retried.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("cannot resolve destination '{0}'")]
    Resolve(String),

    #[error("cannot encode message '{address}': {reason}")]
    Encode { address: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
