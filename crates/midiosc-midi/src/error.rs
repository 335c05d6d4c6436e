//! Error types for the capture side.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Cannot allocate handoff queue with capacity {0}")]
    QueueAllocation(usize),

    #[error("Invalid sample rate: {0}")]
    InvalidSampleRate(u32),

    #[error("Invalid sync mode '{0}' (expected Immediate, Relative or Absolute)")]
    InvalidSyncMode(String),

    #[error("MIDI port error: {0}")]
    MidiPort(String),

    #[error("MIDI device error: {0}")]
    MidiDevice(String),
}

#[cfg(feature = "midi-io")]
impl From<midir::InitError> for Error {
    fn from(e: midir::InitError) -> Self {
        Error::MidiDevice(e.to_string())
    }
}

#[cfg(feature = "midi-io")]
impl From<midir::ConnectError<midir::MidiInput>> for Error {
    fn from(e: midir::ConnectError<midir::MidiInput>) -> Self {
        Error::MidiPort(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
