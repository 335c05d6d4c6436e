//! Event timing disciplines.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the consumer schedules captured events against the frame clock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SyncMode {
    /// Dispatch as soon as drained; event time is ignored.
    #[default]
    Immediate,
    /// Stamp events one quantum ahead and wait for them; keeps relative timing.
    Relative,
    /// Wait for the event's own frame time; events already in the past go out at once.
    Absolute,
}

impl SyncMode {
    pub const ALL: [SyncMode; 3] = [SyncMode::Immediate, SyncMode::Relative, SyncMode::Absolute];

    pub fn name(self) -> &'static str {
        match self {
            SyncMode::Immediate => "Immediate",
            SyncMode::Relative => "Relative",
            SyncMode::Absolute => "Absolute",
        }
    }

    /// Whether the consumer waits for event deadlines.
    #[inline]
    pub fn is_timed(self) -> bool {
        !matches!(self, SyncMode::Immediate)
    }

    /// Whether capture pushes timestamps one quantum into the future.
    #[inline]
    pub fn lookahead(self) -> bool {
        matches!(self, SyncMode::Relative)
    }

    /// Guard window (0.5 ms worth of frames, rounded up) added to every deadline.
    pub fn deadzone(self, sample_rate: u32) -> u32 {
        if self.is_timed() {
            (0.0005 * sample_rate as f64).ceil() as u32
        } else {
            0
        }
    }
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Case-insensitive; any non-empty prefix of a mode name selects it ("abs" -> Absolute).
impl FromStr for SyncMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        if wanted.is_empty() {
            return Err(Error::InvalidSyncMode(s.to_string()));
        }
        SyncMode::ALL
            .into_iter()
            .find(|mode| mode.name().to_ascii_lowercase().starts_with(&wanted))
            .ok_or_else(|| Error::InvalidSyncMode(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_names() {
        assert_eq!("Immediate".parse::<SyncMode>().unwrap(), SyncMode::Immediate);
        assert_eq!("relative".parse::<SyncMode>().unwrap(), SyncMode::Relative);
        assert_eq!("ABSOLUTE".parse::<SyncMode>().unwrap(), SyncMode::Absolute);
    }

    #[test]
    fn test_parse_prefixes() {
        assert_eq!("abs".parse::<SyncMode>().unwrap(), SyncMode::Absolute);
        assert_eq!("r".parse::<SyncMode>().unwrap(), SyncMode::Relative);
        assert_eq!("I".parse::<SyncMode>().unwrap(), SyncMode::Immediate);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<SyncMode>().is_err());
        assert!("later".parse::<SyncMode>().is_err());
        assert!("absolutely".parse::<SyncMode>().is_err());
    }

    #[test]
    fn test_deadzone() {
        assert_eq!(SyncMode::Immediate.deadzone(48000), 0);
        assert_eq!(SyncMode::Relative.deadzone(48000), 24);
        assert_eq!(SyncMode::Absolute.deadzone(44100), 23);
    }
}
