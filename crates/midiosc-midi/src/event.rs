//! Timestamped raw MIDI events as they cross the realtime boundary.

use std::fmt;

/// Longest message the capture path accepts. Anything larger (SysEx) is dropped.
pub const MAX_EVENT_LEN: usize = 3;

/// Up to three MIDI bytes stamped with the audio frame they are due at.
///
/// `Copy` and heap-free so it can travel through the lock-free queue.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawEvent {
    bytes: [u8; MAX_EVENT_LEN],
    len: u8,
    frame: u32,
}

impl RawEvent {
    /// Returns `None` unless `data` holds 1 to 3 bytes. Unused trailing bytes are zero.
    #[inline]
    pub fn new(data: &[u8], frame: u32) -> Option<Self> {
        if data.is_empty() || data.len() > MAX_EVENT_LEN {
            return None;
        }
        let mut bytes = [0u8; MAX_EVENT_LEN];
        bytes[..data.len()].copy_from_slice(data);
        Some(Self {
            bytes,
            len: data.len() as u8,
            frame,
        })
    }

    /// All three byte slots, zero-padded past `len()`.
    #[inline]
    pub fn bytes(&self) -> [u8; MAX_EVENT_LEN] {
        self.bytes
    }

    #[inline]
    pub fn byte(&self, index: usize) -> u8 {
        self.bytes.get(index).copied().unwrap_or(0)
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    #[inline]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Frame clock value at which the event is due.
    #[inline]
    pub fn frame(&self) -> u32 {
        self.frame
    }

    /// Low nibble of the status byte.
    #[inline]
    pub fn channel(&self) -> u8 {
        self.bytes[0] & 0x0f
    }

    /// High nibble of the status byte, shifted down (0x9n -> 9).
    #[inline]
    pub fn status_nibble(&self) -> u8 {
        self.bytes[0] >> 4
    }
}

impl fmt::Debug for RawEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[0x{:02x} 0x{:02x} 0x{:02x}] @{}",
            self.bytes[0], self.bytes[1], self.bytes[2], self.frame
        )
    }
}
