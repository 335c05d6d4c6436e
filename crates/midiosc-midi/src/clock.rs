//! Audio frame clock: the time base for event timestamps and deadlines.

use crate::error::{Error, Result};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Monotonic 32-bit frame counter. Wraps around like a JACK frame time.
pub trait FrameClock: Send + Sync {
    /// Current frame time. Must be callable from the realtime thread.
    fn frame_time(&self) -> u32;

    fn sample_rate(&self) -> u32;

    fn frames_to_duration(&self, frames: u32) -> Duration {
        let rate = self.sample_rate().max(1) as u64;
        Duration::from_nanos(frames as u64 * 1_000_000_000 / rate)
    }
}

impl<C: FrameClock + ?Sized> FrameClock for Arc<C> {
    #[inline]
    fn frame_time(&self) -> u32 {
        (**self).frame_time()
    }

    #[inline]
    fn sample_rate(&self) -> u32 {
        (**self).sample_rate()
    }
}

/// Frame clock derived from `Instant` at a nominal sample rate.
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
    sample_rate: u32,
}

impl SystemClock {
    pub fn new(sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(Error::InvalidSampleRate(sample_rate));
        }
        Ok(Self {
            origin: Instant::now(),
            sample_rate,
        })
    }
}

impl FrameClock for SystemClock {
    #[inline]
    fn frame_time(&self) -> u32 {
        let nanos = self.origin.elapsed().as_nanos();
        // Truncation to u32 is the wraparound.
        (nanos * self.sample_rate as u128 / 1_000_000_000) as u32
    }

    #[inline]
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

/// Clock that only moves when told to. Useful for driving capture by hand.
#[derive(Debug)]
pub struct ManualClock {
    frame: AtomicU32,
    sample_rate: u32,
}

impl ManualClock {
    pub fn new(sample_rate: u32) -> Self {
        Self::starting_at(0, sample_rate)
    }

    pub fn starting_at(frame: u32, sample_rate: u32) -> Self {
        Self {
            frame: AtomicU32::new(frame),
            sample_rate: sample_rate.max(1),
        }
    }

    pub fn set(&self, frame: u32) {
        self.frame.store(frame, Ordering::Release);
    }

    /// Wrapping advance; returns the new frame time.
    pub fn advance(&self, frames: u32) -> u32 {
        self.frame
            .fetch_add(frames, Ordering::AcqRel)
            .wrapping_add(frames)
    }
}

impl FrameClock for ManualClock {
    #[inline]
    fn frame_time(&self) -> u32 {
        self.frame.load(Ordering::Acquire)
    }

    #[inline]
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_rejects_zero_rate() {
        assert!(SystemClock::new(0).is_err());
    }

    #[test]
    fn test_system_clock_moves_forward() {
        let clock = SystemClock::new(48000).unwrap();
        let a = clock.frame_time();
        std::thread::sleep(Duration::from_millis(5));
        let b = clock.frame_time();
        assert!(b > a, "clock did not advance: {} -> {}", a, b);
    }

    #[test]
    fn test_manual_clock_wraps() {
        let clock = ManualClock::starting_at(u32::MAX - 1, 48000);
        assert_eq!(clock.advance(3), 1);
        assert_eq!(clock.frame_time(), 1);
    }

    #[test]
    fn test_frames_to_duration() {
        let clock = ManualClock::new(48000);
        assert_eq!(clock.frames_to_duration(48), Duration::from_millis(1));
        assert_eq!(clock.frames_to_duration(0), Duration::ZERO);
    }
}
