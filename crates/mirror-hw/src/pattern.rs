//! Synthetic flat-brightness source.

use mirror_core::{Frame, VideoSource};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};

/// Frames of a single brightness level, adjustable while the loop runs.
///
/// Paired with the simulated backend, brightness drives the outcome:
/// near-black frames read as "no face", and brightness 32–76 puts the
/// descriptor mean inside the default match band.
pub struct PatternSource {
    width: u32,
    height: u32,
    level: AtomicU8,
    sequence: AtomicU64,
    attached: AtomicBool,
}

impl PatternSource {
    pub fn new(width: u32, height: u32, level: u8) -> Self {
        Self {
            width,
            height,
            level: AtomicU8::new(level),
            sequence: AtomicU64::new(0),
            attached: AtomicBool::new(true),
        }
    }

    pub fn set_level(&self, level: u8) {
        self.level.store(level, Ordering::Relaxed);
    }

    pub fn level(&self) -> u8 {
        self.level.load(Ordering::Relaxed)
    }

    /// Simulate the stream going away (camera unplugged, permission revoked).
    pub fn detach(&self) {
        self.attached.store(false, Ordering::Release);
    }
}

impl VideoSource for PatternSource {
    fn current_frame(&self) -> Option<Frame> {
        if !self.is_available() {
            return None;
        }
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        Some(Frame::uniform(self.width, self.height, self.level(), sequence))
    }

    fn is_available(&self) -> bool {
        self.attached.load(Ordering::Acquire)
    }
}
