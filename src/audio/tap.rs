//! Level taps: the most recent block of time-domain samples, on demand.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::clock::PlaybackClock;

/// Source of the latest audio block
///
/// Implementations must not fail; an unavailable source reads as an empty block.
pub trait LevelTap: Send + Sync {
    /// Replace `out` with the most recent block
    fn read_latest(&self, out: &mut Vec<f32>);
}

/// Root-mean-square of a block; 0 for an empty block
pub fn block_rms(block: &[f32]) -> f32 {
    if block.is_empty() {
        return 0.0;
    }
    let energy: f32 = block.iter().map(|s| s * s).sum();
    (energy / block.len() as f32).sqrt()
}

/// Tap with nothing behind it
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentTap;

impl LevelTap for SilentTap {
    fn read_latest(&self, out: &mut Vec<f32>) {
        out.clear();
    }
}

/// Thread-safe buffer of the newest `capacity` samples written by an audio producer
#[derive(Debug, Clone)]
pub struct SharedBlockTap {
    buffer: Arc<Mutex<VecDeque<f32>>>,
    capacity: usize,
}

impl SharedBlockTap {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    /// Append samples, discarding the oldest beyond capacity
    pub fn push(&self, samples: &[f32]) {
        let Ok(mut buffer) = self.buffer.lock() else {
            return;
        };
        let keep = samples.len().min(self.capacity);
        buffer.extend(&samples[samples.len() - keep..]);
        let excess = buffer.len().saturating_sub(self.capacity);
        buffer.drain(..excess);
    }

    pub fn clear(&self) {
        if let Ok(mut buffer) = self.buffer.lock() {
            buffer.clear();
        }
    }
}

impl LevelTap for SharedBlockTap {
    fn read_latest(&self, out: &mut Vec<f32>) {
        out.clear();
        // A poisoned buffer reads as silence
        if let Ok(buffer) = self.buffer.lock() {
            out.extend(buffer.iter().copied());
        }
    }
}

/// Tap over a decoded track: the block ending at the current playback position
pub struct TrackTap {
    samples: Arc<[f32]>,
    sample_rate: f64,
    block: usize,
    clock: Box<dyn PlaybackClock>,
    offset: f64,
}

impl TrackTap {
    pub fn new(
        samples: Arc<[f32]>,
        sample_rate: u32,
        block: usize,
        clock: Box<dyn PlaybackClock>,
        offset: f64,
    ) -> Self {
        Self {
            samples,
            sample_rate: sample_rate as f64,
            block,
            clock,
            offset,
        }
    }
}

impl LevelTap for TrackTap {
    fn read_latest(&self, out: &mut Vec<f32>) {
        out.clear();
        let t = self.clock.elapsed_seconds() + self.offset;
        if !t.is_finite() || t <= 0.0 {
            return;
        }
        let end = ((t * self.sample_rate) as usize).min(self.samples.len());
        let start = end.saturating_sub(self.block);
        out.extend_from_slice(&self.samples[start..end]);
    }
}
