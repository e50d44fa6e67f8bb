//! Playback clocks and musical transports.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Elapsed seconds since the source started
pub trait PlaybackClock: Send + Sync {
    fn elapsed_seconds(&self) -> f64;
}

/// Musical transport of the procedural track
pub trait Transport: Send + Sync {
    /// Current transport position (seconds)
    fn elapsed_seconds(&self) -> f64;

    /// Quarter-note duration (seconds)
    fn beat_duration(&self) -> f64;

    /// Measure duration (seconds), 4/4 unless overridden
    fn bar_duration(&self) -> f64 {
        self.beat_duration() * 4.0
    }
}

/// Wall clock started at construction
#[derive(Debug, Clone)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl PlaybackClock for SystemClock {
    fn elapsed_seconds(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

/// Externally driven clock; clones share the same position
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    bits: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, seconds: f64) {
        self.bits.store(seconds.to_bits(), Ordering::Relaxed);
    }

    pub fn advance(&self, dt: f64) {
        self.set(self.get() + dt);
    }

    pub fn get(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }
}

impl PlaybackClock for ManualClock {
    fn elapsed_seconds(&self) -> f64 {
        self.get()
    }
}

/// Fixed-tempo transport whose position is the count of rendered samples
///
/// The audio producer advances the shared counter; clones read the same count.
#[derive(Debug, Clone)]
pub struct SampleTransport {
    samples: Arc<AtomicU64>,
    sample_rate: f64,
    bpm: f64,
    beats_per_bar: f64,
}

impl SampleTransport {
    pub fn new(sample_rate: u32, bpm: f64) -> Self {
        Self {
            samples: Arc::new(AtomicU64::new(0)),
            sample_rate: sample_rate as f64,
            bpm,
            beats_per_bar: 4.0,
        }
    }

    /// Record `frames` more rendered samples
    pub fn advance(&self, frames: u64) {
        self.samples.fetch_add(frames, Ordering::Relaxed);
    }

    pub fn rendered_samples(&self) -> u64 {
        self.samples.load(Ordering::Relaxed)
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }
}

impl Transport for SampleTransport {
    fn elapsed_seconds(&self) -> f64 {
        if self.sample_rate <= 0.0 {
            return 0.0;
        }
        self.rendered_samples() as f64 / self.sample_rate
    }

    fn beat_duration(&self) -> f64 {
        60.0 / self.bpm
    }

    fn bar_duration(&self) -> f64 {
        self.beat_duration() * self.beats_per_bar
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_clones_share_position() {
        let clock = ManualClock::new();
        let view = clock.clone();
        clock.set(1.5);
        clock.advance(0.25);
        assert_eq!(view.elapsed_seconds(), 1.75);
    }

    #[test]
    fn test_sample_transport_tracks_rendered_samples() {
        let transport = SampleTransport::new(48000, 120.0);
        let producer = transport.clone();
        producer.advance(24000);
        assert_eq!(transport.elapsed_seconds(), 0.5);
        assert_eq!(transport.beat_duration(), 0.5);
        assert_eq!(transport.bar_duration(), 2.0);
    }
}
