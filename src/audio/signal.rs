//! Per-frame time, level and beat pulse from whichever source is active.

use std::sync::Arc;

use tracing::info;

use super::clock::{PlaybackClock, Transport};
use super::tap::{block_rms, LevelTap};
use crate::analysis::AnalysisResult;
use crate::params::SignalConfig;

/// Which source the adapter is reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceMode {
    Idle,
    Uploaded,
    Procedural,
}

enum Source {
    Idle,
    Uploaded {
        analysis: Arc<AnalysisResult>,
        clock: Box<dyn PlaybackClock>,
        offset: f64,
    },
    Procedural {
        transport: Box<dyn Transport>,
    },
}

/// Turns an uploaded track or the procedural transport into frame signals
///
/// Never fails: an idle adapter reads time 0, level 0, pulse 0 and the
/// default bar length.
pub struct AudioSignalAdapter {
    config: SignalConfig,
    source: Source,
    tap: Option<Box<dyn LevelTap>>,
    scratch: Vec<f32>,
}

impl Default for AudioSignalAdapter {
    fn default() -> Self {
        Self::new(SignalConfig::default())
    }
}

impl AudioSignalAdapter {
    pub fn new(config: SignalConfig) -> Self {
        Self {
            config,
            source: Source::Idle,
            tap: None,
            scratch: Vec::new(),
        }
    }

    /// Switch to an analyzed track starting `offset` seconds in
    pub fn start_uploaded(
        &mut self,
        analysis: Arc<AnalysisResult>,
        clock: Box<dyn PlaybackClock>,
        offset: f64,
        tap: Box<dyn LevelTap>,
    ) {
        info!(
            bpm = analysis.bpm,
            beats = analysis.beats.len(),
            offset,
            "signal source: uploaded track"
        );
        let offset = if offset.is_finite() { offset.max(0.0) } else { 0.0 };
        self.source = Source::Uploaded {
            analysis,
            clock,
            offset,
        };
        self.tap = Some(tap);
    }

    /// Switch to the procedural transport
    pub fn start_procedural(&mut self, transport: Box<dyn Transport>, tap: Box<dyn LevelTap>) {
        info!(
            beat_s = transport.beat_duration(),
            "signal source: procedural transport"
        );
        self.source = Source::Procedural { transport };
        self.tap = Some(tap);
    }

    /// Drop the source; readings fall back to quiescent defaults
    pub fn stop(&mut self) {
        if !matches!(self.source, Source::Idle) {
            info!("signal source stopped");
        }
        self.source = Source::Idle;
        self.tap = None;
        self.scratch.clear();
    }

    pub fn mode(&self) -> SourceMode {
        match self.source {
            Source::Idle => SourceMode::Idle,
            Source::Uploaded { .. } => SourceMode::Uploaded,
            Source::Procedural { .. } => SourceMode::Procedural,
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.source, Source::Idle)
    }

    /// Analysis of the current uploaded track, if any
    pub fn analysis(&self) -> Option<&AnalysisResult> {
        match &self.source {
            Source::Uploaded { analysis, .. } => Some(analysis),
            _ => None,
        }
    }

    /// Seconds since the source started (clamped to the track length when uploaded)
    pub fn current_time(&self) -> f64 {
        let t = match &self.source {
            Source::Idle => 0.0,
            Source::Uploaded {
                analysis,
                clock,
                offset,
            } => (clock.elapsed_seconds() + offset).min(analysis.duration),
            Source::Procedural { transport } => transport.elapsed_seconds(),
        };
        if t.is_finite() {
            t.max(0.0)
        } else {
            0.0
        }
    }

    /// Beat pulse in [0, 1] at time `t`
    pub fn beat_pulse(&self, t: f64) -> f32 {
        if !t.is_finite() {
            return 0.0;
        }
        match &self.source {
            Source::Idle => 0.0,
            Source::Uploaded { analysis, .. } => {
                grid_pulse(&analysis.beats, t, self.config.beat_half_width_s)
            }
            Source::Procedural { transport } => phase_pulse(
                t,
                transport.beat_duration(),
                self.config.procedural_pulse_phase,
            ),
        }
    }

    /// Loudness of the latest tap block: RMS times a fixed gain, clamped to [0, 1]
    pub fn level(&mut self) -> f32 {
        let Some(tap) = &self.tap else {
            return 0.0;
        };
        tap.read_latest(&mut self.scratch);
        let level = block_rms(&self.scratch) * self.config.level_gain;
        if level.is_finite() {
            level.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Length of one bar (seconds)
    pub fn bar_seconds(&self) -> f64 {
        let bar = match &self.source {
            Source::Idle => return self.config.default_bar_s,
            Source::Uploaded { analysis, .. } => analysis.bar_seconds(self.config.beats_per_bar),
            Source::Procedural { transport } => transport.bar_duration(),
        };
        if bar.is_finite() && bar > 0.0 {
            bar
        } else {
            self.config.default_bar_s
        }
    }
}

/// Triangular pulse around the nearest beat of an ascending grid
fn grid_pulse(beats: &[f64], t: f64, half_width: f64) -> f32 {
    if beats.is_empty() || half_width <= 0.0 {
        return 0.0;
    }
    let next = beats.partition_point(|&b| b < t);
    let after = beats.get(next).map(|&b| b - t);
    let before = next.checked_sub(1).map(|i| t - beats[i]);
    let distance = match (before, after) {
        (Some(b), Some(a)) => b.min(a),
        (Some(d), None) | (None, Some(d)) => d,
        (None, None) => return 0.0,
    };
    if distance < half_width {
        (1.0 - distance / half_width) as f32
    } else {
        0.0
    }
}

/// Decaying pulse at the start of each beat period
fn phase_pulse(t: f64, beat: f64, width: f64) -> f32 {
    if !(beat.is_finite() && beat > 0.0) || width <= 0.0 {
        return 0.0;
    }
    let phase = t.rem_euclid(beat) / beat;
    if phase < width {
        (1.0 - phase / width) as f32
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{ManualClock, SampleTransport, SharedBlockTap, SilentTap};

    fn analysis(beats: Vec<f64>, bpm: u32, duration: f64) -> Arc<AnalysisResult> {
        Arc::new(AnalysisResult {
            sample_rate: 44100,
            duration,
            hop: 512,
            rms: vec![0.0],
            flux: vec![0.0],
            bpm,
            beat_lag: 43,
            beats,
        })
    }

    fn uploaded(beats: Vec<f64>) -> (AudioSignalAdapter, ManualClock) {
        let clock = ManualClock::new();
        let mut adapter = AudioSignalAdapter::default();
        adapter.start_uploaded(
            analysis(beats, 120, 10.0),
            Box::new(clock.clone()),
            0.0,
            Box::new(SilentTap),
        );
        (adapter, clock)
    }

    #[test]
    fn test_idle_defaults() {
        let mut adapter = AudioSignalAdapter::default();
        assert_eq!(adapter.mode(), SourceMode::Idle);
        assert_eq!(adapter.current_time(), 0.0);
        assert_eq!(adapter.level(), 0.0);
        assert_eq!(adapter.beat_pulse(1.0), 0.0);
        assert_eq!(adapter.bar_seconds(), 2.0);
    }

    #[test]
    fn test_uploaded_pulse_is_triangular() {
        let (adapter, _) = uploaded(vec![1.0, 2.0, 3.0]);

        assert_eq!(adapter.beat_pulse(2.0), 1.0);
        assert!((adapter.beat_pulse(2.06) - 0.5).abs() < 1e-4);
        assert!((adapter.beat_pulse(1.94) - 0.5).abs() < 1e-4);
        assert!((adapter.beat_pulse(2.03) - 0.75).abs() < 1e-4);
        assert_eq!(adapter.beat_pulse(2.12), 0.0);
        assert_eq!(adapter.beat_pulse(1.5), 0.0);
        assert_eq!(adapter.beat_pulse(0.0), 0.0);
        // Past the last beat only the preceding beat counts
        assert!((adapter.beat_pulse(3.06) - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_uploaded_time_clamps_to_duration() {
        let clock = ManualClock::new();
        let mut adapter = AudioSignalAdapter::default();
        adapter.start_uploaded(
            analysis(vec![], 100, 10.0),
            Box::new(clock.clone()),
            3.0,
            Box::new(SilentTap),
        );

        clock.set(2.0);
        assert_eq!(adapter.current_time(), 5.0);
        clock.set(30.0);
        assert_eq!(adapter.current_time(), 10.0);
        assert_eq!(adapter.beat_pulse(5.0), 0.0);
        assert!((adapter.bar_seconds() - 2.4).abs() < 1e-12);
    }

    #[test]
    fn test_procedural_pulse_decays_over_phase() {
        let transport = SampleTransport::new(1000, 120.0);
        let mut adapter = AudioSignalAdapter::default();
        adapter.start_procedural(Box::new(transport.clone()), Box::new(SilentTap));

        assert_eq!(adapter.mode(), SourceMode::Procedural);
        assert_eq!(adapter.beat_pulse(0.0), 1.0);
        assert_eq!(adapter.beat_pulse(1.0), 1.0);
        // phase = 0.0375 / 0.5 = 0.075, half of the 0.15 window
        assert!((adapter.beat_pulse(1.0375) - 0.5).abs() < 1e-4);
        assert_eq!(adapter.beat_pulse(1.2), 0.0);
        assert_eq!(adapter.bar_seconds(), 2.0);

        transport.advance(1500);
        assert_eq!(adapter.current_time(), 1.5);
    }

    #[test]
    fn test_level_is_scaled_and_clamped() {
        let tap = SharedBlockTap::new(256);
        let mut adapter = AudioSignalAdapter::default();
        adapter.start_procedural(
            Box::new(SampleTransport::new(44100, 120.0)),
            Box::new(tap.clone()),
        );

        assert_eq!(adapter.level(), 0.0);

        tap.push(&[0.1, -0.1, 0.1, -0.1]);
        assert!((adapter.level() - 0.45).abs() < 1e-5);

        tap.push(&[0.9; 256]);
        assert_eq!(adapter.level(), 1.0);
    }

    #[test]
    fn test_stop_returns_to_quiescent() {
        let (mut adapter, clock) = uploaded(vec![0.5]);
        clock.set(0.5);
        assert_eq!(adapter.current_time(), 0.5);

        adapter.stop();
        assert_eq!(adapter.mode(), SourceMode::Idle);
        assert_eq!(adapter.current_time(), 0.0);
        assert_eq!(adapter.level(), 0.0);
        assert_eq!(adapter.beat_pulse(0.5), 0.0);
    }
}
