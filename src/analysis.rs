//! Offline tempo estimation and beat-grid reconstruction.
//!
//! Works purely on the energy envelope: frame RMS, half-wave rectified flux,
//! autocorrelation over the tempo range, then a grid anchored on the flux peak
//! that best lines up with the next few beats. No pitch or spectral content is
//! used.

use serde::Serialize;
use tracing::debug;

use crate::error::{MorphError, Result};
use crate::params::AnalysisConfig;

/// Decoded audio handed to the analyzer; never mutated by it
#[derive(Debug, Clone)]
pub struct Waveform {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
}

impl Waveform {
    /// Build from per-channel sample arrays of equal length
    pub fn new(sample_rate: u32, channels: Vec<Vec<f32>>) -> Result<Self> {
        if sample_rate == 0 {
            return Err(MorphError::InvalidWaveform(
                "sample rate must be > 0".to_string(),
            ));
        }
        if channels.is_empty() {
            return Err(MorphError::InvalidWaveform(
                "at least one channel is required".to_string(),
            ));
        }
        let len = channels[0].len();
        if let Some(bad) = channels.iter().position(|c| c.len() != len) {
            return Err(MorphError::InvalidWaveform(format!(
                "channel {} has {} samples, expected {}",
                bad,
                channels[bad].len(),
                len
            )));
        }
        Ok(Self {
            sample_rate,
            channels,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    /// Samples per channel
    pub fn len(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Duration in seconds
    pub fn duration(&self) -> f64 {
        self.len() as f64 / self.sample_rate as f64
    }

    /// Average all channels into one
    pub fn mono(&self) -> Vec<f32> {
        let scale = 1.0 / self.channels.len() as f32;
        (0..self.len())
            .map(|i| self.channels.iter().map(|c| c[i]).sum::<f32>() * scale)
            .collect()
    }
}

/// Outcome of one analysis pass, immutable once produced
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub sample_rate: u32,

    /// Track duration (seconds)
    pub duration: f64,

    /// Frame hop (samples)
    pub hop: usize,

    /// Per-frame RMS energy
    pub rms: Vec<f32>,

    /// Per-frame smoothed onset flux
    pub flux: Vec<f32>,

    /// Estimated tempo (BPM)
    pub bpm: u32,

    /// Beat period in frames for the estimated tempo
    pub beat_lag: usize,

    /// Ascending beat times (seconds)
    pub beats: Vec<f64>,
}

impl AnalysisResult {
    /// Frame index to seconds
    pub fn frame_time(&self, frame: usize) -> f64 {
        frame_time(frame, self.hop, self.sample_rate)
    }

    /// Bar length assuming `beats_per_bar` beats at the estimated tempo
    pub fn bar_seconds(&self, beats_per_bar: f64) -> f64 {
        60.0 / (self.bpm as f64 / beats_per_bar)
    }
}

/// Stateless energy-envelope beat tracker
#[derive(Debug, Clone, Default)]
pub struct BeatAnalyzer {
    config: AnalysisConfig,
}

impl BeatAnalyzer {
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate().map_err(MorphError::Config)?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Estimate tempo and beat grid; silent or tiny input yields a sparse grid
    pub fn analyze(&self, waveform: &Waveform) -> AnalysisResult {
        let cfg = &self.config;
        let sample_rate = waveform.sample_rate();
        let mono = waveform.mono();

        let rms = frame_rms(&mono, cfg.window, cfg.hop);
        let flux = onset_flux(&rms, cfg.flux_smoothing_radius);
        let (bpm, beat_lag) = self.estimate_tempo(&flux, sample_rate);
        let origin = self.grid_origin(&flux, beat_lag);

        let duration = waveform.duration();
        let mut beats = Vec::new();
        let mut frame = origin;
        loop {
            let t = frame_time(frame, cfg.hop, sample_rate);
            if t > duration {
                break;
            }
            beats.push(t);
            frame += beat_lag;
        }

        debug!(
            frames = rms.len(),
            bpm,
            beat_lag,
            origin,
            beats = beats.len(),
            "beat analysis complete"
        );

        AnalysisResult {
            sample_rate,
            duration,
            hop: cfg.hop,
            rms,
            flux,
            bpm,
            beat_lag,
            beats,
        }
    }

    /// Autocorrelate the flux at each candidate tempo's beat lag
    ///
    /// Ties keep the lowest BPM.
    fn estimate_tempo(&self, flux: &[f32], sample_rate: u32) -> (u32, usize) {
        let mut best = (self.config.min_bpm, self.lag_for(self.config.min_bpm, sample_rate));
        let mut best_score = f64::NEG_INFINITY;

        for bpm in self.config.bpm_range() {
            let lag = self.lag_for(bpm, sample_rate);
            let score = if flux.len() > lag {
                let sum: f64 = (lag..flux.len())
                    .map(|i| flux[i] as f64 * flux[i - lag] as f64)
                    .sum();
                sum / (flux.len() - lag) as f64
            } else {
                0.0
            };

            if score > best_score {
                best_score = score;
                best = (bpm, lag);
            }
        }
        best
    }

    /// Beat period in frames at `bpm`
    fn lag_for(&self, bpm: u32, sample_rate: u32) -> usize {
        let frames_per_second = sample_rate as f64 / self.config.hop as f64;
        ((60.0 / bpm as f64) * frames_per_second).round().max(1.0) as usize
    }

    /// Pick the flux peak whose following beats carry the most flux
    fn grid_origin(&self, flux: &[f32], lag: usize) -> usize {
        let threshold = self.config.peak_threshold_ratio * median(flux);

        let peaks = (1..flux.len().saturating_sub(1)).filter(|&i| {
            flux[i] > threshold && flux[i] > flux[i - 1] && flux[i] >= flux[i + 1]
        });

        let mut origin = 0;
        let mut best_score = f64::NEG_INFINITY;
        for peak in peaks.take(self.config.max_candidate_peaks) {
            let score: f64 = (0..self.config.alignment_beats)
                .map(|k| peak + k * lag)
                .take_while(|&i| i < flux.len())
                .map(|i| flux[i] as f64)
                .sum();
            if score > best_score {
                best_score = score;
                origin = peak;
            }
        }
        origin
    }
}

fn frame_time(frame: usize, hop: usize, sample_rate: u32) -> f64 {
    (frame * hop) as f64 / sample_rate as f64
}

/// Plain (unwindowed) RMS per frame; always at least one frame
fn frame_rms(samples: &[f32], window: usize, hop: usize) -> Vec<f32> {
    let frames = (samples.len().saturating_sub(window) / hop).max(1);
    (0..frames)
        .map(|f| {
            let start = (f * hop).min(samples.len());
            let end = (start + window).min(samples.len());
            let block = &samples[start..end];
            if block.is_empty() {
                return 0.0;
            }
            let energy: f64 = block.iter().map(|&s| s as f64 * s as f64).sum();
            (energy / block.len() as f64).sqrt() as f32
        })
        .collect()
}

/// Half-wave rectified RMS difference, smoothed by a clamped centered average
fn onset_flux(rms: &[f32], radius: usize) -> Vec<f32> {
    let raw: Vec<f32> = std::iter::once(0.0)
        .chain(rms.windows(2).map(|w| (w[1] - w[0]).max(0.0)))
        .take(rms.len())
        .collect();

    (0..raw.len())
        .map(|i| {
            let lo = i.saturating_sub(radius);
            let hi = (i + radius).min(raw.len() - 1);
            let window = &raw[lo..=hi];
            window.iter().sum::<f32>() / window.len() as f32
        })
        .collect()
}

/// Upper median; 0 for an empty slice
fn median(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted[sorted.len() / 2]
}
