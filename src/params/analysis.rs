//! Offline beat analysis configuration.

use std::ops::RangeInclusive;

/// Framing, tempo-search and grid-alignment heuristics for [`crate::analysis::BeatAnalyzer`]
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// RMS window length (samples)
    pub window: usize,

    /// Hop between frames (samples)
    pub hop: usize,

    /// Lowest tempo considered (BPM)
    pub min_bpm: u32,

    /// Highest tempo considered (BPM)
    pub max_bpm: u32,

    /// Onset flux moving-average radius (frames, window = 2r + 1)
    pub flux_smoothing_radius: usize,

    /// Peak threshold as a fraction of the median flux
    pub peak_threshold_ratio: f32,

    /// Only this many leading peaks are tried as grid origin
    pub max_candidate_peaks: usize,

    /// Beats summed when scoring a grid origin
    pub alignment_beats: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            window: 1024,
            hop: 512,
            min_bpm: 70,
            max_bpm: 180,
            flux_smoothing_radius: 5,
            peak_threshold_ratio: 0.6,
            max_candidate_peaks: 200,
            alignment_beats: 16,
        }
    }
}

impl AnalysisConfig {
    /// Tempo search range (BPM, ascending scan order)
    pub fn bpm_range(&self) -> RangeInclusive<u32> {
        self.min_bpm..=self.max_bpm
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.window == 0 || self.hop == 0 {
            return Err(format!(
                "window and hop must be > 0, got window={} hop={}",
                self.window, self.hop
            ));
        }
        if self.min_bpm == 0 || self.min_bpm > self.max_bpm {
            return Err(format!(
                "BPM range must be non-empty and positive, got {}..={}",
                self.min_bpm, self.max_bpm
            ));
        }
        if self.alignment_beats == 0 {
            return Err("alignment_beats must be > 0".to_string());
        }
        Ok(())
    }
}
