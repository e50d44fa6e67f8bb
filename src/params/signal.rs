//! Real-time signal extraction constants.

/// Level and pulse shaping for [`crate::audio::AudioSignalAdapter`]
#[derive(Debug, Clone)]
pub struct SignalConfig {
    /// Heuristic gain applied to block RMS before clamping to [0, 1]
    pub level_gain: f32,

    /// Half-width of the triangular pulse around analyzed beats (seconds)
    pub beat_half_width_s: f64,

    /// Fraction of the beat period during which the procedural pulse decays
    pub procedural_pulse_phase: f64,

    /// Bar length reported when no source is active (seconds)
    pub default_bar_s: f64,

    /// Beats per bar assumed for analyzed tracks (4/4)
    pub beats_per_bar: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            level_gain: 4.5,
            beat_half_width_s: 0.12,
            procedural_pulse_phase: 0.15,
            default_bar_s: 2.0,
            beats_per_bar: 4.0,
        }
    }
}

/// Audio constants (compile-time, match Glicol engine setup)
pub mod audio_constants {
    /// Audio block size (samples per buffer)
    /// 128 = 2.9ms @ 44.1kHz
    pub const BLOCK_SIZE: usize = 128;

    /// Samples kept by a level tap (matches a 2048-point analyser)
    pub const TAP_SIZE: usize = 2048;

    /// Sample rate used when rendering the procedural track offline (Hz)
    pub const OFFLINE_SAMPLE_RATE: u32 = 44100;
}
