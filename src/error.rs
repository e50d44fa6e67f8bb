//! Error taxonomy for the fallible edges of the crate.
//!
//! Only loading, configuration and device setup can fail. The per-frame path
//! (signal adapter, scheduler, deformer) absorbs every problem as degraded
//! output instead of returning one of these.

use thiserror::Error;

/// Errors raised while loading input or bringing up audio
#[derive(Debug, Error)]
pub enum MorphError {
    /// WAV file could not be read or decoded
    #[error("failed to decode WAV: {0}")]
    Wav(#[from] hound::Error),

    /// WAV uses a sample layout we do not decode
    #[error("unsupported WAV format: {bits}-bit {format}")]
    UnsupportedWav { bits: u16, format: &'static str },

    /// Waveform construction was given inconsistent data
    #[error("invalid waveform: {0}")]
    InvalidWaveform(String),

    /// A configuration struct failed validation
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Style file could not be parsed
    #[error("failed to parse style: {0}")]
    Style(#[from] serde_json::Error),

    /// Glicol engine rejected the composition
    #[error("procedural synth failed: {0}")]
    Synth(String),

    /// Audio output device could not be opened or started
    #[error("audio device error: {0}")]
    Device(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MorphError>;
