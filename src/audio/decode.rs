//! WAV decoding into a [`Waveform`].

use std::path::Path;

use hound::{SampleFormat, WavReader};
use tracing::debug;

use crate::analysis::Waveform;
use crate::error::{MorphError, Result};

impl Waveform {
    /// Decode a WAV file, normalizing integer samples to [-1, 1]
    pub fn from_wav(path: impl AsRef<Path>) -> Result<Self> {
        let mut reader = WavReader::open(path.as_ref())?;
        let spec = reader.spec();
        let channels = spec.channels.max(1) as usize;

        let interleaved: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
            (SampleFormat::Float, 32) => reader
                .samples::<f32>()
                .collect::<std::result::Result<_, hound::Error>>()?,
            (SampleFormat::Int, bits @ 8..=32) => {
                let scale = 1.0 / (1u64 << (bits - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 * scale))
                    .collect::<std::result::Result<_, hound::Error>>()?
            }
            (SampleFormat::Float, bits) => {
                return Err(MorphError::UnsupportedWav {
                    bits,
                    format: "float",
                })
            }
            (SampleFormat::Int, bits) => {
                return Err(MorphError::UnsupportedWav { bits, format: "int" })
            }
        };

        let frames = interleaved.len() / channels;
        let mut split = vec![Vec::with_capacity(frames); channels];
        for frame in interleaved.chunks_exact(channels) {
            for (channel, &sample) in split.iter_mut().zip(frame) {
                channel.push(sample);
            }
        }

        debug!(
            path = %path.as_ref().display(),
            sample_rate = spec.sample_rate,
            channels,
            frames,
            "decoded WAV"
        );

        Waveform::new(spec.sample_rate, split)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{WavSpec, WavWriter};

    #[test]
    fn test_decode_int16_stereo() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        let spec = WavSpec {
            channels: 2,
            sample_rate: 22050,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        for _ in 0..100 {
            writer.write_sample(16384i16).unwrap();
            writer.write_sample(-32768i16).unwrap();
        }
        writer.finalize().unwrap();

        let wave = Waveform::from_wav(&path).unwrap();
        assert_eq!(wave.sample_rate(), 22050);
        assert_eq!(wave.channel_count(), 2);
        assert_eq!(wave.len(), 100);
        assert!((wave.channels()[0][0] - 0.5).abs() < 1e-6);
        assert!((wave.channels()[1][0] + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_decode_float_mono() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mono.wav");
        let spec = WavSpec {
            channels: 1,
            sample_rate: 44100,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        for i in 0..441 {
            writer.write_sample(i as f32 / 441.0).unwrap();
        }
        writer.finalize().unwrap();

        let wave = Waveform::from_wav(&path).unwrap();
        assert_eq!(wave.len(), 441);
        assert!((wave.duration() - 0.01).abs() < 1e-9);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(matches!(
            Waveform::from_wav("/nonexistent/track.wav"),
            Err(MorphError::Wav(_))
        ));
    }
}
