//! Live playback of the procedural track through the default output device.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{Arc, Mutex};
use tracing::{error, info};

use super::clock::SampleTransport;
use super::synthesis::ProceduralSynth;
use super::tap::SharedBlockTap;
use crate::error::{MorphError, Result};
use crate::params::audio_constants::TAP_SIZE;

/// Running output stream plus the transport and tap it feeds
pub struct LiveOutput {
    /// Audio output stream (kept alive)
    _stream: cpal::Stream,
    transport: SampleTransport,
    tap: SharedBlockTap,
}

impl LiveOutput {
    /// Open the default device and start playing
    pub fn start() -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| MorphError::Device("no audio output device found".to_string()))?;

        let config = device
            .default_output_config()
            .map_err(|e| MorphError::Device(format!("failed to get audio config: {}", e)))?;

        let sample_rate = config.sample_rate().0;
        let channels = config.channels().max(1) as usize;
        info!(
            device = %device.name().unwrap_or_else(|_| "Unknown".to_string()),
            sample_rate,
            channels,
            "audio output"
        );

        let synth = ProceduralSynth::new(sample_rate)?;
        let transport = synth.transport();
        let synth = Arc::new(Mutex::new(synth));
        let synth_cb = Arc::clone(&synth);

        let tap = SharedBlockTap::new(TAP_SIZE);
        let tap_cb = tap.clone();
        let mut mono = Vec::new();

        let stream = device
            .build_output_stream(
                &config.into(),
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let frames = data.len() / channels;
                    mono.resize(frames, 0.0);

                    match synth_cb.lock() {
                        Ok(mut synth) => synth.render(&mut mono),
                        Err(_) => mono.fill(0.0),
                    }

                    for (frame, &sample) in data.chunks_exact_mut(channels).zip(&mono) {
                        frame.fill(sample);
                    }
                    tap_cb.push(&mono);
                },
                |err| error!("audio stream error: {}", err),
                None,
            )
            .map_err(|e| MorphError::Device(format!("failed to build audio stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| MorphError::Device(format!("failed to start audio stream: {}", e)))?;

        Ok(Self {
            _stream: stream,
            transport,
            tap,
        })
    }

    pub fn transport(&self) -> SampleTransport {
        self.transport.clone()
    }

    pub fn tap(&self) -> SharedBlockTap {
        self.tap.clone()
    }
}
