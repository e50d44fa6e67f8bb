//! Procedural music synthesis: the Glicol composition and an offline renderer.

use glicol::Engine;
use tracing::debug;

use super::clock::SampleTransport;
use crate::error::{MorphError, Result};
use crate::params::audio_constants::BLOCK_SIZE;

/// Glicol composition (procedural music code)
pub const GLICOL_COMPOSITION: &str = r#"
~gate: speed 2.0 >> seq 60 _60 _~a 48
~a: choose 48 48 48 72 0 0 0
~amp: ~gate >> envperc 0.001 0.1
~pit: ~gate >> mul 261.63
~lead: saw ~pit >> mul ~amp >> lpf ~mod 5.0 >> mul 0.1
~mod: sin 0.2 >> mul 1300 >> add 1500
o: ~lead >> plate 0.1
"#;

/// Tempo of the composition; Glicol's sequencer runs at its default 120 BPM
pub const PROCEDURAL_BPM: f64 = 120.0;

/// Safety limiter ceiling
const OUTPUT_LIMIT: f32 = 0.5;

/// Glicol engine rendering the composition block by block
///
/// Every rendered sample advances the attached transport, so the transport
/// position is exactly the audio that has been produced.
pub struct ProceduralSynth {
    engine: Engine<BLOCK_SIZE>,
    transport: SampleTransport,
    pending: Vec<f32>,
}

impl ProceduralSynth {
    pub fn new(sample_rate: u32) -> Result<Self> {
        let mut engine = Engine::<BLOCK_SIZE>::new();
        engine.set_sr(sample_rate as usize);
        engine.update_with_code(GLICOL_COMPOSITION);
        engine
            .update()
            .map_err(|e| MorphError::Synth(format!("Glicol engine init failed: {:?}", e)))?;

        debug!(sample_rate, bpm = PROCEDURAL_BPM, "procedural synth ready");

        Ok(Self {
            engine,
            transport: SampleTransport::new(sample_rate, PROCEDURAL_BPM),
            pending: Vec::with_capacity(BLOCK_SIZE),
        })
    }

    /// Transport driven by this synth (clones share the sample counter)
    pub fn transport(&self) -> SampleTransport {
        self.transport.clone()
    }

    /// Fill `out` with limited mono samples
    pub fn render(&mut self, out: &mut [f32]) {
        let mut written = 0;
        while written < out.len() {
            if self.pending.is_empty() {
                let (buffers, _) = self.engine.next_block(vec![]);
                // Left channel only; the composition is mono
                self.pending
                    .extend((0..BLOCK_SIZE).rev().map(|i| buffers[0][i]));
            }
            while written < out.len() {
                let Some(sample) = self.pending.pop() else {
                    break;
                };
                out[written] = sample.clamp(-OUTPUT_LIMIT, OUTPUT_LIMIT);
                written += 1;
            }
        }
        self.transport.advance(out.len() as u64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::Transport;

    #[test]
    fn test_render_advances_transport_and_limits_output() {
        let mut synth = ProceduralSynth::new(44100).unwrap();
        let transport = synth.transport();

        let mut block = vec![0.0; 44100 / 2];
        synth.render(&mut block);

        assert!((transport.elapsed_seconds() - 0.5).abs() < 1e-9);
        assert!(block.iter().all(|s| s.abs() <= OUTPUT_LIMIT));
        assert_eq!(transport.beat_duration(), 0.5);
    }

    #[test]
    fn test_partial_blocks_count_every_sample() {
        let mut synth = ProceduralSynth::new(1000).unwrap();
        let transport = synth.transport();

        let mut buf = vec![0.0; 77];
        for _ in 0..10 {
            synth.render(&mut buf);
        }
        assert_eq!(transport.rendered_samples(), 770);
        assert!((transport.elapsed_seconds() - 0.77).abs() < 1e-9);
    }
}
