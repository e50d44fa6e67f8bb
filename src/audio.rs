//! Audio sources and real-time signal extraction.
//!
//! The core never talks to an audio device directly. It reads a clock (or a
//! musical transport) and a level tap through small capability traits, so the
//! same adapter runs against live output, offline rendering, or test doubles.

mod clock;
mod decode;
mod signal;
mod synthesis;
#[cfg(feature = "live")]
mod system;
mod tap;

// Re-export public types
pub use clock::{ManualClock, PlaybackClock, SampleTransport, SystemClock, Transport};
pub use signal::{AudioSignalAdapter, SourceMode};
pub use synthesis::{ProceduralSynth, GLICOL_COMPOSITION, PROCEDURAL_BPM};
#[cfg(feature = "live")]
pub use system::LiveOutput;
pub use tap::{block_rms, LevelTap, SharedBlockTap, SilentTap, TrackTap};
