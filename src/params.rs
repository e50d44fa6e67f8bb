//! Parameter definitions with units and documented semantics.
//!
//! Every heuristic constant lives here with its default, so callers can
//! override any of them without touching the algorithms.

mod analysis;
mod camera;
mod deform;
mod render;
mod schedule;
mod signal;
mod style;

// Re-export all types
pub use analysis::AnalysisConfig;
pub use camera::CameraDrift;
pub use deform::{ColorDynamics, DeformParams};
pub use render::RenderConfig;
pub use schedule::ScheduleConfig;
pub use signal::{audio_constants, SignalConfig};
pub use style::StyleParameters;
