//! Morphwave library - Audio-reactive morphing form

pub mod analysis;
pub mod audio;
pub mod camera;
pub mod deform;
pub mod error;
pub mod noise;
pub mod params;
pub mod preview;
pub mod scene;
pub mod schedule;
pub mod session;
pub mod shape;

pub use error::{MorphError, Result};
pub use session::{Session, SessionConfig};
