//! Drifting orbit camera configuration.

/// Noise-driven orbit around the form
#[derive(Debug, Clone)]
pub struct CameraDrift {
    /// Mean orbit radius (world units)
    pub radius: f32,

    /// Radius swing driven by fBm (± world units)
    pub radius_swing: f32,

    /// Noise-space speed of the radius sample
    pub radius_rate: f64,

    /// Noise-space speed of the angle samples
    pub angle_rate: f64,

    /// Azimuth swing at drift 1.0 (radians)
    pub azimuth_swing: f32,

    /// Elevation swing at drift 1.0 (radians)
    pub elevation_swing: f32,

    /// Elevation clamp, keeps the up vector well defined (radians)
    pub elevation_limit: f32,
}

impl Default for CameraDrift {
    fn default() -> Self {
        Self {
            radius: 8.0,
            radius_swing: 2.0,
            radius_rate: 0.2,
            angle_rate: 0.05,
            azimuth_swing: 2.5,
            elevation_swing: 0.9,
            elevation_limit: 1.3,
        }
    }
}
