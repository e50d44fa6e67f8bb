//! Noise-driven orbit camera.

use glam::{Mat4, Vec3};

use crate::noise::NoiseField;
use crate::params::{CameraDrift, RenderConfig};

/// Camera placement for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub eye: Vec3,
    pub target: Vec3,
    pub radius: f32,
    pub azimuth: f32,
    pub elevation: f32,
}

/// Orbits the origin on a sphere whose radius and angles wander with fBm
pub struct CameraSystem {
    params: CameraDrift,
}

impl Default for CameraSystem {
    fn default() -> Self {
        Self::new(CameraDrift::default())
    }
}

impl CameraSystem {
    pub fn new(params: CameraDrift) -> Self {
        Self { params }
    }

    /// Compute camera position for given time
    ///
    /// # Arguments
    /// * `noise` - Field shared with the mesh deformation
    /// * `time_s` - Current time in seconds
    /// * `drift` - Style camera-drift multiplier
    /// * `kaleido` - Fold angular offsets toward symmetric octants
    pub fn pose(&self, noise: &NoiseField, time_s: f64, drift: f32, kaleido: bool) -> CameraPose {
        let p = &self.params;
        let drift64 = drift as f64;

        let radius_noise = noise.fbm3_default(p.radius_rate * time_s * drift64, 0.5, 0.7) as f32;
        let radius = p.radius + p.radius_swing * radius_noise;

        let s = p.angle_rate * time_s * drift64;
        let mut azimuth = noise.fbm3_default(s, 3.1, 7.2) as f32 * p.azimuth_swing * drift;
        let mut elevation = noise.fbm3_default(11.5, s, 2.7) as f32 * p.elevation_swing * drift;

        if kaleido {
            azimuth = fold(azimuth);
            elevation = fold(elevation);
        }
        let elevation = elevation.clamp(-p.elevation_limit, p.elevation_limit);

        let eye = Vec3::new(
            radius * elevation.cos() * azimuth.sin(),
            radius * elevation.sin(),
            radius * elevation.cos() * azimuth.cos(),
        );

        CameraPose {
            eye,
            target: Vec3::ZERO,
            radius,
            azimuth,
            elevation,
        }
    }

    /// Create view-projection matrix for a pose
    pub fn view_proj(pose: &CameraPose, render_config: &RenderConfig) -> Mat4 {
        // Always keep Y as up vector (camera never rolls)
        let view = Mat4::look_at_rh(pose.eye, pose.target, Vec3::Y);
        let proj = Mat4::perspective_rh(
            render_config.fov_degrees.to_radians(),
            render_config.aspect_ratio(),
            render_config.near_plane,
            render_config.far_plane,
        );
        proj * view
    }
}

/// sign(x) * sqrt(|x|)
fn fold(x: f32) -> f32 {
    x.signum() * x.abs().sqrt()
}
