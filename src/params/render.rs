//! Projection configuration for the exported camera transform.

/// Rendering configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Viewport width (pixels)
    pub width: u32,

    /// Viewport height (pixels)
    pub height: u32,

    /// Vertical field of view (degrees)
    pub fov_degrees: f32,

    /// Near clipping plane (world units)
    pub near_plane: f32,

    /// Far clipping plane (world units)
    pub far_plane: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fov_degrees: 60.0,
            near_plane: 0.1,
            far_plane: 200.0,
        }
    }
}

impl RenderConfig {
    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            return 1.0;
        }
        self.width as f32 / self.height as f32
    }
}
