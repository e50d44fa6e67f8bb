//! Renderable output of a frame: what the render surface uploads and draws.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2};

use crate::camera::CameraPose;
use crate::shape::ShapeKind;

/// Vertex data for the form mesh (position + normal)
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Uniform block for the form shader
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct FrameUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    /// RGB + emissive strength
    pub color: [f32; 4],
    /// Background / fog RGB + unused
    pub background: [f32; 4],
    pub time: f32,
    pub pulse: f32,
    pub level: f32,
    /// Bit 0 wireframe, bit 1 toon, bit 2 kaleidoscope
    pub flags: u32,
}

/// Material state derived from style and pulse
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Material {
    /// Linear RGB in [0, 1]
    pub color: [f32; 3],
    pub emissive: f32,
    pub wireframe: bool,
    pub toon: bool,
    pub kaleido: bool,
}

impl Material {
    pub fn flags(&self) -> u32 {
        (self.wireframe as u32) | (self.toon as u32) << 1 | (self.kaleido as u32) << 2
    }
}

/// Everything the render surface needs for one frame
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub shape: ShapeKind,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub camera: Option<CameraPose>,
    pub view_proj: Mat4,
    /// Model rotation about x and y (radians)
    pub rotation: Vec2,
    pub material: Material,
    pub background: [f32; 3],
    pub time: f32,
    pub pulse: f32,
    pub level: f32,
}

impl Scene {
    /// Model matrix from the accumulated rotation
    pub fn model(&self) -> Mat4 {
        Mat4::from_rotation_y(self.rotation.y) * Mat4::from_rotation_x(self.rotation.x)
    }

    pub fn uniforms(&self) -> FrameUniforms {
        let [r, g, b] = self.material.color;
        let [br, bg, bb] = self.background;
        FrameUniforms {
            view_proj: self.view_proj.to_cols_array_2d(),
            model: self.model().to_cols_array_2d(),
            color: [r, g, b, self.material.emissive],
            background: [br, bg, bb, 1.0],
            time: self.time,
            pulse: self.pulse,
            level: self.level,
            flags: self.material.flags(),
        }
    }

    /// Vertex bytes ready for a GPU buffer
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

/// HSL in [0, 1] to RGB in [0, 1]
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> [f32; 3] {
    if s <= 0.0 {
        return [l, l, l];
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    [
        hue_channel(p, q, h + 1.0 / 3.0),
        hue_channel(p, q, h),
        hue_channel(p, q, h - 1.0 / 3.0),
    ]
}

fn hue_channel(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: [f32; 3], b: [f32; 3]) -> bool {
        a.iter().zip(&b).all(|(x, y)| (x - y).abs() < 1e-5)
    }

    #[test]
    fn test_hsl_primaries() {
        assert!(close(hsl_to_rgb(0.0, 1.0, 0.5), [1.0, 0.0, 0.0]));
        assert!(close(hsl_to_rgb(1.0 / 3.0, 1.0, 0.5), [0.0, 1.0, 0.0]));
        assert!(close(hsl_to_rgb(2.0 / 3.0, 1.0, 0.5), [0.0, 0.0, 1.0]));
        assert!(close(hsl_to_rgb(0.3, 0.0, 0.25), [0.25, 0.25, 0.25]));
    }

    #[test]
    fn test_uniform_layout_has_no_padding() {
        assert_eq!(std::mem::size_of::<FrameUniforms>(), 176);
        assert_eq!(std::mem::size_of::<Vertex>(), 24);
    }

    #[test]
    fn test_material_flags() {
        let material = Material {
            wireframe: true,
            kaleido: true,
            ..Material::default()
        };
        assert_eq!(material.flags(), 0b101);
    }
}
