//! The fixed shape set and the indexed meshes built for it.

mod geometry;

use glam::Vec3;
use serde::{Deserialize, Serialize};

pub use geometry::{box_grid, geosphere, plane_grid, torus_knot, uv_sphere};

/// Shapes the form can take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    #[default]
    Sphere,
    Icosahedron,
    TorusKnot,
    Plane,
    Box,
}

impl ShapeKind {
    /// Auto-cycle candidates, in selection order
    pub const ALL: [ShapeKind; 5] = [
        ShapeKind::Sphere,
        ShapeKind::Icosahedron,
        ShapeKind::TorusKnot,
        ShapeKind::Plane,
        ShapeKind::Box,
    ];

    /// Build the undisplaced mesh for this shape
    pub fn build(self) -> Mesh {
        match self {
            ShapeKind::Sphere => uv_sphere(1.6, 96, 64),
            ShapeKind::Icosahedron => geosphere(1.7, 4),
            ShapeKind::TorusKnot => torus_knot(1.3, 0.38, 2, 3, 256, 32),
            ShapeKind::Plane => plane_grid(4.0, 128),
            ShapeKind::Box => box_grid(2.4, 32),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ShapeKind::Sphere => "sphere",
            ShapeKind::Icosahedron => "icosahedron",
            ShapeKind::TorusKnot => "torus_knot",
            ShapeKind::Plane => "plane",
            ShapeKind::Box => "box",
        }
    }

    /// Parse a user-supplied name; unknown names yield `None`
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "sphere" => Some(ShapeKind::Sphere),
            "icosahedron" | "ico" => Some(ShapeKind::Icosahedron),
            "torus_knot" | "torusknot" | "knot" => Some(ShapeKind::TorusKnot),
            "plane" => Some(ShapeKind::Plane),
            "box" | "cube" => Some(ShapeKind::Box),
            _ => None,
        }
    }
}

impl std::fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Indexed triangle mesh (counter-clockwise winding, outward facing)
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub positions: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Area-weighted vertex normals from face normals
///
/// `normals` is resized to `positions.len()`. Vertices on no triangle (the
/// unused seam copy at a UV pole) get their radial direction.
pub fn compute_normals(positions: &[Vec3], indices: &[u32], normals: &mut Vec<Vec3>) {
    normals.clear();
    normals.resize(positions.len(), Vec3::ZERO);

    for tri in indices.chunks_exact(3) {
        let (i0, i1, i2) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        let v0 = positions[i0];
        let face = (positions[i1] - v0).cross(positions[i2] - v0);
        normals[i0] += face;
        normals[i1] += face;
        normals[i2] += face;
    }

    for (n, p) in normals.iter_mut().zip(positions) {
        *n = n
            .try_normalize()
            .or_else(|| p.try_normalize())
            .unwrap_or(Vec3::Y);
    }
}
