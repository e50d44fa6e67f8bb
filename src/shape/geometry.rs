//! Geometry builders for each shape.

use std::collections::HashMap;
use std::f32::consts::{PI, TAU};

use glam::Vec3;

use super::Mesh;

/// Latitude/longitude sphere with a duplicated seam column
pub fn uv_sphere(radius: f32, width_segments: u32, height_segments: u32) -> Mesh {
    let w = width_segments.max(3);
    let h = height_segments.max(2);
    let mut positions = Vec::with_capacity(((w + 1) * (h + 1)) as usize);
    let mut indices = Vec::new();

    for iy in 0..=h {
        let theta = iy as f32 / h as f32 * PI;
        for ix in 0..=w {
            let phi = ix as f32 / w as f32 * TAU;
            positions.push(Vec3::new(
                -radius * phi.cos() * theta.sin(),
                radius * theta.cos(),
                radius * phi.sin() * theta.sin(),
            ));
        }
    }

    for iy in 0..h {
        for ix in 0..w {
            let a = iy * (w + 1) + ix;
            let b = a + w + 1;
            let c = b + 1;
            let d = a + 1;
            // Skip the degenerate half of each pole quad
            if iy != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if iy != h - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    Mesh { positions, indices }
}

/// Icosahedron refined by midpoint subdivision and projected onto the sphere
pub fn geosphere(radius: f32, subdivisions: u32) -> Mesh {
    let t = (1.0 + 5f32.sqrt()) / 2.0;
    let mut positions: Vec<Vec3> = [
        [-1.0, t, 0.0],
        [1.0, t, 0.0],
        [-1.0, -t, 0.0],
        [1.0, -t, 0.0],
        [0.0, -1.0, t],
        [0.0, 1.0, t],
        [0.0, -1.0, -t],
        [0.0, 1.0, -t],
        [t, 0.0, -1.0],
        [t, 0.0, 1.0],
        [-t, 0.0, -1.0],
        [-t, 0.0, 1.0],
    ]
    .iter()
    .map(|p| Vec3::from_array(*p).normalize() * radius)
    .collect();

    let mut faces: Vec<[u32; 3]> = vec![
        [0, 11, 5],
        [0, 5, 1],
        [0, 1, 7],
        [0, 7, 10],
        [0, 10, 11],
        [1, 5, 9],
        [5, 11, 4],
        [11, 10, 2],
        [10, 7, 6],
        [7, 1, 8],
        [3, 9, 4],
        [3, 4, 2],
        [3, 2, 6],
        [3, 6, 8],
        [3, 8, 9],
        [4, 9, 5],
        [2, 4, 11],
        [6, 2, 10],
        [8, 6, 7],
        [9, 8, 1],
    ];

    for _ in 0..subdivisions {
        let mut midpoints: HashMap<(u32, u32), u32> = HashMap::new();
        let mut midpoint = |a: u32, b: u32, positions: &mut Vec<Vec3>| -> u32 {
            let key = if a < b { (a, b) } else { (b, a) };
            *midpoints.entry(key).or_insert_with(|| {
                let mid = (positions[a as usize] + positions[b as usize]) * 0.5;
                positions.push(mid.normalize() * radius);
                (positions.len() - 1) as u32
            })
        };

        let mut refined = Vec::with_capacity(faces.len() * 4);
        for [a, b, c] in faces {
            let ab = midpoint(a, b, &mut positions);
            let bc = midpoint(b, c, &mut positions);
            let ca = midpoint(c, a, &mut positions);
            refined.extend_from_slice(&[[a, ab, ca], [b, bc, ab], [c, ca, bc], [ab, bc, ca]]);
        }
        faces = refined;
    }

    Mesh {
        positions,
        indices: faces.into_iter().flatten().collect(),
    }
}

/// (p, q) torus knot swept by a circular tube
pub fn torus_knot(
    radius: f32,
    tube: f32,
    p: u32,
    q: u32,
    tubular_segments: u32,
    radial_segments: u32,
) -> Mesh {
    let tubular = tubular_segments.max(3);
    let radial = radial_segments.max(3);
    let (p, q) = (p.max(1) as f32, q.max(1) as f32);

    let curve = |u: f32| -> Vec3 {
        let quo_p = q / p * u;
        let cs = quo_p.cos();
        Vec3::new(
            radius * (2.0 + cs) * 0.5 * u.cos(),
            radius * (2.0 + cs) * 0.5 * u.sin(),
            radius * quo_p.sin() * 0.5,
        )
    };

    let mut positions = Vec::with_capacity(((tubular + 1) * (radial + 1)) as usize);
    for i in 0..=tubular {
        let u = i as f32 / tubular as f32 * p * TAU;
        let p1 = curve(u);
        let p2 = curve(u + 0.01);

        // Frame along the curve
        let tangent = p2 - p1;
        let mut normal = p2 + p1;
        let binormal = tangent.cross(normal).normalize_or_zero();
        normal = binormal.cross(tangent).normalize_or_zero();

        for j in 0..=radial {
            let v = j as f32 / radial as f32 * TAU;
            let cx = -tube * v.cos();
            let cy = tube * v.sin();
            positions.push(p1 + normal * cx + binormal * cy);
        }
    }

    let mut indices = Vec::with_capacity((tubular * radial * 6) as usize);
    for j in 1..=tubular {
        for i in 1..=radial {
            let a = (radial + 1) * (j - 1) + (i - 1);
            let b = (radial + 1) * j + (i - 1);
            let c = (radial + 1) * j + i;
            let d = (radial + 1) * (j - 1) + i;
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }

    Mesh { positions, indices }
}

/// Square grid in the XY plane facing +Z
pub fn plane_grid(size: f32, segments: u32) -> Mesh {
    let half = size / 2.0;
    let mut mesh = Mesh::default();
    push_face(
        &mut mesh,
        Vec3::new(-half, -half, 0.0),
        Vec3::X * size,
        Vec3::Y * size,
        segments,
    );
    mesh
}

/// Cube with each face subdivided into a grid
pub fn box_grid(size: f32, segments: u32) -> Mesh {
    let half = size / 2.0;
    let mut mesh = Mesh::default();

    // (u, v) pairs chosen so u x v is the outward normal
    let faces = [
        (Vec3::Y, Vec3::Z),
        (Vec3::Z, Vec3::Y),
        (Vec3::Z, Vec3::X),
        (Vec3::X, Vec3::Z),
        (Vec3::X, Vec3::Y),
        (Vec3::Y, Vec3::X),
    ];
    for (u, v) in faces {
        let normal = u.cross(v);
        let origin = (normal - u - v) * half;
        push_face(&mut mesh, origin, u * size, v * size, segments);
    }
    mesh
}

/// Append a subdivided quad spanning `origin .. origin + u + v`
fn push_face(mesh: &mut Mesh, origin: Vec3, u: Vec3, v: Vec3, segments: u32) {
    let segments = segments.max(1);
    let base = mesh.positions.len() as u32;
    let row = segments + 1;

    for j in 0..=segments {
        for i in 0..=segments {
            let s = i as f32 / segments as f32;
            let t = j as f32 / segments as f32;
            mesh.positions.push(origin + u * s + v * t);
        }
    }

    // Counter-clockwise when viewed from the u x v side
    for j in 0..segments {
        for i in 0..segments {
            let bottom_left = base + j * row + i;
            let bottom_right = bottom_left + 1;
            let top_left = bottom_left + row;
            let top_right = top_left + 1;

            mesh.indices.extend_from_slice(&[
                bottom_left,
                bottom_right,
                top_right,
                bottom_left,
                top_right,
                top_left,
            ]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uv_sphere_counts() {
        let mesh = uv_sphere(1.0, 8, 6);
        assert_eq!(mesh.vertex_count(), 9 * 7);
        // Pole rows contribute one triangle per quad
        assert_eq!(mesh.triangle_count(), 8 * 6 * 2 - 2 * 8);
        assert!(mesh
            .positions
            .iter()
            .all(|p| (p.length() - 1.0).abs() < 1e-5));
    }

    #[test]
    fn test_geosphere_counts_and_radius() {
        let mesh = geosphere(2.0, 2);
        assert_eq!(mesh.triangle_count(), 20 * 16);
        // Euler: V = F / 2 + 2 for a closed triangulated sphere
        assert_eq!(mesh.vertex_count(), 20 * 16 / 2 + 2);
        assert!(mesh
            .positions
            .iter()
            .all(|p| (p.length() - 2.0).abs() < 1e-4));
    }

    #[test]
    fn test_torus_knot_counts() {
        let mesh = torus_knot(1.0, 0.3, 2, 3, 64, 8);
        assert_eq!(mesh.vertex_count(), 65 * 9);
        assert_eq!(mesh.triangle_count(), 64 * 8 * 2);
    }

    #[test]
    fn test_grid_counts() {
        let plane = plane_grid(4.0, 10);
        assert_eq!(plane.vertex_count(), 11 * 11);
        assert_eq!(plane.triangle_count(), 10 * 10 * 2);

        let cube = box_grid(2.0, 3);
        assert_eq!(cube.vertex_count(), 6 * 16);
        assert!(cube
            .positions
            .iter()
            .all(|p| (p.abs().max_element() - 1.0).abs() < 1e-5));
    }
}
