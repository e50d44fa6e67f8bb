//! Grayscale heightmap of the noise field, for eyeballing a seed.

use image::{GrayImage, Luma};

use crate::noise::NoiseField;

/// Sample default fBm over a `size` x `size` grid (z = 0)
pub fn heightmap(noise: &NoiseField, size: u32, scale: f64) -> GrayImage {
    let mut img = GrayImage::new(size, size);
    for y in 0..size {
        for x in 0..size {
            let value = noise.fbm3_default(x as f64 * scale, y as f64 * scale, 0.0);
            // fBm stays within roughly [-1, 1]
            let gray = ((value + 1.0) * 127.5).clamp(0.0, 255.0) as u8;
            img.put_pixel(x, y, Luma([gray]));
        }
    }
    img
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::Seed;

    #[test]
    fn test_heightmap_dimensions_and_variation() {
        let img = heightmap(&NoiseField::new(Seed::Int(5)), 64, 0.07);
        assert_eq!(img.dimensions(), (64, 64));

        let first = img.get_pixel(0, 0)[0];
        // Origin is a lattice point, so fBm is exactly zero there
        assert_eq!(first, 127);
        assert!(img.pixels().any(|p| p[0] != first));
    }

    #[test]
    fn test_same_seed_same_image() {
        let a = heightmap(&NoiseField::new(Seed::Text("dunes")), 32, 0.1);
        let b = heightmap(&NoiseField::new(Seed::Text("dunes")), 32, 0.1);
        assert_eq!(a, b);
    }
}
