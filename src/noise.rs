//! Seedable gradient noise and fractal Brownian motion.
//!
//! The field is fully determined by a 32-bit seed: the seed drives an
//! xorshift32 Fisher-Yates shuffle of the 256-entry permutation, which is then
//! doubled to 512 entries so corner lookups never need a modulo. Same seed,
//! same table, bit-identical output on every platform.

use noise::NoiseFn;

/// Seed used when none (or an unusable one) is supplied
pub const DEFAULT_SEED: u32 = 1337;

const FNV_OFFSET_BASIS: u32 = 2_166_136_261;
const FNV_PRIME: u32 = 16_777_619;

/// Seed accepted by [`NoiseField::set_seed`]: a raw integer or a string hashed with FNV-1a
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seed<'a> {
    Int(u32),
    Text(&'a str),
}

impl Seed<'_> {
    /// Collapse to the 32-bit value that drives the shuffle
    pub fn hash(&self) -> u32 {
        match *self {
            Seed::Int(value) => value,
            Seed::Text(text) => fnv1a(text),
        }
    }
}

impl From<u32> for Seed<'_> {
    fn from(value: u32) -> Self {
        Seed::Int(value)
    }
}

impl<'a> From<&'a str> for Seed<'a> {
    fn from(text: &'a str) -> Self {
        Seed::Text(text)
    }
}

/// FNV-1a over the characters of `text`, low 32 bits
pub fn fnv1a(text: &str) -> u32 {
    text.chars().fold(FNV_OFFSET_BASIS, |hash, c| {
        (hash ^ c as u32).wrapping_mul(FNV_PRIME)
    })
}

/// Minimal xorshift32 stream used for the permutation shuffle
struct XorShift32(u32);

impl XorShift32 {
    fn new(seed: u32) -> Self {
        // Zero is a fixed point of xorshift
        Self(if seed == 0 { 0x9E37_79B9 } else { seed })
    }

    fn next_u32(&mut self) -> u32 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.0 = x;
        x
    }
}

/// Deterministic 3D gradient noise field
#[derive(Clone)]
pub struct NoiseField {
    perm: [u8; 512],
    seed: u32,
}

impl std::fmt::Debug for NoiseField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoiseField").field("seed", &self.seed).finish()
    }
}

impl Default for NoiseField {
    fn default() -> Self {
        Self::new(Seed::Int(DEFAULT_SEED))
    }
}

impl NoiseField {
    /// Create a field from an integer or string seed
    pub fn new(seed: Seed<'_>) -> Self {
        let mut field = Self {
            perm: [0; 512],
            seed: 0,
        };
        field.set_seed(seed);
        field
    }

    /// Rebuild the permutation table in place
    pub fn set_seed(&mut self, seed: Seed<'_>) {
        let hashed = seed.hash();
        let mut table: [u8; 256] = std::array::from_fn(|i| i as u8);

        let mut rng = XorShift32::new(hashed);
        for i in (1..256).rev() {
            let j = (rng.next_u32() % (i as u32 + 1)) as usize;
            table.swap(i, j);
        }

        for (i, slot) in self.perm.iter_mut().enumerate() {
            *slot = table[i & 255];
        }
        self.seed = hashed;
    }

    /// The hashed 32-bit seed currently in effect
    pub fn seed(&self) -> u32 {
        self.seed
    }

    #[inline]
    fn p(&self, index: usize) -> usize {
        self.perm[index] as usize
    }

    /// Classic gradient noise, roughly in [-1, 1]
    pub fn noise3(&self, x: f64, y: f64, z: f64) -> f64 {
        let (fx, fy, fz) = (x.floor(), y.floor(), z.floor());
        let xi = (fx as i64 & 255) as usize;
        let yi = (fy as i64 & 255) as usize;
        let zi = (fz as i64 & 255) as usize;

        let x = x - fx;
        let y = y - fy;
        let z = z - fz;

        let u = fade(x);
        let v = fade(y);
        let w = fade(z);

        let a = self.p(xi) + yi;
        let aa = self.p(a) + zi;
        let ab = self.p(a + 1) + zi;
        let b = self.p(xi + 1) + yi;
        let ba = self.p(b) + zi;
        let bb = self.p(b + 1) + zi;

        lerp(
            w,
            lerp(
                v,
                lerp(u, grad(self.p(aa), x, y, z), grad(self.p(ba), x - 1.0, y, z)),
                lerp(
                    u,
                    grad(self.p(ab), x, y - 1.0, z),
                    grad(self.p(bb), x - 1.0, y - 1.0, z),
                ),
            ),
            lerp(
                v,
                lerp(
                    u,
                    grad(self.p(aa + 1), x, y, z - 1.0),
                    grad(self.p(ba + 1), x - 1.0, y, z - 1.0),
                ),
                lerp(
                    u,
                    grad(self.p(ab + 1), x, y - 1.0, z - 1.0),
                    grad(self.p(bb + 1), x - 1.0, y - 1.0, z - 1.0),
                ),
            ),
        )
    }

    /// Fractal sum of `octaves` noise layers; amplitude starts at 0.5, frequency at 1.0
    pub fn fbm3(&self, x: f64, y: f64, z: f64, octaves: u32, lacunarity: f64, gain: f64) -> f64 {
        let mut sum = 0.0;
        let mut amplitude = 0.5;
        let mut frequency = 1.0;
        for _ in 0..octaves {
            sum += amplitude * self.noise3(frequency * x, frequency * y, frequency * z);
            amplitude *= gain;
            frequency *= lacunarity;
        }
        sum
    }

    /// [`fbm3`](Self::fbm3) with 4 octaves, lacunarity 2.0, gain 0.5
    pub fn fbm3_default(&self, x: f64, y: f64, z: f64) -> f64 {
        self.fbm3(x, y, z, 4, 2.0, 0.5)
    }
}

/// Lets the field plug into `noise` crate combinators
impl NoiseFn<f64, 3> for NoiseField {
    fn get(&self, point: [f64; 3]) -> f64 {
        self.noise3(point[0], point[1], point[2])
    }
}

#[inline]
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(t: f64, a: f64, b: f64) -> f64 {
    a + t * (b - a)
}

/// 12 edge directions of a cube, keyed on the low 4 bits of the hash
#[inline]
fn grad(hash: usize, x: f64, y: f64, z: f64) -> f64 {
    let h = hash & 15;
    let u = if h < 8 { x } else { y };
    let v = if h < 4 {
        y
    } else if h == 12 || h == 14 {
        x
    } else {
        z
    };
    (if h & 1 == 0 { u } else { -u }) + (if h & 2 == 0 { v } else { -v })
}

#[cfg(test)]
mod tests {
    use super::*;
    use noise::{NoiseFn, ScaleBias};

    fn coords() -> impl Iterator<Item = (f64, f64, f64)> {
        (0..200).map(|i| {
            let t = i as f64;
            (t * 0.173 - 7.0, t * 0.291 + 3.5, -t * 0.057)
        })
    }

    #[test]
    fn test_fnv1a_reference_values() {
        assert_eq!(fnv1a(""), 2_166_136_261);
        assert_eq!(fnv1a("a"), 0xE40C_292C);
    }

    #[test]
    fn test_same_seed_is_bit_identical() {
        let a = NoiseField::new(Seed::Int(42));
        let b = NoiseField::new(Seed::Int(42));
        for (x, y, z) in coords() {
            assert_eq!(a.noise3(x, y, z).to_bits(), b.noise3(x, y, z).to_bits());
        }

        let s1 = NoiseField::new(Seed::Text("neon tide"));
        let s2 = NoiseField::new(Seed::Int(fnv1a("neon tide")));
        for (x, y, z) in coords() {
            assert_eq!(s1.noise3(x, y, z).to_bits(), s2.noise3(x, y, z).to_bits());
        }
    }

    #[test]
    fn test_set_seed_replaces_table() {
        let mut field = NoiseField::new(Seed::Int(1));
        let before: Vec<f64> = coords().map(|(x, y, z)| field.noise3(x, y, z)).collect();

        field.set_seed(Seed::Int(2));
        let changed: Vec<f64> = coords().map(|(x, y, z)| field.noise3(x, y, z)).collect();
        assert_ne!(before, changed);

        field.set_seed(Seed::Int(1));
        let restored: Vec<f64> = coords().map(|(x, y, z)| field.noise3(x, y, z)).collect();
        assert_eq!(before, restored);
    }

    #[test]
    fn test_permutation_is_doubled_permutation() {
        let field = NoiseField::new(Seed::Int(99));
        let mut seen = [false; 256];
        for i in 0..256 {
            seen[field.perm[i] as usize] = true;
            assert_eq!(field.perm[i], field.perm[i + 256]);
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_noise_is_zero_on_lattice_and_bounded() {
        let field = NoiseField::default();
        assert_eq!(field.noise3(3.0, -4.0, 17.0), 0.0);
        for (x, y, z) in coords() {
            let n = field.noise3(x, y, z);
            assert!(n.abs() <= 1.1, "noise {} out of range", n);
        }
    }

    #[test]
    fn test_noise_is_continuous_across_cells() {
        let field = NoiseField::new(Seed::Int(7));
        let eps = 1e-6;
        for i in -20..20 {
            // Straddle an integer boundary on x
            let x = i as f64;
            let left = field.noise3(x - eps, 0.37, 1.61);
            let right = field.noise3(x + eps, 0.37, 1.61);
            assert!((left - right).abs() < 1e-4, "jump at x={}", x);
        }
        for (x, y, z) in coords() {
            let d = (field.noise3(x + eps, y, z) - field.noise3(x, y, z)).abs();
            assert!(d < 10.0 * eps);
        }
    }

    #[test]
    fn test_single_octave_fbm_is_half_noise() {
        let field = NoiseField::new(Seed::Text("octave"));
        for (x, y, z) in coords() {
            assert_eq!(field.fbm3(x, y, z, 1, 2.0, 0.5), 0.5 * field.noise3(x, y, z));
        }
    }

    #[test]
    fn test_noise_fn_matches_noise3() {
        let field = NoiseField::new(Seed::Int(5));
        let scaled: ScaleBias<f64, &NoiseField, 3> =
            ScaleBias::new(&field).set_scale(2.0).set_bias(1.0);
        let n = field.noise3(0.3, 0.6, 0.9);
        assert_eq!(field.get([0.3, 0.6, 0.9]), n);
        assert!((scaled.get([0.3, 0.6, 0.9]) - (2.0 * n + 1.0)).abs() < 1e-12);
    }
}
