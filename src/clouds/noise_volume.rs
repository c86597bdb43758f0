//! Tileable 3D cloud noise volume.
//!
//! The cloud density field reads a two-channel volume (shape, detail) with
//! wrap addressing on every axis. [`CloudNoiseVolume`] bakes one from
//! fractal Perlin noise; any other source only has to implement
//! [`NoiseVolume`].

use noise::{Fbm, MultiFractal, NoiseFn, Perlin};
use rayon::prelude::*;

use crate::core::types::{Result, Vec2, Vec3};
use crate::core::Error;

/// Two-channel volume sampled with normalized, wrapping coordinates.
pub trait NoiseVolume: Send + Sync {
    /// Channel 0 (shape) and channel 1 (detail) at `uvw`. Every axis wraps
    /// with period 1.
    fn sample(&self, uvw: Vec3) -> Vec2;
}

/// Baked `size³` volume with trilinear filtering.
#[derive(Clone, Debug)]
pub struct CloudNoiseVolume {
    size: u32,
    texels: Vec<[f32; 2]>,
}

/// Noise-domain period of the shape channel (lattice cells per tile).
const SHAPE_PERIOD: f64 = 4.0;
/// Noise-domain period of the detail channel.
const DETAIL_PERIOD: f64 = 8.0;

impl CloudNoiseVolume {
    /// Bake a tileable volume of `size³` texels from `seed`.
    pub fn generate(size: u32, seed: u32) -> Result<Self> {
        if size == 0 {
            return Err(Error::Volume("noise volume size must be non-zero".into()));
        }

        let start = std::time::Instant::now();
        let shape = Fbm::<Perlin>::new(seed)
            .set_octaves(4)
            .set_persistence(0.5)
            .set_lacunarity(2.0);
        let detail = Fbm::<Perlin>::new(seed.wrapping_add(1))
            .set_octaves(3)
            .set_persistence(0.6)
            .set_lacunarity(2.0);

        let n = size as usize;
        let texels: Vec<[f32; 2]> = (0..n * n * n)
            .into_par_iter()
            .map(|i| {
                let x = i % n;
                let y = (i / n) % n;
                let z = i / (n * n);
                let uvw = [
                    (x as f64 + 0.5) / n as f64,
                    (y as f64 + 0.5) / n as f64,
                    (z as f64 + 0.5) / n as f64,
                ];
                [
                    to_unit(tileable(&shape, uvw, SHAPE_PERIOD)),
                    to_unit(tileable(&detail, uvw, DETAIL_PERIOD)),
                ]
            })
            .collect();

        log::info!(
            "Baked {size}^3 cloud noise volume in {:.1}ms",
            start.elapsed().as_secs_f64() * 1000.0
        );

        Ok(Self { size, texels })
    }

    /// Wrap existing texels, laid out x fastest then y then z.
    pub fn from_texels(size: u32, texels: Vec<[f32; 2]>) -> Result<Self> {
        let expected = (size as usize).pow(3);
        if size == 0 || texels.len() != expected {
            return Err(Error::Volume(format!(
                "expected {expected} texels for a {size}^3 volume, got {}",
                texels.len()
            )));
        }
        Ok(Self { size, texels })
    }

    /// Edge length in texels.
    pub fn size(&self) -> u32 {
        self.size
    }

    #[inline]
    fn texel(&self, x: i64, y: i64, z: i64) -> Vec2 {
        let n = self.size as i64;
        let idx = (x.rem_euclid(n) + n * (y.rem_euclid(n) + n * z.rem_euclid(n))) as usize;
        Vec2::from(self.texels[idx])
    }
}

impl NoiseVolume for CloudNoiseVolume {
    fn sample(&self, uvw: Vec3) -> Vec2 {
        let p = uvw * self.size as f32 - Vec3::splat(0.5);
        let base = p.floor();
        let f = p - base;
        let (x, y, z) = (base.x as i64, base.y as i64, base.z as i64);

        let c00 = self.texel(x, y, z).lerp(self.texel(x + 1, y, z), f.x);
        let c10 = self.texel(x, y + 1, z).lerp(self.texel(x + 1, y + 1, z), f.x);
        let c01 = self.texel(x, y, z + 1).lerp(self.texel(x + 1, y, z + 1), f.x);
        let c11 = self.texel(x, y + 1, z + 1).lerp(self.texel(x + 1, y + 1, z + 1), f.x);

        c00.lerp(c10, f.y).lerp(c01.lerp(c11, f.y), f.z)
    }
}

/// Periodic version of `noise` over the unit cube: blends the eight shifted
/// copies so that opposite faces match exactly.
fn tileable(noise: &impl NoiseFn<f64, 3>, uvw: [f64; 3], period: f64) -> f64 {
    let p = [uvw[0] * period, uvw[1] * period, uvw[2] * period];
    let mut sum = 0.0;
    for corner in 0..8u32 {
        let mut weight = 1.0;
        let mut q = p;
        for axis in 0..3 {
            if corner & (1 << axis) != 0 {
                weight *= uvw[axis];
                q[axis] -= period;
            } else {
                weight *= 1.0 - uvw[axis];
            }
        }
        sum += weight * noise.get(q);
    }
    sum
}

#[inline]
fn to_unit(v: f64) -> f32 {
    (v * 0.5 + 0.5).clamp(0.0, 1.0) as f32
}
