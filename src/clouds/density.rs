//! Procedural cloud density.

use crate::atmosphere::CloudConfig;
use crate::clouds::noise_volume::NoiseVolume;
use crate::core::types::{Vec2, Vec3};

/// Cloud optical density built from two scales of one noise volume.
///
/// The result is not bounded: the detail layer can push it below zero or
/// above one, so callers clamp before using it as an extinction weight.
#[derive(Clone, Copy)]
pub struct DensityField<'a> {
    volume: &'a dyn NoiseVolume,
    coarse_scale: f32,
    detail_scale: f32,
    detail_weight: f32,
    offset: Vec2,
}

impl<'a> DensityField<'a> {
    pub fn new(volume: &'a dyn NoiseVolume, config: &CloudConfig) -> Self {
        Self {
            volume,
            coarse_scale: config.coarse_scale,
            detail_scale: config.detail_scale,
            detail_weight: config.detail_weight,
            offset: Vec2::from(config.wind_offset),
        }
    }

    /// Density at `point` for a sample `current_ray` into a march of
    /// `ray_length`.
    ///
    /// The march fraction is the volume's vertical coordinate; both layers
    /// share it and differ only in horizontal frequency.
    #[inline]
    pub fn sample(&self, point: Vec3, ray_length: f32, current_ray: f32) -> f32 {
        let h = if ray_length > 0.0 { current_ray / ray_length } else { 0.0 };
        let xy = point.truncate() + self.offset;

        let coarse = self.volume.sample((xy * self.coarse_scale).extend(h));
        let fine = self.volume.sample((xy * self.detail_scale).extend(h));

        coarse.x + (fine.y - 0.5) * self.detail_weight
    }
}

/// Density above `threshold`, rescaled to [0, 1] over the remaining range.
#[inline]
pub fn adjusted_density(raw: f32, threshold: f32) -> f32 {
    ((raw - threshold).max(0.0) / (1.0 - threshold).max(1e-4)).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Shape from the x coordinate, detail from the vertical coordinate.
    struct Gradient;

    impl NoiseVolume for Gradient {
        fn sample(&self, uvw: Vec3) -> Vec2 {
            Vec2::new(uvw.x, uvw.z)
        }
    }

    #[test]
    fn test_combines_two_layers() {
        let config = CloudConfig::default();
        let field = DensityField::new(&Gradient, &config);
        let d = field.sample(Vec3::new(10.0, 0.0, 2.0), 4.0, 1.0);
        // coarse.x = 10 * 0.02, fine.y = 1 / 4
        let expected = 0.2 + (0.25 - 0.5) * 0.1;
        assert!((d - expected).abs() < 1e-6, "{d} vs {expected}");
    }

    #[test]
    fn test_can_go_negative() {
        let config = CloudConfig::default();
        let field = DensityField::new(&Gradient, &config);
        assert!(field.sample(Vec3::ZERO, 4.0, 0.0) < 0.0);
    }

    #[test]
    fn test_zero_length_ray() {
        let config = CloudConfig::default();
        let field = DensityField::new(&Gradient, &config);
        let d = field.sample(Vec3::new(5.0, 0.0, 0.0), 0.0, 0.0);
        assert!((d - (0.1 - 0.05)).abs() < 1e-6);
    }

    #[test]
    fn test_deterministic() {
        let volume = crate::clouds::CloudNoiseVolume::generate(8, 5).unwrap();
        let config = CloudConfig::default();
        let field = DensityField::new(&volume, &config);
        let p = Vec3::new(3.7, -12.5, 2.2);
        assert_eq!(field.sample(p, 2.5, 0.8), field.sample(p, 2.5, 0.8));
    }

    #[test]
    fn test_wind_offset_shifts_domain() {
        let config = CloudConfig {
            wind_offset: [5.0, 0.0],
            ..Default::default()
        };
        let shifted = DensityField::new(&Gradient, &config);
        let plain = DensityField::new(&Gradient, &CloudConfig::default());
        let a = shifted.sample(Vec3::ZERO, 1.0, 0.5);
        let b = plain.sample(Vec3::new(5.0, 0.0, 0.0), 1.0, 0.5);
        assert!((a - b).abs() < 1e-6);
    }

    #[test]
    fn test_adjusted_density() {
        assert_eq!(adjusted_density(0.5, 0.67), 0.0);
        assert!((adjusted_density(0.835, 0.67) - 0.5).abs() < 1e-5);
        assert_eq!(adjusted_density(3.0, 0.67), 1.0);
    }
}
