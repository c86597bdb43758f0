//! Two-phase volumetric cloud raymarcher.
//!
//! Phase A walks the shell with a fixed number of coarse steps until the raw
//! density crosses the cloud threshold and refines the entry point between
//! the last two samples. Phase B integrates extinction and in-scattering from
//! that entry with a finer step, running a short sun-ward sub-march at every
//! dense sample for self-shadowing.
//!
//! Phase B sizes its step from the whole shell length, not from what is left
//! after the entry point, so a late entry covers fewer fine samples.

use crate::atmosphere::{AtmosphereService, CloudConfig, SunInfo};
use crate::clouds::density::{adjusted_density, DensityField};
use crate::clouds::phase::henyey_greenstein;
use crate::core::types::Vec3;
use crate::math::Ray;

/// Adjusted density below which a fine sample is treated as empty air.
const MIN_ADJUSTED_DENSITY: f32 = 0.01;

/// Result of marching one view ray through the cloud shell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CloudSample {
    /// Radiance scattered towards the camera by the clouds.
    pub scattered_radiance: Vec3,
    /// Fraction of the background that shows through, in [0, 1].
    pub transmittance: f32,
    /// First sample dense enough to count as the cloud's visible surface.
    /// `None` means the clouds are fully transparent along this ray.
    pub first_visible_point: Option<Vec3>,
}

impl CloudSample {
    /// No cloud along the ray.
    pub const CLEAR: Self = Self {
        scattered_radiance: Vec3::ZERO,
        transmittance: 1.0,
        first_visible_point: None,
    };
}

/// Distance interval `[start, end]` of a ray inside the cloud shell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShellSpan {
    pub start: f32,
    pub end: f32,
}

impl ShellSpan {
    #[inline]
    pub fn length(&self) -> f32 {
        self.end - self.start
    }
}

/// Spherical cloud layer around the planet centre.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CloudShell {
    pub center: Vec3,
    pub inner_radius: f32,
    pub outer_radius: f32,
}

impl CloudShell {
    pub fn new(center: Vec3, ground_radius: f32, config: &CloudConfig) -> Self {
        Self {
            center,
            inner_radius: ground_radius + config.bottom_altitude_km,
            outer_radius: ground_radius + config.top_altitude_km,
        }
    }

    /// Part of `ray` inside the shell before it would reach the inner sphere
    /// from above, or `None` when the ray never enters the shell.
    pub fn span(&self, ray: &Ray) -> Option<ShellSpan> {
        let (outer_near, outer_far) = ray.sphere_roots(self.center, self.outer_radius)?;
        let inner = ray.sphere_roots(self.center, self.inner_radius);
        let r = (ray.origin - self.center).length();

        // Where a ray coming down onto the cloud base leaves the shell
        let downward_exit = match inner {
            Some((t, _)) if t > 0.0 => t,
            _ => outer_far,
        };

        let (start, end) = if r <= self.inner_radius {
            (inner?.1, outer_far)
        } else if r <= self.outer_radius {
            (0.0, downward_exit)
        } else if outer_near >= 0.0 {
            (outer_near, downward_exit)
        } else {
            return None;
        };

        (end > start && start >= 0.0).then_some(ShellSpan { start, end })
    }
}

/// Marches view rays through one cloud shell for one sun.
pub struct CloudRaymarcher<'a> {
    density: DensityField<'a>,
    config: &'a CloudConfig,
    atmosphere: &'a dyn AtmosphereService,
    shell: CloudShell,
    sun: SunInfo,
}

impl<'a> CloudRaymarcher<'a> {
    pub fn new(
        density: DensityField<'a>,
        config: &'a CloudConfig,
        atmosphere: &'a dyn AtmosphereService,
        shell: CloudShell,
        sun: SunInfo,
    ) -> Self {
        Self { density, config, atmosphere, shell, sun }
    }

    pub fn shell(&self) -> &CloudShell {
        &self.shell
    }

    /// Integrate the clouds along `ray` over `span`.
    pub fn march(&self, ray: &Ray, span: ShellSpan) -> CloudSample {
        let length = span.length();
        if length <= 0.0 {
            return CloudSample::CLEAR;
        }

        let start = ray.at(span.start);
        match self.find_entry(start, ray.direction, length) {
            Some(entry) => self.integrate(start, ray.direction, length, entry),
            None => CloudSample::CLEAR,
        }
    }

    /// Phase A: distance from `start` at which the raw density first crosses
    /// the threshold, linearly refined between the bracketing samples.
    pub fn find_entry(&self, start: Vec3, dir: Vec3, length: f32) -> Option<f32> {
        if length <= 0.0 {
            return None;
        }
        let steps = self.config.coarse_steps.max(1);
        let step = length / steps as f32;
        let threshold = self.config.density_threshold;

        let mut prev_t = 0.0;
        let mut prev_density = f32::NEG_INFINITY;
        for i in 0..steps {
            let t = i as f32 * step;
            if t > length {
                break;
            }
            let density = self.density.sample(start + dir * t, length, t);
            if density > threshold {
                if i == 0 {
                    return Some(0.0);
                }
                let frac = ((threshold - prev_density) / (density - prev_density)).clamp(0.0, 1.0);
                return Some((prev_t + (t - prev_t) * frac).min(length));
            }
            prev_t = t;
            prev_density = density;
        }
        None
    }

    /// Phase B: extinction and in-scattering from `entry` to the end of the
    /// shell.
    fn integrate(&self, start: Vec3, dir: Vec3, length: f32, entry: f32) -> CloudSample {
        let cfg = self.config;
        let steps = cfg.fine_steps.max(1);
        let step = length / steps as f32;

        let cos_theta = dir.dot(self.sun.direction);
        let sun_phase = henyey_greenstein(cos_theta, cfg.forward_g);
        let ambient_phase = henyey_greenstein(cos_theta, cfg.ambient_g);

        let mut transmittance = 1.0_f32;
        let mut radiance = Vec3::ZERO;
        let mut first_visible_point = None;

        for i in 0..steps {
            let t = entry + i as f32 * step;
            if t > length {
                break;
            }
            let p = start + dir * t;
            let adjusted = adjusted_density(self.density.sample(p, length, t), cfg.density_threshold);
            if adjusted <= MIN_ADJUSTED_DENSITY {
                continue;
            }

            first_visible_point.get_or_insert(p);
            transmittance *= (-cfg.extinction * step * adjusted).exp();

            let up = (p - self.shell.center).normalize();
            let irradiance = self.atmosphere.irradiance(p, up, self.sun.direction);
            let sun_t = if irradiance.sun.max_element() > 0.0 {
                self.sun_transmittance(p)
            } else {
                0.0
            };

            let lobes = irradiance.sun * (sun_t * sun_phase) + irradiance.sky * ambient_phase;
            radiance += lobes * (cfg.scattering * adjusted * step * transmittance);
        }

        CloudSample {
            scattered_radiance: radiance,
            transmittance: transmittance.clamp(0.0, 1.0),
            first_visible_point,
        }
    }

    /// Transmittance from `p` towards the sun through the cloud layer.
    pub fn sun_transmittance(&self, p: Vec3) -> f32 {
        let cfg = self.config;
        let dir = self.sun.direction;
        let length = Ray::new(p, dir)
            .intersect_sphere(self.shell.center, self.shell.outer_radius)
            .unwrap_or(0.0)
            .min(cfg.sun_march_max_km);
        if length <= 0.0 {
            return 1.0;
        }

        let steps = cfg.sun_steps.max(1);
        let step = length / steps as f32;
        let mut optical_depth = 0.0;
        for j in 0..steps {
            let s = (j as f32 + 0.5) * step;
            let raw = self.density.sample(p + dir * s, length, s);
            optical_depth += adjusted_density(raw, cfg.density_threshold);
        }
        (-cfg.extinction * step * optical_depth).exp().clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atmosphere::{Irradiance, RadianceSample};
    use crate::clouds::NoiseVolume;
    use crate::core::types::Vec2;

    /// Same shape and detail everywhere.
    struct Uniform(f32);

    impl NoiseVolume for Uniform {
        fn sample(&self, _uvw: Vec3) -> Vec2 {
            Vec2::new(self.0, 0.5)
        }
    }

    /// Shape grows linearly with the march fraction.
    struct Ramp;

    impl NoiseVolume for Ramp {
        fn sample(&self, uvw: Vec3) -> Vec2 {
            Vec2::new(uvw.z, 0.5)
        }
    }

    struct FlatSky;

    impl AtmosphereService for FlatSky {
        fn sky_radiance(&self, _: Vec3, _: Vec3, _: Vec3) -> RadianceSample {
            RadianceSample::EMPTY
        }
        fn irradiance(&self, _: Vec3, _: Vec3, _: Vec3) -> Irradiance {
            Irradiance { sun: Vec3::ONE, sky: Vec3::splat(0.25) }
        }
        fn sky_radiance_to_point(&self, _: Vec3, _: Vec3, _: Vec3) -> RadianceSample {
            RadianceSample::EMPTY
        }
    }

    fn sun() -> SunInfo {
        SunInfo::new(Vec3::new(0.3, 0.0, 1.0), Vec3::ONE, 1.0, Vec3::ONE, 0.005)
    }

    fn shell(config: &CloudConfig) -> CloudShell {
        CloudShell::new(Vec3::new(0.0, 0.0, -6360.0), 6360.0, config)
    }

    fn march_up(volume: &dyn NoiseVolume, config: &CloudConfig) -> CloudSample {
        let shell = shell(config);
        let marcher = CloudRaymarcher::new(DensityField::new(volume, config), config, &FlatSky, shell, sun());
        let ray = Ray::new(Vec3::new(0.0, 0.0, 0.2), Vec3::Z);
        let span = shell.span(&ray).unwrap();
        marcher.march(&ray, span)
    }

    #[test]
    fn test_span_from_below() {
        let config = CloudConfig::default();
        let ray = Ray::new(Vec3::new(0.0, 0.0, 0.2), Vec3::Z);
        let span = shell(&config).span(&ray).unwrap();
        assert!((span.start - 1.3).abs() < 1e-2, "{span:?}");
        assert!((span.end - 3.8).abs() < 1e-2, "{span:?}");
    }

    #[test]
    fn test_span_inside_shell_going_down() {
        let config = CloudConfig::default();
        let ray = Ray::new(Vec3::new(0.0, 0.0, 3.0), Vec3::NEG_Z);
        let span = shell(&config).span(&ray).unwrap();
        assert_eq!(span.start, 0.0);
        assert!((span.end - 1.5).abs() < 1e-2, "{span:?}");
    }

    #[test]
    fn test_span_above_shell_pointing_away() {
        let config = CloudConfig::default();
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::Z);
        assert!(shell(&config).span(&ray).is_none());
    }

    #[test]
    fn test_unreachable_threshold_is_clear() {
        let config = CloudConfig {
            density_threshold: 0.95,
            ..Default::default()
        };
        assert_eq!(march_up(&Uniform(0.9), &config), CloudSample::CLEAR);
    }

    #[test]
    fn test_zero_length_span_is_clear() {
        let config = CloudConfig::default();
        let volume = Uniform(1.0);
        let marcher = CloudRaymarcher::new(DensityField::new(&volume, &config), &config, &FlatSky, shell(&config), sun());
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        let sample = marcher.march(&ray, ShellSpan { start: 2.0, end: 2.0 });
        assert_eq!(sample, CloudSample::CLEAR);
        let sample = marcher.march(&ray, ShellSpan { start: 2.0, end: 1.0 });
        assert_eq!(sample, CloudSample::CLEAR);
    }

    #[test]
    fn test_dense_cloud_attenuates_and_scatters() {
        let config = CloudConfig::default();
        let sample = march_up(&Uniform(0.9), &config);
        assert!(sample.transmittance < 1.0);
        assert!(sample.transmittance >= 0.0);
        assert!(sample.scattered_radiance.min_element() > 0.0);
        // Dense from the first sample: the visible surface is the cloud base
        let point = sample.first_visible_point.unwrap();
        assert!((point.z - 1.5).abs() < 1e-2, "{point:?}");
    }

    #[test]
    fn test_transmittance_non_increasing_in_extinction() {
        let mut prev = 1.0;
        for extinction in [0.0, 0.5, 2.0, 8.0, 40.0, 200.0] {
            let config = CloudConfig {
                extinction,
                ..Default::default()
            };
            let t = march_up(&Uniform(0.75), &config).transmittance;
            assert!((0.0..=1.0).contains(&t));
            assert!(t <= prev + 1e-6, "extinction {extinction}: {t} > {prev}");
            prev = t;
        }
    }

    #[test]
    fn test_entry_refined_at_threshold_crossing() {
        let config = CloudConfig::default();
        let marcher = CloudRaymarcher::new(DensityField::new(&Ramp, &config), &config, &FlatSky, shell(&config), sun());
        let length = 2.5;
        let entry = marcher.find_entry(Vec3::new(0.0, 0.0, 1.5), Vec3::Z, length).unwrap();
        // density = fraction, so the crossing sits at 67% of the march
        assert!((entry - 0.67 * length).abs() < 1e-3, "entry {entry}");
        assert!(entry <= length);
    }

    #[test]
    fn test_sun_transmittance_bounds() {
        let config = CloudConfig::default();
        let volume = Uniform(0.9);
        let marcher = CloudRaymarcher::new(DensityField::new(&volume, &config), &config, &FlatSky, shell(&config), sun());
        let inside = marcher.sun_transmittance(Vec3::new(0.0, 0.0, 2.0));
        assert!(inside > 0.0 && inside < 1.0);

        let clear = Uniform(0.1);
        let marcher = CloudRaymarcher::new(DensityField::new(&clear, &config), &config, &FlatSky, shell(&config), sun());
        assert_eq!(marcher.sun_transmittance(Vec3::new(0.0, 0.0, 2.0)), 1.0);
    }
}
