//! Per-texel probe shading.
//!
//! Each direction takes one of two paths:
//! - terrain: lit ground from the terrain buffer, shadowed through the sun
//!   shadow map and seen through aerial perspective from the terrain origin
//! - sky: physical sky plus solar disk, or the idealized ground sphere when
//!   the view ray goes below the horizon, composited under the cloud layer
//!
//! Texels that see the solar disk feed the sun statistics; a sparse grid of
//! the others feeds the sky statistics.

use std::f32::consts::PI;

use crate::atmosphere::{AtmosphereService, SunInfo};
use crate::clouds::{CloudRaymarcher, CloudShell, DensityField};
use crate::core::types::{UVec3, Vec3, Vec4};
use crate::math::cubemap::{texel_direction, texel_solid_angle};
use crate::math::Ray;
use crate::probe::config::ProbeConfig;
use crate::probe::statistics::ProbeStatistics;
use crate::probe::ProbeResources;
use crate::shadow::ShadowMap;
use crate::terrain::{TerrainBuffer, TerrainSample};

/// Output of one shaded direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadedTexel {
    /// Linear RGB radiance, alpha 1.
    pub color: Vec4,
    /// Whether the texel sees the solar disk.
    pub direct_sun: bool,
}

/// Shades probe texels for one dispatch.
pub struct SkyCompositor<'a> {
    config: &'a ProbeConfig,
    atmosphere: &'a dyn AtmosphereService,
    terrain: Option<&'a dyn TerrainBuffer>,
    shadow_map: Option<&'a ShadowMap>,
    clouds: Option<CloudRaymarcher<'a>>,
    statistics: &'a ProbeStatistics,
    sun: SunInfo,
}

impl<'a> SkyCompositor<'a> {
    pub fn new(config: &'a ProbeConfig, resources: ProbeResources<'a>, statistics: &'a ProbeStatistics) -> Self {
        let sun = config.sun();
        let clouds = config.clouds.enabled.then(|| {
            let shell = CloudShell::new(config.planet.center(), config.planet.bottom_radius_km, &config.clouds);
            CloudRaymarcher::new(
                DensityField::new(resources.cloud_noise, &config.clouds),
                &config.clouds,
                resources.atmosphere,
                shell,
                sun,
            )
        });

        Self {
            config,
            atmosphere: resources.atmosphere,
            terrain: resources.terrain,
            shadow_map: resources.shadow_map,
            clouds,
            statistics,
            sun,
        }
    }

    pub fn sun(&self) -> &SunInfo {
        &self.sun
    }

    /// Shade texel `coord` (column, row, face) and record its statistics.
    ///
    /// `None` outside the cubemap.
    pub fn shade(&self, coord: UVec3) -> Option<ShadedTexel> {
        let resolution = self.config.resolution;
        let view = texel_direction(coord, resolution)?;

        let terrain = self.terrain.and_then(|t| t.sample(view));
        let (color, direct_sun) = match terrain {
            Some(sample) => (self.shade_terrain(sample), false),
            None => self.shade_sky(view),
        };

        let stats = &self.config.statistics;
        if direct_sun {
            let weight = texel_solid_angle(coord.x, coord.y, resolution);
            self.statistics.sun.add(color * weight, stats.sun_fixed_point_scale);
        } else if stats.is_sky_sample(coord.x, coord.y) {
            self.statistics.sky.add(color, stats.sky_fixed_point_scale);
        }

        Some(ShadedTexel {
            color: color.extend(1.0),
            direct_sun,
        })
    }

    /// Sky, ground sphere and clouds along `view` from the sky camera.
    /// Returns the tinted colour and whether the solar disk contributed.
    fn shade_sky(&self, view: Vec3) -> (Vec3, bool) {
        let planet = &self.config.planet;
        let camera = planet.sky_camera();
        let center = planet.center();
        let sun_dir = self.sun.direction;

        let sky = self.atmosphere.sky_radiance(camera, view, sun_dir);
        let view_ray = Ray::new(camera, view);

        let (clear, sun_disk) = match view_ray.intersect_sphere(center, planet.bottom_radius_km) {
            Some(t) => {
                let to_ground = self.atmosphere.sky_radiance_to_point(camera, view_ray.at(t), sun_dir);
                let ground = Vec3::from(self.config.lighting.ground_radiance);
                (ground * to_ground.transmittance + to_ground.radiance, Vec3::ZERO)
            }
            None => {
                let disk = sky.transmittance * self.sun.radiance * sun_disk_coverage(view, &self.sun);
                (sky.radiance + disk, disk)
            }
        };

        let mut color = clear;
        if let Some(clouds) = &self.clouds {
            let up = (camera - center).normalize();
            if up.dot(view) > self.config.clouds.grazing_cutoff {
                if let Some(span) = clouds.shell().span(&view_ray) {
                    let cloud = clouds.march(&view_ray, span);
                    if let Some(point) = cloud.first_visible_point {
                        let to_cloud = self.atmosphere.sky_radiance_to_point(camera, point, sun_dir);
                        let cloud_color = cloud.scattered_radiance * to_cloud.transmittance + to_cloud.radiance;
                        color = cloud_color.lerp(clear, cloud.transmittance);
                    }
                }
            }
        }

        (color * self.sun.tint(), sun_disk.max_element() > 0.0)
    }

    /// Lambertian ground with shadow and ambient occlusion, seen from the
    /// terrain origin.
    fn shade_terrain(&self, sample: TerrainSample) -> Vec3 {
        let origin = self.config.planet.terrain_origin();
        let point = origin + sample.position;
        let sun_dir = self.sun.direction;

        let visibility = self
            .shadow_map
            .map_or(1.0, |map| map.visibility(sample.position, self.config.shadow_bias));
        let sample = sample.with_shadow(visibility);

        let irradiance = self.atmosphere.irradiance(point, sample.normal, sun_dir);
        let n_dot_l = sample.normal.dot(sun_dir).max(0.0);
        let ground = sample.albedo
            * (irradiance.sun * (n_dot_l * sample.in_shadow) + irradiance.sky * sample.ambient_occlusion)
            / PI;

        let aerial = self.atmosphere.sky_radiance_to_point(origin, point, sun_dir);
        (ground * aerial.transmittance + aerial.radiance * 0.5) * self.sun.tint()
    }
}

/// Fraction of the solar disk's brightness at `view`: 1 inside the disk,
/// falling off sharply at its rim, 0 outside.
pub fn sun_disk_coverage(view: Vec3, sun: &SunInfo) -> f32 {
    let cos_radius = sun.angular_radius.cos();
    let span = 1.0 - cos_radius;
    if span <= 0.0 {
        return 0.0;
    }
    let edge = ((view.dot(sun.direction) - cos_radius) / span).clamp(0.0, 1.0);
    1.0 - (1.0 - edge).powi(10)
}
