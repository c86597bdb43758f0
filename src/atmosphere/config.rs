//! Planet, lighting and cloud configuration.

use serde::{Deserialize, Serialize};

use crate::atmosphere::color_ramp::ColorRamp;
use crate::atmosphere::sun::{compute_sun_direction, SunInfo};
use crate::core::types::Vec3;

// ---------------------------------------------------------------------------
// Planet
// ---------------------------------------------------------------------------

/// Planet geometry and camera placement. Distances in kilometres.
///
/// The planet frame is Z up with the ground directly below the origin, so the
/// planet centre sits at `(0, 0, -bottom_radius_km)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanetConfig {
    /// Radius of the idealized ground sphere.
    pub bottom_radius_km: f32,
    /// Camera height above the ground for sky-only texels.
    pub camera_height_km: f32,
    /// Origin of the terrain buffer's coordinate system in the planet frame.
    /// Terrain texels are shaded from here.
    pub terrain_origin_km: [f32; 3],
}

impl Default for PlanetConfig {
    fn default() -> Self {
        Self {
            bottom_radius_km: 6360.0,
            camera_height_km: 0.2,
            terrain_origin_km: [0.0, 0.0, 0.2],
        }
    }
}

impl PlanetConfig {
    /// Planet centre in the planet frame.
    #[inline]
    pub fn center(&self) -> Vec3 {
        Vec3::new(0.0, 0.0, -self.bottom_radius_km)
    }

    /// Camera position for sky-only texels.
    #[inline]
    pub fn sky_camera(&self) -> Vec3 {
        Vec3::new(0.0, 0.0, self.camera_height_km)
    }

    /// Camera position for terrain texels.
    #[inline]
    pub fn terrain_origin(&self) -> Vec3 {
        Vec3::from(self.terrain_origin_km)
    }
}

// ---------------------------------------------------------------------------
// Lighting
// ---------------------------------------------------------------------------

/// Process-wide lighting state the per-frame [`SunInfo`] is derived from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    /// Hour of the day (0-24) driving the sun position and color.
    pub time_of_day: f32,
    /// Sun color keyed by hour.
    pub sun_color_ramp: ColorRamp,
    /// Multiplier on the sun color.
    pub sun_intensity: f32,
    /// Angular radius of the solar disk (radians).
    pub sun_angular_radius: f32,
    /// Solar irradiance at the top of the atmosphere.
    pub solar_irradiance: [f32; 3],
    /// Radiance used for ground the terrain buffer does not cover.
    pub ground_radiance: [f32; 3],
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            time_of_day: 10.0,
            sun_color_ramp: ColorRamp::default(),
            sun_intensity: 1.0,
            sun_angular_radius: 0.004675,
            solar_irradiance: [1.474, 1.8504, 1.91198],
            ground_radiance: [0.03, 0.03, 0.03],
        }
    }
}

impl LightingConfig {
    /// Sun for the configured time of day.
    pub fn sun(&self) -> SunInfo {
        SunInfo::new(
            compute_sun_direction(self.time_of_day),
            self.sun_color_ramp.sample(self.time_of_day),
            self.sun_intensity,
            Vec3::from(self.solar_irradiance),
            self.sun_angular_radius,
        )
    }
}

// ---------------------------------------------------------------------------
// Clouds
// ---------------------------------------------------------------------------

/// Volumetric cloud layer parameters.
///
/// The layer is a spherical shell between `bottom_altitude_km` and
/// `top_altitude_km` above the ground. Extinction and scattering are per
/// kilometre of fully dense cloud.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudConfig {
    /// Whether clouds are raymarched at all.
    pub enabled: bool,
    /// Cloud shell base altitude.
    pub bottom_altitude_km: f32,
    /// Cloud shell top altitude.
    pub top_altitude_km: f32,
    /// Raw density above which a sample counts as cloud material.
    pub density_threshold: f32,
    /// Extinction coefficient.
    pub extinction: f32,
    /// Scattering coefficient.
    pub scattering: f32,
    /// Henyey-Greenstein asymmetry of the sun lobe.
    pub forward_g: f32,
    /// Henyey-Greenstein asymmetry of the ambient lobe.
    pub ambient_g: f32,
    /// Steps of the coarse entry search.
    pub coarse_steps: u32,
    /// Steps of the fine integration.
    pub fine_steps: u32,
    /// Steps of the sun transmittance sub-march at every fine sample.
    pub sun_steps: u32,
    /// Longest distance the sun sub-march covers.
    pub sun_march_max_km: f32,
    /// Horizontal frequency of the coarse noise layer.
    pub coarse_scale: f32,
    /// Horizontal frequency of the detail noise layer.
    pub detail_scale: f32,
    /// Weight of the detail layer around its mid value.
    pub detail_weight: f32,
    /// Horizontal offset of the noise domain (wind drift).
    pub wind_offset: [f32; 2],
    /// Rays whose `dot(up, view)` is at or below this never reach the shell
    /// within a useful distance and skip the raymarch.
    pub grazing_cutoff: f32,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bottom_altitude_km: 1.5,
            top_altitude_km: 4.0,
            density_threshold: 0.67,
            extinction: 40.0,
            scattering: 36.0,
            forward_g: 0.6,
            ambient_g: 0.0,
            coarse_steps: 64,
            fine_steps: 128,
            sun_steps: 32,
            sun_march_max_km: 3.0,
            coarse_scale: 0.02,
            detail_scale: 0.2,
            detail_weight: 0.1,
            wind_offset: [0.0, 0.0],
            grazing_cutoff: -0.02,
        }
    }
}
