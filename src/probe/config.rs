//! Probe parameter block.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::atmosphere::{CloudConfig, LightingConfig, PlanetConfig, SunInfo};
use crate::core::types::Result;
use crate::core::Error;

/// Fixed-point scales and sampling pattern of the statistics reduction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatisticsConfig {
    /// Multiplier applied to solid-angle weighted sun texels before they are
    /// truncated to integers.
    pub sun_fixed_point_scale: f32,
    /// Multiplier applied to sampled sky texels.
    pub sky_fixed_point_scale: f32,
    /// Sky samples are taken every `sky_stride` texels in x and y...
    pub sky_stride: u32,
    /// ...at this offset within the stride.
    pub sky_phase: u32,
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self {
            sun_fixed_point_scale: 1_048_576.0,
            sky_fixed_point_scale: 1024.0,
            sky_stride: 32,
            sky_phase: 16,
        }
    }
}

impl StatisticsConfig {
    /// Whether texel `(x, y)` is a sky statistics sample.
    #[inline]
    pub fn is_sky_sample(&self, x: u32, y: u32) -> bool {
        self.sky_stride > 0 && x % self.sky_stride == self.sky_phase && y % self.sky_stride == self.sky_phase
    }
}

/// Everything one probe dispatch reads besides its collaborators.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Face edge length in texels.
    pub resolution: u32,
    pub planet: PlanetConfig,
    pub lighting: LightingConfig,
    pub clouds: CloudConfig,
    pub statistics: StatisticsConfig,
    /// Depth bias for the terrain shadow test.
    pub shadow_bias: f32,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            resolution: 1024,
            planet: PlanetConfig::default(),
            lighting: LightingConfig::default(),
            clouds: CloudConfig::default(),
            statistics: StatisticsConfig::default(),
            shadow_bias: 0.0005,
        }
    }
}

impl ProbeConfig {
    /// Defaults at a given face resolution.
    pub fn with_resolution(resolution: u32) -> Self {
        Self {
            resolution,
            ..Default::default()
        }
    }

    /// Sun for this probe's lighting state.
    pub fn sun(&self) -> SunInfo {
        self.lighting.sun()
    }

    /// Load from a JSON file. Missing fields take their defaults.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Save as pretty-printed JSON, creating parent directories.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Reject parameter combinations the kernel cannot run with.
    pub fn validate(&self) -> Result<()> {
        if let Some(reason) = self.invalid_reason() {
            log::warn!("Rejecting probe config: {reason}");
            return Err(Error::Config(reason));
        }
        Ok(())
    }

    fn invalid_reason(&self) -> Option<String> {
        let clouds = &self.clouds;
        if self.resolution == 0 {
            return Some("resolution must be non-zero".into());
        }
        if !(self.planet.bottom_radius_km > 0.0) {
            return Some(format!("bottom radius {} must be positive", self.planet.bottom_radius_km));
        }
        if !(self.lighting.sun_angular_radius > 0.0) {
            return Some(format!(
                "sun angular radius {} must be positive",
                self.lighting.sun_angular_radius
            ));
        }
        if clouds.top_altitude_km <= clouds.bottom_altitude_km {
            return Some(format!(
                "cloud top {} km must be above cloud bottom {} km",
                clouds.top_altitude_km, clouds.bottom_altitude_km
            ));
        }
        if !(0.0..1.0).contains(&clouds.density_threshold) {
            return Some(format!("density threshold {} outside [0, 1)", clouds.density_threshold));
        }
        if clouds.coarse_steps == 0 || clouds.fine_steps == 0 || clouds.sun_steps == 0 {
            return Some("cloud step counts must be non-zero".into());
        }
        if self.statistics.sky_stride == 0 {
            return Some("sky statistics stride must be non-zero".into());
        }
        if self.statistics.sky_phase >= self.statistics.sky_stride {
            return Some(format!(
                "sky statistics phase {} must be below stride {}",
                self.statistics.sky_phase, self.statistics.sky_stride
            ));
        }
        None
    }
}
