//! Sun position and per-frame sun description.

use std::f32::consts::PI;

use crate::core::types::Vec3;

/// Immutable sun description shared by every texel of a dispatch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SunInfo {
    /// Unit vector towards the sun, world frame (Z up).
    pub direction: Vec3,
    /// Linear RGB tint of the light.
    pub color: Vec3,
    /// Radiance of the solar disk at the top of the atmosphere.
    pub radiance: Vec3,
    /// Scalar multiplier on top of `color`.
    pub intensity: f32,
    /// Angular radius of the solar disk, radians.
    pub angular_radius: f32,
}

impl SunInfo {
    /// Build from raw lighting terms. `direction` is normalized here.
    pub fn new(
        direction: Vec3,
        color: Vec3,
        intensity: f32,
        solar_irradiance: Vec3,
        angular_radius: f32,
    ) -> Self {
        Self {
            direction: direction.try_normalize().unwrap_or(Vec3::Z),
            color,
            radiance: solar_radiance(solar_irradiance, angular_radius),
            intensity,
            angular_radius,
        }
    }

    /// Final multiplier applied to every shaded sample.
    #[inline]
    pub fn tint(&self) -> Vec3 {
        self.color * self.intensity
    }
}

/// Disk radiance for a uniformly bright sun of the given angular radius.
pub fn solar_radiance(solar_irradiance: Vec3, angular_radius: f32) -> Vec3 {
    let solid_angle = PI * angular_radius * angular_radius;
    if solid_angle <= 0.0 {
        return Vec3::ZERO;
    }
    solar_irradiance / solid_angle
}

/// Sun direction (Z up) for an hour of the day.
///
/// The sun follows a sinusoidal arc: it rises at 6:00, is overhead at noon,
/// sets at 18:00 and stays below the horizon through the night. Its azimuth
/// turns a full circle over 24 hours, due +Y at noon.
pub fn compute_sun_direction(hour: f32) -> Vec3 {
    let hour_angle = (hour - 12.0) * 15.0_f32.to_radians();
    let day_angle = (hour - 6.0) * PI / 12.0;
    let altitude = (day_angle.sin() * 90.0_f32).to_radians();

    Vec3::new(
        hour_angle.sin() * altitude.cos(),
        hour_angle.cos() * altitude.cos(),
        altitude.sin(),
    )
    .normalize()
}
