//! Sky scattering interface, lighting state and configuration.
//!
//! The probe kernel treats the physical sky as an external service with
//! three pure queries, expressed by [`AtmosphereService`]. A precomputed
//! lookup-table model is the intended backend; [`analytic`] ships a brute
//! force single-scattering integrator that honours the same contract so the
//! kernel can run without one.

pub mod analytic;
pub mod color_ramp;
pub mod config;
pub mod sun;

pub use analytic::SingleScatteringAtmosphere;
pub use color_ramp::ColorRamp;
pub use config::{CloudConfig, LightingConfig, PlanetConfig};
pub use sun::{compute_sun_direction, SunInfo};

use crate::core::types::Vec3;

/// Radiance along a ray segment together with the segment's transmittance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RadianceSample {
    pub radiance: Vec3,
    pub transmittance: Vec3,
}

impl RadianceSample {
    /// Empty segment: nothing scattered, everything transmitted.
    pub const EMPTY: Self = Self {
        radiance: Vec3::ZERO,
        transmittance: Vec3::ONE,
    };
}

/// Irradiance reaching a surface point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Irradiance {
    /// Solar irradiance at normal incidence, already multiplied by the
    /// transmittance from the point to the top of the atmosphere along the
    /// sun direction. Zero when the planet blocks the sun. Callers apply their
    /// own cosine term.
    pub sun: Vec3,
    /// Irradiance from the sky dome onto the surface.
    pub sky: Vec3,
}

/// The three sky queries consumed by the probe kernel.
///
/// All positions are in the planet frame in kilometres; directions are unit
/// vectors. Implementations must be pure: identical inputs give identical
/// outputs, and calls may come from many threads at once.
pub trait AtmosphereService: Send + Sync {
    /// Sky radiance seen from `camera` along `view`, plus the transmittance of
    /// that view ray (used to dim the solar disk).
    fn sky_radiance(&self, camera: Vec3, view: Vec3, sun_direction: Vec3) -> RadianceSample;

    /// Sun and sky irradiance at `point` on a surface with `normal`.
    ///
    /// [`Irradiance::sun`] carries the sun transmittance: while the planet does
    /// not block the sun, it equals the solar irradiance times the
    /// `transmittance` that [`sky_radiance`] would report from `point` along
    /// `sun_direction`. Lit surfaces therefore need this
    /// query and [`sky_radiance_to_point`] only, with no separate sun-ray
    /// lookup.
    ///
    /// [`sky_radiance`]: AtmosphereService::sky_radiance
    /// [`sky_radiance_to_point`]: AtmosphereService::sky_radiance_to_point
    fn irradiance(&self, point: Vec3, normal: Vec3, sun_direction: Vec3) -> Irradiance;

    /// In-scattered radiance and transmittance between `camera` and `point`
    /// (aerial perspective).
    fn sky_radiance_to_point(&self, camera: Vec3, point: Vec3, sun_direction: Vec3) -> RadianceSample;
}
