//! Brute-force single-scattering atmosphere.
//!
//! Integrates Rayleigh, Mie and ozone along each query ray instead of
//! reading precomputed tables. Orders of magnitude slower than a table
//! lookup, but it fulfils [`AtmosphereService`] exactly and needs no assets,
//! which makes it the default backend for tests, benches and previews.
//!
//! Positions must lie inside the atmosphere shell.

use std::f32::consts::PI;

use crate::atmosphere::{AtmosphereService, Irradiance, RadianceSample};
use crate::clouds::phase;
use crate::core::types::Vec3;
use crate::math::Ray;

/// Earth-like atmosphere in kilometres.
#[derive(Clone, Debug)]
pub struct SingleScatteringAtmosphere {
    /// Planet centre in the planet frame.
    pub center: Vec3,
    /// Ground radius.
    pub bottom_radius: f32,
    /// Radius of the top of the atmosphere.
    pub top_radius: f32,
    /// Rayleigh scattering at sea level, per km.
    pub rayleigh_scattering: Vec3,
    pub rayleigh_scale_height: f32,
    /// Mie scattering at sea level, per km.
    pub mie_scattering: Vec3,
    /// Mie extinction at sea level, per km.
    pub mie_extinction: Vec3,
    pub mie_scale_height: f32,
    /// Mie phase asymmetry.
    pub mie_g: f32,
    /// Ozone absorption at the peak of the ozone layer, per km.
    pub ozone_absorption: Vec3,
    /// Solar irradiance at the top of the atmosphere.
    pub solar_irradiance: Vec3,
    /// Samples along every view ray.
    pub view_samples: u32,
    /// Samples along every sun ray.
    pub light_samples: u32,
}

impl Default for SingleScatteringAtmosphere {
    fn default() -> Self {
        Self::earth(6360.0, Vec3::new(1.474, 1.8504, 1.91198))
    }
}

impl SingleScatteringAtmosphere {
    /// Earth-like coefficients around a planet of `bottom_radius` km whose
    /// ground is directly below the frame origin.
    pub fn earth(bottom_radius: f32, solar_irradiance: Vec3) -> Self {
        let mie = Vec3::splat(3.996e-3);
        Self {
            center: Vec3::new(0.0, 0.0, -bottom_radius),
            bottom_radius,
            top_radius: bottom_radius + 60.0,
            rayleigh_scattering: Vec3::new(5.802e-3, 13.558e-3, 33.1e-3),
            rayleigh_scale_height: 8.0,
            mie_scattering: mie,
            mie_extinction: mie * 1.1,
            mie_scale_height: 1.2,
            mie_g: 0.8,
            ozone_absorption: Vec3::new(0.65e-3, 1.881e-3, 0.085e-3),
            solar_irradiance,
            view_samples: 16,
            light_samples: 8,
        }
    }

    fn altitude(&self, p: Vec3) -> f32 {
        (p - self.center).length() - self.bottom_radius
    }

    /// Relative (rayleigh, mie, ozone) densities at altitude `h`.
    fn densities(&self, h: f32) -> Vec3 {
        let h = h.max(0.0);
        Vec3::new(
            (-h / self.rayleigh_scale_height).exp(),
            (-h / self.mie_scale_height).exp(),
            // Ozone: tent 30 km wide centred at 25 km
            (1.0 - (h - 25.0).abs() / 15.0).max(0.0),
        )
    }

    fn extinction(&self, d: Vec3) -> Vec3 {
        self.rayleigh_scattering * d.x + self.mie_extinction * d.y + self.ozone_absorption * d.z
    }

    /// Distance along `dir` from `origin` to the ground, or to the top of the
    /// atmosphere when the ray misses the ground.
    fn distance_to_boundary(&self, origin: Vec3, dir: Vec3) -> (f32, bool) {
        let ray = Ray::new(origin, dir);
        // Only rays heading below the local horizon can reach the ground
        if dir.dot(origin - self.center) < 0.0 {
            if let Some(t) = ray.intersect_sphere(self.center, self.bottom_radius) {
                return (t, true);
            }
        }
        (ray.intersect_sphere(self.center, self.top_radius).unwrap_or(0.0), false)
    }

    fn optical_depth(&self, origin: Vec3, dir: Vec3, length: f32) -> Vec3 {
        let n = self.light_samples.max(1);
        let step = length / n as f32;
        (0..n).fold(Vec3::ZERO, |acc, i| {
            let p = origin + dir * ((i as f32 + 0.5) * step);
            acc + self.extinction(self.densities(self.altitude(p))) * step
        })
    }

    /// Transmittance from `p` to the sun, zero when the ground is in the way.
    fn sun_transmittance(&self, p: Vec3, sun_direction: Vec3) -> Vec3 {
        let (length, hits_ground) = self.distance_to_boundary(p, sun_direction);
        if hits_ground {
            return Vec3::ZERO;
        }
        (-self.optical_depth(p, sun_direction, length)).exp()
    }

    /// Single scattering along `[origin, origin + dir * length]`.
    fn integrate(&self, origin: Vec3, dir: Vec3, length: f32, sun_direction: Vec3) -> RadianceSample {
        if length <= 0.0 {
            return RadianceSample::EMPTY;
        }

        let n = self.view_samples.max(1);
        let step = length / n as f32;
        let cos_theta = dir.dot(sun_direction);

        let mut optical_depth = Vec3::ZERO;
        let mut rayleigh = Vec3::ZERO;
        let mut mie = Vec3::ZERO;

        for i in 0..n {
            let p = origin + dir * ((i as f32 + 0.5) * step);
            let d = self.densities(self.altitude(p));
            let segment = self.extinction(d) * step;

            let view_t = (-(optical_depth + segment * 0.5)).exp();
            let light_t = self.sun_transmittance(p, sun_direction);
            let t = view_t * light_t * step;

            rayleigh += t * d.x;
            mie += t * d.y;
            optical_depth += segment;
        }

        let scattered = rayleigh * self.rayleigh_scattering * phase::rayleigh(cos_theta)
            + mie * self.mie_scattering * phase::henyey_greenstein(cos_theta, self.mie_g);

        RadianceSample {
            radiance: scattered * self.solar_irradiance,
            transmittance: (-optical_depth).exp(),
        }
    }
}

impl AtmosphereService for SingleScatteringAtmosphere {
    fn sky_radiance(&self, camera: Vec3, view: Vec3, sun_direction: Vec3) -> RadianceSample {
        let (length, _) = self.distance_to_boundary(camera, view);
        self.integrate(camera, view, length, sun_direction)
    }

    fn irradiance(&self, point: Vec3, normal: Vec3, sun_direction: Vec3) -> Irradiance {
        let up = (point - self.center).normalize();
        let sun = self.solar_irradiance * self.sun_transmittance(point, sun_direction);

        // Sky dome approximated by its zenith radiance, scaled by the visible
        // fraction of the dome for a tilted surface.
        let (length, _) = self.distance_to_boundary(point, up);
        let zenith = self.integrate(point, up, length, sun_direction).radiance;
        let visible = 0.5 * (1.0 + normal.dot(up));

        Irradiance {
            sun,
            sky: zenith * PI * visible,
        }
    }

    fn sky_radiance_to_point(&self, camera: Vec3, point: Vec3, sun_direction: Vec3) -> RadianceSample {
        let delta = point - camera;
        let length = delta.length();
        if length <= 0.0 {
            return RadianceSample::EMPTY;
        }
        self.integrate(camera, delta / length, length, sun_direction)
    }
}
