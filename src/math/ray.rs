//! Ray type and sphere intersection

use crate::core::types::Vec3;

/// Raw sentinel distance for "no intersection".
///
/// [`Ray::intersect_sphere`] reports misses as `None`; this constant is only
/// for callers that pack the result into a plain float.
pub const NO_HIT: f32 = -1.0;

/// A ray defined by origin and direction
///
/// Origins live in the planet frame (kilometres); the direction must be unit
/// length.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray (direction should be normalized)
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Get point along ray at parameter t
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Distance to the nearest sphere intersection at or in front of the origin.
    ///
    /// Returns `None` when the ray misses the sphere or both roots lie behind
    /// the origin. An origin inside the sphere yields the exit distance.
    ///
    /// The root is picked through the sign of the linear coefficient so that
    /// grazing rays do not subtract two nearly equal numbers.
    pub fn intersect_sphere(&self, center: Vec3, radius: f32) -> Option<f32> {
        let (t0, t1) = self.sphere_roots(center, radius)?;
        if t0 >= 0.0 {
            Some(t0)
        } else if t1 >= 0.0 {
            Some(t1)
        } else {
            None
        }
    }

    /// Both signed roots `(near, far)` of the ray/sphere quadratic, or `None`
    /// when the supporting line misses the sphere.
    pub fn sphere_roots(&self, center: Vec3, radius: f32) -> Option<(f32, f32)> {
        let oc = self.origin - center;
        let b = self.direction.dot(oc);
        let c = oc.length_squared() - radius * radius;
        let disc = b * b - c;
        if disc < 0.0 {
            return None;
        }

        let q = -(b + b.signum() * disc.sqrt());
        if q == 0.0 {
            // b == 0 and disc == 0: origin on the sphere, tangent ray
            return Some((0.0, 0.0));
        }
        let r0 = q;
        let r1 = c / q;
        Some((r0.min(r1), r0.max(r1)))
    }

    /// [`intersect_sphere`](Self::intersect_sphere) with misses flattened to [`NO_HIT`].
    #[inline]
    pub fn intersect_sphere_or_sentinel(&self, center: Vec3, radius: f32) -> f32 {
        self.intersect_sphere(center, radius).unwrap_or(NO_HIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        assert_eq!(ray.at(5.0), Vec3::new(5.0, 0.0, 0.0));
    }

    #[test]
    fn test_hit_toward_center() {
        let center = Vec3::new(1.0, 2.0, 3.0);
        let origin = Vec3::new(1.0, 2.0, 13.0);
        let ray = Ray::new(origin, Vec3::NEG_Z);
        let t = ray.intersect_sphere(center, 4.0).unwrap();
        let expected = (origin - center).length() - 4.0;
        assert!((t - expected).abs() < 1e-5, "t = {t}, expected {expected}");
    }

    #[test]
    fn test_hit_toward_center_planet_scale() {
        let center = Vec3::new(0.0, 0.0, -6360.0);
        let origin = Vec3::new(0.0, 0.0, 0.5);
        let ray = Ray::new(origin, Vec3::NEG_Z);
        let t = ray.intersect_sphere(center, 6360.0).unwrap();
        assert!((t - 0.5).abs() < 1e-3, "t = {t}");
    }

    #[test]
    fn test_miss_pointing_away() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::Z);
        assert!(ray.intersect_sphere(Vec3::ZERO, 2.0).is_none());
        assert_eq!(ray.intersect_sphere_or_sentinel(Vec3::ZERO, 2.0), NO_HIT);
    }

    #[test]
    fn test_miss_offset() {
        let ray = Ray::new(Vec3::new(5.0, 0.0, 10.0), Vec3::NEG_Z);
        assert!(ray.intersect_sphere(Vec3::ZERO, 2.0).is_none());
    }

    #[test]
    fn test_inside_returns_exit() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let t = ray.intersect_sphere(Vec3::ZERO, 3.0).unwrap();
        assert!((t - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_grazing_ray_is_stable() {
        // Horizontal ray from just above a planet-sized sphere
        let center = Vec3::new(0.0, 0.0, -6360.0);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 0.2), Vec3::X);
        let t = ray.intersect_sphere(center, 6361.5).unwrap();
        // Exit of the 1.5 km shell: sqrt(R^2 - r^2) with r = 6360.2
        let expected = (6361.5_f64.powi(2) - 6360.2_f64.powi(2)).sqrt() as f32;
        assert!((t - expected).abs() / expected < 1e-3, "t = {t}, expected {expected}");
    }
}
