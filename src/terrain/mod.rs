//! Terrain buffer interface.
//!
//! A separate terrain pass renders the ground around the probe; the probe
//! kernel only reads its per-direction result through [`TerrainBuffer`].

pub mod gbuffer;

pub use gbuffer::{TerrainGBuffer, TerrainTexel};

use crate::core::types::Vec3;

/// Ground seen along one probe direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TerrainSample {
    /// Linear albedo (the buffer stores its square root).
    pub albedo: Vec3,
    /// Hit position relative to the terrain origin, kilometres.
    pub position: Vec3,
    /// Unit surface normal.
    pub normal: Vec3,
    pub ambient_occlusion: f32,
    /// Fraction of the sun visible from the hit, in [0, 1].
    pub in_shadow: f32,
}

impl TerrainSample {
    /// Copy with the shadow term replaced (clamped to [0, 1]).
    pub fn with_shadow(self, visibility: f32) -> Self {
        Self {
            in_shadow: visibility.clamp(0.0, 1.0),
            ..self
        }
    }
}

/// Per-direction terrain lookup.
pub trait TerrainBuffer: Send + Sync {
    /// Terrain along the unit world `direction`, or `None` where the probe
    /// sees sky. Samples come back fully lit (`in_shadow == 1.0`).
    fn sample(&self, direction: Vec3) -> Option<TerrainSample>;
}
