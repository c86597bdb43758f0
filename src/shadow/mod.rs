//! Terrain shadowing from a sun shadow map.

pub mod pcf;

pub use pcf::PCF_KERNEL;

use crate::core::types::{Mat4, Result, Vec2, Vec3};
use crate::core::Error;

/// Depth map rendered from the sun, plus the matrix that produced it.
///
/// Depths are post-projection `z` in [0, 1], row-major with row 0 at the top
/// of the map (`uv.y == 0`).
#[derive(Clone, Debug)]
pub struct ShadowMap {
    width: u32,
    height: u32,
    depth: Vec<f32>,
    view_proj: Mat4,
}

impl ShadowMap {
    pub fn new(width: u32, height: u32, depth: Vec<f32>, view_proj: Mat4) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::ShadowMap(format!("empty shadow map {width}x{height}")));
        }
        let expected = width as usize * height as usize;
        if depth.len() != expected {
            return Err(Error::ShadowMap(format!(
                "expected {expected} depth texels for {width}x{height}, got {}",
                depth.len()
            )));
        }
        Ok(Self {
            width,
            height,
            depth,
            view_proj,
        })
    }

    /// Map with every texel at `depth`.
    pub fn filled(width: u32, height: u32, depth: f32, view_proj: Mat4) -> Result<Self> {
        Self::new(width, height, vec![depth; width as usize * height as usize], view_proj)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn view_proj(&self) -> Mat4 {
        self.view_proj
    }

    /// Depth with clamp-to-edge addressing.
    #[inline]
    pub fn texel(&self, x: i32, y: i32) -> f32 {
        let x = x.clamp(0, self.width as i32 - 1) as usize;
        let y = y.clamp(0, self.height as i32 - 1) as usize;
        self.depth[y * self.width as usize + x]
    }

    /// Project `point` into shadow map space: `(uv, depth)`.
    ///
    /// `None` when the point is behind the light's projection.
    pub fn project(&self, point: Vec3) -> Option<(Vec2, f32)> {
        let clip = self.view_proj * point.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        let uv = Vec2::new(ndc.x * 0.5 + 0.5, -ndc.y * 0.5 + 0.5);
        Some((uv, ndc.z))
    }

    /// Fraction of the sun visible from `point`, in [0, 1].
    ///
    /// Points outside the shadow frustum are treated as lit.
    pub fn visibility(&self, point: Vec3, bias: f32) -> f32 {
        let Some((uv, z)) = self.project(point) else {
            return 1.0;
        };
        let inside = (0.0..=1.0).contains(&uv.x)
            && (0.0..=1.0).contains(&uv.y)
            && (0.0..=1.0).contains(&z);
        if !inside {
            return 1.0;
        }
        pcf::filter(self, uv, z - bias)
    }
}
