//! 5×5 percentage-closer filtering.

use crate::core::types::{IVec2, Vec2};
use crate::shadow::ShadowMap;

/// Texel offsets of the 25 filter taps, row-major over [-2, 2]².
pub const PCF_KERNEL: [IVec2; 25] = {
    let mut taps = [IVec2::ZERO; 25];
    let mut i = 0;
    while i < 25 {
        taps[i] = IVec2::new((i % 5) as i32 - 2, (i / 5) as i32 - 2);
        i += 1;
    }
    taps
};

/// Mean of the 25 bilinear gather-compare taps around `uv` against the
/// reference depth `z`.
pub fn filter(map: &ShadowMap, uv: Vec2, z: f32) -> f32 {
    let size = Vec2::new(map.width() as f32, map.height() as f32);
    let centre = uv * size - Vec2::splat(0.5);
    let base = centre.floor();
    let frac = centre - base;
    let base = base.as_ivec2();

    let mut sum = 0.0;
    for offset in PCF_KERNEL {
        sum += gather_compare(map, base + offset, frac, z);
    }
    (sum / PCF_KERNEL.len() as f32).clamp(0.0, 1.0)
}

/// Compare the 2×2 footprint at `texel` and blend by `frac`.
#[inline]
fn gather_compare(map: &ShadowMap, texel: IVec2, frac: Vec2, z: f32) -> f32 {
    let lit = |x: i32, y: i32| if z <= map.texel(x, y) { 1.0 } else { 0.0 };
    let c00 = lit(texel.x, texel.y);
    let c10 = lit(texel.x + 1, texel.y);
    let c01 = lit(texel.x, texel.y + 1);
    let c11 = lit(texel.x + 1, texel.y + 1);

    let top = lerp(c00, c10, frac.x);
    let bottom = lerp(c01, c11, frac.x);
    lerp(top, bottom, frac.y)
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
