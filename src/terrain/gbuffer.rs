//! Cubemap terrain G-buffer.
//!
//! Same layout as the probe itself: `resolution² × 6` texels, looked up by
//! world direction. Each texel packs the terrain pass output:
//! - albedo: square root of linear albedo (cheap gamma)
//! - depth: linear distance along the texel direction, km (0 = sky)
//! - normal: octahedral encoding in [0, 1]²
//! - ambient occlusion

use crate::core::types::{Result, UVec3, Vec2, Vec3};
use crate::core::Error;
use crate::math::cubemap::direction_to_texel;
use crate::terrain::{TerrainBuffer, TerrainSample};

/// One packed terrain texel.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TerrainTexel {
    pub albedo_sqrt: [f32; 3],
    pub depth: f32,
    pub normal_oct: [f32; 2],
    pub ambient_occlusion: f32,
}

impl TerrainTexel {
    /// Pack a hit from linear values.
    pub fn new(albedo: Vec3, depth: f32, normal: Vec3, ambient_occlusion: f32) -> Self {
        let albedo_sqrt = albedo.max(Vec3::ZERO);
        Self {
            albedo_sqrt: [albedo_sqrt.x.sqrt(), albedo_sqrt.y.sqrt(), albedo_sqrt.z.sqrt()],
            depth,
            normal_oct: encode_octahedral(normal).to_array(),
            ambient_occlusion,
        }
    }

    /// Whether the terrain pass hit anything here.
    #[inline]
    pub fn is_hit(&self) -> bool {
        self.depth > 0.0
    }
}

/// Terrain pass output stored per cubemap texel.
#[derive(Clone, Debug)]
pub struct TerrainGBuffer {
    resolution: u32,
    texels: Vec<TerrainTexel>,
}

impl TerrainGBuffer {
    /// All-sky buffer.
    pub fn new(resolution: u32) -> Result<Self> {
        if resolution == 0 {
            return Err(Error::Terrain("resolution must be non-zero".into()));
        }
        let len = (resolution as usize).pow(2) * 6;
        Ok(Self {
            resolution,
            texels: vec![TerrainTexel::default(); len],
        })
    }

    /// Wrap texels laid out face-major, then row, then column.
    pub fn from_texels(resolution: u32, texels: Vec<TerrainTexel>) -> Result<Self> {
        let expected = (resolution as usize).pow(2) * 6;
        if resolution == 0 || texels.len() != expected {
            return Err(Error::Terrain(format!(
                "expected {expected} texels for resolution {resolution}, got {}",
                texels.len()
            )));
        }
        Ok(Self { resolution, texels })
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    fn index(&self, coord: UVec3) -> Option<usize> {
        let res = self.resolution;
        (coord.x < res && coord.y < res && coord.z < 6)
            .then(|| ((coord.z * res + coord.y) * res + coord.x) as usize)
    }

    /// Texel at `coord`, `None` outside the buffer.
    pub fn texel(&self, coord: UVec3) -> Option<&TerrainTexel> {
        self.index(coord).map(|i| &self.texels[i])
    }

    /// Overwrite the texel at `coord`.
    pub fn set(&mut self, coord: UVec3, texel: TerrainTexel) -> Result<()> {
        let i = self
            .index(coord)
            .ok_or_else(|| Error::Terrain(format!("texel {coord} outside the buffer")))?;
        self.texels[i] = texel;
        Ok(())
    }
}

impl TerrainBuffer for TerrainGBuffer {
    fn sample(&self, direction: Vec3) -> Option<TerrainSample> {
        let coord = direction_to_texel(direction, self.resolution);
        let texel = self.texel(coord)?;
        if !texel.is_hit() {
            return None;
        }

        let a = Vec3::from(texel.albedo_sqrt);
        Some(TerrainSample {
            albedo: a * a,
            position: direction.normalize() * texel.depth,
            normal: decode_octahedral(Vec2::from(texel.normal_oct)),
            ambient_occlusion: texel.ambient_occlusion.clamp(0.0, 1.0),
            in_shadow: 1.0,
        })
    }
}

#[inline]
fn sign_not_zero(v: Vec2) -> Vec2 {
    Vec2::new(
        if v.x >= 0.0 { 1.0 } else { -1.0 },
        if v.y >= 0.0 { 1.0 } else { -1.0 },
    )
}

/// Unit vector → octahedral coordinates in [0, 1]².
pub fn encode_octahedral(n: Vec3) -> Vec2 {
    let n = n / (n.x.abs() + n.y.abs() + n.z.abs()).max(1e-8);
    let mut p = n.truncate();
    if n.z < 0.0 {
        p = (Vec2::ONE - Vec2::new(p.y, p.x).abs()) * sign_not_zero(p);
    }
    p * 0.5 + Vec2::splat(0.5)
}

/// Inverse of [`encode_octahedral`].
pub fn decode_octahedral(e: Vec2) -> Vec3 {
    let f = e * 2.0 - Vec2::ONE;
    let mut n = Vec3::new(f.x, f.y, 1.0 - f.x.abs() - f.y.abs());
    let t = (-n.z).max(0.0);
    n.x += if n.x >= 0.0 { -t } else { t };
    n.y += if n.y >= 0.0 { -t } else { t };
    n.normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::cubemap::texel_direction;

    #[test]
    fn test_octahedral_round_trip() {
        let normals = [
            Vec3::Z,
            Vec3::NEG_Z,
            Vec3::new(0.3, -0.4, 0.866).normalize(),
            Vec3::new(-0.7, 0.1, -0.5).normalize(),
            Vec3::X,
        ];
        for n in normals {
            let back = decode_octahedral(encode_octahedral(n));
            assert!((back - n).length() < 1e-4, "{n:?} -> {back:?}");
        }
    }

    #[test]
    fn test_empty_buffer_is_sky() {
        let buffer = TerrainGBuffer::new(8).unwrap();
        assert!(buffer.sample(Vec3::NEG_Z).is_none());
    }

    #[test]
    fn test_rejects_bad_sizes() {
        assert!(TerrainGBuffer::new(0).is_err());
        assert!(TerrainGBuffer::from_texels(2, vec![TerrainTexel::default(); 23]).is_err());
        assert!(TerrainGBuffer::from_texels(2, vec![TerrainTexel::default(); 24]).is_ok());
    }

    #[test]
    fn test_set_out_of_range_fails() {
        let mut buffer = TerrainGBuffer::new(4).unwrap();
        assert!(buffer.set(UVec3::new(4, 0, 0), TerrainTexel::default()).is_err());
        assert!(buffer.set(UVec3::new(0, 0, 6), TerrainTexel::default()).is_err());
    }

    #[test]
    fn test_sample_decodes_hit() {
        let res = 8;
        let mut buffer = TerrainGBuffer::new(res).unwrap();
        let coord = UVec3::new(3, 5, 3);
        let dir = texel_direction(coord, res).unwrap();
        let albedo = Vec3::new(0.25, 0.16, 0.09);
        buffer.set(coord, TerrainTexel::new(albedo, 0.2, Vec3::Z, 0.8)).unwrap();

        let s = buffer.sample(dir).unwrap();
        assert!((s.albedo - albedo).abs().max_element() < 1e-6);
        assert!((s.position - dir * 0.2).length() < 1e-6);
        assert!((s.normal - Vec3::Z).length() < 1e-5);
        assert_eq!(s.ambient_occlusion, 0.8);
        assert_eq!(s.in_shadow, 1.0);
    }
}
