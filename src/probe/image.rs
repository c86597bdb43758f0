//! Six-face float probe image.

use std::path::Path;

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};

use crate::core::types::{Result, UVec3, Vec4};
use crate::core::Error;
use crate::math::cubemap::CubeFace;

/// Linear RGBA radiance, `resolution × resolution` texels per face, faces in
/// texture-array order.
#[derive(Clone, Debug)]
pub struct ProbeImage {
    resolution: u32,
    texels: Vec<Vec4>,
}

impl ProbeImage {
    /// Zero-filled image.
    pub fn new(resolution: u32) -> Result<Self> {
        if resolution == 0 {
            return Err(Error::Config("probe image resolution must be non-zero".into()));
        }
        Ok(Self {
            resolution,
            texels: vec![Vec4::ZERO; Self::face_len(resolution) * 6],
        })
    }

    #[inline]
    fn face_len(resolution: u32) -> usize {
        (resolution as usize).pow(2)
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Texel at `(column, row, face)`.
    pub fn texel(&self, coord: UVec3) -> Option<Vec4> {
        let res = self.resolution;
        if coord.x >= res || coord.y >= res || coord.z >= 6 {
            return None;
        }
        Some(self.texels[((coord.z * res + coord.y) * res + coord.x) as usize])
    }

    /// All texels of one face, row-major.
    pub fn face(&self, face: CubeFace) -> &[Vec4] {
        let len = Self::face_len(self.resolution);
        let start = face as usize * len;
        &self.texels[start..start + len]
    }

    pub fn texels(&self) -> &[Vec4] {
        &self.texels
    }

    pub(crate) fn texels_mut(&mut self) -> &mut [Vec4] {
        &mut self.texels
    }

    /// Encode one face as an 8-bit PNG: scaled by `exposure`, clamped, gamma
    /// corrected.
    pub fn encode_face_png(&self, face: CubeFace, exposure: f32) -> Result<Vec<u8>> {
        let mut rgba8 = Vec::with_capacity(Self::face_len(self.resolution) * 4);
        for texel in self.face(face) {
            let c = *texel * exposure;
            for channel in [c.x, c.y, c.z] {
                let mapped = channel.clamp(0.0, 1.0).powf(1.0 / 2.2);
                rgba8.push((mapped * 255.0) as u8);
            }
            rgba8.push((texel.w.clamp(0.0, 1.0) * 255.0) as u8);
        }

        let mut png = Vec::new();
        PngEncoder::new(&mut png).write_image(
            &rgba8,
            self.resolution,
            self.resolution,
            ExtendedColorType::Rgba8,
        )?;
        Ok(png)
    }

    /// Write one face to `path` as PNG.
    pub fn save_face_png(&self, face: CubeFace, exposure: f32, path: impl AsRef<Path>) -> Result<()> {
        let png = self.encode_face_png(face, exposure)?;
        std::fs::write(path, png)?;
        Ok(())
    }
}
