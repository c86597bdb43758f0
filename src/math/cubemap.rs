//! Cubemap texel <-> world direction mapping.
//!
//! Grid coordinates are `(column, row, face)` over a square face of
//! `resolution` texels. Directions come out in the world's Z-up frame.

use crate::core::types::{UVec3, Vec3};

/// The six faces of the probe cubemap, in texture-array order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CubeFace {
    /// +X face
    PosX = 0,
    /// −X face
    NegX = 1,
    /// +Y face (cube space, before the Z-up rotation)
    PosY = 2,
    /// −Y face
    NegY = 3,
    /// +Z face
    PosZ = 4,
    /// −Z face
    NegZ = 5,
}

impl CubeFace {
    /// All six faces in texture-array order.
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PosX,
        CubeFace::NegX,
        CubeFace::PosY,
        CubeFace::NegY,
        CubeFace::PosZ,
        CubeFace::NegZ,
    ];

    /// Face for an array layer index, `None` past the sixth layer.
    pub fn from_index(index: u32) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    /// Unnormalized cube-space direction for signed texel offsets `(u, v)`
    /// from the face centre, with `half` the half face size in texels.
    #[inline]
    fn basis(self, u: f32, v: f32, half: f32) -> Vec3 {
        match self {
            CubeFace::PosX => Vec3::new(half, -v, -u),
            CubeFace::NegX => Vec3::new(-half, -v, u),
            CubeFace::PosY => Vec3::new(u, half, v),
            CubeFace::NegY => Vec3::new(u, -half, -v),
            CubeFace::PosZ => Vec3::new(u, -v, half),
            CubeFace::NegZ => Vec3::new(-u, -v, -half),
        }
    }
}

/// Rotate a cube-space (Y-up) vector into the world's Z-up frame.
#[inline]
fn cube_to_world(d: Vec3) -> Vec3 {
    Vec3::new(d.x, -d.z, d.y)
}

/// Inverse of [`cube_to_world`].
#[inline]
fn world_to_cube(d: Vec3) -> Vec3 {
    Vec3::new(d.x, d.z, -d.y)
}

/// World direction through the centre of texel `coord`.
///
/// Returns `None` for coordinates outside the cubemap; dispatch grids are
/// rounded up to whole workgroups, so those cells simply produce nothing.
pub fn texel_direction(coord: UVec3, resolution: u32) -> Option<Vec3> {
    if coord.x >= resolution || coord.y >= resolution {
        return None;
    }
    let face = CubeFace::from_index(coord.z)?;

    let half = resolution as f32 * 0.5;
    let u = coord.x as f32 + 0.5 - half;
    let v = coord.y as f32 + 0.5 - half;

    Some(cube_to_world(face.basis(u, v, half).normalize()))
}

/// Texel whose footprint contains the world direction `dir`.
///
/// Exact inverse of [`texel_direction`] for texel centres. `dir` need not be
/// normalized but must be non-zero.
pub fn direction_to_texel(dir: Vec3, resolution: u32) -> UVec3 {
    let d = world_to_cube(dir);
    let a = d.abs();
    let half = resolution as f32 * 0.5;

    let (face, u, v) = if a.x >= a.y && a.x >= a.z {
        let s = half / a.x;
        if d.x > 0.0 {
            (CubeFace::PosX, -d.z * s, -d.y * s)
        } else {
            (CubeFace::NegX, d.z * s, -d.y * s)
        }
    } else if a.y >= a.z {
        let s = half / a.y;
        if d.y > 0.0 {
            (CubeFace::PosY, d.x * s, d.z * s)
        } else {
            (CubeFace::NegY, d.x * s, -d.z * s)
        }
    } else {
        let s = half / a.z;
        if d.z > 0.0 {
            (CubeFace::PosZ, d.x * s, -d.y * s)
        } else {
            (CubeFace::NegZ, -d.x * s, -d.y * s)
        }
    };

    let last = resolution.saturating_sub(1) as f32;
    let x = (u + half).floor().clamp(0.0, last) as u32;
    let y = (v + half).floor().clamp(0.0, last) as u32;
    UVec3::new(x, y, face as u32)
}

/// Solid angle (steradians) subtended by texel `(x, y)` of any face.
///
/// Uses the texel centre's offset from the face centre to undo the cube
/// projection's stretching towards the face corners.
pub fn texel_solid_angle(x: u32, y: u32, resolution: u32) -> f32 {
    let inv = 1.0 / resolution as f32;
    let u = 2.0 * (x as f32 + 0.5) * inv - 1.0;
    let v = 2.0 * (y as f32 + 0.5) * inv - 1.0;
    let du = 2.0 * inv;
    du * du / (1.0 + u * u + v * v).powf(1.5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directions_are_unit_length() {
        let res = 16;
        for face in 0..6 {
            for y in 0..res {
                for x in 0..res {
                    let d = texel_direction(UVec3::new(x, y, face), res).unwrap();
                    assert!((d.length() - 1.0).abs() < 1e-5, "face {face} ({x},{y}) -> {d:?}");
                }
            }
        }
    }

    #[test]
    fn test_out_of_range_is_skipped() {
        assert!(texel_direction(UVec3::new(8, 0, 0), 8).is_none());
        assert!(texel_direction(UVec3::new(0, 8, 0), 8).is_none());
        assert!(texel_direction(UVec3::new(0, 0, 6), 8).is_none());
        assert!(texel_direction(UVec3::new(7, 7, 5), 8).is_some());
    }

    #[test]
    fn test_face_centres_follow_z_up() {
        // Texel (res/2, res/2) sits half a texel off-centre; use a large res
        let res = 1024;
        let c = res / 2;
        let expect = [
            (0, Vec3::X),
            (1, Vec3::NEG_X),
            (2, Vec3::Z),     // cube +Y is world up
            (3, Vec3::NEG_Z),
            (4, Vec3::NEG_Y), // cube +Z maps to world -Y
            (5, Vec3::Y),
        ];
        for (face, axis) in expect {
            let d = texel_direction(UVec3::new(c, c, face), res).unwrap();
            assert!(d.dot(axis) > 0.999, "face {face}: {d:?} not along {axis:?}");
        }
    }

    #[test]
    fn test_inverse_recovers_texel() {
        let res = 32;
        for face in 0..6 {
            for y in (0..res).step_by(3) {
                for x in (0..res).step_by(5) {
                    let coord = UVec3::new(x, y, face);
                    let d = texel_direction(coord, res).unwrap();
                    assert_eq!(direction_to_texel(d, res), coord);
                }
            }
        }
    }

    #[test]
    fn test_solid_angles_cover_sphere() {
        let res = 64;
        let mut total = 0.0_f64;
        for y in 0..res {
            for x in 0..res {
                total += texel_solid_angle(x, y, res) as f64;
            }
        }
        total *= 6.0;
        let four_pi = 4.0 * std::f64::consts::PI;
        assert!((total - four_pi).abs() / four_pi < 1e-3, "total = {total}");
    }

    #[test]
    fn test_solid_angle_shrinks_towards_corners() {
        let res = 64;
        assert!(texel_solid_angle(0, 0, res) < texel_solid_angle(res / 2, res / 2, res));
    }
}
