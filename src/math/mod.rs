//! Mathematical utilities: rays, sphere intersection, cubemap mapping

pub mod ray;
pub mod cubemap;

pub use ray::{Ray, NO_HIT};
pub use cubemap::{CubeFace, texel_direction, direction_to_texel, texel_solid_angle};
