//! Skyprobe - environment probe radiance kernel
//!
//! Shades every direction of a cubemap probe from a camera inside a planet's
//! atmosphere: physical sky, a raymarched cloud layer and shadowed terrain,
//! with lock-free sun and sky colour statistics gathered on the way.

pub mod core;
pub mod math;
pub mod atmosphere;
pub mod clouds;
pub mod terrain;
pub mod shadow;
pub mod probe;
