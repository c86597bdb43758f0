//! Volumetric cloud layer: density field, phase functions and raymarcher.

pub mod density;
pub mod noise_volume;
pub mod phase;
pub mod raymarch;

pub use density::{adjusted_density, DensityField};
pub use noise_volume::{CloudNoiseVolume, NoiseVolume};
pub use raymarch::{CloudRaymarcher, CloudSample, CloudShell, ShellSpan};
