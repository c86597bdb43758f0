//! Environment probe rendering.
//!
//! [`ProbeRenderer`] runs the [`SkyCompositor`] over every texel of a
//! [`ProbeImage`] in parallel and gathers [`ProbeStatistics`] on the way.

pub mod compositor;
pub mod config;
pub mod image;
pub mod statistics;

pub use compositor::{ShadedTexel, SkyCompositor};
pub use config::{ProbeConfig, StatisticsConfig};
pub use self::image::ProbeImage;
pub use statistics::{AccumulatorSnapshot, ColorAccumulator, ProbeStatistics};

use std::time::Instant;

use rayon::prelude::*;

use crate::atmosphere::AtmosphereService;
use crate::clouds::NoiseVolume;
use crate::core::types::{Result, UVec3};
use crate::core::Error;
use crate::shadow::ShadowMap;
use crate::terrain::TerrainBuffer;

/// Rows per parallel band, and the edge of one dispatch workgroup.
pub const WORKGROUP_SIZE: u32 = 16;

/// Collaborators a dispatch reads from.
#[derive(Clone, Copy)]
pub struct ProbeResources<'a> {
    pub atmosphere: &'a dyn AtmosphereService,
    /// Absent: every direction is sky.
    pub terrain: Option<&'a dyn TerrainBuffer>,
    /// Absent: terrain is never shadowed.
    pub shadow_map: Option<&'a ShadowMap>,
    pub cloud_noise: &'a dyn NoiseVolume,
}

/// Renders probes for one configuration.
pub struct ProbeRenderer<'a> {
    config: &'a ProbeConfig,
    resources: ProbeResources<'a>,
}

impl<'a> ProbeRenderer<'a> {
    pub fn new(config: &'a ProbeConfig, resources: ProbeResources<'a>) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, resources })
    }

    pub fn config(&self) -> &ProbeConfig {
        self.config
    }

    /// Workgroups needed to cover the probe: whole `WORKGROUP_SIZE` tiles per
    /// face, one layer per face.
    pub fn dispatch_size(&self) -> UVec3 {
        let groups = self.config.resolution.div_ceil(WORKGROUP_SIZE);
        UVec3::new(groups, groups, 6)
    }

    /// Shade every texel of `image`, adding to `statistics`.
    ///
    /// The accumulators are not reset here; call [`ProbeStatistics::reset`]
    /// between dispatches.
    pub fn render(&self, image: &mut ProbeImage, statistics: &ProbeStatistics) -> Result<()> {
        let resolution = self.config.resolution;
        if image.resolution() != resolution {
            return Err(Error::Config(format!(
                "probe image is {}x{}, config expects {resolution}x{resolution}",
                image.resolution(),
                image.resolution()
            )));
        }

        let start = Instant::now();
        let compositor = SkyCompositor::new(self.config, self.resources, statistics);
        let row_len = resolution as usize;
        let band_len = row_len * WORKGROUP_SIZE as usize;

        image
            .texels_mut()
            .par_chunks_mut(band_len)
            .enumerate()
            .for_each(|(band, texels)| {
                let first_row = band * WORKGROUP_SIZE as usize;
                for (i, texel) in texels.iter_mut().enumerate() {
                    let row = first_row + i / row_len;
                    let coord = UVec3::new(
                        (i % row_len) as u32,
                        (row % row_len) as u32,
                        (row / row_len) as u32,
                    );
                    if let Some(shaded) = compositor.shade(coord) {
                        *texel = shaded.color;
                    }
                }
            });

        let elapsed = start.elapsed();
        log::info!(
            "Rendered {resolution}x{resolution}x6 probe in {:.1}ms",
            elapsed.as_secs_f64() * 1000.0
        );
        log::debug!(
            "Probe statistics: sun {:?}, sky {:?}",
            statistics.sun.snapshot(),
            statistics.sky.snapshot()
        );

        Ok(())
    }
}
