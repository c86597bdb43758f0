//! Lock-free colour statistics gathered while the probe renders.
//!
//! Every contributing texel converts its colour to fixed point and adds it to
//! shared integer lanes. Integer addition commutes, so the totals do not
//! depend on how the dispatch was scheduled.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::core::types::Vec3;

/// Totals read back from a [`ColorAccumulator`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AccumulatorSnapshot {
    /// Fixed-point R, G, B sums.
    pub sum: [u64; 3],
    /// Number of contributions.
    pub count: u64,
}

impl AccumulatorSnapshot {
    /// Sum converted back to floating point.
    pub fn total(&self, scale: f32) -> Vec3 {
        if scale <= 0.0 {
            return Vec3::ZERO;
        }
        Vec3::new(self.sum[0] as f32, self.sum[1] as f32, self.sum[2] as f32) / scale
    }

    /// Per-contribution mean, zero when nothing was added.
    pub fn mean(&self, scale: f32) -> Vec3 {
        if self.count == 0 {
            return Vec3::ZERO;
        }
        self.total(scale) / self.count as f32
    }
}

/// Four atomic lanes: R, G, B and a contribution count.
#[derive(Debug, Default)]
pub struct ColorAccumulator {
    lanes: [AtomicU64; 4],
}

impl ColorAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `color · scale`, each channel truncated to a saturating `u32`.
    pub fn add(&self, color: Vec3, scale: f32) {
        let fixed = [to_fixed(color.x, scale), to_fixed(color.y, scale), to_fixed(color.z, scale)];
        for (lane, value) in self.lanes.iter().zip(fixed) {
            lane.fetch_add(value as u64, Ordering::Relaxed);
        }
        self.lanes[3].fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> AccumulatorSnapshot {
        AccumulatorSnapshot {
            sum: [
                self.lanes[0].load(Ordering::Relaxed),
                self.lanes[1].load(Ordering::Relaxed),
                self.lanes[2].load(Ordering::Relaxed),
            ],
            count: self.lanes[3].load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        for lane in &self.lanes {
            lane.store(0, Ordering::Relaxed);
        }
    }
}

/// Fixed-point conversion of one channel. Negative and NaN inputs give 0,
/// overflow saturates.
#[inline]
pub fn to_fixed(value: f32, scale: f32) -> u32 {
    // `as` saturates float-to-int casts and maps NaN to 0
    (value * scale) as u32
}

/// Sun and sky accumulators shared by one dispatch.
#[derive(Debug, Default)]
pub struct ProbeStatistics {
    /// Solid-angle weighted texels that see the solar disk.
    pub sun: ColorAccumulator,
    /// Sparse samples of everything else.
    pub sky: ColorAccumulator,
}

impl ProbeStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear both accumulators before the next dispatch.
    pub fn reset(&self) {
        self.sun.reset();
        self.sky.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;

    #[test]
    fn test_to_fixed() {
        assert_eq!(to_fixed(1.5, 1024.0), 1536);
        assert_eq!(to_fixed(-3.0, 1024.0), 0);
        assert_eq!(to_fixed(f32::NAN, 1024.0), 0);
        assert_eq!(to_fixed(1.0e12, 1024.0), u32::MAX);
    }

    #[test]
    fn test_add_and_snapshot() {
        let acc = ColorAccumulator::new();
        acc.add(Vec3::new(1.0, 0.5, 0.25), 1024.0);
        acc.add(Vec3::new(1.0, 0.5, 0.25), 1024.0);
        let snap = acc.snapshot();
        assert_eq!(snap.sum, [2048, 1024, 512]);
        assert_eq!(snap.count, 2);
        assert_eq!(snap.mean(1024.0), Vec3::new(1.0, 0.5, 0.25));

        acc.reset();
        assert_eq!(acc.snapshot(), AccumulatorSnapshot::default());
        assert_eq!(acc.snapshot().mean(1024.0), Vec3::ZERO);
    }

    #[test]
    fn test_lanes_do_not_wrap_at_u32() {
        let acc = ColorAccumulator::new();
        for _ in 0..4 {
            acc.add(Vec3::splat(1.0e12), 1.0);
        }
        assert_eq!(acc.snapshot().sum[0], 4 * u32::MAX as u64);
    }

    #[test]
    fn test_parallel_sum_matches_sequential() {
        let scale = 1024.0;
        let colors: Vec<Vec3> = (0..10_000)
            .map(|i| {
                let t = i as f32;
                Vec3::new((t * 0.37).sin().abs() * 3.0, (t * 0.11).cos().abs(), (t * 0.07) % 2.0)
            })
            .collect();

        let stats = ProbeStatistics::new();
        colors.par_iter().for_each(|&c| stats.sky.add(c, scale));

        let mut expected = [0u64; 3];
        for c in &colors {
            expected[0] += to_fixed(c.x, scale) as u64;
            expected[1] += to_fixed(c.y, scale) as u64;
            expected[2] += to_fixed(c.z, scale) as u64;
        }

        let snap = stats.sky.snapshot();
        assert_eq!(snap.sum, expected);
        assert_eq!(snap.count, colors.len() as u64);
        assert_eq!(stats.sun.snapshot().count, 0);
    }
}
