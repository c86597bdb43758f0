//! Keyframed sun color over a 24-hour cycle.

use serde::{Deserialize, Serialize};

use crate::core::types::Vec3;

/// Linear RGB keys indexed by hour, interpolated with wrap-around at midnight.
///
/// Serialized as a plain list of `(hour, [r, g, b])` pairs; keys are sorted
/// on construction and deserialization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<(f32, [f32; 3])>", into = "Vec<(f32, [f32; 3])>")]
pub struct ColorRamp {
    keys: Vec<(f32, [f32; 3])>,
}

impl ColorRamp {
    /// Create a ramp from keys in any order.
    pub fn new(mut keys: Vec<(f32, [f32; 3])>) -> Self {
        keys.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self { keys }
    }

    /// A ramp returning `color` at every hour.
    pub fn constant(color: [f32; 3]) -> Self {
        Self { keys: vec![(0.0, color)] }
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the ramp has no keys (samples as black).
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Color at `hour`; any value is folded into `[0, 24)` first.
    pub fn sample(&self, hour: f32) -> Vec3 {
        let n = self.keys.len();
        match n {
            0 => return Vec3::ZERO,
            1 => return Vec3::from(self.keys[0].1),
            _ => {}
        }

        let t = hour.rem_euclid(24.0);
        let upper = self.keys.partition_point(|k| k.0 <= t);

        // Segment (a, b); wrap through midnight when t is outside the key span
        let (a, b, span, offset) = if upper == 0 || upper == n {
            let a = &self.keys[n - 1];
            let b = &self.keys[0];
            let offset = if t >= a.0 { t - a.0 } else { t + 24.0 - a.0 };
            (a, b, b.0 + 24.0 - a.0, offset)
        } else {
            let a = &self.keys[upper - 1];
            let b = &self.keys[upper];
            (a, b, b.0 - a.0, t - a.0)
        };

        let va = Vec3::from(a.1);
        if span < 1e-6 {
            return va;
        }
        va.lerp(Vec3::from(b.1), offset / span)
    }
}

impl From<Vec<(f32, [f32; 3])>> for ColorRamp {
    fn from(keys: Vec<(f32, [f32; 3])>) -> Self {
        Self::new(keys)
    }
}

impl From<ColorRamp> for Vec<(f32, [f32; 3])> {
    fn from(ramp: ColorRamp) -> Self {
        ramp.keys
    }
}

impl Default for ColorRamp {
    /// Daylight ramp: warm at dawn and dusk, near-white around noon.
    fn default() -> Self {
        Self::new(vec![
            (0.0, [0.1, 0.1, 0.2]),
            (5.5, [0.9, 0.4, 0.2]),
            (6.5, [1.0, 0.65, 0.35]),
            (7.5, [1.0, 0.85, 0.65]),
            (10.0, [1.0, 0.98, 0.95]),
            (15.0, [1.0, 0.97, 0.92]),
            (17.0, [1.0, 0.85, 0.65]),
            (18.0, [1.0, 0.55, 0.25]),
            (19.5, [0.3, 0.15, 0.2]),
            (20.5, [0.1, 0.1, 0.2]),
        ])
    }
}
