//! Phase functions.

use std::f32::consts::PI;

/// Henyey-Greenstein phase function.
///
/// `cos_theta` is the cosine between the view and light directions, `g` the
/// asymmetry in (-1, 1): positive values favour forward scattering.
#[inline]
pub fn henyey_greenstein(cos_theta: f32, g: f32) -> f32 {
    let g2 = g * g;
    let denom = (1.0 + g2 - 2.0 * g * cos_theta).max(1e-6);
    (1.0 - g2) / (4.0 * PI * denom * denom.sqrt())
}

/// Rayleigh phase function.
#[inline]
pub fn rayleigh(cos_theta: f32) -> f32 {
    3.0 * (1.0 + cos_theta * cos_theta) / (16.0 * PI)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Integrate a phase function over the sphere (it depends on theta only).
    fn integrate(f: impl Fn(f32) -> f32) -> f32 {
        let n = 4096;
        let mut sum = 0.0;
        for i in 0..n {
            let theta = (i as f32 + 0.5) / n as f32 * PI;
            sum += f(theta.cos()) * theta.sin();
        }
        sum * (PI / n as f32) * 2.0 * PI
    }

    #[test]
    fn test_isotropic_when_g_is_zero() {
        let expected = 1.0 / (4.0 * PI);
        assert!((henyey_greenstein(0.3, 0.0) - expected).abs() < 1e-7);
        assert!((henyey_greenstein(-1.0, 0.0) - expected).abs() < 1e-7);
    }

    #[test]
    fn test_normalized() {
        for g in [-0.5, 0.0, 0.3, 0.6] {
            let total = integrate(|c| henyey_greenstein(c, g));
            assert!((total - 1.0).abs() < 1e-2, "g = {g}: {total}");
        }
        assert!((integrate(rayleigh) - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_forward_peak() {
        assert!(henyey_greenstein(1.0, 0.6) > henyey_greenstein(-1.0, 0.6));
        assert!(henyey_greenstein(1.0, -0.6) < henyey_greenstein(-1.0, -0.6));
    }
}
