use std::f64::consts::FRAC_PI_2;

use log::debug;
use pcgen_core::{Cloud, Result, SynthError};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Sphere sampled on a `sample_count × sample_count` (theta, alpha) grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SphereSpec {
    pub radius: f64,
    /// each point's radius is drawn from `[radius, radius + radius_noise)`
    pub radius_noise: f64,
    /// samples per angle; the cloud holds `sample_count²` points
    pub sample_count: usize,
}

impl Default for SphereSpec {
    fn default() -> Self {
        Self { radius: 1.0, radius_noise: 0.1, sample_count: 100 }
    }
}

impl SphereSpec {
    pub fn validate(&self) -> Result<()> {
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(SynthError::InvalidSpec(format!("radius must be finite and > 0, got {}", self.radius)));
        }
        if !self.radius_noise.is_finite() || self.radius_noise < 0.0 {
            return Err(SynthError::InvalidSpec(format!(
                "radius_noise must be finite and >= 0, got {}", self.radius_noise
            )));
        }
        Ok(())
    }

    /// `sample_count²`, or `InvalidSpec` when that does not fit in `usize`.
    pub fn total_points(&self) -> Result<usize> {
        self.sample_count.checked_mul(self.sample_count).ok_or_else(|| {
            SynthError::InvalidSpec(format!("sample_count {} squared overflows", self.sample_count))
        })
    }
}

/// `n` evenly spaced values over `[start, end]`; a single sample sits at `start`.
fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    if n < 2 {
        return vec![start; n];
    }
    let step = (end - start) / (n - 1) as f64;
    (0..n).map(|i| start + step * i as f64).collect()
}

/// Sample a noisy sphere on the full (theta, alpha) outer-product grid over
/// `[-π/2, π/2]²`. Density is not uniform over the surface: points bunch up
/// near theta = ±π/2.
///
/// Points are emitted alpha-major, theta-minor. The radial jitter of each
/// point is kept as its intensity.
pub fn build_sphere<R: Rng + ?Sized>(spec: &SphereSpec, rng: &mut R) -> Result<Cloud> {
    spec.validate()?;

    let mut cloud = Cloud::try_with_capacity(spec.total_points()?)?;
    let angles = linspace(-FRAC_PI_2, FRAC_PI_2, spec.sample_count);
    for &alpha in &angles {
        let (sa, ca) = alpha.sin_cos();
        for &theta in &angles {
            let (st, ct) = theta.sin_cos();
            let jitter = rng.gen::<f64>() * spec.radius_noise;
            let r = spec.radius + jitter;
            cloud.push_xyzi(
                (r * ct * ca) as f32,
                (r * ct * sa) as f32,
                (r * st) as f32,
                jitter as f32,
            );
        }
    }

    debug!("sphere: {} points, radius={}, radius_noise={}", cloud.len(), spec.radius, spec.radius_noise);
    Ok(cloud)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn norm(p: [f32; 3]) -> f64 {
        p.iter().map(|&v| (v as f64) * (v as f64)).sum::<f64>().sqrt()
    }

    #[test]
    fn unit_sphere_scenario() {
        let spec = SphereSpec { radius: 1.0, radius_noise: 0.0, sample_count: 2 };
        let c = build_sphere(&spec, &mut ChaCha8Rng::seed_from_u64(5)).unwrap();
        assert_eq!(c.len(), 4);
        for p in c.points() {
            assert_abs_diff_eq!(norm(p), 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn radii_stay_within_noise_shell() {
        let spec = SphereSpec { radius: 5.0, radius_noise: 0.01, sample_count: 100 };
        let c = build_sphere(&spec, &mut ChaCha8Rng::seed_from_u64(11)).unwrap();
        assert_eq!(c.len(), 10_000);
        for p in c.points() {
            let r = norm(p);
            assert!(r >= 5.0 - 1e-5 && r <= 5.01 + 1e-5, "r={r}");
        }
        for &j in c.intensity().unwrap() {
            assert!((0.0..=0.01).contains(&j));
        }
    }

    #[test]
    fn grid_is_alpha_major() {
        let spec = SphereSpec { radius: 2.0, radius_noise: 0.0, sample_count: 3 };
        let c = build_sphere(&spec, &mut ChaCha8Rng::seed_from_u64(0)).unwrap();
        assert_eq!(c.len(), 9);
        // theta runs fastest: first three points sweep z from -r to +r at alpha = -π/2
        assert_abs_diff_eq!(c.z[0], -2.0, epsilon = 1e-6);
        assert_abs_diff_eq!(c.z[1], 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(c.z[2], 2.0, epsilon = 1e-6);
        // theta = 0, alpha = -π/2 → (0, -r, 0)
        assert_abs_diff_eq!(c.y[1], -2.0, epsilon = 1e-6);
        // theta = 0, alpha = 0 → (r, 0, 0)
        assert_abs_diff_eq!(c.x[4], 2.0, epsilon = 1e-6);
    }

    #[test]
    fn single_sample_sits_at_lower_bound() {
        assert_eq!(linspace(-1.0, 1.0, 1), vec![-1.0]);
        assert!(linspace(-1.0, 1.0, 0).is_empty());
        assert_eq!(linspace(0.0, 1.0, 3), vec![0.0, 0.5, 1.0]);

        let spec = SphereSpec { radius: 1.0, radius_noise: 0.0, sample_count: 1 };
        let c = build_sphere(&spec, &mut ChaCha8Rng::seed_from_u64(0)).unwrap();
        assert_eq!(c.len(), 1);
        assert_abs_diff_eq!(c.z[0], -1.0, epsilon = 1e-6);
    }

    #[test]
    fn zero_samples_is_empty_not_error() {
        let spec = SphereSpec { sample_count: 0, ..Default::default() };
        let c = build_sphere(&spec, &mut ChaCha8Rng::seed_from_u64(0)).unwrap();
        assert!(c.is_empty());
    }

    #[test]
    fn invalid_radius_fails() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        for spec in [
            SphereSpec { radius: 0.0, ..Default::default() },
            SphereSpec { radius: -1.0, ..Default::default() },
            SphereSpec { radius: f64::NAN, ..Default::default() },
            SphereSpec { radius_noise: -0.1, ..Default::default() },
        ] {
            let err = build_sphere(&spec, &mut rng).unwrap_err();
            assert!(matches!(err, SynthError::InvalidSpec(_)), "{spec:?}");
        }
    }

    #[test]
    fn oversized_grid_is_invalid() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        // squared count overflows / cannot be allocated
        for sample_count in [usize::MAX, 1usize << (usize::BITS / 2), 1usize << (usize::BITS / 2 - 1)] {
            let spec = SphereSpec { sample_count, ..Default::default() };
            let err = build_sphere(&spec, &mut rng).unwrap_err();
            assert!(matches!(err, SynthError::InvalidSpec(_)), "{sample_count}: {err}");
        }
        assert!(SphereSpec { sample_count: usize::MAX, ..Default::default() }.total_points().is_err());
        assert_eq!(SphereSpec { sample_count: 30, ..Default::default() }.total_points().unwrap(), 900);
    }

    #[test]
    fn same_seed_same_cloud() {
        let spec = SphereSpec { sample_count: 20, ..Default::default() };
        let a = build_sphere(&spec, &mut ChaCha8Rng::seed_from_u64(77)).unwrap();
        let b = build_sphere(&spec, &mut ChaCha8Rng::seed_from_u64(77)).unwrap();
        assert_eq!(a, b);
    }
}
