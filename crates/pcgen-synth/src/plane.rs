use log::debug;
use nalgebra::Vector3;
use pcgen_core::{Cloud, Result, SynthError};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::frame::OrthonormalFrame;

/// Canonical plane normal; requesting exactly this skips the rotation.
pub const CANONICAL_NORMAL: [f64; 3] = [0.0, 0.0, 1.0];

/// Noisy rectangular patch of a plane.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaneSpec {
    /// need not be unit length
    pub normal: [f64; 3],
    pub offset: [f64; 3],
    /// full width along the in-plane x-axis, centred on the offset
    pub extent_x: f64,
    pub extent_y: f64,
    /// full width of the perpendicular jitter
    pub noise_z: f64,
    pub point_count: usize,
}

impl Default for PlaneSpec {
    fn default() -> Self {
        Self {
            normal: CANONICAL_NORMAL,
            offset: [0.0; 3],
            extent_x: 10.0,
            extent_y: 10.0,
            noise_z: 0.1,
            point_count: 100,
        }
    }
}

impl PlaneSpec {
    pub fn validate(&self) -> Result<()> {
        for (name, v) in [("extent_x", self.extent_x), ("extent_y", self.extent_y), ("noise_z", self.noise_z)] {
            if !v.is_finite() || v < 0.0 {
                return Err(SynthError::InvalidSpec(format!("{name} must be finite and >= 0, got {v}")));
            }
        }
        if self.offset.iter().any(|v| !v.is_finite()) {
            return Err(SynthError::InvalidSpec(format!("offset {:?} is not finite", self.offset)));
        }
        Ok(())
    }
}

/// Sample `spec.point_count` points on the plane described by `spec`.
///
/// Points are drawn uniformly in the canonical rectangle with uniform jitter
/// along z, then rotated so z follows `spec.normal` and shifted by
/// `spec.offset`. The jitter of each point is kept as its intensity.
pub fn build_plane<R: Rng + ?Sized>(spec: &PlaneSpec, rng: &mut R) -> Result<Cloud> {
    spec.validate()?;

    // exact comparison: anything else goes through the general frame
    let rotation = if spec.normal == CANONICAL_NORMAL {
        None
    } else {
        Some(OrthonormalFrame::from_normal(spec.normal)?.rotation())
    };
    let offset = Vector3::from(spec.offset);

    let mut cloud = Cloud::try_with_capacity(spec.point_count)?;
    for _ in 0..spec.point_count {
        let local = Vector3::new(
            rng.gen::<f64>() * spec.extent_x - spec.extent_x * 0.5,
            rng.gen::<f64>() * spec.extent_y - spec.extent_y * 0.5,
            rng.gen::<f64>() * spec.noise_z - spec.noise_z * 0.5,
        );
        let p = match &rotation {
            Some(r) => r * local,
            None => local,
        } + offset;
        cloud.push_xyzi(p.x as f32, p.y as f32, p.z as f32, local.z as f32);
    }

    debug!(
        "plane: {} points, normal={:?}, offset={:?}, rotated={}",
        cloud.len(), spec.normal, spec.offset, rotation.is_some()
    );
    Ok(cloud)
}
