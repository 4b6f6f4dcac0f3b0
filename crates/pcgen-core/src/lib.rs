//! pcgen-core — point-cloud data model, errors and small summaries shared by
//! the generators, the binary codec and the CLI.

use std::collections::HashMap;

use nalgebra::{Isometry3, Matrix3, Point3, Vector3};
use serde::{Deserialize, Serialize};

mod error;

pub use error::{checked_count, Result, SynthError};

/// Name of the per-point scalar carried as the 4th channel of the binary format.
pub const INTENSITY: &str = "intensity";

/// Structure-of-Arrays point cloud.
/// Hot columns (x,y,z) stay tight; optional scalars live in a name→column map.
#[derive(Default, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cloud {
    pub x: Vec<f32>,
    pub y: Vec<f32>,
    pub z: Vec<f32>,

    /// Optional attributes (same length as x/y/z). The binary codec only knows "intensity".
    pub attrs_f32: HashMap<String, Vec<f32>>,
}

impl Cloud {
    pub fn with_capacity(n: usize) -> Self {
        let mut c = Self::default();
        c.reserve(n);
        c
    }
    /// Like `with_capacity`, but a size the allocator cannot satisfy is an
    /// `InvalidSpec` instead of an abort.
    pub fn try_with_capacity(n: usize) -> Result<Self> {
        let mut c = Self::default();
        for col in [&mut c.x, &mut c.y, &mut c.z] {
            col.try_reserve_exact(n)
                .map_err(|e| SynthError::InvalidSpec(format!("cannot hold {n} points: {e}")))?;
        }
        Ok(c)
    }
    pub fn len(&self) -> usize { self.x.len() }
    pub fn is_empty(&self) -> bool { self.x.is_empty() }
    pub fn push(&mut self, px: f32, py: f32, pz: f32) {
        self.x.push(px); self.y.push(py); self.z.push(pz);
    }
    /// Push a point together with its intensity, creating the column on first use.
    pub fn push_xyzi(&mut self, px: f32, py: f32, pz: f32, intensity: f32) {
        let idx = self.len();
        self.push(px, py, pz);
        let col = self.attrs_f32.entry(INTENSITY.to_string()).or_default();
        // keep the column aligned if earlier points were pushed without one
        if col.len() < idx {
            col.resize(idx, 0.0);
        }
        col.push(intensity);
    }
    pub fn reserve(&mut self, n: usize) {
        self.x.reserve(n); self.y.reserve(n); self.z.reserve(n);
        for v in self.attrs_f32.values_mut() { v.reserve(n); }
    }
    pub fn point(&self, i: usize) -> [f32; 3] {
        [self.x[i], self.y[i], self.z[i]]
    }
    pub fn points(&self) -> impl Iterator<Item = [f32; 3]> + '_ {
        (0..self.len()).map(move |i| self.point(i))
    }

    /// The intensity column, only if it covers every point.
    pub fn intensity(&self) -> Option<&[f32]> {
        self.attrs_f32
            .get(INTENSITY)
            .filter(|col| col.len() == self.len())
            .map(Vec::as_slice)
    }

    /// Copy with every point mapped through `iso`; attribute columns are copied unchanged.
    pub fn transformed(&self, iso: &Isometry3<f32>) -> Cloud {
        let mut out = Cloud::with_capacity(self.len());
        for [px, py, pz] in self.points() {
            let p = iso.transform_point(&Point3::new(px, py, pz));
            out.push(p.x, p.y, p.z);
        }
        out.attrs_f32 = self.attrs_f32.clone();
        out
    }

    pub fn bounds(&self) -> Option<Aabb> {
        let mut pts = self.points();
        let first = pts.next()?;
        Some(pts.fold(Aabb { min: first, max: first }, |mut b, p| {
            for i in 0..3 {
                b.min[i] = b.min[i].min(p[i]);
                b.max[i] = b.max[i].max(p[i]);
            }
            b
        }))
    }

    pub fn centroid(&self) -> Option<Vector3<f64>> {
        if self.is_empty() { return None; }
        let mut mean = Vector3::<f64>::zeros();
        for [px, py, pz] in self.points() {
            mean += Vector3::new(px as f64, py as f64, pz as f64);
        }
        Some(mean / self.len() as f64)
    }

    /// Population covariance (divide by n) of the mean-centred points.
    pub fn covariance(&self) -> Option<Matrix3<f64>> {
        let mean = self.centroid()?;
        let mut c = Matrix3::<f64>::zeros();
        for [px, py, pz] in self.points() {
            let v = Vector3::new(px as f64, py as f64, pz as f64) - mean;
            c += v * v.transpose();
        }
        Some(c / self.len() as f64)
    }
}

/// Simple AABB
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb { pub min: [f32;3], pub max: [f32;3] }
impl Aabb {
    pub fn extent(&self) -> [f32; 3] {
        [self.max[0]-self.min[0], self.max[1]-self.min[1], self.max[2]-self.min[2]]
    }
}

/// Total polyline length of a 2-D waypoint path.
pub fn path_length(path: &[[f32; 2]]) -> f64 {
    path.windows(2)
        .map(|w| {
            let dx = (w[1][0] - w[0][0]) as f64;
            let dy = (w[1][1] - w[0][1]) as f64;
            (dx*dx + dy*dy).sqrt()
        })
        .sum()
}
