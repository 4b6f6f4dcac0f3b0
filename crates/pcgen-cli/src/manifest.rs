//! JSON job manifests for `pcgen batch`.
//!
//! ```json
//! { "seed": 7,
//!   "jobs": [
//!     { "kind": "plane", "output": "plane.bin", "normal": [1,1,1], "offset": [-1,-1,-1],
//!       "extent_x": 2, "extent_y": 2, "point_count": 1000, "noise_z": 0.01 },
//!     { "kind": "sphere", "output": "sphere.bin", "radius": 5.0, "radius_noise": 0.01,
//!       "sample_count": 100, "intensity": true }
//!   ] }
//! ```
//! Omitted spec fields take the generator defaults; outputs are relative to the manifest.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use pcgen_synth::{PlaneSpec, SphereSpec};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Manifest {
    /// base seed; job `i` uses `seed + i`. Drawn at random when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    pub jobs: Vec<Job>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Job {
    Plane {
        output: PathBuf,
        #[serde(default)]
        intensity: bool,
        #[serde(flatten)]
        spec: PlaneSpec,
    },
    Sphere {
        output: PathBuf,
        #[serde(default)]
        intensity: bool,
        #[serde(flatten)]
        spec: SphereSpec,
    },
}

impl Job {
    pub fn output(&self) -> &Path {
        match self {
            Job::Plane { output, .. } | Job::Sphere { output, .. } => output,
        }
    }
    pub fn intensity(&self) -> bool {
        match self {
            Job::Plane { intensity, .. } | Job::Sphere { intensity, .. } => *intensity,
        }
    }
}

impl Manifest {
    pub fn from_json(text: &str) -> Result<Self> {
        let m: Manifest = serde_json::from_str(text).context("parse manifest")?;
        anyhow::ensure!(!m.jobs.is_empty(), "manifest has no jobs");
        Ok(m)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).with_context(|| format!("open {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("manifest {}", path.display()))
    }
}
