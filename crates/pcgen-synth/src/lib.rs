//! pcgen-synth — synthetic point clouds with known geometry (planes, spheres).
//!
//! Builders take their random source explicitly, so a seeded generator gives
//! the same cloud every time.

mod frame;
mod plane;
mod sphere;

pub use frame::OrthonormalFrame;
pub use plane::{build_plane, PlaneSpec, CANONICAL_NORMAL};
pub use sphere::{build_sphere, SphereSpec};
