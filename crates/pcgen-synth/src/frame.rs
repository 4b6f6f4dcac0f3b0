use nalgebra::{Matrix3, Vector3};
use pcgen_core::{Result, SynthError};

/// Right-handed orthonormal basis whose z-axis is a requested normal.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct OrthonormalFrame {
    pub x_axis: Vector3<f64>,
    pub y_axis: Vector3<f64>,
    pub z_axis: Vector3<f64>,
}

impl OrthonormalFrame {
    /// Build the frame from a (not necessarily unit) normal.
    ///
    /// The x-axis is `n × [0,0,1]`, so a normal parallel to the canonical z-axis
    /// has no frame here and is rejected as degenerate. Both vectors are divided
    /// by their largest component before normalizing, so any finite non-zero
    /// normal works regardless of magnitude.
    pub fn from_normal(normal: [f64; 3]) -> Result<Self> {
        let n = Vector3::from(normal);
        if n.iter().any(|v| !v.is_finite()) {
            return Err(SynthError::DegenerateInput(format!("normal {normal:?} is not finite")));
        }
        let z_axis = unit(n).ok_or_else(|| {
            SynthError::DegenerateInput(format!("normal {normal:?} has zero length"))
        })?;

        let x_axis = unit(Vector3::new(z_axis.y, -z_axis.x, 0.0)).ok_or_else(|| {
            SynthError::DegenerateInput(format!(
                "normal {normal:?} is parallel to the canonical z-axis"
            ))
        })?;
        let y_axis = z_axis.cross(&x_axis).normalize();

        Ok(Self { x_axis, y_axis, z_axis })
    }

    /// Rotation taking canonical coordinates into this frame (columns x, y, z).
    pub fn rotation(&self) -> Matrix3<f64> {
        Matrix3::from_columns(&[self.x_axis, self.y_axis, self.z_axis])
    }
}

/// `v / |v|` computed on `v / max|v_i|`, so the squared norm neither
/// overflows nor underflows. `None` for the zero vector.
fn unit(v: Vector3<f64>) -> Option<Vector3<f64>> {
    let scale = v.amax();
    if scale == 0.0 {
        return None;
    }
    let v = v / scale;
    Some(v / v.norm())
}
