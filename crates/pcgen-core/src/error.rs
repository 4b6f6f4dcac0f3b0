use std::path::PathBuf;

use thiserror::Error;

/// Failures shared by the builders and the binary codec.
#[derive(Debug, Error)]
pub enum SynthError {
    /// Non-physical or out-of-range parameters (negative counts, non-positive radius, ...).
    #[error("invalid spec: {0}")]
    InvalidSpec(String),

    /// Vectors that cannot seed an orthonormal frame.
    #[error("degenerate input: {0}")]
    DegenerateInput(String),

    /// Byte length is not a whole number of points.
    #[error("malformed point file: {len} bytes is not a multiple of the {stride}-byte point stride")]
    MalformedFile { len: usize, stride: usize },

    /// The cloud does not carry a column the requested layout needs.
    #[error("cloud has no full-length '{0}' column")]
    MissingChannel(String),

    /// I/O failure on a named file.
    #[error("{}: {source}", .path.display())]
    File { path: PathBuf, source: std::io::Error },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SynthError {
    /// Closure for `map_err` that tags an I/O error with its file.
    pub fn at(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> SynthError {
        let path = path.into();
        move |source| SynthError::File { path, source }
    }
}

pub type Result<T, E = SynthError> = std::result::Result<T, E>;

/// Convert an externally supplied signed count, rejecting negatives.
pub fn checked_count(name: &str, value: i64) -> Result<usize> {
    usize::try_from(value)
        .map_err(|_| SynthError::InvalidSpec(format!("{name} must be >= 0, got {value}")))
}
