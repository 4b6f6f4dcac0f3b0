//! pcgen-io — headerless little-endian float32 point files.
//!
//! A file is nothing but `channels` consecutive f32 values per point; the
//! reader has to be told the channel count out of band.

use std::ffi::{OsStr, OsString};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};
use pcgen_core::{Cloud, Result, SynthError, INTENSITY};

const F32_BYTES: usize = std::mem::size_of::<f32>();

/// Scalars stored per point.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Channels {
    /// x, y, z
    Xyz,
    /// x, y, z, intensity
    Xyzi,
}

impl Channels {
    pub fn count(self) -> usize {
        match self {
            Channels::Xyz => 3,
            Channels::Xyzi => 4,
        }
    }

    /// Bytes per point.
    pub fn stride(self) -> usize { self.count() * F32_BYTES }
}

impl TryFrom<usize> for Channels {
    type Error = SynthError;
    fn try_from(n: usize) -> Result<Self> {
        match n {
            3 => Ok(Channels::Xyz),
            4 => Ok(Channels::Xyzi),
            _ => Err(SynthError::InvalidSpec(format!("channel count must be 3 or 4, got {n}"))),
        }
    }
}

/// Serialize `cloud` into `w` in cloud order.
pub fn encode_into<W: Write>(w: &mut W, cloud: &Cloud, channels: Channels) -> Result<()> {
    let intensity = match channels {
        Channels::Xyzi if !cloud.is_empty() => Some(
            cloud.intensity().ok_or_else(|| SynthError::MissingChannel(INTENSITY.into()))?,
        ),
        _ => None,
    };
    for i in 0..cloud.len() {
        w.write_all(&cloud.x[i].to_le_bytes())?;
        w.write_all(&cloud.y[i].to_le_bytes())?;
        w.write_all(&cloud.z[i].to_le_bytes())?;
        if let Some(col) = intensity {
            w.write_all(&col[i].to_le_bytes())?;
        }
    }
    Ok(())
}

/// Serialize `cloud` into a fresh buffer of `len * stride` bytes.
pub fn encode(cloud: &Cloud, channels: Channels) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(cloud.len() * channels.stride());
    encode_into(&mut buf, cloud, channels)?;
    Ok(buf)
}

/// Reinterpret `bytes` as points. Values are not checked (NaN/Inf pass through).
pub fn decode(bytes: &[u8], channels: Channels) -> Result<Cloud> {
    let stride = channels.stride();
    if bytes.len() % stride != 0 {
        return Err(SynthError::MalformedFile { len: bytes.len(), stride });
    }

    let mut c = Cloud::with_capacity(bytes.len() / stride);
    for rec in bytes.chunks_exact(stride) {
        let val = |k: usize| read_f32(&rec[k * F32_BYTES..]);
        match channels {
            Channels::Xyz => c.push(val(0), val(1), val(2)),
            Channels::Xyzi => c.push_xyzi(val(0), val(1), val(2), val(3)),
        }
    }
    Ok(c)
}

/// Decode a 2-component waypoint path written with the same convention.
pub fn decode_path(bytes: &[u8]) -> Result<Vec<[f32; 2]>> {
    let stride = 2 * F32_BYTES;
    if bytes.len() % stride != 0 {
        return Err(SynthError::MalformedFile { len: bytes.len(), stride });
    }
    Ok(bytes
        .chunks_exact(stride)
        .map(|rec| [read_f32(rec), read_f32(&rec[F32_BYTES..])])
        .collect())
}

/// Encode the whole cloud, write it to a hidden sibling and rename that over
/// `path`. Any failure leaves `path` as it was and removes the partial file.
pub fn write_bin(path: impl AsRef<Path>, cloud: &Cloud, channels: Channels) -> Result<()> {
    let path = path.as_ref();
    let bytes = encode(cloud, channels)?;
    let partial = partial_path(path);
    let res = write_file(&partial, &bytes)
        .and_then(|()| fs::rename(&partial, path).map_err(SynthError::at(path)));
    if let Err(e) = res {
        if partial.exists() {
            if let Err(rm) = fs::remove_file(&partial) {
                warn!("could not remove {}: {rm}", partial.display());
            }
        }
        return Err(e);
    }
    debug!("wrote {} points ({} bytes, {:?}) -> {}", cloud.len(), bytes.len(), channels, path.display());
    Ok(())
}

pub fn read_bin(path: impl AsRef<Path>, channels: Channels) -> Result<Cloud> {
    let bytes = read_all(path.as_ref())?;
    decode(&bytes, channels)
}

pub fn read_path_bin(path: impl AsRef<Path>) -> Result<Vec<[f32; 2]>> {
    let bytes = read_all(path.as_ref())?;
    decode_path(&bytes)
}

/// `dir/name` -> `dir/.name.partial`
fn partial_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(path.file_name().unwrap_or_else(|| OsStr::new("cloud")));
    name.push(".partial");
    path.with_file_name(name)
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut w = BufWriter::new(File::create(path).map_err(SynthError::at(path))?);
    w.write_all(bytes).map_err(SynthError::at(path))?;
    w.flush().map_err(SynthError::at(path))
}

fn read_all(path: &Path) -> Result<Vec<u8>> {
    let mut r = BufReader::new(File::open(path).map_err(SynthError::at(path))?);
    let mut bytes = Vec::new();
    r.read_to_end(&mut bytes).map_err(SynthError::at(path))?;
    debug!("read {} bytes <- {}", bytes.len(), path.display());
    Ok(bytes)
}

/// First four bytes of `b` as a little-endian f32.
#[inline]
fn read_f32(b: &[u8]) -> f32 {
    f32::from_le_bytes([b[0], b[1], b[2], b[3]])
}
