use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use nalgebra::{Isometry3, Translation3, UnitQuaternion};
use pcgen_core::{checked_count, Cloud};
use pcgen_io::Channels;
use pcgen_synth::{build_plane, build_sphere, PlaneSpec, SphereSpec};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

mod manifest;

use manifest::{Job, Manifest};

// ---------- helpers ----------

fn t0() -> std::time::Instant { std::time::Instant::now() }
fn lap(t: std::time::Instant, label: &str) {
    let ms = t.elapsed().as_secs_f64()*1000.0;
    info!("[{label}] {ms:.1} ms");
}

/// "x,y,z" -> [x, y, z]
fn parse_vec3(csv: &str) -> Result<[f64; 3]> {
    let vals = csv
        .split(',')
        .map(|s| s.trim().parse::<f64>().with_context(|| format!("bad component '{s}' in '{csv}'")))
        .collect::<Result<Vec<_>>>()?;
    anyhow::ensure!(vals.len() == 3, "expected 3 comma-separated values, got '{csv}'");
    Ok([vals[0], vals[1], vals[2]])
}

fn parse_channels(s: &str) -> Result<Channels, String> {
    let n: usize = s.parse().map_err(|e| format!("{e}"))?;
    Channels::try_from(n).map_err(|e| e.to_string())
}

fn layout(intensity: bool) -> Channels {
    if intensity { Channels::Xyzi } else { Channels::Xyz }
}

fn resolve_seed(seed: Option<u64>) -> u64 {
    let seed = seed.unwrap_or_else(rand::random);
    info!("seed={seed}");
    seed
}

fn write_cloud(path: &Path, cloud: &Cloud, channels: Channels) -> Result<()> {
    let t = t0();
    pcgen_io::write_bin(path, cloud, channels)
        .with_context(|| format!("write {}", path.display()))?;
    lap(t, "write");
    Ok(())
}

fn read_cloud(path: &Path, channels: Channels) -> Result<Cloud> {
    let t = t0();
    let cloud = pcgen_io::read_bin(path, channels)
        .with_context(|| format!("read {} as {} channels", path.display(), channels.count()))?;
    lap(t, "read");
    Ok(cloud)
}

// ---------- CLI ----------

#[derive(Parser)]
#[command(name="pcgen", version, about="Synthetic point clouds for perception diagnostics")]
struct Args { #[command(subcommand)] cmd: Cmd }

#[derive(Subcommand)]
enum Cmd {
    /// Sample a noisy plane patch
    Plane {
        output: PathBuf,
        /// plane normal "x,y,z" (need not be unit length)
        #[arg(long, default_value="0,0,1", allow_hyphen_values=true)] normal: String,
        /// translation "x,y,z"
        #[arg(long, default_value="0,0,0", allow_hyphen_values=true)] offset: String,
        #[arg(long, default_value_t=10.0)] extent_x: f64,
        #[arg(long, default_value_t=10.0)] extent_y: f64,
        /// full width of the perpendicular jitter
        #[arg(long, default_value_t=0.1)] noise: f64,
        #[arg(short='n', long, default_value_t=100, allow_hyphen_values=true)] points: i64,
        #[arg(long)] seed: Option<u64>,
        /// write x,y,z,jitter instead of x,y,z
        #[arg(long)] intensity: bool,
    },

    /// Sample a noisy sphere on a theta/alpha grid (samples² points)
    Sphere {
        output: PathBuf,
        #[arg(short, long, default_value_t=1.0)] radius: f64,
        #[arg(long, default_value_t=0.1)] radius_noise: f64,
        #[arg(short='n', long, default_value_t=100, allow_hyphen_values=true)] samples: i64,
        #[arg(long)] seed: Option<u64>,
        /// write x,y,z,jitter instead of x,y,z
        #[arg(long)] intensity: bool,
    },

    /// Run every job of a JSON manifest
    Batch { manifest: PathBuf },

    /// Print count, bounds, centroid and covariance of a point file
    Info {
        input: PathBuf,
        #[arg(short, long, default_value="3", value_parser=parse_channels)] channels: Channels,
    },

    /// Make a rigidly transformed copy of a point file
    Transform {
        input: PathBuf, output: PathBuf,
        #[arg(short, long, default_value="3", value_parser=parse_channels)] channels: Channels,
        #[arg(long, default_value_t=0.0, allow_hyphen_values=true)] tx: f32,
        #[arg(long, default_value_t=0.0, allow_hyphen_values=true)] ty: f32,
        #[arg(long, default_value_t=0.0, allow_hyphen_values=true)] tz: f32,
        #[arg(long, default_value_t=0.0, allow_hyphen_values=true)] rx_deg: f32,
        #[arg(long, default_value_t=0.0, allow_hyphen_values=true)] ry_deg: f32,
        #[arg(long, default_value_t=0.0, allow_hyphen_values=true)] rz_deg: f32,
    },

    /// Summarize a 2-D path file (x,y float32 pairs)
    Path { input: PathBuf },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    match args.cmd {
        Cmd::Plane { output, normal, offset, extent_x, extent_y, noise, points, seed, intensity } => {
            let spec = PlaneSpec {
                normal: parse_vec3(&normal).context("--normal")?,
                offset: parse_vec3(&offset).context("--offset")?,
                extent_x, extent_y,
                noise_z: noise,
                point_count: checked_count("points", points)?,
            };
            cmd_plane(&spec, &output, resolve_seed(seed), layout(intensity))
        }
        Cmd::Sphere { output, radius, radius_noise, samples, seed, intensity } => {
            let spec = SphereSpec { radius, radius_noise, sample_count: checked_count("samples", samples)? };
            cmd_sphere(&spec, &output, resolve_seed(seed), layout(intensity))
        }
        Cmd::Batch { manifest } => cmd_batch(&manifest),
        Cmd::Info { input, channels } => cmd_info(&input, channels),
        Cmd::Transform { input, output, channels, tx, ty, tz, rx_deg, ry_deg, rz_deg } =>
            cmd_transform(&input, &output, channels, [tx, ty, tz], [rx_deg, ry_deg, rz_deg]),
        Cmd::Path { input } => cmd_path(&input),
    }
}

// ---------- commands ----------

fn cmd_plane(spec: &PlaneSpec, output: &Path, seed: u64, channels: Channels) -> Result<()> {
    let t = t0();
    let cloud = build_plane(spec, &mut ChaCha8Rng::seed_from_u64(seed))?;
    lap(t, "plane");
    write_cloud(output, &cloud, channels)?;
    println!("plane: {} points -> {} (seed {})", cloud.len(), output.display(), seed);
    Ok(())
}

fn cmd_sphere(spec: &SphereSpec, output: &Path, seed: u64, channels: Channels) -> Result<()> {
    let t = t0();
    let cloud = build_sphere(spec, &mut ChaCha8Rng::seed_from_u64(seed))?;
    lap(t, "sphere");
    write_cloud(output, &cloud, channels)?;
    println!("sphere: {} points -> {} (seed {})", cloud.len(), output.display(), seed);
    Ok(())
}

fn cmd_batch(path: &Path) -> Result<()> {
    let manifest = Manifest::load(path)?;
    let base = resolve_seed(manifest.seed);
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    for (i, job) in manifest.jobs.iter().enumerate() {
        // job i draws from base + i
        let seed = base.wrapping_add(i as u64);
        let output = dir.join(job.output());
        let channels = layout(job.intensity());
        let res = match job {
            Job::Plane { spec, .. } => cmd_plane(spec, &output, seed, channels),
            Job::Sphere { spec, .. } => cmd_sphere(spec, &output, seed, channels),
        };
        res.with_context(|| format!("job #{i} ({})", job.output().display()))?;
    }
    println!("batch: {} jobs from {}", manifest.jobs.len(), path.display());
    Ok(())
}

fn cmd_info(input: &Path, channels: Channels) -> Result<()> {
    let cloud = read_cloud(input, channels)?;
    println!("points: {}  channels: {}", cloud.len(), channels.count());
    let (Some(b), Some(mean), Some(cov)) = (cloud.bounds(), cloud.centroid(), cloud.covariance()) else {
        return Ok(());
    };
    println!("bounds: min={:?} max={:?} extent={:?}", b.min, b.max, b.extent());
    println!("centroid: [{:.6}, {:.6}, {:.6}]", mean.x, mean.y, mean.z);
    println!("covariance:{}", cov);
    if let Some(col) = cloud.intensity() {
        let (lo, hi) = col.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        println!("intensity: [{lo:.6}, {hi:.6}]");
    }
    Ok(())
}

fn cmd_transform(input: &Path, output: &Path, channels: Channels, t: [f32; 3], r_deg: [f32; 3]) -> Result<()> {
    let cloud = read_cloud(input, channels)?;
    let rot = UnitQuaternion::from_euler_angles(
        r_deg[0].to_radians(), r_deg[1].to_radians(), r_deg[2].to_radians(),
    );
    let iso = Isometry3::from_parts(Translation3::new(t[0], t[1], t[2]), rot);
    let out = cloud.transformed(&iso);
    write_cloud(output, &out, channels)?;
    println!("transform: {} points -> {}", out.len(), output.display());
    Ok(())
}

fn cmd_path(input: &Path) -> Result<()> {
    let path = pcgen_io::read_path_bin(input).with_context(|| format!("read path {}", input.display()))?;
    println!("waypoints: {}", path.len());
    if let (Some(first), Some(last)) = (path.first(), path.last()) {
        println!("start: {:?}  goal: {:?}", first, last);
        println!("length: {:.4}", pcgen_core::path_length(&path));
    }
    Ok(())
}
