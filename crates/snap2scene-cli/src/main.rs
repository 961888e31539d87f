//! snap2scene CLI — convert game snapshot captures to reconstruction inputs.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use snap2scene_core::fov::FovSpec;
use snap2scene_pipeline::cloud_batch::{self, CloudBatchConfig};
use snap2scene_pipeline::nerf_export::{self, NerfExportConfig};
use snap2scene_pipeline::{colmap_export, convert_frames};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "snap2scene")]
#[command(about = "Convert game snapshots (RGB + camera metadata + depth) to NeRF, COLMAP and point-cloud outputs")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a NeRF transforms.json for a set of snapshot images.
    Nerf(NerfArgs),

    /// Write a COLMAP sparse model (text files + database.db).
    Colmap(ColmapArgs),

    /// Unproject depth maps into a merged point cloud (.ply / .pcd).
    Cloud(CloudArgs),
}

/// Field-of-view flags shared by every subcommand. At most one axis may be
/// given; a value stored in a snapshot takes precedence for the camera
/// exports.
#[derive(Debug, Clone, Copy, Args)]
struct FovArgs {
    /// Vertical field of view in degrees, for snapshots without one.
    #[arg(long = "fovv")]
    fov_degrees_vertical: Option<f64>,

    /// Horizontal field of view in degrees, for snapshots without one.
    #[arg(long = "fovh")]
    fov_degrees_horizontal: Option<f64>,
}

impl FovArgs {
    fn to_spec(self) -> Result<Option<FovSpec>> {
        match (self.fov_degrees_vertical, self.fov_degrees_horizontal) {
            (Some(_), Some(_)) => bail!("give either --fovv or --fovh, not both"),
            (Some(v), None) => Ok(Some(FovSpec::vertical(v)?)),
            (None, Some(h)) => Ok(Some(FovSpec::horizontal(h)?)),
            (None, None) => Ok(None),
        }
    }
}

#[derive(Debug, Args)]
struct NerfArgs {
    /// Snapshot images (`*_RGB.png`); glob patterns are expanded.
    #[arg(required = true)]
    imagefiles: Vec<String>,

    #[command(flatten)]
    fov: FovArgs,

    /// NeRF scene bound hint; must be a power of two, larger for scenes
    /// with distant background.
    #[arg(long, default_value_t = 4)]
    aabb_scale: u32,

    /// Output JSON path.
    #[arg(short, long, default_value = "transforms.json")]
    out: PathBuf,
}

#[derive(Debug, Args)]
struct ColmapArgs {
    /// Snapshot images (`*_RGB.png`); glob patterns are expanded.
    #[arg(short, long = "imagefiles", required = true, num_args = 1..)]
    imagefiles: Vec<String>,

    #[command(flatten)]
    fov: FovArgs,

    /// Folder receiving cameras.txt, images.txt, points3D.txt and
    /// database.db.
    #[arg(short, long)]
    output_folder: PathBuf,
}

#[derive(Debug, Args)]
struct CloudArgs {
    /// Depth maps (`*_depth.npy`); glob patterns are expanded.
    #[arg(required = true)]
    depth_files: Vec<String>,

    /// Drop points at or beyond this depth.
    #[arg(long = "max")]
    max_distance: Option<f64>,

    /// Keep roughly one point in N per depth map (0 disables).
    #[arg(long = "ss", default_value_t = 0)]
    subsample: usize,

    /// Snapshots have no color images; write positions only.
    #[arg(long = "nc")]
    no_color: bool,

    /// Seed for the subsampling permutation (random when omitted).
    #[arg(long)]
    seed: Option<u64>,

    #[command(flatten)]
    fov: FovArgs,

    /// Output cloud path; the extension picks the format (.ply / .pcd).
    #[arg(short, long)]
    out: PathBuf,
}

/// Expand glob patterns among the inputs and return the sorted file list.
///
/// A literal path that exists is taken as-is even if it contains wildcard
/// characters; anything else with `*` or `?` goes through glob and must
/// match at least one file.
fn expand_files(inputs: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        let path = PathBuf::from(input);
        if !path.exists() && (input.contains('*') || input.contains('?')) {
            let mut matched = 0;
            for entry in glob::glob(input).with_context(|| format!("bad pattern: {input}"))? {
                files.push(entry?);
                matched += 1;
            }
            if matched == 0 {
                bail!("pattern matched no files: {input}");
            }
        } else {
            files.push(path);
        }
    }
    files.sort();
    for file in &files {
        if !file.is_file() {
            bail!("not a file: {}", file.display());
        }
    }
    Ok(files)
}

fn run_nerf(args: &NerfArgs) -> Result<()> {
    let images = expand_files(&args.imagefiles)?;
    tracing::info!("converting {} snapshots", images.len());
    let records = convert_frames(&images, args.fov.to_spec()?)?;
    let config = NerfExportConfig {
        aabb_scale: args.aabb_scale,
    };
    nerf_export::export_transforms(&records, config, &args.out)?;
    Ok(())
}

fn run_colmap(args: &ColmapArgs) -> Result<()> {
    let images = expand_files(&args.imagefiles)?;
    tracing::info!("converting {} snapshots", images.len());
    let records = convert_frames(&images, args.fov.to_spec()?)?;
    colmap_export::export_model(&records, &args.output_folder)?;
    Ok(())
}

fn run_cloud(args: &CloudArgs) -> Result<()> {
    let depths = expand_files(&args.depth_files)?;
    tracing::info!("unprojecting {} depth maps", depths.len());
    let config = CloudBatchConfig {
        colored: !args.no_color,
        max_distance: args.max_distance,
        subsample: args.subsample,
        fov_override: args.fov.to_spec()?,
        seed: args.seed,
    };
    cloud_batch::export_cloud(&depths, &config, &args.out)?;
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match &cli.command {
        Commands::Nerf(args) => run_nerf(args),
        Commands::Colmap(args) => run_colmap(args),
        Commands::Cloud(args) => run_cloud(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_conflicting_fov_flags() {
        let both = FovArgs {
            fov_degrees_vertical: Some(60.0),
            fov_degrees_horizontal: Some(90.0),
        };
        assert!(both.to_spec().is_err());

        let one = FovArgs {
            fov_degrees_vertical: None,
            fov_degrees_horizontal: Some(90.0),
        };
        assert_eq!(one.to_spec().unwrap(), Some(FovSpec::Horizontal(90.0)));
    }

    #[test]
    fn expand_files_globs_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b_RGB.png", "a_RGB.png", "c_meta.json"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        let pattern = dir.path().join("*_RGB.png").display().to_string();
        let files = expand_files(&[pattern]).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("a_RGB.png"));
        assert!(files[1].ends_with("b_RGB.png"));
    }

    #[test]
    fn expand_files_keeps_existing_literal_paths() {
        let dir = tempfile::tempdir().unwrap();
        let literal = dir.path().join("shot_0001_RGB.png");
        std::fs::write(&literal, b"x").unwrap();
        let files = expand_files(&[literal.display().to_string()]).unwrap();
        assert_eq!(files, vec![literal]);
    }

    #[test]
    fn expand_files_rejects_dead_patterns_and_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let pattern = dir.path().join("*_RGB.png").display().to_string();
        assert!(expand_files(&[pattern]).is_err());
        let missing = dir.path().join("nope.png").display().to_string();
        assert!(expand_files(&[missing]).is_err());
    }
}
