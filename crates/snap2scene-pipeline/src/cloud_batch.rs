//! Depth-map batches unprojected and merged into one point cloud.

use crate::PipelineError;
use rayon::prelude::*;
use snap2scene_core::cloud::{MergedCloud, PointCloud};
use snap2scene_core::depth::{self, DepthMap};
use snap2scene_core::formats;
use snap2scene_core::fov::FovSpec;
use snap2scene_core::math::Real;
use snap2scene_core::snapshot::{self, SnapshotMeta};
use snap2scene_core::CameraIntrinsics;
use std::path::{Path, PathBuf};
use tracing::info;

/// Options for a depth-to-cloud run.
#[derive(Debug, Clone, Copy, Default)]
pub struct CloudBatchConfig {
    /// Load the colocated `_RGB.png` of every depth map.
    pub colored: bool,
    /// Drop points whose depth value is not below this bound.
    pub max_distance: Option<Real>,
    /// Keep roughly one point in `subsample` per file; 0 disables.
    pub subsample: usize,
    /// Field of view used for every frame, overriding stored values.
    ///
    /// Unlike the camera exports the override wins here: depth captures
    /// often carry stale FOV metadata from an earlier camera state.
    pub fov_override: Option<FovSpec>,
    /// Seed for the subsampling permutation; random when absent.
    pub seed: Option<u64>,
}

/// Unproject one depth file into a world-space cloud.
pub fn load_cloud(depth_path: &Path, config: &CloudBatchConfig) -> Result<PointCloud, PipelineError> {
    let map = DepthMap::from_npy_path(depth_path)?;
    let meta = SnapshotMeta::load(&snapshot::meta_path_for_depth(depth_path)?)?;

    let fov = match config.fov_override {
        Some(fov) => fov,
        None => meta.fov(None)?,
    };
    let intrinsics = CameraIntrinsics::from_fov(fov, map.width() as u32, map.height() as u32)?;
    let cam_to_world = meta.cam_to_world()?;

    let rgb = if config.colored {
        let image_path = snapshot::image_path_for_depth(depth_path)?;
        Some(
            image::open(&image_path)
                .map_err(|source| PipelineError::Image {
                    path: image_path.display().to_string(),
                    source,
                })?
                .into_rgb8(),
        )
    } else {
        None
    };

    let mut cloud = depth::unproject(
        &map,
        &intrinsics,
        &cam_to_world,
        rgb.as_ref(),
        config.max_distance,
    )?;
    cloud.random_subsample(config.subsample, config.seed);
    Ok(cloud)
}

/// Unproject every depth file in parallel and concatenate the results.
pub fn load_merged_cloud(
    depth_paths: &[PathBuf],
    config: &CloudBatchConfig,
) -> Result<MergedCloud, PipelineError> {
    if depth_paths.is_empty() {
        return Err(PipelineError::EmptyBatch);
    }
    let clouds: Vec<PointCloud> = depth_paths
        .par_iter()
        .map(|path| load_cloud(path, config))
        .collect::<Result<_, _>>()?;
    let merged = MergedCloud::from_clouds(&clouds);
    info!(
        files = depth_paths.len(),
        points = merged.len(),
        colored = merged.colors.is_some(),
        "merged clouds"
    );
    Ok(merged)
}

/// Load, merge and write to a `.ply`/`.pcd` picked by extension.
pub fn export_cloud(
    depth_paths: &[PathBuf],
    config: &CloudBatchConfig,
    out_path: &Path,
) -> Result<(), PipelineError> {
    let merged = load_merged_cloud(depth_paths, config)?;
    formats::write_cloud(out_path, &merged)?;
    info!(path = %out_path.display(), points = merged.len(), "wrote cloud");
    Ok(())
}
