//! Per-snapshot conversion into camera records.

use crate::PipelineError;
use rayon::prelude::*;
use snap2scene_core::extrinsics;
use snap2scene_core::fov::FovSpec;
use snap2scene_core::math::{translation_part, Mat4, Real, Vec3};
use snap2scene_core::snapshot::{self, SnapshotMeta};
use snap2scene_core::CameraIntrinsics;
use std::path::{Path, PathBuf};

/// One converted snapshot: intrinsics plus the NeRF-convention pose.
#[derive(Debug, Clone)]
pub struct FrameRecord {
    /// Directory-qualified image path used in output records.
    pub file_path: String,
    pub intrinsics: CameraIntrinsics,
    /// Camera-to-world transform in the NeRF convention.
    pub cam_to_world: Mat4,
    /// Variance-of-Laplacian blur metric of the source image.
    pub sharpness: Real,
}

impl FrameRecord {
    /// Camera position in world coordinates.
    pub fn position(&self) -> Vec3 {
        translation_part(&self.cam_to_world)
    }
}

/// Convert a single `<base>_RGB.png` snapshot to a camera record.
///
/// Reads the image (for dimensions and sharpness) and its colocated
/// `_meta.json`, resolves the field of view (snapshot value wins over the
/// override) and converts the engine pose to the NeRF convention.
pub fn convert_frame(
    image_path: &Path,
    fov_override: Option<FovSpec>,
) -> Result<FrameRecord, PipelineError> {
    let meta_path = snapshot::meta_path_for_image(image_path)?;
    let meta = SnapshotMeta::load(&meta_path)?;

    let rgb = image::open(image_path)
        .map_err(|source| PipelineError::Image {
            path: image_path.display().to_string(),
            source,
        })?
        .into_rgb8();
    let (width, height) = rgb.dimensions();

    let fov = meta.fov(fov_override)?;
    let intrinsics = CameraIntrinsics::from_fov(fov, width, height)?;
    let cam_to_world = extrinsics::game_to_nerf_cam_to_world(&meta.cam_to_world()?);

    Ok(FrameRecord {
        file_path: snapshot::relative_file_path(image_path),
        intrinsics,
        cam_to_world,
        sharpness: snapshot::sharpness(&rgb),
    })
}

/// Convert a batch of snapshots in parallel.
///
/// Results come back in input order; the first failing file aborts the
/// whole batch.
pub fn convert_frames(
    image_paths: &[PathBuf],
    fov_override: Option<FovSpec>,
) -> Result<Vec<FrameRecord>, PipelineError> {
    if image_paths.is_empty() {
        return Err(PipelineError::EmptyBatch);
    }
    image_paths
        .par_iter()
        .map(|path| convert_frame(path, fov_override))
        .collect()
}
