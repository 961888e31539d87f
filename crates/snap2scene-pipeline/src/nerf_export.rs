//! Assemble frame records into a NeRF `transforms.json`.

use crate::frames::FrameRecord;
use crate::PipelineError;
use snap2scene_core::formats::nerf::{self, TransformFrame, TransformsJson};
use snap2scene_core::math::Real;
use snap2scene_core::SceneNormalization;
use std::path::Path;
use tracing::info;

/// Knobs that do not come from the snapshots themselves.
#[derive(Debug, Clone, Copy)]
pub struct NerfExportConfig {
    /// Scene bounding-box hint written verbatim into the output.
    pub aabb_scale: u32,
}

impl Default for NerfExportConfig {
    fn default() -> Self {
        Self { aabb_scale: 4 }
    }
}

/// Build the `transforms.json` document for a converted batch.
///
/// Intrinsics are averaged across frames; the single shared camera model
/// is only meaningful when every snapshot used the same field of view and
/// resolution. Poses are recentered on the camera centroid and the inverse
/// scene scale is recorded when it differs from 1.0.
pub fn build_transforms(
    records: &[FrameRecord],
    config: NerfExportConfig,
) -> Result<TransformsJson, PipelineError> {
    if records.is_empty() {
        return Err(PipelineError::EmptyBatch);
    }
    let n = records.len() as Real;

    let mut camera_angle_x = 0.0;
    let mut camera_angle_y = 0.0;
    let mut fl_x = 0.0;
    let mut fl_y = 0.0;
    let mut cx = 0.0;
    let mut cy = 0.0;
    let mut w = 0.0;
    let mut h = 0.0;
    for rec in records {
        let k = &rec.intrinsics;
        camera_angle_x += k.fov_h_degrees.to_radians();
        camera_angle_y += k.fov_v_degrees.to_radians();
        fl_x += k.fl_x;
        fl_y += k.fl_y;
        cx += k.cx;
        cy += k.cy;
        w += k.width as Real;
        h += k.height as Real;
    }

    let positions: Vec<_> = records.iter().map(FrameRecord::position).collect();
    let norm = SceneNormalization::from_positions(&positions)?;
    info!(
        centroid = ?norm.centroid,
        scale = norm.scale,
        frames = records.len(),
        "normalized scene"
    );

    let frames = records
        .iter()
        .map(|rec| {
            let mut pose = rec.cam_to_world;
            norm.recenter(&mut pose);
            TransformFrame {
                file_path: rec.file_path.clone(),
                sharpness: rec.sharpness,
                transform_matrix: nerf::matrix_rows(&pose),
            }
        })
        .collect();

    Ok(TransformsJson {
        camera_angle_x: camera_angle_x / n,
        camera_angle_y: camera_angle_y / n,
        fl_x: fl_x / n,
        fl_y: fl_y / n,
        k1: 0.0,
        k2: 0.0,
        p1: 0.0,
        p2: 0.0,
        cx: cx / n,
        cy: cy / n,
        w: w / n,
        h: h / n,
        scale: norm.inverse_scale(),
        aabb_scale: config.aabb_scale,
        frames,
    })
}

/// Convert and write in one go; the common CLI path.
pub fn export_transforms(
    records: &[FrameRecord],
    config: NerfExportConfig,
    out_path: &Path,
) -> Result<(), PipelineError> {
    let transforms = build_transforms(records, config)?;
    nerf::write_transforms(out_path, &transforms)?;
    info!(path = %out_path.display(), frames = transforms.frames.len(), "wrote transforms");
    Ok(())
}
