//! Assemble frame records into a COLMAP sparse model.
//!
//! Frames sharing the same rounded field of view and resolution collapse
//! into one camera record; images are written grouped by camera, with ids
//! assigned sequentially in that order.

use crate::frames::FrameRecord;
use crate::PipelineError;
use snap2scene_core::extrinsics;
use snap2scene_core::formats::colmap::{self, ColmapCamera, ColmapImage};
use snap2scene_core::formats::colmap_db::{ColmapDatabase, SIMPLE_PINHOLE_MODEL_ID};
use snap2scene_core::math::{rotation_part, translation_part};
use snap2scene_core::SceneNormalization;
use std::path::Path;
use tracing::info;

/// Camera groups and per-camera image lists ready for the writers.
#[derive(Debug, Clone)]
pub struct ColmapModel {
    pub cameras: Vec<ColmapCamera>,
    /// Images ordered by camera group, then input order within a group.
    pub images: Vec<ColmapImage>,
}

/// Group frames into cameras and convert their poses to COLMAP
/// world-to-camera quaternion + translation records.
///
/// Poses are recentered on the camera centroid first; the scene scale is
/// computed for logging only and never applied.
pub fn build_model(records: &[FrameRecord]) -> Result<ColmapModel, PipelineError> {
    if records.is_empty() {
        return Err(PipelineError::EmptyBatch);
    }

    let positions: Vec<_> = records.iter().map(FrameRecord::position).collect();
    let norm = SceneNormalization::from_positions(&positions)?;
    info!(
        centroid = ?norm.centroid,
        scale = norm.scale,
        frames = records.len(),
        "normalized scene"
    );

    // First-seen order of distinct intrinsics keys fixes the camera ids.
    let mut cameras: Vec<ColmapCamera> = Vec::new();
    let mut grouped: Vec<Vec<&FrameRecord>> = Vec::new();
    for rec in records {
        let key = rec.intrinsics.group_key();
        match cameras
            .iter()
            .position(|cam| cam.intrinsics.group_key() == key)
        {
            Some(idx) => grouped[idx].push(rec),
            None => {
                cameras.push(ColmapCamera {
                    camera_id: cameras.len() as u32 + 1,
                    intrinsics: rec.intrinsics,
                });
                grouped.push(vec![rec]);
            }
        }
    }

    let mut images = Vec::with_capacity(records.len());
    let mut image_id = 1;
    for (cam, group) in cameras.iter().zip(&grouped) {
        for rec in group {
            let mut pose = rec.cam_to_world;
            norm.recenter(&mut pose);
            let w2c = extrinsics::nerf_to_colmap_world_to_cam(&pose)?;
            images.push(ColmapImage {
                image_id,
                qvec: extrinsics::rotation_to_quaternion(&rotation_part(&w2c)),
                tvec: translation_part(&w2c),
                camera_id: cam.camera_id,
                name: rec.file_path.clone(),
            });
            image_id += 1;
        }
    }

    Ok(ColmapModel { cameras, images })
}

/// Write the four model files (`cameras.txt`, `images.txt`, `points3D.txt`,
/// `database.db`) into `out_dir`, creating it if needed.
pub fn export_model(records: &[FrameRecord], out_dir: &Path) -> Result<(), PipelineError> {
    let model = build_model(records)?;
    std::fs::create_dir_all(out_dir).map_err(|source| PipelineError::Io {
        path: out_dir.display().to_string(),
        source,
    })?;

    colmap::write_cameras_txt(&out_dir.join("cameras.txt"), &model.cameras)?;
    colmap::write_images_txt(&out_dir.join("images.txt"), &model.images)?;
    colmap::write_points3d_txt(&out_dir.join("points3D.txt"))?;

    let db = ColmapDatabase::create(&out_dir.join("database.db"))?;
    for cam in &model.cameras {
        let k = &cam.intrinsics;
        db.add_camera(
            cam.camera_id,
            SIMPLE_PINHOLE_MODEL_ID,
            k.width,
            k.height,
            &[k.fl_x, k.cx, k.cy],
            true,
        )?;
    }
    for img in &model.images {
        db.add_image(img.image_id, &img.name, img.camera_id, img.qvec, img.tvec)?;
    }

    info!(
        path = %out_dir.display(),
        cameras = model.cameras.len(),
        images = model.images.len(),
        "wrote colmap model"
    );
    Ok(())
}
