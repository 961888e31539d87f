//! NeRF `transforms.json` schema.
//!
//! One shared camera model (intrinsics averaged across frames — valid only
//! when every frame was taken with the same field of view) plus a list of
//! per-frame poses in the NeRF convention.

use crate::math::{Mat4, Real};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::FormatError;

/// The top-level `transforms.json` object consumed by NeRF trainers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformsJson {
    /// Horizontal field of view in radians.
    pub camera_angle_x: Real,
    /// Vertical field of view in radians.
    pub camera_angle_y: Real,
    pub fl_x: Real,
    pub fl_y: Real,
    /// Distortion coefficients, always zero for a pinhole source.
    pub k1: Real,
    pub k2: Real,
    pub p1: Real,
    pub p2: Real,
    pub cx: Real,
    pub cy: Real,
    /// Mean image width (fractional if sources disagree).
    pub w: Real,
    /// Mean image height.
    pub h: Real,
    /// Inverse scene scale; omitted when the scene is already near unit
    /// scale.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<Real>,
    /// Scene bounding-box scale hint (power of two).
    pub aabb_scale: u32,
    pub frames: Vec<TransformFrame>,
}

/// One camera pose entry in `transforms.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformFrame {
    /// Directory-qualified image path.
    pub file_path: String,
    /// Variance-of-Laplacian blur metric.
    pub sharpness: Real,
    /// Camera-to-world transform (NeRF convention), row-major rows.
    pub transform_matrix: [[Real; 4]; 4],
}

/// Convert a homogeneous transform into nested row-major JSON arrays.
pub fn matrix_rows(m: &Mat4) -> [[Real; 4]; 4] {
    let mut rows = [[0.0; 4]; 4];
    for (r, row) in rows.iter_mut().enumerate() {
        for (c, v) in row.iter_mut().enumerate() {
            *v = m[(r, c)];
        }
    }
    rows
}

pub fn write_transforms(path: &Path, transforms: &TransformsJson) -> Result<(), FormatError> {
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(file, transforms)?;
    Ok(())
}
