//! Scene centroid and scale from the set of camera positions.

use crate::math::{Mat4, Real, Vec3};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("cannot normalize a scene with no camera positions")]
    NoPositions,
}

/// How close a computed scale must be to 1.0 before it is treated as an
/// already-normalized scene.
const SCALE_SNAP_TOLERANCE: Real = 0.3;

/// Scales within this distance of 1.0 are not worth emitting.
const SCALE_EMIT_TOLERANCE: Real = 0.01;

/// Centroid and scale of a scene's camera positions.
///
/// Recentring applies to camera extrinsics only; unprojected point-cloud
/// coordinates stay in original world units (downstream viewers expect
/// cameras and recentering together, not clouds).
#[derive(Debug, Clone, Copy)]
pub struct SceneNormalization {
    /// Arithmetic mean of the camera positions.
    pub centroid: Vec3,
    /// Maximum per-axis standard deviation, snapped to 1.0 when within 0.3.
    pub scale: Real,
}

impl SceneNormalization {
    pub fn from_positions(positions: &[Vec3]) -> Result<Self, SceneError> {
        if positions.is_empty() {
            return Err(SceneError::NoPositions);
        }
        let n = positions.len() as Real;
        let centroid = positions.iter().sum::<Vec3>() / n;

        let mut variance = Vec3::zeros();
        for p in positions {
            let d = p - centroid;
            variance += d.component_mul(&d);
        }
        variance /= n;
        let mut scale = variance.map(Real::sqrt).max();
        if (scale - 1.0).abs() < SCALE_SNAP_TOLERANCE {
            scale = 1.0;
        }

        Ok(Self { centroid, scale })
    }

    /// Subtract the centroid from a camera-to-world translation column.
    pub fn recenter(&self, cam_to_world: &mut Mat4) {
        for (axis, c) in self.centroid.iter().enumerate() {
            cam_to_world[(axis, 3)] -= c;
        }
    }

    /// `1 / scale` when the scale is worth emitting, `None` when it is
    /// within 0.01 of 1.0.
    pub fn inverse_scale(&self) -> Option<Real> {
        if (self.scale - 1.0).abs() > SCALE_EMIT_TOLERANCE {
            Some(1.0 / self.scale)
        } else {
            None
        }
    }
}
