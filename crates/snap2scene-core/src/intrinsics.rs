//! Pinhole camera intrinsics derived from a field of view.

use crate::fov::{self, FovError, FovSpec};
use crate::math::{Mat4, Real};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IntrinsicsError {
    #[error(transparent)]
    Fov(#[from] FovError),
    #[error("image dimensions must be positive, got {width}x{height}")]
    EmptyImage { width: u32, height: u32 },
}

/// Pinhole intrinsics of one frame, immutable once derived.
///
/// The focal length is isotropic: the per-axis normalized focal lengths are
/// combined by geometric mean and scaled by the geometric mean of the screen
/// dimensions, so `fl_x == fl_y` always holds. The principal point sits at
/// the image center.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CameraIntrinsics {
    /// Vertical field of view in degrees.
    pub fov_v_degrees: Real,
    /// Horizontal field of view in degrees.
    pub fov_h_degrees: Real,
    /// Focal length along X in pixels.
    pub fl_x: Real,
    /// Focal length along Y in pixels.
    pub fl_y: Real,
    /// Principal point X (pixels) = width / 2.
    pub cx: Real,
    /// Principal point Y (pixels) = height / 2.
    pub cy: Real,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
}

impl CameraIntrinsics {
    /// Derive full intrinsics from one authoritative field of view and the
    /// screen dimensions.
    pub fn from_fov(fov: FovSpec, width: u32, height: u32) -> Result<Self, IntrinsicsError> {
        if width == 0 || height == 0 {
            return Err(IntrinsicsError::EmptyImage { width, height });
        }
        let (w, h) = (width as Real, height as Real);
        let resolved = fov.resolve(w / h);

        let fx = fov::focal_length_per_pixel(resolved.horizontal_degrees);
        let fy = fov::focal_length_per_pixel(resolved.vertical_degrees);
        let focal_pixels = (w * h).sqrt() * (fx * fy).sqrt();

        Ok(Self {
            fov_v_degrees: resolved.vertical_degrees,
            fov_h_degrees: resolved.horizontal_degrees,
            fl_x: focal_pixels,
            fl_y: focal_pixels,
            cx: w / 2.0,
            cy: h / 2.0,
            width,
            height,
        })
    }

    /// Camera-to-screen projection matrix in the game-engine camera basis
    /// (+X right, +Y forward/depth, +Z up).
    ///
    /// Applied to a camera-space point `(x, y, z, 1)` it yields the
    /// depth-scaled screen coordinates `(x_px * d, y_px * d, d, 1)` with
    /// `d = y`. The layout is paired with [`crate::depth`]'s screen column
    /// vectors; the two must invert consistently:
    ///
    /// ```text
    /// | f  cx   0  0 |      x_px = f * x / d + cx
    /// | 0  cy  -f  0 |      y_px = cy - f * z / d   (screen Y grows downward)
    /// | 0   1   0  0 |      d    = y
    /// | 0   0   0  1 |
    /// ```
    pub fn camera_to_screen(&self) -> Mat4 {
        let f = self.fl_x;
        #[rustfmt::skip]
        let m = Mat4::new(
            f,   self.cx, 0.0, 0.0,
            0.0, self.cy, -f,  0.0,
            0.0, 1.0,     0.0, 0.0,
            0.0, 0.0,     0.0, 1.0,
        );
        m
    }

    /// Grouping key for COLMAP camera records: frames whose rounded vertical
    /// FOV (milli-degrees) and dimensions match share one camera.
    pub fn group_key(&self) -> (i64, u32, u32) {
        (
            (self.fov_v_degrees * 1000.0).round() as i64,
            self.width,
            self.height,
        )
    }
}
