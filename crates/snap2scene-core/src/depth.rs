//! Depth maps and unprojection into world space.
//!
//! Each depth cell stores the distance along the camera's forward axis
//! (not the Euclidean ray length), so a depth-scaled screen coordinate
//! `(x_px * d, y_px * d, d, 1)` multiplied by the inverse of
//! intrinsics × world-to-camera recovers the world position directly.

use crate::cloud::{CloudColors, PointCloud};
use crate::intrinsics::CameraIntrinsics;
use crate::math::{Mat4, Real, Vec4};
use ndarray::Array2;
use ndarray_npy::ReadNpyExt;
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DepthError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("{path}: not a 2-D float32/float64 npy array: {reason}")]
    BadArray { path: String, reason: String },
    #[error("depth map {width}x{height} is too small, need both dimensions > 9")]
    TooSmall { width: usize, height: usize },
    #[error("unsupported depth file extension (expected .npy): {0}")]
    UnsupportedExtension(String),
    #[error("color image is {color_width}x{color_height} but depth is {width}x{height}")]
    ColorSizeMismatch {
        color_width: u32,
        color_height: u32,
        width: u32,
        height: u32,
    },
    #[error("world-to-screen transform is singular and cannot be inverted")]
    SingularTransform,
}

/// A dense 2-D depth map in row-major order.
#[derive(Debug, Clone)]
pub struct DepthMap {
    data: Vec<Real>,
    width: usize,
    height: usize,
}

impl DepthMap {
    /// Wrap a row-major buffer; `data.len()` must equal `width * height`
    /// and both dimensions must exceed 9.
    pub fn new(data: Vec<Real>, width: usize, height: usize) -> Result<Self, DepthError> {
        if width.min(height) <= 9 {
            return Err(DepthError::TooSmall { width, height });
        }
        assert_eq!(data.len(), width * height);
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Load a `.npy` depth file (float32 or float64, 2-D).
    pub fn from_npy_path(path: &Path) -> Result<Self, DepthError> {
        let display = path.display().to_string();
        match path.extension().and_then(|e| e.to_str()) {
            Some("npy") => {}
            other => {
                return Err(DepthError::UnsupportedExtension(
                    other.unwrap_or("").to_string(),
                ))
            }
        }
        let bytes = std::fs::read(path).map_err(|source| DepthError::Io {
            path: display.clone(),
            source,
        })?;

        let array: Array2<Real> = match Array2::<f64>::read_npy(Cursor::new(&bytes)) {
            Ok(a) => a,
            Err(_) => Array2::<f32>::read_npy(Cursor::new(&bytes))
                .map(|a| a.mapv(Real::from))
                .map_err(|e| DepthError::BadArray {
                    path: display,
                    reason: e.to_string(),
                })?,
        };

        let (height, width) = array.dim();
        // Array2 iterates row-major regardless of storage order.
        Self::new(array.into_iter().collect(), width, height)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Depth at pixel `(x, y)`.
    pub fn at(&self, x: usize, y: usize) -> Real {
        self.data[y * self.width + x]
    }

    /// Depth-scaled homogeneous screen coordinates, one column per pixel,
    /// with the matching pixel coordinates in the same row-major order.
    ///
    /// Columns are `(x_px * d, y_px * d, d, 1)`, ready for multiplication
    /// by an inverted intrinsics × world-to-camera matrix.
    pub fn screen_columns(&self) -> (Vec<Vec4>, Vec<[u32; 2]>) {
        let mut columns = Vec::with_capacity(self.data.len());
        let mut pixels = Vec::with_capacity(self.data.len());
        for y in 0..self.height {
            for x in 0..self.width {
                let d = self.at(x, y);
                columns.push(Vec4::new(x as Real * d, y as Real * d, d, 1.0));
                pixels.push([x as u32, y as u32]);
            }
        }
        (columns, pixels)
    }
}

/// Unproject a depth map into a world-space point cloud.
///
/// `cam_to_world` is the padded engine-convention pose straight from the
/// snapshot; the screen transform is `intrinsics × inverse(cam_to_world)`.
/// An optional color image must match the depth dimensions; colors, pixel
/// coordinates and points come out index-aligned. Points at or beyond
/// `max_distance` (by depth value) are dropped from all three sequences.
pub fn unproject(
    depth: &DepthMap,
    intrinsics: &CameraIntrinsics,
    cam_to_world: &Mat4,
    colors: Option<&image::RgbImage>,
    max_distance: Option<Real>,
) -> Result<PointCloud, DepthError> {
    let (width, height) = (depth.width() as u32, depth.height() as u32);
    if let Some(rgb) = colors {
        if rgb.dimensions() != (width, height) {
            return Err(DepthError::ColorSizeMismatch {
                color_width: rgb.width(),
                color_height: rgb.height(),
                width,
                height,
            });
        }
    }

    let world_to_cam = cam_to_world
        .try_inverse()
        .ok_or(DepthError::SingularTransform)?;
    let world_to_screen = intrinsics.camera_to_screen() * world_to_cam;
    let screen_to_world = world_to_screen
        .try_inverse()
        .ok_or(DepthError::SingularTransform)?;

    let (columns, pixel_coords) = depth.screen_columns();

    let mut points = Vec::new();
    let mut pixels = Vec::new();
    let mut rgb8 = colors.map(|_| Vec::new());
    for (column, pixel) in columns.into_iter().zip(pixel_coords) {
        let d = column.z;
        if let Some(max) = max_distance {
            if !(d < max) {
                continue;
            }
        }
        let world = screen_to_world * column;
        points.push(world.xyz());
        pixels.push(pixel);
        if let (Some(out), Some(rgb)) = (&mut rgb8, colors) {
            out.push(rgb.get_pixel(pixel[0], pixel[1]).0);
        }
    }

    Ok(PointCloud {
        points,
        colors: rgb8.map(CloudColors::Rgb8),
        pixels,
        width,
        height,
        world_to_screen,
    })
}
