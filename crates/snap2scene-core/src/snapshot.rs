//! Per-frame snapshot metadata and colocated-file conventions.
//!
//! A snapshot is a set of files sharing a base name:
//! `<base>_RGB.png`, `<base>_meta.json` (or `<base>_camera.json`) and
//! optionally `<base>_depth.npy`.

use crate::fov::{FovError, FovSpec};
use crate::math::{mat4_from_rows_3x4, Mat4, Real};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const IMAGE_SUFFIX: &str = "_RGB.png";
pub const META_SUFFIX: &str = "_meta.json";
pub const CAMERA_SUFFIX: &str = "_camera.json";
pub const DEPTH_SUFFIX: &str = "_depth.npy";

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("file name does not end with {expected}: {path}")]
    BadSuffix { expected: &'static str, path: String },
    #[error("missing companion file for {base}: tried {tried}")]
    MissingCompanion { base: String, tried: String },
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("malformed metadata json in {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
    #[error("extrinsic_cam2world must hold 12 values, got {0}")]
    BadExtrinsicShape(usize),
    #[error("no field of view: the metadata has neither fov_v_degrees nor fov_h_degrees and no override was given")]
    MissingFov,
    #[error(transparent)]
    Fov(#[from] FovError),
}

/// Camera metadata stored next to each snapshot image.
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotMeta {
    /// Row-major 3×4 camera-to-world transform in the engine convention.
    pub extrinsic_cam2world: Vec<Real>,
    pub fov_v_degrees: Option<Real>,
    pub fov_h_degrees: Option<Real>,
}

impl SnapshotMeta {
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let text = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| SnapshotError::Json {
            path: path.display().to_string(),
            source,
        })
    }

    /// The padded homogeneous camera-to-world transform.
    pub fn cam_to_world(&self) -> Result<Mat4, SnapshotError> {
        let rows: &[Real; 12] = self
            .extrinsic_cam2world
            .as_slice()
            .try_into()
            .map_err(|_| SnapshotError::BadExtrinsicShape(self.extrinsic_cam2world.len()))?;
        Ok(mat4_from_rows_3x4(rows))
    }

    /// The authoritative field of view of this frame.
    ///
    /// A value stored in the snapshot wins over the command-line override;
    /// the vertical axis wins if a snapshot carries both.
    pub fn fov(&self, fallback: Option<FovSpec>) -> Result<FovSpec, SnapshotError> {
        if let Some(v) = self.fov_v_degrees {
            return Ok(FovSpec::vertical(v)?);
        }
        if let Some(h) = self.fov_h_degrees {
            return Ok(FovSpec::horizontal(h)?);
        }
        fallback.ok_or(SnapshotError::MissingFov)
    }
}

/// Strip a known suffix from a snapshot file name, yielding the shared base
/// path.
pub fn base_path(path: &Path, suffix: &'static str) -> Result<PathBuf, SnapshotError> {
    let name = path.to_str().ok_or_else(|| SnapshotError::BadSuffix {
        expected: suffix,
        path: path.display().to_string(),
    })?;
    let base = name
        .strip_suffix(suffix)
        .ok_or_else(|| SnapshotError::BadSuffix {
            expected: suffix,
            path: path.display().to_string(),
        })?;
    Ok(PathBuf::from(base))
}

/// Metadata path colocated with an image: `<base>_meta.json`.
pub fn meta_path_for_image(image_path: &Path) -> Result<PathBuf, SnapshotError> {
    let base = base_path(image_path, IMAGE_SUFFIX)?;
    Ok(append_suffix(&base, META_SUFFIX))
}

/// Metadata path colocated with a depth map: `<base>_camera.json` if it
/// exists, else `<base>_meta.json`.
pub fn meta_path_for_depth(depth_path: &Path) -> Result<PathBuf, SnapshotError> {
    let base = base_path(depth_path, DEPTH_SUFFIX)?;
    let camera = append_suffix(&base, CAMERA_SUFFIX);
    if camera.is_file() {
        return Ok(camera);
    }
    let meta = append_suffix(&base, META_SUFFIX);
    if meta.is_file() {
        return Ok(meta);
    }
    Err(SnapshotError::MissingCompanion {
        base: base.display().to_string(),
        tried: format!("{} and {}", camera.display(), meta.display()),
    })
}

/// Color image path colocated with a depth map: `<base>_RGB.png`.
pub fn image_path_for_depth(depth_path: &Path) -> Result<PathBuf, SnapshotError> {
    let base = base_path(depth_path, DEPTH_SUFFIX)?;
    Ok(append_suffix(&base, IMAGE_SUFFIX))
}

fn append_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut name = base.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// Directory-qualified relative file path for output records:
/// the image's parent directory name joined with its file name.
pub fn relative_file_path(image_path: &Path) -> String {
    let file = image_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match image_path
        .parent()
        .and_then(Path::file_name)
        .map(|n| n.to_string_lossy())
    {
        Some(dir) if !dir.is_empty() => format!("{dir}/{file}"),
        _ => file,
    }
}

/// Variance of the 3×3 Laplacian over the grayscale image.
///
/// The standard blur metric from instant-ngp's colmap2nerf script; higher
/// means sharper. Informational only, carried into `transforms.json`.
pub fn sharpness(image: &image::RgbImage) -> Real {
    let gray = image::DynamicImage::ImageRgb8(image.clone()).into_luma8();
    let (w, h) = gray.dimensions();
    let (w, h) = (w as i64, h as i64);
    let at = |x: i64, y: i64| -> Real {
        // Reflect-101 border, matching OpenCV's default.
        let xr = reflect_101(x, w);
        let yr = reflect_101(y, h);
        gray.get_pixel(xr as u32, yr as u32).0[0] as Real
    };

    let n = (w * h) as Real;
    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    for y in 0..h {
        for x in 0..w {
            let lap = at(x - 1, y) + at(x + 1, y) + at(x, y - 1) + at(x, y + 1) - 4.0 * at(x, y);
            sum += lap;
            sum_sq += lap * lap;
        }
    }
    let mean = sum / n;
    sum_sq / n - mean * mean
}

fn reflect_101(i: i64, n: i64) -> i64 {
    if i < 0 {
        -i
    } else if i >= n {
        2 * n - 2 - i
    } else {
        i
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn suffix_pairing() {
        let meta = meta_path_for_image(Path::new("/data/run1/shot_0001_RGB.png")).unwrap();
        assert_eq!(meta, PathBuf::from("/data/run1/shot_0001_meta.json"));

        let rgb = image_path_for_depth(Path::new("/data/run1/shot_0001_depth.npy")).unwrap();
        assert_eq!(rgb, PathBuf::from("/data/run1/shot_0001_RGB.png"));

        assert!(matches!(
            meta_path_for_image(Path::new("/data/run1/shot_0001.png")),
            Err(SnapshotError::BadSuffix { .. })
        ));
    }

    #[test]
    fn camera_json_wins_over_meta_json_for_depth() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("frame_07");
        let depth = append_suffix(&base, DEPTH_SUFFIX);

        assert!(matches!(
            meta_path_for_depth(&depth),
            Err(SnapshotError::MissingCompanion { .. })
        ));

        std::fs::write(append_suffix(&base, META_SUFFIX), "{}").unwrap();
        assert_eq!(
            meta_path_for_depth(&depth).unwrap(),
            append_suffix(&base, META_SUFFIX)
        );

        std::fs::write(append_suffix(&base, CAMERA_SUFFIX), "{}").unwrap();
        assert_eq!(
            meta_path_for_depth(&depth).unwrap(),
            append_suffix(&base, CAMERA_SUFFIX)
        );
    }

    #[test]
    fn relative_path_is_directory_qualified() {
        assert_eq!(
            relative_file_path(Path::new("/snaps/witcher3/shot_0001_RGB.png")),
            "witcher3/shot_0001_RGB.png"
        );
    }

    #[test]
    fn fov_precedence() {
        let meta = SnapshotMeta {
            extrinsic_cam2world: vec![0.0; 12],
            fov_v_degrees: Some(55.0),
            fov_h_degrees: Some(70.0),
        };
        // Stored vertical value wins over both the stored horizontal and
        // any override.
        let fov = meta.fov(Some(FovSpec::Horizontal(100.0))).unwrap();
        assert_eq!(fov, FovSpec::Vertical(55.0));

        let meta = SnapshotMeta {
            extrinsic_cam2world: vec![0.0; 12],
            fov_v_degrees: None,
            fov_h_degrees: None,
        };
        assert_eq!(
            meta.fov(Some(FovSpec::Horizontal(100.0))).unwrap(),
            FovSpec::Horizontal(100.0)
        );
        assert!(matches!(meta.fov(None), Err(SnapshotError::MissingFov)));
    }

    #[test]
    fn extrinsic_shape_is_validated() {
        let meta = SnapshotMeta {
            extrinsic_cam2world: vec![0.0; 11],
            fov_v_degrees: None,
            fov_h_degrees: None,
        };
        assert!(matches!(
            meta.cam_to_world(),
            Err(SnapshotError::BadExtrinsicShape(11))
        ));
    }

    #[test]
    fn constant_image_has_zero_sharpness() {
        let img = image::RgbImage::from_pixel(16, 16, image::Rgb([90, 90, 90]));
        assert_relative_eq!(sharpness(&img), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn edges_increase_sharpness() {
        let mut img = image::RgbImage::from_pixel(16, 16, image::Rgb([0, 0, 0]));
        for y in 0..16 {
            for x in 8..16 {
                img.put_pixel(x, y, image::Rgb([255, 255, 255]));
            }
        }
        assert!(sharpness(&img) > 100.0);
    }
}
