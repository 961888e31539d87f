//! COLMAP sparse-model text files (`cameras.txt`, `images.txt`,
//! `points3D.txt`).
//!
//! Layout reference: <https://colmap.github.io/format.html>. This pipeline
//! computes no 2D-3D correspondences, so every image's observation line is
//! empty and `points3D.txt` holds no records.

use crate::intrinsics::CameraIntrinsics;
use crate::math::{Real, Vec3};
use std::io::{BufWriter, Write};
use std::path::Path;

use super::FormatError;

/// One distinct intrinsics group, shared by all frames with the same
/// rounded FOV and dimensions.
#[derive(Debug, Clone)]
pub struct ColmapCamera {
    /// 1-based camera id.
    pub camera_id: u32,
    pub intrinsics: CameraIntrinsics,
}

/// One registered image: a world-to-camera pose plus its camera reference.
#[derive(Debug, Clone)]
pub struct ColmapImage {
    /// 1-based image id.
    pub image_id: u32,
    /// World-to-camera rotation as `(w, x, y, z)`.
    pub qvec: [Real; 4],
    /// World-to-camera translation.
    pub tvec: Vec3,
    pub camera_id: u32,
    /// Directory-qualified image file name.
    pub name: String,
}

/// Write `cameras.txt`: one SIMPLE_PINHOLE line per intrinsics group.
pub fn write_cameras_txt(path: &Path, cameras: &[ColmapCamera]) -> Result<(), FormatError> {
    let mut out = BufWriter::new(std::fs::File::create(path)?);
    writeln!(out, "# Camera list with one line of data per camera:")?;
    writeln!(out, "#   CAMERA_ID, MODEL, WIDTH, HEIGHT, PARAMS[]")?;
    writeln!(out, "# Number of cameras: {}", cameras.len())?;
    for cam in cameras {
        let k = &cam.intrinsics;
        writeln!(
            out,
            "{} SIMPLE_PINHOLE {} {} {} {} {}",
            cam.camera_id, k.width, k.height, k.fl_x, k.cx, k.cy
        )?;
    }
    Ok(())
}

/// Write `images.txt`: two lines per image, the second (observations)
/// always empty.
pub fn write_images_txt(path: &Path, images: &[ColmapImage]) -> Result<(), FormatError> {
    let mut out = BufWriter::new(std::fs::File::create(path)?);
    writeln!(out, "# Image list with two lines of data per image:")?;
    writeln!(
        out,
        "#   IMAGE_ID, QW, QX, QY, QZ, TX, TY, TZ, CAMERA_ID, NAME"
    )?;
    writeln!(out, "#   POINTS2D[] as (X, Y, POINT3D_ID)")?;
    writeln!(
        out,
        "# Number of images: {}, mean observations per image: 0",
        images.len()
    )?;
    for img in images {
        writeln!(
            out,
            "{} {} {} {} {} {} {} {} {} {}",
            img.image_id,
            img.qvec[0],
            img.qvec[1],
            img.qvec[2],
            img.qvec[3],
            img.tvec.x,
            img.tvec.y,
            img.tvec.z,
            img.camera_id,
            img.name
        )?;
        writeln!(out)?;
    }
    Ok(())
}

/// Write an empty `points3D.txt`: no triangulated points exist.
pub fn write_points3d_txt(path: &Path) -> Result<(), FormatError> {
    std::fs::File::create(path)?;
    Ok(())
}
