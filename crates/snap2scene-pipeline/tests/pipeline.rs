//! End-to-end runs over synthetic snapshot directories.

use approx::assert_relative_eq;
use ndarray_npy::WriteNpyExt;
use snap2scene_core::formats::nerf::TransformsJson;
use snap2scene_core::formats::ply;
use snap2scene_core::fov::FovSpec;
use snap2scene_pipeline::cloud_batch::{self, CloudBatchConfig};
use snap2scene_pipeline::nerf_export::{self, NerfExportConfig};
use snap2scene_pipeline::{colmap_export, convert_frames};
use std::path::{Path, PathBuf};

/// Write `<base>_RGB.png` (with a vertical edge, so sharpness is nonzero)
/// and `<base>_meta.json` for a camera at `(x, 0, 0)` with identity
/// orientation.
fn write_snapshot(dir: &Path, base: &str, x: f64, fov_v: Option<f64>) -> PathBuf {
    let mut img = image::RgbImage::from_pixel(20, 20, image::Rgb([30, 30, 30]));
    for y in 0..20 {
        for px in 10..20 {
            img.put_pixel(px, y, image::Rgb([220, 220, 220]));
        }
    }
    let image_path = dir.join(format!("{base}_RGB.png"));
    img.save(&image_path).unwrap();

    let extrinsic = [
        1.0, 0.0, 0.0, x, //
        0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0,
    ];
    let mut meta = serde_json::json!({ "extrinsic_cam2world": extrinsic });
    if let Some(v) = fov_v {
        meta["fov_v_degrees"] = serde_json::json!(v);
    }
    std::fs::write(
        dir.join(format!("{base}_meta.json")),
        serde_json::to_string(&meta).unwrap(),
    )
    .unwrap();
    image_path
}

fn write_depth(dir: &Path, base: &str, value: f64) -> PathBuf {
    let arr = ndarray::Array2::<f64>::from_elem((20, 20), value);
    let path = dir.join(format!("{base}_depth.npy"));
    arr.write_npy(std::fs::File::create(&path).unwrap()).unwrap();
    path
}

#[test]
fn nerf_export_end_to_end() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("run1");
    std::fs::create_dir(&dir).unwrap();
    let images = vec![
        write_snapshot(&dir, "shot_0001", 0.0, Some(90.0)),
        write_snapshot(&dir, "shot_0002", 4.0, Some(90.0)),
    ];

    let records = convert_frames(&images, None).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].file_path, "run1/shot_0001_RGB.png");
    assert!(records[0].sharpness > 0.0);

    let out = tmp.path().join("transforms.json");
    nerf_export::export_transforms(&records, NerfExportConfig::default(), &out).unwrap();

    let parsed: TransformsJson =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(parsed.frames.len(), 2);
    assert_relative_eq!(parsed.camera_angle_y, 90.0f64.to_radians(), epsilon = 1e-9);
    assert_relative_eq!(parsed.fl_x, 10.0, epsilon = 1e-9);
    assert_eq!(parsed.k1, 0.0);
    // Camera positions 0 and 4 on X: centroid 2, std-dev 2 so the inverse
    // scale 0.5 is emitted and the recentered frames sit at x = -2 and 2.
    assert_relative_eq!(parsed.scale.unwrap(), 0.5, epsilon = 1e-9);
    assert_relative_eq!(parsed.frames[0].transform_matrix[0][3], -2.0, epsilon = 1e-9);
    assert_relative_eq!(parsed.frames[1].transform_matrix[0][3], 2.0, epsilon = 1e-9);
}

#[test]
fn fov_override_fills_missing_metadata() {
    let tmp = tempfile::tempdir().unwrap();
    let images = vec![write_snapshot(tmp.path(), "frame", 0.0, None)];

    assert!(convert_frames(&images, None).is_err());

    let records = convert_frames(&images, Some(FovSpec::vertical(60.0).unwrap())).unwrap();
    assert_relative_eq!(records[0].intrinsics.fov_v_degrees, 60.0);
}

#[test]
fn colmap_export_end_to_end() {
    let tmp = tempfile::tempdir().unwrap();
    let images = vec![
        write_snapshot(tmp.path(), "a", 0.0, Some(60.0)),
        write_snapshot(tmp.path(), "b", 1.0, Some(60.0)),
        write_snapshot(tmp.path(), "c", 2.0, Some(90.0)),
    ];
    let records = convert_frames(&images, None).unwrap();

    let out = tmp.path().join("sparse");
    colmap_export::export_model(&records, &out).unwrap();

    let cameras = std::fs::read_to_string(out.join("cameras.txt")).unwrap();
    assert!(cameras.contains("# Number of cameras: 2"));
    assert!(cameras.contains("1 SIMPLE_PINHOLE 20 20"));

    let images_txt = std::fs::read_to_string(out.join("images.txt")).unwrap();
    let lines: Vec<&str> = images_txt.lines().collect();
    // 4 header lines + 2 lines per image.
    assert_eq!(lines.len(), 10);
    assert!(lines[3].contains("Number of images: 3"));
    // Two 60-degree frames on camera 1, then the 90-degree frame on 2.
    let first: Vec<&str> = lines[4].split(' ').collect();
    assert_eq!(first[0], "1");
    assert_eq!(first[8], "1");
    assert!(first[9].ends_with("a_RGB.png"));
    let last: Vec<&str> = lines[8].split(' ').collect();
    assert_eq!(last[0], "3");
    assert_eq!(last[8], "2");
    assert!(last[9].ends_with("c_RGB.png"));

    assert_eq!(
        std::fs::read_to_string(out.join("points3D.txt")).unwrap(),
        ""
    );
    assert!(out.join("database.db").metadata().unwrap().len() > 0);
}

#[test]
fn cloud_export_end_to_end() {
    let tmp = tempfile::tempdir().unwrap();
    write_snapshot(tmp.path(), "d01", 0.0, Some(90.0));
    let depths = vec![write_depth(tmp.path(), "d01", 5.0)];

    let config = CloudBatchConfig {
        colored: true,
        ..Default::default()
    };
    let out = tmp.path().join("cloud.ply");
    cloud_batch::export_cloud(&depths, &config, &out).unwrap();

    let (points, colors) = ply::read_ply(&out).unwrap();
    assert_eq!(points.len(), 400);
    let colors = colors.unwrap();
    assert_eq!(colors.len(), 400);
    // The image's right half is bright.
    assert_eq!(colors[0], [30, 30, 30]);
    assert_eq!(colors[19], [220, 220, 220]);
    // Identity pose looking down +Y: every point sits at depth 5 forward.
    for p in &points {
        assert_relative_eq!(p.y, 5.0, epsilon = 1e-6);
    }
}

#[test]
fn cloud_subsample_and_distance_clip() {
    let tmp = tempfile::tempdir().unwrap();
    write_snapshot(tmp.path(), "d02", 0.0, Some(90.0));
    let depths = vec![write_depth(tmp.path(), "d02", 5.0)];

    let config = CloudBatchConfig {
        colored: false,
        subsample: 4,
        seed: Some(11),
        ..Default::default()
    };
    let merged = cloud_batch::load_merged_cloud(&depths, &config).unwrap();
    assert_eq!(merged.len(), 100);
    assert!(merged.colors.is_none());

    // A clip below the constant depth removes everything.
    let config = CloudBatchConfig {
        colored: false,
        max_distance: Some(4.0),
        ..Default::default()
    };
    let merged = cloud_batch::load_merged_cloud(&depths, &config).unwrap();
    assert!(merged.is_empty());
}
