//! Core geometry and file formats for `snap2scene`.
//!
//! This crate contains:
//! - linear algebra type aliases (`Real`, `Vec3`, `Mat4`, ...),
//! - field-of-view and pinhole intrinsics conversions,
//! - extrinsics conversion between the game-engine convention
//!   (forward = +Y, up = +Z) and the NeRF/COLMAP conventions,
//! - depth-map unprojection into world-space point clouds,
//! - scene normalization (camera centroid and scale),
//! - writers for NeRF `transforms.json`, COLMAP text/database models
//!   and PLY/PCD point clouds.

/// Linear algebra type aliases and helpers.
pub mod math;

/// Field-of-view conversions and the normalized focal length.
pub mod fov;
/// Pinhole intrinsics and the camera-to-screen projection matrix.
pub mod intrinsics;
/// Camera pose conversion between coordinate conventions.
pub mod extrinsics;

/// Depth maps and unprojection to world space.
pub mod depth;
/// World-space point clouds.
pub mod cloud;
/// Scene centroid/scale normalization.
pub mod scene;
/// Per-frame snapshot metadata and file pairing.
pub mod snapshot;

/// Output format writers.
pub mod formats;

pub use cloud::{CloudColors, MergedCloud, PointCloud};
pub use extrinsics::ExtrinsicsError;
pub use fov::{FovError, FovSpec, ResolvedFov};
pub use intrinsics::CameraIntrinsics;
pub use math::{Mat3, Mat4, Real, Vec3, Vec4};
pub use scene::SceneNormalization;
pub use snapshot::SnapshotMeta;
