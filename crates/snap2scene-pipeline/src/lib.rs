//! Batch pipelines over per-frame game snapshots.
//!
//! Each pipeline maps independent snapshot files in parallel, aggregates
//! the per-frame results single-threaded (centroid/scale, camera grouping)
//! and hands them to the format writers in `snap2scene-core`. Any per-file
//! failure aborts the whole batch; there is no partial-success mode.

/// Parallel per-frame conversion to camera records.
pub mod frames;

/// NeRF `transforms.json` assembly.
pub mod nerf_export;

/// COLMAP text + database export.
pub mod colmap_export;

/// Depth-map batches merged into one point cloud.
pub mod cloud_batch;

mod error;

pub use error::PipelineError;
pub use frames::{convert_frame, convert_frames, FrameRecord};
