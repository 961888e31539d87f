use snap2scene_core::depth::DepthError;
use snap2scene_core::extrinsics::ExtrinsicsError;
use snap2scene_core::formats::FormatError;
use snap2scene_core::intrinsics::IntrinsicsError;
use snap2scene_core::scene::SceneError;
use snap2scene_core::snapshot::SnapshotError;
use thiserror::Error;

/// Any failure while converting a snapshot batch.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no input files")]
    EmptyBatch,
    #[error("{path}: {source}")]
    Image {
        path: String,
        source: image::ImageError,
    },
    #[error("failed to create {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error(transparent)]
    Intrinsics(#[from] IntrinsicsError),
    #[error(transparent)]
    Extrinsics(#[from] ExtrinsicsError),
    #[error(transparent)]
    Depth(#[from] DepthError),
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error(transparent)]
    Format(#[from] FormatError),
}
