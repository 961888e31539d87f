//! Writers for the supported output formats.

use std::path::Path;
use thiserror::Error;

pub mod colmap;
pub mod colmap_db;
pub mod nerf;
pub mod pcd;
pub mod ply;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("unsupported point-cloud extension {extension:?} for {path} (expected .ply or .pcd)")]
    UnsupportedExtension { extension: String, path: String },
    #[error("PCD output requires per-point colors")]
    PcdRequiresColor,
    #[error("not a PLY file: {0}")]
    NotPly(String),
    #[error("malformed PLY at line {line}: {reason}")]
    MalformedPly { line: usize, reason: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// The closed set of point-cloud file formats, chosen by output extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloudFormat {
    Ply,
    Pcd,
}

impl CloudFormat {
    pub fn from_path(path: &Path) -> Result<Self, FormatError> {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "ply" => Ok(CloudFormat::Ply),
            "pcd" => Ok(CloudFormat::Pcd),
            _ => Err(FormatError::UnsupportedExtension {
                extension,
                path: path.display().to_string(),
            }),
        }
    }
}

/// Write a merged cloud to `path`, dispatching on the extension.
pub fn write_cloud(path: &Path, cloud: &crate::cloud::MergedCloud) -> Result<(), FormatError> {
    match CloudFormat::from_path(path)? {
        CloudFormat::Ply => ply::write_ply(path, &cloud.points, cloud.colors.as_ref()),
        CloudFormat::Pcd => pcd::write_pcd(path, &cloud.points, cloud.colors.as_ref()),
    }
}
