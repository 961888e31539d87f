//! COLMAP SQLite `database.db` writer.
//!
//! Schema transcribed from COLMAP's reference `database.py`. Only cameras
//! and images are populated here; the feature tables are created empty so
//! COLMAP's own matching stages can fill them in later.

use crate::math::{Real, Vec3};
use rusqlite::{params, Connection};
use std::path::Path;

use super::FormatError;

/// COLMAP camera model id for SIMPLE_PINHOLE (`src/base/camera_models.h`).
pub const SIMPLE_PINHOLE_MODEL_ID: i64 = 0;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS cameras (
    camera_id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    model INTEGER NOT NULL,
    width INTEGER NOT NULL,
    height INTEGER NOT NULL,
    params BLOB,
    prior_focal_length INTEGER NOT NULL);

CREATE TABLE IF NOT EXISTS images (
    image_id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    name TEXT NOT NULL UNIQUE,
    camera_id INTEGER NOT NULL,
    prior_qw REAL,
    prior_qx REAL,
    prior_qy REAL,
    prior_qz REAL,
    prior_tx REAL,
    prior_ty REAL,
    prior_tz REAL,
    CONSTRAINT image_id_check CHECK(image_id >= 0 and image_id < 2147483647),
    FOREIGN KEY(camera_id) REFERENCES cameras(camera_id));

CREATE TABLE IF NOT EXISTS keypoints (
    image_id INTEGER PRIMARY KEY NOT NULL,
    rows INTEGER NOT NULL,
    cols INTEGER NOT NULL,
    data BLOB,
    FOREIGN KEY(image_id) REFERENCES images(image_id) ON DELETE CASCADE);

CREATE TABLE IF NOT EXISTS descriptors (
    image_id INTEGER PRIMARY KEY NOT NULL,
    rows INTEGER NOT NULL,
    cols INTEGER NOT NULL,
    data BLOB,
    FOREIGN KEY(image_id) REFERENCES images(image_id) ON DELETE CASCADE);

CREATE TABLE IF NOT EXISTS matches (
    pair_id INTEGER PRIMARY KEY NOT NULL,
    rows INTEGER NOT NULL,
    cols INTEGER NOT NULL,
    data BLOB);

CREATE TABLE IF NOT EXISTS two_view_geometries (
    pair_id INTEGER PRIMARY KEY NOT NULL,
    rows INTEGER NOT NULL,
    cols INTEGER NOT NULL,
    data BLOB,
    config INTEGER NOT NULL,
    F BLOB,
    E BLOB,
    H BLOB,
    qvec BLOB,
    tvec BLOB);
";

/// Handle over a COLMAP-compatible SQLite database.
pub struct ColmapDatabase {
    conn: Connection,
}

impl ColmapDatabase {
    /// Open (or create) the database at `path` and ensure all tables exist.
    pub fn create(path: &Path) -> Result<Self, FormatError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Insert a camera with an explicit id; `params` are stored as a
    /// little-endian f64 blob.
    pub fn add_camera(
        &self,
        camera_id: u32,
        model: i64,
        width: u32,
        height: u32,
        params: &[Real],
        prior_focal_length: bool,
    ) -> Result<(), FormatError> {
        let blob: Vec<u8> = params.iter().flat_map(|p| p.to_le_bytes()).collect();
        self.conn.execute(
            "INSERT INTO cameras (camera_id, model, width, height, params, prior_focal_length)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![camera_id, model, width, height, blob, prior_focal_length as i64],
        )?;
        Ok(())
    }

    /// Insert an image with its prior world-to-camera pose
    /// (quaternion `(w, x, y, z)` + translation).
    pub fn add_image(
        &self,
        image_id: u32,
        name: &str,
        camera_id: u32,
        qvec: [Real; 4],
        tvec: Vec3,
    ) -> Result<(), FormatError> {
        self.conn.execute(
            "INSERT INTO images
             (image_id, name, camera_id,
              prior_qw, prior_qx, prior_qy, prior_qz, prior_tx, prior_ty, prior_tz)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                image_id, name, camera_id, qvec[0], qvec[1], qvec[2], qvec[3], tvec.x, tvec.y,
                tvec.z
            ],
        )?;
        Ok(())
    }
}
