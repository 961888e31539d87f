//! ASCII PCD point-cloud writer.
//!
//! PCD packs color into a single field: the three 8-bit channels become
//! one unsigned integer `r << 16 | g << 8 | b`. Colorless output is not
//! supported.

use crate::cloud::CloudColors;
use crate::math::Vec3;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::FormatError;

/// Pack 8-bit RGB channels into the 24-bit PCD color integer.
pub fn packed_color([r, g, b]: [u8; 3]) -> u32 {
    (r as u32) << 16 | (g as u32) << 8 | b as u32
}

/// Write points and colors as an ASCII PCD v.7 file.
pub fn write_pcd(
    path: &Path,
    points: &[Vec3],
    colors: Option<&CloudColors>,
) -> Result<(), FormatError> {
    let colors = colors.ok_or(FormatError::PcdRequiresColor)?;
    let mut out = BufWriter::new(std::fs::File::create(path)?);
    writeln!(out, "VERSION .7")?;
    writeln!(out, "FIELDS x y z rgb")?;
    writeln!(out, "SIZE 4 4 4 4")?;
    writeln!(out, "TYPE F F F U")?;
    writeln!(out, "COUNT 1 1 1 1")?;
    writeln!(out, "WIDTH {}", points.len())?;
    writeln!(out, "HEIGHT 1")?;
    writeln!(out, "POINTS {}", points.len())?;
    writeln!(out, "DATA ascii")?;
    for (i, p) in points.iter().enumerate() {
        writeln!(out, "{} {} {} {}", p.x, p.y, p.z, packed_color(colors.rgb8(i)))?;
    }
    Ok(())
}
