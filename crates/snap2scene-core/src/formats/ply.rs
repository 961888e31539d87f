//! ASCII PLY point-cloud writer and a minimal reader.

use crate::cloud::CloudColors;
use crate::math::{Real, Vec3};
use std::io::{BufWriter, Write};
use std::path::Path;

use super::FormatError;

/// Write points (and optional colors as uint8 red/green/blue properties)
/// as ASCII PLY.
pub fn write_ply(
    path: &Path,
    points: &[Vec3],
    colors: Option<&CloudColors>,
) -> Result<(), FormatError> {
    let mut out = BufWriter::new(std::fs::File::create(path)?);
    writeln!(out, "ply")?;
    writeln!(out, "format ascii 1.0")?;
    writeln!(out, "element vertex {}", points.len())?;
    writeln!(out, "property float x")?;
    writeln!(out, "property float y")?;
    writeln!(out, "property float z")?;
    if colors.is_some() {
        writeln!(out, "property uint8 red")?;
        writeln!(out, "property uint8 green")?;
        writeln!(out, "property uint8 blue")?;
    }
    writeln!(out, "end_header")?;

    for (i, p) in points.iter().enumerate() {
        match colors {
            Some(colors) => {
                let [r, g, b] = colors.rgb8(i);
                writeln!(out, "{} {} {} {} {} {}", p.x, p.y, p.z, r, g, b)?;
            }
            None => writeln!(out, "{} {} {}", p.x, p.y, p.z)?,
        }
    }
    Ok(())
}

/// Read an ASCII PLY written by [`write_ply`] (x/y/z plus optional 8-bit
/// colors). Supports round-trip tests and spot checks, not arbitrary PLY.
pub fn read_ply(path: &Path) -> Result<(Vec<Vec3>, Option<Vec<[u8; 3]>>), FormatError> {
    let text = std::fs::read_to_string(path)?;
    let mut lines = text.lines().enumerate();

    match lines.next() {
        Some((_, "ply")) => {}
        _ => return Err(FormatError::NotPly(path.display().to_string())),
    }

    let mut vertex_count = 0usize;
    let mut color_properties = 0usize;
    for (line_no, line) in lines.by_ref() {
        if line == "end_header" {
            break;
        }
        if let Some(rest) = line.strip_prefix("element vertex ") {
            vertex_count = rest.parse().map_err(|_| FormatError::MalformedPly {
                line: line_no + 1,
                reason: format!("bad vertex count {rest:?}"),
            })?;
        }
        if line.starts_with("property uint8") || line.starts_with("property uchar") {
            color_properties += 1;
        }
    }
    let has_colors = color_properties == 3;

    let mut points = Vec::with_capacity(vertex_count);
    let mut colors = has_colors.then(|| Vec::with_capacity(vertex_count));
    for (line_no, line) in lines.take(vertex_count) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let expected = if has_colors { 6 } else { 3 };
        if fields.len() != expected {
            return Err(FormatError::MalformedPly {
                line: line_no + 1,
                reason: format!("expected {expected} fields, got {}", fields.len()),
            });
        }
        let parse = |s: &str| -> Result<Real, FormatError> {
            s.parse().map_err(|_| FormatError::MalformedPly {
                line: line_no + 1,
                reason: format!("bad float {s:?}"),
            })
        };
        points.push(Vec3::new(parse(fields[0])?, parse(fields[1])?, parse(fields[2])?));
        if let Some(colors) = &mut colors {
            let channel = |s: &str| -> Result<u8, FormatError> {
                s.parse().map_err(|_| FormatError::MalformedPly {
                    line: line_no + 1,
                    reason: format!("bad color channel {s:?}"),
                })
            };
            colors.push([channel(fields[3])?, channel(fields[4])?, channel(fields[5])?]);
        }
    }
    if points.len() != vertex_count {
        return Err(FormatError::MalformedPly {
            line: 0,
            reason: format!("expected {vertex_count} vertices, got {}", points.len()),
        });
    }
    Ok((points, colors))
}
