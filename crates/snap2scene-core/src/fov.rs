//! Field-of-view conversions for pinhole cameras.
//!
//! Game engines report either a vertical or a horizontal field of view;
//! the other axis follows from the aspect ratio via
//! `tan(fov_h / 2) = tan(fov_v / 2) * aspect`.

use crate::math::Real;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FovError {
    #[error("field of view must lie in the open interval (0, 181) degrees, got {0}")]
    OutOfRange(Real),
}

/// A single authoritative field-of-view angle.
///
/// Exactly one axis is ever supplied by a snapshot or the command line;
/// the other is always derived from the aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FovSpec {
    /// Vertical field of view in degrees.
    Vertical(Real),
    /// Horizontal field of view in degrees.
    Horizontal(Real),
}

/// Both field-of-view angles of a frame, in degrees.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedFov {
    pub vertical_degrees: Real,
    pub horizontal_degrees: Real,
}

impl FovSpec {
    /// A validated vertical field of view in degrees.
    pub fn vertical(degrees: Real) -> Result<Self, FovError> {
        validate_angle(degrees)?;
        Ok(FovSpec::Vertical(degrees))
    }

    /// A validated horizontal field of view in degrees.
    pub fn horizontal(degrees: Real) -> Result<Self, FovError> {
        validate_angle(degrees)?;
        Ok(FovSpec::Horizontal(degrees))
    }

    /// Derive the missing axis from the aspect ratio (width over height).
    pub fn resolve(self, aspect_w_over_h: Real) -> ResolvedFov {
        match self {
            FovSpec::Vertical(v) => ResolvedFov {
                vertical_degrees: v,
                horizontal_degrees: horizontal_from_vertical_degrees(v, aspect_w_over_h),
            },
            FovSpec::Horizontal(h) => ResolvedFov {
                vertical_degrees: vertical_from_horizontal_degrees(h, aspect_w_over_h),
                horizontal_degrees: h,
            },
        }
    }
}

fn validate_angle(degrees: Real) -> Result<(), FovError> {
    if degrees > 0.0 && degrees < 181.0 {
        Ok(())
    } else {
        Err(FovError::OutOfRange(degrees))
    }
}

/// Horizontal field of view (degrees) from a vertical one and an aspect ratio.
pub fn horizontal_from_vertical_degrees(fov_v_degrees: Real, aspect_w_over_h: Real) -> Real {
    let half_v = (fov_v_degrees.to_radians() / 2.0).tan();
    (half_v * aspect_w_over_h).atan().to_degrees() * 2.0
}

/// Vertical field of view (degrees) from a horizontal one and an aspect ratio.
pub fn vertical_from_horizontal_degrees(fov_h_degrees: Real, aspect_w_over_h: Real) -> Real {
    horizontal_from_vertical_degrees(fov_h_degrees, 1.0 / aspect_w_over_h)
}

/// Focal length per pixel-pitch unit: `0.5 / tan(fov / 2)`.
///
/// Resolution independent; multiply by a pixel-count scale to obtain a
/// focal length in pixels.
pub fn focal_length_per_pixel(fov_degrees: Real) -> Real {
    0.5 / (fov_degrees.to_radians() / 2.0).tan()
}
