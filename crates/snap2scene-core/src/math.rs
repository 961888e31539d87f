//! Mathematical type definitions shared across the crate.

use nalgebra::{Matrix3, Matrix4, Vector3, Vector4};

/// Scalar type used throughout the library (currently `f64`).
pub type Real = f64;

/// 3D vector with [`Real`] components.
pub type Vec3 = Vector3<Real>;
/// 4D (homogeneous) vector with [`Real`] components.
pub type Vec4 = Vector4<Real>;
/// 3×3 matrix with [`Real`] entries.
pub type Mat3 = Matrix3<Real>;
/// 4×4 matrix with [`Real`] entries.
pub type Mat4 = Matrix4<Real>;

/// Pad a row-major 3×4 rotation+translation into a homogeneous 4×4 transform.
///
/// Game snapshots serialize camera-to-world poses as 12 floats in row-major
/// order; the missing bottom row is always `[0, 0, 0, 1]`.
pub fn mat4_from_rows_3x4(rows: &[Real; 12]) -> Mat4 {
    #[rustfmt::skip]
    let m = Mat4::new(
        rows[0], rows[1], rows[2],  rows[3],
        rows[4], rows[5], rows[6],  rows[7],
        rows[8], rows[9], rows[10], rows[11],
        0.0,     0.0,     0.0,      1.0,
    );
    m
}

/// Extract the top-left 3×3 rotation submatrix of a homogeneous transform.
pub fn rotation_part(m: &Mat4) -> Mat3 {
    m.fixed_view::<3, 3>(0, 0).into_owned()
}

/// Extract the translation column of a homogeneous transform.
pub fn translation_part(m: &Mat4) -> Vec3 {
    m.fixed_view::<3, 1>(0, 3).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn pad_keeps_rows_and_appends_homogeneous_row() {
        let rows = [
            1.0, 2.0, 3.0, 4.0, //
            5.0, 6.0, 7.0, 8.0, //
            9.0, 10.0, 11.0, 12.0,
        ];
        let m = mat4_from_rows_3x4(&rows);
        assert_relative_eq!(m[(0, 1)], 2.0);
        assert_relative_eq!(m[(2, 3)], 12.0);
        assert_relative_eq!(m[(3, 0)], 0.0);
        assert_relative_eq!(m[(3, 3)], 1.0);
        assert_relative_eq!(translation_part(&m), Vec3::new(4.0, 8.0, 12.0));
    }
}
