//! Camera pose conversion between coordinate conventions.
//!
//! Game snapshots store camera-to-world poses in the engine convention
//! (character looks down +Y, +Z points up). NeRF and COLMAP expect
//! +X right, +Y down, +Z forward as seen from the image. COLMAP
//! additionally stores world-to-camera poses as quaternion + translation
//! instead of camera-to-world matrices.

use crate::math::{Mat3, Mat4, Real};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtrinsicsError {
    #[error("camera-to-world transform is singular and cannot be inverted")]
    SingularTransform,
}

/// Basis change from the engine camera axes to the NeRF/COLMAP camera axes,
/// applied by right-multiplication to a camera-to-world transform.
fn game_to_nerf_basis() -> Mat4 {
    #[rustfmt::skip]
    let m = Mat4::new(
        1.0, 0.0,  0.0, 0.0,
        0.0, 0.0, -1.0, 0.0,
        0.0, 1.0,  0.0, 0.0,
        0.0, 0.0,  0.0, 1.0,
    );
    m
}

/// 180° rotation about the camera X axis (Y and Z negated).
fn nerf_flip() -> Mat4 {
    #[rustfmt::skip]
    let m = Mat4::new(
        1.0,  0.0,  0.0, 0.0,
        0.0, -1.0,  0.0, 0.0,
        0.0,  0.0, -1.0, 0.0,
        0.0,  0.0,  0.0, 1.0,
    );
    m
}

/// World-basis swap between the NeRF and COLMAP conventions
/// (X and Y exchanged, Z negated).
fn nerf_to_colmap_basis() -> Mat4 {
    #[rustfmt::skip]
    let m = Mat4::new(
        0.0, 1.0,  0.0, 0.0,
        1.0, 0.0,  0.0, 0.0,
        0.0, 0.0, -1.0, 0.0,
        0.0, 0.0,  0.0, 1.0,
    );
    m
}

/// Remap a camera-to-world transform from the engine convention to the
/// NeRF convention.
pub fn game_to_nerf_cam_to_world(cam_to_world_game: &Mat4) -> Mat4 {
    cam_to_world_game * game_to_nerf_basis()
}

/// COLMAP world-to-camera transform from a NeRF-convention camera-to-world
/// transform.
pub fn nerf_to_colmap_world_to_cam(cam_to_world_nerf: &Mat4) -> Result<Mat4, ExtrinsicsError> {
    let flipped = cam_to_world_nerf * nerf_flip();
    let world_to_cam = flipped
        .try_inverse()
        .ok_or(ExtrinsicsError::SingularTransform)?;
    Ok(world_to_cam * nerf_to_colmap_basis())
}

/// Extract a unit quaternion `(w, x, y, z)` from a rotation matrix.
///
/// Uses COLMAP's closed form: the quaternion is the eigenvector for the
/// largest eigenvalue of a symmetric 4×4 matrix assembled from the
/// rotation's elements. The sign is canonicalized so that `w >= 0`
/// (`q` and `-q` encode the same rotation).
///
/// Rotations near 180° have nearly-equal leading eigenvalues and are
/// numerically ill-conditioned; the result is still a valid quaternion of
/// the rotation, just with a less accurate axis.
pub fn rotation_to_quaternion(r: &Mat3) -> [Real; 4] {
    let (rxx, ryx, rzx) = (r[(0, 0)], r[(0, 1)], r[(0, 2)]);
    let (rxy, ryy, rzy) = (r[(1, 0)], r[(1, 1)], r[(1, 2)]);
    let (rxz, ryz, rzz) = (r[(2, 0)], r[(2, 1)], r[(2, 2)]);

    #[rustfmt::skip]
    let k = Mat4::new(
        rxx - ryy - rzz, ryx + rxy,       rzx + rxz,       ryz - rzy,
        ryx + rxy,       ryy - rxx - rzz, rzy + ryz,       rzx - rxz,
        rzx + rxz,       rzy + ryz,       rzz - rxx - ryy, rxy - ryx,
        ryz - rzy,       rzx - rxz,       rxy - ryx,       rxx + ryy + rzz,
    ) / 3.0;

    let eigen = k.symmetric_eigen();
    let mut largest = 0;
    for i in 1..4 {
        if eigen.eigenvalues[i] > eigen.eigenvalues[largest] {
            largest = i;
        }
    }
    let v = eigen.eigenvectors.column(largest);

    // Eigenvector components are ordered (x, y, z, w).
    let mut q = [v[3], v[0], v[1], v[2]];
    if q[0] < 0.0 {
        for c in &mut q {
            *c = -*c;
        }
    }
    q
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{mat4_from_rows_3x4, rotation_part, translation_part, Vec3};
    use approx::assert_relative_eq;
    use nalgebra::{Quaternion, UnitQuaternion};

    fn quat_to_rotation(q: [Real; 4]) -> Mat3 {
        UnitQuaternion::from_quaternion(Quaternion::new(q[0], q[1], q[2], q[3]))
            .to_rotation_matrix()
            .into_inner()
    }

    #[test]
    fn identity_rotation_gives_identity_quaternion() {
        let q = rotation_to_quaternion(&Mat3::identity());
        assert_relative_eq!(q[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(q[1], 0.0, epsilon = 1e-12);
        assert_relative_eq!(q[2], 0.0, epsilon = 1e-12);
        assert_relative_eq!(q[3], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn quaternion_reconstructs_rotation() {
        for &(roll, pitch, yaw) in &[
            (0.1, 0.2, 0.3),
            (-1.2, 0.4, 2.9),
            (3.0, -0.01, 0.5),
            (0.0, 1.5, -2.0),
        ] {
            let r = UnitQuaternion::from_euler_angles(roll, pitch, yaw)
                .to_rotation_matrix()
                .into_inner();
            let q = rotation_to_quaternion(&r);
            assert!(q[0] >= 0.0, "w must be canonicalized non-negative");
            let norm: Real = q.iter().map(|c| c * c).sum::<Real>().sqrt();
            assert_relative_eq!(norm, 1.0, epsilon = 1e-9);
            let back = quat_to_rotation(q);
            assert_relative_eq!(back, r, epsilon = 1e-8);
        }
    }

    #[test]
    fn near_half_turn_rotation_still_reconstructs() {
        let r = UnitQuaternion::from_euler_angles(0.0, 0.0, std::f64::consts::PI - 1e-7)
            .to_rotation_matrix()
            .into_inner();
        let q = rotation_to_quaternion(&r);
        assert!(q[0] >= 0.0);
        let back = quat_to_rotation(q);
        assert_relative_eq!(back, r, epsilon = 1e-5);
    }

    #[test]
    fn game_to_nerf_permutes_axes() {
        // Engine identity pose: right = +X, forward = +Y, up = +Z, at origin.
        let c2w = Mat4::identity();
        let nerf = game_to_nerf_cam_to_world(&c2w);
        // Camera X (right) stays world +X.
        assert_relative_eq!(nerf.fixed_view::<3, 1>(0, 0).into_owned(), Vec3::x());
        // Camera Y (down in NeRF) becomes world -Z.
        assert_relative_eq!(nerf.fixed_view::<3, 1>(0, 1).into_owned(), -Vec3::z());
        // Camera Z (forward in NeRF) becomes world +Y, the engine look axis.
        assert_relative_eq!(nerf.fixed_view::<3, 1>(0, 2).into_owned(), Vec3::y());
    }

    #[test]
    fn game_to_nerf_keeps_position() {
        let rows = [
            1.0, 0.0, 0.0, 5.0, //
            0.0, 1.0, 0.0, -2.0, //
            0.0, 0.0, 1.0, 7.0,
        ];
        let nerf = game_to_nerf_cam_to_world(&mat4_from_rows_3x4(&rows));
        assert_relative_eq!(translation_part(&nerf), Vec3::new(5.0, -2.0, 7.0));
    }

    #[test]
    fn colmap_world_to_cam_inverts_the_pose() {
        let rows = [
            1.0, 0.0, 0.0, 3.0, //
            0.0, 1.0, 0.0, 1.0, //
            0.0, 0.0, 1.0, -4.0,
        ];
        let nerf = game_to_nerf_cam_to_world(&mat4_from_rows_3x4(&rows));
        let w2c = nerf_to_colmap_world_to_cam(&nerf).unwrap();

        // The rotation part must stay orthonormal with determinant 1.
        let r = rotation_part(&w2c);
        assert_relative_eq!(r * r.transpose(), Mat3::identity(), epsilon = 1e-9);
        assert_relative_eq!(r.determinant(), 1.0, epsilon = 1e-9);
        // Bottom row stays homogeneous.
        assert_relative_eq!(w2c[(3, 3)], 1.0);
        assert_relative_eq!(w2c[(3, 0)], 0.0);

        // Round trip: undoing the basis changes must recover the pose.
        let back = (w2c * nerf_to_colmap_basis().try_inverse().unwrap())
            .try_inverse()
            .unwrap()
            * nerf_flip().try_inverse().unwrap();
        assert_relative_eq!(back, nerf, epsilon = 1e-9);
    }
}
