//! Homogeneous transform helpers.
//!
//! All transforms are 4×4 column-vector matrices: a point `p` in a child
//! frame maps to `T * p` in the parent frame.

use nalgebra::{Matrix3, Matrix4, Vector3};

use urdfview_urdf::Origin;

/// Axes shorter than this are treated as degenerate.
pub const AXIS_EPSILON: f32 = 1e-6;

/// Build a rotation matrix from roll-pitch-yaw (intrinsic XYZ / extrinsic ZYX),
/// i.e. `Rz(yaw) · Ry(pitch) · Rx(roll)`.
pub fn rpy_to_matrix(rpy: [f32; 3]) -> Matrix3<f32> {
    let [roll, pitch, yaw] = rpy;
    let (sr, cr) = roll.sin_cos();
    let (sp, cp) = pitch.sin_cos();
    let (sy, cy) = yaw.sin_cos();

    Matrix3::new(
        cy * cp,
        cy * sp * sr - sy * cr,
        cy * sp * cr + sy * sr,
        sy * cp,
        sy * sp * sr + cy * cr,
        sy * sp * cr - cy * sr,
        -sp,
        cp * sr,
        cp * cr,
    )
}

/// Homogeneous transform from a translation and roll-pitch-yaw rotation.
pub fn transform_from_xyz_rpy(xyz: [f32; 3], rpy: [f32; 3]) -> Matrix4<f32> {
    let mut m = rpy_to_matrix(rpy).to_homogeneous();
    m[(0, 3)] = xyz[0];
    m[(1, 3)] = xyz[1];
    m[(2, 3)] = xyz[2];
    m
}

/// Convert a URDF [`Origin`] to a homogeneous transform.
pub fn origin_transform(origin: &Origin) -> Matrix4<f32> {
    transform_from_xyz_rpy(origin.xyz, origin.rpy)
}

/// Normalize a joint axis, falling back to +Z when it is (nearly) zero.
pub fn normalized_axis(axis: [f32; 3]) -> Vector3<f32> {
    let v = Vector3::from(axis);
    let norm = v.norm();
    if norm > AXIS_EPSILON {
        v / norm
    } else {
        Vector3::z()
    }
}

/// Rotation by `angle` radians about `axis` (Rodrigues' formula).
///
/// The axis is normalized first; a degenerate axis rotates about +Z.
pub fn axis_angle_transform(axis: [f32; 3], angle: f32) -> Matrix4<f32> {
    let u = normalized_axis(axis);
    let (ux, uy, uz) = (u.x, u.y, u.z);
    let (s, c) = angle.sin_cos();
    let t = 1.0 - c;

    Matrix4::new(
        c + ux * ux * t,
        ux * uy * t - uz * s,
        ux * uz * t + uy * s,
        0.0,
        uy * ux * t + uz * s,
        c + uy * uy * t,
        uy * uz * t - ux * s,
        0.0,
        uz * ux * t - uy * s,
        uz * uy * t + ux * s,
        c + uz * uz * t,
        0.0,
        0.0,
        0.0,
        0.0,
        1.0,
    )
}

/// Pure translation by `v`.
pub fn translation_transform(v: [f32; 3]) -> Matrix4<f32> {
    Matrix4::new_translation(&Vector3::from(v))
}

/// Translation part of a homogeneous transform.
pub fn translation_of(m: &Matrix4<f32>) -> Vector3<f32> {
    Vector3::new(m[(0, 3)], m[(1, 3)], m[(2, 3)])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
