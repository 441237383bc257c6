//! Quaternion helpers for orientation data supplied alongside the video.
//!
//! Quaternions are `glam::DQuat` values (`x`, `y`, `z` imaginary parts, `w` real
//! part). Only the decompositions the stabilizer needs live here.

use glam::{DQuat, DVec3};

use super::{fast_atan2, Matrix3};

/// Axis used when a degenerate (zero-length) vector has to be normalized.
pub const FALLBACK_AXIS: DVec3 = DVec3::Z;

/// Normalizes `v`, or returns [`FALLBACK_AXIS`] when `v` has no usable length.
#[inline]
pub fn normalize_or_fallback(v: DVec3) -> DVec3 {
    v.try_normalize().unwrap_or(FALLBACK_AXIS)
}

/// Splits `q` into `swing * twist`, where `twist` is the rotation about `axis`
/// and `swing` rotates `axis` without spinning around it.
///
/// When `q` has no component about `axis` (a 180 degree swing) the twist is
/// the identity.
pub fn decompose_swing_twist(q: DQuat, axis: DVec3) -> (DQuat, DQuat) {
    let axis = normalize_or_fallback(axis);
    let imaginary = DVec3::new(q.x, q.y, q.z);
    let projected = axis * imaginary.dot(axis);

    let twist = DQuat::from_xyzw(projected.x, projected.y, projected.z, q.w);
    let twist = if twist.length_squared() < 1e-24 {
        DQuat::IDENTITY
    } else {
        twist.normalize()
    };
    let swing = q * twist.conjugate();
    (swing, twist)
}

/// Rotation matrix of a unit quaternion.
pub fn to_matrix(q: DQuat) -> Matrix3 {
    let q = q.normalize();
    let (x, y, z, w) = (q.x, q.y, q.z, q.w);
    Matrix3::from_rows(
        [
            1.0 - 2.0 * (y * y + z * z),
            2.0 * (x * y - z * w),
            2.0 * (x * z + y * w),
        ],
        [
            2.0 * (x * y + z * w),
            1.0 - 2.0 * (x * x + z * z),
            2.0 * (y * z - x * w),
        ],
        [
            2.0 * (x * z - y * w),
            2.0 * (y * z + x * w),
            1.0 - 2.0 * (x * x + y * y),
        ],
    )
}

/// Composes the rotation of `q` onto `m` by left-multiplication.
#[inline]
pub fn rotate_quaternion(m: &mut Matrix3, q: DQuat) {
    m.prepend(&to_matrix(q));
}

/// Heading, in radians, that `q` gives to the forward (+X) direction.
#[inline]
pub fn heading(q: DQuat) -> f64 {
    let forward = q * DVec3::X;
    fast_atan2(forward.y, forward.x)
}

/// Accumulated yaw of a sequence of orientations.
///
/// Each step takes the twist about Z of the relative rotation between
/// consecutive orientations, so pitch and roll wobble does not leak into the
/// heading. The first entry is always zero.
pub fn cumulative_yaw(orientations: &[DQuat]) -> Vec<f64> {
    let mut result = Vec::with_capacity(orientations.len());
    let mut yaw = 0.0;
    for (i, q) in orientations.iter().enumerate() {
        if i > 0 {
            let delta = orientations[i - 1].conjugate() * *q;
            let (_, twist) = decompose_swing_twist(delta, DVec3::Z);
            yaw += heading(twist);
        }
        result.push(yaw);
    }
    result
}

/// Matrix that undoes `orientation` and then re-applies `yaw` radians about Z.
///
/// Used to level a frame using an external orientation sample while keeping
/// a smoothed heading.
pub fn leveling_matrix(orientation: DQuat, yaw: f64) -> Matrix3 {
    let mut m = Matrix3::identity();
    rotate_quaternion(&mut m, orientation.conjugate());
    m.rotate_z(yaw);
    m
}
