//! Row-major 3x3 rotation matrix.

use glam::DVec3;
use std::ops::Mul;

/// Row-major 3x3 matrix of f64 values.
///
/// Memory layout:
/// ```text
/// | m[0] m[1] m[2] |
/// | m[3] m[4] m[5] |
/// | m[6] m[7] m[8] |
/// ```
///
/// Rotations are composed by left-multiplication: `rotate_x(a)` turns
/// `M` into `Rx(a) * M`, so the first rotation applied to a matrix is the
/// first one a vector goes through.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix3 {
    data: [f64; 9],
}

impl Default for Matrix3 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix3 {
    #[inline]
    pub const fn from_array(data: [f64; 9]) -> Self {
        Self { data }
    }

    #[inline]
    pub const fn identity() -> Self {
        Self {
            data: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
        }
    }

    #[inline]
    pub const fn from_rows(row0: [f64; 3], row1: [f64; 3], row2: [f64; 3]) -> Self {
        Self {
            data: [
                row0[0], row0[1], row0[2], row1[0], row1[1], row1[2], row2[0], row2[1], row2[2],
            ],
        }
    }

    #[inline]
    pub const fn as_array(&self) -> &[f64; 9] {
        &self.data
    }

    /// Rotation about X by `angle` radians (roll).
    pub fn from_rotation_x(angle: f64) -> Self {
        let (sa, ca) = angle.sin_cos();
        Self::from_rows([1.0, 0.0, 0.0], [0.0, ca, -sa], [0.0, sa, ca])
    }

    /// Rotation about Y by `angle` radians (pitch).
    pub fn from_rotation_y(angle: f64) -> Self {
        let (sa, ca) = angle.sin_cos();
        Self::from_rows([ca, 0.0, sa], [0.0, 1.0, 0.0], [-sa, 0.0, ca])
    }

    /// Rotation about Z by `angle` radians (yaw).
    pub fn from_rotation_z(angle: f64) -> Self {
        let (sa, ca) = angle.sin_cos();
        Self::from_rows([ca, -sa, 0.0], [sa, ca, 0.0], [0.0, 0.0, 1.0])
    }

    /// Rotation matrix for yaw, pitch and roll given in radians.
    ///
    /// Roll is applied first, then pitch, then yaw: `Rz(yaw) * Ry(pitch) * Rx(roll)`.
    pub fn from_yaw_pitch_roll(yaw: f64, pitch: f64, roll: f64) -> Self {
        let mut m = Self::identity();
        m.rotate_x(roll);
        m.rotate_y(pitch);
        m.rotate_z(yaw);
        m
    }

    /// Matrix multiplication: `self * rhs`.
    #[inline]
    pub fn mul_mat(&self, rhs: &Matrix3) -> Matrix3 {
        let a = &self.data;
        let b = &rhs.data;
        Matrix3 {
            data: [
                a[0] * b[0] + a[1] * b[3] + a[2] * b[6],
                a[0] * b[1] + a[1] * b[4] + a[2] * b[7],
                a[0] * b[2] + a[1] * b[5] + a[2] * b[8],
                a[3] * b[0] + a[4] * b[3] + a[5] * b[6],
                a[3] * b[1] + a[4] * b[4] + a[5] * b[7],
                a[3] * b[2] + a[4] * b[5] + a[5] * b[8],
                a[6] * b[0] + a[7] * b[3] + a[8] * b[6],
                a[6] * b[1] + a[7] * b[4] + a[8] * b[7],
                a[6] * b[2] + a[7] * b[5] + a[8] * b[8],
            ],
        }
    }

    /// Left-multiplies `self` by `other`: `self = other * self`.
    #[inline]
    pub fn prepend(&mut self, other: &Matrix3) {
        *self = other.mul_mat(self);
    }

    #[inline]
    pub fn rotate_x(&mut self, angle: f64) {
        self.prepend(&Self::from_rotation_x(angle));
    }

    #[inline]
    pub fn rotate_y(&mut self, angle: f64) {
        self.prepend(&Self::from_rotation_y(angle));
    }

    #[inline]
    pub fn rotate_z(&mut self, angle: f64) {
        self.prepend(&Self::from_rotation_z(angle));
    }

    /// Transform a 3-vector: `self * v`.
    #[inline]
    pub fn mul_vec(&self, v: DVec3) -> DVec3 {
        let m = &self.data;
        DVec3::new(
            m[0] * v.x + m[1] * v.y + m[2] * v.z,
            m[3] * v.x + m[4] * v.y + m[5] * v.z,
            m[6] * v.x + m[7] * v.y + m[8] * v.z,
        )
    }

    #[inline]
    pub fn transpose(&self) -> Matrix3 {
        let d = &self.data;
        Matrix3 {
            data: [d[0], d[3], d[6], d[1], d[4], d[7], d[2], d[5], d[8]],
        }
    }

    pub fn determinant(&self) -> f64 {
        let d = &self.data;
        d[0] * (d[4] * d[8] - d[5] * d[7]) - d[1] * (d[3] * d[8] - d[5] * d[6])
            + d[2] * (d[3] * d[7] - d[4] * d[6])
    }
}

impl Mul for Matrix3 {
    type Output = Matrix3;

    #[inline]
    fn mul(self, rhs: Matrix3) -> Matrix3 {
        self.mul_mat(&rhs)
    }
}

impl Mul<DVec3> for Matrix3 {
    type Output = DVec3;

    #[inline]
    fn mul(self, rhs: DVec3) -> DVec3 {
        self.mul_vec(rhs)
    }
}
