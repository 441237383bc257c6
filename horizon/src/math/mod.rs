pub mod fast_atan2;
pub mod matrix3;
pub mod quaternion;

pub use fast_atan2::{fast_atan2, FAST_ATAN2_MAX_ERROR};
pub use glam::{DQuat, DVec3};
pub use matrix3::Matrix3;

#[inline]
pub fn deg_to_rad(degrees: f64) -> f64 {
    degrees.to_radians()
}

#[inline]
pub fn rad_to_deg(radians: f64) -> f64 {
    radians.to_degrees()
}
