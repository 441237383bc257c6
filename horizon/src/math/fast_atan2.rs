//! Polynomial `atan2` used by the per-pixel spherical mapping.
//!
//! Maximum absolute error against `f64::atan2` is bounded by
//! [`FAST_ATAN2_MAX_ERROR`] (2.28e-7 rad) over the whole plane.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_6, PI};

/// Guaranteed upper bound on `|fast_atan2(y, x) - y.atan2(x)|`, in radians.
pub const FAST_ATAN2_MAX_ERROR: f64 = 2.28e-7;

const SQRT_3: f64 = 1.732_050_807_568_877_2;
/// tan(pi/12)
const TAN_PI_12: f64 = 0.267_949_192_431_122_7;

/// Odd Taylor series of atan up to t^11. For |t| <= tan(pi/12) the
/// truncation error is below t^13/13 < 3e-9.
#[inline]
fn atan_small(t: f64) -> f64 {
    let t2 = t * t;
    t * (1.0
        + t2 * (-1.0 / 3.0
            + t2 * (1.0 / 5.0 + t2 * (-1.0 / 7.0 + t2 * (1.0 / 9.0 + t2 * (-1.0 / 11.0))))))
}

/// atan for `r` in [0, 1].
#[inline]
fn atan_unit(r: f64) -> f64 {
    if r > TAN_PI_12 {
        // atan(r) = pi/6 + atan((r*sqrt3 - 1) / (sqrt3 + r))
        FRAC_PI_6 + atan_small((r * SQRT_3 - 1.0) / (SQRT_3 + r))
    } else {
        atan_small(r)
    }
}

/// Four-quadrant arctangent of `y / x`, in radians in `[-pi, pi]`.
///
/// Returns 0 for `(0, 0)`.
#[inline]
pub fn fast_atan2(y: f64, x: f64) -> f64 {
    let ax = x.abs();
    let ay = y.abs();
    if ax == 0.0 && ay == 0.0 {
        return 0.0;
    }

    let mut angle = if ay > ax {
        FRAC_PI_2 - atan_unit(ax / ay)
    } else {
        atan_unit(ay / ax)
    };

    if x < 0.0 {
        angle = PI - angle;
    }
    if y < 0.0 {
        angle = -angle;
    }
    angle
}
