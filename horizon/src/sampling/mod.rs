//! Pixel samplers for equirectangular frames.
//!
//! Bilinear sampling is integer-only. Source coordinates are rounded to a
//! fixed-point grid of [`FRACTION_STEPS`] steps per pixel, and the four
//! 8-bit channels of a pixel are spread into 16-bit lanes of a `u64` so a
//! single multiply-add blends all of them. Each lane holds at most
//! `255 * 128`, so lanes never carry into their neighbours, and the result is
//! always inside the range spanned by the four corners.

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, FromRepr};

use crate::frame::FrameView;

/// Bits of fractional precision used for bilinear weights.
pub const FRACTION_BITS: u32 = 7;
/// Interpolation fraction resolution: weights lie in `[0, FRACTION_STEPS)`.
pub const FRACTION_STEPS: u64 = 1 << FRACTION_BITS;

const CHANNEL_MASK: u64 = 0x00ff_00ff_00ff_00ff;

/// Interpolation mode, selectable through an integer host parameter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumIter, FromRepr,
)]
#[repr(u8)]
pub enum Interpolation {
    /// Nearest neighbour, truncating the source coordinate.
    Nearest = 0,
    #[default]
    Bilinear = 1,
    /// Single-channel bilinear: each 32-bit value is one scalar sample.
    MonoBilinear = 2,
}

impl Interpolation {
    /// Maps the host's integer parameter onto a mode. Unknown values fall back
    /// to bilinear.
    pub fn from_index(index: i64) -> Self {
        u8::try_from(index)
            .ok()
            .and_then(Self::from_repr)
            .unwrap_or_default()
    }
}

/// Samples `frame` at `(x, y)` with the given mode, wrapping x and clamping y.
#[inline]
pub fn sample(frame: &FrameView<'_>, x: f64, y: f64, interpolation: Interpolation) -> u32 {
    match interpolation {
        Interpolation::Nearest => sample_nearest(frame, x, y),
        Interpolation::Bilinear => sample_bilinear_wrapped_clamped(frame, x, y),
        Interpolation::MonoBilinear => sample_mono_bilinear_wrapped_clamped(frame, x, y),
    }
}

/// Nearest neighbour. The coordinate is truncated and then clamped into the frame.
#[inline]
pub fn sample_nearest(frame: &FrameView<'_>, x: f64, y: f64) -> u32 {
    let ix = (x as usize).min(frame.width() - 1);
    let iy = (y as usize).min(frame.height() - 1);
    frame.get(ix, iy)
}

/// Bilinear without wraparound. Coordinates outside the frame yield 0; the
/// right and bottom neighbours are clamped to the last column and row.
#[inline]
pub fn sample_bilinear(frame: &FrameView<'_>, x: f64, y: f64) -> u32 {
    let (w, h) = (frame.width(), frame.height());
    if !(x >= 0.0 && y >= 0.0 && x < w as f64 && y < h as f64) {
        return 0;
    }

    let (ix0, ax) = to_fixed(x);
    let (iy0, ay) = to_fixed(y);
    let (ix0, ax) = clamp_index(ix0, ax, w);
    let (iy0, ay) = clamp_index(iy0, ay, h);
    let ix1 = (ix0 + 1).min(w - 1);
    let iy1 = (iy0 + 1).min(h - 1);

    blend_rgba(frame, [ix0, ix1], [iy0, iy1], ax, ay)
}

/// Bilinear with longitude wraparound and latitude clamping.
///
/// `x` wraps modulo the width so sampling at `width` equals sampling at `0`;
/// `y` clamps to `[0, height - 1]` since the poles are not cyclic.
#[inline]
pub fn sample_bilinear_wrapped_clamped(frame: &FrameView<'_>, x: f64, y: f64) -> u32 {
    let (xs, ys, ax, ay) = wrapped_clamped_corners(frame.width(), frame.height(), x, y);
    blend_rgba(frame, xs, ys, ax, ay)
}

/// Single-channel variant of [`sample_bilinear_wrapped_clamped`]. Values must
/// stay below 2^25 so the weighted sums fit; reduced frames are far smaller.
#[inline]
pub fn sample_mono_bilinear_wrapped_clamped(frame: &FrameView<'_>, x: f64, y: f64) -> u32 {
    let (xs, ys, ax, ay) = wrapped_clamped_corners(frame.width(), frame.height(), x, y);
    let p00 = frame.get(xs[0], ys[0]) as u64;
    let p10 = frame.get(xs[1], ys[0]) as u64;
    let p01 = frame.get(xs[0], ys[1]) as u64;
    let p11 = frame.get(xs[1], ys[1]) as u64;

    let top = lerp(p00, p10, ax);
    let bottom = lerp(p01, p11, ax);
    lerp(top, bottom, ay) as u32
}

// ============================================================================
// Fixed-point helpers
// ============================================================================

/// Splits a coordinate into an integer pixel index and a 7-bit fraction.
#[inline]
fn to_fixed(v: f64) -> (i64, u64) {
    let fixed = (v * FRACTION_STEPS as f64).round() as i64;
    (fixed >> FRACTION_BITS, (fixed & (FRACTION_STEPS as i64 - 1)) as u64)
}

/// Rounding can push an in-range coordinate onto `len`; snap it back.
#[inline]
fn clamp_index(index: i64, fraction: u64, len: usize) -> (usize, u64) {
    if index >= len as i64 {
        (len - 1, 0)
    } else {
        (index.max(0) as usize, fraction)
    }
}

#[inline]
fn wrapped_clamped_corners(
    w: usize,
    h: usize,
    x: f64,
    y: f64,
) -> ([usize; 2], [usize; 2], u64, u64) {
    let x = if x.is_finite() { x } else { 0.0 };
    let y = if y.is_finite() { y } else { 0.0 };

    let (ix, ax) = to_fixed(x);
    let ix0 = ix.rem_euclid(w as i64) as usize;
    let ix1 = if ix0 + 1 == w { 0 } else { ix0 + 1 };

    let (iy, ay) = to_fixed(y.clamp(0.0, (h - 1) as f64));
    let (iy0, ay) = clamp_index(iy, ay, h);
    let iy1 = (iy0 + 1).min(h - 1);

    ([ix0, ix1], [iy0, iy1], ax, ay)
}

#[inline]
fn lerp(a: u64, b: u64, weight: u64) -> u64 {
    (a * (FRACTION_STEPS - weight) + b * weight) >> FRACTION_BITS
}

/// `0xAABBGGRR` -> `0x00AA_00BB_00GG_00RR`.
#[inline]
fn spread(p: u32) -> u64 {
    let p = p as u64;
    (p & 0xff) | ((p & 0xff00) << 8) | ((p & 0x00ff_0000) << 16) | ((p & 0xff00_0000) << 24)
}

#[inline]
fn compact(v: u64) -> u32 {
    ((v & 0xff) | ((v >> 8) & 0xff00) | ((v >> 16) & 0x00ff_0000) | ((v >> 24) & 0xff00_0000))
        as u32
}

#[inline]
fn lerp_packed(a: u64, b: u64, weight: u64) -> u64 {
    lerp(a, b, weight) & CHANNEL_MASK
}

#[inline]
fn blend_rgba(frame: &FrameView<'_>, xs: [usize; 2], ys: [usize; 2], ax: u64, ay: u64) -> u32 {
    let p00 = spread(frame.get(xs[0], ys[0]));
    let p10 = spread(frame.get(xs[1], ys[0]));
    let p01 = spread(frame.get(xs[0], ys[1]));
    let p11 = spread(frame.get(xs[1], ys[1]));

    let top = lerp_packed(p00, p10, ax);
    let bottom = lerp_packed(p01, p11, ax);
    compact(lerp_packed(top, bottom, ay))
}
