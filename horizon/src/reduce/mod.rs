//! Box downsampling and sum-of-absolute-differences for motion search.
//!
//! A reduced frame holds one scalar per cell: the sum of all four channel
//! bytes over a `scale x scale` block, right-shifted so the largest possible
//! value stays below [`REDUCED_VALUE_LIMIT`].


use common::parallel::for_each_row_block;

use crate::frame::{unpack, Frame, FrameView};

/// Reduced frames aim for roughly this many rows.
pub const REDUCED_TARGET_HEIGHT: usize = 128;
/// Upper bound on any reduced cell value.
pub const REDUCED_VALUE_LIMIT: u64 = 32767;

/// Downsampling factor for a frame of the given height.
#[inline]
pub fn reduced_scale(height: usize) -> usize {
    (height / REDUCED_TARGET_HEIGHT).max(1)
}

/// Smallest right shift that keeps `scale² · 4 · 256` within [`REDUCED_VALUE_LIMIT`].
pub fn accumulation_shift(scale: usize) -> u32 {
    let max = (scale * scale * 4 * 256) as u64;
    let mut shift = 0;
    while (max >> shift) > REDUCED_VALUE_LIMIT {
        shift += 1;
    }
    shift
}

/// Sums every `scale x scale` block of `input` into one cell of `output`.
///
/// Each of the four bytes of a pixel contributes independently. Input rows
/// and columns past `reduced_width * scale` / `reduced_height * scale` are ignored.
pub fn shrink_and_accumulate(
    input: FrameView<'_>,
    output: &mut [u32],
    scale: usize,
    reduced_width: usize,
    reduced_height: usize,
) {
    assert!(scale > 0, "scale must be > 0");
    assert!(
        reduced_width * scale <= input.width() && reduced_height * scale <= input.height(),
        "reduced size exceeds input"
    );
    assert_eq!(output.len(), reduced_width * reduced_height, "output size mismatch");

    let shift = accumulation_shift(scale);

    for_each_row_block(output, reduced_width, |first_row, rows| {
        for (local_y, row) in rows.chunks_exact_mut(reduced_width).enumerate() {
            let top = (first_row + local_y) * scale;
            for (cx, cell) in row.iter_mut().enumerate() {
                let left = cx * scale;
                let mut sum = 0u32;
                for y in top..top + scale {
                    for &pixel in &input.row(y)[left..left + scale] {
                        sum += unpack(pixel).iter().map(|&c| c as u32).sum::<u32>();
                    }
                }
                *cell = sum >> shift;
            }
        }
    });
}

/// Sum of absolute differences of two equal-size buffers, each value read as
/// a signed 32-bit integer.
///
/// Checked after every row: once the running sum exceeds `exit_at` the
/// partial sum is returned. Pass `u64::MAX` for an exact result.
pub fn diff(a: &[u32], b: &[u32], width: usize, height: usize, exit_at: u64) -> u64 {
    assert_eq!(a.len(), width * height, "buffer size mismatch");
    assert_eq!(b.len(), width * height, "buffer size mismatch");
    if width == 0 {
        return 0;
    }

    let mut total = 0u64;
    for (row_a, row_b) in a.chunks_exact(width).zip(b.chunks_exact(width)) {
        let row_sum: u64 = row_a
            .iter()
            .zip(row_b)
            .map(|(&pa, &pb)| {
                let d = (pa as i32).wrapping_sub(pb as i32);
                let sign = d >> 31;
                (d ^ sign).wrapping_sub(sign) as u32 as u64
            })
            .sum();
        total += row_sum;
        if total > exit_at {
            return total;
        }
    }
    total
}

/// Downsamples full frames to a fixed reduced size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReducer {
    width: usize,
    height: usize,
    scale: usize,
    reduced_width: usize,
    reduced_height: usize,
}

impl FrameReducer {
    /// Reducer for `width x height` frames using [`reduced_scale`].
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_scale(width, height, reduced_scale(height))
    }

    pub fn with_scale(width: usize, height: usize, scale: usize) -> Self {
        let scale = scale.max(1);
        Self {
            width,
            height,
            scale,
            reduced_width: width / scale,
            reduced_height: height / scale,
        }
    }

    #[inline]
    pub fn scale(&self) -> usize {
        self.scale
    }

    /// Full-resolution `(width, height)` this reducer accepts.
    #[inline]
    pub fn source_dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    #[inline]
    pub fn reduced_dimensions(&self) -> (usize, usize) {
        (self.reduced_width, self.reduced_height)
    }

    /// Zeroed frame of the reduced size.
    pub fn new_frame(&self) -> Frame {
        Frame::new_default(self.reduced_width, self.reduced_height)
    }

    /// Reduces `input` into `output`, resizing `output` if needed.
    pub fn reduce(&self, input: FrameView<'_>, output: &mut Frame) {
        assert_eq!(
            (input.width(), input.height()),
            (self.width, self.height),
            "input size mismatch"
        );
        output.resize(self.reduced_width, self.reduced_height);
        shrink_and_accumulate(
            input,
            output.pixels_mut(),
            self.scale,
            self.reduced_width,
            self.reduced_height,
        );
    }
}
