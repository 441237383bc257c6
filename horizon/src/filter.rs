//! Host-facing per-frame filter interface.

use crate::error::{Error, Result};

/// A video filter invoked once per output frame.
///
/// Implementations serialize calls internally: `update` may be called from
/// several threads, but frames of one instance are processed one at a time.
pub trait Filter: Send + Sync {
    /// Frame `(width, height)` fixed at construction.
    fn dimensions(&self) -> (usize, usize);

    /// Processes the frame at `time` seconds. `input` and `output` are
    /// row-major packed 32-bit pixels of exactly `width * height` entries.
    fn update(&self, time: f64, input: &[u32], output: &mut [u32]) -> Result<()>;
}

pub(crate) fn check_buffers(
    width: usize,
    height: usize,
    input: &[u32],
    output: &[u32],
) -> Result<()> {
    let expected = width * height;
    for actual in [input.len(), output.len()] {
        if actual != expected {
            return Err(Error::DimensionMismatch {
                width,
                height,
                expected,
                actual,
            });
        }
    }
    Ok(())
}
