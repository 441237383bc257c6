//! Pixel containers shared by the transform, reducer and filters.
//!
//! A pixel is a packed 32-bit value holding four 8-bit channels. Channel
//! order is whatever the host uses; every operation here treats the four
//! bytes independently.

use common::Buffer2;

/// Owned frame of packed 32-bit pixels.
pub type Frame = Buffer2<u32>;

/// Borrowed, read-only frame. Host buffers are wrapped in this without copying.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    pixels: &'a [u32],
    width: usize,
    height: usize,
}

impl<'a> FrameView<'a> {
    pub fn new(pixels: &'a [u32], width: usize, height: usize) -> Self {
        assert_eq!(
            pixels.len(),
            width * height,
            "pixels length must equal width * height"
        );
        Self {
            pixels,
            width,
            height,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn pixels(&self) -> &'a [u32] {
        self.pixels
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u32 {
        self.pixels[y * self.width + x]
    }

    #[inline]
    pub fn row(&self, y: usize) -> &'a [u32] {
        let start = y * self.width;
        &self.pixels[start..start + self.width]
    }
}

impl<'a> From<&'a Frame> for FrameView<'a> {
    fn from(frame: &'a Frame) -> Self {
        Self {
            pixels: frame.pixels(),
            width: frame.width(),
            height: frame.height(),
        }
    }
}

/// Packs four channel bytes into a pixel, first byte lowest.
#[inline]
pub const fn pack(c: [u8; 4]) -> u32 {
    u32::from_le_bytes(c)
}

/// Splits a pixel into its four channel bytes, lowest first.
#[inline]
pub const fn unpack(p: u32) -> [u8; 4] {
    p.to_le_bytes()
}
