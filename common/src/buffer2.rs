use std::ops::{Deref, DerefMut, Index, IndexMut};

/// Owned row-major 2-D buffer.
///
/// Pixel `(x, y)` lives at `y * width + x`. All access goes through
/// bounds-checked indexing or whole-row slices, so callers never compute
/// raw offsets themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer2<T> {
    pixels: Vec<T>,
    width: usize,
    height: usize,
}

impl<T> Buffer2<T> {
    pub fn new(width: usize, height: usize, pixels: Vec<T>) -> Self {
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
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    #[inline]
    pub fn same_dimensions<U>(&self, other: &Buffer2<U>) -> bool {
        self.width == other.width && self.height == other.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> &T {
        debug_assert!(x < self.width && y < self.height);
        &self.pixels[y * self.width + x]
    }

    #[inline]
    pub fn get_mut(&mut self, x: usize, y: usize) -> &mut T {
        debug_assert!(x < self.width && y < self.height);
        &mut self.pixels[y * self.width + x]
    }

    #[inline]
    pub fn row(&self, y: usize) -> &[T] {
        let start = y * self.width;
        &self.pixels[start..start + self.width]
    }

    #[inline]
    pub fn row_mut(&mut self, y: usize) -> &mut [T] {
        let start = y * self.width;
        &mut self.pixels[start..start + self.width]
    }

    #[inline]
    pub fn rows(&self) -> std::slice::Chunks<'_, T> {
        self.pixels.chunks(self.width.max(1))
    }

    #[inline]
    pub fn pixels(&self) -> &[T] {
        &self.pixels
    }

    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [T] {
        &mut self.pixels
    }

    #[inline]
    pub fn into_vec(self) -> Vec<T> {
        self.pixels
    }

    /// Copies `other` into `self`. Both buffers must have the same dimensions.
    pub fn copy_from(&mut self, other: &Self)
    where
        T: Copy,
    {
        assert_eq!(self.width, other.width, "width mismatch");
        assert_eq!(self.height, other.height, "height mismatch");
        self.pixels.copy_from_slice(&other.pixels);
    }

    /// Copies a raw row-major slice into `self`.
    pub fn copy_from_slice(&mut self, pixels: &[T])
    where
        T: Copy,
    {
        assert_eq!(pixels.len(), self.pixels.len(), "length mismatch");
        self.pixels.copy_from_slice(pixels);
    }
}

impl<T: Default + Clone> Buffer2<T> {
    pub fn new_default(width: usize, height: usize) -> Self {
        Self::new_filled(width, height, T::default())
    }

    /// Reallocates to the given size when it differs, resetting all values.
    pub fn resize(&mut self, width: usize, height: usize) {
        if self.width != width || self.height != height {
            self.pixels.clear();
            self.pixels.resize(width * height, T::default());
            self.width = width;
            self.height = height;
        }
    }
}

impl<T: Clone> Buffer2<T> {
    pub fn new_filled(width: usize, height: usize, value: T) -> Self {
        Self {
            pixels: vec![value; width * height],
            width,
            height,
        }
    }

    pub fn fill(&mut self, value: T) {
        self.pixels.fill(value);
    }
}

impl<T> Index<(usize, usize)> for Buffer2<T> {
    type Output = T;

    #[inline]
    fn index(&self, (x, y): (usize, usize)) -> &Self::Output {
        &self.pixels[y * self.width + x]
    }
}

impl<T> IndexMut<(usize, usize)> for Buffer2<T> {
    #[inline]
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut Self::Output {
        &mut self.pixels[y * self.width + x]
    }
}

impl<T> Deref for Buffer2<T> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.pixels
    }
}

impl<T> DerefMut for Buffer2<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.pixels
    }
}

impl<T> From<Buffer2<T>> for Vec<T> {
    #[inline]
    fn from(buffer: Buffer2<T>) -> Self {
        buffer.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_is_row_major() {
        let buf = Buffer2::new(3, 2, vec![10, 20, 30, 40, 50, 60]);
        assert_eq!(*buf.get(0, 0), 10);
        assert_eq!(*buf.get(2, 0), 30);
        assert_eq!(*buf.get(0, 1), 40);
        assert_eq!(buf[(2, 1)], 60);
    }

    #[test]
    #[should_panic(expected = "pixels length must equal width * height")]
    fn test_new_panics_on_size_mismatch() {
        Buffer2::new(3, 2, vec![1, 2, 3]);
    }

    #[test]
    fn test_rows() {
        let mut buf = Buffer2::new(2, 3, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(buf.row(1), &[3, 4]);
        buf.row_mut(2).copy_from_slice(&[9, 9]);
        let rows: Vec<&[i32]> = buf.rows().collect();
        assert_eq!(rows, vec![&[1, 2][..], &[3, 4][..], &[9, 9][..]]);
    }

    #[test]
    fn test_resize_resets_only_on_change() {
        let mut buf = Buffer2::new_filled(2, 2, 7u32);
        buf.resize(2, 2);
        assert!(buf.iter().all(|&v| v == 7));

        buf.resize(3, 1);
        assert_eq!(buf.dimensions(), (3, 1));
        assert!(buf.iter().all(|&v| v == 0));
    }

    #[test]
    #[should_panic(expected = "width mismatch")]
    fn test_copy_from_panics_on_width_mismatch() {
        let src = Buffer2::new(3, 2, vec![0; 6]);
        let mut dst = Buffer2::new(2, 3, vec![0; 6]);
        dst.copy_from(&src);
    }
}
