//! Equirectangular pixel <-> sphere mapping.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use common::parallel::for_each_row_block;
use common::Buffer2;
use glam::DVec3;

use crate::frame::FrameView;
use crate::math::{fast_atan2, Matrix3};
use crate::sampling::{sample, Interpolation};

/// Column and row angles of one frame size, computed once per pass.
#[derive(Debug)]
pub(crate) struct SphereGeometry {
    width: f64,
    height: f64,
    half_width: f64,
    half_height: f64,
    /// `(sin θ, cos θ)` per column.
    columns: Vec<(f64, f64)>,
}

impl SphereGeometry {
    pub(crate) fn new(width: usize, height: usize) -> Self {
        let w = width as f64;
        let half_width = w / 2.0;
        let columns = (0..width)
            .map(|x| (TAU * (x as f64 - half_width) / w).sin_cos())
            .collect();
        Self {
            width: w,
            height: height as f64,
            half_width,
            half_height: height as f64 / 2.0,
            columns,
        }
    }

    /// `(sin φ, cos φ)` for row `y`.
    #[inline]
    pub(crate) fn row(&self, y: usize) -> (f64, f64) {
        (PI * (y as f64 - self.half_height) / self.height).sin_cos()
    }

    /// Source pixel coordinate for output pixel `x` of a row, after rotating
    /// its ray by `m`. X is wrapped into `[0, width)`, y clamped to `[0, height - 1]`.
    #[inline]
    pub(crate) fn source(
        &self,
        m: &Matrix3,
        x: usize,
        (sin_phi, cos_phi): (f64, f64),
    ) -> (f64, f64) {
        let (sin_theta, cos_theta) = self.columns[x];
        let ray = m.mul_vec(DVec3::new(
            cos_theta * cos_phi,
            sin_theta * cos_phi,
            sin_phi,
        ));

        let theta = fast_atan2(ray.y, ray.x);
        let phi = fast_atan2(ray.z, (ray.x * ray.x + ray.y * ray.y).sqrt());

        let mut sx = self.half_width + self.half_width * theta / PI;
        if sx < 0.0 {
            sx += self.width;
        } else if sx >= self.width {
            sx -= self.width;
        }
        let sy = (self.half_height + self.half_height * phi / FRAC_PI_2)
            .clamp(0.0, self.height - 1.0);
        (sx, sy)
    }
}

/// Rotates `input` into `output` computing every source coordinate on the fly.
pub fn transform_direct(
    input: FrameView<'_>,
    output: &mut [u32],
    matrix: &Matrix3,
    interpolation: Interpolation,
) {
    let (width, height) = (input.width(), input.height());
    assert_eq!(output.len(), width * height, "output size mismatch");
    let geometry = SphereGeometry::new(width, height);

    for_each_row_block(output, width, |first_row, rows| {
        for (local_y, row) in rows.chunks_exact_mut(width).enumerate() {
            let angles = geometry.row(first_row + local_y);
            for (x, pixel) in row.iter_mut().enumerate() {
                let (sx, sy) = geometry.source(matrix, x, angles);
                *pixel = sample(&input, sx, sy, interpolation);
            }
        }
    });
}

/// Source coordinate of every output pixel for one rotation.
#[derive(Debug, Clone)]
pub struct CoordinateMap {
    coords: Buffer2<[f32; 2]>,
}

impl CoordinateMap {
    pub fn new(width: usize, height: usize, matrix: &Matrix3) -> Self {
        let mut map = Self {
            coords: Buffer2::new_default(width, height),
        };
        map.rebuild(matrix);
        map
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.coords.width()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.coords.height()
    }

    /// Source `(x, y)` for output pixel `(x, y)`.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> [f32; 2] {
        self.coords[(x, y)]
    }

    /// Recomputes every entry for `matrix`, keeping the allocation.
    pub fn rebuild(&mut self, matrix: &Matrix3) {
        let (width, height) = self.coords.dimensions();
        let geometry = SphereGeometry::new(width, height);

        for_each_row_block(self.coords.pixels_mut(), width, |first_row, rows| {
            for (local_y, row) in rows.chunks_exact_mut(width).enumerate() {
                let angles = geometry.row(first_row + local_y);
                for (x, entry) in row.iter_mut().enumerate() {
                    let (sx, sy) = geometry.source(matrix, x, angles);
                    *entry = [sx as f32, sy as f32];
                }
            }
        });
    }

    /// Samples `input` through the map into `output`.
    pub fn remap(&self, input: FrameView<'_>, output: &mut [u32], interpolation: Interpolation) {
        let width = self.width();
        assert_eq!(
            (input.width(), input.height()),
            self.coords.dimensions(),
            "map size mismatch"
        );
        assert_eq!(output.len(), self.coords.len(), "output size mismatch");

        for_each_row_block(output, width, |first_row, rows| {
            for (local_y, row) in rows.chunks_exact_mut(width).enumerate() {
                let coords = self.coords.row(first_row + local_y);
                for (pixel, &[sx, sy]) in row.iter_mut().zip(coords) {
                    *pixel = sample(&input, sx as f64, sy as f64, interpolation);
                }
            }
        });
    }
}
