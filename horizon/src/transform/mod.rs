//! Spherical rotation of equirectangular frames.


pub mod cache;
pub mod mapping;

use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

use crate::frame::FrameView;
use crate::math::{deg_to_rad, Matrix3};
use crate::sampling::Interpolation;

pub use cache::{MapCache, MapMode, MapState};
pub use mapping::{transform_direct, CoordinateMap};

/// Yaw, pitch and roll in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rotation {
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
}

impl Rotation {
    pub const ZERO: Rotation = Rotation::new(0.0, 0.0, 0.0);

    pub const fn new(yaw: f64, pitch: f64, roll: f64) -> Self {
        Self { yaw, pitch, roll }
    }

    /// Rotation matrix: roll about X, then pitch about Y, then yaw about Z.
    pub fn to_matrix(&self) -> Matrix3 {
        Matrix3::from_yaw_pitch_roll(
            deg_to_rad(self.yaw),
            deg_to_rad(self.pitch),
            deg_to_rad(self.roll),
        )
    }

    /// Scales each axis independently.
    pub fn scale(&self, yaw: f64, pitch: f64, roll: f64) -> Self {
        Self::new(self.yaw * yaw, self.pitch * pitch, self.roll * roll)
    }

    /// Largest absolute component.
    pub fn max_abs(&self) -> f64 {
        self.yaw.abs().max(self.pitch.abs()).max(self.roll.abs())
    }
}

impl Add for Rotation {
    type Output = Rotation;

    fn add(self, rhs: Rotation) -> Rotation {
        Rotation::new(self.yaw + rhs.yaw, self.pitch + rhs.pitch, self.roll + rhs.roll)
    }
}

impl Sub for Rotation {
    type Output = Rotation;

    fn sub(self, rhs: Rotation) -> Rotation {
        Rotation::new(self.yaw - rhs.yaw, self.pitch - rhs.pitch, self.roll - rhs.roll)
    }
}

impl Mul<f64> for Rotation {
    type Output = Rotation;

    fn mul(self, rhs: f64) -> Rotation {
        Rotation::new(self.yaw * rhs, self.pitch * rhs, self.roll * rhs)
    }
}

/// Rotates a frame on the sphere.
pub trait Transform: Send {
    /// Writes `input` rotated by `rotation` into `output`, which must hold
    /// exactly `input.width() * input.height()` pixels.
    fn apply(&mut self, input: FrameView<'_>, output: &mut [u32], rotation: &Matrix3);
}

/// Stateless transform that maps every pixel on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectTransformer {
    interpolation: Interpolation,
}

impl DirectTransformer {
    pub fn new(interpolation: Interpolation) -> Self {
        Self { interpolation }
    }
}

impl Transform for DirectTransformer {
    fn apply(&mut self, input: FrameView<'_>, output: &mut [u32], rotation: &Matrix3) {
        transform_direct(input, output, rotation, self.interpolation);
    }
}

/// Transform that switches between direct mapping and a cached
/// [`CoordinateMap`] depending on how stable the rotation is.
#[derive(Debug, Default)]
pub struct SphericalTransformer {
    interpolation: Interpolation,
    cache: MapCache,
    size: Option<(usize, usize)>,
}

impl SphericalTransformer {
    pub fn new(interpolation: Interpolation) -> Self {
        Self {
            interpolation,
            cache: MapCache::new(),
            size: None,
        }
    }

    #[inline]
    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    pub fn set_interpolation(&mut self, interpolation: Interpolation) {
        self.interpolation = interpolation;
    }

    #[inline]
    pub fn cache(&self) -> &MapCache {
        &self.cache
    }
}

impl Transform for SphericalTransformer {
    fn apply(&mut self, input: FrameView<'_>, output: &mut [u32], rotation: &Matrix3) {
        let size = (input.width(), input.height());
        if self.size != Some(size) {
            if self.size.is_some() {
                tracing::debug!(
                    width = size.0,
                    height = size.1,
                    "Frame size changed, dropping coordinate map"
                );
            }
            self.cache.invalidate();
            self.size = Some(size);
        }

        match self.cache.observe(rotation) {
            MapMode::Direct => transform_direct(input, output, rotation, self.interpolation),
            MapMode::Cached => {
                let interpolation = self.interpolation;
                self.cache
                    .fresh_map(size.0, size.1, rotation)
                    .remap(input, output, interpolation);
            }
        }
    }
}
