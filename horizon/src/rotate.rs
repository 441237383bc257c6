//! Fixed yaw/pitch/roll rotation of every frame.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::filter::{check_buffers, Filter};
use crate::frame::FrameView;
use crate::sampling::Interpolation;
use crate::transform::{Rotation, SphericalTransformer, Transform};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RotateConfig {
    /// Degrees.
    pub rotation: Rotation,
    pub interpolation: Interpolation,
}

impl RotateConfig {
    pub fn validate(&self) -> Result<()> {
        let Rotation { yaw, pitch, roll } = self.rotation;
        if !(yaw.is_finite() && pitch.is_finite() && roll.is_finite()) {
            return Err(Error::InvalidConfig(format!(
                "rotation angles must be finite, got {:?}",
                self.rotation
            )));
        }
        Ok(())
    }
}

#[derive(Debug)]
struct RotateState {
    config: RotateConfig,
    transformer: SphericalTransformer,
}

/// Rotates each frame on the sphere by a configurable, possibly animated,
/// rotation. Stable rotations are served from a cached coordinate map.
#[derive(Debug)]
pub struct RotateFilter {
    width: usize,
    height: usize,
    state: Mutex<RotateState>,
}

impl RotateFilter {
    pub fn new(width: usize, height: usize, config: RotateConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            width,
            height,
            state: Mutex::new(RotateState {
                config,
                transformer: SphericalTransformer::new(config.interpolation),
            }),
        })
    }

    pub fn config(&self) -> RotateConfig {
        self.state.lock().config
    }

    /// Replaces the configuration; takes effect on the next frame.
    pub fn set_config(&self, config: RotateConfig) -> Result<()> {
        config.validate()?;
        self.state.lock().config = config;
        Ok(())
    }
}

impl Filter for RotateFilter {
    fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn update(&self, _time: f64, input: &[u32], output: &mut [u32]) -> Result<()> {
        check_buffers(self.width, self.height, input, output)?;
        let mut state = self.state.lock();
        let RotateState {
            config,
            transformer,
        } = &mut *state;

        transformer.set_interpolation(config.interpolation);
        transformer.apply(
            FrameView::new(input, self.width, self.height),
            output,
            &config.rotation.to_matrix(),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{pack, Frame};
    use crate::transform::MapMode;

    fn frame(width: usize, height: usize) -> Frame {
        let pixels = (0..width * height)
            .map(|i| pack([(i % 251) as u8, (i / 7) as u8, 3, 255]))
            .collect();
        Frame::new(width, height, pixels)
    }

    #[test]
    fn test_zero_rotation_passes_through() {
        let input = frame(16, 8);
        let filter = RotateFilter::new(16, 8, RotateConfig::default()).unwrap();
        let mut output = vec![0u32; 16 * 8];
        filter.update(0.0, &input, &mut output).unwrap();
        assert_eq!(output, input.pixels());
    }

    #[test]
    fn test_yaw_shifts_columns() {
        let input = frame(16, 8);
        let config = RotateConfig {
            rotation: Rotation::new(45.0, 0.0, 0.0),
            interpolation: Interpolation::Bilinear,
        };
        let filter = RotateFilter::new(16, 8, config).unwrap();
        let mut output = vec![0u32; 16 * 8];
        filter.update(0.0, &input, &mut output).unwrap();
        for y in 0..8 {
            for x in 0..16 {
                assert_eq!(output[y * 16 + x], input[((x + 2) % 16, y)], "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_stable_rotation_uses_cached_map() {
        let input = frame(16, 8);
        let config = RotateConfig {
            rotation: Rotation::new(10.0, 5.0, 0.0),
            interpolation: Interpolation::Bilinear,
        };
        let filter = RotateFilter::new(16, 8, config).unwrap();
        let mut first = vec![0u32; 16 * 8];
        let mut later = vec![0u32; 16 * 8];
        filter.update(0.0, &input, &mut first).unwrap();
        for i in 1..5 {
            filter.update(i as f64 / 30.0, &input, &mut later).unwrap();
        }
        assert_eq!(first, later);
        assert_eq!(filter.state.lock().transformer.cache().mode(), MapMode::Cached);
    }

    #[test]
    fn test_rejects_wrong_buffer_size() {
        let filter = RotateFilter::new(4, 4, RotateConfig::default()).unwrap();
        let input = vec![0u32; 15];
        let mut output = vec![0u32; 16];
        let err = filter.update(0.0, &input, &mut output).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { actual: 15, .. }));
    }

    #[test]
    fn test_rejects_non_finite_rotation() {
        let config = RotateConfig {
            rotation: Rotation::new(f64::INFINITY, 0.0, 0.0),
            ..Default::default()
        };
        assert!(RotateFilter::new(4, 4, config).is_err());

        let filter = RotateFilter::new(4, 4, RotateConfig::default()).unwrap();
        assert!(filter.set_config(config).is_err());
        assert_eq!(filter.config(), RotateConfig::default());
    }
}
