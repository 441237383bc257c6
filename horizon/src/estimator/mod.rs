//! Frame-to-frame rotation estimate by coordinate descent.
//!
//! Starting from no rotation, every iteration tries the 26 neighbours of the
//! current estimate at a fixed angular step, keeps the one whose rotated
//! frame differs least from the previous frame, and halves the step. The
//! search stops once the step drops below the angular size of one
//! full-resolution pixel divided by `2^subpixels`.


use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::frame::{Frame, FrameView};
use crate::reduce::diff;
use crate::sampling::Interpolation;
use crate::transform::{DirectTransformer, Rotation, Transform};

const DEFAULT_MAX_STEP: f64 = 8.0;
const MAX_SUBPIXELS: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// First search step, in degrees.
    pub max_step: f64,
    /// Refinement below one pixel: the last step is `1 / 2^subpixels` pixel.
    pub subpixels: u32,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            max_step: DEFAULT_MAX_STEP,
            subpixels: 0,
        }
    }
}

impl EstimatorConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.max_step.is_finite() && self.max_step > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "max_step must be a positive number of degrees, got {}",
                self.max_step
            )));
        }
        if self.subpixels > MAX_SUBPIXELS {
            return Err(Error::InvalidConfig(format!(
                "subpixels must be at most {MAX_SUBPIXELS}, got {}",
                self.subpixels
            )));
        }
        Ok(())
    }

    /// Smallest step for frames `full_width` pixels wide.
    pub fn min_step(&self, full_width: usize) -> f64 {
        if full_width == 0 {
            return self.max_step;
        }
        (360.0 / full_width as f64) / f64::from(1u32 << self.subpixels.min(MAX_SUBPIXELS))
    }
}

/// Estimates the rotation between consecutive reduced frames.
#[derive(Debug)]
pub struct MotionEstimator {
    config: EstimatorConfig,
    min_step: f64,
    transformer: DirectTransformer,
    proposal: Frame,
}

impl MotionEstimator {
    /// `full_width` is the width of the original, unreduced frames.
    pub fn new(config: EstimatorConfig, full_width: usize) -> Self {
        Self {
            config,
            min_step: config.min_step(full_width),
            transformer: DirectTransformer::new(Interpolation::MonoBilinear),
            proposal: Frame::new_default(0, 0),
        }
    }

    #[inline]
    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    #[inline]
    pub fn min_step(&self) -> f64 {
        self.min_step
    }

    /// Rotation that, applied to `current`, best reproduces `previous`.
    pub fn estimate(&mut self, previous: &Frame, current: &Frame) -> Rotation {
        assert!(
            previous.same_dimensions(current),
            "reduced frames must have equal size"
        );
        let (width, height) = current.dimensions();
        self.proposal.resize(width, height);

        let mut estimate = Rotation::ZERO;
        let mut best = diff(previous, current, width, height, u64::MAX);
        let mut step = self.config.max_step;
        let mut evaluations = 0usize;

        while step >= self.min_step {
            let mut best_candidate = None;
            for i in -1..=1 {
                for j in -1..=1 {
                    for k in -1..=1 {
                        if i == 0 && j == 0 && k == 0 {
                            continue;
                        }
                        let candidate = estimate
                            + Rotation::new(i as f64 * step, j as f64 * step, k as f64 * step);
                        self.transformer.apply(
                            FrameView::from(current),
                            self.proposal.pixels_mut(),
                            &candidate.to_matrix(),
                        );
                        evaluations += 1;

                        let score = diff(previous, &self.proposal, width, height, best);
                        if score < best {
                            best = score;
                            best_candidate = Some(candidate);
                        }
                    }
                }
            }
            if let Some(candidate) = best_candidate {
                estimate = candidate;
            }
            step /= 2.0;
        }

        tracing::trace!(
            yaw = estimate.yaw,
            pitch = estimate.pitch,
            roll = estimate.roll,
            score = best,
            evaluations,
            "Estimated frame rotation"
        );
        estimate
    }
}
