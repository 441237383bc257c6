//! Stabilizer configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::estimator::EstimatorConfig;
use crate::sampling::Interpolation;
use crate::timeline::{AxisSmoothing, Smoothing};

// ============================================================================
// Defaults
// ============================================================================

const DEFAULT_SMOOTH_WINDOW: usize = 120;
const DEFAULT_STRENGTH: f64 = 100.0;

/// Per-axis percentage, used for time biases and correction strengths.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisPercent {
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
}

impl AxisPercent {
    pub const fn uniform(value: f64) -> Self {
        Self {
            yaw: value,
            pitch: value,
            roll: value,
        }
    }

    fn all_finite(&self) -> bool {
        self.yaw.is_finite() && self.pitch.is_finite() && self.roll.is_finite()
    }
}

/// Smoothing window length per axis, in samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisWindow {
    pub yaw: usize,
    pub pitch: usize,
    pub roll: usize,
}

impl AxisWindow {
    pub const fn uniform(value: usize) -> Self {
        Self {
            yaw: value,
            pitch: value,
            roll: value,
        }
    }
}

/// Settings of a [`Stabilizer`](super::Stabilizer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilizerConfig {
    /// Measure motion (`true`) or apply corrections (`false`).
    pub analyze: bool,
    /// Where measured samples are stored. Plain path or `file:///` URL;
    /// empty keeps samples in memory only.
    pub analysis_file: String,
    /// Added to every frame time before it is recorded or looked up.
    pub clip_offset: f64,
    pub interpolation: Interpolation,
    pub estimator: EstimatorConfig,
    pub smooth_window: AxisWindow,
    /// Shifts each smoothing window, -100 (past only) to 100 (future only).
    pub time_bias: AxisPercent,
    /// Fraction of the correction applied, in percent.
    pub strength: AxisPercent,
}

impl Default for StabilizerConfig {
    fn default() -> Self {
        Self {
            analyze: false,
            analysis_file: String::new(),
            clip_offset: 0.0,
            interpolation: Interpolation::Bilinear,
            estimator: EstimatorConfig::default(),
            smooth_window: AxisWindow::uniform(DEFAULT_SMOOTH_WINDOW),
            time_bias: AxisPercent::uniform(0.0),
            strength: AxisPercent::uniform(DEFAULT_STRENGTH),
        }
    }
}

impl StabilizerConfig {
    pub fn validate(&self) -> Result<()> {
        self.estimator.validate()?;

        if !self.clip_offset.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "clip_offset must be finite, got {}",
                self.clip_offset
            )));
        }
        let bias = self.time_bias;
        if !bias.all_finite()
            || [bias.yaw, bias.pitch, bias.roll]
                .iter()
                .any(|b| !(-100.0..=100.0).contains(b))
        {
            return Err(Error::InvalidConfig(format!(
                "time_bias must be within [-100, 100], got {bias:?}"
            )));
        }
        if !self.strength.all_finite() {
            return Err(Error::InvalidConfig(format!(
                "strength must be finite, got {:?}",
                self.strength
            )));
        }
        Ok(())
    }

    /// Smoothing parameters with biases scaled to `[-1, 1]`.
    pub fn smoothing(&self) -> Smoothing {
        Smoothing {
            yaw: AxisSmoothing::new(self.smooth_window.yaw, self.time_bias.yaw / 100.0),
            pitch: AxisSmoothing::new(self.smooth_window.pitch, self.time_bias.pitch / 100.0),
            roll: AxisSmoothing::new(self.smooth_window.roll, self.time_bias.roll / 100.0),
        }
    }
}
