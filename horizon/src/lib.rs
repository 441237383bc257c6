//! Horizon - spherical rotation and stabilization for 360° equirectangular video.
//!
//! Frames are packed RGBA (`u32`, little-endian byte order R, G, B, A) laid out
//! row-major with no padding. Two filters are provided:
//! - [`RotateFilter`] turns every frame by a fixed yaw, pitch and roll
//! - [`Stabilizer`] measures camera motion in an analysis pass and removes
//!   the shake in an apply pass
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use horizon::{Filter, Stabilizer, StabilizerConfig};
//!
//! let config = StabilizerConfig {
//!     analyze: true,
//!     analysis_file: "clip.rotations".into(),
//!     ..Default::default()
//! };
//! let stabilizer = Stabilizer::new(3840, 1920, config)?;
//! for (time, frame) in frames {
//!     stabilizer.update(time, &frame, &mut output)?;
//! }
//! ```

mod config;
mod error;
mod filter;
mod frame;
mod rotate;
mod stabilizer;

pub mod estimator;
pub mod math;
pub mod reduce;
pub mod sampling;
pub mod timeline;
pub mod transform;

// ============================================================================
// Core types
// ============================================================================

pub use config::{load_config, save_config};
pub use error::{Error, Result};
pub use filter::Filter;
pub use frame::{pack, unpack, Frame, FrameView};
pub use math::Matrix3;
pub use sampling::Interpolation;

// ============================================================================
// Spherical transforms
// ============================================================================

pub use transform::{
    transform_direct, CoordinateMap, DirectTransformer, MapCache, MapMode, Rotation,
    SphericalTransformer, Transform,
};

// ============================================================================
// Motion analysis
// ============================================================================

pub use estimator::{EstimatorConfig, MotionEstimator};
pub use reduce::FrameReducer;
pub use timeline::{AxisSmoothing, RotationSample, RotationTimeline, Smoothing};

// ============================================================================
// Filters
// ============================================================================

pub use rotate::{RotateConfig, RotateFilter};
pub use stabilizer::{
    AxisPercent, AxisWindow, Pass, Stabilizer, StabilizerConfig, StabilizerStatus,
};
