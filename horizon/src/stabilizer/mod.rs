//! Two-pass 360 video stabilization.
//!
//! In the analysis pass every frame is reduced, compared with the previous
//! reduced frame and the estimated rotation is recorded in a timeline that
//! is saved when the pass ends. In the apply pass the timeline is smoothed
//! into corrections and each frame is rotated by the correction for its time.
//!
//! The pass is picked per frame from [`StabilizerConfig::analyze`]; switching
//! it mid-stream ends the running pass and starts the other.


mod config;

pub use config::{AxisPercent, AxisWindow, StabilizerConfig};

use parking_lot::Mutex;

use crate::error::Result;
use crate::estimator::MotionEstimator;
use crate::filter::{check_buffers, Filter};
use crate::frame::{Frame, FrameView};
use crate::reduce::FrameReducer;
use crate::timeline::{RotationSample, RotationTimeline, Smoothing, ROTATION_TIME_INSTANT};
use crate::transform::{Rotation, SphericalTransformer, Transform};

/// Pass a stabilizer runs. A stabilizer has no pass until its first frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Analyze,
    Apply,
}

/// Snapshot of a stabilizer's progress.
#[derive(Debug, Clone, PartialEq)]
pub struct StabilizerStatus {
    /// `None` until the first frame has been processed.
    pub pass: Option<Pass>,
    pub samples: usize,
    pub earliest: Option<f64>,
    pub latest: Option<f64>,
    /// Time of the sample before the first gap in the measured samples.
    pub first_skip: Option<f64>,
    /// Rotation measured for the most recent analysed frame.
    pub last_motion: Rotation,
    /// Rotation applied to the most recent played-back frame.
    pub view: Rotation,
}

#[derive(Debug)]
struct StabilizerState {
    width: usize,
    config: StabilizerConfig,
    pass: Option<Pass>,
    raw: RotationTimeline,
    corrections: RotationTimeline,
    /// Smoothing the current corrections were computed with.
    corrections_smoothing: Option<Smoothing>,
    reducer: FrameReducer,
    estimator: MotionEstimator,
    current: Frame,
    previous: Option<Frame>,
    previous_time: f64,
    transformer: SphericalTransformer,
    last_motion: Rotation,
    view: Rotation,
}

/// Stabilizing filter. See the module documentation.
#[derive(Debug)]
pub struct Stabilizer {
    width: usize,
    height: usize,
    state: Mutex<StabilizerState>,
}

impl Stabilizer {
    pub fn new(width: usize, height: usize, config: StabilizerConfig) -> Result<Self> {
        config.validate()?;
        let reducer = FrameReducer::new(width, height);
        tracing::debug!(
            width,
            height,
            scale = reducer.scale(),
            "Creating stabilizer"
        );

        let state = StabilizerState {
            width,
            estimator: MotionEstimator::new(config.estimator, width),
            transformer: SphericalTransformer::new(config.interpolation),
            config,
            pass: None,
            raw: RotationTimeline::new(),
            corrections: RotationTimeline::new(),
            corrections_smoothing: None,
            current: reducer.new_frame(),
            reducer,
            previous: None,
            previous_time: -1.0,
            last_motion: Rotation::ZERO,
            view: Rotation::ZERO,
        };
        Ok(Self {
            width,
            height,
            state: Mutex::new(state),
        })
    }

    pub fn config(&self) -> StabilizerConfig {
        self.state.lock().config.clone()
    }

    /// Replaces the configuration. Pass switches and smoothing changes take
    /// effect on the next frame.
    pub fn set_config(&self, config: StabilizerConfig) -> Result<()> {
        config.validate()?;
        let mut state = self.state.lock();
        if config.estimator != state.config.estimator {
            state.estimator = MotionEstimator::new(config.estimator, state.width);
        }
        state.config = config;
        Ok(())
    }

    pub fn status(&self) -> StabilizerStatus {
        self.state.lock().status()
    }

    /// Ends the running pass, saving measured samples if analysing.
    /// Called automatically on drop.
    pub fn finish(&self) {
        self.state.lock().finish();
    }
}

impl Filter for Stabilizer {
    fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn update(&self, time: f64, input: &[u32], output: &mut [u32]) -> Result<()> {
        check_buffers(self.width, self.height, input, output)?;
        let input = FrameView::new(input, self.width, self.height);
        self.state.lock().process(time, input, output);
        Ok(())
    }
}

impl Drop for Stabilizer {
    fn drop(&mut self) {
        self.state.get_mut().finish();
    }
}

impl StabilizerState {
    fn process(&mut self, time: f64, input: FrameView<'_>, output: &mut [u32]) {
        let clip_time = time + self.config.clip_offset;
        match self.sync_pass() {
            Pass::Analyze => self.analyze_frame(clip_time, input, output),
            Pass::Apply => self.apply_frame(clip_time, input, output),
        }
    }

    /// Starts the configured pass, ending the other one if it was running.
    fn sync_pass(&mut self) -> Pass {
        let wanted = if self.config.analyze {
            Pass::Analyze
        } else {
            Pass::Apply
        };
        if self.pass != Some(wanted) {
            self.finish();
            match wanted {
                Pass::Analyze => self.begin_analyze(),
                Pass::Apply => self.begin_apply(),
            }
            self.pass = Some(wanted);
        }
        wanted
    }

    fn finish(&mut self) {
        match self.pass.take() {
            Some(Pass::Analyze) => self.end_analyze(),
            Some(Pass::Apply) => self.end_apply(),
            None => {}
        }
    }

    fn analysis_file(&self) -> Option<&str> {
        Some(self.config.analysis_file.as_str()).filter(|f| !f.is_empty())
    }

    fn reload_raw(&mut self) {
        self.raw.clear();
        if let Some(file) = self.analysis_file().map(str::to_owned) {
            self.raw.read(&file);
        }
    }

    fn begin_analyze(&mut self) {
        tracing::info!(file = %self.config.analysis_file, "Starting analysis pass");
        self.reload_raw();
        self.previous = None;
        self.previous_time = -1.0;
    }

    fn end_analyze(&mut self) {
        tracing::info!(samples = self.raw.len(), "Ending analysis pass");
        let Some(file) = self.analysis_file().map(str::to_owned) else {
            return;
        };
        if self.raw.is_empty() {
            return;
        }

        let mut on_disk = RotationTimeline::load(&file);
        on_disk.merge(&self.raw);
        if let Err(e) = on_disk.write(&file) {
            tracing::error!("Failed to save rotation samples: {}", e);
            return;
        }
        self.reload_raw();
    }

    fn begin_apply(&mut self) {
        tracing::info!(file = %self.config.analysis_file, "Starting apply pass");
        self.reload_raw();
        self.update_corrections();
    }

    fn end_apply(&mut self) {
        tracing::debug!("Ending apply pass");
        self.corrections.clear();
        self.corrections_smoothing = None;
    }

    fn update_corrections(&mut self) {
        let smoothing = self.config.smoothing();
        self.corrections.clear();
        self.raw.correct(&smoothing, &mut self.corrections);
        self.corrections_smoothing = Some(smoothing);

        let max = self.corrections.max_magnitude();
        tracing::debug!(
            samples = self.corrections.len(),
            max_yaw = max.yaw,
            max_pitch = max.pitch,
            max_roll = max.roll,
            "Computed corrections"
        );
    }

    fn analyze_frame(&mut self, clip_time: f64, input: FrameView<'_>, output: &mut [u32]) {
        self.reducer.reduce(input, &mut self.current);
        output.copy_from_slice(input.pixels());

        if let Some(previous) = &self.previous {
            if self.previous_time < clip_time {
                let motion = self.estimator.estimate(previous, &self.current);
                self.raw.add(RotationSample::new(
                    self.previous_time + ROTATION_TIME_INSTANT,
                    clip_time,
                    motion,
                    true,
                ));
                self.last_motion = motion;
                tracing::trace!(
                    time = clip_time,
                    yaw = motion.yaw,
                    pitch = motion.pitch,
                    roll = motion.roll,
                    "Measured frame motion"
                );
            }
        }

        let reducer = self.reducer;
        let previous = self.previous.get_or_insert_with(|| reducer.new_frame());
        std::mem::swap(previous, &mut self.current);
        self.previous_time = clip_time;
    }

    fn apply_frame(&mut self, clip_time: f64, input: FrameView<'_>, output: &mut [u32]) {
        if self.corrections_smoothing != Some(self.config.smoothing()) {
            self.update_corrections();
        }

        let strength = self.config.strength;
        self.view = self
            .corrections
            .lookup(clip_time)
            .and_then(|i| self.corrections.get(i))
            .map(|c| {
                c.rotation()
                    .scale(strength.yaw / 100.0, strength.pitch / 100.0, strength.roll / 100.0)
            })
            .unwrap_or(Rotation::ZERO);

        self.transformer.set_interpolation(self.config.interpolation);
        self.transformer.apply(input, output, &self.view.to_matrix());

        self.previous = None;
        self.previous_time = -1.0;
    }

    fn status(&self) -> StabilizerStatus {
        StabilizerStatus {
            pass: self.pass,
            samples: self.raw.len(),
            earliest: self.raw.samples().first().map(|s| s.time),
            latest: self.raw.samples().last().map(|s| s.time),
            first_skip: self
                .raw
                .find_first_skip()
                .and_then(|i| self.raw.get(i))
                .map(|s| s.time),
            last_motion: self.last_motion,
            view: self.view,
        }
    }
}
