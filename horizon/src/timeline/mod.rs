//! Time-indexed rotation samples and their smoothing into corrections.
//!
//! A [`RotationTimeline`] keeps samples sorted by time with no two closed
//! `[previous_time, time]` spans intersecting. Inserting a sample evicts every
//! sample it overlaps.

#[cfg(test)]
mod tests;

mod file;

pub use file::{parse_file_name, SAMPLE_RECORD_SIZE};

use serde::{Deserialize, Serialize};

use crate::transform::Rotation;

/// Offset added to the previous frame time when recording an analysed
/// sample, so the sample's span does not touch the one before it.
pub const ROTATION_TIME_INSTANT: f64 = 1.0 / 10000.0;

/// Intervals longer than this multiple of the average count as skipped frames.
const SKIP_FACTOR: f64 = 1.5;

/// Rotation that happened over the interval `(previous_time, time]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationSample {
    pub previous_time: f64,
    pub time: f64,
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
    /// Set for samples measured in the current analysis pass, clear for
    /// samples loaded from disk.
    pub updated: bool,
}

impl RotationSample {
    pub fn new(previous_time: f64, time: f64, rotation: Rotation, updated: bool) -> Self {
        Self {
            previous_time,
            time,
            yaw: rotation.yaw,
            pitch: rotation.pitch,
            roll: rotation.roll,
            updated,
        }
    }

    #[inline]
    pub fn rotation(&self) -> Rotation {
        Rotation::new(self.yaw, self.pitch, self.roll)
    }

    #[inline]
    pub fn span(&self) -> f64 {
        self.time - self.previous_time
    }

    /// Whether `t` lies in the closed interval `[previous_time, time]`.
    #[inline]
    pub fn contains(&self, t: f64) -> bool {
        t >= self.previous_time && t <= self.time
    }

    /// Whether the closed spans of `self` and `other` intersect.
    pub fn span_overlaps(&self, other: &RotationSample) -> bool {
        other.contains(self.time)
            || other.contains(self.previous_time)
            || (self.previous_time < other.previous_time && self.time > other.time)
    }

    fn is_valid(&self) -> bool {
        self.previous_time.is_finite() && self.time.is_finite() && self.previous_time < self.time
    }
}

/// Moving-average window and center bias for one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisSmoothing {
    /// Window length in samples. Values below 1 are treated as 1.
    pub window: usize,
    /// Window position in `[-1, 1]`: -1 averages only samples before the
    /// current one, 1 starts the window at the current sample, 0 roughly
    /// centers it.
    pub bias: f64,
}

impl AxisSmoothing {
    pub const fn new(window: usize, bias: f64) -> Self {
        Self { window, bias }
    }
}

/// Smoothing parameters for all three axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Smoothing {
    pub yaw: AxisSmoothing,
    pub pitch: AxisSmoothing,
    pub roll: AxisSmoothing,
}

impl Smoothing {
    pub const fn uniform(window: usize, bias: f64) -> Self {
        let axis = AxisSmoothing::new(window, bias);
        Self {
            yaw: axis,
            pitch: axis,
            roll: axis,
        }
    }
}

/// Replaces every value by the mean of a `window`-long run around it.
///
/// `bias` in `[-1, 1]` moves the run from entirely before the sample to
/// entirely after it. The run is clipped at both ends of the slice.
pub fn smooth(samples: &mut [f64], window: usize, bias: f64) {
    let n = samples.len() as isize;
    if n == 0 {
        return;
    }
    let window = window.max(1) as isize;

    let mut sums = Vec::with_capacity(samples.len());
    let mut acc = 0.0;
    for &v in samples.iter() {
        acc += v;
        sums.push(acc);
    }

    let bias = (bias.clamp(-1.0, 1.0) + 1.0) / 2.0;
    let lead = (bias * window as f64) as isize;

    for (i, value) in samples.iter_mut().enumerate() {
        let first = i as isize - window + lead - 1;
        let start = first.max(-1);
        let end = (first + window).min(n - 1).max(start + 1);
        let before = if start < 0 { 0.0 } else { sums[start as usize] };
        *value = (sums[end as usize] - before) / (end - start) as f64;
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RotationTimeline {
    samples: Vec<RotationSample>,
    min_span: Option<f64>,
}

impl RotationTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[inline]
    pub fn samples(&self) -> &[RotationSample] {
        &self.samples
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&RotationSample> {
        self.samples.get(index)
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, RotationSample> {
        self.samples.iter()
    }

    /// Shortest span of any sample, `None` when empty.
    #[inline]
    pub fn min_span(&self) -> Option<f64> {
        self.min_span
    }

    pub fn clear(&mut self) {
        self.samples.clear();
        self.min_span = None;
    }

    /// Index range of the samples whose spans intersect `sample`'s.
    ///
    /// Samples are sorted and disjoint, so both `time` and `previous_time`
    /// increase monotonically and the overlapping samples are contiguous.
    fn overlapping_range(&self, sample: &RotationSample) -> std::ops::Range<usize> {
        let start = self
            .samples
            .partition_point(|s| s.time < sample.previous_time);
        let end = self
            .samples
            .partition_point(|s| s.previous_time <= sample.time);
        start..end.max(start)
    }

    pub fn has_overlapping(&self, sample: &RotationSample) -> bool {
        !self.overlapping_range(sample).is_empty()
    }

    /// Inserts `sample` in time order, first evicting every overlapping sample.
    ///
    /// Samples with a non-finite or empty span are ignored.
    pub fn add(&mut self, sample: RotationSample) {
        if !sample.is_valid() {
            tracing::warn!(
                previous_time = sample.previous_time,
                time = sample.time,
                "Ignoring rotation sample with invalid span"
            );
            return;
        }

        let range = self.overlapping_range(&sample);
        let evicted = !range.is_empty();
        let index = range.start;
        self.samples.splice(range, std::iter::once(sample));

        debug_assert!(index == 0 || self.samples[index - 1].time < sample.previous_time);

        if evicted {
            self.update_min_span();
        } else {
            let span = sample.span();
            self.min_span = Some(self.min_span.map_or(span, |m| m.min(span)));
        }
    }

    fn update_min_span(&mut self) {
        self.min_span = self
            .samples
            .iter()
            .map(RotationSample::span)
            .min_by(f64::total_cmp);
    }

    /// Index of the sample whose span contains `t`.
    pub fn index_of(&self, t: f64) -> Option<usize> {
        let index = self.samples.partition_point(|s| s.time < t);
        self.samples
            .get(index)
            .filter(|s| s.contains(t))
            .map(|_| index)
    }

    /// Index of the sample for a playback frame at `t`.
    ///
    /// Samples are recorded at analysis frame boundaries, so the lookup is
    /// shifted back by half the shortest span.
    pub fn lookup(&self, t: f64) -> Option<usize> {
        self.index_of(t - self.min_span.unwrap_or(0.0) / 2.0)
    }

    /// Writes into `dest` the correction for every sample: the accumulated
    /// measured rotation minus its smoothed counterpart.
    pub fn correct(&self, smoothing: &Smoothing, dest: &mut RotationTimeline) {
        let n = self.samples.len();
        let mut yaw = Vec::with_capacity(n);
        let mut pitch = Vec::with_capacity(n);
        let mut roll = Vec::with_capacity(n);

        let mut acc = Rotation::ZERO;
        for sample in &self.samples {
            acc = acc + sample.rotation();
            yaw.push(acc.yaw);
            pitch.push(acc.pitch);
            roll.push(acc.roll);
        }

        let mut smooth_yaw = yaw.clone();
        let mut smooth_pitch = pitch.clone();
        let mut smooth_roll = roll.clone();
        smooth(&mut smooth_yaw, smoothing.yaw.window, smoothing.yaw.bias);
        smooth(&mut smooth_pitch, smoothing.pitch.window, smoothing.pitch.bias);
        smooth(&mut smooth_roll, smoothing.roll.window, smoothing.roll.bias);

        for (i, sample) in self.samples.iter().enumerate() {
            let correction = Rotation::new(
                yaw[i] - smooth_yaw[i],
                pitch[i] - smooth_pitch[i],
                roll[i] - smooth_roll[i],
            );
            dest.add(RotationSample::new(
                sample.previous_time,
                sample.time,
                correction,
                false,
            ));
        }
    }

    /// Folds `other` into `self`. A sample from `other` is taken when it is
    /// marked updated or when nothing in `self` overlaps it.
    pub fn merge(&mut self, other: &RotationTimeline) {
        for sample in &other.samples {
            if sample.updated || !self.has_overlapping(sample) {
                self.add(*sample);
            }
        }
    }

    pub fn clear_updated(&mut self) {
        for sample in &mut self.samples {
            sample.updated = false;
        }
    }

    /// Index of the sample before the first gap longer than 1.5 times the
    /// average interval between samples.
    pub fn find_first_skip(&self) -> Option<usize> {
        if self.samples.len() < 2 {
            return None;
        }
        let total: f64 = self.samples.windows(2).map(|w| w[1].time - w[0].time).sum();
        let average = total / (self.samples.len() - 1) as f64;
        self.samples
            .windows(2)
            .position(|w| w[1].time - w[0].time > average * SKIP_FACTOR)
    }

    /// Largest absolute yaw, pitch and roll over all samples.
    pub fn max_magnitude(&self) -> Rotation {
        self.samples.iter().fold(Rotation::ZERO, |m, s| {
            Rotation::new(
                m.yaw.max(s.yaw.abs()),
                m.pitch.max(s.pitch.abs()),
                m.roll.max(s.roll.abs()),
            )
        })
    }
}

impl<'a> IntoIterator for &'a RotationTimeline {
    type Item = &'a RotationSample;
    type IntoIter = std::slice::Iter<'a, RotationSample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}
