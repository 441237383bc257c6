use super::*;
use crate::error::Error;
use crate::transform::Rotation;

fn sample(previous_time: f64, time: f64, yaw: f64) -> RotationSample {
    RotationSample::new(previous_time, time, Rotation::new(yaw, 0.0, 0.0), false)
}

fn times(timeline: &RotationTimeline) -> Vec<(f64, f64)> {
    timeline.iter().map(|s| (s.previous_time, s.time)).collect()
}

fn variance(values: &[f64]) -> f64 {
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64
}

// ============================================================================
// RotationSample
// ============================================================================

#[test]
fn test_sample_contains_is_closed() {
    let s = sample(1.0, 2.0, 0.0);
    assert!(s.contains(1.0));
    assert!(s.contains(1.5));
    assert!(s.contains(2.0));
    assert!(!s.contains(0.999));
    assert!(!s.contains(2.001));
    assert_eq!(s.span(), 1.0);
}

#[test]
fn test_span_overlaps() {
    let a = sample(1.0, 2.0, 0.0);
    assert!(sample(1.5, 3.0, 0.0).span_overlaps(&a));
    assert!(sample(0.0, 1.5, 0.0).span_overlaps(&a));
    assert!(sample(0.0, 3.0, 0.0).span_overlaps(&a));
    assert!(sample(1.2, 1.8, 0.0).span_overlaps(&a));
    assert!(sample(2.0, 3.0, 0.0).span_overlaps(&a));
    assert!(!sample(2.1, 3.0, 0.0).span_overlaps(&a));
    assert!(!sample(0.0, 0.9, 0.0).span_overlaps(&a));
}

// ============================================================================
// Insertion and lookup
// ============================================================================

#[test]
fn test_add_keeps_time_order() {
    let mut timeline = RotationTimeline::new();
    timeline.add(sample(2.0, 3.0, 0.0));
    timeline.add(sample(0.0, 1.0, 0.0));
    timeline.add(sample(4.0, 5.0, 0.0));
    timeline.add(sample(1.5, 1.9, 0.0));
    assert_eq!(
        times(&timeline),
        vec![(0.0, 1.0), (1.5, 1.9), (2.0, 3.0), (4.0, 5.0)]
    );
}

#[test]
fn test_add_evicts_overlapping() {
    let mut timeline = RotationTimeline::new();
    timeline.add(sample(0.0, 1.0, 1.0));
    timeline.add(sample(1.1, 2.0, 2.0));
    timeline.add(sample(2.1, 3.0, 3.0));

    timeline.add(sample(0.5, 1.5, 9.0));
    assert_eq!(times(&timeline), vec![(0.5, 1.5), (2.1, 3.0)]);
    assert_eq!(timeline.get(0).map(|s| s.yaw), Some(9.0));

    for pair in timeline.samples().windows(2) {
        assert!(!pair[0].span_overlaps(&pair[1]));
        assert!(pair[0].time < pair[1].time);
    }
}

#[test]
fn test_add_covering_sample_replaces_all_inside() {
    let mut timeline = RotationTimeline::new();
    for i in 0..5 {
        timeline.add(sample(i as f64, i as f64 + 0.5, 0.0));
    }
    timeline.add(sample(0.9, 3.6, 1.0));
    assert_eq!(times(&timeline), vec![(0.0, 0.5), (0.9, 3.6), (4.0, 4.5)]);
}

#[test]
fn test_add_ignores_invalid_spans() {
    let mut timeline = RotationTimeline::new();
    timeline.add(sample(1.0, 1.0, 0.0));
    timeline.add(sample(2.0, 1.0, 0.0));
    timeline.add(sample(f64::NAN, 1.0, 0.0));
    assert!(timeline.is_empty());
    assert_eq!(timeline.min_span(), None);
}

#[test]
fn test_min_span_tracks_evictions() {
    let mut timeline = RotationTimeline::new();
    timeline.add(sample(0.0, 1.0, 0.0));
    timeline.add(sample(2.0, 2.25, 0.0));
    assert_eq!(timeline.min_span(), Some(0.25));

    timeline.add(sample(1.5, 3.0, 0.0));
    assert_eq!(timeline.min_span(), Some(1.0));

    timeline.clear();
    assert_eq!(timeline.min_span(), None);
}

#[test]
fn test_index_of_and_lookup() {
    let mut timeline = RotationTimeline::new();
    for i in 0..10 {
        let t = i as f64 * 0.1;
        timeline.add(sample(t + ROTATION_TIME_INSTANT, t + 0.1, i as f64));
    }

    assert_eq!(timeline.index_of(0.05), Some(0));
    assert_eq!(timeline.index_of(0.25), Some(2));
    assert_eq!(timeline.index_of(0.2), Some(1));
    assert_eq!(timeline.index_of(-1.0), None);
    assert_eq!(timeline.index_of(2.0), None);

    // lookup shifts back by half the shortest span
    assert_eq!(timeline.lookup(0.3), Some(2));
    assert_eq!(timeline.lookup(0.36), Some(3));
    assert_eq!(RotationTimeline::new().lookup(1.0), None);
}

// ============================================================================
// Smoothing and corrections
// ============================================================================

#[test]
fn test_smooth_window_one_is_identity() {
    let mut values = vec![3.0, -1.0, 7.5, 2.0];
    smooth(&mut values, 1, 1.0);
    assert_eq!(values, vec![3.0, -1.0, 7.5, 2.0]);
}

#[test]
fn test_smooth_known_values() {
    let mut values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
    smooth(&mut values, 3, 0.0);
    assert_eq!(values, vec![1.0, 1.5, 2.0, 3.0, 4.0]);
}

#[test]
fn test_smooth_constant_stays_constant() {
    for bias in [-1.0, -0.3, 0.0, 0.7, 1.0] {
        let mut values = vec![4.0; 50];
        smooth(&mut values, 12, bias);
        assert!(values.iter().all(|&v| (v - 4.0).abs() < 1e-12), "bias {bias}");
    }
}

#[test]
fn test_smooth_past_only_window_at_start_is_finite() {
    let mut values = vec![2.0, 4.0, 6.0];
    smooth(&mut values, 3, -1.0);
    assert!(values.iter().all(|v| v.is_finite()));
    assert_eq!(values[0], 2.0);
}

#[test]
fn test_smooth_empty_and_zero_window() {
    let mut empty: Vec<f64> = vec![];
    smooth(&mut empty, 5, 0.0);

    let mut values = vec![1.0, 2.0];
    smooth(&mut values, 0, 1.0);
    assert_eq!(values, vec![1.0, 2.0]);
}

#[test]
fn test_correct_reduces_variance() {
    let n = 300;
    let path: Vec<f64> = (0..n)
        .map(|i| 0.1 * i as f64 + 2.0 * (std::f64::consts::TAU * i as f64 / 10.0).sin())
        .collect();

    let mut raw = RotationTimeline::new();
    for i in 0..n {
        let delta = if i == 0 { path[0] } else { path[i] - path[i - 1] };
        let t = i as f64 / 30.0;
        raw.add(sample(t + ROTATION_TIME_INSTANT, t + 1.0 / 30.0, delta));
    }

    let mut corrections = RotationTimeline::new();
    raw.correct(&Smoothing::uniform(30, 0.0), &mut corrections);
    assert_eq!(corrections.len(), n);

    let yaw: Vec<f64> = corrections.iter().map(|s| s.yaw).collect();
    assert!(
        variance(&yaw) < variance(&path),
        "{} >= {}",
        variance(&yaw),
        variance(&path)
    );
    assert!(corrections.iter().all(|s| !s.updated));
    assert!(corrections.iter().all(|s| s.pitch == 0.0 && s.roll == 0.0));
}

#[test]
fn test_correct_keeps_sample_times() {
    let mut raw = RotationTimeline::new();
    raw.add(sample(0.0, 1.0, 1.0));
    raw.add(sample(1.5, 2.0, -3.0));

    let mut corrections = RotationTimeline::new();
    raw.correct(&Smoothing::uniform(1, 1.0), &mut corrections);
    assert_eq!(times(&corrections), times(&raw));
    // a one-sample window starting at the sample smooths nothing
    assert!(corrections.iter().all(|s| s.yaw.abs() < 1e-12));
}

// ============================================================================
// Merge and queries
// ============================================================================

#[test]
fn test_merge_prefers_updated_and_fills_gaps() {
    let mut on_disk = RotationTimeline::new();
    on_disk.add(sample(0.0, 1.0, 1.0));
    on_disk.add(sample(2.0, 3.0, 2.0));

    let mut fresh = RotationTimeline::new();
    fresh.add(RotationSample::new(0.1, 0.9, Rotation::new(5.0, 0.0, 0.0), true));
    fresh.add(sample(2.5, 2.8, 7.0));
    fresh.add(sample(4.0, 5.0, 3.0));

    on_disk.merge(&fresh);
    let merged: Vec<(f64, f64, f64)> = on_disk
        .iter()
        .map(|s| (s.previous_time, s.time, s.yaw))
        .collect();
    assert_eq!(
        merged,
        vec![(0.1, 0.9, 5.0), (2.0, 3.0, 2.0), (4.0, 5.0, 3.0)]
    );
}

#[test]
fn test_clear_updated() {
    let mut timeline = RotationTimeline::new();
    timeline.add(RotationSample::new(0.0, 1.0, Rotation::ZERO, true));
    timeline.add(RotationSample::new(1.5, 2.0, Rotation::ZERO, true));
    timeline.clear_updated();
    assert!(timeline.iter().all(|s| !s.updated));
}

#[test]
fn test_find_first_skip() {
    let mut timeline = RotationTimeline::new();
    assert_eq!(timeline.find_first_skip(), None);

    for t in [1.0, 2.0, 3.0, 4.0, 7.0, 8.0] {
        timeline.add(sample(t - 0.5, t, 0.0));
    }
    assert_eq!(timeline.find_first_skip(), Some(3));

    let mut regular = RotationTimeline::new();
    for i in 1..10 {
        regular.add(sample(i as f64 - 0.5, i as f64, 0.0));
    }
    assert_eq!(regular.find_first_skip(), None);
}

#[test]
fn test_max_magnitude() {
    let mut timeline = RotationTimeline::new();
    timeline.add(RotationSample::new(0.0, 1.0, Rotation::new(-3.0, 1.0, 0.5), false));
    timeline.add(RotationSample::new(1.5, 2.0, Rotation::new(2.0, -4.0, 0.25), false));
    assert_eq!(timeline.max_magnitude(), Rotation::new(3.0, 4.0, 0.5));
    assert_eq!(RotationTimeline::new().max_magnitude(), Rotation::ZERO);
}

// ============================================================================
// Persistence
// ============================================================================

#[test]
fn test_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("samples.bin");
    let path = path.to_str().unwrap();

    let mut timeline = RotationTimeline::new();
    for i in 0..25 {
        let t = i as f64 / 29.97;
        timeline.add(RotationSample::new(
            t + ROTATION_TIME_INSTANT,
            t + 1.0 / 29.97,
            Rotation::new(i as f64 * 0.013, -0.7 / (i + 1) as f64, 1e-9 * i as f64),
            true,
        ));
    }
    timeline.write(path).unwrap();

    let loaded = RotationTimeline::load(path);
    assert_eq!(loaded.len(), timeline.len());
    for (a, b) in loaded.iter().zip(timeline.iter()) {
        assert_eq!(a.previous_time, b.previous_time);
        assert_eq!(a.time, b.time);
        assert_eq!(a.rotation(), b.rotation());
        assert!(!a.updated);
    }
    assert_eq!(loaded.min_span(), timeline.min_span());

    let size = std::fs::metadata(path).unwrap().len() as usize;
    assert_eq!(size, 8 + 25 * SAMPLE_RECORD_SIZE);
}

#[test]
fn test_file_layout_is_count_then_records() {
    let mut timeline = RotationTimeline::new();
    timeline.add(RotationSample::new(0.25, 0.5, Rotation::new(1.5, -2.0, 0.125), true));
    timeline.add(RotationSample::new(0.5001, 0.75, Rotation::new(-3.0, 0.0, 8.0), true));

    let mut bytes = Vec::new();
    timeline.write_to(&mut bytes).unwrap();
    assert_eq!(SAMPLE_RECORD_SIZE, 40);
    assert_eq!(bytes.len(), 8 + 2 * SAMPLE_RECORD_SIZE);

    let mut expected = 2u64.to_le_bytes().to_vec();
    for value in [0.25, 0.5, 1.5, -2.0, 0.125, 0.5001, 0.75, -3.0, 0.0, 8.0f64] {
        expected.extend_from_slice(&value.to_le_bytes());
    }
    assert_eq!(bytes, expected);

    let mut decoded = RotationTimeline::new();
    assert_eq!(decoded.read_from(expected.as_slice()), 2);
    assert_eq!(times(&decoded), times(&timeline));
    assert_eq!(decoded.get(1).map(|s| s.rotation()), Some(Rotation::new(-3.0, 0.0, 8.0)));
}

#[test]
fn test_file_url_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("url.bin");
    let url = format!("file://{}", path.to_str().unwrap());

    let mut timeline = RotationTimeline::new();
    timeline.add(sample(0.0, 1.0, 4.0));
    timeline.write(&url).unwrap();

    assert!(path.exists());
    assert_eq!(RotationTimeline::load(&url).len(), 1);
}

#[test]
fn test_missing_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.bin");
    let timeline = RotationTimeline::load(path.to_str().unwrap());
    assert!(timeline.is_empty());
}

#[test]
fn test_truncated_file_keeps_complete_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("truncated.bin");
    let path_str = path.to_str().unwrap();

    let mut timeline = RotationTimeline::new();
    for i in 0..3 {
        timeline.add(sample(i as f64, i as f64 + 0.5, i as f64));
    }
    timeline.write(path_str).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    std::fs::write(&path, &bytes[..8 + 2 * SAMPLE_RECORD_SIZE + 10]).unwrap();

    let loaded = RotationTimeline::load(path_str);
    assert_eq!(times(&loaded), vec![(0.0, 0.5), (1.0, 1.5)]);

    std::fs::write(&path, [1u8, 2, 3]).unwrap();
    assert!(RotationTimeline::load(path_str).is_empty());
}

#[test]
fn test_read_appends_to_existing_samples() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("append.bin");
    let path = path.to_str().unwrap();

    let mut stored = RotationTimeline::new();
    stored.add(sample(2.0, 3.0, 1.0));
    stored.write(path).unwrap();

    let mut timeline = RotationTimeline::new();
    timeline.add(sample(0.0, 1.0, 0.0));
    assert_eq!(timeline.read(path), 1);
    assert_eq!(times(&timeline), vec![(0.0, 1.0), (2.0, 3.0)]);
}

#[test]
fn test_write_into_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no_such_dir").join("samples.bin");
    let err = RotationTimeline::new()
        .write(path.to_str().unwrap())
        .unwrap_err();
    assert!(matches!(err, Error::CreateFile { .. }));
}

#[test]
fn test_parse_file_name() {
    use std::path::PathBuf;

    assert_eq!(
        parse_file_name("file:///home/user/clip.bin"),
        PathBuf::from("/home/user/clip.bin")
    );
    assert_eq!(
        parse_file_name("file:///C:/clips/clip.bin"),
        PathBuf::from("C:/clips/clip.bin")
    );
    assert_eq!(parse_file_name("/tmp/clip.bin"), PathBuf::from("/tmp/clip.bin"));
    assert_eq!(parse_file_name("relative.bin"), PathBuf::from("relative.bin"));
    assert_eq!(parse_file_name("file:///"), PathBuf::from("file:///"));
}
