use super::*;
use crate::frame::{pack, unpack, FrameView};
use rand::{Rng, SeedableRng};

fn gradient_pixels(width: usize, height: usize) -> Vec<u32> {
    (0..width * height)
        .map(|i| pack([(i * 7) as u8, (i * 13) as u8, (i * 29) as u8, 255]))
        .collect()
}

#[test]
fn test_mono_midpoint_is_average_of_corners() {
    let pixels = [0u32, 100, 200, 300];
    let frame = FrameView::new(&pixels, 2, 2);
    assert_eq!(sample_mono_bilinear_wrapped_clamped(&frame, 0.5, 0.5), 150);
}

#[test]
fn test_integer_coordinates_return_exact_pixel() {
    let pixels = gradient_pixels(5, 4);
    let frame = FrameView::new(&pixels, 5, 4);
    for y in 0..4 {
        for x in 0..5 {
            let expected = frame.get(x, y);
            assert_eq!(
                sample_bilinear_wrapped_clamped(&frame, x as f64, y as f64),
                expected
            );
            assert_eq!(sample_bilinear(&frame, x as f64, y as f64), expected);
            assert_eq!(sample_nearest(&frame, x as f64, y as f64), expected);
        }
    }
}

#[test]
fn test_horizontal_wraparound() {
    let pixels = gradient_pixels(4, 3);
    let frame = FrameView::new(&pixels, 4, 3);
    for y in [0.0, 1.0, 1.5, 2.0] {
        assert_eq!(
            sample_bilinear_wrapped_clamped(&frame, 4.0, y),
            sample_bilinear_wrapped_clamped(&frame, 0.0, y)
        );
        assert_eq!(
            sample_bilinear_wrapped_clamped(&frame, -1.0, y),
            sample_bilinear_wrapped_clamped(&frame, 3.0, y)
        );
        assert_eq!(
            sample_mono_bilinear_wrapped_clamped(&frame, 4.0, y),
            sample_mono_bilinear_wrapped_clamped(&frame, 0.0, y)
        );
    }
}

#[test]
fn test_wraparound_blends_last_and_first_column() {
    let pixels = [pack([0, 0, 0, 0]), pack([10, 10, 10, 10]), pack([200, 100, 50, 20])];
    let frame = FrameView::new(&pixels, 3, 1);
    // halfway between column 2 and column 0
    let blended = unpack(sample_bilinear_wrapped_clamped(&frame, 2.5, 0.0));
    assert_eq!(blended, [100, 50, 25, 10]);
}

#[test]
fn test_vertical_clamp() {
    let pixels = gradient_pixels(4, 3);
    let frame = FrameView::new(&pixels, 4, 3);
    for x in [0.0, 1.25, 3.5] {
        assert_eq!(
            sample_bilinear_wrapped_clamped(&frame, x, 3.0),
            sample_bilinear_wrapped_clamped(&frame, x, 2.0)
        );
        assert_eq!(
            sample_bilinear_wrapped_clamped(&frame, x, -5.0),
            sample_bilinear_wrapped_clamped(&frame, x, 0.0)
        );
    }
}

#[test]
fn test_rgba_channels_blend_independently() {
    let pixels = [pack([0, 255, 0, 255]), pack([255, 0, 255, 0])];
    let frame = FrameView::new(&pixels, 2, 1);
    let mid = unpack(sample_bilinear(&frame, 0.5, 0.0));
    assert_eq!(mid, [127, 127, 127, 127]);
}

#[test]
fn test_bilinear_stays_within_corner_range() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(42);
    let (w, h) = (9, 7);
    let pixels: Vec<u32> = (0..w * h).map(|_| rng.random()).collect();
    let frame = FrameView::new(&pixels, w, h);

    for _ in 0..2000 {
        let ix = rng.random_range(0..w);
        let iy = rng.random_range(0..h - 1);
        let fx = rng.random_range(0..128) as f64 / 128.0;
        let fy = rng.random_range(0..128) as f64 / 128.0;
        let result = unpack(sample_bilinear_wrapped_clamped(
            &frame,
            ix as f64 + fx,
            iy as f64 + fy,
        ));

        let corners = [
            unpack(frame.get(ix, iy)),
            unpack(frame.get((ix + 1) % w, iy)),
            unpack(frame.get(ix, iy + 1)),
            unpack(frame.get((ix + 1) % w, iy + 1)),
        ];
        for c in 0..4 {
            let lo = corners.iter().map(|p| p[c]).min().unwrap();
            let hi = corners.iter().map(|p| p[c]).max().unwrap();
            assert!(
                (lo..=hi).contains(&result[c]),
                "channel {c}: {} outside [{lo}, {hi}]",
                result[c]
            );
        }
    }
}

#[test]
fn test_plain_bilinear_outside_is_zero() {
    let pixels = gradient_pixels(3, 3);
    let frame = FrameView::new(&pixels, 3, 3);
    assert_eq!(sample_bilinear(&frame, -0.5, 1.0), 0);
    assert_eq!(sample_bilinear(&frame, 1.0, 3.0), 0);
    assert_eq!(sample_bilinear(&frame, f64::NAN, 1.0), 0);
    // last column has no right neighbour
    assert_eq!(sample_bilinear(&frame, 2.5, 1.0), frame.get(2, 1));
}

#[test]
fn test_nearest_truncates() {
    let pixels = gradient_pixels(4, 4);
    let frame = FrameView::new(&pixels, 4, 4);
    assert_eq!(sample_nearest(&frame, 1.9, 2.99), frame.get(1, 2));
    assert_eq!(sample_nearest(&frame, 7.0, 9.0), frame.get(3, 3));
}

#[test]
fn test_interpolation_from_index() {
    assert_eq!(Interpolation::from_index(0), Interpolation::Nearest);
    assert_eq!(Interpolation::from_index(1), Interpolation::Bilinear);
    assert_eq!(Interpolation::from_index(2), Interpolation::MonoBilinear);
    assert_eq!(Interpolation::from_index(9), Interpolation::Bilinear);
    assert_eq!(Interpolation::from_index(-1), Interpolation::Bilinear);
}

#[test]
fn test_sample_dispatch() {
    let pixels = [0u32, 100, 200, 300];
    let frame = FrameView::new(&pixels, 2, 2);
    assert_eq!(sample(&frame, 0.5, 0.5, Interpolation::MonoBilinear), 150);
    assert_eq!(sample(&frame, 0.5, 0.5, Interpolation::Nearest), 0);
}
