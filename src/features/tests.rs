//! Tests for feature extraction

use super::extractor::suppress_non_maxima;
use super::{FeatureConfig, FeatureError, FeatureExtractor, OrientedFastExtractor};
use crate::test_utils::{flat_image, paste, squares_image};
use image::GrayImage;
use image::imageops::{rotate90, rotate180};
use imageproc::corners::Corner;

fn extractor() -> OrientedFastExtractor {
    OrientedFastExtractor::new(FeatureConfig::default())
}

#[test]
fn test_textureless_image_yields_empty_set() {
    let features = extractor().extract(&flat_image(120, 90));
    assert!(features.is_empty());
    assert!(features.descriptors().is_empty());
}

#[test]
fn test_tiny_image_yields_empty_set() {
    let features = extractor().extract(&flat_image(5, 5));
    assert!(features.is_empty());
}

#[test]
fn test_textured_image_has_keypoints_inside_bounds() {
    let img = squares_image(160, 120, 20, 7);
    let features = extractor().extract(&img);

    assert!(features.len() >= 10, "only {} keypoints", features.len());
    assert_eq!(features.keypoints().len(), features.descriptors().len());
    for kp in features.keypoints() {
        assert!(kp.x >= 0.0 && kp.x < 160.0, "x out of bounds: {}", kp.x);
        assert!(kp.y >= 0.0 && kp.y < 120.0, "y out of bounds: {}", kp.y);
    }
    for desc in features.descriptors() {
        let norm = desc.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-3);
    }
}

#[test]
fn test_repeated_extraction_is_stable() {
    let img = squares_image(128, 128, 16, 11);
    let ex = extractor();
    let first = ex.extract(&img);
    let second = ex.extract(&img);
    assert!(!first.is_empty());
    assert_eq!(first.len(), second.len());
    assert_eq!(first.keypoints(), second.keypoints());
}

#[test]
fn test_keypoint_cap_is_respected() {
    let config = FeatureConfig {
        max_keypoints: 5,
        ..FeatureConfig::default()
    };
    let features = OrientedFastExtractor::new(config).extract(&squares_image(160, 120, 20, 3));
    assert_eq!(features.len(), 5);
    // Strongest first
    let responses: Vec<f32> = features.keypoints().iter().map(|k| k.response).collect();
    assert!(responses.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn test_pasted_patch_keypoints_reappear_shifted() {
    let template = squares_image(96, 96, 14, 21);
    let mut frame = flat_image(320, 240);
    paste(&mut frame, &template, 100, 60);

    let ex = extractor();
    let t = ex.extract(&template);
    let f = ex.extract(&frame);

    // Every interior level-0 template keypoint has an identical twin in the frame
    let interior: Vec<_> = t
        .keypoints()
        .iter()
        .zip(t.descriptors())
        .filter(|(k, _)| k.octave == 0 && k.x > 20.0 && k.x < 76.0 && k.y > 20.0 && k.y < 76.0)
        .collect();
    assert!(!interior.is_empty());

    for (kp, desc) in interior {
        let twin = f.keypoints().iter().zip(f.descriptors()).find(|(fk, _)| {
            fk.octave == 0 && (fk.x - (kp.x + 100.0)).abs() < 0.01 && (fk.y - (kp.y + 60.0)).abs() < 0.01
        });
        let (_, fdesc) = twin.expect("shifted keypoint missing from frame");
        let dist: f32 = desc
            .iter()
            .zip(fdesc.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f32>()
            .sqrt();
        assert!(dist < 1e-2, "descriptor drifted by {dist}");
    }
}

#[test]
fn test_invalid_config_is_unavailable() {
    let config = FeatureConfig {
        pyramid_levels: 0,
        ..FeatureConfig::default()
    };
    let ex = OrientedFastExtractor::new(config);
    assert!(matches!(
        ex.ensure_available(),
        Err(FeatureError::InvalidParameter { field: "pyramid_levels", .. })
    ));
    assert!(ex.extract(&squares_image(64, 64, 6, 1)).is_empty());
    assert!(extractor().ensure_available().is_ok());
}

#[test]
fn test_nms_keeps_local_maximum_only() {
    let corners = vec![
        Corner::new(10, 10, 50.0),
        Corner::new(11, 10, 80.0),
        Corner::new(30, 30, 20.0),
    ];
    let kept = suppress_non_maxima(&corners, 64, 64, 2);
    let positions: Vec<(u32, u32)> = kept.iter().map(|c| (c.x, c.y)).collect();
    assert_eq!(positions, vec![(11, 10), (30, 30)]);
}

#[test]
fn test_nms_tie_prefers_first_in_row_major_order() {
    let corners = vec![Corner::new(12, 5, 40.0), Corner::new(10, 5, 40.0)];
    let kept = suppress_non_maxima(&corners, 32, 32, 2);
    assert_eq!(kept.len(), 1);
    assert_eq!((kept[0].x, kept[0].y), (10, 5));
}

/// Share of interior level-0 keypoints of a template that reappear in its
/// turned copy at `moved(x, y)` with a close descriptor.
fn surviving_share(
    seed: u64,
    turn: fn(&GrayImage) -> GrayImage,
    moved: fn(f32, f32) -> (f32, f32),
) -> f32 {
    let template = squares_image(96, 96, 14, seed);
    let ex = extractor();
    let t = ex.extract(&template);
    let r = ex.extract(&turn(&template));

    let interior: Vec<_> = t
        .keypoints()
        .iter()
        .zip(t.descriptors())
        .filter(|(k, _)| k.octave == 0 && k.x > 16.0 && k.x < 80.0 && k.y > 16.0 && k.y < 80.0)
        .collect();
    assert!(interior.len() >= 10, "only {} interior keypoints", interior.len());

    let survivors = interior
        .iter()
        .filter(|(kp, desc)| {
            let (tx, ty) = moved(kp.x, kp.y);
            r.keypoints().iter().zip(r.descriptors()).any(|(rk, rdesc)| {
                let dist = desc
                    .iter()
                    .zip(rdesc.iter())
                    .map(|(a, b)| (a - b) * (a - b))
                    .sum::<f32>()
                    .sqrt();
                rk.octave == 0 && (rk.x - tx).abs() < 0.01 && (rk.y - ty).abs() < 0.01 && dist < 0.1
            })
        })
        .count();
    survivors as f32 / interior.len() as f32
}

#[test]
fn test_quarter_turned_template_keeps_its_features() {
    for seed in [21, 3] {
        let share = surviving_share(seed, rotate90::<GrayImage>, |x, y| (95.0 - y, x));
        assert!(share >= 0.8, "seed {seed}: only {share:.2} survived");
    }
}

#[test]
fn test_half_turned_template_keeps_its_features() {
    for seed in [21, 3] {
        let share = surviving_share(seed, rotate180::<GrayImage>, |x, y| (95.0 - x, 95.0 - y));
        assert!(share >= 0.8, "seed {seed}: only {share:.2} survived");
    }
}
