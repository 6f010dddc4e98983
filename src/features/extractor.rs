//! Keypoint detection over an image pyramid

use super::config::{FeatureConfig, FeatureError};
use super::descriptor::{gradient_histogram, intensity_angle};
use super::types::{Descriptor, FeatureSet, Keypoint};
use image::GrayImage;
use image::imageops::{FilterType, resize};
use imageproc::corners::{Corner, corners_fast9};
use imageproc::filter::gaussian_blur_f32;
use rayon::prelude::*;

/// Turns a grayscale raster into keypoints + descriptors.
///
/// An empty `FeatureSet` is a normal result for images without texture;
/// callers must treat it as "nothing to match", not as an error.
pub trait FeatureExtractor: Send + Sync {
    fn extract(&self, image: &GrayImage) -> FeatureSet;

    /// Checked once before a detection run starts.
    fn ensure_available(&self) -> Result<(), FeatureError> {
        Ok(())
    }
}

/// FAST-9 corners, oriented by intensity centroid, described with gradient
/// histograms. Scale tolerance comes from running on every pyramid level.
#[derive(Debug, Clone, Default)]
pub struct OrientedFastExtractor {
    config: FeatureConfig,
}

impl OrientedFastExtractor {
    pub fn new(config: FeatureConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    fn detect_level(&self, level: &GrayImage, scale: f32, octave: u8) -> Vec<(Keypoint, Descriptor)> {
        let (width, height) = level.dimensions();
        let margin = self.config.edge_margin;
        let radius = self.config.patch_radius;

        let corners = corners_fast9(level, self.config.fast_threshold);
        let corners = suppress_non_maxima(&corners, width, height, self.config.nms_radius);

        corners
            .par_iter()
            .filter(|c| {
                c.x >= margin && c.y >= margin && c.x + margin < width && c.y + margin < height
            })
            .filter_map(|c| {
                let (x, y) = (c.x as f32, c.y as f32);
                let angle = intensity_angle(level, x, y, radius);
                let descriptor = gradient_histogram(level, x, y, angle, radius)?;
                let keypoint = Keypoint {
                    x: (x + 0.5) * scale - 0.5,
                    y: (y + 0.5) * scale - 0.5,
                    angle,
                    octave,
                    size: 2.0 * radius as f32 * scale,
                    response: c.score,
                };
                Some((keypoint, descriptor))
            })
            .collect()
    }
}

impl FeatureExtractor for OrientedFastExtractor {
    fn extract(&self, image: &GrayImage) -> FeatureSet {
        if self.config.validate().is_err() {
            return FeatureSet::new();
        }

        let min_side = self.config.min_level_side();
        let mut found = Vec::new();
        let mut scale = 1.0f32;

        for octave in 0..self.config.pyramid_levels {
            let width = (image.width() as f32 / scale).round() as u32;
            let height = (image.height() as f32 / scale).round() as u32;
            if width < min_side || height < min_side {
                break;
            }

            let level = if octave == 0 {
                gaussian_blur_f32(image, self.config.blur_sigma)
            } else {
                let shrunk = resize(image, width, height, FilterType::Triangle);
                gaussian_blur_f32(&shrunk, self.config.blur_sigma)
            };

            let level_features = self.detect_level(&level, scale, octave as u8);
            log::trace!(
                "level {} ({}x{}): {} keypoints",
                octave,
                width,
                height,
                level_features.len()
            );
            found.extend(level_features);
            scale *= self.config.pyramid_scale;
        }

        // Keep the strongest corners; stable sort keeps detection order on ties
        found.sort_by(|a, b| b.0.response.total_cmp(&a.0.response));
        found.truncate(self.config.max_keypoints);

        FeatureSet::from_pairs(found)
    }

    fn ensure_available(&self) -> Result<(), FeatureError> {
        self.config.validate()
    }
}

/// Drop every corner that has a stronger corner within `radius` pixels
/// (Chebyshev distance). Equal scores keep the corner that comes first in
/// row-major order, so the result does not depend on where the pattern sits
/// in the image.
pub(super) fn suppress_non_maxima(
    corners: &[Corner],
    width: u32,
    height: u32,
    radius: u32,
) -> Vec<Corner> {
    if radius == 0 || corners.is_empty() {
        return corners.to_vec();
    }

    let w = width as usize;
    let mut scores = vec![f32::NEG_INFINITY; w * height as usize];
    for c in corners {
        scores[c.y as usize * w + c.x as usize] = c.score;
    }

    corners
        .iter()
        .filter(|c| {
            let y_range = c.y.saturating_sub(radius)..=(c.y + radius).min(height - 1);
            for ny in y_range {
                for nx in c.x.saturating_sub(radius)..=(c.x + radius).min(width - 1) {
                    if (nx, ny) == (c.x, c.y) {
                        continue;
                    }
                    let other = scores[ny as usize * w + nx as usize];
                    if other > c.score || (other == c.score && (ny, nx) < (c.y, c.x)) {
                        return false;
                    }
                }
            }
            true
        })
        .cloned()
        .collect()
}
