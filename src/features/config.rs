//! Configuration for keypoint detection and description

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raised when the extractor cannot run with the given parameters.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FeatureError {
    #[error("Invalid feature parameter '{field}': {reason}")]
    InvalidParameter { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// FAST-9 intensity threshold
    pub fast_threshold: u8,
    /// Number of pyramid levels, level 0 is the input image
    pub pyramid_levels: usize,
    /// Downscale factor between consecutive levels
    pub pyramid_scale: f32,
    /// Gaussian blur applied to each level before detection
    pub blur_sigma: f32,
    /// Half side of the square patch described around each keypoint
    pub patch_radius: u32,
    /// Corners with a stronger neighbour within this radius are dropped
    pub nms_radius: u32,
    /// Corners closer than this to the level border are ignored
    pub edge_margin: u32,
    /// Strongest keypoints kept per image
    pub max_keypoints: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            fast_threshold: 20,
            pyramid_levels: 3,
            pyramid_scale: 1.5,
            blur_sigma: 1.0,
            patch_radius: 8,
            nms_radius: 2,
            edge_margin: 4,
            max_keypoints: 2000,
        }
    }
}

impl FeatureConfig {
    pub fn validate(&self) -> Result<(), FeatureError> {
        let invalid = |field: &'static str, reason: &str| {
            Err(FeatureError::InvalidParameter {
                field,
                reason: reason.to_string(),
            })
        };

        if self.pyramid_levels == 0 {
            return invalid("pyramid_levels", "at least one level is required");
        }
        if self.pyramid_levels > 1 && !(self.pyramid_scale > 1.0) {
            return invalid("pyramid_scale", "must be greater than 1.0");
        }
        if !(self.blur_sigma > 0.0) {
            return invalid("blur_sigma", "must be positive");
        }
        if self.patch_radius < 2 {
            return invalid("patch_radius", "must be at least 2");
        }
        if self.max_keypoints == 0 {
            return invalid("max_keypoints", "must be at least 1");
        }
        Ok(())
    }

    /// Smallest level side that still leaves room for detection.
    pub fn min_level_side(&self) -> u32 {
        2 * self.edge_margin + 8
    }
}
