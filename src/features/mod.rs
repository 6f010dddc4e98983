//! Feature extraction: keypoints with rotation-normalised gradient histogram
//! descriptors, detected over a small image pyramid.

pub mod config;
pub mod descriptor;
pub mod extractor;
pub mod types;

#[cfg(test)]
mod tests;

pub use config::{FeatureConfig, FeatureError};
pub use extractor::{FeatureExtractor, OrientedFastExtractor};
pub use types::{DESCRIPTOR_LEN, Descriptor, FeatureSet, Keypoint};
