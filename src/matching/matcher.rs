/// Ratio-test matching of template descriptors against a frame index

use super::knn::DescriptorIndex;
use super::types::{Correspondence, KnnMatch};
use crate::features::Descriptor;
use rayon::prelude::*;

/// Applies the ratio test and the minimum match count
#[derive(Debug, Clone, Copy)]
pub struct FeatureMatcher {
    ratio_threshold: f32,
    min_good_matches: usize,
}

impl FeatureMatcher {
    pub fn new(ratio_threshold: f32, min_good_matches: usize) -> Self {
        Self {
            ratio_threshold,
            min_good_matches,
        }
    }

    /// k=2 neighbours for every template row.
    ///
    /// Empty when either side has fewer than two rows: there is no second
    /// neighbour to compare against, so nothing can pass the ratio test.
    pub fn knn_match(&self, template: &[Descriptor], frame: &DescriptorIndex) -> Vec<KnnMatch> {
        if template.len() < 2 || frame.len() < 2 {
            return Vec::new();
        }
        template
            .par_iter()
            .enumerate()
            .filter_map(|(i, row)| frame.knn2(i, row))
            .collect()
    }

    /// Nearest correspondences that pass the ratio test, in template row order
    pub fn good_matches(&self, template: &[Descriptor], frame: &DescriptorIndex) -> Vec<Correspondence> {
        self.knn_match(template, frame)
            .into_iter()
            .filter(|m| m.passes_ratio(self.ratio_threshold))
            .map(|m| m.nearest)
            .collect()
    }

    /// Enough good matches for the template to count as seen this tick
    pub fn qualifies(&self, good: &[Correspondence]) -> bool {
        good.len() >= self.min_good_matches
    }

    pub fn min_good_matches(&self) -> usize {
        self.min_good_matches
    }
}
