/// Descriptor matching and spatial clustering
///
/// This module provides:
/// - k=2 nearest neighbour search over frame descriptors (kd-tree with
///   best-bin-first search, or exact brute force)
/// - Lowe's ratio test to keep unambiguous correspondences
/// - DBSCAN clustering of matched screen points and the click target choice
pub mod cluster;
pub mod knn;
pub mod matcher;
pub mod types;


pub use cluster::{Cluster, ClusterSelector, dbscan};
pub use knn::{DescriptorIndex, KdTree, MatcherKind};
pub use matcher::FeatureMatcher;
pub use types::{Correspondence, KnnMatch};
