//! Two-nearest-neighbour search over descriptor rows.
//!
//! The kd-tree splits on the highest-variance dimension at the median and is
//! searched best-bin-first: unexplored branches wait in a priority queue
//! keyed by a lower bound of their distance, and the search stops after
//! `checks` descriptors have been compared. With unlimited checks the result
//! is exact.

use super::types::{Correspondence, KnnMatch};
use crate::features::{DESCRIPTOR_LEN, Descriptor};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatcherKind {
    /// Approximate search, FLANN-like
    KdTree { leaf_size: usize, checks: usize },
    /// Exact search, compares every row
    BruteForce,
}

impl Default for MatcherKind {
    fn default() -> Self {
        MatcherKind::KdTree {
            leaf_size: 8,
            checks: 50,
        }
    }
}

/// Search structure over one frame's descriptors, built once per scan tick
/// and queried with every template.
pub enum DescriptorIndex<'a> {
    KdTree(KdTree<'a>),
    BruteForce(&'a [Descriptor]),
}

impl<'a> DescriptorIndex<'a> {
    pub fn build(descriptors: &'a [Descriptor], kind: MatcherKind) -> Self {
        match kind {
            MatcherKind::KdTree { leaf_size, checks } => {
                DescriptorIndex::KdTree(KdTree::build(descriptors, leaf_size, checks))
            }
            MatcherKind::BruteForce => DescriptorIndex::BruteForce(descriptors),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            DescriptorIndex::KdTree(tree) => tree.len(),
            DescriptorIndex::BruteForce(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Two nearest rows for `query`, or `None` when the index holds fewer
    /// than two rows.
    pub fn knn2(&self, template_idx: usize, query: &Descriptor) -> Option<KnnMatch> {
        if self.len() < 2 {
            return None;
        }
        let best = match self {
            DescriptorIndex::KdTree(tree) => tree.search(query),
            DescriptorIndex::BruteForce(rows) => {
                let mut best = Best2::new();
                for (i, row) in rows.iter().enumerate() {
                    best.offer(i, squared_distance(query, row));
                }
                best
            }
        };
        best.into_match(template_idx)
    }
}

#[inline]
pub fn squared_distance(a: &Descriptor, b: &Descriptor) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// The two smallest squared distances seen so far
#[derive(Debug, Clone, Copy)]
struct Best2 {
    first: Option<(usize, f32)>,
    second: Option<(usize, f32)>,
}

impl Best2 {
    fn new() -> Self {
        Self {
            first: None,
            second: None,
        }
    }

    fn offer(&mut self, idx: usize, d2: f32) {
        match self.first {
            Some((_, best)) if d2 >= best => {
                if self.second.is_none_or(|(_, second)| d2 < second) {
                    self.second = Some((idx, d2));
                }
            }
            _ => {
                self.second = self.first;
                self.first = Some((idx, d2));
            }
        }
    }

    fn is_full(&self) -> bool {
        self.second.is_some()
    }

    /// Current pruning radius (squared)
    fn worst(&self) -> f32 {
        self.second.map_or(f32::INFINITY, |(_, d2)| d2)
    }

    fn into_match(self, template_idx: usize) -> Option<KnnMatch> {
        let (Some((i1, d1)), Some((i2, d2))) = (self.first, self.second) else {
            return None;
        };
        Some(KnnMatch {
            nearest: Correspondence {
                template_idx,
                frame_idx: i1,
                distance: d1.sqrt(),
            },
            second: Correspondence {
                template_idx,
                frame_idx: i2,
                distance: d2.sqrt(),
            },
        })
    }
}

#[derive(Debug, Clone, Copy)]
enum Node {
    Leaf { start: usize, end: usize },
    Split { dim: usize, value: f32, left: usize, right: usize },
}

pub struct KdTree<'a> {
    points: &'a [Descriptor],
    indices: Vec<usize>,
    nodes: Vec<Node>,
    checks: usize,
}

/// Branch waiting in the best-bin-first queue, smallest bound first
#[derive(Debug, Clone, Copy)]
struct Pending {
    bound: f32,
    node: usize,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap
        other.bound.total_cmp(&self.bound)
    }
}

impl<'a> KdTree<'a> {
    pub fn build(points: &'a [Descriptor], leaf_size: usize, checks: usize) -> Self {
        let mut tree = Self {
            points,
            indices: (0..points.len()).collect(),
            nodes: Vec::new(),
            checks: checks.max(1),
        };
        if !points.is_empty() {
            tree.build_node(0, points.len(), leaf_size.max(1));
        }
        tree
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    fn build_node(&mut self, start: usize, end: usize, leaf_size: usize) -> usize {
        let id = self.nodes.len();
        self.nodes.push(Node::Leaf { start, end });

        if end - start <= leaf_size {
            return id;
        }
        let Some(dim) = self.widest_dimension(start, end) else {
            // All rows identical, nothing to split on
            return id;
        };

        let points = self.points;
        self.indices[start..end].sort_by(|&a, &b| points[a][dim].total_cmp(&points[b][dim]));
        let mid = start + (end - start) / 2;
        let value = points[self.indices[mid]][dim];

        let left = self.build_node(start, mid, leaf_size);
        let right = self.build_node(mid, end, leaf_size);
        self.nodes[id] = Node::Split {
            dim,
            value,
            left,
            right,
        };
        id
    }

    /// Dimension with the largest variance over rows `start..end`.
    fn widest_dimension(&self, start: usize, end: usize) -> Option<usize> {
        let n = (end - start) as f32;
        let mut mean = [0.0f32; DESCRIPTOR_LEN];
        for &i in &self.indices[start..end] {
            for (m, v) in mean.iter_mut().zip(self.points[i].iter()) {
                *m += v;
            }
        }
        mean.iter_mut().for_each(|m| *m /= n);

        let mut variance = [0.0f32; DESCRIPTOR_LEN];
        for &i in &self.indices[start..end] {
            for ((var, m), v) in variance.iter_mut().zip(mean.iter()).zip(self.points[i].iter()) {
                *var += (v - m) * (v - m);
            }
        }

        variance
            .iter()
            .enumerate()
            .filter(|(_, var)| **var > 0.0)
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(dim, _)| dim)
    }

    fn search(&self, query: &Descriptor) -> Best2 {
        let mut best = Best2::new();
        if self.nodes.is_empty() {
            return best;
        }

        let mut queue = BinaryHeap::new();
        queue.push(Pending { bound: 0.0, node: 0 });
        let mut checked = 0usize;

        while let Some(Pending { bound, node }) = queue.pop() {
            if bound >= best.worst() {
                break;
            }
            if checked >= self.checks && best.is_full() {
                break;
            }

            let mut current = node;
            loop {
                match self.nodes[current] {
                    Node::Split {
                        dim,
                        value,
                        left,
                        right,
                    } => {
                        let diff = query[dim] - value;
                        let (near, far) = if diff < 0.0 { (left, right) } else { (right, left) };
                        // Any row behind the far side is at least |diff| away on `dim`
                        let far_bound = bound.max(diff * diff);
                        if far_bound < best.worst() {
                            queue.push(Pending {
                                bound: far_bound,
                                node: far,
                            });
                        }
                        current = near;
                    }
                    Node::Leaf { start, end } => {
                        for &i in &self.indices[start..end] {
                            best.offer(i, squared_distance(query, &self.points[i]));
                        }
                        checked += end - start;
                        break;
                    }
                }
            }
        }
        best
    }
}
