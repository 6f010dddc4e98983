//! Density clustering of matched screen points and click target choice

use rand::Rng;
use rand::seq::SliceRandom;

/// Screen-space points believed to belong to one on-screen instance
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    points: Vec<(f32, f32)>,
}

impl Cluster {
    pub fn points(&self) -> &[(f32, f32)] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Arithmetic mean of the members
    pub fn centroid(&self) -> (f32, f32) {
        let n = self.points.len().max(1) as f32;
        let (sx, sy) = self
            .points
            .iter()
            .fold((0.0f32, 0.0f32), |(ax, ay), (x, y)| (ax + x, ay + y));
        (sx / n, sy / n)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Label {
    Unvisited,
    Noise,
    Member(usize),
}

/// DBSCAN over 2-D points.
///
/// A point is a core point when at least `min_points` points (itself
/// included) lie within `eps`. Clusters are the points density-reachable
/// from a core point; everything else is noise and dropped. Clusters smaller
/// than `min_points` are discarded as well.
pub fn dbscan(points: &[(f32, f32)], eps: f32, min_points: usize) -> Vec<Cluster> {
    let min_points = min_points.max(1);
    let eps_sq = eps * eps;
    let neighbours = |i: usize| -> Vec<usize> {
        let (x, y) = points[i];
        points
            .iter()
            .enumerate()
            .filter(|(_, (px, py))| (px - x) * (px - x) + (py - y) * (py - y) <= eps_sq)
            .map(|(j, _)| j)
            .collect()
    };

    let mut labels = vec![Label::Unvisited; points.len()];
    let mut cluster_count = 0usize;

    for i in 0..points.len() {
        if labels[i] != Label::Unvisited {
            continue;
        }
        let seeds = neighbours(i);
        if seeds.len() < min_points {
            labels[i] = Label::Noise;
            continue;
        }

        let id = cluster_count;
        cluster_count += 1;
        labels[i] = Label::Member(id);

        let mut queue = seeds;
        while let Some(j) = queue.pop() {
            match labels[j] {
                Label::Noise => labels[j] = Label::Member(id), // border point
                Label::Unvisited => {
                    labels[j] = Label::Member(id);
                    let reachable = neighbours(j);
                    if reachable.len() >= min_points {
                        queue.extend(reachable);
                    }
                }
                Label::Member(_) => {}
            }
        }
    }

    let mut clusters = vec![Vec::new(); cluster_count];
    for (point, label) in points.iter().zip(&labels) {
        if let Label::Member(id) = label {
            clusters[*id].push(*point);
        }
    }
    clusters
        .into_iter()
        .filter(|members| members.len() >= min_points)
        .map(|points| Cluster { points })
        .collect()
}

/// Picks the click target among the clusters of one template's matches
#[derive(Debug, Clone, Copy)]
pub struct ClusterSelector {
    radius_factor: f32,
    min_points: usize,
}

impl ClusterSelector {
    pub fn new(radius_factor: f32, min_points: usize) -> Self {
        Self {
            radius_factor,
            min_points,
        }
    }

    /// Neighbourhood radius for a template of the given size: keypoints of a
    /// larger template spread further apart on screen.
    pub fn radius_for(&self, width: u32, height: u32) -> f32 {
        let (w, h) = (width as f32, height as f32);
        self.radius_factor * (w * w + h * h).sqrt()
    }

    pub fn clusters(&self, points: &[(f32, f32)], width: u32, height: u32) -> Vec<Cluster> {
        dbscan(points, self.radius_for(width, height), self.min_points)
    }

    /// One valid cluster chosen uniformly at random, so repeated instances
    /// of a template all get clicked over successive ticks.
    pub fn select<R: Rng + ?Sized>(
        &self,
        points: &[(f32, f32)],
        width: u32,
        height: u32,
        rng: &mut R,
    ) -> Option<Cluster> {
        let clusters = self.clusters(points, width, height);
        log::trace!(
            "{} matched points -> {} clusters (eps {:.1})",
            points.len(),
            clusters.len(),
            self.radius_for(width, height)
        );
        clusters.choose(rng).cloned()
    }
}
