/// Matching data types

/// One template descriptor paired with one frame descriptor
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Correspondence {
    /// Row in the template descriptor matrix
    pub template_idx: usize,
    /// Row in the frame descriptor matrix
    pub frame_idx: usize,
    /// Euclidean descriptor distance
    pub distance: f32,
}

/// The two nearest frame descriptors for one template descriptor
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KnnMatch {
    pub nearest: Correspondence,
    pub second: Correspondence,
}

impl KnnMatch {
    /// Lowe's ratio test: the nearest candidate must be clearly closer than
    /// the runner-up. Equidistant candidates (including two exact zeros) fail.
    pub fn passes_ratio(&self, ratio: f32) -> bool {
        self.nearest.distance < ratio * self.second.distance
    }
}
