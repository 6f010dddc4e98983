// Keypoint and descriptor types shared by extraction and matching

/// 4x4 spatial cells x 8 orientation bins.
pub const DESCRIPTOR_LEN: usize = 128;

pub type Descriptor = [f32; DESCRIPTOR_LEN];

/// A distinctive image location, in full-resolution pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    /// Patch orientation in radians
    pub angle: f32,
    /// Pyramid level the keypoint was found on
    pub octave: u8,
    /// Diameter of the described patch in full-resolution pixels
    pub size: f32,
    /// FAST corner score
    pub response: f32,
}

impl Keypoint {
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            angle: 0.0,
            octave: 0,
            size: 0.0,
            response: 0.0,
        }
    }

    pub fn point(&self) -> (f32, f32) {
        (self.x, self.y)
    }
}

/// Keypoints and their descriptors; row `i` of the descriptor matrix belongs
/// to keypoint `i`.
#[derive(Debug, Clone, Default)]
pub struct FeatureSet {
    keypoints: Vec<Keypoint>,
    descriptors: Vec<Descriptor>,
}

impl FeatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (Keypoint, Descriptor)>) -> Self {
        let mut set = Self::new();
        for (keypoint, descriptor) in pairs {
            set.push(keypoint, descriptor);
        }
        set
    }

    pub fn push(&mut self, keypoint: Keypoint, descriptor: Descriptor) {
        self.keypoints.push(keypoint);
        self.descriptors.push(descriptor);
    }

    pub fn keypoints(&self) -> &[Keypoint] {
        &self.keypoints
    }

    pub fn descriptors(&self) -> &[Descriptor] {
        &self.descriptors
    }

    pub fn len(&self) -> usize {
        self.keypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keypoints.is_empty()
    }
}
