//! Template images and their precomputed features

use super::channels::StatusReporter;
use super::error::{EngineError, EngineResult};
use super::types::EngineStatus;
use crate::features::{FeatureExtractor, FeatureSet};
use image::GrayImage;
use std::path::Path;

/// A reference image as handed to `DetectionEngine::start`
#[derive(Debug, Clone)]
pub struct TemplateImage {
    pub name: String,
    pub image: GrayImage,
}

impl TemplateImage {
    pub fn new(name: impl Into<String>, image: GrayImage) -> Self {
        Self {
            name: name.into(),
            image,
        }
    }

    pub fn open(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|source| EngineError::TemplateLoad {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string();
        Ok(Self::new(name, image.to_luma8()))
    }
}

/// A registered template, immutable once built
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    image: GrayImage,
    features: FeatureSet,
}

impl Template {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn image(&self) -> &GrayImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn features(&self) -> &FeatureSet {
        &self.features
    }

    pub fn diagonal(&self) -> f32 {
        let (w, h) = (self.width() as f32, self.height() as f32);
        (w * w + h * h).sqrt()
    }
}

/// Ordered set of usable templates. Order is match priority: within a tick
/// the first template with a valid cluster wins.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: Vec<Template>,
}

impl TemplateRegistry {
    /// Extract features for every image, skipping (with a warning status)
    /// images without keypoints. Fails when nothing usable is left.
    pub fn prepare(
        images: Vec<TemplateImage>,
        extractor: &dyn FeatureExtractor,
        status: &StatusReporter,
    ) -> EngineResult<Self> {
        let total = images.len();
        let mut templates = Vec::with_capacity(total);

        for TemplateImage { name, image } in images {
            let features = extractor.extract(&image);
            if features.is_empty() {
                log::warn!("⚠️ Template '{}' ({}x{}) has no keypoints", name, image.width(), image.height());
                status.emit(EngineStatus::TemplateSkipped { name });
                continue;
            }
            log::debug!("✅ Template '{}': {} keypoints", name, features.len());
            templates.push(Template {
                name,
                image,
                features,
            });
        }

        if templates.is_empty() {
            return Err(EngineError::NoUsableTemplates { total });
        }
        Ok(Self { templates })
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Template> {
        self.templates.iter()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// Load every `*.png` in `dir`, sorted by file name. Unreadable images are
/// logged and skipped.
pub fn load_template_dir(dir: impl AsRef<Path>) -> EngineResult<Vec<TemplateImage>> {
    let dir = dir.as_ref();
    let dir_error = |source| EngineError::TemplateDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(dir_error)? {
        let path = entry.map_err(dir_error)?.path();
        let is_png = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
        if is_png && path.is_file() {
            paths.push(path);
        }
    }

    // Sort for consistent ordering
    paths.sort();

    let mut images = Vec::with_capacity(paths.len());
    for path in paths {
        match TemplateImage::open(&path) {
            Ok(image) => images.push(image),
            Err(e) => log::warn!("⚠️ {}", e),
        }
    }
    Ok(images)
}
