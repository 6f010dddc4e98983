use super::types::EngineStatus;
use crate::features::FeatureError;
use std::path::PathBuf;
use thiserror::Error;

/// A specialized `Result` type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Everything that can stop `start` from entering the running state.
/// Per-tick problems never show up here; they become status notes.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("None of the {total} template images has usable keypoints")]
    NoUsableTemplates { total: usize },

    #[error("Feature extraction is unavailable: {source}")]
    ExtractorUnavailable {
        #[from]
        source: FeatureError,
    },

    #[error("Failed to spawn the scan worker: {source}")]
    WorkerSpawn {
        #[from]
        source: std::io::Error,
    },

    #[error("Invalid detection config: {description}")]
    InvalidConfig { description: String },

    #[error("Failed to read config file {path:?}: {description}")]
    ConfigFile { path: PathBuf, description: String },

    #[error("Failed to read template directory {path:?}: {source}")]
    TemplateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to load template {path:?}: {source}")]
    TemplateLoad {
        path: PathBuf,
        source: image::ImageError,
    },
}

impl EngineError {
    /// Status note reported to the controller when `start` fails
    pub fn to_status(&self) -> EngineStatus {
        match self {
            EngineError::ExtractorUnavailable { .. } => EngineStatus::ExtractorUnavailable {
                description: self.to_string(),
            },
            EngineError::NoUsableTemplates { total } => {
                EngineStatus::NoUsableTemplates { total: *total }
            }
            other => EngineStatus::Error(other.to_string()),
        }
    }
}
