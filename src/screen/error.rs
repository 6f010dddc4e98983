use std::path::PathBuf;
use thiserror::Error;

/// A specialized `Result` type for screen capture and click operations.
pub type ScreenResult<T> = Result<T, ScreenError>;

/// The error type for the capture / click primitives.
#[derive(Debug, Error)]
pub enum ScreenError {
    #[error("Screen capture failed: {description}")]
    CaptureFailed { description: String },

    #[error("No display found to capture")]
    NoDisplay,

    #[error("Click at ({x}, {y}) failed: {description}")]
    ClickFailed { x: i32, y: i32, description: String },

    #[error("No screenshots found in replay directory {path:?}")]
    ReplayDirEmpty { path: PathBuf },

    #[error("Failed to decode image: {source}")]
    Image {
        #[from]
        source: image::ImageError,
    },

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl ScreenError {
    /// Errors that usually mean the OS denied access (screen recording or
    /// accessibility permission) rather than a transient glitch. The scan
    /// loop flags these in its capture failure status.
    pub fn is_permission_problem(&self) -> bool {
        match self {
            ScreenError::CaptureFailed { description }
            | ScreenError::ClickFailed { description, .. } => {
                let lower = description.to_lowercase();
                lower.contains("permission") || lower.contains("denied")
            }
            ScreenError::Io { source } => source.kind() == std::io::ErrorKind::PermissionDenied,
            _ => false,
        }
    }
}
