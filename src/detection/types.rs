// Types and enums for the detection engine
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Running,
}

/// Status notes sent to the controller. `Display` gives the human readable
/// text shown in the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineStatus {
    Running,
    Stopped,
    AlreadyRunning,
    NotRunning,
    TemplateSkipped { name: String },
    Clicked { template: String, x: i32, y: i32 },
    ClickFailed { description: String },
    /// `permission_denied` marks failures the OS caused by refusing screen
    /// access, which will not clear up on their own
    CaptureFailed {
        description: String,
        permission_denied: bool,
    },
    CaptureRecovered,
    /// Start aborted: the feature extraction backend cannot run here
    ExtractorUnavailable { description: String },
    /// Start aborted: no template has usable keypoints
    NoUsableTemplates { total: usize },
    Error(String),
}

impl EngineStatus {
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            EngineStatus::Error(_)
                | EngineStatus::ExtractorUnavailable { .. }
                | EngineStatus::NoUsableTemplates { .. }
        )
    }

    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            EngineStatus::TemplateSkipped { .. }
                | EngineStatus::ClickFailed { .. }
                | EngineStatus::CaptureFailed { .. }
        )
    }
}

impl fmt::Display for EngineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineStatus::Running => write!(f, "running"),
            EngineStatus::Stopped => write!(f, "stopped"),
            EngineStatus::AlreadyRunning => write!(f, "already running"),
            EngineStatus::NotRunning => write!(f, "not running"),
            EngineStatus::TemplateSkipped { name } => {
                write!(f, "warning: template '{name}' has no usable keypoints, skipped")
            }
            EngineStatus::Clicked { template, x, y } => {
                write!(f, "clicking '{template}' at ({x}, {y})")
            }
            EngineStatus::ClickFailed { description } => write!(f, "warning: {description}"),
            EngineStatus::CaptureFailed {
                description,
                permission_denied,
            } => {
                write!(f, "warning: screen capture failed: {description}")?;
                if *permission_denied {
                    write!(f, " (grant screen recording permission)")?;
                }
                Ok(())
            }
            EngineStatus::CaptureRecovered => write!(f, "screen capture recovered"),
            EngineStatus::ExtractorUnavailable { description } => write!(f, "error: {description}"),
            EngineStatus::NoUsableTemplates { total } => {
                write!(f, "error: none of the {total} templates has usable keypoints")
            }
            EngineStatus::Error(message) => write!(f, "error: {message}"),
        }
    }
}

/// Click target found by one scan tick
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionResult {
    pub x: i32,
    pub y: i32,
    pub template: String,
    pub template_index: usize,
    pub cluster_size: usize,
}

/// What a single scan tick ended with
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    CaptureFailed,
    /// Frame had fewer keypoints than the configured minimum
    SparseFrame { keypoints: usize },
    NoMatch,
    Detected(DetectionResult),
}
