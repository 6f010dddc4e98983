// Detection engine
// Owns the scan loop: capture a frame, extract features, match every
// registered template, cluster the matches and click the chosen target.
// Status messages flow back to the controller over an async channel.

pub mod channels;
pub mod config;
pub mod engine;
pub mod error;
pub mod template;
pub mod types;


// Re-export the main types and functions for easy access
pub use channels::{StatusReceiver, StatusReporter, StatusSender, create_status_channel, spawn_status_drain};
pub use config::DetectionConfig;
pub use engine::{DetectionEngine, ScanContext};
pub use error::{EngineError, EngineResult};
pub use template::{Template, TemplateImage, TemplateRegistry, load_template_dir};
pub use types::{DetectionResult, EngineState, EngineStatus, TickOutcome};
