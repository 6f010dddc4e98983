pub mod args;
pub mod detection;
pub mod features;
pub mod matching;
pub mod screen;

#[cfg(test)]
pub mod test_utils;

pub use detection::{DetectionConfig, DetectionEngine, EngineStatus};
pub use screen::{ClickDispatcher, ScreenSource};
