// Screen module - capture and click primitives used by the detection engine.
// The engine only sees the traits; concrete backends are a replay source for
// dry runs and, with the `desktop` feature, real capture + mouse injection.

pub mod error;
pub mod replay;
pub mod types;

#[cfg(feature = "desktop")]
pub mod desktop;

#[cfg(test)]
mod tests;

// Re-export the main types for easy access
pub use error::{ScreenError, ScreenResult};
pub use replay::{LoggingClicker, ReplaySource};
pub use types::{ClickDispatcher, ScreenSource};

#[cfg(feature = "desktop")]
pub use desktop::{DesktopClicker, DesktopScreen};
