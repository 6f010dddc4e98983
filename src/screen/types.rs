// Capture and click capabilities consumed by the detection engine
use super::error::ScreenResult;
use image::GrayImage;

/// Produces a full-screen grayscale frame on demand.
///
/// Called once per scan tick from the engine's worker thread. A failure is a
/// failed tick, never fatal for the engine.
pub trait ScreenSource: Send + Sync {
    fn capture_frame(&self) -> ScreenResult<GrayImage>;

    /// Short human readable name for logs.
    fn describe(&self) -> String {
        "screen".to_string()
    }
}

/// Clicks at a screen coordinate. The engine waits for `click` to return
/// before the inter-tick delay but does not check whether the click "worked".
pub trait ClickDispatcher: Send + Sync {
    fn click(&self, x: i32, y: i32) -> ScreenResult<()>;
}

// Plain closures work as click callbacks
impl<F> ClickDispatcher for F
where
    F: Fn(i32, i32) + Send + Sync,
{
    fn click(&self, x: i32, y: i32) -> ScreenResult<()> {
        self(x, y);
        Ok(())
    }
}
