//! Real desktop backends: `xcap` for capturing the first monitor and `enigo`
//! for moving the pointer and clicking.

use super::error::{ScreenError, ScreenResult};
use super::types::{ClickDispatcher, ScreenSource};
use enigo::{Button, Coordinate, Direction, Enigo, Mouse, Settings};
use image::{DynamicImage, GrayImage, RgbaImage};
use std::time::Duration;

/// Captures the first monitor reported by the OS.
#[derive(Default)]
pub struct DesktopScreen;

impl DesktopScreen {
    pub fn new() -> Self {
        Self
    }
}

impl ScreenSource for DesktopScreen {
    fn capture_frame(&self) -> ScreenResult<GrayImage> {
        let monitors = xcap::Monitor::all().map_err(|e| ScreenError::CaptureFailed {
            description: e.to_string(),
        })?;
        let monitor = monitors.into_iter().next().ok_or(ScreenError::NoDisplay)?;
        let captured = monitor
            .capture_image()
            .map_err(|e| ScreenError::CaptureFailed {
                description: e.to_string(),
            })?;

        // Rebuild through raw bytes so we do not depend on xcap's image version
        let (width, height) = (captured.width(), captured.height());
        let rgba = RgbaImage::from_raw(width, height, captured.into_raw()).ok_or_else(|| {
            ScreenError::CaptureFailed {
                description: format!("capture buffer does not match {width}x{height}"),
            }
        })?;
        Ok(DynamicImage::ImageRgba8(rgba).to_luma8())
    }

    fn describe(&self) -> String {
        "desktop".to_string()
    }
}

/// Moves the pointer to the target, waits briefly, then left-clicks.
pub struct DesktopClicker {
    settle: Duration,
}

impl Default for DesktopClicker {
    fn default() -> Self {
        Self {
            settle: Duration::from_millis(100),
        }
    }
}

impl DesktopClicker {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClickDispatcher for DesktopClicker {
    fn click(&self, x: i32, y: i32) -> ScreenResult<()> {
        let failed = |description: String| ScreenError::ClickFailed { x, y, description };

        // A fresh connection per click keeps the dispatcher Send + Sync on every platform
        let mut enigo = Enigo::new(&Settings::default()).map_err(|e| failed(e.to_string()))?;
        enigo
            .move_mouse(x, y, Coordinate::Abs)
            .map_err(|e| failed(e.to_string()))?;
        std::thread::sleep(self.settle);
        enigo
            .button(Button::Left, Direction::Click)
            .map_err(|e| failed(e.to_string()))?;
        Ok(())
    }
}
