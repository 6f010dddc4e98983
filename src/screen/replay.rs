//! Dry-run backends: replay screenshots from disk and log clicks instead of
//! moving the mouse.

use super::error::{ScreenError, ScreenResult};
use super::types::{ClickDispatcher, ScreenSource};
use image::GrayImage;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

const FRAME_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Screen source that cycles through the screenshots of a directory, one per
/// capture, in file name order.
pub struct ReplaySource {
    frames: Vec<PathBuf>,
    next: AtomicUsize,
}

impl ReplaySource {
    pub fn from_dir(dir: impl AsRef<Path>) -> ScreenResult<Self> {
        let dir = dir.as_ref();
        let mut frames = Vec::new();

        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && has_frame_extension(&path) {
                frames.push(path);
            }
        }

        // Sort for consistent ordering
        frames.sort();

        if frames.is_empty() {
            return Err(ScreenError::ReplayDirEmpty {
                path: dir.to_path_buf(),
            });
        }

        log::info!("📂 Replaying {} screenshots from {:?}", frames.len(), dir);
        Ok(Self::from_paths(frames))
    }

    pub fn from_paths(frames: Vec<PathBuf>) -> Self {
        Self {
            frames,
            next: AtomicUsize::new(0),
        }
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

fn has_frame_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| FRAME_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

impl ScreenSource for ReplaySource {
    fn capture_frame(&self) -> ScreenResult<GrayImage> {
        if self.frames.is_empty() {
            return Err(ScreenError::CaptureFailed {
                description: "replay source has no frames".to_string(),
            });
        }
        let index = self.next.fetch_add(1, Ordering::Relaxed) % self.frames.len();
        let path = &self.frames[index];
        log::debug!("📸 Replay frame {} ({:?})", index, path);
        Ok(image::open(path)?.to_luma8())
    }

    fn describe(&self) -> String {
        format!("replay ({} frames)", self.frames.len())
    }
}

/// Click dispatcher that only logs the click target.
#[derive(Default)]
pub struct LoggingClicker {
    clicks: AtomicU64,
}

impl LoggingClicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn click_count(&self) -> u64 {
        self.clicks.load(Ordering::Relaxed)
    }
}

impl ClickDispatcher for LoggingClicker {
    fn click(&self, x: i32, y: i32) -> ScreenResult<()> {
        let n = self.clicks.fetch_add(1, Ordering::Relaxed) + 1;
        log::info!("🖱️ [dry-run] click #{} at ({}, {})", n, x, y);
        Ok(())
    }
}
