//! Tests for the dry-run screen backends

use super::{ClickDispatcher, LoggingClicker, ReplaySource, ScreenError, ScreenSource};
use image::{GrayImage, Luma};
use std::path::PathBuf;
use std::sync::Mutex;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "auto-clicker-screen-{}-{}",
        name,
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn test_replay_cycles_frames_in_name_order() {
    let dir = scratch_dir("cycle");
    GrayImage::from_pixel(4, 4, Luma([10])).save(dir.join("b.png")).unwrap();
    GrayImage::from_pixel(4, 4, Luma([200])).save(dir.join("a.png")).unwrap();
    std::fs::write(dir.join("notes.txt"), "not a frame").unwrap();

    let source = ReplaySource::from_dir(&dir).unwrap();
    assert_eq!(source.frame_count(), 2);

    let values: Vec<u8> = (0..3)
        .map(|_| source.capture_frame().unwrap().get_pixel(0, 0)[0])
        .collect();
    assert_eq!(values, vec![200, 10, 200], "a.png first, then wrap around");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_replay_empty_dir_is_an_error() {
    let dir = scratch_dir("empty");
    match ReplaySource::from_dir(&dir) {
        Err(ScreenError::ReplayDirEmpty { path }) => assert_eq!(path, dir),
        other => panic!("expected ReplayDirEmpty, got {:?}", other.map(|_| ())),
    }
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_replay_missing_file_fails_capture_not_panic() {
    let source = ReplaySource::from_paths(vec![PathBuf::from("/definitely/not/here.png")]);
    assert!(source.capture_frame().is_err());
}

#[test]
fn test_logging_clicker_counts() {
    let clicker = LoggingClicker::new();
    clicker.click(1, 2).unwrap();
    clicker.click(3, 4).unwrap();
    assert_eq!(clicker.click_count(), 2);
}

#[test]
fn test_closure_is_a_click_dispatcher() {
    let seen = Mutex::new(Vec::new());
    let on_detect = |x: i32, y: i32| seen.lock().unwrap().push((x, y));
    on_detect.click(5, 7).unwrap();
    assert_eq!(*seen.lock().unwrap(), vec![(5, 7)]);
}

#[test]
fn test_permission_errors_are_recognised() {
    let denied = ScreenError::CaptureFailed {
        description: "Permission denied by OS".to_string(),
    };
    assert!(denied.is_permission_problem());
    assert!(!ScreenError::NoDisplay.is_permission_problem());
    let io_denied = ScreenError::from(std::io::Error::from(std::io::ErrorKind::PermissionDenied));
    assert!(io_denied.is_permission_problem());

    let glitch = ScreenError::CaptureFailed {
        description: "timeout".to_string(),
    };
    assert!(!glitch.is_permission_problem());
}
