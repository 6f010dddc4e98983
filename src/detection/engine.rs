// Detection engine lifecycle and the scan loop
use super::channels::{StatusReporter, StatusSender};
use super::config::DetectionConfig;
use super::error::EngineResult;
use super::template::{TemplateImage, TemplateRegistry};
use super::types::{DetectionResult, EngineState, EngineStatus, TickOutcome};
use crate::features::{FeatureExtractor, OrientedFastExtractor};
use crate::matching::{ClusterSelector, DescriptorIndex, FeatureMatcher, MatcherKind};
use crate::screen::{ClickDispatcher, ScreenSource};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tokio::sync::oneshot;

/// Handle on the background scan thread of one run
struct Worker {
    cancel: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

/// Idle -> Running -> Idle state machine around one scan worker.
///
/// `start` and `stop` are meant to be called from a single controller
/// context. Illegal transitions are no-ops that only report a status.
pub struct DetectionEngine {
    source: Arc<dyn ScreenSource>,
    clicker: Arc<dyn ClickDispatcher>,
    extractor: Arc<dyn FeatureExtractor>,
    config: DetectionConfig,
    status: StatusReporter,
    state: EngineState,
    worker: Option<Worker>,
}

impl DetectionEngine {
    /// `clicker` is the detection callback: it receives every click target.
    pub fn new(
        source: Arc<dyn ScreenSource>,
        clicker: Arc<dyn ClickDispatcher>,
        status_tx: StatusSender,
        config: DetectionConfig,
    ) -> Self {
        let extractor = Arc::new(OrientedFastExtractor::new(config.features.clone()));
        Self {
            source,
            clicker,
            extractor,
            config,
            status: StatusReporter::new(status_tx),
            state: EngineState::Idle,
            worker: None,
        }
    }

    /// Replace the default feature extractor
    pub fn with_extractor(mut self, extractor: Arc<dyn FeatureExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == EngineState::Running
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Prepare the templates and launch the scan worker.
    ///
    /// Already running: reports "already running" and returns `Ok`. On any
    /// failure the error is reported as a status too and the engine stays
    /// idle.
    pub fn start(&mut self, images: Vec<TemplateImage>) -> EngineResult<()> {
        if self.state == EngineState::Running {
            log::debug!("🤖 Engine already running, ignoring start");
            self.status.emit(EngineStatus::AlreadyRunning);
            return Ok(());
        }

        match self.launch(images) {
            Ok(worker) => {
                self.worker = Some(worker);
                self.state = EngineState::Running;
                Ok(())
            }
            Err(e) => {
                log::error!("❌ Start failed: {}", e);
                self.status.emit(e.to_status());
                Err(e)
            }
        }
    }

    fn launch(&self, images: Vec<TemplateImage>) -> EngineResult<Worker> {
        self.config.validate()?;
        self.extractor.ensure_available()?;

        let registry = TemplateRegistry::prepare(images, self.extractor.as_ref(), &self.status)?;
        log::info!(
            "🚀 Starting detection with {} templates from {} ({})",
            registry.len(),
            self.source.describe(),
            self.config.summary()
        );

        let scan = ScanContext::new(
            Arc::clone(&self.source),
            Arc::clone(&self.clicker),
            Arc::clone(&self.extractor),
            registry,
            &self.config,
            self.status.clone(),
        );

        let cancel = Arc::new(AtomicBool::new(false));
        let worker_cancel = Arc::clone(&cancel);

        let (go_tx, go_rx) = oneshot::channel::<()>();

        let handle = thread::Builder::new()
            .name("scan-worker".to_string())
            .spawn(move || {
                // First tick waits until "running" has been reported
                if go_rx.blocking_recv().is_ok() {
                    scan.run(&worker_cancel);
                }
            })?;

        self.status.emit(EngineStatus::Running);
        let _ = go_tx.send(());

        Ok(Worker { cancel, handle })
    }

    /// Ask the worker to finish its current tick and wait until it has
    /// exited. Idempotent: when idle it only reports "not running".
    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            log::debug!("🤖 Engine not running, ignoring stop");
            self.status.emit(EngineStatus::NotRunning);
            return;
        };

        worker.cancel.store(true, Ordering::Release);
        self.status.emit(EngineStatus::Stopped);
        // Cut the inter-tick pause short
        worker.handle.thread().unpark();

        if worker.handle.join().is_err() {
            log::error!("❌ Scan worker panicked during shutdown");
            self.status.emit(EngineStatus::Error("scan worker panicked".to_string()));
        }
        self.state = EngineState::Idle;
        log::info!("⏹️ Detection stopped");
    }
}

impl Drop for DetectionEngine {
    fn drop(&mut self) {
        if self.worker.is_some() {
            self.stop();
        }
    }
}

/// Everything the scan worker owns for one run
pub struct ScanContext {
    source: Arc<dyn ScreenSource>,
    clicker: Arc<dyn ClickDispatcher>,
    extractor: Arc<dyn FeatureExtractor>,
    registry: TemplateRegistry,
    matcher: FeatureMatcher,
    selector: ClusterSelector,
    matcher_kind: MatcherKind,
    min_frame_keypoints: usize,
    tick_interval: Duration,
    rng: StdRng,
    status: StatusReporter,
    capture_failing: bool,
    ticks: u64,
}

impl ScanContext {
    pub fn new(
        source: Arc<dyn ScreenSource>,
        clicker: Arc<dyn ClickDispatcher>,
        extractor: Arc<dyn FeatureExtractor>,
        registry: TemplateRegistry,
        config: &DetectionConfig,
        status: StatusReporter,
    ) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            source,
            clicker,
            extractor,
            registry,
            matcher: FeatureMatcher::new(config.ratio_threshold, config.min_good_matches),
            // The match floor doubles as the cluster density floor
            selector: ClusterSelector::new(config.cluster_radius_factor, config.min_good_matches),
            matcher_kind: config.matcher,
            min_frame_keypoints: config.min_frame_keypoints,
            tick_interval: config.tick_interval(),
            rng,
            status,
            capture_failing: false,
            ticks: 0,
        }
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Worker body: tick, pause, repeat until `cancel` is set. The flag is
    /// only read between ticks, so a started tick always completes.
    fn run(mut self, cancel: &AtomicBool) {
        log::info!("🎮 Scan loop started");

        while !cancel.load(Ordering::Acquire) {
            match catch_unwind(AssertUnwindSafe(|| self.scan_tick())) {
                Ok(outcome) => log::debug!("tick {}: {:?}", self.ticks, outcome),
                Err(_) => {
                    log::error!("❌ Scan tick {} panicked, continuing", self.ticks);
                    self.status
                        .emit(EngineStatus::Error(format!("scan tick {} panicked", self.ticks)));
                }
            }
            self.pause(cancel);
        }

        log::info!("🎮 Scan loop ended after {} ticks", self.ticks);
    }

    fn pause(&self, cancel: &AtomicBool) {
        let deadline = Instant::now() + self.tick_interval;
        loop {
            if cancel.load(Ordering::Acquire) {
                return;
            }
            let now = Instant::now();
            if now >= deadline {
                return;
            }
            thread::park_timeout(deadline - now);
        }
    }

    /// One capture -> extract -> match -> cluster -> click pass. At most one
    /// click: the first template (in registration order) with a valid
    /// cluster ends the tick.
    pub fn scan_tick(&mut self) -> TickOutcome {
        self.ticks += 1;

        let frame = match self.source.capture_frame() {
            Ok(frame) => {
                if self.capture_failing {
                    self.capture_failing = false;
                    self.status.emit(EngineStatus::CaptureRecovered);
                }
                frame
            }
            Err(e) => {
                log::debug!("📸 Capture failed: {}", e);
                if !self.capture_failing {
                    self.capture_failing = true;
                    let permission_denied = e.is_permission_problem();
                    if permission_denied {
                        log::error!("❌ Screen capture not permitted: {}", e);
                    }
                    self.status.emit(EngineStatus::CaptureFailed {
                        description: e.to_string(),
                        permission_denied,
                    });
                }
                return TickOutcome::CaptureFailed;
            }
        };

        let features = self.extractor.extract(&frame);
        if features.len() < self.min_frame_keypoints {
            return TickOutcome::SparseFrame {
                keypoints: features.len(),
            };
        }

        let index = DescriptorIndex::build(features.descriptors(), self.matcher_kind);

        for (template_index, template) in self.registry.iter().enumerate() {
            let good = self
                .matcher
                .good_matches(template.features().descriptors(), &index);
            if !self.matcher.qualifies(&good) {
                log::trace!("'{}': {} good matches", template.name(), good.len());
                continue;
            }

            let points: Vec<(f32, f32)> = good
                .iter()
                .map(|c| features.keypoints()[c.frame_idx].point())
                .collect();
            let Some(cluster) =
                self.selector
                    .select(&points, template.width(), template.height(), &mut self.rng)
            else {
                log::debug!(
                    "👀 '{}' had {} good matches but no dense cluster",
                    template.name(),
                    good.len()
                );
                continue;
            };

            let (cx, cy) = cluster.centroid();
            let (x, y) = (cx as i32, cy as i32);
            log::info!(
                "🎯 '{}' found at ({}, {}) ({} good matches, cluster of {})",
                template.name(),
                x,
                y,
                good.len(),
                cluster.len()
            );

            match self.clicker.click(x, y) {
                Ok(()) => self.status.emit(EngineStatus::Clicked {
                    template: template.name().to_string(),
                    x,
                    y,
                }),
                Err(e) => {
                    log::warn!("⚠️ {}", e);
                    self.status.emit(EngineStatus::ClickFailed {
                        description: e.to_string(),
                    });
                }
            }

            return TickOutcome::Detected(DetectionResult {
                x,
                y,
                template: template.name().to_string(),
                template_index,
                cluster_size: cluster.len(),
            });
        }

        TickOutcome::NoMatch
    }
}
