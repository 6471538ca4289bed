//! Pipeline lifecycle: activation, the frame loop and teardown.
//!
//! `start()` loads the model, acquires the camera and waits for the first
//! camera frame on the caller's thread, then spawns a tick-rate-capped
//! frame loop. `stop()` halts the loop, joins it, releases the camera and
//! closes the model before returning. Any activation failure releases
//! whatever was already acquired and leaves an error status; there is no
//! automatic retry.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::config::SessionConfig;
use crate::error::{AcquisitionError, MalformedFrame};
use crate::frame_timing::FrameTiming;
use crate::gesture::{
    CursorPosition, GestureCategory, GesturePipeline, LandmarkFrame, ModeHandle,
    PipelineObserver, PipelineStats,
};
use crate::sexp::escape_string;

/// Rolling window of tick samples kept for frame timing.
const TIMING_WINDOW: usize = 600;

// ── Consumed resources ─────────────────────────────────────

/// Landmark model asset with an explicit load/close lifecycle.
pub trait ModelResource: Send {
    fn load(&mut self) -> Result<(), AcquisitionError>;
    fn close(&mut self);
}

/// Camera stream with an explicit acquire/release lifecycle.
pub trait CameraStream: Send {
    fn acquire(&mut self) -> Result<(), AcquisitionError>;
    /// Block until the stream has produced its first frame.
    fn wait_first_frame(&mut self, timeout: Duration) -> Result<(), AcquisitionError>;
    fn release(&mut self);
}

/// Per-tick landmark source.
///
/// `Ok(None)` means no hand this frame, which is normal operation.
pub trait FrameSource: Send {
    fn try_next_frame(&mut self) -> Result<Option<LandmarkFrame>, MalformedFrame>;
}

// ── Status ─────────────────────────────────────────────────

/// Human-readable lifecycle state for overlays and diagnostics.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PipelineStatus {
    #[default]
    Off,
    Loading,
    NoHand,
    Gesture(GestureCategory),
    Error(String),
}

impl PipelineStatus {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

impl fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Off => write!(f, "Off"),
            Self::Loading => write!(f, "Loading"),
            Self::NoHand => write!(f, "No Hand"),
            Self::Gesture(g) => write!(f, "{}", g.label()),
            Self::Error(reason) => write!(f, "Error: {}", reason),
        }
    }
}

/// Cloneable, thread-safe view of the current status.
#[derive(Debug, Clone, Default)]
pub struct StatusHandle {
    inner: Arc<Mutex<PipelineStatus>>,
}

impl StatusHandle {
    pub fn get(&self) -> PipelineStatus {
        self.lock().clone()
    }

    fn set(&self, status: PipelineStatus) {
        let mut current = self.lock();
        if *current != status {
            debug!("Status: {} -> {}", *current, status);
            *current = status;
        }
    }

    // A panicked writer cannot leave a half-written status behind.
    fn lock(&self) -> MutexGuard<'_, PipelineStatus> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

// ── Config ─────────────────────────────────────────────────

/// Frame loop and activation settings.
#[derive(Debug, Clone, PartialEq)]
pub struct LifecycleConfig {
    /// Tick-rate cap for the frame loop.
    pub tick_hz: f64,
    /// Maximum wait for the camera's first frame during activation.
    pub first_frame_timeout_ms: u64,
    /// Per-tick budget used to count missed ticks.
    pub frame_budget_ms: f64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            tick_hz: 60.0,
            first_frame_timeout_ms: 5000,
            frame_budget_ms: 16.7,
        }
    }
}

impl LifecycleConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_hz)
    }

    pub fn first_frame_timeout(&self) -> Duration {
        Duration::from_millis(self.first_frame_timeout_ms)
    }
}

// ── Frame loop ─────────────────────────────────────────────

/// Counters shared between the frame loop and status queries.
#[derive(Debug, Default)]
struct LoopMetrics {
    timing: FrameTiming,
    pipeline: PipelineStats,
    cursor: CursorPosition,
}

type SharedMetrics = Arc<Mutex<LoopMetrics>>;

fn lock_metrics(metrics: &SharedMetrics) -> MutexGuard<'_, LoopMetrics> {
    metrics.lock().unwrap_or_else(|e| e.into_inner())
}

/// Everything the loop thread owns; handed back on join.
struct FrameLoop {
    pipeline: GesturePipeline,
    source: Box<dyn FrameSource>,
    observer: Box<dyn PipelineObserver>,
    running: Arc<AtomicBool>,
    status: StatusHandle,
    metrics: SharedMetrics,
    interval: Duration,
}

impl FrameLoop {
    fn run(mut self) -> Self {
        info!(
            "Frame loop started ({:.0}Hz cap)",
            1.0 / self.interval.as_secs_f64()
        );
        let mut last_tick: Option<Instant> = None;

        while self.running.load(Ordering::Acquire) {
            let tick_start = Instant::now();
            let interval_ms = last_tick.map(|t| ms(tick_start - t));
            last_tick = Some(tick_start);

            self.tick(tick_start, interval_ms);

            // Yield for the rest of the tick; `stop()` unparks early.
            let deadline = tick_start + self.interval;
            while self.running.load(Ordering::Acquire) {
                let now = Instant::now();
                if now >= deadline {
                    break;
                }
                thread::park_timeout(deadline - now);
            }
        }

        debug!("Frame loop exited");
        self
    }

    fn tick(&mut self, tick_start: Instant, interval_ms: Option<f64>) {
        let frame = self.source.try_next_frame();
        let fetched = Instant::now();

        let outcome = self.pipeline.step(frame);
        let processed = Instant::now();

        if let Some(mode) = outcome.mode_change {
            self.observer.on_mode_change(mode);
        }
        self.observer.on_position(outcome.position);
        let published = Instant::now();

        self.status.set(match outcome.gesture {
            Some(g) => PipelineStatus::Gesture(g),
            None => PipelineStatus::NoHand,
        });

        let mut metrics = lock_metrics(&self.metrics);
        if let Some(interval) = interval_ms {
            metrics.timing.record_interval(interval);
        }
        metrics.timing.record_tick(
            ms(fetched - tick_start),
            ms(processed - fetched),
            ms(published - processed),
        );
        metrics.pipeline = self.pipeline.stats().clone();
        metrics.cursor = outcome.position;
    }
}

fn ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

// ── Manager ────────────────────────────────────────────────

/// Owns the resources and the frame loop for one gesture session.
pub struct LifecycleManager {
    config: SessionConfig,
    model: Box<dyn ModelResource>,
    camera: Box<dyn CameraStream>,
    /// Present while the loop is not running.
    source: Option<Box<dyn FrameSource>>,
    observer: Option<Box<dyn PipelineObserver>>,
    mode: ModeHandle,
    status: StatusHandle,
    metrics: SharedMetrics,
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<FrameLoop>>,
    model_loaded: bool,
    camera_acquired: bool,
    sessions: u64,
}

impl LifecycleManager {
    pub fn new(
        config: SessionConfig,
        model: impl ModelResource + 'static,
        camera: impl CameraStream + 'static,
        source: impl FrameSource + 'static,
        observer: impl PipelineObserver + 'static,
    ) -> Self {
        Self {
            config,
            model: Box::new(model),
            camera: Box::new(camera),
            source: Some(Box::new(source)),
            observer: Some(Box::new(observer)),
            mode: ModeHandle::default(),
            status: StatusHandle::default(),
            metrics: SharedMetrics::default(),
            running: Arc::new(AtomicBool::new(false)),
            worker: None,
            model_loaded: false,
            camera_acquired: false,
            sessions: 0,
        }
    }

    /// Activate: model load, camera acquisition, first-frame wait, then
    /// the frame loop. A no-op when already active.
    pub fn start(&mut self) -> Result<(), AcquisitionError> {
        if self.is_active() {
            debug!("start() while active, ignoring");
            return Ok(());
        }

        info!("Activating gesture pipeline");
        self.status.set(PipelineStatus::Loading);

        if let Err(e) = self.config.validate() {
            return Err(self.fail(AcquisitionError::InvalidConfig(format!("{:#}", e))));
        }

        if let Err(e) = self.acquire() {
            return Err(self.fail(e));
        }

        let (source, observer) = match (self.source.take(), self.observer.take()) {
            (Some(source), Some(observer)) => (source, observer),
            (source, observer) => {
                self.source = source;
                self.observer = observer;
                return Err(self.fail(AcquisitionError::FrameSourceUnavailable));
            }
        };

        {
            let mut metrics = lock_metrics(&self.metrics);
            *metrics = LoopMetrics {
                timing: FrameTiming::new(TIMING_WINDOW, self.config.lifecycle.frame_budget_ms),
                ..LoopMetrics::default()
            };
        }

        let frame_loop = FrameLoop {
            pipeline: GesturePipeline::with_mode_handle(
                self.config.pipeline.clone(),
                self.mode.clone(),
            ),
            source,
            observer,
            running: Arc::clone(&self.running),
            status: self.status.clone(),
            metrics: Arc::clone(&self.metrics),
            interval: self.config.lifecycle.tick_interval(),
        };

        self.running.store(true, Ordering::Release);
        self.status.set(PipelineStatus::NoHand);
        let spawned = thread::Builder::new()
            .name("handmode-frames".into())
            .spawn(move || frame_loop.run());

        match spawned {
            Ok(handle) => {
                self.worker = Some(handle);
                self.sessions += 1;
                info!("Gesture pipeline active (mode {:?})", self.mode.get());
                Ok(())
            }
            Err(e) => {
                self.running.store(false, Ordering::Release);
                Err(self.fail(AcquisitionError::StreamSetup(format!(
                    "frame loop thread: {}",
                    e
                ))))
            }
        }
    }

    fn acquire(&mut self) -> Result<(), AcquisitionError> {
        self.model.load()?;
        self.model_loaded = true;
        debug!("Model loaded");

        self.camera.acquire()?;
        self.camera_acquired = true;
        debug!("Camera acquired");

        let timeout = self.config.lifecycle.first_frame_timeout();
        self.camera.wait_first_frame(timeout)?;
        debug!("First camera frame ready");
        Ok(())
    }

    /// Activation failure: release everything and surface the error.
    fn fail(&mut self, err: AcquisitionError) -> AcquisitionError {
        warn!("Gesture pipeline activation failed: {}", err);
        self.release_resources();
        self.status.set(PipelineStatus::Error(err.to_string()));
        err
    }

    fn release_resources(&mut self) {
        if self.camera_acquired {
            self.camera.release();
            self.camera_acquired = false;
            debug!("Camera released");
        }
        if self.model_loaded {
            self.model.close();
            self.model_loaded = false;
            debug!("Model closed");
        }
    }

    /// Deactivate. When this returns no tick is running, the camera is
    /// released and the model closed.
    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            self.release_resources();
            return;
        };

        self.running.store(false, Ordering::Release);
        worker.thread().unpark();

        let crashed = match worker.join() {
            Ok(frame_loop) => {
                self.source = Some(frame_loop.source);
                self.observer = Some(frame_loop.observer);
                false
            }
            Err(_) => {
                error!("Frame loop panicked; frame source lost");
                true
            }
        };

        self.release_resources();

        if crashed {
            self.status
                .set(PipelineStatus::Error("frame loop crashed".to_string()));
        } else {
            self.status.set(PipelineStatus::Off);
        }

        let stats = self.pipeline_stats();
        info!(
            "Gesture pipeline stopped: {} frames ({} hand, {} no hand, {} malformed), {} mode changes",
            stats.frames,
            stats.hand_frames,
            stats.no_hand_frames,
            stats.malformed_frames,
            stats.mode_changes
        );
    }

    pub fn is_active(&self) -> bool {
        self.worker.is_some()
    }

    pub fn status(&self) -> PipelineStatus {
        self.status.get()
    }

    pub fn status_handle(&self) -> StatusHandle {
        self.status.clone()
    }

    /// Read-only view of the committed mode; survives restarts.
    pub fn mode_handle(&self) -> ModeHandle {
        self.mode.clone()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Replace the configuration; takes effect on the next `start()`.
    pub fn set_config(&mut self, config: SessionConfig) {
        self.config = config;
    }

    /// Counters of the current (or most recent) session.
    pub fn pipeline_stats(&self) -> PipelineStats {
        lock_metrics(&self.metrics).pipeline.clone()
    }

    /// Last published cursor position.
    pub fn cursor(&self) -> CursorPosition {
        lock_metrics(&self.metrics).cursor
    }

    /// Frame timing of the current (or most recent) session.
    pub fn frame_stats_sexp(&self) -> String {
        lock_metrics(&self.metrics).timing.stats_sexp()
    }

    /// Generate s-expression for status queries.
    pub fn status_sexp(&self) -> String {
        let metrics = lock_metrics(&self.metrics);
        format!(
            "(:status \"{}\" :active {} :mode :{} :sessions {} :frames {} :mode-changes {} :cursor (:x {:.3} :y {:.3} :detected {}) :model-loaded {} :camera-acquired {})",
            escape_string(&self.status.get().to_string()),
            bool_sexp(self.is_active()),
            self.mode.get().as_str(),
            self.sessions,
            metrics.pipeline.frames,
            metrics.pipeline.mode_changes,
            metrics.cursor.x,
            metrics.cursor.y,
            bool_sexp(metrics.cursor.detected),
            bool_sexp(self.model_loaded),
            bool_sexp(self.camera_acquired),
        )
    }
}

impl Drop for LifecycleManager {
    fn drop(&mut self) {
        self.stop();
    }
}

fn bool_sexp(b: bool) -> &'static str {
    if b {
        "t"
    } else {
        "nil"
    }
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::test_poses::{fist, open_palm, pinch};
    use crate::gesture::{Mode, PipelineConfig, PipelineEvent};
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;
    use std::sync::mpsc;

    type CallLog = Arc<Mutex<Vec<&'static str>>>;

    fn calls(log: &CallLog) -> Vec<&'static str> {
        log.lock().unwrap().clone()
    }

    struct FakeModel {
        log: CallLog,
        fail: bool,
    }

    impl ModelResource for FakeModel {
        fn load(&mut self) -> Result<(), AcquisitionError> {
            self.log.lock().unwrap().push("model.load");
            if self.fail {
                Err(AcquisitionError::ModelLoad("missing asset".into()))
            } else {
                Ok(())
            }
        }

        fn close(&mut self) {
            self.log.lock().unwrap().push("model.close");
        }
    }

    struct FakeCamera {
        log: CallLog,
        deny: bool,
        no_frames: bool,
    }

    impl CameraStream for FakeCamera {
        fn acquire(&mut self) -> Result<(), AcquisitionError> {
            self.log.lock().unwrap().push("camera.acquire");
            if self.deny {
                Err(AcquisitionError::CameraPermissionDenied)
            } else {
                Ok(())
            }
        }

        fn wait_first_frame(&mut self, timeout: Duration) -> Result<(), AcquisitionError> {
            self.log.lock().unwrap().push("camera.wait");
            if self.no_frames {
                Err(AcquisitionError::FirstFrameTimeout(timeout))
            } else {
                Ok(())
            }
        }

        fn release(&mut self) {
            self.log.lock().unwrap().push("camera.release");
        }
    }

    /// Plays a fixed script, then reports no hand forever.
    struct ScriptedSource {
        frames: VecDeque<LandmarkFrame>,
        polls: Arc<AtomicUsize>,
    }

    impl FrameSource for ScriptedSource {
        fn try_next_frame(&mut self) -> Result<Option<LandmarkFrame>, MalformedFrame> {
            self.polls.fetch_add(1, Ordering::SeqCst);
            Ok(self.frames.pop_front())
        }
    }

    struct Harness {
        manager: LifecycleManager,
        log: CallLog,
        polls: Arc<AtomicUsize>,
        events: mpsc::Receiver<PipelineEvent>,
    }

    fn harness(fail_model: bool, deny: bool, no_frames: bool, frames: Vec<LandmarkFrame>) -> Harness {
        let log = CallLog::default();
        let polls = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = mpsc::channel::<PipelineEvent>();
        let mut config = SessionConfig::default();
        config.lifecycle.tick_hz = 200.0;
        let manager = LifecycleManager::new(
            config,
            FakeModel { log: Arc::clone(&log), fail: fail_model },
            FakeCamera { log: Arc::clone(&log), deny, no_frames },
            ScriptedSource { frames: frames.into(), polls: Arc::clone(&polls) },
            tx,
        );
        Harness { manager, log, polls, events: rx }
    }

    fn wait_for_mode(events: &mpsc::Receiver<PipelineEvent>, mode: Mode) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if let Ok(PipelineEvent::ModeChanged(m)) = events.recv_timeout(Duration::from_millis(100)) {
                if m == mode {
                    return true;
                }
            }
        }
        false
    }

    fn wait_for_polls(polls: &AtomicUsize, count: usize) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if polls.load(Ordering::SeqCst) >= count {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        false
    }

    #[test]
    fn test_model_load_failure() {
        let mut h = harness(true, false, false, vec![]);
        let err = h.manager.start().unwrap_err();
        assert_eq!(err, AcquisitionError::ModelLoad("missing asset".into()));
        assert!(!h.manager.is_active());
        assert!(h.manager.status().is_error());
        assert_eq!(h.manager.status().to_string(), "Error: model load failed: missing asset");
        // Camera never opened, nothing left to release.
        assert_eq!(calls(&h.log), vec!["model.load"]);
        assert_eq!(h.polls.load(Ordering::SeqCst), 0);
        assert!(h.events.try_recv().is_err());
    }

    #[test]
    fn test_invalid_config_fails_before_acquiring() {
        let mut h = harness(false, false, false, vec![fist(0.0)]);
        let mut config = h.manager.config().clone();
        config.lifecycle.tick_hz = 0.0;
        h.manager.set_config(config);

        let err = h.manager.start().unwrap_err();
        assert!(matches!(&err, AcquisitionError::InvalidConfig(r) if r.contains(":tick-hz")));
        assert!(!h.manager.is_active());
        assert!(h.manager.status().is_error());
        assert!(calls(&h.log).is_empty());
        assert_eq!(h.polls.load(Ordering::SeqCst), 0);

        // A corrected config activates normally.
        let mut config = h.manager.config().clone();
        config.lifecycle.tick_hz = 200.0;
        h.manager.set_config(config);
        h.manager.start().unwrap();
        assert!(h.manager.is_active());
        h.manager.stop();
    }

    #[test]
    fn test_mode_handle_only_follows_frames() {
        let mut h = harness(false, false, false, vec![]);
        let handle = h.manager.mode_handle();

        // A separate pipeline commits into its own handle, not the manager's.
        let mut other = GesturePipeline::new(PipelineConfig::default());
        other.step(Ok(Some(fist(0.0))));
        assert_eq!(other.current_mode(), Mode::Chaos);
        assert_eq!(handle.get(), Mode::Formed);

        h.manager.start().unwrap();
        thread::sleep(Duration::from_millis(30));
        h.manager.stop();
        assert_eq!(handle.get(), Mode::Formed);
        assert_eq!(h.manager.pipeline_stats().mode_changes, 0);
    }

    #[test]
    fn test_camera_denied_closes_model() {
        let mut h = harness(false, true, false, vec![]);
        assert_eq!(h.manager.start(), Err(AcquisitionError::CameraPermissionDenied));
        assert_eq!(calls(&h.log), vec!["model.load", "camera.acquire", "model.close"]);
        assert_eq!(h.manager.status(), PipelineStatus::Error("camera permission denied".into()));
        assert!(!h.manager.is_active());
    }

    #[test]
    fn test_first_frame_timeout_releases_both() {
        let mut h = harness(false, false, true, vec![]);
        assert!(matches!(h.manager.start(), Err(AcquisitionError::FirstFrameTimeout(_))));
        assert_eq!(
            calls(&h.log),
            vec!["model.load", "camera.acquire", "camera.wait", "camera.release", "model.close"]
        );
        assert_eq!(h.polls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_run_and_stop() {
        let mut h = harness(false, false, false, vec![fist(0.0), fist(16.0), open_palm(32.0), open_palm(48.0)]);
        h.manager.start().unwrap();
        assert!(h.manager.is_active());
        assert!(wait_for_mode(&h.events, Mode::Chaos));
        // Let the loop drain the script and poll at least once past it.
        assert!(wait_for_polls(&h.polls, 5));

        h.manager.stop();
        assert!(!h.manager.is_active());
        assert_eq!(h.manager.status(), PipelineStatus::Off);
        assert_eq!(h.manager.mode_handle().get(), Mode::Chaos);
        assert_eq!(
            calls(&h.log),
            vec!["model.load", "camera.acquire", "camera.wait", "camera.release", "model.close"]
        );

        let stats = h.manager.pipeline_stats();
        assert_eq!(stats.mode_changes, 1);
        assert!(stats.frames >= 4);

        // Nothing after the Chaos commit.
        let changes = h
            .events
            .try_iter()
            .filter(|e| matches!(e, PipelineEvent::ModeChanged(_)))
            .count();
        assert_eq!(changes, 0);
    }

    #[test]
    fn test_no_tick_after_stop() {
        let mut h = harness(false, false, false, vec![]);
        h.manager.start().unwrap();
        thread::sleep(Duration::from_millis(30));
        h.manager.stop();
        let polls = h.polls.load(Ordering::SeqCst);
        assert!(polls > 0);
        thread::sleep(Duration::from_millis(30));
        assert_eq!(h.polls.load(Ordering::SeqCst), polls);
    }

    #[test]
    fn test_no_hand_status_while_running() {
        let mut h = harness(false, false, false, vec![]);
        h.manager.start().unwrap();
        thread::sleep(Duration::from_millis(30));
        assert_eq!(h.manager.status(), PipelineStatus::NoHand);
        assert_eq!(h.manager.status().to_string(), "No Hand");
        assert!(!h.manager.cursor().detected);
        h.manager.stop();
    }

    #[test]
    fn test_restart_reuses_source_and_keeps_mode() {
        let mut h = harness(false, false, false, vec![pinch(0.0)]);
        h.manager.start().unwrap();
        assert!(wait_for_mode(&h.events, Mode::Focus));
        h.manager.stop();

        h.manager.start().unwrap();
        assert!(h.manager.is_active());
        assert_eq!(h.manager.mode_handle().get(), Mode::Focus);
        h.manager.stop();

        let loads = calls(&h.log).iter().filter(|c| **c == "model.load").count();
        let closes = calls(&h.log).iter().filter(|c| **c == "model.close").count();
        assert_eq!(loads, 2);
        assert_eq!(closes, 2);
    }

    #[test]
    fn test_start_twice_is_noop() {
        let mut h = harness(false, false, false, vec![]);
        h.manager.start().unwrap();
        h.manager.start().unwrap();
        h.manager.stop();
        assert_eq!(calls(&h.log).iter().filter(|c| **c == "model.load").count(), 1);
    }

    #[test]
    fn test_stop_when_inactive() {
        let mut h = harness(false, false, false, vec![]);
        h.manager.stop();
        assert_eq!(h.manager.status(), PipelineStatus::Off);
        assert!(calls(&h.log).is_empty());
    }

    #[test]
    fn test_drop_releases_resources() {
        let h = harness(false, false, false, vec![]);
        let log = Arc::clone(&h.log);
        let mut manager = h.manager;
        manager.start().unwrap();
        drop(manager);
        let log = calls(&log);
        assert_eq!(log[log.len() - 2..], ["camera.release", "model.close"]);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(PipelineStatus::Off.to_string(), "Off");
        assert_eq!(PipelineStatus::Loading.to_string(), "Loading");
        assert_eq!(PipelineStatus::NoHand.to_string(), "No Hand");
        assert_eq!(PipelineStatus::Gesture(GestureCategory::OpenPalm).to_string(), "Open Palm");
        assert_eq!(PipelineStatus::Error("x".into()).to_string(), "Error: x");
    }

    #[test]
    fn test_status_sexp() {
        let h = harness(false, false, false, vec![]);
        let sexp = h.manager.status_sexp();
        assert!(sexp.contains(":status \"Off\""));
        assert!(sexp.contains(":active nil"));
        assert!(sexp.contains(":mode :formed"));
        assert!(lexpr::from_str(&sexp).is_ok());
        assert!(lexpr::from_str(&h.manager.frame_stats_sexp()).is_ok());
    }

    #[test]
    fn test_tick_interval() {
        let config = LifecycleConfig { tick_hz: 50.0, ..LifecycleConfig::default() };
        assert_eq!(config.tick_interval(), Duration::from_millis(20));
        assert_eq!(LifecycleConfig::default().first_frame_timeout(), Duration::from_secs(5));
    }
}
