//! Headless session driver: file-backed model, virtual camera, graceful
//! signal handling and periodic status logging.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

use anyhow::Context;
use tracing::{debug, error, info, trace};

use super::BackendOptions;
use crate::config::SessionConfig;
use crate::error::AcquisitionError;
use crate::gesture::PipelineEvent;
use crate::lifecycle::{CameraStream, FrameSource, LifecycleManager, ModelResource};

/// Global flag set by SIGTERM/SIGINT handlers.
static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);

// ── Model ──────────────────────────────────────────────────

/// Model resource backed by an asset file.
///
/// Without a path it stands in for a built-in model and always loads.
#[derive(Debug, Default)]
pub struct FileModel {
    path: Option<PathBuf>,
    asset: Option<Vec<u8>>,
}

impl FileModel {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path, asset: None }
    }

    pub fn is_loaded(&self) -> bool {
        self.asset.is_some()
    }
}

impl ModelResource for FileModel {
    fn load(&mut self) -> Result<(), AcquisitionError> {
        let Some(path) = &self.path else {
            self.asset = Some(Vec::new());
            info!("Using built-in landmark model");
            return Ok(());
        };
        let bytes = std::fs::read(path)
            .map_err(|e| AcquisitionError::ModelLoad(format!("{}: {}", path.display(), e)))?;
        if bytes.is_empty() {
            return Err(AcquisitionError::ModelLoad(format!(
                "{}: empty model asset",
                path.display()
            )));
        }
        info!("Loaded landmark model {} ({} bytes)", path.display(), bytes.len());
        self.asset = Some(bytes);
        Ok(())
    }

    fn close(&mut self) {
        if self.asset.take().is_some() {
            debug!("Landmark model closed");
        }
    }
}

// ── Camera ─────────────────────────────────────────────────

/// Camera stand-in for headless sessions.
#[derive(Debug)]
pub struct VirtualCamera {
    /// False simulates a denied camera permission.
    pub available: bool,
    open: bool,
}

impl VirtualCamera {
    pub fn new(available: bool) -> Self {
        Self {
            available,
            open: false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }
}

impl CameraStream for VirtualCamera {
    fn acquire(&mut self) -> Result<(), AcquisitionError> {
        if !self.available {
            return Err(AcquisitionError::CameraPermissionDenied);
        }
        self.open = true;
        info!("Virtual camera stream opened");
        Ok(())
    }

    fn wait_first_frame(&mut self, _timeout: Duration) -> Result<(), AcquisitionError> {
        if self.open {
            Ok(())
        } else {
            Err(AcquisitionError::StreamSetup("stream not acquired".into()))
        }
    }

    fn release(&mut self) {
        if self.open {
            self.open = false;
            info!("Virtual camera stream released");
        }
    }
}

// ── Signals ────────────────────────────────────────────────

/// Install signal handlers for graceful shutdown (SIGTERM, SIGINT).
fn install_signal_handlers() {
    unsafe {
        libc::signal(libc::SIGTERM, signal_handler as libc::sighandler_t);
        libc::signal(libc::SIGINT, signal_handler as libc::sighandler_t);
    }
}

extern "C" fn signal_handler(_sig: libc::c_int) {
    SHUTDOWN_REQUESTED.store(true, Ordering::SeqCst);
}

// ── Session loop ───────────────────────────────────────────

/// Run one headless gesture session until a signal, the exit timer or the
/// end of a finite frame source.
///
/// Mode changes and cursor positions are logged from the main thread.
pub fn run(
    config: SessionConfig,
    source: impl FrameSource + 'static,
    finished: Option<Arc<AtomicBool>>,
    options: &BackendOptions,
) -> anyhow::Result<()> {
    install_signal_handlers();

    let (tx, rx) = mpsc::channel::<PipelineEvent>();
    let mut manager = LifecycleManager::new(
        config,
        FileModel::new(options.model.clone()),
        VirtualCamera::new(!options.deny_camera),
        source,
        tx,
    );
    info!("Config: {}", manager.config().config_sexp());

    if let Err(e) = manager.start() {
        error!("Status: {}", manager.status());
        return Err(e).context("activating gesture pipeline");
    }

    let start_time = Instant::now();
    let exit_duration = options.exit_after.map(Duration::from_secs);
    let mut last_status_log = Instant::now();
    let status_interval = Duration::from_secs(options.status_interval_secs.max(1));
    let poll_interval = Duration::from_millis(100);
    let mut last_detected: Option<bool> = None;

    loop {
        if SHUTDOWN_REQUESTED.load(Ordering::SeqCst) {
            info!("Shutdown signal received, stopping");
            break;
        }

        if let Some(dur) = exit_duration {
            if start_time.elapsed() >= dur {
                info!("Exit timer fired after {}s", dur.as_secs());
                break;
            }
        }

        if finished.as_ref().is_some_and(|f| f.load(Ordering::Acquire)) {
            info!("Frame source exhausted, stopping");
            break;
        }

        if last_status_log.elapsed() >= status_interval {
            info!(
                "Status: {} (mode {}, {} frames)",
                manager.status(),
                manager.mode_handle().get().as_str(),
                manager.pipeline_stats().frames
            );
            debug!("{}", manager.status_sexp());
            last_status_log = Instant::now();
        }

        match rx.recv_timeout(poll_interval) {
            Ok(event) => log_event(event, &mut last_detected),
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                error!("Frame loop disconnected");
                break;
            }
        }
        for event in rx.try_iter() {
            log_event(event, &mut last_detected);
        }
    }

    manager.stop();
    info!("Final mode: {}", manager.mode_handle().get().as_str());
    info!("Frame timing: {}", manager.frame_stats_sexp());
    Ok(())
}

fn log_event(event: PipelineEvent, last_detected: &mut Option<bool>) {
    match event {
        PipelineEvent::ModeChanged(mode) => info!("Mode changed: {}", mode.as_str()),
        PipelineEvent::Position(p) => {
            if *last_detected != Some(p.detected) {
                info!("Hand {}", if p.detected { "detected" } else { "lost" });
                *last_detected = Some(p.detected);
            }
            trace!("Cursor ({:.3}, {:.3})", p.x, p.y);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_model_loads() {
        let mut model = FileModel::new(None);
        model.load().unwrap();
        assert!(model.is_loaded());
        model.close();
        assert!(!model.is_loaded());
    }

    #[test]
    fn test_missing_model_file() {
        let mut model = FileModel::new(Some(PathBuf::from("/nonexistent/hand.task")));
        match model.load() {
            Err(AcquisitionError::ModelLoad(reason)) => assert!(reason.contains("/nonexistent/hand.task")),
            other => panic!("expected model load error, got {:?}", other),
        }
        assert!(!model.is_loaded());
    }

    #[test]
    fn test_empty_model_file() {
        let path = std::env::temp_dir().join(format!("handmode-empty-{}.task", std::process::id()));
        std::fs::write(&path, b"").unwrap();
        let mut model = FileModel::new(Some(path.clone()));
        let result = model.load();
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(AcquisitionError::ModelLoad(r)) if r.contains("empty")));
    }

    #[test]
    fn test_model_file_loads() {
        let path = std::env::temp_dir().join(format!("handmode-model-{}.task", std::process::id()));
        std::fs::write(&path, b"model").unwrap();
        let mut model = FileModel::new(Some(path.clone()));
        let result = model.load();
        std::fs::remove_file(&path).ok();
        assert!(result.is_ok());
        assert!(model.is_loaded());
    }

    #[test]
    fn test_virtual_camera_lifecycle() {
        let mut camera = VirtualCamera::new(true);
        assert!(camera.wait_first_frame(Duration::from_millis(10)).is_err());
        camera.acquire().unwrap();
        assert!(camera.is_open());
        camera.wait_first_frame(Duration::from_millis(10)).unwrap();
        camera.release();
        assert!(!camera.is_open());
    }

    #[test]
    fn test_denied_camera() {
        let mut camera = VirtualCamera::new(false);
        assert_eq!(camera.acquire(), Err(AcquisitionError::CameraPermissionDenied));
        assert!(!camera.is_open());
    }

    #[test]
    fn test_log_event_tracks_detection() {
        let mut last = None;
        log_event(
            PipelineEvent::Position(crate::gesture::CursorPosition { x: 0.1, y: 0.2, detected: true }),
            &mut last,
        );
        assert_eq!(last, Some(true));
        log_event(PipelineEvent::ModeChanged(crate::gesture::Mode::Chaos), &mut last);
        assert_eq!(last, Some(true));
    }
}
