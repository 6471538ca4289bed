//! Per-frame gesture pipeline.
//!
//! One `step` per tick: feature extraction, classification and the mode
//! state machine on one branch, the position tracker on the other. No
//! per-frame input can make a step fail; malformed frames and frames
//! without a hand both leave the mode untouched and clear `detected`.

use std::sync::mpsc;

use tracing::{debug, trace, warn};

use super::classifier::{classify, GestureCategory};
use super::cursor::{CursorConfig, CursorPosition, PositionTracker};
use super::features::{extract, FeatureConfig, FeatureSet};
use super::landmarks::LandmarkFrame;
use super::mode::{Mode, ModeConfig, ModeHandle, ModeStateMachine};
use crate::error::MalformedFrame;

// ── Events ─────────────────────────────────────────────────

/// Events published to rendering collaborators.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    /// The committed mode changed.
    ModeChanged(Mode),
    /// Cursor position for this frame.
    Position(CursorPosition),
}

/// Receives pipeline output on the frame-loop thread.
pub trait PipelineObserver: Send {
    fn on_mode_change(&mut self, mode: Mode);
    fn on_position(&mut self, position: CursorPosition);
}

/// Forward events to another thread. A dropped receiver is ignored.
impl PipelineObserver for mpsc::Sender<PipelineEvent> {
    fn on_mode_change(&mut self, mode: Mode) {
        let _ = self.send(PipelineEvent::ModeChanged(mode));
    }

    fn on_position(&mut self, position: CursorPosition) {
        let _ = self.send(PipelineEvent::Position(position));
    }
}

// ── Config ─────────────────────────────────────────────────

/// Configuration for all per-frame stages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineConfig {
    pub features: FeatureConfig,
    pub mode: ModeConfig,
    pub cursor: CursorConfig,
}

// ── Step output ────────────────────────────────────────────

/// Result of one pipeline step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    /// Features of this frame, when a valid hand frame arrived.
    pub features: Option<FeatureSet>,
    /// Classification, when a valid hand frame arrived.
    pub gesture: Option<GestureCategory>,
    /// Newly committed mode, if this frame caused a transition.
    pub mode_change: Option<Mode>,
    pub position: CursorPosition,
}

impl StepOutcome {
    /// Events in publish order.
    pub fn events(&self) -> Vec<PipelineEvent> {
        let mut events = Vec::with_capacity(2);
        if let Some(mode) = self.mode_change {
            events.push(PipelineEvent::ModeChanged(mode));
        }
        events.push(PipelineEvent::Position(self.position));
        events
    }
}

/// Running counters for one pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub frames: u64,
    pub hand_frames: u64,
    pub no_hand_frames: u64,
    pub malformed_frames: u64,
    pub mode_changes: u64,
}

// ── Pipeline ───────────────────────────────────────────────

/// Feature extractor, classifier, mode machine and cursor tracker.
pub struct GesturePipeline {
    features: FeatureConfig,
    mode: ModeStateMachine,
    cursor: PositionTracker,
    last_timestamp_ms: Option<f64>,
    last_gesture: Option<GestureCategory>,
    stats: PipelineStats,
}

impl GesturePipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_mode_handle(config, ModeHandle::default())
    }

    /// Pipeline whose mode machine writes through an existing handle.
    pub(crate) fn with_mode_handle(config: PipelineConfig, handle: ModeHandle) -> Self {
        Self {
            features: config.features,
            mode: ModeStateMachine::attached(handle, config.mode),
            cursor: PositionTracker::new(config.cursor),
            last_timestamp_ms: None,
            last_gesture: None,
            stats: PipelineStats::default(),
        }
    }

    /// Process one tick's frame-source result.
    pub fn step(&mut self, input: Result<Option<LandmarkFrame>, MalformedFrame>) -> StepOutcome {
        self.stats.frames += 1;

        let frame = match input.and_then(|f| self.check_order(f)) {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                self.stats.no_hand_frames += 1;
                return self.no_hand();
            }
            Err(e) => {
                self.stats.malformed_frames += 1;
                warn!("Discarding malformed frame ({}): {}", e.as_str(), e);
                return self.no_hand();
            }
        };

        self.stats.hand_frames += 1;
        self.last_timestamp_ms = Some(frame.timestamp_ms());

        let features = extract(&frame, &self.features);
        let gesture = classify(&features);
        if self.last_gesture != Some(gesture) {
            debug!(
                "Gesture: {:?} (extended={}, pinch-distance={:.3})",
                gesture, features.extended_finger_count, features.pinch_distance
            );
        }
        self.last_gesture = Some(gesture);

        let mode_change = self.mode.apply(gesture, frame.timestamp_ms());
        if mode_change.is_some() {
            self.stats.mode_changes += 1;
        }

        let position = self.cursor.update(features.anchor_x, features.anchor_y);
        trace!("Cursor: ({:.3}, {:.3})", position.x, position.y);

        StepOutcome {
            features: Some(features),
            gesture: Some(gesture),
            mode_change,
            position,
        }
    }

    /// Reject frames that do not advance capture time.
    fn check_order(
        &self,
        frame: Option<LandmarkFrame>,
    ) -> Result<Option<LandmarkFrame>, MalformedFrame> {
        match (&frame, self.last_timestamp_ms) {
            (Some(f), Some(previous_ms)) if f.timestamp_ms() <= previous_ms => {
                Err(MalformedFrame::OutOfOrder {
                    timestamp_ms: f.timestamp_ms(),
                    previous_ms,
                })
            }
            _ => Ok(frame),
        }
    }

    fn no_hand(&mut self) -> StepOutcome {
        self.mode.hold();
        self.last_gesture = None;
        StepOutcome {
            features: None,
            gesture: None,
            mode_change: None,
            position: self.cursor.lost(),
        }
    }

    pub fn current_mode(&self) -> Mode {
        self.mode.current()
    }

    pub fn mode_handle(&self) -> ModeHandle {
        self.mode.handle()
    }

    pub fn cursor(&self) -> CursorPosition {
        self.cursor.current()
    }

    /// Gesture of the most recent hand frame, `None` after a no-hand frame.
    pub fn last_gesture(&self) -> Option<GestureCategory> {
        self.last_gesture
    }

    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }

    /// Generate s-expression for status queries.
    pub fn status_sexp(&self) -> String {
        let cursor = self.cursor.current();
        format!(
            "(:gesture {} :state {} :cursor (:x {:.3} :y {:.3} :detected {}) :frames {} :hand-frames {} :no-hand-frames {} :malformed-frames {} :mode-changes {})",
            self.last_gesture
                .map(|g| format!(":{}", g.as_str()))
                .unwrap_or_else(|| "nil".to_string()),
            self.mode.status_sexp(),
            cursor.x,
            cursor.y,
            if cursor.detected { "t" } else { "nil" },
            self.stats.frames,
            self.stats.hand_frames,
            self.stats.no_hand_frames,
            self.stats.malformed_frames,
            self.stats.mode_changes,
        )
    }
}

impl Default for GesturePipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

// ── Tests ──────────────────────────────────────────────────
