//! Application mode state machine.
//!
//! Holds the single committed `Mode`, maps each frame's gesture to a
//! candidate mode and decides whether to commit it. The committed mode
//! is published through a lock-free `ModeHandle` so renderers on other
//! threads can read it; only the state machine writes it.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use tracing::{debug, info};

use super::classifier::GestureCategory;

// ── Mode ───────────────────────────────────────────────────

/// Application mode driven by hand gestures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Mode {
    /// Assembled layout (fist).
    #[default]
    Formed = 0,
    /// Scattered layout (open palm).
    Chaos = 1,
    /// Single-item focus (pinch).
    Focus = 2,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Formed => "formed",
            Self::Chaos => "chaos",
            Self::Focus => "focus",
        }
    }

    /// Mode a gesture asks for, or `None` when it leaves the mode alone.
    pub fn for_gesture(gesture: GestureCategory) -> Option<Mode> {
        match gesture {
            GestureCategory::Fist => Some(Self::Formed),
            GestureCategory::Pinch => Some(Self::Focus),
            GestureCategory::OpenPalm => Some(Self::Chaos),
            GestureCategory::Ambiguous => None,
        }
    }

    fn from_u8(raw: u8) -> Mode {
        match raw {
            1 => Self::Chaos,
            2 => Self::Focus,
            _ => Self::Formed,
        }
    }
}

// ── Shared handle ──────────────────────────────────────────

/// Read-only, cloneable view of the committed mode.
///
/// Only a state machine inside this crate can write through a handle:
///
/// ```compile_fail
/// use handmode::gesture::{ModeConfig, ModeHandle, ModeStateMachine};
///
/// let handle = ModeHandle::default();
/// let _writer = ModeStateMachine::attached(handle, ModeConfig::default());
/// ```
#[derive(Debug, Clone)]
pub struct ModeHandle {
    inner: Arc<AtomicU8>,
}

impl ModeHandle {
    pub(crate) fn new(initial: Mode) -> Self {
        Self {
            inner: Arc::new(AtomicU8::new(initial as u8)),
        }
    }

    /// Current committed mode.
    pub fn get(&self) -> Mode {
        Mode::from_u8(self.inner.load(Ordering::Acquire))
    }

    fn publish(&self, mode: Mode) {
        self.inner.store(mode as u8, Ordering::Release);
    }
}

impl Default for ModeHandle {
    fn default() -> Self {
        Self::new(Mode::default())
    }
}

// ── Config ─────────────────────────────────────────────────

/// Configuration for mode commits.
#[derive(Debug, Clone, PartialEq)]
pub struct ModeConfig {
    /// Time (ms of frame timestamps) a candidate mode must be held before
    /// it commits. 0 commits every differing classification immediately.
    pub min_dwell_ms: f64,
}

impl Default for ModeConfig {
    fn default() -> Self {
        Self { min_dwell_ms: 0.0 }
    }
}

// ── State machine ──────────────────────────────────────────

/// Candidate mode waiting out the dwell time.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingMode {
    mode: Mode,
    since_ms: f64,
}

/// Single-writer mode state machine.
pub struct ModeStateMachine {
    pub config: ModeConfig,
    current: Mode,
    handle: ModeHandle,
    pending: Option<PendingMode>,
}

impl ModeStateMachine {
    /// New machine in the initial `Formed` mode.
    pub fn new(config: ModeConfig) -> Self {
        Self::attached(ModeHandle::default(), config)
    }

    /// New machine writing through an existing handle, resuming its mode.
    pub(crate) fn attached(handle: ModeHandle, config: ModeConfig) -> Self {
        Self {
            config,
            current: handle.get(),
            handle,
            pending: None,
        }
    }

    /// Committed mode.
    pub fn current(&self) -> Mode {
        self.current
    }

    /// Handle for readers on other threads.
    pub fn handle(&self) -> ModeHandle {
        self.handle.clone()
    }

    /// Candidate mode still inside its dwell window, if any.
    pub fn pending(&self) -> Option<Mode> {
        self.pending.map(|p| p.mode)
    }

    /// Apply one frame's classification.
    ///
    /// Returns the new mode when a transition commits; `None` when the
    /// mode is unchanged, including re-assertions of the current mode.
    pub fn apply(&mut self, gesture: GestureCategory, timestamp_ms: f64) -> Option<Mode> {
        let target = match Mode::for_gesture(gesture) {
            Some(m) => m,
            None => {
                self.pending = None;
                return None;
            }
        };

        if target == self.current {
            self.pending = None;
            return None;
        }

        if self.config.min_dwell_ms <= 0.0 {
            return Some(self.commit(target));
        }

        match self.pending {
            Some(p) if p.mode == target => {
                if timestamp_ms - p.since_ms >= self.config.min_dwell_ms {
                    return Some(self.commit(target));
                }
            }
            _ => {
                debug!("Mode candidate {:?} (dwell {}ms)", target, self.config.min_dwell_ms);
                self.pending = Some(PendingMode {
                    mode: target,
                    since_ms: timestamp_ms,
                });
            }
        }
        None
    }

    /// Frame without a hand: no transition, and any candidate is dropped.
    pub fn hold(&mut self) {
        self.pending = None;
    }

    fn commit(&mut self, mode: Mode) -> Mode {
        let old = self.current;
        self.current = mode;
        self.pending = None;
        self.handle.publish(mode);
        info!("Mode: {:?} -> {:?}", old, mode);
        mode
    }

    /// Generate s-expression for status queries.
    pub fn status_sexp(&self) -> String {
        format!(
            "(:mode :{} :pending {} :min-dwell-ms {:.0})",
            self.current.as_str(),
            self.pending
                .map(|p| format!(":{}", p.mode.as_str()))
                .unwrap_or_else(|| "nil".to_string()),
            self.config.min_dwell_ms,
        )
    }
}

impl Default for ModeStateMachine {
    fn default() -> Self {
        Self::new(ModeConfig::default())
    }
}

// ── Tests ──────────────────────────────────────────────────
