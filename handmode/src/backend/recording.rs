//! Landmark recordings and the replay frame source.
//!
//! A recording holds one s-expression per line:
//!
//! ```text
//! ; comment
//! (:t 0 :points ((0.50 0.90 0.0) (0.42 0.85 0.0) ...))
//! (:t 33.3 :hand nil)
//! ```
//!
//! Each point is `(x y)` or `(x y z)`. Entries keep whatever point count
//! the file has; a wrong count surfaces as a malformed frame at replay.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use lexpr::Value;
use tracing::{debug, info};

use crate::error::MalformedFrame;
use crate::gesture::{LandmarkFrame, LandmarkPoint};
use crate::lifecycle::FrameSource;
use crate::sexp::{as_f64, get_float, get_value, is_nil, list_items};

/// Frame spacing assumed for single-entry recordings.
const DEFAULT_FRAME_GAP_MS: f64 = 1000.0 / 30.0;

/// One recorded camera frame.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedEntry {
    NoHand { timestamp_ms: f64 },
    Hand { timestamp_ms: f64, points: Vec<LandmarkPoint> },
}

impl RecordedEntry {
    pub fn timestamp_ms(&self) -> f64 {
        match self {
            Self::NoHand { timestamp_ms } | Self::Hand { timestamp_ms, .. } => *timestamp_ms,
        }
    }

    /// Parse one `(:t ... :points ...)` / `(:t ... :hand nil)` entry.
    pub fn parse(value: &Value) -> anyhow::Result<Self> {
        let timestamp_ms = get_float(value, "t").context("missing :t timestamp")?;
        anyhow::ensure!(timestamp_ms.is_finite(), "timestamp is not finite");

        if let Some(points) = get_value(value, "points") {
            let items = list_items(points).context(":points must be a list")?;
            let points = items
                .iter()
                .enumerate()
                .map(|(i, p)| parse_point(p).with_context(|| format!("point {}", i)))
                .collect::<anyhow::Result<Vec<_>>>()?;
            return Ok(Self::Hand { timestamp_ms, points });
        }

        match get_value(value, "hand") {
            Some(hand) if is_nil(hand) => Ok(Self::NoHand { timestamp_ms }),
            Some(other) => anyhow::bail!("unexpected :hand value {}", other),
            None => anyhow::bail!("entry has neither :points nor :hand"),
        }
    }

    /// Render as a recording line.
    pub fn to_sexp(&self) -> String {
        match self {
            Self::NoHand { timestamp_ms } => format!("(:t {} :hand nil)", timestamp_ms),
            Self::Hand { timestamp_ms, points } => {
                let points: Vec<String> = points
                    .iter()
                    .map(|p| format!("({} {} {})", p.x, p.y, p.z))
                    .collect();
                format!("(:t {} :points ({}))", timestamp_ms, points.join(" "))
            }
        }
    }
}

fn parse_point(value: &Value) -> anyhow::Result<LandmarkPoint> {
    let coords = list_items(value)
        .context("expected (x y z)")?
        .into_iter()
        .map(|c| as_f64(c).with_context(|| format!("coordinate {} is not a number", c)))
        .collect::<anyhow::Result<Vec<_>>>()?;
    match coords.as_slice() {
        [x, y] => Ok(LandmarkPoint::new(*x as f32, *y as f32, 0.0)),
        [x, y, z] => Ok(LandmarkPoint::new(*x as f32, *y as f32, *z as f32)),
        _ => anyhow::bail!("expected 2 or 3 coordinates, got {}", coords.len()),
    }
}

/// Parsed recording.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recording {
    pub entries: Vec<RecordedEntry>,
}

impl Recording {
    pub fn parse(text: &str) -> anyhow::Result<Self> {
        let mut entries = Vec::new();
        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with(';') {
                continue;
            }
            let value = lexpr::from_str(line)
                .with_context(|| format!("line {}: invalid s-expression", lineno + 1))?;
            let entry = RecordedEntry::parse(&value)
                .with_context(|| format!("line {}", lineno + 1))?;
            entries.push(entry);
        }
        Ok(Self { entries })
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading recording {}", path.display()))?;
        let recording =
            Self::parse(&text).with_context(|| format!("in recording {}", path.display()))?;
        info!(
            "Loaded recording {} ({} frames, {:.1}s)",
            path.display(),
            recording.entries.len(),
            recording.span_ms() / 1000.0
        );
        Ok(recording)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Time from the first to the last entry.
    pub fn span_ms(&self) -> f64 {
        match (self.entries.first(), self.entries.last()) {
            (Some(first), Some(last)) => last.timestamp_ms() - first.timestamp_ms(),
            _ => 0.0,
        }
    }

    /// Average spacing between entries.
    fn frame_gap_ms(&self) -> f64 {
        if self.entries.len() < 2 {
            DEFAULT_FRAME_GAP_MS
        } else {
            self.span_ms() / (self.entries.len() - 1) as f64
        }
    }
}

// ── Replay source ──────────────────────────────────────────

/// Plays a recording back one entry per tick.
pub struct ReplaySource {
    recording: Recording,
    next: usize,
    looping: bool,
    /// Added to recorded timestamps; grows by one span per loop.
    offset_ms: f64,
    finished: Arc<AtomicBool>,
}

impl ReplaySource {
    pub fn new(recording: Recording, looping: bool) -> Self {
        Self {
            recording,
            next: 0,
            looping,
            offset_ms: 0.0,
            finished: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Set once a non-looping replay has delivered its last entry.
    pub fn finished_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.finished)
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }
}

impl FrameSource for ReplaySource {
    fn try_next_frame(&mut self) -> Result<Option<LandmarkFrame>, MalformedFrame> {
        if self.next >= self.recording.len() {
            if !self.looping || self.recording.is_empty() {
                self.finished.store(true, Ordering::Release);
                return Ok(None);
            }
            // Keep timestamps increasing across loops.
            self.offset_ms += self.recording.span_ms() + self.recording.frame_gap_ms();
            self.next = 0;
            debug!("Replay looped (offset {:.1}ms)", self.offset_ms);
        }

        let entry = &self.recording.entries[self.next];
        self.next += 1;

        match entry {
            RecordedEntry::NoHand { .. } => Ok(None),
            RecordedEntry::Hand { timestamp_ms, points } => {
                LandmarkFrame::from_slice(points, timestamp_ms + self.offset_ms).map(Some)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::test_poses::open_palm;
    use crate::gesture::LANDMARK_COUNT;

    fn hand_line(t: f64) -> String {
        RecordedEntry::Hand {
            timestamp_ms: t,
            points: open_palm(t).points().to_vec(),
        }
        .to_sexp()
    }

    #[test]
    fn test_parse_hand_and_no_hand() {
        let text = format!("; header\n\n{}\n(:t 33 :hand nil)\n", hand_line(0.0));
        let recording = Recording::parse(&text).unwrap();
        assert_eq!(recording.len(), 2);
        match &recording.entries[0] {
            RecordedEntry::Hand { points, .. } => assert_eq!(points.len(), LANDMARK_COUNT),
            other => panic!("expected hand entry, got {:?}", other),
        }
        assert_eq!(recording.entries[1], RecordedEntry::NoHand { timestamp_ms: 33.0 });
        assert_eq!(recording.span_ms(), 33.0);
    }

    #[test]
    fn test_parse_two_coordinate_points() {
        let recording = Recording::parse("(:t 5 :points ((0.1 0.2) (0.3 0.4 0.5)))").unwrap();
        match &recording.entries[0] {
            RecordedEntry::Hand { points, .. } => {
                assert_eq!(points[0], LandmarkPoint::new(0.1, 0.2, 0.0));
                assert_eq!(points[1], LandmarkPoint::new(0.3, 0.4, 0.5));
            }
            other => panic!("expected hand entry, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_errors_name_line() {
        let err = Recording::parse("(:t 0 :hand nil)\n(:points ())\n").unwrap_err();
        assert!(format!("{:#}", err).contains("line 2"));

        let err = Recording::parse("(:t 0 :points ((0.1)))").unwrap_err();
        assert!(format!("{:#}", err).contains("coordinates"));

        assert!(Recording::parse("(:t 0)").is_err());
        assert!(Recording::parse("(:t 0 :hand t)").is_err());
    }

    #[test]
    fn test_replay_in_order() {
        let text = format!("{}\n(:t 16 :hand nil)\n{}\n", hand_line(0.0), hand_line(32.0));
        let mut source = ReplaySource::new(Recording::parse(&text).unwrap(), false);
        assert!(source.try_next_frame().unwrap().is_some());
        assert!(source.try_next_frame().unwrap().is_none());
        let frame = source.try_next_frame().unwrap().unwrap();
        assert_eq!(frame.timestamp_ms(), 32.0);
        assert!(!source.is_finished());
        assert!(source.try_next_frame().unwrap().is_none());
        assert!(source.is_finished());
    }

    #[test]
    fn test_replay_wrong_count_is_malformed() {
        let mut source =
            ReplaySource::new(Recording::parse("(:t 0 :points ((0.1 0.2 0.0)))").unwrap(), false);
        assert_eq!(
            source.try_next_frame(),
            Err(MalformedFrame::WrongLandmarkCount { expected: LANDMARK_COUNT, actual: 1 })
        );
    }

    #[test]
    fn test_replay_loop_keeps_timestamps_increasing() {
        let text = format!("{}\n{}\n", hand_line(0.0), hand_line(20.0));
        let mut source = ReplaySource::new(Recording::parse(&text).unwrap(), true);
        let mut last = f64::NEG_INFINITY;
        for _ in 0..6 {
            let frame = source.try_next_frame().unwrap().unwrap();
            assert!(frame.timestamp_ms() > last);
            last = frame.timestamp_ms();
        }
        assert_eq!(last, 100.0);
        assert!(!source.is_finished());
    }

    #[test]
    fn test_empty_recording_finishes() {
        let mut source = ReplaySource::new(Recording::default(), true);
        assert!(source.try_next_frame().unwrap().is_none());
        assert!(source.is_finished());
    }

    #[test]
    fn test_load_missing_file() {
        let err = Recording::load(Path::new("/nonexistent/hand.rec")).unwrap_err();
        assert!(format!("{:#}", err).contains("reading recording"));
    }
}
