//! Scripted synthetic hand for smoke-testing overlays without a camera.
//!
//! Cycles fist, open palm, pinch, an ambiguous two-finger pose and a
//! stretch with no hand, drifting the hand slowly so the cursor moves.

use tracing::debug;

use crate::error::MalformedFrame;
use crate::gesture::{HandLandmark, LandmarkFrame, LandmarkPoint, LANDMARK_COUNT};
use crate::lifecycle::FrameSource;

const WRIST: (f32, f32) = (0.5, 0.9);
/// Index, middle, ring and pinky base joints.
const BASES: [(f32, f32); 4] = [(0.44, 0.7), (0.5, 0.68), (0.56, 0.7), (0.62, 0.72)];
const EXTENDED_TIP_Y: f32 = 0.45;
const CURLED_TIP_Y: f32 = 0.8;

/// Build a hand pose from per-finger extension flags (index, middle,
/// ring, pinky), shifted by `offset`.
///
/// With `pinch` the thumb tip sits next to the index tip; otherwise it is
/// tucked away from every fingertip.
pub fn hand_pose(
    extended: [bool; 4],
    pinch: bool,
    offset: (f32, f32),
    timestamp_ms: f64,
) -> Result<LandmarkFrame, MalformedFrame> {
    let at = |x: f32, y: f32| LandmarkPoint::new(x + offset.0, y + offset.1, 0.0);
    let mut points = [LandmarkPoint::default(); LANDMARK_COUNT];
    points[HandLandmark::Wrist.index()] = at(WRIST.0, WRIST.1);

    for (i, (tip, base)) in HandLandmark::finger_pairs().iter().enumerate() {
        let (bx, by) = BASES[i];
        let (tx, ty) = if extended[i] {
            (bx - 0.02, EXTENDED_TIP_Y)
        } else {
            (bx, CURLED_TIP_Y)
        };
        points[base.index()] = at(bx, by);
        // PIP and DIP on the segment between base and tip.
        for step in 1..=2 {
            let t = step as f32 / 3.0;
            points[base.index() + step] = at(bx + (tx - bx) * t, by + (ty - by) * t);
        }
        points[tip.index()] = at(tx, ty);
    }

    points[HandLandmark::ThumbCmc.index()] = at(0.42, 0.85);
    points[HandLandmark::ThumbMcp.index()] = at(0.37, 0.8);
    points[HandLandmark::ThumbIp.index()] = at(0.33, 0.77);
    points[HandLandmark::ThumbTip.index()] = if pinch {
        let index_tip = points[HandLandmark::IndexTip.index()];
        LandmarkPoint::new(index_tip.x - 0.01, index_tip.y + 0.01, 0.0)
    } else {
        at(0.3, 0.75)
    };

    LandmarkFrame::new(points, timestamp_ms)
}

/// Poses in script order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntheticPose {
    Fist,
    OpenPalm,
    Pinch,
    Ambiguous,
    NoHand,
}

impl SyntheticPose {
    pub const SCRIPT: [SyntheticPose; 5] = [
        Self::Fist,
        Self::OpenPalm,
        Self::Pinch,
        Self::Ambiguous,
        Self::NoHand,
    ];

    pub fn frame(
        &self,
        offset: (f32, f32),
        timestamp_ms: f64,
    ) -> Result<Option<LandmarkFrame>, MalformedFrame> {
        let (extended, pinch) = match self {
            Self::Fist => ([false; 4], false),
            Self::OpenPalm => ([true; 4], false),
            Self::Pinch => ([true, true, true, false], true),
            Self::Ambiguous => ([true, true, false, false], false),
            Self::NoHand => return Ok(None),
        };
        hand_pose(extended, pinch, offset, timestamp_ms).map(Some)
    }
}

/// Frame source replaying `SyntheticPose::SCRIPT` forever.
pub struct SyntheticSource {
    /// Frames each pose is held for, at least 1.
    hold_frames: u32,
    /// Timestamp step between frames.
    frame_interval_ms: f64,
    frame: u64,
}

impl SyntheticSource {
    pub fn new(hold_frames: u32, frame_interval_ms: f64) -> Self {
        Self {
            hold_frames: hold_frames.max(1),
            frame_interval_ms,
            frame: 0,
        }
    }

    pub fn hold_frames(&self) -> u32 {
        self.hold_frames
    }

    /// Pose for the next frame.
    pub fn current_pose(&self) -> SyntheticPose {
        let slot = (self.frame / u64::from(self.hold_frames)) as usize;
        SyntheticPose::SCRIPT[slot % SyntheticPose::SCRIPT.len()]
    }
}

impl Default for SyntheticSource {
    fn default() -> Self {
        // 1.5s per pose at 30fps.
        Self::new(45, 1000.0 / 30.0)
    }
}

impl FrameSource for SyntheticSource {
    fn try_next_frame(&mut self) -> Result<Option<LandmarkFrame>, MalformedFrame> {
        let pose = self.current_pose();
        let timestamp_ms = self.frame as f64 * self.frame_interval_ms;
        if self.frame % u64::from(self.hold_frames) == 0 {
            debug!("Synthetic pose: {:?}", pose);
        }

        // Slow circular drift, radius 0.05.
        let phase = (timestamp_ms / 4000.0) as f32 * std::f32::consts::TAU;
        let offset = (0.05 * phase.cos(), 0.05 * phase.sin());

        self.frame += 1;
        pose.frame(offset, timestamp_ms)
    }
}
