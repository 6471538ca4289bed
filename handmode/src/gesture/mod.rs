//! Gesture subsystem: landmark frames in, mode and cursor out.
//!
//! - `landmarks`: validated 21-point frames
//! - `features`: finger extension, pinch distance, palm anchor
//! - `classifier`: fist / pinch / open palm / ambiguous
//! - `mode`: committed mode state machine and its shared handle
//! - `cursor`: palm-anchored cursor position
//! - `pipeline`: one step per frame across all of the above

pub mod classifier;
pub mod cursor;
pub mod features;
pub mod landmarks;
pub mod mode;
pub mod pipeline;

pub use classifier::{classify, GestureCategory};
pub use cursor::{CursorConfig, CursorPosition, PositionTracker};
pub use features::{extract, FeatureConfig, FeatureSet};
pub use landmarks::{HandLandmark, LandmarkFrame, LandmarkPoint, LANDMARK_COUNT};
pub use mode::{Mode, ModeConfig, ModeHandle, ModeStateMachine};
pub use pipeline::{
    GesturePipeline, PipelineConfig, PipelineEvent, PipelineObserver, PipelineStats, StepOutcome,
};

// ── Test helpers ───────────────────────────────────────────

/// Hand poses for unit tests, built on the synthetic backend's geometry.
#[cfg(test)]
pub(crate) mod test_poses {
    use super::landmarks::{HandLandmark, LandmarkFrame, LandmarkPoint};
    use crate::backend::synthetic::hand_pose;

    /// Build a pose from per-finger extension flags (index, middle, ring, pinky).
    pub fn pose_frame(extended: [bool; 4], pinch: bool, timestamp_ms: f64) -> LandmarkFrame {
        hand_pose(extended, pinch, (0.0, 0.0), timestamp_ms).unwrap()
    }

    pub fn set_point(frame: &mut LandmarkFrame, landmark: HandLandmark, x: f32, y: f32, z: f32) {
        *frame.point_mut(landmark) = LandmarkPoint::new(x, y, z);
    }

    pub fn fist(timestamp_ms: f64) -> LandmarkFrame {
        pose_frame([false; 4], false, timestamp_ms)
    }

    pub fn open_palm(timestamp_ms: f64) -> LandmarkFrame {
        pose_frame([true; 4], false, timestamp_ms)
    }

    pub fn pinch(timestamp_ms: f64) -> LandmarkFrame {
        pose_frame([true, true, true, false], true, timestamp_ms)
    }

    pub fn ambiguous(timestamp_ms: f64) -> LandmarkFrame {
        pose_frame([true, true, false, false], false, timestamp_ms)
    }
}
