//! Geometric feature extraction from a single landmark frame.
//!
//! Pure functions: one `LandmarkFrame` in, one `FeatureSet` out. The
//! frame type already guarantees all 21 points are present.

use super::landmarks::{HandLandmark, LandmarkFrame, LandmarkPoint};

/// Tip-to-wrist distance must exceed base-to-wrist distance times this
/// factor for a finger to count as extended.
pub const DEFAULT_EXTENSION_MARGIN: f32 = 1.2;

/// Thumb-tip to index-tip distance (normalized units) below which the
/// hand is pinching. Approximation for a hand filling a good part of a
/// 320x240 capture; smaller hands in frame need a smaller value.
pub const DEFAULT_PINCH_THRESHOLD: f32 = 0.05;

/// Tunables for feature extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureConfig {
    /// Noise margin applied to the base-joint distance.
    pub extension_margin: f32,
    /// Maximum thumb/index tip distance for a pinch.
    pub pinch_threshold: f32,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            extension_margin: DEFAULT_EXTENSION_MARGIN,
            pinch_threshold: DEFAULT_PINCH_THRESHOLD,
        }
    }
}

/// Per-frame geometric summary consumed by the classifier and cursor.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FeatureSet {
    /// Non-thumb fingers judged extended (0-4).
    pub extended_finger_count: u8,
    pub is_pinching: bool,
    /// Thumb-tip to index-tip distance.
    pub pinch_distance: f32,
    pub anchor_x: f32,
    pub anchor_y: f32,
}

impl FeatureSet {
    /// Convenience constructor used where only the classifier inputs matter.
    pub fn new(extended_finger_count: u8, is_pinching: bool) -> Self {
        Self {
            extended_finger_count,
            is_pinching,
            ..Self::default()
        }
    }
}

/// Palm anchor: midpoint of wrist and middle-finger base.
///
/// Less sensitive to wrist rotation than the wrist alone.
pub fn anchor_point(frame: &LandmarkFrame) -> LandmarkPoint {
    frame
        .point(HandLandmark::Wrist)
        .midpoint(&frame.point(HandLandmark::MiddleBase))
}

/// Whether the finger with the given tip and base joint is extended.
pub fn is_finger_extended(
    frame: &LandmarkFrame,
    tip: HandLandmark,
    base: HandLandmark,
    margin: f32,
) -> bool {
    let tip_dist = frame.distance(tip, HandLandmark::Wrist);
    let base_dist = frame.distance(base, HandLandmark::Wrist);
    tip_dist > base_dist * margin
}

/// Extract the feature set for one frame.
pub fn extract(frame: &LandmarkFrame, config: &FeatureConfig) -> FeatureSet {
    let extended_finger_count = HandLandmark::finger_pairs()
        .iter()
        .filter(|(tip, base)| is_finger_extended(frame, *tip, *base, config.extension_margin))
        .count() as u8;

    let pinch_distance = frame.distance(HandLandmark::ThumbTip, HandLandmark::IndexTip);
    let anchor = anchor_point(frame);

    FeatureSet {
        extended_finger_count,
        is_pinching: pinch_distance < config.pinch_threshold,
        pinch_distance,
        anchor_x: anchor.x,
        anchor_y: anchor.y,
    }
}
