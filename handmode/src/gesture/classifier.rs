//! Gesture classification from per-frame features.
//!
//! Stateless and deterministic. Checks run in a fixed priority order and
//! the first match wins: fist, then pinch, then open palm. A pinched fist
//! therefore never reads as the fine-grained pinch gesture.

use super::features::FeatureSet;

/// At most this many extended fingers reads as a fist.
pub const FIST_MAX_EXTENDED: u8 = 1;

/// At least this many extended fingers (without a pinch) reads as an open palm.
pub const OPEN_PALM_MIN_EXTENDED: u8 = 3;

/// Instantaneous classifier verdict for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureCategory {
    /// Fingers curled into the palm.
    Fist,
    /// Three or more fingers extended, no pinch.
    OpenPalm,
    /// Thumb tip touching index tip on an otherwise open hand.
    Pinch,
    /// No recognized shape; never drives a mode change.
    Ambiguous,
}

impl GestureCategory {
    /// String representation for s-expression output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fist => "fist",
            Self::OpenPalm => "open-palm",
            Self::Pinch => "pinch",
            Self::Ambiguous => "ambiguous",
        }
    }

    /// Human-readable label for status overlays.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Fist => "Fist",
            Self::OpenPalm => "Open Palm",
            Self::Pinch => "Pinch",
            Self::Ambiguous => "Ambiguous",
        }
    }
}

/// Classify one feature set.
pub fn classify(features: &FeatureSet) -> GestureCategory {
    if features.extended_finger_count <= FIST_MAX_EXTENDED {
        GestureCategory::Fist
    } else if features.is_pinching {
        GestureCategory::Pinch
    } else if features.extended_finger_count >= OPEN_PALM_MIN_EXTENDED {
        GestureCategory::OpenPalm
    } else {
        GestureCategory::Ambiguous
    }
}
