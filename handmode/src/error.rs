//! Error kinds for the gesture pipeline.
//!
//! Two classes exist: acquisition failures, which end the current
//! activation attempt, and malformed frames, which are absorbed by the
//! frame loop and handled as "no hand". A frame without a hand is not
//! an error at all and is reported as `Ok(None)` by the frame source.

use std::time::Duration;

/// A resource could not be acquired while activating the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AcquisitionError {
    /// The landmark model asset could not be loaded.
    #[error("model load failed: {0}")]
    ModelLoad(String),
    /// The user or platform refused access to the camera.
    #[error("camera permission denied")]
    CameraPermissionDenied,
    /// The camera stream was granted but could not be set up.
    #[error("camera stream setup failed: {0}")]
    StreamSetup(String),
    /// The camera never delivered a first frame.
    #[error("no camera frame within {0:?}")]
    FirstFrameTimeout(Duration),
    /// The frame source was lost (e.g. a previous frame loop crashed).
    #[error("frame source unavailable")]
    FrameSourceUnavailable,
    /// The session configuration failed validation; nothing was acquired.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// A landmark frame that must not reach the feature extractor.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MalformedFrame {
    #[error("expected {expected} landmarks, got {actual}")]
    WrongLandmarkCount { expected: usize, actual: usize },
    #[error("landmark {index} has a non-finite coordinate")]
    NonFiniteCoordinate { index: usize },
    #[error("frame at {timestamp_ms}ms is not after previous frame at {previous_ms}ms")]
    OutOfOrder { timestamp_ms: f64, previous_ms: f64 },
}

impl MalformedFrame {
    /// Short kebab-case tag for diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WrongLandmarkCount { .. } => "wrong-landmark-count",
            Self::NonFiniteCoordinate { .. } => "non-finite-coordinate",
            Self::OutOfOrder { .. } => "out-of-order",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquisition_error_messages() {
        assert_eq!(
            AcquisitionError::ModelLoad("missing asset".into()).to_string(),
            "model load failed: missing asset"
        );
        assert_eq!(
            AcquisitionError::CameraPermissionDenied.to_string(),
            "camera permission denied"
        );
        assert_eq!(
            AcquisitionError::InvalidConfig(":tick-hz must be in (0, 240], got 0".into())
                .to_string(),
            "invalid configuration: :tick-hz must be in (0, 240], got 0"
        );
    }

    #[test]
    fn test_malformed_frame_message_and_tag() {
        let err = MalformedFrame::WrongLandmarkCount { expected: 21, actual: 5 };
        assert_eq!(err.to_string(), "expected 21 landmarks, got 5");
        assert_eq!(err.as_str(), "wrong-landmark-count");
        assert_eq!(
            MalformedFrame::OutOfOrder { timestamp_ms: 1.0, previous_ms: 2.0 }.as_str(),
            "out-of-order"
        );
    }
}
