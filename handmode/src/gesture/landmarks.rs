//! Hand landmark data structures.
//!
//! Models the 21 landmarks per hand emitted by the external pose
//! detector, in normalized image coordinates (x/y in 0..1, z relative
//! depth). Frames are validated once at construction so downstream
//! code can index without bounds or shape checks.

use crate::error::MalformedFrame;

// ── Landmark definitions ───────────────────────────────────

/// The 21 hand landmarks, in detector output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandLandmark {
    Wrist,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexBase,
    IndexPip,
    IndexDip,
    IndexTip,
    MiddleBase,
    MiddlePip,
    MiddleDip,
    MiddleTip,
    RingBase,
    RingPip,
    RingDip,
    RingTip,
    PinkyBase,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

/// Total number of landmarks per frame.
pub const LANDMARK_COUNT: usize = 21;

impl HandLandmark {
    /// Position of this landmark in a frame (0-20).
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// String representation for diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wrist => "wrist",
            Self::ThumbCmc => "thumb-cmc",
            Self::ThumbMcp => "thumb-mcp",
            Self::ThumbIp => "thumb-ip",
            Self::ThumbTip => "thumb-tip",
            Self::IndexBase => "index-base",
            Self::IndexPip => "index-pip",
            Self::IndexDip => "index-dip",
            Self::IndexTip => "index-tip",
            Self::MiddleBase => "middle-base",
            Self::MiddlePip => "middle-pip",
            Self::MiddleDip => "middle-dip",
            Self::MiddleTip => "middle-tip",
            Self::RingBase => "ring-base",
            Self::RingPip => "ring-pip",
            Self::RingDip => "ring-dip",
            Self::RingTip => "ring-tip",
            Self::PinkyBase => "pinky-base",
            Self::PinkyPip => "pinky-pip",
            Self::PinkyDip => "pinky-dip",
            Self::PinkyTip => "pinky-tip",
        }
    }

    /// (tip, base joint) pairs of the four non-thumb fingers.
    pub fn finger_pairs() -> [(HandLandmark, HandLandmark); 4] {
        [
            (Self::IndexTip, Self::IndexBase),
            (Self::MiddleTip, Self::MiddleBase),
            (Self::RingTip, Self::RingBase),
            (Self::PinkyTip, Self::PinkyBase),
        ]
    }
}

// ── Points ─────────────────────────────────────────────────

/// A single landmark position.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LandmarkPoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl LandmarkPoint {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &LandmarkPoint) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        let dz = other.z - self.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Point halfway between `self` and `other`.
    pub fn midpoint(&self, other: &LandmarkPoint) -> LandmarkPoint {
        LandmarkPoint {
            x: (self.x + other.x) * 0.5,
            y: (self.y + other.y) * 0.5,
            z: (self.z + other.z) * 0.5,
        }
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

// ── Frames ─────────────────────────────────────────────────

/// One detector result: all 21 landmarks plus capture time.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkFrame {
    points: [LandmarkPoint; LANDMARK_COUNT],
    timestamp_ms: f64,
}

impl LandmarkFrame {
    /// Build a frame from a fixed-size array. Rejects non-finite coordinates.
    pub fn new(
        points: [LandmarkPoint; LANDMARK_COUNT],
        timestamp_ms: f64,
    ) -> Result<Self, MalformedFrame> {
        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(MalformedFrame::NonFiniteCoordinate { index });
        }
        Ok(Self { points, timestamp_ms })
    }

    /// Build a frame from detector output of unknown length.
    pub fn from_slice(points: &[LandmarkPoint], timestamp_ms: f64) -> Result<Self, MalformedFrame> {
        let points: [LandmarkPoint; LANDMARK_COUNT] =
            points
                .try_into()
                .map_err(|_| MalformedFrame::WrongLandmarkCount {
                    expected: LANDMARK_COUNT,
                    actual: points.len(),
                })?;
        Self::new(points, timestamp_ms)
    }

    /// Position of a named landmark.
    pub fn point(&self, landmark: HandLandmark) -> LandmarkPoint {
        self.points[landmark.index()]
    }

    pub fn points(&self) -> &[LandmarkPoint; LANDMARK_COUNT] {
        &self.points
    }

    /// Capture timestamp in milliseconds.
    pub fn timestamp_ms(&self) -> f64 {
        self.timestamp_ms
    }

    /// Distance between two named landmarks of this frame.
    pub fn distance(&self, a: HandLandmark, b: HandLandmark) -> f32 {
        self.point(a).distance(&self.point(b))
    }

    #[cfg(test)]
    pub(crate) fn point_mut(&mut self, landmark: HandLandmark) -> &mut LandmarkPoint {
        &mut self.points[landmark.index()]
    }
}

// ── Tests ──────────────────────────────────────────────────
