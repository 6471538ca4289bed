//! Cursor position tracking from the palm anchor.

/// Last known cursor position in normalized image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CursorPosition {
    pub x: f32,
    pub y: f32,
    /// False when no hand arrived this frame; x/y keep the last value.
    pub detected: bool,
}

/// Configuration for cursor output.
#[derive(Debug, Clone, PartialEq)]
pub struct CursorConfig {
    /// Exponential smoothing factor (0.0 = raw anchor, towards 1.0 = heavier).
    pub smoothing: f32,
    /// Report `1 - x` for mirrored (selfie) previews.
    pub mirror_x: bool,
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            smoothing: 0.0,
            mirror_x: false,
        }
    }
}

/// Tracks and republishes the cursor once per frame.
pub struct PositionTracker {
    pub config: CursorConfig,
    last: CursorPosition,
}

impl PositionTracker {
    pub fn new(config: CursorConfig) -> Self {
        Self {
            config,
            last: CursorPosition::default(),
        }
    }

    /// Hand present: move to the anchor.
    pub fn update(&mut self, anchor_x: f32, anchor_y: f32) -> CursorPosition {
        let x = if self.config.mirror_x { 1.0 - anchor_x } else { anchor_x };
        let y = anchor_y;
        let alpha = self.config.smoothing;

        // First detection after a loss snaps to the anchor.
        self.last = if self.last.detected && alpha > 0.0 {
            CursorPosition {
                x: lerp(self.last.x, x, 1.0 - alpha),
                y: lerp(self.last.y, y, 1.0 - alpha),
                detected: true,
            }
        } else {
            CursorPosition { x, y, detected: true }
        };
        self.last
    }

    /// No hand this frame: keep the position, clear `detected`.
    pub fn lost(&mut self) -> CursorPosition {
        self.last.detected = false;
        self.last
    }

    pub fn current(&self) -> CursorPosition {
        self.last
    }
}

impl Default for PositionTracker {
    fn default() -> Self {
        Self::new(CursorConfig::default())
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_anchor_without_smoothing() {
        let mut tracker = PositionTracker::default();
        let p = tracker.update(0.3, 0.6);
        assert_eq!(p, CursorPosition { x: 0.3, y: 0.6, detected: true });
        let p = tracker.update(0.5, 0.2);
        assert_eq!(p, CursorPosition { x: 0.5, y: 0.2, detected: true });
    }

    #[test]
    fn test_lost_keeps_last_position() {
        let mut tracker = PositionTracker::default();
        tracker.update(0.3, 0.6);
        let p = tracker.lost();
        assert!(!p.detected);
        assert_eq!((p.x, p.y), (0.3, 0.6));
    }

    #[test]
    fn test_lost_before_any_hand() {
        let mut tracker = PositionTracker::default();
        assert!(!tracker.lost().detected);
    }

    #[test]
    fn test_smoothing() {
        let mut tracker = PositionTracker::new(CursorConfig { smoothing: 0.5, mirror_x: false });
        tracker.update(1.0, 0.0);
        let p = tracker.update(2.0, 0.0);
        assert!((p.x - 1.5).abs() < 1e-6, "Expected ~1.5 after smoothing, got {}", p.x);
    }

    #[test]
    fn test_smoothing_snaps_after_loss() {
        let mut tracker = PositionTracker::new(CursorConfig { smoothing: 0.5, mirror_x: false });
        tracker.update(0.2, 0.2);
        tracker.lost();
        let p = tracker.update(0.8, 0.8);
        assert_eq!((p.x, p.y), (0.8, 0.8));
    }

    #[test]
    fn test_mirror_x() {
        let mut tracker = PositionTracker::new(CursorConfig { smoothing: 0.0, mirror_x: true });
        let p = tracker.update(0.25, 0.4);
        assert!((p.x - 0.75).abs() < 1e-6);
        assert!((p.y - 0.4).abs() < 1e-6);
    }

}
