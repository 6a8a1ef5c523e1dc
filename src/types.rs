// THEORY:
// BBox and DetectionId are "dumb" data containers in the same sense as the teacher's
// own `SmartBlob`/`Point`: they carry coordinates and identity for a single frame and
// know nothing about history. `Track`, `MhtEngine`, and `ConflictGraph` build the
// stateful layers on top of them.

use std::fmt;

/// An axis-aligned bounding box in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl BBox {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn center(&self) -> (f64, f64) {
        ((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    pub fn area(&self) -> f64 {
        (self.x2 - self.x1).max(0.0) * (self.y2 - self.y1).max(0.0)
    }

    /// Clips this box to the bounds of a `width` x `height` image, rounding to
    /// integer pixel coordinates. Returns `None` if the clipped region has zero
    /// area (degenerate crop).
    pub fn clip_to_image(&self, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
        let x1 = self.x1.round().clamp(0.0, width as f64) as u32;
        let y1 = self.y1.round().clamp(0.0, height as f64) as u32;
        let x2 = self.x2.round().clamp(0.0, width as f64) as u32;
        let y2 = self.y2.round().clamp(0.0, height as f64) as u32;
        if x2 <= x1 || y2 <= y1 {
            return None;
        }
        Some((x1, y1, x2 - x1, y2 - y1))
    }
}

/// Identifies a detection within a single frame. Not stable across frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DetectionId(pub u64);

impl fmt::Display for DetectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "det#{}", self.0)
    }
}

/// Globally unique identifier assigned to a hypothesis when it is first seeded
/// from a detection. Monotonically increasing for the life of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackId(pub u64);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "track#{}", self.0)
    }
}
