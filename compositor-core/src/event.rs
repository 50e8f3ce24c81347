//! Touch input events for canvas interaction.

use serde::{Deserialize, Serialize};

use crate::Point;

/// Phase of a touch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TouchPhase {
    /// Touch started (finger down).
    Start,
    /// Touch moved (finger dragging).
    Move,
    /// Touch ended (finger up).
    End,
    /// Touch cancelled by the platform.
    Cancel,
}

/// A single touch point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    /// Touch identifier (for multi-touch).
    pub id: u32,
    /// X position in canvas coordinates.
    pub x: f32,
    /// Y position in canvas coordinates.
    pub y: f32,
}

impl TouchPoint {
    /// Create a touch point.
    #[must_use]
    pub fn new(id: u32, x: f32, y: f32) -> Self {
        Self { id, x, y }
    }

    /// Position as a canvas point.
    #[must_use]
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A touch event with one or more touch points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TouchEvent {
    /// Phase of this touch event.
    pub phase: TouchPhase,
    /// All current touch points.
    pub touches: Vec<TouchPoint>,
    /// Timestamp in milliseconds since canvas start.
    pub timestamp_ms: u64,
}

impl TouchEvent {
    /// Create a new touch event.
    #[must_use]
    pub fn new(phase: TouchPhase, touches: Vec<TouchPoint>, timestamp_ms: u64) -> Self {
        Self {
            phase,
            touches,
            timestamp_ms,
        }
    }

    /// Create a single-finger event at `(x, y)`.
    #[must_use]
    pub fn single(phase: TouchPhase, x: f32, y: f32) -> Self {
        Self::new(phase, vec![TouchPoint::new(0, x, y)], 0)
    }

    /// Get the primary (first) touch point.
    #[must_use]
    pub fn primary_touch(&self) -> Option<&TouchPoint> {
        self.touches.first()
    }

    /// Check if this is a multi-touch event.
    #[must_use]
    pub fn is_multi_touch(&self) -> bool {
        self.touches.len() > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_touch_is_first() {
        let event = TouchEvent::new(
            TouchPhase::Move,
            vec![TouchPoint::new(7, 1.0, 2.0), TouchPoint::new(8, 3.0, 4.0)],
            10,
        );
        assert!(event.is_multi_touch());
        assert_eq!(event.primary_touch().map(TouchPoint::position), Some(Point::new(1.0, 2.0)));
    }

    #[test]
    fn test_empty_event_has_no_primary() {
        let event = TouchEvent::new(TouchPhase::End, Vec::new(), 0);
        assert!(event.primary_touch().is_none());
        assert!(!event.is_multi_touch());
    }

    #[test]
    fn test_phase_serializes_lowercase() {
        let json = serde_json::to_string(&TouchEvent::single(TouchPhase::Start, 1.0, 2.0)).unwrap();
        assert!(json.contains("\"phase\":\"start\""));
    }
}
