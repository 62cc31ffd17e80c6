//! Input abstraction layer.
//!
//! Normalizes mouse, touch, and stylus pointer events into a unified
//! `InputEvent` enum consumed by the ink tool. Coordinates are logical
//! pixels relative to the page's top-left corner.

use smallvec::SmallVec;

/// One position reading from a pointing device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub x: f32,
    pub y: f32,
    /// Pressure from 0.0 to 1.0, `None` when the device reports none.
    pub pressure: Option<f32>,
}

impl PointerSample {
    pub fn new(x: f32, y: f32, pressure: Option<f32>) -> Self {
        Self { x, y, pressure }
    }

    pub fn to_point(self) -> kurbo::Point {
        kurbo::Point::new(self.x as f64, self.y as f64)
    }
}

/// Samples carried by one move event. Browsers may coalesce several
/// high-frequency readings into a single event; a handful is typical.
pub type Samples = SmallVec<[PointerSample; 4]>;

/// A normalized input event from any pointing device.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Pointer pressed (mouse down, touch start, pen contact).
    PointerDown(PointerSample),

    /// Pointer moved; samples are in delivery order.
    PointerMove(Samples),

    /// Pointer released.
    PointerUp,

    /// Pointer left the page.
    PointerLeave,

    /// The platform took the pointer away (palm rejection, gesture).
    PointerCancel,
}

impl InputEvent {
    pub fn from_pointer_down(x: f32, y: f32, pressure: Option<f32>) -> Self {
        Self::PointerDown(PointerSample::new(x, y, pressure))
    }

    pub fn from_pointer_move(x: f32, y: f32, pressure: Option<f32>) -> Self {
        Self::PointerMove(smallvec::smallvec![PointerSample::new(x, y, pressure)])
    }

    /// A move event carrying coalesced readings.
    pub fn from_coalesced(samples: impl IntoIterator<Item = PointerSample>) -> Self {
        Self::PointerMove(samples.into_iter().collect())
    }

    /// Whether this event finishes the current stroke.
    pub fn ends_stroke(&self) -> bool {
        matches!(
            self,
            Self::PointerUp | Self::PointerLeave | Self::PointerCancel
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coalesced_samples_keep_order() {
        let event = InputEvent::from_coalesced([
            PointerSample::new(1.0, 1.0, None),
            PointerSample::new(2.0, 2.0, Some(0.5)),
        ]);
        let InputEvent::PointerMove(samples) = event else {
            panic!("expected a move");
        };
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[1].pressure, Some(0.5));
    }

    #[test]
    fn release_leave_and_cancel_end_strokes() {
        assert!(InputEvent::PointerUp.ends_stroke());
        assert!(InputEvent::PointerLeave.ends_stroke());
        assert!(InputEvent::PointerCancel.ends_stroke());
        assert!(!InputEvent::from_pointer_move(0.0, 0.0, None).ends_stroke());
    }
}
