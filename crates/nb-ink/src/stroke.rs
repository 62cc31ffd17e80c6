//! Stroke styling and midpoint smoothing.
//!
//! A stroke is a polyline of pointer samples. Rather than drawing the raw
//! polyline, each new sample closes a quadratic segment whose control point
//! is the previous sample and whose endpoints are the midpoints on either
//! side of it, so joints come out rounded.

use crate::color::Color;
use kurbo::{BezPath, Point};

/// Pressure below this is raised to it so light touches stay visible.
pub const PRESSURE_FLOOR: f32 = 0.25;

/// The eraser is this many times wider than the pen, regardless of pressure.
pub const ERASER_SCALE: f32 = 2.4;

/// Draw width is `size × (BASE + GAIN × pressure)`.
const PRESSURE_BASE: f32 = 0.6;
const PRESSURE_GAIN: f32 = 0.6;

/// What a pointer gesture does on the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InkMode {
    /// Text editing; the ink layer ignores the pointer.
    #[default]
    Write,
    Draw,
    Erase,
}

impl InkMode {
    pub fn captures_pointer(self) -> bool {
        !matches!(self, InkMode::Write)
    }
}

/// How a stroke combines with what is already on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Composite {
    /// Paint over existing pixels.
    SourceOver,
    /// Remove existing pixels under the stroke.
    DestinationOut,
}

/// The user's current pen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PenSettings {
    pub color: Color,
    /// Nominal width in logical pixels.
    pub size: f32,
}

impl Default for PenSettings {
    fn default() -> Self {
        Self {
            color: Color::from_hex_or_black("#1f2a33"),
            size: 3.0,
        }
    }
}

/// Style applied to one rendered segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub composite: Composite,
    pub color: Color,
    /// Width in logical pixels.
    pub width: f32,
}

/// Normalize a raw pressure reading. Devices that report nothing or a hard
/// zero are treated as full pressure.
pub fn effective_pressure(pressure: Option<f32>) -> f32 {
    match pressure {
        Some(p) if p.is_finite() && p > 0.0 => p.max(PRESSURE_FLOOR),
        _ => 1.0,
    }
}

impl StrokeStyle {
    /// Style for a segment drawn in `mode` with the given pen and sample
    /// pressure. `None` in text mode.
    pub fn for_sample(mode: InkMode, pen: &PenSettings, pressure: Option<f32>) -> Option<Self> {
        match mode {
            InkMode::Write => None,
            InkMode::Draw => Some(Self {
                composite: Composite::SourceOver,
                color: pen.color,
                width: pen.size * (PRESSURE_BASE + PRESSURE_GAIN * effective_pressure(pressure)),
            }),
            InkMode::Erase => Some(Self {
                composite: Composite::DestinationOut,
                color: Color::BLACK,
                width: pen.size * ERASER_SCALE,
            }),
        }
    }
}

/// One piece of a smoothed stroke, in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    Line { from: Point, to: Point },
    Quad { from: Point, ctrl: Point, to: Point },
}

impl Segment {
    pub fn start(&self) -> Point {
        match *self {
            Segment::Line { from, .. } | Segment::Quad { from, .. } => from,
        }
    }

    pub fn end(&self) -> Point {
        match *self {
            Segment::Line { to, .. } | Segment::Quad { to, .. } => to,
        }
    }

    pub fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        path.move_to(self.start());
        match *self {
            Segment::Line { to, .. } => path.line_to(to),
            Segment::Quad { ctrl, to, .. } => path.quad_to(ctrl, to),
        }
        path
    }
}

/// Accumulates samples of the in-progress stroke and emits the segment each
/// new sample completes.
#[derive(Debug, Clone, Default)]
pub struct StrokeBuilder {
    points: Vec<Point>,
}

impl StrokeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sample. The first sample of a stroke emits nothing, the
    /// second a straight line, every later one a smoothed quadratic.
    /// Non-finite samples are dropped.
    pub fn push(&mut self, point: Point) -> Option<Segment> {
        if !point.is_finite() {
            log::debug!("dropping non-finite stroke sample {point:?}");
            return None;
        }
        self.points.push(point);
        match self.points.as_slice() {
            [] | [_] => None,
            [from, to] => Some(Segment::Line { from: *from, to: *to }),
            [.., p0, p1, p2] => Some(Segment::Quad {
                from: p0.midpoint(*p1),
                ctrl: *p1,
                to: p1.midpoint(*p2),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}
