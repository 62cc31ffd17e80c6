//! The ink capture tool.
//!
//! Translates pointer events into smoothed segments stroked onto an
//! [`InkCanvas`] as they arrive. The tool is either idle or capturing one
//! stroke; a second pointer-down during a stroke is ignored.
//!
//! | Event                   | Idle                      | Capturing          |
//! |-------------------------|---------------------------|--------------------|
//! | down (draw/erase mode)  | start stroke              | ignored            |
//! | down (write mode)       | ignored                   | ignored            |
//! | move                    | ignored                   | render each sample |
//! | up / leave / cancel     | ignored                   | finish stroke      |

use crate::input::InputEvent;
use nb_ink::{InkCanvas, InkMode, PenSettings, StrokeBuilder, StrokeStyle};

/// What handling an event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolOutcome {
    /// Nothing changed.
    Ignored,
    /// A stroke began.
    Started,
    /// This many segments were stroked.
    Drew(usize),
    /// The stroke ended; the surface should be snapshotted.
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Capturing,
}

#[derive(Debug, Clone)]
pub struct InkTool {
    mode: InkMode,
    pen: PenSettings,
    phase: Phase,
    stroke: StrokeBuilder,
}

impl Default for InkTool {
    fn default() -> Self {
        Self::new(PenSettings::default())
    }
}

impl InkTool {
    pub fn new(pen: PenSettings) -> Self {
        Self {
            mode: InkMode::Write,
            pen,
            phase: Phase::Idle,
            stroke: StrokeBuilder::new(),
        }
    }

    pub fn mode(&self) -> InkMode {
        self.mode
    }

    pub fn pen(&self) -> &PenSettings {
        &self.pen
    }

    pub fn pen_mut(&mut self) -> &mut PenSettings {
        &mut self.pen
    }

    pub fn is_capturing(&self) -> bool {
        self.phase == Phase::Capturing
    }

    /// Switch mode. A stroke in progress is finished first; returns whether
    /// that happened.
    pub fn set_mode(&mut self, mode: InkMode) -> bool {
        let finished = self.finish();
        self.mode = mode;
        finished
    }

    /// End the current stroke, if any.
    pub fn finish(&mut self) -> bool {
        if self.phase != Phase::Capturing {
            return false;
        }
        log::trace!("stroke finished after {} samples", self.stroke.len());
        self.phase = Phase::Idle;
        self.stroke.clear();
        true
    }

    pub fn handle(&mut self, event: &InputEvent, canvas: &mut dyn InkCanvas) -> ToolOutcome {
        match event {
            InputEvent::PointerDown(sample) => {
                if self.is_capturing() || !self.mode.captures_pointer() {
                    return ToolOutcome::Ignored;
                }
                self.phase = Phase::Capturing;
                self.stroke.clear();
                self.stroke.push(sample.to_point());
                log::trace!("stroke started at ({}, {})", sample.x, sample.y);
                ToolOutcome::Started
            }
            InputEvent::PointerMove(samples) => {
                if !self.is_capturing() {
                    return ToolOutcome::Ignored;
                }
                let mut drawn = 0;
                for sample in samples {
                    let Some(segment) = self.stroke.push(sample.to_point()) else {
                        continue;
                    };
                    let style = StrokeStyle::for_sample(self.mode, &self.pen, sample.pressure);
                    if let Some(style) = style {
                        canvas.stroke_segment(&segment, &style);
                        drawn += 1;
                    }
                }
                ToolOutcome::Drew(drawn)
            }
            InputEvent::PointerUp | InputEvent::PointerLeave | InputEvent::PointerCancel => {
                if self.finish() {
                    ToolOutcome::Finished
                } else {
                    ToolOutcome::Ignored
                }
            }
        }
    }
}
