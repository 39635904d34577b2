use web_time::Instant;

use crate::{Point, TrackerId};

/// Which part of a tracked element the pointer is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ElementPart {
    #[default]
    Body,
    DeleteButton,
}

/// Raw pointer activity on a tracked element. Positions are screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Enter,
    Leave,
    Press {
        position: Point,
        at: Instant,
        part: ElementPart,
    },
    Release {
        position: Point,
        at: Instant,
        part: ElementPart,
    },
}

/// A click on the viewer canvas itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasClick {
    /// Screen position in pixels
    pub position: Point,
    /// False when the gesture was a drag (pan) rather than a click
    pub quick: bool,
}

impl CanvasClick {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            position: Point::new(x, y),
            quick: true,
        }
    }
}

/// Everything a viewer reports back to its host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewerEvent {
    Pointer {
        tracker: TrackerId,
        event: PointerEvent,
    },
    CanvasClick(CanvasClick),
    /// Pan or zoom changed
    ViewportChanged,
}
