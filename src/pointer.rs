//! Per-element pointer tracking: hover and click-vs-drag recognition.
//!
//! A press followed by a release counts as a click only when both the elapsed
//! time and the pointer travel stay under their thresholds. Anything longer
//! or further is a pan gesture and must not fire the element's click action.

use std::time::Duration;

use siteplan_viewer::{ElementPart, Point, PointerEvent, TrackerId};
use web_time::Instant;

use crate::config::InteractionConfig;
use crate::constants::{CLICK_DISTANCE_THRESHOLD_PX, CLICK_TIME_THRESHOLD_MS};

/// Limits a press/release pair must stay within to count as a click.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickThresholds {
    pub max_duration: Duration,
    pub max_distance_px: f64,
}

impl Default for ClickThresholds {
    fn default() -> Self {
        Self {
            max_duration: Duration::from_millis(CLICK_TIME_THRESHOLD_MS),
            max_distance_px: CLICK_DISTANCE_THRESHOLD_PX,
        }
    }
}

impl From<&InteractionConfig> for ClickThresholds {
    fn from(config: &InteractionConfig) -> Self {
        Self {
            max_duration: Duration::from_millis(config.click_time_ms),
            max_distance_px: config.click_distance_px,
        }
    }
}

/// What a pointer event amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Enter,
    Leave,
    Click(ElementPart),
    /// Press/release too slow or too far apart
    Drag,
    /// Nothing to act on (e.g. a press, or a release without a press)
    None,
}

#[derive(Debug, Clone, Copy)]
struct Press {
    position: Point,
    at: Instant,
    part: ElementPart,
}

/// Pointer state of one tracked element.
#[derive(Debug, Clone)]
pub struct PointerTracker {
    id: TrackerId,
    press: Option<Press>,
    hovered: bool,
}

impl PointerTracker {
    pub fn new(id: TrackerId) -> Self {
        Self {
            id,
            press: None,
            hovered: false,
        }
    }

    pub fn id(&self) -> TrackerId {
        self.id
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    /// Feed a pointer event and classify it.
    pub fn handle(&mut self, event: PointerEvent, thresholds: &ClickThresholds) -> Gesture {
        match event {
            PointerEvent::Enter => {
                self.hovered = true;
                Gesture::Enter
            }
            PointerEvent::Leave => {
                self.hovered = false;
                Gesture::Leave
            }
            PointerEvent::Press { position, at, part } => {
                self.press = Some(Press { position, at, part });
                Gesture::None
            }
            PointerEvent::Release { position, at, part } => {
                let Some(press) = self.press.take() else {
                    return Gesture::None;
                };
                let elapsed = at.saturating_duration_since(press.at);
                let travel = press.position.distance_to(position);
                if elapsed > thresholds.max_duration || travel > thresholds.max_distance_px {
                    log::trace!(
                        "Tracker {:?}: drag ({:?}, {:.1}px), not a click",
                        self.id,
                        elapsed,
                        travel
                    );
                    Gesture::Drag
                } else if part != press.part {
                    Gesture::None
                } else {
                    Gesture::Click(part)
                }
            }
        }
    }
}
