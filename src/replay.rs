//! Scripted replay of viewer interactions against a [`MemoryViewer`].
//!
//! A script describes the floor-plan image, the entities to show and a
//! sequence of user actions. Running it yields every [`OverlayEvent`] the
//! managers emitted, in order. Used by the `siteplan-replay` binary and by
//! scenario tests.

use std::time::Duration;

use serde::Deserialize;
use siteplan_viewer::{
    CanvasClick, Camera, ElementId, ElementPart, MemoryViewer, Point, PointerEvent, Size,
    ViewerEvent,
};
use web_time::Instant;

use crate::config::OverlayConfig;
use crate::error::OverlayError;
use crate::event::OverlayEvent;
use crate::floor_view::FloorPlanView;
use crate::model::{CriticalSector, MarkerId, SectorId, WorkLog};

/// How long a scripted click holds the pointer down.
const SCRIPTED_CLICK_MS: u64 = 50;

/// A replay script, usually read from JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct ReplayScript {
    /// Pixel size of the floor-plan image; `None` replays without an image
    #[serde(default)]
    pub image: Option<Size>,
    #[serde(default)]
    pub camera: Option<Camera>,
    #[serde(default)]
    pub can_manage_sectors: bool,
    #[serde(default)]
    pub work_logs: Vec<WorkLog>,
    #[serde(default)]
    pub sectors: Vec<CriticalSector>,
    #[serde(default)]
    pub actions: Vec<ReplayAction>,
}

impl ReplayScript {
    pub fn from_json(json: &str) -> Result<Self, OverlayError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// One scripted user action. Screen positions are in pixels.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ReplayAction {
    StartDrawing {
        mode: String,
    },
    CanvasClick {
        x: f64,
        y: f64,
        #[serde(default = "default_quick")]
        quick: bool,
    },
    FinishPolygon,
    UndoPoint,
    StopDrawing,
    CancelDrawing,
    ClickMarker {
        id: MarkerId,
    },
    ClickSector {
        id: SectorId,
        /// Click the delete button instead of the body
        #[serde(default)]
        delete: bool,
    },
    HoverSector {
        id: SectorId,
    },
    /// Zoom by `factor` around a screen point
    Zoom {
        factor: f64,
        #[serde(default)]
        x: f64,
        #[serde(default)]
        y: f64,
    },
    Pan {
        dx: f64,
        dy: f64,
    },
    AddMarker {
        work_log: WorkLog,
    },
    UpdateMarker {
        work_log: WorkLog,
    },
    RemoveMarker {
        id: MarkerId,
    },
    DisplaySector {
        sector: CriticalSector,
    },
    RemoveSector {
        id: SectorId,
    },
    ClearAll,
}

fn default_quick() -> bool {
    true
}

/// Runs a script step by step.
#[derive(Debug)]
pub struct Replay {
    view: FloorPlanView<MemoryViewer>,
    clock: Instant,
}

impl Replay {
    /// Set up the viewer and show the script's entities.
    pub fn new(script: &ReplayScript, config: &OverlayConfig) -> Self {
        let mut viewer = match script.image {
            Some(size) => MemoryViewer::with_image(size),
            None => MemoryViewer::new(),
        };
        if let Some(camera) = script.camera {
            viewer.set_camera(camera);
        }

        let mut view = FloorPlanView::new(viewer, config, script.can_manage_sectors);
        let markers = view.show_work_logs(script.work_logs.iter().cloned());
        let sectors = view.show_sectors(script.sectors.iter().cloned());
        log::info!("Replay set up with {} markers and {} sectors", markers, sectors);

        Self {
            view,
            clock: Instant::now(),
        }
    }

    pub fn view(&self) -> &FloorPlanView<MemoryViewer> {
        &self.view
    }

    /// Apply one action and return the events it produced.
    ///
    /// A failed action is reported as an [`OverlayEvent::Alert`] so the
    /// replay keeps going.
    pub fn step(&mut self, action: &ReplayAction) -> Vec<OverlayEvent> {
        log::debug!("Replay action: {:?}", action);
        let mut events = Vec::new();
        if let Err(e) = self.apply(action) {
            log::warn!("Replay action failed: {}", e);
            events.push(OverlayEvent::Alert {
                message: e.to_string(),
            });
        }
        let mut emitted = self.view.take_events();
        emitted.append(&mut events);
        emitted
    }

    fn apply(&mut self, action: &ReplayAction) -> Result<(), OverlayError> {
        match action {
            ReplayAction::StartDrawing { mode } => self.view.start_drawing_named(mode)?,
            ReplayAction::CanvasClick { x, y, quick } => {
                self.view.handle_event(ViewerEvent::CanvasClick(CanvasClick {
                    position: Point::new(*x, *y),
                    quick: *quick,
                }));
            }
            ReplayAction::FinishPolygon => self.view.finish_polygon()?,
            ReplayAction::UndoPoint => self.view.undo_last_point()?,
            ReplayAction::StopDrawing => self.view.stop_drawing(),
            ReplayAction::CancelDrawing => self.view.cancel_drawing(),
            ReplayAction::ClickMarker { id } => {
                let element = self
                    .view
                    .markers()
                    .element_of(*id)
                    .ok_or(OverlayError::UnknownMarker(*id))?;
                self.click_element(element, ElementPart::Body);
            }
            ReplayAction::ClickSector { id, delete } => {
                let element = self
                    .view
                    .sectors()
                    .element_of(*id)
                    .ok_or(OverlayError::UnknownSector(*id))?;
                let part = if *delete {
                    ElementPart::DeleteButton
                } else {
                    ElementPart::Body
                };
                self.click_element(element, part);
            }
            ReplayAction::HoverSector { id } => {
                let element = self
                    .view
                    .sectors()
                    .element_of(*id)
                    .ok_or(OverlayError::UnknownSector(*id))?;
                self.pointer(element, PointerEvent::Enter);
            }
            ReplayAction::Zoom { factor, x, y } => {
                let camera = self.view.viewer().camera();
                let camera = camera.zoom_to_cursor(camera.zoom * factor, Point::new(*x, *y));
                self.view.viewer_mut().set_camera(camera);
                self.view.handle_event(ViewerEvent::ViewportChanged);
            }
            ReplayAction::Pan { dx, dy } => {
                let camera = self.view.viewer().camera().pan_by(*dx, *dy);
                self.view.viewer_mut().set_camera(camera);
                self.view.handle_event(ViewerEvent::ViewportChanged);
            }
            ReplayAction::AddMarker { work_log } => self.view.add_marker(work_log.clone())?,
            ReplayAction::UpdateMarker { work_log } => self.view.update_marker(work_log.clone())?,
            ReplayAction::RemoveMarker { id } => self.view.remove_marker(*id)?,
            ReplayAction::DisplaySector { sector } => self.view.display_sector(sector.clone())?,
            ReplayAction::RemoveSector { id } => self.view.remove_sector(*id)?,
            ReplayAction::ClearAll => self.view.clear(),
        }
        Ok(())
    }

    /// Press and release on an element, quickly enough to count as a click.
    fn click_element(&mut self, element: ElementId, part: ElementPart) {
        let position = self.element_screen_position(element);
        let at = self.tick(SCRIPTED_CLICK_MS);
        self.pointer(element, PointerEvent::Press { position, at, part });
        let at = self.tick(SCRIPTED_CLICK_MS);
        self.pointer(element, PointerEvent::Release { position, at, part });
    }

    fn pointer(&mut self, element: ElementId, event: PointerEvent) {
        let Some(tracker) = self.view.viewer().tracker_for(element) else {
            log::warn!("Element {:?} has no pointer tracker", element);
            return;
        };
        self.view.handle_event(ViewerEvent::Pointer { tracker, event });
    }

    fn element_screen_position(&self, element: ElementId) -> Point {
        let viewer = self.view.viewer();
        viewer
            .element(element)
            .and_then(|record| record.placement)
            .map(|placement| viewer.camera().viewport_to_screen(placement.location()))
            .unwrap_or(Point::ORIGIN)
    }

    /// Advance the scripted clock.
    fn tick(&mut self, ms: u64) -> Instant {
        self.clock += Duration::from_millis(ms);
        self.clock
    }
}

/// Run a whole script and collect every event.
pub fn run(script: &ReplayScript, config: &OverlayConfig) -> Vec<OverlayEvent> {
    let mut replay = Replay::new(script, config);
    script
        .actions
        .iter()
        .flat_map(|action| replay.step(action))
        .collect()
}
