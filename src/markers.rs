//! Work-log markers on the floor plan.
//!
//! [`MarkerOverlays`] owns one overlay per displayed work log. Each overlay
//! gets its own pointer tracker, so hit-testing is done by the viewer at
//! element level rather than by distance math here. A confirmed click queues
//! [`OverlayEvent::MarkerClicked`] with the full work log.

use std::collections::{BTreeMap, HashMap};

use siteplan_viewer::{
    Color, Element, ElementId, ElementKind, ElementPart, Placement, Point, PointerEvent, Style,
    TrackerId, Viewer,
};

use crate::config::{AppearanceConfig, OverlayConfig};
use crate::constants::HOVER_Z_INDEX;
use crate::coords;
use crate::error::OverlayError;
use crate::event::OverlayEvent;
use crate::model::{MarkerId, WorkLog};
use crate::pointer::{ClickThresholds, Gesture, PointerTracker};

/// Resting z-index of markers, above sector overlays.
const MARKER_Z_INDEX: i32 = 10;

/// Bookkeeping for one displayed marker.
#[derive(Debug)]
struct MarkerEntry {
    element: ElementId,
    tracker: PointerTracker,
    work_log: WorkLog,
    viewport: Point,
}

/// Marker overlay manager.
#[derive(Debug)]
pub struct MarkerOverlays {
    markers: BTreeMap<MarkerId, MarkerEntry>,
    trackers: HashMap<TrackerId, MarkerId>,
    thresholds: ClickThresholds,
    appearance: AppearanceConfig,
    events: Vec<OverlayEvent>,
}

impl MarkerOverlays {
    pub fn new(config: &OverlayConfig) -> Self {
        Self {
            markers: BTreeMap::new(),
            trackers: HashMap::new(),
            thresholds: ClickThresholds::from(&config.interaction),
            appearance: config.appearance,
            events: Vec::new(),
        }
    }

    /// Place a marker for a work log.
    ///
    /// Fails with [`OverlayError::ImageNotLoaded`] before any image is shown.
    /// Adding an id that is already displayed replaces the old marker.
    pub fn add_marker<V: Viewer + ?Sized>(
        &mut self,
        viewer: &mut V,
        work_log: WorkLog,
    ) -> Result<(), OverlayError> {
        if viewer.content_size().is_none() {
            log::warn!("Cannot add marker {}: no image loaded", work_log.id);
            return Err(OverlayError::ImageNotLoaded);
        }

        if self.markers.contains_key(&work_log.id) {
            log::debug!("Marker {} already shown, replacing it", work_log.id);
            self.remove_marker(viewer, work_log.id)?;
        }

        let viewport = coords::image_to_viewport(viewer, work_log.position());
        let element = viewer.add_overlay(
            self.marker_element(&work_log, false),
            Placement::centered(viewport),
        )?;

        let tracker = match viewer.track_pointer(element) {
            Ok(tracker) => tracker,
            Err(e) => {
                log::error!("Failed to track marker {}: {}", work_log.id, e);
                if let Err(e) = viewer.remove_overlay(element) {
                    log::warn!("Failed to remove untracked marker overlay: {}", e);
                }
                return Err(e.into());
            }
        };

        log::debug!(
            "Marker {} added at ({:.4}, {:.4})",
            work_log.id,
            work_log.x_coord,
            work_log.y_coord
        );
        self.trackers.insert(tracker, work_log.id);
        self.markers.insert(
            work_log.id,
            MarkerEntry {
                element,
                tracker: PointerTracker::new(tracker),
                work_log,
                viewport,
            },
        );
        Ok(())
    }

    /// Refresh a marker after its work log changed.
    ///
    /// The style is always refreshed; the overlay is only moved when the
    /// normalized coordinates actually differ.
    pub fn update_marker<V: Viewer + ?Sized>(
        &mut self,
        viewer: &mut V,
        work_log: WorkLog,
    ) -> Result<(), OverlayError> {
        let Some(entry) = self.markers.get(&work_log.id) else {
            log::warn!("Cannot update unknown marker {}", work_log.id);
            return Err(OverlayError::UnknownMarker(work_log.id));
        };

        let element = entry.element;
        let moved = !entry.work_log.position().approx_eq(&work_log.position());
        let hovered = entry.tracker.is_hovered();

        viewer.update_element(element, self.marker_element(&work_log, hovered))?;

        let viewport = if moved {
            let viewport = coords::image_to_viewport(viewer, work_log.position());
            viewer.update_overlay(element, Placement::centered(viewport))?;
            log::debug!("Marker {} moved", work_log.id);
            Some(viewport)
        } else {
            None
        };

        if let Some(entry) = self.markers.get_mut(&work_log.id) {
            if let Some(viewport) = viewport {
                entry.viewport = viewport;
            }
            entry.work_log = work_log;
        }
        Ok(())
    }

    /// Remove a single marker. Unknown ids are reported, not fatal.
    pub fn remove_marker<V: Viewer + ?Sized>(
        &mut self,
        viewer: &mut V,
        id: MarkerId,
    ) -> Result<(), OverlayError> {
        let Some(entry) = self.markers.remove(&id) else {
            log::warn!("Cannot remove unknown marker {}", id);
            return Err(OverlayError::UnknownMarker(id));
        };
        self.trackers.remove(&entry.tracker.id());
        teardown(viewer, id, &entry);
        log::debug!("Marker {} removed", id);
        Ok(())
    }

    /// Remove every marker. Safe to call repeatedly.
    pub fn clear_all_markers<V: Viewer + ?Sized>(&mut self, viewer: &mut V) {
        let count = self.markers.len();
        for (id, entry) in std::mem::take(&mut self.markers) {
            teardown(viewer, id, &entry);
        }
        self.trackers.clear();
        if count > 0 {
            log::debug!("Cleared {} markers", count);
        }
    }

    /// Whether a pointer tracker belongs to one of these markers.
    pub fn owns_tracker(&self, tracker: TrackerId) -> bool {
        self.trackers.contains_key(&tracker)
    }

    /// Handle pointer activity on a marker. Returns false if the tracker is
    /// not one of ours.
    pub fn handle_pointer<V: Viewer + ?Sized>(
        &mut self,
        viewer: &mut V,
        tracker: TrackerId,
        event: PointerEvent,
    ) -> bool {
        let Some(id) = self.trackers.get(&tracker).copied() else {
            return false;
        };
        let Some(entry) = self.markers.get_mut(&id) else {
            return false;
        };

        match entry.tracker.handle(event, &self.thresholds) {
            Gesture::Enter | Gesture::Leave => {
                let style = marker_style(&entry.work_log, entry.tracker.is_hovered(), &self.appearance);
                if let Err(e) = viewer.restyle(entry.element, style) {
                    log::warn!("Failed to restyle marker {}: {}", id, e);
                }
            }
            Gesture::Click(ElementPart::Body) => {
                log::debug!("Marker {} clicked", id);
                self.events.push(OverlayEvent::MarkerClicked {
                    work_log: entry.work_log.clone(),
                });
            }
            Gesture::Click(_) | Gesture::Drag | Gesture::None => {}
        }
        true
    }

    pub fn get(&self, id: MarkerId) -> Option<&WorkLog> {
        self.markers.get(&id).map(|entry| &entry.work_log)
    }

    /// Viewer element showing a marker.
    pub fn element_of(&self, id: MarkerId) -> Option<ElementId> {
        self.markers.get(&id).map(|entry| entry.element)
    }

    /// Viewport position the marker was last placed at.
    pub fn viewport_position(&self, id: MarkerId) -> Option<Point> {
        self.markers.get(&id).map(|entry| entry.viewport)
    }

    pub fn ids(&self) -> impl Iterator<Item = MarkerId> + '_ {
        self.markers.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Drain queued events.
    pub fn take_events(&mut self) -> Vec<OverlayEvent> {
        std::mem::take(&mut self.events)
    }

    fn marker_element(&self, work_log: &WorkLog, hovered: bool) -> Element {
        Element::new(
            ElementKind::MarkerPin {
                diameter_px: self.appearance.marker_diameter_px,
            },
            marker_style(work_log, hovered, &self.appearance),
        )
        .with_title(work_log.tooltip())
    }
}

/// Marker style; hover only changes presentation.
fn marker_style(work_log: &WorkLog, hovered: bool, appearance: &AppearanceConfig) -> Style {
    Style {
        fill: work_log.work_type.color(),
        border: Color::WHITE,
        border_width_px: 2.0,
        scale: if hovered {
            appearance.marker_hover_scale
        } else {
            1.0
        },
        shadow: hovered,
        z_index: if hovered { HOVER_Z_INDEX } else { MARKER_Z_INDEX },
        delete_button_visible: false,
    }
}

/// Release the tracker, then remove the overlay. Errors are logged and
/// swallowed so one broken marker cannot block the rest.
fn teardown<V: Viewer + ?Sized>(viewer: &mut V, id: MarkerId, entry: &MarkerEntry) {
    if let Err(e) = viewer.release_tracker(entry.tracker.id()) {
        log::warn!("Failed to release tracker of marker {}: {}", id, e);
    }
    if let Err(e) = viewer.remove_overlay(entry.element) {
        log::warn!("Failed to remove overlay of marker {}: {}", id, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::WorkType;
    use siteplan_viewer::{MemoryViewer, Size};
    use std::time::Duration;
    use web_time::Instant;

    fn setup() -> (MemoryViewer, MarkerOverlays) {
        (
            MemoryViewer::with_image(Size::new(2000.0, 1000.0)),
            MarkerOverlays::new(&OverlayConfig::default()),
        )
    }

    fn close_to(a: Point, b: Point) -> bool {
        a.distance_to(b) < 1e-9
    }

    fn log(id: MarkerId, x: f64, y: f64) -> WorkLog {
        WorkLog::new(id, x, y, WorkType::Installation).with_worker("Ivo")
    }

    fn click(viewer: &mut MemoryViewer, markers: &mut MarkerOverlays, id: MarkerId, hold_ms: u64, travel: f64) {
        let tracker = viewer
            .tracker_for(markers.element_of(id).unwrap())
            .unwrap();
        let t0 = Instant::now();
        markers.handle_pointer(
            viewer,
            tracker,
            PointerEvent::Press {
                position: Point::new(100.0, 100.0),
                at: t0,
                part: ElementPart::Body,
            },
        );
        markers.handle_pointer(
            viewer,
            tracker,
            PointerEvent::Release {
                position: Point::new(100.0 + travel, 100.0),
                at: t0 + Duration::from_millis(hold_ms),
                part: ElementPart::Body,
            },
        );
    }

    #[test]
    fn test_add_without_image_fails() {
        let mut viewer = MemoryViewer::new();
        let mut markers = MarkerOverlays::new(&OverlayConfig::default());
        let result = markers.add_marker(&mut viewer, log(1, 0.5, 0.5));
        assert!(matches!(result, Err(OverlayError::ImageNotLoaded)));
        assert_eq!(viewer.overlay_count(), 0);
        assert!(markers.is_empty());
    }

    #[test]
    fn test_add_places_overlay_and_tracker() {
        let (mut viewer, mut markers) = setup();
        markers.add_marker(&mut viewer, log(1, 0.5, 0.5)).unwrap();

        let element = markers.element_of(1).unwrap();
        let record = viewer.element(element).unwrap();
        let Some(Placement::At { location, anchor }) = record.placement else {
            panic!("expected a pinned placement");
        };
        assert_eq!(anchor, siteplan_viewer::Anchor::Center);
        assert!(close_to(location, Point::new(0.5, 0.25)));
        assert_eq!(record.element.style.fill, WorkType::Installation.color());
        assert!(viewer.tracker_for(element).is_some());
    }

    #[test]
    fn test_update_with_same_coordinates_does_not_move() {
        let (mut viewer, mut markers) = setup();
        markers.add_marker(&mut viewer, log(1, 0.3, 0.4)).unwrap();

        let mut changed = log(1, 0.3, 0.4);
        changed.work_type = WorkType::Inspection;
        markers.update_marker(&mut viewer, changed).unwrap();

        assert_eq!(viewer.stats().overlay_updates, 0);
        let record = viewer.element(markers.element_of(1).unwrap()).unwrap();
        assert_eq!(record.element.style.fill, WorkType::Inspection.color());
    }

    #[test]
    fn test_update_with_new_coordinates_moves() {
        let (mut viewer, mut markers) = setup();
        markers.add_marker(&mut viewer, log(1, 0.3, 0.4)).unwrap();
        markers.update_marker(&mut viewer, log(1, 0.6, 0.4)).unwrap();
        assert_eq!(viewer.stats().overlay_updates, 1);
        assert!(close_to(markers.viewport_position(1).unwrap(), Point::new(0.6, 0.2)));
    }

    #[test]
    fn test_update_unknown_marker() {
        let (mut viewer, mut markers) = setup();
        assert!(matches!(
            markers.update_marker(&mut viewer, log(9, 0.1, 0.1)),
            Err(OverlayError::UnknownMarker(9))
        ));
    }

    #[test]
    fn test_remove_releases_tracker_first() {
        let (mut viewer, mut markers) = setup();
        markers.add_marker(&mut viewer, log(1, 0.3, 0.4)).unwrap();
        markers.remove_marker(&mut viewer, 1).unwrap();
        assert_eq!(viewer.overlay_count(), 0);
        assert_eq!(viewer.tracker_count(), 0);
        assert_eq!(viewer.leaked_trackers(), 0);
        assert!(matches!(
            markers.remove_marker(&mut viewer, 1),
            Err(OverlayError::UnknownMarker(1))
        ));
    }

    #[test]
    fn test_clear_all_twice() {
        let (mut viewer, mut markers) = setup();
        for id in 1..=3 {
            markers.add_marker(&mut viewer, log(id, 0.1 * id as f64, 0.2)).unwrap();
        }
        markers.clear_all_markers(&mut viewer);
        assert!(markers.is_empty());
        markers.clear_all_markers(&mut viewer);
        assert!(markers.is_empty());
        assert_eq!(viewer.overlay_count(), 0);
        assert_eq!(viewer.tracker_count(), 0);
    }

    #[test]
    fn test_clear_continues_past_broken_overlay() {
        let (mut viewer, mut markers) = setup();
        for id in 1..=3 {
            markers.add_marker(&mut viewer, log(id, 0.1 * id as f64, 0.2)).unwrap();
        }
        viewer.fail_removal_of(markers.element_of(2).unwrap());
        markers.clear_all_markers(&mut viewer);
        assert!(markers.is_empty());
        assert_eq!(viewer.overlay_count(), 1);
    }

    #[test]
    fn test_click_emits_event() {
        let (mut viewer, mut markers) = setup();
        markers.add_marker(&mut viewer, log(5, 0.3, 0.4)).unwrap();
        click(&mut viewer, &mut markers, 5, 100, 2.0);
        let events = markers.take_events();
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], OverlayEvent::MarkerClicked { work_log } if work_log.id == 5));
    }

    #[test]
    fn test_drag_does_not_emit_click() {
        let (mut viewer, mut markers) = setup();
        markers.add_marker(&mut viewer, log(5, 0.3, 0.4)).unwrap();
        click(&mut viewer, &mut markers, 5, 100, 25.0);
        click(&mut viewer, &mut markers, 5, 800, 0.0);
        assert!(markers.take_events().is_empty());
    }

    #[test]
    fn test_hover_restyles_without_events() {
        let (mut viewer, mut markers) = setup();
        markers.add_marker(&mut viewer, log(5, 0.3, 0.4)).unwrap();
        let element = markers.element_of(5).unwrap();
        let tracker = viewer.tracker_for(element).unwrap();

        assert!(markers.handle_pointer(&mut viewer, tracker, PointerEvent::Enter));
        let style = &viewer.element(element).unwrap().element.style;
        assert!(style.shadow);
        assert_eq!(style.z_index, HOVER_Z_INDEX);

        markers.handle_pointer(&mut viewer, tracker, PointerEvent::Leave);
        let style = &viewer.element(element).unwrap().element.style;
        assert_eq!(style.scale, 1.0);
        assert!(markers.take_events().is_empty());
    }

    #[test]
    fn test_foreign_tracker_not_consumed() {
        let (mut viewer, mut markers) = setup();
        assert!(!markers.handle_pointer(&mut viewer, TrackerId(999), PointerEvent::Enter));
    }
}
