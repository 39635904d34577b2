//! One floor plan on screen: a viewer plus the marker and sector managers.
//!
//! [`FloorPlanView`] is the piece a host embeds. It owns the viewer, routes
//! the viewer's events to the manager that owns the affected element, and
//! collects the events both managers emit.

use siteplan_viewer::{Viewer, ViewerEvent};

use crate::config::OverlayConfig;
use crate::coords::NormalizedCoord;
use crate::error::OverlayError;
use crate::event::OverlayEvent;
use crate::markers::MarkerOverlays;
use crate::model::{CriticalSector, MarkerId, SectorId, SectorType, WorkLog};
use crate::sectors::SectorOverlays;

/// A viewer together with its overlay managers.
#[derive(Debug)]
pub struct FloorPlanView<V: Viewer> {
    viewer: V,
    markers: MarkerOverlays,
    sectors: SectorOverlays,
}

impl<V: Viewer> FloorPlanView<V> {
    pub fn new(viewer: V, config: &OverlayConfig, can_manage_sectors: bool) -> Self {
        Self {
            viewer,
            markers: MarkerOverlays::new(config),
            sectors: SectorOverlays::new(config, can_manage_sectors),
        }
    }

    pub fn viewer(&self) -> &V {
        &self.viewer
    }

    /// Mutable access for the host, e.g. to load another image.
    pub fn viewer_mut(&mut self) -> &mut V {
        &mut self.viewer
    }

    pub fn markers(&self) -> &MarkerOverlays {
        &self.markers
    }

    pub fn sectors(&self) -> &SectorOverlays {
        &self.sectors
    }

    // Markers

    pub fn add_marker(&mut self, work_log: WorkLog) -> Result<(), OverlayError> {
        self.markers.add_marker(&mut self.viewer, work_log)
    }

    pub fn update_marker(&mut self, work_log: WorkLog) -> Result<(), OverlayError> {
        self.markers.update_marker(&mut self.viewer, work_log)
    }

    pub fn remove_marker(&mut self, id: MarkerId) -> Result<(), OverlayError> {
        self.markers.remove_marker(&mut self.viewer, id)
    }

    pub fn clear_all_markers(&mut self) {
        self.markers.clear_all_markers(&mut self.viewer);
    }

    /// Replace all markers with the given work logs. Returns how many were
    /// shown; the rest are logged and skipped.
    pub fn show_work_logs(&mut self, work_logs: impl IntoIterator<Item = WorkLog>) -> usize {
        self.markers.clear_all_markers(&mut self.viewer);
        let mut shown = 0;
        for work_log in work_logs {
            let id = work_log.id;
            match self.markers.add_marker(&mut self.viewer, work_log) {
                Ok(()) => shown += 1,
                Err(e) => log::warn!("Skipping work log {}: {}", id, e),
            }
        }
        shown
    }

    // Sectors

    pub fn display_sector(&mut self, sector: CriticalSector) -> Result<(), OverlayError> {
        self.sectors.display_sector(&mut self.viewer, sector)
    }

    pub fn remove_sector(&mut self, id: SectorId) -> Result<(), OverlayError> {
        self.sectors.remove_sector(&mut self.viewer, id)
    }

    pub fn clear_all_sectors(&mut self) {
        self.sectors.clear_all_sectors(&mut self.viewer);
    }

    /// Replace all sectors. Returns how many were shown.
    pub fn show_sectors(&mut self, sectors: impl IntoIterator<Item = CriticalSector>) -> usize {
        self.sectors.clear_all_sectors(&mut self.viewer);
        let mut shown = 0;
        for sector in sectors {
            let id = sector.id;
            match self.sectors.display_sector(&mut self.viewer, sector) {
                Ok(()) => shown += 1,
                Err(e) => log::warn!("Skipping sector {}: {}", id, e),
            }
        }
        shown
    }

    pub fn set_can_manage_sectors(&mut self, can_manage: bool) {
        self.sectors.set_can_manage(&mut self.viewer, can_manage);
    }

    /// Displayed sectors containing a normalized coordinate.
    pub fn sectors_at(&self, coord: NormalizedCoord) -> Vec<&CriticalSector> {
        self.sectors.sectors().filter(|s| s.contains(coord)).collect()
    }

    // Drawing

    pub fn start_drawing(&mut self, mode: SectorType) -> Result<(), OverlayError> {
        self.sectors.start_drawing(&mut self.viewer, mode)
    }

    pub fn start_drawing_named(&mut self, mode: &str) -> Result<(), OverlayError> {
        self.sectors.start_drawing_named(&mut self.viewer, mode)
    }

    pub fn finish_polygon(&mut self) -> Result<(), OverlayError> {
        self.sectors.finish_polygon(&mut self.viewer)
    }

    pub fn undo_last_point(&mut self) -> Result<(), OverlayError> {
        self.sectors.undo_last_point(&mut self.viewer)
    }

    pub fn stop_drawing(&mut self) {
        self.sectors.stop_drawing(&mut self.viewer);
    }

    pub fn cancel_drawing(&mut self) {
        self.sectors.cancel_drawing(&mut self.viewer);
    }

    /// Route a viewer event. Returns whether any manager used it.
    pub fn handle_event(&mut self, event: ViewerEvent) -> bool {
        match event {
            ViewerEvent::Pointer { tracker, event } => {
                self.markers.handle_pointer(&mut self.viewer, tracker, event)
                    || self.sectors.handle_pointer(&mut self.viewer, tracker, event)
            }
            ViewerEvent::CanvasClick(click) => {
                self.sectors.handle_canvas_click(&mut self.viewer, click)
            }
            ViewerEvent::ViewportChanged => {
                self.sectors.refresh_for_zoom(&mut self.viewer);
                true
            }
        }
    }

    /// Drain the events of both managers, markers first.
    pub fn take_events(&mut self) -> Vec<OverlayEvent> {
        let mut events = self.markers.take_events();
        events.extend(self.sectors.take_events());
        events
    }

    /// Stop drawing and remove every overlay, e.g. before switching floors.
    pub fn clear(&mut self) {
        self.sectors.stop_drawing(&mut self.viewer);
        self.sectors.clear_all_sectors(&mut self.viewer);
        self.markers.clear_all_markers(&mut self.viewer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::WorkType;
    use siteplan_viewer::{CanvasClick, MemoryViewer, PointerEvent, Size};

    fn view() -> FloorPlanView<MemoryViewer> {
        FloorPlanView::new(
            MemoryViewer::with_image(Size::new(1000.0, 1000.0)),
            &OverlayConfig::default(),
            true,
        )
    }

    fn circle(id: SectorId, x: f64, y: f64) -> CriticalSector {
        serde_json::from_value(serde_json::json!({
            "id": id, "sector_name": "Shaft", "type": "circle",
            "x_coord": x, "y_coord": y, "radius": 0.05
        }))
        .unwrap()
    }

    #[test]
    fn test_pointer_events_reach_owner() {
        let mut view = view();
        view.add_marker(WorkLog::new(1, 0.5, 0.5, WorkType::Maintenance)).unwrap();
        view.display_sector(circle(7, 0.2, 0.2)).unwrap();

        let sector_element = view.sectors().element_of(7).unwrap();
        let tracker = view.viewer().tracker_for(sector_element).unwrap();
        assert!(view.handle_event(ViewerEvent::Pointer {
            tracker,
            event: PointerEvent::Enter
        }));
        assert!(view.viewer().element(sector_element).unwrap().element.style.shadow);
        let marker_element = view.markers().element_of(1).unwrap();
        assert!(!view.viewer().element(marker_element).unwrap().element.style.shadow);
    }

    #[test]
    fn test_canvas_clicks_ignored_when_not_drawing() {
        let mut view = view();
        assert!(!view.handle_event(ViewerEvent::CanvasClick(CanvasClick::at(10.0, 10.0))));
        view.start_drawing(SectorType::Rectangle).unwrap();
        assert!(view.handle_event(ViewerEvent::CanvasClick(CanvasClick::at(10.0, 10.0))));
    }

    #[test]
    fn test_show_replaces_previous_set() {
        let mut view = view();
        assert_eq!(view.show_sectors(vec![circle(1, 0.1, 0.1), circle(2, 0.9, 0.9)]), 2);
        assert_eq!(view.show_sectors(vec![circle(3, 0.5, 0.5)]), 1);
        assert_eq!(view.sectors().ids().collect::<Vec<_>>(), vec![3]);
        assert_eq!(view.viewer().overlay_count(), 1);
    }

    #[test]
    fn test_sectors_at() {
        let mut view = view();
        view.show_sectors(vec![circle(1, 0.1, 0.1), circle(2, 0.9, 0.9)]);
        let hits = view.sectors_at(NormalizedCoord::new(0.12, 0.1));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 1);
    }

    #[test]
    fn test_clear_stops_drawing() {
        let mut view = view();
        view.add_marker(WorkLog::new(1, 0.5, 0.5, WorkType::CableLaying)).unwrap();
        view.start_drawing(SectorType::Polygon).unwrap();
        view.handle_event(ViewerEvent::CanvasClick(CanvasClick::at(100.0, 100.0)));
        view.clear();
        assert!(!view.sectors().is_drawing());
        assert_eq!(view.viewer().elements().count(), 0);
        assert_eq!(view.viewer().click_handler_count(), 0);
    }
}
