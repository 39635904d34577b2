//! Rendering of stored sectors.
//!
//! Rectangles and polygons are placed as viewport-sized areas and follow
//! zoom on their own. Circles (and sectors missing their shape data) have a
//! fixed pixel diameter and are recomputed by
//! [`SectorOverlays::refresh_for_zoom`].

use siteplan_viewer::{
    Element, ElementKind, ElementPart, Placement, PointerEvent, Rect, Style, TrackerId, Viewer,
};

use super::{SectorEntry, SectorOverlays};
use crate::constants::{HOVER_Z_INDEX, SECTOR_FILL_ALPHA};
use crate::coords::{self, Axis, NormalizedCoord};
use crate::error::OverlayError;
use crate::event::OverlayEvent;
use crate::geometry;
use crate::model::{CriticalSector, SectorId, SectorType};
use crate::pointer::{Gesture, PointerTracker};

/// Resting z-index of sectors, below markers.
const SECTOR_Z_INDEX: i32 = 1;

impl SectorOverlays {
    /// Show a stored sector.
    ///
    /// Displaying an id that is already shown replaces it.
    pub fn display_sector<V: Viewer + ?Sized>(
        &mut self,
        viewer: &mut V,
        sector: CriticalSector,
    ) -> Result<(), OverlayError> {
        if viewer.content_size().is_none() {
            log::warn!("Cannot display sector {}: no image loaded", sector.id);
            return Err(OverlayError::ImageNotLoaded);
        }
        check_sector(&sector)?;

        if self.sectors.contains_key(&sector.id) {
            log::debug!("Sector {} already shown, replacing it", sector.id);
            self.remove_sector(viewer, sector.id)?;
        }

        let (kind, placement) = sector_shape(viewer, &sector);
        let fixed_size = matches!(kind, ElementKind::SectorCircle { .. });
        let element = self.sector_element(&sector, kind, false);
        let id = viewer.add_overlay(element, placement)?;

        let tracker = match viewer.track_pointer(id) {
            Ok(tracker) => tracker,
            Err(e) => {
                log::error!("Failed to track sector {}: {}", sector.id, e);
                if let Err(e) = viewer.remove_overlay(id) {
                    log::warn!("Failed to remove untracked sector overlay: {}", e);
                }
                return Err(e.into());
            }
        };

        log::debug!("Sector {} '{}' displayed", sector.id, sector.sector_name);
        self.trackers.insert(tracker, sector.id);
        self.sectors.insert(
            sector.id,
            SectorEntry {
                element: id,
                tracker: PointerTracker::new(tracker),
                sector,
                fixed_size,
            },
        );
        Ok(())
    }

    /// Remove one displayed sector.
    pub fn remove_sector<V: Viewer + ?Sized>(
        &mut self,
        viewer: &mut V,
        id: SectorId,
    ) -> Result<(), OverlayError> {
        let Some(entry) = self.sectors.remove(&id) else {
            log::warn!("Cannot remove unknown sector {}", id);
            return Err(OverlayError::UnknownSector(id));
        };
        self.trackers.remove(&entry.tracker.id());
        teardown(viewer, id, &entry);
        log::debug!("Sector {} removed", id);
        Ok(())
    }

    /// Remove every displayed sector. Safe to call repeatedly.
    pub fn clear_all_sectors<V: Viewer + ?Sized>(&mut self, viewer: &mut V) {
        let count = self.sectors.len();
        for (id, entry) in std::mem::take(&mut self.sectors) {
            teardown(viewer, id, &entry);
        }
        self.trackers.clear();
        if count > 0 {
            log::debug!("Cleared {} sectors", count);
        }
    }

    /// Recompute the pixel size of fixed-size sectors after a zoom step.
    pub fn refresh_for_zoom<V: Viewer + ?Sized>(&mut self, viewer: &mut V) {
        if viewer.content_size().is_none() {
            return;
        }
        for (id, entry) in &self.sectors {
            if !entry.fixed_size {
                continue;
            }
            let (kind, _) = sector_shape(viewer, &entry.sector);
            let element = self.sector_element(&entry.sector, kind, entry.tracker.is_hovered());
            if let Err(e) = viewer.update_element(entry.element, element) {
                log::warn!("Failed to resize sector {}: {}", id, e);
            }
        }
    }

    /// Change whether the user may delete sectors and update the shown
    /// delete buttons.
    pub fn set_can_manage<V: Viewer + ?Sized>(&mut self, viewer: &mut V, can_manage: bool) {
        if self.can_manage == can_manage {
            return;
        }
        self.can_manage = can_manage;
        for (id, entry) in &self.sectors {
            let (kind, _) = sector_shape(viewer, &entry.sector);
            let element = self.sector_element(&entry.sector, kind, entry.tracker.is_hovered());
            if let Err(e) = viewer.update_element(entry.element, element) {
                log::warn!("Failed to update sector {}: {}", id, e);
            }
        }
    }

    /// Handle pointer activity on a sector. Returns false if the tracker is
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
        let Some(entry) = self.sectors.get_mut(&id) else {
            return false;
        };

        match entry.tracker.handle(event, &self.thresholds) {
            Gesture::Enter | Gesture::Leave => {
                let style = sector_style(&entry.sector, entry.tracker.is_hovered(), self.can_manage);
                if let Err(e) = viewer.restyle(entry.element, style) {
                    log::warn!("Failed to restyle sector {}: {}", id, e);
                }
            }
            Gesture::Click(ElementPart::DeleteButton) if self.can_manage => {
                log::debug!("Delete requested for sector {}", id);
                self.events.push(OverlayEvent::SectorDeleteRequested {
                    sector_id: id,
                    sector_name: entry.sector.sector_name.clone(),
                });
            }
            Gesture::Click(ElementPart::Body) => {
                log::debug!("Sector {} clicked", id);
                self.events.push(OverlayEvent::SectorClicked {
                    sector: entry.sector.clone(),
                });
            }
            Gesture::Click(_) | Gesture::Drag | Gesture::None => {}
        }
        true
    }

    fn sector_element(&self, sector: &CriticalSector, kind: ElementKind, hovered: bool) -> Element {
        Element::new(kind, sector_style(sector, hovered, self.can_manage))
            .with_title(sector.tooltip())
            .with_delete_button(self.can_manage)
    }
}

/// Reject sectors whose numbers cannot be placed at all.
fn check_sector(sector: &CriticalSector) -> Result<(), OverlayError> {
    if !sector.x_coord.is_finite() || !sector.y_coord.is_finite() {
        return Err(OverlayError::invalid_sector(sector.id, "center is not a finite number"));
    }
    if !sector.radius.is_finite() || sector.radius < 0.0 {
        return Err(OverlayError::invalid_sector(
            sector.id,
            format!("radius {} is not usable", sector.radius),
        ));
    }
    Ok(())
}

/// Visual kind and placement of a sector at the viewer's current transform.
fn sector_shape<V: Viewer + ?Sized>(viewer: &V, sector: &CriticalSector) -> (ElementKind, Placement) {
    match sector.sector_type {
        SectorType::Rectangle => {
            if let Some(bounds) = sector.rect_bounds() {
                let rect = area_in_viewport(viewer, bounds);
                return (ElementKind::SectorRect, Placement::Area { rect });
            }
            log::debug!("Rectangle sector {} has no extents, drawing a circle", sector.id);
        }
        SectorType::Polygon => {
            let vertices = sector.vertices();
            if let Some(pbox) = geometry::points_to_percentage_box(&vertices)
                .filter(|_| vertices.len() >= crate::constants::MIN_POLYGON_POINTS)
            {
                let bounds = Rect::new(pbox.min_x, pbox.min_y, pbox.width, pbox.height);
                let rect = area_in_viewport(viewer, bounds);
                return (
                    ElementKind::SectorPolygon {
                        clip: pbox.relative_points,
                    },
                    Placement::Area { rect },
                );
            }
            log::debug!("Polygon sector {} has too few points, drawing a circle", sector.id);
        }
        SectorType::Circle => {}
    }

    let radius_px = coords::image_distance_to_pixels(viewer, sector.radius, Axis::X);
    let center = coords::image_to_viewport(viewer, sector.center());
    (
        ElementKind::SectorCircle {
            diameter_px: radius_px * 2.0,
        },
        Placement::centered(center),
    )
}

/// Normalized bounds to a viewport rectangle, converting each extent along
/// its own axis.
fn area_in_viewport<V: Viewer + ?Sized>(viewer: &V, bounds: Rect) -> Rect {
    let origin = coords::image_to_viewport(viewer, NormalizedCoord::new(bounds.x, bounds.y));
    Rect::new(
        origin.x,
        origin.y,
        coords::image_distance_to_viewport(viewer, bounds.width, Axis::X),
        coords::image_distance_to_viewport(viewer, bounds.height, Axis::Y),
    )
}

fn sector_style(sector: &CriticalSector, hovered: bool, can_manage: bool) -> Style {
    let color = sector.priority.tier().color();
    Style {
        fill: color.with_alpha(SECTOR_FILL_ALPHA),
        border: color,
        border_width_px: if hovered { 3.0 } else { 2.0 },
        scale: 1.0,
        shadow: hovered,
        z_index: if hovered { HOVER_Z_INDEX - 1 } else { SECTOR_Z_INDEX },
        delete_button_visible: hovered && can_manage,
    }
}

fn teardown<V: Viewer + ?Sized>(viewer: &mut V, id: SectorId, entry: &SectorEntry) {
    if let Err(e) = viewer.release_tracker(entry.tracker.id()) {
        log::warn!("Failed to release tracker of sector {}: {}", id, e);
    }
    if let Err(e) = viewer.remove_overlay(entry.element) {
        log::warn!("Failed to remove overlay of sector {}: {}", id, e);
    }
}
