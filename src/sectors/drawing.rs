//! Interactive sector drawing.
//!
//! A session starts with [`SectorOverlays::start_drawing`] and ends either
//! with a completed shape (queued as [`OverlayEvent::DraftCompleted`]) or
//! with [`SectorOverlays::stop_drawing`]. Every temporary visual remembers
//! how it was attached so teardown removes it through the matching path.

use siteplan_viewer::{
    CanvasClick, Color, Cursor, Element, ElementId, ElementKind, HandlerId, Placement, Point,
    Rect, Style, Viewer, ViewerError,
};

use super::SectorOverlays;
use crate::constants::{
    DRAW_FIRST_VERTEX_DIAMETER_PX, DRAW_HINT_POSITION_PX, HOVER_Z_INDEX, MIN_POLYGON_POINTS,
};
use crate::coords::{self, NormalizedCoord};
use crate::error::OverlayError;
use crate::event::OverlayEvent;
use crate::geometry;
use crate::model::{DraftBounds, SectorDraft, SectorType};

const DRAW_COLOR: Color = Color::rgb8(37, 99, 235);
const CLOSE_TARGET_COLOR: Color = Color::rgb8(22, 163, 74);

/// Where the drawing state machine is.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DrawingState {
    #[default]
    Idle,
    /// Waiting for the first corner (`None`) or the opposite one
    Rectangle { corner: Option<NormalizedCoord> },
    /// Vertices placed so far, in click order
    Polygon { points: Vec<NormalizedCoord> },
}

impl DrawingState {
    pub fn is_drawing(&self) -> bool {
        !matches!(self, DrawingState::Idle)
    }

    pub fn mode(&self) -> Option<SectorType> {
        match self {
            DrawingState::Idle => None,
            DrawingState::Rectangle { .. } => Some(SectorType::Rectangle),
            DrawingState::Polygon { .. } => Some(SectorType::Polygon),
        }
    }

    /// Points placed in the current session.
    pub fn point_count(&self) -> usize {
        match self {
            DrawingState::Idle => 0,
            DrawingState::Rectangle { corner } => usize::from(corner.is_some()),
            DrawingState::Polygon { points } => points.len(),
        }
    }
}

/// A temporary element and the path it must be removed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TempElement {
    /// Added to the overlay registry
    Registered(ElementId),
    /// Appended to the viewer container
    Detached(ElementId),
}

impl TempElement {
    fn remove<V: Viewer + ?Sized>(self, viewer: &mut V) {
        let result = match self {
            TempElement::Registered(id) => viewer.remove_overlay(id),
            TempElement::Detached(id) => viewer.detach_element(id),
        };
        if let Err(e) = result {
            log::warn!("Failed to remove drawing element {:?}: {}", self, e);
        }
    }
}

/// Everything a drawing session has put on the viewer.
#[derive(Debug, Default)]
pub(super) struct DrawingSession {
    state: DrawingState,
    handler: Option<HandlerId>,
    hint: Option<TempElement>,
    /// Visuals per placed point: its dot and the segment leading to it
    steps: Vec<Vec<TempElement>>,
    /// Visuals not tied to a point (the closing segment)
    extra: Vec<TempElement>,
}

impl DrawingSession {
    fn is_active(&self) -> bool {
        self.state.is_drawing()
            || self.handler.is_some()
            || self.hint.is_some()
            || !self.steps.is_empty()
            || !self.extra.is_empty()
    }

    fn element_count(&self) -> usize {
        self.steps.iter().map(Vec::len).sum::<usize>()
            + self.extra.len()
            + usize::from(self.hint.is_some())
    }
}

impl SectorOverlays {
    pub fn drawing_state(&self) -> &DrawingState {
        &self.session.state
    }

    pub fn is_drawing(&self) -> bool {
        self.session.state.is_drawing()
    }

    /// Temporary visuals currently on the viewer for the drawing session.
    pub fn drawing_element_count(&self) -> usize {
        self.session.element_count()
    }

    /// Begin drawing a new sector.
    ///
    /// Rejected without an image or for shapes that cannot be drawn. A
    /// session that is already running is stopped first.
    pub fn start_drawing<V: Viewer + ?Sized>(
        &mut self,
        viewer: &mut V,
        mode: SectorType,
    ) -> Result<(), OverlayError> {
        if viewer.content_size().is_none() {
            log::warn!("Cannot start drawing: no image loaded");
            return Err(OverlayError::ImageNotLoaded);
        }
        if !mode.is_drawable() {
            log::warn!("Cannot start drawing: '{}' is not a drawable shape", mode);
            return Err(OverlayError::InvalidDrawingMode(mode.to_string()));
        }

        if self.session.is_active() {
            log::debug!("Restarting drawing session");
            self.stop_drawing(viewer);
        }

        self.session.state = match mode {
            SectorType::Polygon => DrawingState::Polygon { points: Vec::new() },
            _ => DrawingState::Rectangle { corner: None },
        };
        if let Err(e) = self.install_session(viewer, mode) {
            return Err(self.abort_drawing(viewer, e.into()));
        }

        log::debug!("Drawing started: {}", mode);
        Ok(())
    }

    /// [`start_drawing`](Self::start_drawing) with the mode given by name,
    /// as it arrives from the host UI.
    pub fn start_drawing_named<V: Viewer + ?Sized>(
        &mut self,
        viewer: &mut V,
        mode: &str,
    ) -> Result<(), OverlayError> {
        let mode = mode.parse::<SectorType>().map_err(|e| {
            log::warn!("Cannot start drawing: {}", e);
            e
        })?;
        self.start_drawing(viewer, mode)
    }

    fn install_session<V: Viewer + ?Sized>(
        &mut self,
        viewer: &mut V,
        mode: SectorType,
    ) -> Result<(), ViewerError> {
        self.session.handler = Some(viewer.add_click_handler()?);
        viewer.set_cursor(Cursor::Crosshair);
        viewer.set_click_to_zoom(false);

        let (x, y) = DRAW_HINT_POSITION_PX;
        let hint = Element::new(
            ElementKind::Hint {
                text: hint_text(mode).to_string(),
            },
            hint_style(),
        );
        let id = viewer.append_element(hint, Point::new(x, y))?;
        self.session.hint = Some(TempElement::Detached(id));
        Ok(())
    }

    /// Feed a canvas click to the drawing session. Returns whether the
    /// click was used.
    ///
    /// Drags are ignored so the user can still pan while drawing. Viewer
    /// failures end the session and queue an alert.
    pub fn handle_canvas_click<V: Viewer + ?Sized>(
        &mut self,
        viewer: &mut V,
        click: CanvasClick,
    ) -> bool {
        if !self.session.state.is_drawing() {
            return false;
        }
        if !click.quick {
            log::trace!("Ignoring drag while drawing");
            return false;
        }

        match self.place_click(viewer, click.position) {
            Ok(()) | Err(OverlayError::NotEnoughPoints { .. }) => {}
            Err(e) => {
                self.abort_drawing(viewer, e);
            }
        }
        true
    }

    fn place_click<V: Viewer + ?Sized>(
        &mut self,
        viewer: &mut V,
        screen: Point,
    ) -> Result<(), OverlayError> {
        let coord = coords::screen_to_image(viewer, screen).clamped();

        match &self.session.state {
            DrawingState::Idle => Err(OverlayError::NotDrawing),
            DrawingState::Rectangle { corner: None } => {
                let dot = self.add_vertex(viewer, coord, true)?;
                self.session.steps.push(vec![dot]);
                self.session.state = DrawingState::Rectangle {
                    corner: Some(coord),
                };
                Ok(())
            }
            DrawingState::Rectangle {
                corner: Some(first),
            } => {
                let shape = geometry::rectangle_from_corners(first.as_point(), coord.as_point());
                self.complete(
                    viewer,
                    SectorDraft::Rectangle {
                        x_coord: shape.center_x,
                        y_coord: shape.center_y,
                        radius: shape.radius,
                        bounds: DraftBounds {
                            x: shape.x,
                            y: shape.y,
                            width: shape.width,
                            height: shape.height,
                        },
                    },
                );
                Ok(())
            }
            DrawingState::Polygon { points } => {
                if let Some(first) = points.first().copied() {
                    let first_screen = coords::image_to_screen(viewer, first);
                    if first_screen.distance_to(screen) <= self.polygon_close_px {
                        return self.close_polygon(viewer);
                    }
                }
                self.add_polygon_point(viewer, coord)
            }
        }
    }

    fn add_polygon_point<V: Viewer + ?Sized>(
        &mut self,
        viewer: &mut V,
        coord: NormalizedCoord,
    ) -> Result<(), OverlayError> {
        let DrawingState::Polygon { points } = &self.session.state else {
            return Err(OverlayError::NotDrawing);
        };
        let previous = points.last().copied();

        let dot = self.add_vertex(viewer, coord, previous.is_none())?;
        self.session.steps.push(vec![dot]);
        if let Some(previous) = previous {
            let segment = add_segment(viewer, previous, coord)?;
            if let Some(step) = self.session.steps.last_mut() {
                step.push(segment);
            }
        }

        if let DrawingState::Polygon { points } = &mut self.session.state {
            points.push(coord);
            log::trace!("Polygon point {} at ({:.4}, {:.4})", points.len(), coord.x, coord.y);
        }
        Ok(())
    }

    /// Close the polygon being drawn, e.g. from a "finish" button.
    ///
    /// With fewer than three points a [`OverlayEvent::DrawingRejected`] is
    /// queued and drawing continues.
    pub fn finish_polygon<V: Viewer + ?Sized>(&mut self, viewer: &mut V) -> Result<(), OverlayError> {
        if !matches!(self.session.state, DrawingState::Polygon { .. }) {
            return Err(OverlayError::NotDrawing);
        }
        match self.close_polygon(viewer) {
            Err(e @ OverlayError::NotEnoughPoints { .. }) => Err(e),
            Err(e) => Err(self.abort_drawing(viewer, e)),
            Ok(()) => Ok(()),
        }
    }

    fn close_polygon<V: Viewer + ?Sized>(&mut self, viewer: &mut V) -> Result<(), OverlayError> {
        let DrawingState::Polygon { points } = &self.session.state else {
            return Err(OverlayError::NotDrawing);
        };

        if points.len() < MIN_POLYGON_POINTS {
            let error = OverlayError::NotEnoughPoints {
                required: MIN_POLYGON_POINTS,
                found: points.len(),
            };
            log::debug!("Polygon close rejected: {}", error);
            self.events.push(OverlayEvent::DrawingRejected {
                reason: error.to_string(),
            });
            return Err(error);
        }

        let points = points.clone();
        if let (Some(first), Some(last)) = (points.first(), points.last()) {
            let segment = add_segment(viewer, *last, *first)?;
            self.session.extra.push(segment);
        }

        let vertices: Vec<Point> = points.iter().map(NormalizedCoord::as_point).collect();
        let center = geometry::polygon_centroid(&vertices);
        let radius = geometry::polygon_bounding_radius(&vertices, center);
        self.complete(
            viewer,
            SectorDraft::Polygon {
                x_coord: center.x,
                y_coord: center.y,
                radius,
                points,
            },
        );
        Ok(())
    }

    /// Take back the most recent point. Does nothing when no point is placed.
    pub fn undo_last_point<V: Viewer + ?Sized>(&mut self, viewer: &mut V) -> Result<(), OverlayError> {
        let removed = match &mut self.session.state {
            DrawingState::Idle => return Err(OverlayError::NotDrawing),
            DrawingState::Rectangle { corner } => corner.take().is_some(),
            DrawingState::Polygon { points } => points.pop().is_some(),
        };
        if removed {
            for element in self.session.steps.pop().unwrap_or_default() {
                element.remove(viewer);
            }
        }
        Ok(())
    }

    /// End the drawing session and remove everything it created.
    ///
    /// Safe to call in any state, also after a failed drawing step.
    pub fn stop_drawing<V: Viewer + ?Sized>(&mut self, viewer: &mut V) {
        let session = std::mem::take(&mut self.session);
        if !session.is_active() {
            return;
        }

        let DrawingSession {
            handler,
            hint,
            steps,
            extra,
            ..
        } = session;
        for element in steps.into_iter().flatten().chain(extra).chain(hint) {
            element.remove(viewer);
        }
        if let Some(handler) = handler {
            if let Err(e) = viewer.remove_click_handler(handler) {
                log::warn!("Failed to remove drawing click handler: {}", e);
            }
        }
        viewer.set_cursor(Cursor::Default);
        viewer.set_click_to_zoom(true);
        log::debug!("Drawing stopped");
    }

    /// Stop drawing at the user's request.
    pub fn cancel_drawing<V: Viewer + ?Sized>(&mut self, viewer: &mut V) {
        let was_drawing = self.session.state.is_drawing();
        self.stop_drawing(viewer);
        if was_drawing {
            self.events.push(OverlayEvent::DrawingCancelled);
        }
    }

    fn complete<V: Viewer + ?Sized>(&mut self, viewer: &mut V, draft: SectorDraft) {
        log::info!(
            "Sector draft completed: {} at ({:.4}, {:.4}), radius {:.4}",
            draft.sector_type(),
            draft.center().x,
            draft.center().y,
            draft.radius()
        );
        self.stop_drawing(viewer);
        self.events.push(OverlayEvent::DraftCompleted { draft });
    }

    /// Tear the session down after a runtime failure and ask the user to retry.
    fn abort_drawing<V: Viewer + ?Sized>(&mut self, viewer: &mut V, error: OverlayError) -> OverlayError {
        log::error!("Drawing failed: {}", error);
        self.stop_drawing(viewer);
        self.events.push(OverlayEvent::Alert {
            message: format!("Drawing the sector failed: {}. Please try again.", error),
        });
        error
    }

    fn add_vertex<V: Viewer + ?Sized>(
        &self,
        viewer: &mut V,
        coord: NormalizedCoord,
        first: bool,
    ) -> Result<TempElement, ViewerError> {
        let diameter_px = if first {
            DRAW_FIRST_VERTEX_DIAMETER_PX
        } else {
            self.appearance.vertex_diameter_px
        };
        let element = Element::new(
            ElementKind::DrawVertex { first, diameter_px },
            vertex_style(first),
        );
        let location = coords::image_to_viewport(viewer, coord);
        let id = viewer.add_overlay(element, Placement::centered(location))?;
        Ok(TempElement::Registered(id))
    }
}

fn add_segment<V: Viewer + ?Sized>(
    viewer: &mut V,
    from: NormalizedCoord,
    to: NormalizedCoord,
) -> Result<TempElement, ViewerError> {
    let from = coords::image_to_viewport(viewer, from);
    let to = coords::image_to_viewport(viewer, to);
    let rect = Rect::new(
        from.x.min(to.x),
        from.y.min(to.y),
        (from.x - to.x).abs(),
        (from.y - to.y).abs(),
    );
    let element = Element::new(
        ElementKind::DrawSegment { from, to },
        Style {
            border: DRAW_COLOR,
            border_width_px: 2.0,
            z_index: HOVER_Z_INDEX,
            ..Style::default()
        },
    );
    let id = viewer.add_overlay(element, Placement::Area { rect })?;
    Ok(TempElement::Registered(id))
}

fn vertex_style(first: bool) -> Style {
    Style {
        fill: if first { CLOSE_TARGET_COLOR } else { DRAW_COLOR },
        border: Color::WHITE,
        border_width_px: 2.0,
        z_index: HOVER_Z_INDEX + 1,
        ..Style::default()
    }
}

fn hint_style() -> Style {
    Style {
        fill: Color::BLACK.with_alpha(0.75),
        border: Color::TRANSPARENT,
        border_width_px: 0.0,
        z_index: HOVER_Z_INDEX + 2,
        ..Style::default()
    }
}

fn hint_text(mode: SectorType) -> &'static str {
    match mode {
        SectorType::Polygon => {
            "Click to add points. Click the first point again to close the polygon."
        }
        _ => "Click two opposite corners of the sector.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OverlayConfig;
    use siteplan_viewer::{MemoryViewer, Size};

    // 1000x1000 image with the default camera: screen px = normalized * 1000
    fn setup() -> (MemoryViewer, SectorOverlays) {
        (
            MemoryViewer::with_image(Size::new(1000.0, 1000.0)),
            SectorOverlays::new(&OverlayConfig::default(), true),
        )
    }

    fn click(viewer: &mut MemoryViewer, sectors: &mut SectorOverlays, x: f64, y: f64) -> bool {
        sectors.handle_canvas_click(viewer, CanvasClick::at(x, y))
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_start_requires_image() {
        let mut viewer = MemoryViewer::new();
        let mut sectors = SectorOverlays::new(&OverlayConfig::default(), true);
        assert!(matches!(
            sectors.start_drawing(&mut viewer, SectorType::Rectangle),
            Err(OverlayError::ImageNotLoaded)
        ));
        assert!(!sectors.is_drawing());
        assert_eq!(viewer.click_handler_count(), 0);
    }

    #[test]
    fn test_start_rejects_circle_and_unknown_modes() {
        let (mut viewer, mut sectors) = setup();
        assert!(matches!(
            sectors.start_drawing(&mut viewer, SectorType::Circle),
            Err(OverlayError::InvalidDrawingMode(_))
        ));
        assert!(matches!(
            sectors.start_drawing_named(&mut viewer, "triangle"),
            Err(OverlayError::InvalidDrawingMode(_))
        ));
        assert!(!sectors.is_drawing());
    }

    #[test]
    fn test_start_prepares_viewer() {
        let (mut viewer, mut sectors) = setup();
        sectors.start_drawing_named(&mut viewer, "polygon").unwrap();
        assert_eq!(sectors.drawing_state().mode(), Some(SectorType::Polygon));
        assert_eq!(viewer.cursor(), Cursor::Crosshair);
        assert!(!viewer.click_to_zoom());
        assert_eq!(viewer.click_handler_count(), 1);
        assert_eq!(viewer.appended_count(), 1);
    }

    #[test]
    fn test_rectangle_flow() {
        let (mut viewer, mut sectors) = setup();
        sectors.start_drawing(&mut viewer, SectorType::Rectangle).unwrap();

        assert!(click(&mut viewer, &mut sectors, 200.0, 200.0));
        assert_eq!(sectors.drawing_state().point_count(), 1);
        assert_eq!(viewer.overlay_count(), 1);

        assert!(click(&mut viewer, &mut sectors, 600.0, 500.0));
        assert!(!sectors.is_drawing());

        let events = sectors.take_events();
        assert_eq!(events.len(), 1);
        let OverlayEvent::DraftCompleted {
            draft:
                SectorDraft::Rectangle {
                    x_coord,
                    y_coord,
                    radius,
                    bounds,
                },
        } = &events[0]
        else {
            panic!("expected rectangle draft, got {:?}", events[0]);
        };
        assert!(approx(bounds.x, 0.2) && approx(bounds.y, 0.2));
        assert!(approx(bounds.width, 0.4) && approx(bounds.height, 0.3));
        assert!(approx(*x_coord, 0.4) && approx(*y_coord, 0.35));
        assert!(approx(*radius, 0.2));

        assert_eq!(viewer.overlay_count(), 0);
        assert_eq!(viewer.appended_count(), 0);
        assert_eq!(viewer.click_handler_count(), 0);
        assert_eq!(viewer.cursor(), Cursor::Default);
        assert!(viewer.click_to_zoom());
    }

    #[test]
    fn test_clicks_outside_image_are_clamped() {
        let (mut viewer, mut sectors) = setup();
        sectors.start_drawing(&mut viewer, SectorType::Rectangle).unwrap();
        click(&mut viewer, &mut sectors, -50.0, 500.0);
        click(&mut viewer, &mut sectors, 1200.0, 900.0);
        let events = sectors.take_events();
        let OverlayEvent::DraftCompleted {
            draft: SectorDraft::Rectangle { bounds, .. },
        } = &events[0]
        else {
            panic!("expected rectangle draft");
        };
        assert!(approx(bounds.x, 0.0));
        assert!(approx(bounds.width, 1.0));
    }

    #[test]
    fn test_drag_is_not_a_point() {
        let (mut viewer, mut sectors) = setup();
        sectors.start_drawing(&mut viewer, SectorType::Polygon).unwrap();
        let drag = CanvasClick {
            position: Point::new(100.0, 100.0),
            quick: false,
        };
        assert!(!sectors.handle_canvas_click(&mut viewer, drag));
        assert_eq!(sectors.drawing_state().point_count(), 0);
    }

    #[test]
    fn test_polygon_segments_and_first_vertex() {
        let (mut viewer, mut sectors) = setup();
        sectors.start_drawing(&mut viewer, SectorType::Polygon).unwrap();
        click(&mut viewer, &mut sectors, 100.0, 100.0);
        click(&mut viewer, &mut sectors, 500.0, 100.0);
        click(&mut viewer, &mut sectors, 500.0, 500.0);

        // 3 dots + 2 segments on the registry, hint appended
        assert_eq!(viewer.overlay_count(), 5);
        assert_eq!(sectors.drawing_element_count(), 6);
        let first_vertices = viewer
            .elements()
            .filter(|(_, r)| matches!(r.element.kind, ElementKind::DrawVertex { first: true, .. }))
            .count();
        assert_eq!(first_vertices, 1);
    }

    #[test]
    fn test_polygon_close_with_two_points_is_rejected() {
        let (mut viewer, mut sectors) = setup();
        sectors.start_drawing(&mut viewer, SectorType::Polygon).unwrap();
        click(&mut viewer, &mut sectors, 100.0, 100.0);
        click(&mut viewer, &mut sectors, 500.0, 100.0);
        click(&mut viewer, &mut sectors, 105.0, 104.0);

        assert!(sectors.is_drawing());
        assert_eq!(sectors.drawing_state().point_count(), 2);
        let events = sectors.take_events();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], OverlayEvent::DrawingRejected { .. }));
    }

    #[test]
    fn test_polygon_close_emits_one_draft() {
        let (mut viewer, mut sectors) = setup();
        sectors.start_drawing(&mut viewer, SectorType::Polygon).unwrap();
        for (x, y) in [(0.0, 0.0), (1000.0, 0.0), (1000.0, 1000.0), (0.0, 1000.0)] {
            click(&mut viewer, &mut sectors, x, y);
        }
        click(&mut viewer, &mut sectors, 12.0, 10.0);

        assert_eq!(sectors.drawing_state(), &DrawingState::Idle);
        let events = sectors.take_events();
        assert_eq!(events.len(), 1);
        let OverlayEvent::DraftCompleted {
            draft:
                SectorDraft::Polygon {
                    x_coord,
                    y_coord,
                    radius,
                    points,
                },
        } = &events[0]
        else {
            panic!("expected polygon draft");
        };
        assert_eq!(points.len(), 4);
        assert!(approx(*x_coord, 0.5) && approx(*y_coord, 0.5));
        assert!((radius - 0.5_f64.sqrt()).abs() < 1e-9);
        assert_eq!(viewer.overlay_count(), 0);
        assert_eq!(viewer.appended_count(), 0);
    }

    #[test]
    fn test_close_threshold_uses_current_zoom() {
        let (mut viewer, mut sectors) = setup();
        sectors.start_drawing(&mut viewer, SectorType::Polygon).unwrap();
        for (x, y) in [(100.0, 100.0), (500.0, 100.0), (500.0, 500.0)] {
            click(&mut viewer, &mut sectors, x, y);
        }
        // Zoomed in 4x, the first vertex is now at (400, 400) on screen
        viewer.set_camera(viewer.camera().zoom_in(4.0, 10.0));
        click(&mut viewer, &mut sectors, 430.0, 400.0);
        assert!(sectors.is_drawing());
        click(&mut viewer, &mut sectors, 410.0, 405.0);
        assert!(!sectors.is_drawing());
    }

    #[test]
    fn test_finish_polygon() {
        let (mut viewer, mut sectors) = setup();
        assert!(matches!(
            sectors.finish_polygon(&mut viewer),
            Err(OverlayError::NotDrawing)
        ));

        sectors.start_drawing(&mut viewer, SectorType::Polygon).unwrap();
        click(&mut viewer, &mut sectors, 100.0, 100.0);
        assert!(matches!(
            sectors.finish_polygon(&mut viewer),
            Err(OverlayError::NotEnoughPoints { required: 3, found: 1 })
        ));
        click(&mut viewer, &mut sectors, 500.0, 100.0);
        click(&mut viewer, &mut sectors, 300.0, 400.0);
        sectors.finish_polygon(&mut viewer).unwrap();
        assert!(!sectors.is_drawing());
        assert!(sectors
            .take_events()
            .iter()
            .any(|e| matches!(e, OverlayEvent::DraftCompleted { .. })));
    }

    #[test]
    fn test_undo_last_point() {
        let (mut viewer, mut sectors) = setup();
        sectors.start_drawing(&mut viewer, SectorType::Polygon).unwrap();
        sectors.undo_last_point(&mut viewer).unwrap();
        click(&mut viewer, &mut sectors, 100.0, 100.0);
        click(&mut viewer, &mut sectors, 500.0, 100.0);
        assert_eq!(viewer.overlay_count(), 3);

        sectors.undo_last_point(&mut viewer).unwrap();
        assert_eq!(sectors.drawing_state().point_count(), 1);
        assert_eq!(viewer.overlay_count(), 1);

        sectors.stop_drawing(&mut viewer);
        assert!(matches!(
            sectors.undo_last_point(&mut viewer),
            Err(OverlayError::NotDrawing)
        ));
    }

    #[test]
    fn test_stop_from_any_state() {
        let (mut viewer, mut sectors) = setup();
        sectors.stop_drawing(&mut viewer);
        assert!(viewer.click_to_zoom());

        sectors.start_drawing(&mut viewer, SectorType::Polygon).unwrap();
        click(&mut viewer, &mut sectors, 100.0, 100.0);
        click(&mut viewer, &mut sectors, 500.0, 100.0);
        sectors.stop_drawing(&mut viewer);
        sectors.stop_drawing(&mut viewer);

        assert_eq!(viewer.overlay_count(), 0);
        assert_eq!(viewer.appended_count(), 0);
        assert_eq!(viewer.click_handler_count(), 0);
        assert_eq!(sectors.drawing_element_count(), 0);
    }

    #[test]
    fn test_hint_is_detached_not_removed_as_overlay() {
        let (mut viewer, mut sectors) = setup();
        sectors.start_drawing(&mut viewer, SectorType::Rectangle).unwrap();
        sectors.stop_drawing(&mut viewer);
        let stats = viewer.stats();
        assert_eq!(stats.appended, 1);
        assert_eq!(stats.detached, 1);
        assert_eq!(stats.overlays_removed, 0);
    }

    #[test]
    fn test_restart_replaces_session() {
        let (mut viewer, mut sectors) = setup();
        sectors.start_drawing(&mut viewer, SectorType::Polygon).unwrap();
        click(&mut viewer, &mut sectors, 100.0, 100.0);
        sectors.start_drawing(&mut viewer, SectorType::Rectangle).unwrap();
        assert_eq!(sectors.drawing_state(), &DrawingState::Rectangle { corner: None });
        assert_eq!(viewer.overlay_count(), 0);
        assert_eq!(viewer.click_handler_count(), 1);
    }

    #[test]
    fn test_viewer_failure_mid_draw_tears_down() {
        let (mut viewer, mut sectors) = setup();
        sectors.start_drawing(&mut viewer, SectorType::Polygon).unwrap();
        click(&mut viewer, &mut sectors, 100.0, 100.0);
        // the next dot succeeds, its segment fails
        viewer.fail_creations_after(1);
        click(&mut viewer, &mut sectors, 500.0, 100.0);

        assert!(!sectors.is_drawing());
        assert_eq!(viewer.overlay_count(), 0);
        assert_eq!(viewer.appended_count(), 0);
        assert_eq!(viewer.click_handler_count(), 0);
        assert_eq!(viewer.cursor(), Cursor::Default);
        let events = sectors.take_events();
        assert!(matches!(events.as_slice(), [OverlayEvent::Alert { .. }]));
    }

    #[test]
    fn test_failed_hint_aborts_start() {
        let (mut viewer, mut sectors) = setup();
        viewer.fail_creations_after(0);
        let result = sectors.start_drawing(&mut viewer, SectorType::Rectangle);
        assert!(matches!(result, Err(OverlayError::Viewer(_))));
        assert!(!sectors.is_drawing());
        assert_eq!(viewer.click_handler_count(), 0);
        assert!(viewer.click_to_zoom());
    }

    #[test]
    fn test_cancel_emits_event_only_when_drawing() {
        let (mut viewer, mut sectors) = setup();
        sectors.cancel_drawing(&mut viewer);
        assert!(sectors.take_events().is_empty());
        sectors.start_drawing(&mut viewer, SectorType::Rectangle).unwrap();
        sectors.cancel_drawing(&mut viewer);
        assert_eq!(sectors.take_events(), vec![OverlayEvent::DrawingCancelled]);
    }
}
