//! A headless viewer that keeps everything in memory.
//!
//! Used by tests and the replay harness. It implements the full [`Viewer`]
//! contract, counts the operations it receives and can be told to fail so
//! error paths can be exercised.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::{
    Camera, Cursor, Element, ElementId, HandlerId, ImageMapping, Placement, Point, Size, Style,
    TrackerId, Viewer, ViewerError, ViewportGeometry,
};

/// How an element was attached to the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attachment {
    /// Registered in the overlay registry
    Overlay,
    /// Appended directly to the container
    Appended,
}

/// An element currently held by the viewer.
#[derive(Debug, Clone)]
pub struct ElementRecord {
    pub element: Element,
    pub attachment: Attachment,
    /// Viewport placement (overlays only)
    pub placement: Option<Placement>,
    /// Screen position (appended elements only)
    pub screen: Option<Point>,
}

/// Operation counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewerStats {
    pub overlays_added: usize,
    /// Calls to `update_overlay`, i.e. position/size changes
    pub overlay_updates: usize,
    pub overlays_removed: usize,
    pub element_updates: usize,
    pub restyles: usize,
    pub appended: usize,
    pub detached: usize,
}

/// In-memory [`Viewer`] implementation.
#[derive(Debug)]
pub struct MemoryViewer {
    content: Option<Size>,
    mapping: ImageMapping,
    camera: Camera,
    elements: BTreeMap<ElementId, ElementRecord>,
    trackers: HashMap<TrackerId, ElementId>,
    handlers: HashSet<HandlerId>,
    next_id: u64,
    cursor: Cursor,
    click_to_zoom: bool,
    stats: ViewerStats,
    /// Number of further element creations allowed before they start failing
    creation_budget: Option<usize>,
    failing_removals: HashSet<ElementId>,
}

impl MemoryViewer {
    /// A viewer with no image loaded.
    pub fn new() -> Self {
        Self {
            content: None,
            mapping: ImageMapping::stretched(1.0, 1.0),
            camera: Camera::default(),
            elements: BTreeMap::new(),
            trackers: HashMap::new(),
            handlers: HashSet::new(),
            next_id: 1,
            cursor: Cursor::Default,
            click_to_zoom: true,
            stats: ViewerStats::default(),
            creation_budget: None,
            failing_removals: HashSet::new(),
        }
    }

    /// A viewer showing an image of the given pixel size.
    pub fn with_image(size: Size) -> Self {
        let mut viewer = Self::new();
        viewer.load_image(size);
        viewer
    }

    /// Load an image, using the fit-width mapping.
    pub fn load_image(&mut self, size: Size) {
        log::debug!("Memory viewer: image {}x{} loaded", size.width, size.height);
        self.content = Some(size);
        self.mapping = ImageMapping::fit_width(size);
    }

    pub fn close_image(&mut self) {
        self.content = None;
    }

    pub fn set_mapping(&mut self, mapping: ImageMapping) {
        self.mapping = mapping;
    }

    pub fn camera(&self) -> Camera {
        self.camera
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    pub fn element(&self, id: ElementId) -> Option<&ElementRecord> {
        self.elements.get(&id)
    }

    pub fn elements(&self) -> impl Iterator<Item = (&ElementId, &ElementRecord)> {
        self.elements.iter()
    }

    pub fn overlay_count(&self) -> usize {
        self.count(Attachment::Overlay)
    }

    pub fn appended_count(&self) -> usize {
        self.count(Attachment::Appended)
    }

    fn count(&self, attachment: Attachment) -> usize {
        self.elements
            .values()
            .filter(|r| r.attachment == attachment)
            .count()
    }

    pub fn tracker_count(&self) -> usize {
        self.trackers.len()
    }

    /// The tracker attached to an element, if any.
    pub fn tracker_for(&self, id: ElementId) -> Option<TrackerId> {
        self.trackers
            .iter()
            .find(|(_, element)| **element == id)
            .map(|(tracker, _)| *tracker)
    }

    /// Trackers whose element is gone. Non-zero means a handler leaked.
    pub fn leaked_trackers(&self) -> usize {
        self.trackers
            .values()
            .filter(|id| !self.elements.contains_key(id))
            .count()
    }

    pub fn click_handler_count(&self) -> usize {
        self.handlers.len()
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn click_to_zoom(&self) -> bool {
        self.click_to_zoom
    }

    pub fn stats(&self) -> ViewerStats {
        self.stats
    }

    /// Allow `n` more element creations, then reject every further one.
    pub fn fail_creations_after(&mut self, n: usize) {
        self.creation_budget = Some(n);
    }

    /// Reject any attempt to remove or detach the given element.
    pub fn fail_removal_of(&mut self, id: ElementId) {
        self.failing_removals.insert(id);
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn check_creation(&mut self) -> Result<(), ViewerError> {
        match self.creation_budget {
            Some(0) => Err(ViewerError::Rejected("element creation failed".to_string())),
            Some(n) => {
                self.creation_budget = Some(n - 1);
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn take(&mut self, id: ElementId, attachment: Attachment) -> Result<(), ViewerError> {
        if self.failing_removals.contains(&id) {
            return Err(ViewerError::Rejected(format!("cannot remove {:?}", id)));
        }
        let record = self
            .elements
            .get(&id)
            .ok_or(ViewerError::UnknownElement(id))?;
        if record.attachment != attachment {
            return Err(ViewerError::WrongRegistration {
                id,
                expected: match attachment {
                    Attachment::Overlay => "a registered overlay",
                    Attachment::Appended => "an appended element",
                },
            });
        }
        self.elements.remove(&id);
        Ok(())
    }
}

impl Default for MemoryViewer {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewportGeometry for MemoryViewer {
    fn content_size(&self) -> Option<Size> {
        self.content
    }

    fn image_to_viewport(&self, pixel: Point) -> Point {
        self.mapping.image_to_viewport(pixel)
    }

    fn viewport_to_image(&self, viewport: Point) -> Point {
        self.mapping.viewport_to_image(viewport)
    }

    fn viewport_to_screen(&self, viewport: Point) -> Point {
        self.camera.viewport_to_screen(viewport)
    }

    fn screen_to_viewport(&self, screen: Point) -> Point {
        self.camera.screen_to_viewport(screen)
    }

    fn pixels_per_viewport_unit(&self) -> f64 {
        self.camera.pixels_per_unit()
    }
}

impl Viewer for MemoryViewer {
    fn add_overlay(
        &mut self,
        element: Element,
        placement: Placement,
    ) -> Result<ElementId, ViewerError> {
        self.check_creation()?;
        let id = ElementId(self.next_id());
        self.elements.insert(
            id,
            ElementRecord {
                element,
                attachment: Attachment::Overlay,
                placement: Some(placement),
                screen: None,
            },
        );
        self.stats.overlays_added += 1;
        Ok(id)
    }

    fn update_overlay(&mut self, id: ElementId, placement: Placement) -> Result<(), ViewerError> {
        let record = self
            .elements
            .get_mut(&id)
            .ok_or(ViewerError::UnknownElement(id))?;
        if record.attachment != Attachment::Overlay {
            return Err(ViewerError::WrongRegistration {
                id,
                expected: "a registered overlay",
            });
        }
        record.placement = Some(placement);
        self.stats.overlay_updates += 1;
        Ok(())
    }

    fn remove_overlay(&mut self, id: ElementId) -> Result<(), ViewerError> {
        self.take(id, Attachment::Overlay)?;
        self.stats.overlays_removed += 1;
        Ok(())
    }

    fn update_element(&mut self, id: ElementId, element: Element) -> Result<(), ViewerError> {
        let record = self
            .elements
            .get_mut(&id)
            .ok_or(ViewerError::UnknownElement(id))?;
        record.element = element;
        self.stats.element_updates += 1;
        Ok(())
    }

    fn restyle(&mut self, id: ElementId, style: Style) -> Result<(), ViewerError> {
        let record = self
            .elements
            .get_mut(&id)
            .ok_or(ViewerError::UnknownElement(id))?;
        record.element.style = style;
        self.stats.restyles += 1;
        Ok(())
    }

    fn append_element(&mut self, element: Element, screen: Point) -> Result<ElementId, ViewerError> {
        self.check_creation()?;
        let id = ElementId(self.next_id());
        self.elements.insert(
            id,
            ElementRecord {
                element,
                attachment: Attachment::Appended,
                placement: None,
                screen: Some(screen),
            },
        );
        self.stats.appended += 1;
        Ok(id)
    }

    fn detach_element(&mut self, id: ElementId) -> Result<(), ViewerError> {
        self.take(id, Attachment::Appended)?;
        self.stats.detached += 1;
        Ok(())
    }

    fn track_pointer(&mut self, id: ElementId) -> Result<TrackerId, ViewerError> {
        if !self.elements.contains_key(&id) {
            return Err(ViewerError::UnknownElement(id));
        }
        let tracker = TrackerId(self.next_id());
        self.trackers.insert(tracker, id);
        Ok(tracker)
    }

    fn release_tracker(&mut self, tracker: TrackerId) -> Result<(), ViewerError> {
        self.trackers
            .remove(&tracker)
            .map(|_| ())
            .ok_or(ViewerError::UnknownTracker(tracker))
    }

    fn add_click_handler(&mut self) -> Result<HandlerId, ViewerError> {
        let handler = HandlerId(self.next_id());
        self.handlers.insert(handler);
        Ok(handler)
    }

    fn remove_click_handler(&mut self, handler: HandlerId) -> Result<(), ViewerError> {
        if self.handlers.remove(&handler) {
            Ok(())
        } else {
            Err(ViewerError::UnknownHandler(handler))
        }
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor;
    }

    fn set_click_to_zoom(&mut self, enabled: bool) {
        self.click_to_zoom = enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ElementKind, Rect};

    fn dot() -> Element {
        Element::new(
            ElementKind::DrawVertex {
                first: true,
                diameter_px: 8.0,
            },
            Style::default(),
        )
    }

    #[test]
    fn test_removal_paths_are_not_interchangeable() {
        let mut viewer = MemoryViewer::with_image(Size::new(100.0, 100.0));
        let overlay = viewer
            .add_overlay(dot(), Placement::centered(Point::new(0.5, 0.5)))
            .unwrap();
        let appended = viewer.append_element(dot(), Point::new(10.0, 10.0)).unwrap();

        assert!(matches!(
            viewer.detach_element(overlay),
            Err(ViewerError::WrongRegistration { .. })
        ));
        assert!(matches!(
            viewer.remove_overlay(appended),
            Err(ViewerError::WrongRegistration { .. })
        ));

        viewer.remove_overlay(overlay).unwrap();
        viewer.detach_element(appended).unwrap();
        assert_eq!(viewer.elements().count(), 0);
    }

    #[test]
    fn test_leaked_tracker_detection() {
        let mut viewer = MemoryViewer::with_image(Size::new(100.0, 100.0));
        let id = viewer
            .add_overlay(
                Element::new(ElementKind::SectorRect, Style::default()),
                Placement::Area {
                    rect: Rect::new(0.1, 0.1, 0.2, 0.2),
                },
            )
            .unwrap();
        viewer.track_pointer(id).unwrap();
        viewer.remove_overlay(id).unwrap();
        assert_eq!(viewer.leaked_trackers(), 1);
    }

    #[test]
    fn test_creation_budget() {
        let mut viewer = MemoryViewer::with_image(Size::new(100.0, 100.0));
        viewer.fail_creations_after(1);
        assert!(viewer.append_element(dot(), Point::ORIGIN).is_ok());
        assert!(viewer.append_element(dot(), Point::ORIGIN).is_err());
    }
}
