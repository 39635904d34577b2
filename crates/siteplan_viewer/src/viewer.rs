//! The viewer abstraction consumed by overlay managers.

use thiserror::Error;

use crate::{Cursor, Element, Placement, Point, Size, Style};

/// Handle of an element created through a [`Viewer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u64);

/// Handle of a pointer tracker attached to an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackerId(pub u64);

/// Handle of an installed canvas click handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(pub u64);

/// Errors reported by a viewer backend.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ViewerError {
    /// No element with this id is present.
    #[error("Unknown element: {0:?}")]
    UnknownElement(ElementId),

    #[error("Unknown pointer tracker: {0:?}")]
    UnknownTracker(TrackerId),

    #[error("Unknown click handler: {0:?}")]
    UnknownHandler(HandlerId),

    /// Element exists but was registered through the other removal path
    #[error("Element {id:?} is not {expected}")]
    WrongRegistration { id: ElementId, expected: &'static str },

    /// The backend refused the operation.
    #[error("Viewer rejected operation: {0}")]
    Rejected(String),
}

/// Read-only coordinate queries.
pub trait ViewportGeometry {
    /// Pixel size of the loaded image, `None` while nothing is loaded.
    fn content_size(&self) -> Option<Size>;

    /// Image pixels to viewport units.
    fn image_to_viewport(&self, pixel: Point) -> Point;

    /// Viewport units to image pixels.
    fn viewport_to_image(&self, viewport: Point) -> Point;

    /// Viewport units to screen pixels.
    fn viewport_to_screen(&self, viewport: Point) -> Point;

    /// Screen pixels to viewport units.
    fn screen_to_viewport(&self, screen: Point) -> Point;

    /// Screen pixels covered by one viewport unit at the current zoom.
    fn pixels_per_viewport_unit(&self) -> f64;
}

/// A deep-zoom viewer with an overlay registry.
///
/// Elements live either in the overlay registry (`add_overlay` /
/// `remove_overlay`), where they track pan and zoom, or directly in the
/// viewer container (`append_element` / `detach_element`). Each element must
/// be removed through the same path it was added with.
pub trait Viewer: ViewportGeometry {
    /// Register an element that follows pan and zoom at `placement`.
    fn add_overlay(
        &mut self,
        element: Element,
        placement: Placement,
    ) -> Result<ElementId, ViewerError>;

    /// Move or resize a registered overlay.
    fn update_overlay(&mut self, id: ElementId, placement: Placement) -> Result<(), ViewerError>;

    /// Remove an element added with [`Viewer::add_overlay`].
    fn remove_overlay(&mut self, id: ElementId) -> Result<(), ViewerError>;

    /// Replace the visual content of an element (registered or appended).
    fn update_element(&mut self, id: ElementId, element: Element) -> Result<(), ViewerError>;

    /// Change only the style of an element.
    fn restyle(&mut self, id: ElementId, style: Style) -> Result<(), ViewerError>;

    /// Append an element to the container at a fixed screen position.
    fn append_element(&mut self, element: Element, screen: Point) -> Result<ElementId, ViewerError>;

    /// Remove an element added with [`Viewer::append_element`].
    fn detach_element(&mut self, id: ElementId) -> Result<(), ViewerError>;

    /// Start reporting pointer activity on an element.
    fn track_pointer(&mut self, id: ElementId) -> Result<TrackerId, ViewerError>;

    /// Stop a tracker. Must happen before its element is removed.
    fn release_tracker(&mut self, tracker: TrackerId) -> Result<(), ViewerError>;

    /// Subscribe to raw canvas clicks, delivered as [`crate::ViewerEvent::CanvasClick`].
    fn add_click_handler(&mut self) -> Result<HandlerId, ViewerError>;

    /// Unsubscribe a handler from [`Viewer::add_click_handler`].
    fn remove_click_handler(&mut self, handler: HandlerId) -> Result<(), ViewerError>;

    /// Pointer cursor shown over the canvas.
    fn set_cursor(&mut self, cursor: Cursor);

    /// Toggle click-to-zoom; drawing turns it off so clicks place vertices.
    fn set_click_to_zoom(&mut self, enabled: bool);
}
