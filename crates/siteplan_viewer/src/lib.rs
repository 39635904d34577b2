//! siteplan_viewer - the deep-zoom viewer abstraction used by siteplan.
//!
//! This crate describes what an overlay engine needs from a pannable,
//! zoomable image viewer: coordinate conversion between image, viewport and
//! screen space, an overlay registry, pointer tracking and canvas clicks.
//! [`MemoryViewer`] is a complete headless implementation.

mod camera;
mod color;
mod element;
mod event;
mod geometry;
mod memory;
mod viewer;

pub use camera::{Camera, ImageMapping};
pub use color::Color;
pub use element::{Anchor, Cursor, Element, ElementKind, Placement, Style};
pub use event::{CanvasClick, ElementPart, PointerEvent, ViewerEvent};
pub use geometry::{Point, Rect, Size};
pub use memory::{Attachment, ElementRecord, MemoryViewer, ViewerStats};
pub use viewer::{ElementId, HandlerId, TrackerId, Viewer, ViewerError, ViewportGeometry};
