//! Visual elements and how they are placed on the viewer.
//!
//! These types are a neutral description of what to draw. A browser-backed
//! viewer turns them into DOM nodes, the [`MemoryViewer`](crate::MemoryViewer)
//! just records them.

use crate::{Color, Point, Rect};

/// What kind of visual an element is.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    /// A round work-log pin with a fixed on-screen diameter.
    MarkerPin {
        /// Diameter in screen pixels
        diameter_px: f64,
    },
    /// A box filling its placement rectangle.
    SectorRect,
    /// A box clipped to a polygon outline.
    SectorPolygon {
        /// Outline vertices as 0-100 percentages of the box
        clip: Vec<(f64, f64)>,
    },
    /// A circle with a fixed on-screen diameter.
    SectorCircle {
        /// Diameter in screen pixels
        diameter_px: f64,
    },
    /// A vertex dot shown while a shape is being drawn.
    DrawVertex {
        /// Whether this is the first vertex (rendered distinctly)
        first: bool,
        /// Diameter in screen pixels
        diameter_px: f64,
    },
    /// A segment between two drawn vertices.
    DrawSegment {
        /// Start in viewport space
        from: Point,
        /// End in viewport space
        to: Point,
    },
    /// A text banner shown on top of the viewer.
    Hint { text: String },
}

/// Presentational state of an element.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub fill: Color,
    pub border: Color,
    pub border_width_px: f64,
    /// Uniform scale factor (hover feedback)
    pub scale: f64,
    pub shadow: bool,
    pub z_index: i32,
    /// Whether the element's delete button (if any) is shown
    pub delete_button_visible: bool,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fill: Color::TRANSPARENT,
            border: Color::BLACK,
            border_width_px: 1.0,
            scale: 1.0,
            shadow: false,
            z_index: 0,
            delete_button_visible: false,
        }
    }
}

/// A visual element to hand to the viewer.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub kind: ElementKind,
    pub style: Style,
    /// Tooltip text
    pub title: Option<String>,
    /// Whether the element carries a delete button
    pub delete_button: bool,
}

impl Element {
    pub fn new(kind: ElementKind, style: Style) -> Self {
        Self {
            kind,
            style,
            title: None,
            delete_button: false,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_delete_button(mut self, enabled: bool) -> Self {
        self.delete_button = enabled;
        self
    }
}

/// Which point of an element is pinned to its location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Anchor {
    #[default]
    Center,
    TopLeft,
}

/// Where an overlay sits in viewport space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    /// Fixed on-screen size, pinned at a viewport location.
    At { location: Point, anchor: Anchor },
    /// Sized in viewport units, scales with zoom.
    Area { rect: Rect },
}

impl Placement {
    pub fn centered(location: Point) -> Self {
        Placement::At {
            location,
            anchor: Anchor::Center,
        }
    }

    /// The viewport location the placement is pinned at.
    pub fn location(&self) -> Point {
        match self {
            Placement::At { location, .. } => *location,
            Placement::Area { rect } => rect.top_left(),
        }
    }
}

/// Pointer cursor shown over the viewer canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    Crosshair,
    Pointer,
}
