//! Default thresholds and sizes for the overlay engine.

/// Longest press-to-release interval that still counts as a click (ms).
pub const CLICK_TIME_THRESHOLD_MS: u64 = 300;

/// Largest pointer travel between press and release that still counts as a click (px).
pub const CLICK_DISTANCE_THRESHOLD_PX: f64 = 8.0;

/// Screen distance from the first vertex within which a click closes the polygon (px).
pub const POLYGON_CLOSE_THRESHOLD_PX: f64 = 20.0;

/// Minimum number of vertices for a closed polygon.
pub const MIN_POLYGON_POINTS: usize = 3;

/// Marker pin diameter (px).
pub const MARKER_DIAMETER_PX: f64 = 16.0;

/// Scale applied to a marker while hovered.
pub const MARKER_HOVER_SCALE: f64 = 1.3;

/// z-index given to a hovered overlay so it sits above its neighbours.
pub const HOVER_Z_INDEX: i32 = 1000;

/// Vertex dot diameter while drawing (px).
pub const DRAW_VERTEX_DIAMETER_PX: f64 = 8.0;

/// The first polygon vertex is drawn larger so the close target is visible (px).
pub const DRAW_FIRST_VERTEX_DIAMETER_PX: f64 = 14.0;

/// Where the drawing hint banner is appended in the viewer container (px).
pub const DRAW_HINT_POSITION_PX: (f64, f64) = (12.0, 12.0);

/// Fill alpha of sector overlays.
pub const SECTOR_FILL_ALPHA: f32 = 0.25;

/// Absolute tolerance when comparing normalized coordinates.
pub const COORD_EPSILON: f64 = 1e-9;
