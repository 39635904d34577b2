//! Conversions between normalized image coordinates and viewer space.
//!
//! Everything persisted is a [`NormalizedCoord`]: a fraction of the floor-plan
//! image's pixel width/height. Viewport points are derived on demand from the
//! viewer's current content size and transform, so they are never stored.
//!
//! None of these functions fail. Without a loaded image they return the
//! origin (or zero distance), and out-of-range input is extrapolated.

use serde::{Deserialize, Serialize};
use siteplan_viewer::{Point, ViewportGeometry};

use crate::constants::COORD_EPSILON;

/// A position as a fraction (0..1) of the image's pixel width/height.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NormalizedCoord {
    pub x: f64,
    pub y: f64,
}

impl NormalizedCoord {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Whether the coordinate lies on the image.
    pub fn is_on_image(&self) -> bool {
        (0.0..=1.0).contains(&self.x) && (0.0..=1.0).contains(&self.y)
    }

    /// The coordinate clamped onto the image.
    pub fn clamped(&self) -> Self {
        Self::new(self.x.clamp(0.0, 1.0), self.y.clamp(0.0, 1.0))
    }

    pub fn approx_eq(&self, other: &NormalizedCoord) -> bool {
        (self.x - other.x).abs() <= COORD_EPSILON && (self.y - other.y).abs() <= COORD_EPSILON
    }

    pub fn as_point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

impl From<Point> for NormalizedCoord {
    fn from(p: Point) -> Self {
        Self::new(p.x, p.y)
    }
}

/// Image axis a scalar distance is measured along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Fraction of the image width
    X,
    /// Fraction of the image height
    Y,
}

/// Normalized image coordinate to viewport point.
pub fn image_to_viewport<G: ViewportGeometry + ?Sized>(geom: &G, coord: NormalizedCoord) -> Point {
    let Some(size) = geom.content_size() else {
        log::debug!("image_to_viewport: no image loaded");
        return Point::ORIGIN;
    };
    geom.image_to_viewport(Point::new(coord.x * size.width, coord.y * size.height))
}

/// Viewport point to normalized image coordinate. Not clamped.
pub fn viewport_to_image<G: ViewportGeometry + ?Sized>(geom: &G, point: Point) -> NormalizedCoord {
    let Some(size) = geom.content_size() else {
        log::debug!("viewport_to_image: no image loaded");
        return NormalizedCoord::default();
    };
    if size.is_empty() {
        return NormalizedCoord::default();
    }
    let pixel = geom.viewport_to_image(point);
    NormalizedCoord::new(pixel.x / size.width, pixel.y / size.height)
}

/// Screen pixel position to normalized image coordinate. Not clamped.
pub fn screen_to_image<G: ViewportGeometry + ?Sized>(geom: &G, screen: Point) -> NormalizedCoord {
    viewport_to_image(geom, geom.screen_to_viewport(screen))
}

/// Normalized image coordinate to screen pixel position.
pub fn image_to_screen<G: ViewportGeometry + ?Sized>(geom: &G, coord: NormalizedCoord) -> Point {
    geom.viewport_to_screen(image_to_viewport(geom, coord))
}

/// Convert a normalized distance along one image axis into viewport units.
///
/// Transforms two image points `distance` apart and takes the delta, so an
/// anisotropic image-to-viewport mapping is honoured per axis.
pub fn image_distance_to_viewport<G: ViewportGeometry + ?Sized>(
    geom: &G,
    distance: f64,
    axis: Axis,
) -> f64 {
    if geom.content_size().is_none() {
        log::debug!("image_distance_to_viewport: no image loaded");
        return 0.0;
    }
    let origin = image_to_viewport(geom, NormalizedCoord::new(0.0, 0.0));
    match axis {
        Axis::X => image_to_viewport(geom, NormalizedCoord::new(distance, 0.0)).x - origin.x,
        Axis::Y => image_to_viewport(geom, NormalizedCoord::new(0.0, distance)).y - origin.y,
    }
}

/// Convert a normalized distance along one image axis into screen pixels
/// at the current zoom.
pub fn image_distance_to_pixels<G: ViewportGeometry + ?Sized>(
    geom: &G,
    distance: f64,
    axis: Axis,
) -> f64 {
    image_distance_to_viewport(geom, distance, axis) * geom.pixels_per_viewport_unit()
}
