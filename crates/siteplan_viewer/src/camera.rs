//! Coordinate spaces of a deep-zoom viewer.
//!
//! Three spaces are involved:
//! - image space: pixels of the loaded floor-plan image
//! - viewport space: the viewer's world units, independent of pan/zoom
//! - screen space: pixels inside the viewer container
//!
//! [`ImageMapping`] maps image pixels to viewport units (per axis, so it may
//! be anisotropic) and [`Camera`] maps viewport units to screen pixels.

use serde::{Deserialize, Serialize};

use crate::{Point, Size};

/// Affine per-axis mapping from image pixels to viewport units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageMapping {
    pub scale_x: f64,
    pub scale_y: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl ImageMapping {
    /// The usual deep-zoom convention: the image width spans exactly one
    /// viewport unit and the aspect ratio is preserved.
    pub fn fit_width(content: Size) -> Self {
        let scale = if content.width > 0.0 {
            1.0 / content.width
        } else {
            1.0
        };
        Self {
            scale_x: scale,
            scale_y: scale,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }

    /// Anisotropic mapping, e.g. for a viewer that stretches the image.
    pub fn stretched(scale_x: f64, scale_y: f64) -> Self {
        Self {
            scale_x,
            scale_y,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }

    pub fn image_to_viewport(&self, pixel: Point) -> Point {
        Point::new(
            pixel.x * self.scale_x + self.offset_x,
            pixel.y * self.scale_y + self.offset_y,
        )
    }

    pub fn viewport_to_image(&self, viewport: Point) -> Point {
        Point::new(
            (viewport.x - self.offset_x) / self.scale_x,
            (viewport.y - self.offset_y) / self.scale_y,
        )
    }
}

/// Pan/zoom state mapping viewport units to screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Screen pixels per viewport unit at zoom 1.0 (usually the container width).
    pub base_pixels_per_unit: f64,
    pub zoom: f64,
    pub pan_x: f64,
    pub pan_y: f64,
}

impl Camera {
    pub fn new(base_pixels_per_unit: f64, zoom: f64, pan_x: f64, pan_y: f64) -> Self {
        Self {
            base_pixels_per_unit,
            zoom,
            pan_x,
            pan_y,
        }
    }

    /// Camera with zoom 1.0 and no pan for a container of the given width.
    pub fn identity(container_width: f64) -> Self {
        Self::new(container_width, 1.0, 0.0, 0.0)
    }

    /// Screen pixels covered by one viewport unit at the current zoom.
    pub fn pixels_per_unit(&self) -> f64 {
        self.base_pixels_per_unit * self.zoom
    }

    pub fn viewport_to_screen(&self, viewport: Point) -> Point {
        let ppu = self.pixels_per_unit();
        Point::new(viewport.x * ppu + self.pan_x, viewport.y * ppu + self.pan_y)
    }

    pub fn screen_to_viewport(&self, screen: Point) -> Point {
        let ppu = self.pixels_per_unit();
        Point::new((screen.x - self.pan_x) / ppu, (screen.y - self.pan_y) / ppu)
    }

    /// Zoom while keeping the viewport point under the cursor fixed on screen.
    pub fn zoom_to_cursor(&self, new_zoom: f64, cursor: Point) -> Camera {
        let anchor = self.screen_to_viewport(cursor);
        let new_ppu = self.base_pixels_per_unit * new_zoom;
        Camera {
            base_pixels_per_unit: self.base_pixels_per_unit,
            zoom: new_zoom,
            pan_x: cursor.x - anchor.x * new_ppu,
            pan_y: cursor.y - anchor.y * new_ppu,
        }
    }

    /// Apply a pan delta in screen pixels.
    pub fn pan_by(&self, dx: f64, dy: f64) -> Camera {
        Camera {
            pan_x: self.pan_x + dx,
            pan_y: self.pan_y + dy,
            ..*self
        }
    }

    pub fn zoom_in(&self, factor: f64, max_zoom: f64) -> Camera {
        Camera {
            zoom: (self.zoom * factor).min(max_zoom),
            ..*self
        }
    }

    pub fn zoom_out(&self, factor: f64, min_zoom: f64) -> Camera {
        Camera {
            zoom: (self.zoom / factor).max(min_zoom),
            ..*self
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::identity(1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_fit_width_mapping() {
        let mapping = ImageMapping::fit_width(Size::new(2000.0, 1000.0));
        let vp = mapping.image_to_viewport(Point::new(2000.0, 1000.0));
        assert!(approx_eq(vp.x, 1.0));
        assert!(approx_eq(vp.y, 0.5));

        let back = mapping.viewport_to_image(vp);
        assert!(approx_eq(back.x, 2000.0));
        assert!(approx_eq(back.y, 1000.0));
    }

    #[test]
    fn test_zoom_to_cursor_preserves_cursor_point() {
        let camera = Camera::new(800.0, 1.0, 50.0, 30.0);
        let cursor = Point::new(150.0, 120.0);
        let before = camera.screen_to_viewport(cursor);

        let zoomed = camera.zoom_to_cursor(2.0, cursor);
        let after = zoomed.screen_to_viewport(cursor);

        assert_eq!(zoomed.zoom, 2.0);
        assert!(approx_eq(before.x, after.x));
        assert!(approx_eq(before.y, after.y));
    }

    #[test]
    fn test_screen_round_trip() {
        let camera = Camera::new(640.0, 3.5, -120.0, 44.0);
        let vp = Point::new(0.37, 0.81);
        let back = camera.screen_to_viewport(camera.viewport_to_screen(vp));
        assert!(approx_eq(vp.x, back.x));
        assert!(approx_eq(vp.y, back.y));
    }

    #[test]
    fn test_pan_preserves_zoom() {
        let camera = Camera::new(500.0, 2.5, 0.0, 0.0);
        let panned = camera.pan_by(100.0, 200.0);
        assert_eq!(panned.zoom, 2.5);
        assert_eq!(panned.pan_x, 100.0);
        assert_eq!(panned.pan_y, 200.0);
    }

    #[test]
    fn test_zoom_limits() {
        let camera = Camera::new(500.0, 4.0, 0.0, 0.0);
        assert_eq!(camera.zoom_in(1.5, 5.0).zoom, 5.0);

        let camera = Camera::new(500.0, 0.3, 0.0, 0.0);
        assert!(approx_eq(camera.zoom_out(1.5, 0.2).zoom, 0.2));
    }
}
