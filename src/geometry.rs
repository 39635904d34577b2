//! Shape geometry on point sets.
//!
//! All functions work in whatever space the input points are in; the drawing
//! manager feeds them normalized coordinates.

use siteplan_viewer::Point;

/// A rectangle described both by its top-left corner and its center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectangleShape {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub center_x: f64,
    pub center_y: f64,
    /// Bounding-circle approximation: `max(width, height) / 2`
    pub radius: f64,
}

impl RectangleShape {
    pub fn center(&self) -> Point {
        Point::new(self.center_x, self.center_y)
    }

    /// The four corners, clockwise from top-left.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x, self.y),
            Point::new(self.x + self.width, self.y),
            Point::new(self.x + self.width, self.y + self.height),
            Point::new(self.x, self.y + self.height),
        ]
    }
}

/// Build a rectangle from two opposite corners given in any order.
///
/// The radius is `max(width, height) / 2`, not the half diagonal. Stored
/// sectors carry this value, so it must stay as is.
pub fn rectangle_from_corners(p1: Point, p2: Point) -> RectangleShape {
    let x = p1.x.min(p2.x);
    let y = p1.y.min(p2.y);
    let width = (p1.x - p2.x).abs();
    let height = (p1.y - p2.y).abs();
    RectangleShape {
        x,
        y,
        width,
        height,
        center_x: x + width / 2.0,
        center_y: y + height / 2.0,
        radius: width.max(height) / 2.0,
    }
}

/// Arithmetic mean of the vertices (not the area-weighted centroid).
///
/// For very irregular or concave outlines the result can fall outside the
/// shape. Returns the origin for an empty slice.
pub fn polygon_centroid(points: &[Point]) -> Point {
    if points.is_empty() {
        return Point::ORIGIN;
    }
    let n = points.len() as f64;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Point::new(sx / n, sy / n)
}

/// Largest distance from `center` to any vertex.
pub fn polygon_bounding_radius(points: &[Point], center: Point) -> f64 {
    points
        .iter()
        .map(|p| p.distance_to(center))
        .fold(0.0, f64::max)
}

/// Axis-aligned bounding box of a point set with each point re-expressed as
/// a 0-100 percentage offset inside that box.
#[derive(Debug, Clone, PartialEq)]
pub struct PercentageBox {
    pub min_x: f64,
    pub min_y: f64,
    pub width: f64,
    pub height: f64,
    pub relative_points: Vec<(f64, f64)>,
}

/// Compute the bounding box of `points` and their percentage offsets in it.
///
/// A degenerate axis (zero extent) maps every point to 0% on that axis.
/// Returns `None` for an empty slice.
pub fn points_to_percentage_box(points: &[Point]) -> Option<PercentageBox> {
    let first = points.first()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for p in &points[1..] {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    let width = max_x - min_x;
    let height = max_y - min_y;

    let percent = |value: f64, min: f64, extent: f64| {
        if extent > 0.0 {
            (value - min) / extent * 100.0
        } else {
            0.0
        }
    };

    let relative_points = points
        .iter()
        .map(|p| (percent(p.x, min_x, width), percent(p.y, min_y, height)))
        .collect();

    Some(PercentageBox {
        min_x,
        min_y,
        width,
        height,
        relative_points,
    })
}

/// Point-in-polygon test using ray casting. Polygons with fewer than three
/// vertices contain nothing.
pub fn polygon_contains(vertices: &[Point], point: Point) -> bool {
    if vertices.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let vi = vertices[i];
        let vj = vertices[j];
        if ((vi.y > point.y) != (vj.y > point.y))
            && (point.x < (vj.x - vi.x) * (point.y - vi.y) / (vj.y - vi.y) + vi.x)
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_rectangle_from_corners() {
        let r = rectangle_from_corners(Point::new(0.2, 0.2), Point::new(0.6, 0.5));
        assert!(approx_eq(r.x, 0.2));
        assert!(approx_eq(r.y, 0.2));
        assert!(approx_eq(r.width, 0.4));
        assert!(approx_eq(r.height, 0.3));
        assert!(approx_eq(r.center_x, 0.4));
        assert!(approx_eq(r.center_y, 0.35));
        assert!(approx_eq(r.radius, 0.2));
    }

    #[test]
    fn test_rectangle_corner_order_does_not_matter() {
        let a = rectangle_from_corners(Point::new(0.9, 0.1), Point::new(0.3, 0.7));
        let b = rectangle_from_corners(Point::new(0.3, 0.7), Point::new(0.9, 0.1));
        assert_eq!(a, b);
        assert!(a.width >= 0.0 && a.height >= 0.0);
    }

    #[test]
    fn test_rectangle_center_equidistant_from_corners() {
        let r = rectangle_from_corners(Point::new(0.15, 0.8), Point::new(0.55, 0.05));
        let distances: Vec<f64> = r.corners().iter().map(|c| c.distance_to(r.center())).collect();
        for d in &distances {
            assert!(approx_eq(*d, distances[0]));
        }
    }

    #[test]
    fn test_square_polygon_centroid_and_radius() {
        let square = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ];
        let c = polygon_centroid(&square);
        assert!(approx_eq(c.x, 0.5));
        assert!(approx_eq(c.y, 0.5));
        let r = polygon_bounding_radius(&square, c);
        assert!((r - 0.7071).abs() < 1e-4);
    }

    #[test]
    fn test_centroid_is_vertex_mean() {
        // Extra vertex near one corner pulls the mean, unlike an area centroid
        let points = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 0.1),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ];
        let c = polygon_centroid(&points);
        assert!(approx_eq(c.x, 0.6));
        assert!(approx_eq(c.y, 0.42));
    }

    #[test]
    fn test_percentage_box() {
        let points = [
            Point::new(0.2, 0.4),
            Point::new(0.6, 0.4),
            Point::new(0.4, 0.8),
        ];
        let b = points_to_percentage_box(&points).unwrap();
        assert!(approx_eq(b.min_x, 0.2));
        assert!(approx_eq(b.min_y, 0.4));
        assert!(approx_eq(b.width, 0.4));
        assert!(approx_eq(b.height, 0.4));
        let expected = [(0.0, 0.0), (100.0, 0.0), (50.0, 100.0)];
        for ((x, y), (ex, ey)) in b.relative_points.iter().zip(expected) {
            assert!(approx_eq(*x, ex));
            assert!(approx_eq(*y, ey));
        }
    }

    #[test]
    fn test_percentage_box_degenerate() {
        assert!(points_to_percentage_box(&[]).is_none());
        let line = [Point::new(0.1, 0.5), Point::new(0.3, 0.5)];
        let b = points_to_percentage_box(&line).unwrap();
        assert_eq!(b.height, 0.0);
        assert!(b.relative_points.iter().all(|(_, y)| *y == 0.0));
    }

    #[test]
    fn test_polygon_contains() {
        let square = [
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 100.0),
            Point::new(0.0, 100.0),
        ];
        assert!(polygon_contains(&square, Point::new(50.0, 50.0)));
        assert!(!polygon_contains(&square, Point::new(150.0, 50.0)));
        assert!(!polygon_contains(&square[..2], Point::new(50.0, 0.0)));
    }
}
