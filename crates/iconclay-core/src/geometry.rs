//! Geometry helpers: rotated bounds and parametric outline generators.

use crate::element::CanvasElement;
use kurbo::{Affine, BezPath, Point, Rect, Size};
use std::f64::consts::PI;

/// Number of points of a generated star.
pub const STAR_POINTS: usize = 5;

/// Inner radius of a star relative to its outer radius.
pub const STAR_INNER_RATIO: f64 = 0.45;

/// Corners of the element box, rotated about its center.
pub fn element_corners(element: &CanvasElement) -> [Point; 4] {
    let rect = element.rect();
    let transform = Affine::rotate_about(element.rotation.to_radians(), rect.center());
    [
        transform * Point::new(rect.x0, rect.y0),
        transform * Point::new(rect.x1, rect.y0),
        transform * Point::new(rect.x1, rect.y1),
        transform * Point::new(rect.x0, rect.y1),
    ]
}

/// Axis-aligned bounding box of a possibly rotated element.
pub fn element_bounds(element: &CanvasElement) -> Rect {
    if element.rotation == 0.0 {
        return element.rect();
    }

    let corners = element_corners(element);
    let mut bounds = Rect::from_points(corners[0], corners[1]);
    for corner in &corners[2..] {
        bounds = bounds.union_pt(*corner);
    }
    bounds
}

/// Closed regular polygon inscribed in a `size` box, first vertex at the top.
///
/// The radius is half the shorter side so the polygon stays regular.
pub fn polygon_path(size: Size, sides: usize) -> BezPath {
    let mut path = BezPath::new();
    if sides < 3 {
        return path;
    }

    let center = Point::new(size.width / 2.0, size.height / 2.0);
    let radius = size.width.min(size.height) / 2.0;
    for i in 0..sides {
        let angle = -PI / 2.0 + i as f64 * 2.0 * PI / sides as f64;
        let p = Point::new(center.x + radius * angle.cos(), center.y + radius * angle.sin());
        if i == 0 {
            path.move_to(p);
        } else {
            path.line_to(p);
        }
    }
    path.close_path();
    path
}

/// Closed star alternating outer and inner radius, first point at the top.
pub fn star_path(size: Size, points: usize, inner_ratio: f64) -> BezPath {
    let mut path = BezPath::new();
    if points < 2 {
        return path;
    }

    let center = Point::new(size.width / 2.0, size.height / 2.0);
    let outer = size.width.min(size.height) / 2.0;
    let inner = outer * inner_ratio;
    let step = PI / points as f64;
    for i in 0..points * 2 {
        let radius = if i % 2 == 0 { outer } else { inner };
        let angle = -PI / 2.0 + i as f64 * step;
        let p = Point::new(center.x + radius * angle.cos(), center.y + radius * angle.sin());
        if i == 0 {
            path.move_to(p);
        } else {
            path.line_to(p);
        }
    }
    path.close_path();
    path
}

/// Four-segment cubic approximation of a superellipse filling `size`.
pub fn squircle_path(size: Size) -> BezPath {
    let (w, h) = (size.width, size.height);
    let mut path = BezPath::new();
    path.move_to((w * 0.5, 0.0));
    path.curve_to((w * 0.9, 0.0), (w, h * 0.1), (w, h * 0.5));
    path.curve_to((w, h * 0.9), (w * 0.9, h), (w * 0.5, h));
    path.curve_to((w * 0.1, h), (0.0, h * 0.9), (0.0, h * 0.5));
    path.curve_to((0.0, h * 0.1), (w * 0.1, 0.0), (w * 0.5, 0.0));
    path.close_path();
    path
}

/// Whether `point` lies inside the rotated box of `element`.
pub fn element_contains(element: &CanvasElement, point: Point) -> bool {
    let rect = element.rect();
    let local = Affine::rotate_about(-element.rotation.to_radians(), rect.center()) * point;
    rect.contains(local)
}
