//! Smart alignment guides and grid snapping.

use crate::element::{CanvasElement, ElementKind};
use kurbo::{Point, Rect, Size, Vec2};

/// Default snap distance in screen pixels.
pub const SMART_GUIDE_THRESHOLD: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuideOrientation {
    Horizontal,
    Vertical,
}

/// An alignment hint shown while dragging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Guide {
    pub orientation: GuideOrientation,
    /// Canvas coordinate of the guide line.
    pub position: f64,
    /// Center alignments are drawn in a distinct color.
    pub is_center: bool,
}

/// Result of a smart guide query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SmartGuides {
    pub snap_dx: f64,
    pub snap_dy: f64,
    pub guides: Vec<Guide>,
}

impl SmartGuides {
    pub fn is_snapped(&self) -> bool {
        !self.guides.is_empty()
    }

    pub fn snapped_x(&self) -> bool {
        self.guides.iter().any(|g| g.orientation == GuideOrientation::Vertical)
    }

    pub fn snapped_y(&self) -> bool {
        self.guides.iter().any(|g| g.orientation == GuideOrientation::Horizontal)
    }

    pub fn offset(&self) -> Vec2 {
        Vec2::new(self.snap_dx, self.snap_dy)
    }
}

#[derive(Clone, Copy)]
struct Target {
    value: f64,
    is_center: bool,
}

fn axis_targets(extent: f64, others: &[&CanvasElement], span: impl Fn(&CanvasElement) -> (f64, f64)) -> Vec<Target> {
    let mut targets = vec![
        Target { value: 0.0, is_center: false },
        Target { value: extent / 2.0, is_center: true },
        Target { value: extent, is_center: false },
    ];
    for el in others {
        if !el.visible || el.locked || el.kind == ElementKind::Folder {
            continue;
        }
        let (start, len) = span(el);
        targets.push(Target { value: start, is_center: false });
        targets.push(Target { value: start + len / 2.0, is_center: true });
        targets.push(Target { value: start + len, is_center: false });
    }
    targets
}

/// First target within `threshold` of the moving edges, checked center first.
fn snap_axis(edges: [f64; 3], targets: &[Target], threshold: f64) -> Option<(f64, Target)> {
    for target in targets {
        for edge in edges {
            if (edge - target.value).abs() < threshold {
                return Some((target.value - edge, *target));
            }
        }
    }
    None
}

/// Find the snap offset that aligns `moving` with the canvas or another element.
///
/// `threshold` is in screen pixels and is converted to canvas units by
/// dividing by `zoom`. Each axis snaps to at most one target.
pub fn compute_smart_guides(
    moving: Rect,
    others: &[&CanvasElement],
    canvas: Size,
    zoom: f64,
    threshold: f64,
) -> SmartGuides {
    let threshold = threshold / zoom.max(f64::EPSILON);
    let mut result = SmartGuides::default();

    let x_targets = axis_targets(canvas.width, others, |el| (el.x, el.width));
    let x_edges = [moving.x0 + moving.width() / 2.0, moving.x0, moving.x1];
    if let Some((dx, target)) = snap_axis(x_edges, &x_targets, threshold) {
        result.snap_dx = dx;
        result.guides.push(Guide {
            orientation: GuideOrientation::Vertical,
            position: target.value,
            is_center: target.is_center,
        });
    }

    let y_targets = axis_targets(canvas.height, others, |el| (el.y, el.height));
    let y_edges = [moving.y0 + moving.height() / 2.0, moving.y0, moving.y1];
    if let Some((dy, target)) = snap_axis(y_edges, &y_targets, threshold) {
        result.snap_dy = dy;
        result.guides.push(Guide {
            orientation: GuideOrientation::Horizontal,
            position: target.value,
            is_center: target.is_center,
        });
    }

    result
}

/// Round a value to the nearest multiple of `grid`.
pub fn snap_value(value: f64, grid: f64) -> f64 {
    if grid <= 0.0 {
        return value;
    }
    (value / grid).round() * grid
}

/// Snap a point to the nearest grid intersection.
pub fn snap_to_grid(point: Point, grid: f64) -> Point {
    Point::new(snap_value(point.x, grid), snap_value(point.y, grid))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANVAS: Size = Size::new(512.0, 512.0);

    fn el(x: f64, y: f64, w: f64, h: f64) -> CanvasElement {
        CanvasElement::new(ElementKind::Rectangle, "r", Rect::new(x, y, x + w, y + h))
    }

    #[test]
    fn test_snaps_to_canvas_center() {
        // Center at 254.5 is 1.5 away from 256
        let moving = Rect::new(190.5, 100.0, 318.5, 140.0);
        let result = compute_smart_guides(moving, &[], CANVAS, 1.0, SMART_GUIDE_THRESHOLD);
        let vertical: Vec<_> = result
            .guides
            .iter()
            .filter(|g| g.orientation == GuideOrientation::Vertical)
            .collect();
        assert_eq!(vertical.len(), 1);
        assert_eq!(vertical[0].position, 256.0);
        assert!(vertical[0].is_center);
        assert!((result.snap_dx - 1.5).abs() < f64::EPSILON);
        assert!(result.snapped_x());
        assert!(!result.snapped_y());
    }

    #[test]
    fn test_threshold_scales_with_zoom() {
        let moving = Rect::new(3.0, 300.0, 43.0, 340.0);
        let far = compute_smart_guides(moving, &[], CANVAS, 2.0, SMART_GUIDE_THRESHOLD);
        assert!(!far.snapped_x());
        let near = compute_smart_guides(moving, &[], CANVAS, 1.0, SMART_GUIDE_THRESHOLD);
        assert!(near.snapped_x());
        assert!((near.snap_dx + 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_strict_threshold() {
        let moving = Rect::new(5.0, 300.0, 45.0, 340.0);
        let result = compute_smart_guides(moving, &[], CANVAS, 1.0, SMART_GUIDE_THRESHOLD);
        assert!(!result.snapped_x());
    }

    #[test]
    fn test_snaps_to_other_element_edge() {
        let other = el(100.0, 100.0, 50.0, 50.0);
        let moving = Rect::new(152.0, 400.0, 172.0, 420.0);
        let result = compute_smart_guides(moving, &[&other], CANVAS, 1.0, SMART_GUIDE_THRESHOLD);
        assert!((result.snap_dx + 2.0).abs() < f64::EPSILON);
        assert_eq!(result.guides[0].position, 150.0);
        assert!(!result.guides[0].is_center);
    }

    #[test]
    fn test_ignores_hidden_locked_and_folders() {
        let mut hidden = el(100.0, 100.0, 50.0, 50.0);
        hidden.visible = false;
        let mut locked = el(100.0, 100.0, 50.0, 50.0);
        locked.locked = true;
        let folder = CanvasElement::new(ElementKind::Folder, "f", Rect::new(100.0, 100.0, 150.0, 150.0));
        let moving = Rect::new(152.0, 400.0, 172.0, 420.0);
        let result = compute_smart_guides(moving, &[&hidden, &locked, &folder], CANVAS, 1.0, SMART_GUIDE_THRESHOLD);
        assert!(!result.snapped_x());
    }

    #[test]
    fn test_snap_to_grid() {
        let p = snap_to_grid(Point::new(23.0, 41.0), 16.0);
        assert_eq!(p, Point::new(16.0, 48.0));
        assert_eq!(snap_value(7.0, 0.0), 7.0);
    }
}
