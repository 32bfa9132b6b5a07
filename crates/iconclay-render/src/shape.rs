//! Silhouette dispatch by element kind.

use iconclay_core::geometry::{STAR_INNER_RATIO, STAR_POINTS, polygon_path, squircle_path, star_path};
use iconclay_core::{CanvasElement, ElementKind};
use kurbo::{BezPath, Ellipse, Rect, RoundedRect, Shape, Size};

const PATH_TOLERANCE: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CornerRadius {
    /// Half of each side, so the box becomes an ellipse.
    Half,
    Fixed(f64),
}

/// Local-space silhouette of a plain shape, anchored at the origin.
#[derive(Debug, Clone, PartialEq)]
pub enum Outline {
    Rect { size: Size, radius: CornerRadius },
    Path(BezPath),
}

impl Outline {
    /// The silhouette as a path, for hit regions and clip geometry.
    pub fn to_path(&self) -> BezPath {
        match self {
            Outline::Rect { size, radius } => {
                let rect = Rect::from_origin_size((0.0, 0.0), *size);
                match radius {
                    CornerRadius::Half => Ellipse::from_rect(rect).to_path(PATH_TOLERANCE),
                    CornerRadius::Fixed(r) => {
                        let r = r.max(0.0).min(size.width / 2.0).min(size.height / 2.0);
                        RoundedRect::from_rect(rect, r).to_path(PATH_TOLERANCE)
                    }
                }
            }
            Outline::Path(path) => path.clone(),
        }
    }
}

/// Silhouette of `kind` at `size`; `None` for text, icons and folders.
pub fn outline_for(kind: ElementKind, size: Size, border_radius: f64) -> Option<Outline> {
    let outline = match kind {
        ElementKind::Triangle => Outline::Path(polygon_path(size, 3)),
        ElementKind::Hexagon => Outline::Path(polygon_path(size, 6)),
        ElementKind::Star => Outline::Path(star_path(size, STAR_POINTS, STAR_INNER_RATIO)),
        ElementKind::Squircle => Outline::Path(squircle_path(size)),
        ElementKind::Circle => Outline::Rect { size, radius: CornerRadius::Half },
        ElementKind::Rectangle | ElementKind::Rounded => Outline::Rect { size, radius: CornerRadius::Fixed(border_radius) },
        ElementKind::Text | ElementKind::Icon | ElementKind::Folder => return None,
    };
    Some(outline)
}

pub fn element_outline(element: &CanvasElement) -> Option<Outline> {
    outline_for(element.kind, element.size(), element.style.border_radius)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{PathEl, Point};

    const SIZE: Size = Size::new(100.0, 80.0);

    fn vertices(path: &BezPath) -> Vec<Point> {
        path.elements()
            .iter()
            .filter_map(|el| match el {
                PathEl::MoveTo(p) | PathEl::LineTo(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_dispatch() {
        assert_eq!(
            outline_for(ElementKind::Circle, SIZE, 40.0),
            Some(Outline::Rect { size: SIZE, radius: CornerRadius::Half })
        );
        assert_eq!(
            outline_for(ElementKind::Rounded, SIZE, 12.0),
            Some(Outline::Rect { size: SIZE, radius: CornerRadius::Fixed(12.0) })
        );
        assert!(outline_for(ElementKind::Text, SIZE, 0.0).is_none());
        assert!(outline_for(ElementKind::Folder, SIZE, 0.0).is_none());
    }

    #[test]
    fn test_polygon_vertex_counts() {
        let Some(Outline::Path(triangle)) = outline_for(ElementKind::Triangle, SIZE, 0.0) else {
            panic!("expected path");
        };
        let points = vertices(&triangle);
        assert_eq!(points.len(), 3);
        // First vertex at the top center.
        assert!((points[0].x - 50.0).abs() < 1e-9);
        assert!((points[0].y).abs() < 1e-9);

        let Some(Outline::Path(star)) = outline_for(ElementKind::Star, SIZE, 0.0) else {
            panic!("expected path");
        };
        assert_eq!(vertices(&star).len(), 10);
    }

    #[test]
    fn test_rect_path_clamps_radius() {
        let outline = Outline::Rect { size: Size::new(20.0, 10.0), radius: CornerRadius::Fixed(999.0) };
        let bbox = outline.to_path().bounding_box();
        assert!((bbox.width() - 20.0).abs() < 1e-6);
        assert!((bbox.height() - 10.0).abs() < 1e-6);
    }
}
