//! Fill and surface pattern resolution.

use iconclay_core::{ClayColor, ClayStyle, GradientType, SurfacePattern};
use kurbo::Point;

/// Offset of the radial focus from the center, in percent of the box.
pub const RADIAL_FOCUS_OFFSET: f64 = 30.0;
/// Radial gradient radius, in percent of the box.
pub const RADIAL_RADIUS: f64 = 80.0;
/// Pattern tile edge at `patternScale = 1`.
pub const PATTERN_TILE: f64 = 10.0;
pub const PATTERN_ROTATION: f64 = 45.0;
pub const DEFAULT_PATTERN_OPACITY: f64 = 0.1;

/// Resolved base fill of an element.
#[derive(Debug, Clone, PartialEq)]
pub enum Fill {
    Solid(ClayColor),
    /// Bottom-to-top ramp rotated by `angle` degrees about the box center.
    Linear { angle: f64, from: ClayColor, to: ClayColor },
    /// Glow centered at `focus` (percent of the box), fading to `outer`.
    Radial { focus: Point, radius: f64, inner: ClayColor, outer: ClayColor },
}

pub fn resolve_fill(style: &ClayStyle) -> Fill {
    if !style.gradient {
        return Fill::Solid(style.color);
    }
    match style.gradient_type {
        GradientType::Linear => Fill::Linear {
            angle: style.gradient_angle,
            from: style.color,
            to: style.gradient_color,
        },
        GradientType::Radial => Fill::Radial {
            focus: radial_focus(style.light_source),
            radius: RADIAL_RADIUS,
            inner: style.gradient_color,
            outer: style.color,
        },
    }
}

/// Radial focus in percent of the box, pushed away from the light source.
pub fn radial_focus(light_source: f64) -> Point {
    let rad = (light_source + 180.0).to_radians();
    Point::new(
        50.0 + rad.cos() * RADIAL_FOCUS_OFFSET,
        50.0 + rad.sin() * RADIAL_FOCUS_OFFSET,
    )
}

/// One tile of a repeating surface pattern, in user-space units.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternTile {
    pub kind: SurfacePattern,
    /// Tile edge length.
    pub size: f64,
    pub scale: f64,
    pub opacity: f64,
    pub color: ClayColor,
}

impl PatternTile {
    /// Dot radius for `dots`, stroke width for `lines`.
    pub fn mark_size(&self) -> f64 {
        match self.kind {
            SurfacePattern::Dots => 1.5 * self.scale,
            _ => self.scale,
        }
    }
}

/// The pattern tile for a style, `None` when no pattern is set.
///
/// Zero opacity or scale fall back to their defaults.
pub fn pattern_tile(style: &ClayStyle) -> Option<PatternTile> {
    if !style.has_pattern() {
        return None;
    }
    let scale = if style.pattern_scale > 0.0 { style.pattern_scale } else { 1.0 };
    let opacity = if style.pattern_opacity > 0.0 { style.pattern_opacity } else { DEFAULT_PATTERN_OPACITY };
    Some(PatternTile {
        kind: style.surface_pattern,
        size: PATTERN_TILE * scale,
        scale,
        opacity,
        color: if style.gradient { style.gradient_color } else { ClayColor::black() },
    })
}
