//! SVG serialization helpers: numbers, paths, paints and filter graphs.

use crate::filter::{ColorMatrix, CompositeOp, FilterGraph, FilterOp, Input};
use crate::paint::{Fill, PatternTile, PATTERN_ROTATION};
use crate::shape::{CornerRadius, Outline};
use iconclay_core::{ClayColor, SurfacePattern};
use kurbo::{BezPath, PathEl, Size, Vec2};
use std::fmt::Write as _;

pub const SVG_NS: &str = "http://www.w3.org/2000/svg";

const IDENTITY_MATRIX: &str = "1 0 0 0 0  0 1 0 0 0  0 0 1 0 0  0 0 0 1 0";

/// Compact number: integers without decimals, others to three places.
pub fn fmt_num(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_string();
    }
    let rounded = v.round();
    if (rounded - v).abs() < 1e-6 {
        // Avoid "-0".
        return format!("{}", rounded as i64);
    }

    let mut s = format!("{v:.3}");
    while s.contains('.') && s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.pop();
    }
    if s == "-0" { "0".to_string() } else { s }
}

pub fn path_data(path: &BezPath) -> String {
    let mut d = String::new();
    for el in path.iter() {
        if !d.is_empty() {
            d.push(' ');
        }
        match el {
            PathEl::MoveTo(p) => {
                let _ = write!(d, "M{} {}", fmt_num(p.x), fmt_num(p.y));
            }
            PathEl::LineTo(p) => {
                let _ = write!(d, "L{} {}", fmt_num(p.x), fmt_num(p.y));
            }
            PathEl::QuadTo(p1, p2) => {
                let _ = write!(d, "Q{} {} {} {}", fmt_num(p1.x), fmt_num(p1.y), fmt_num(p2.x), fmt_num(p2.y));
            }
            PathEl::CurveTo(p1, p2, p3) => {
                let _ = write!(
                    d,
                    "C{} {} {} {} {} {}",
                    fmt_num(p1.x),
                    fmt_num(p1.y),
                    fmt_num(p2.x),
                    fmt_num(p2.y),
                    fmt_num(p3.x),
                    fmt_num(p3.y)
                );
            }
            PathEl::ClosePath => d.push('Z'),
        }
    }
    d
}

/// Escape text content and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Opacity attribute paired with a color attribute.
fn opacity_attr(name: &str) -> String {
    match name {
        "stop-color" => "stop-opacity".to_string(),
        _ => format!("{name}-opacity"),
    }
}

/// ` {name}="#rrggbb"` plus a matching opacity attribute when translucent.
///
/// Fully transparent paints become `none`; stop colors have no `none`, so
/// they keep the color at zero opacity.
pub fn paint_attr(name: &str, color: ClayColor) -> String {
    let is_stop = name == "stop-color";
    if color.a == 0 && !is_stop {
        return format!(" {name}=\"none\"");
    }
    let mut attr = format!(" {name}=\"{}\"", color.rgb_hex());
    if !color.is_opaque() {
        let _ = write!(attr, " {}=\"{}\"", opacity_attr(name), fmt_num(color.alpha()));
    }
    attr
}

fn input_name(input: &Input) -> &'static str {
    match input {
        Input::SourceGraphic => "SourceGraphic",
        Input::SourceAlpha => "SourceAlpha",
        Input::Slot(slot) => slot.name(),
    }
}

fn composite_name(op: CompositeOp) -> &'static str {
    match op {
        CompositeOp::In => "in",
        CompositeOp::Out => "out",
        CompositeOp::Over => "over",
    }
}

/// Write `graph` as a `<filter>` element.
pub fn write_filter(out: &mut String, id: &str, graph: &FilterGraph) {
    let region = graph.region();
    let _ = write!(
        out,
        "<filter id=\"{id}\" x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" filterUnits=\"userSpaceOnUse\" color-interpolation-filters=\"linearRGB\">",
        fmt_num(region.x0),
        fmt_num(region.y0),
        fmt_num(region.width()),
        fmt_num(region.height())
    );

    for primitive in graph.primitives() {
        let result = primitive
            .result
            .map(|slot| format!(" result=\"{}\"", slot.name()))
            .unwrap_or_default();
        match &primitive.op {
            FilterOp::Dilate { input, radius } => {
                let _ = write!(
                    out,
                    "<feMorphology in=\"{}\" operator=\"dilate\" radius=\"{}\"{result}/>",
                    input_name(input),
                    fmt_num(*radius)
                );
            }
            FilterOp::ColorMatrix { input, matrix } => {
                let (kind, values) = match matrix {
                    ColorMatrix::Identity => ("matrix", IDENTITY_MATRIX.to_string()),
                    ColorMatrix::Saturate(s) => ("saturate", fmt_num(*s)),
                };
                let _ = write!(
                    out,
                    "<feColorMatrix in=\"{}\" type=\"{kind}\" values=\"{values}\"{result}/>",
                    input_name(input)
                );
            }
            FilterOp::DropShadow { input, dx, dy, std_deviation, color, opacity } => {
                let _ = write!(
                    out,
                    "<feDropShadow in=\"{}\" dx=\"{}\" dy=\"{}\" stdDeviation=\"{}\" flood-color=\"{}\" flood-opacity=\"{}\"{result}/>",
                    input_name(input),
                    fmt_num(*dx),
                    fmt_num(*dy),
                    fmt_num(*std_deviation),
                    color.rgb_hex(),
                    fmt_num(opacity * color.alpha())
                );
            }
            FilterOp::GaussianBlur { input, std_deviation } => {
                let _ = write!(
                    out,
                    "<feGaussianBlur in=\"{}\" stdDeviation=\"{}\"{result}/>",
                    input_name(input),
                    fmt_num(*std_deviation)
                );
            }
            FilterOp::SpecularLighting { input, surface_scale, specular_constant, specular_exponent, color, light } => {
                let _ = write!(
                    out,
                    "<feSpecularLighting in=\"{}\" surfaceScale=\"{}\" specularConstant=\"{}\" specularExponent=\"{}\" lighting-color=\"{}\"{result}><feDistantLight azimuth=\"{}\" elevation=\"{}\"/></feSpecularLighting>",
                    input_name(input),
                    fmt_num(*surface_scale),
                    fmt_num(*specular_constant),
                    fmt_num(*specular_exponent),
                    color.rgb_hex(),
                    fmt_num(light.azimuth),
                    fmt_num(light.elevation)
                );
            }
            FilterOp::Composite { input, input2, op } => {
                let _ = write!(
                    out,
                    "<feComposite in=\"{}\" in2=\"{}\" operator=\"{}\"{result}/>",
                    input_name(input),
                    input_name(input2),
                    composite_name(*op)
                );
            }
            FilterOp::Flood { color, opacity } => {
                let _ = write!(
                    out,
                    "<feFlood flood-color=\"{}\" flood-opacity=\"{}\"{result}/>",
                    color.rgb_hex(),
                    fmt_num(opacity * color.alpha())
                );
            }
            FilterOp::Offset { input, dx, dy } => {
                let _ = write!(
                    out,
                    "<feOffset in=\"{}\" dx=\"{}\" dy=\"{}\"{result}/>",
                    input_name(input),
                    fmt_num(*dx),
                    fmt_num(*dy)
                );
            }
            FilterOp::Turbulence { base_frequency, octaves } => {
                let _ = write!(
                    out,
                    "<feTurbulence type=\"fractalNoise\" baseFrequency=\"{}\" numOctaves=\"{octaves}\" stitchTiles=\"stitch\"{result}/>",
                    fmt_num(*base_frequency)
                );
            }
            FilterOp::AlphaSlope { input, slope } => {
                let _ = write!(
                    out,
                    "<feComponentTransfer in=\"{}\"{result}><feFuncA type=\"linear\" slope=\"{}\"/></feComponentTransfer>",
                    input_name(input),
                    fmt_num(*slope)
                );
            }
            FilterOp::Merge(inputs) => {
                let _ = write!(out, "<feMerge{result}>");
                for input in inputs {
                    let _ = write!(out, "<feMergeNode in=\"{}\"/>", input_name(input));
                }
                out.push_str("</feMerge>");
            }
        }
    }
    out.push_str("</filter>");
}

/// Write the gradient definition for `fill`; solid fills write nothing.
pub fn write_gradient(out: &mut String, id: &str, fill: &Fill) {
    match fill {
        Fill::Solid(_) => {}
        Fill::Linear { angle, from, to } => {
            let _ = write!(
                out,
                "<linearGradient id=\"{id}\" x1=\"0%\" y1=\"100%\" x2=\"0%\" y2=\"0%\" gradientTransform=\"rotate({} .5 .5)\">",
                fmt_num(*angle)
            );
            write_stop(out, "0%", *from);
            write_stop(out, "100%", *to);
            out.push_str("</linearGradient>");
        }
        Fill::Radial { focus, radius, inner, outer } => {
            let (cx, cy) = (fmt_num(focus.x), fmt_num(focus.y));
            let _ = write!(
                out,
                "<radialGradient id=\"{id}\" cx=\"{cx}%\" cy=\"{cy}%\" r=\"{}%\" fx=\"{cx}%\" fy=\"{cy}%\">",
                fmt_num(*radius)
            );
            write_stop(out, "0%", *inner);
            write_stop(out, "100%", *outer);
            out.push_str("</radialGradient>");
        }
    }
}

fn write_stop(out: &mut String, offset: &str, color: ClayColor) {
    let _ = write!(out, "<stop offset=\"{offset}\"{}/>", paint_attr("stop-color", color));
}

pub fn write_pattern(out: &mut String, id: &str, tile: &PatternTile) {
    let size = fmt_num(tile.size);
    let _ = write!(
        out,
        "<pattern id=\"{id}\" width=\"{size}\" height=\"{size}\" patternUnits=\"userSpaceOnUse\" patternTransform=\"rotate({})\"><g opacity=\"{}\">",
        fmt_num(PATTERN_ROTATION),
        fmt_num(tile.opacity)
    );
    let mark = fmt_num(tile.mark_size());
    let color = tile.color.rgb_hex();
    match tile.kind {
        SurfacePattern::Dots => {
            let half = fmt_num(tile.size / 2.0);
            let _ = write!(out, "<circle cx=\"{half}\" cy=\"{half}\" r=\"{mark}\" fill=\"{color}\"/>");
        }
        SurfacePattern::Lines => {
            let _ = write!(
                out,
                "<path d=\"M 0 {size} L {size} 0\" stroke=\"{color}\" stroke-width=\"{mark}\"/>"
            );
        }
        SurfacePattern::Grid => {
            let _ = write!(
                out,
                "<path d=\"M {size} 0 L 0 0 L 0 {size}\" fill=\"none\" stroke=\"{color}\" stroke-width=\"{mark}\"/>"
            );
        }
        SurfacePattern::None => {}
    }
    out.push_str("</g></pattern>");
}

/// `translate(dx, dy) rotate(r, w/2, h/2)`: place a box of `size` at
/// `offset` and spin it about its own center.
pub fn place_transform(offset: Vec2, rotation: f64, size: Size) -> String {
    format!(
        "translate({}, {}) rotate({}, {}, {})",
        fmt_num(offset.x),
        fmt_num(offset.y),
        fmt_num(rotation),
        fmt_num(size.width / 2.0),
        fmt_num(size.height / 2.0)
    )
}

/// Write `outline` as a `<rect>` or `<path>` with extra attributes appended.
pub fn write_outline(out: &mut String, outline: &Outline, attrs: &str) {
    match outline {
        Outline::Rect { size, radius } => {
            let (rx, ry) = match radius {
                CornerRadius::Half => ("50%".to_string(), "50%".to_string()),
                CornerRadius::Fixed(r) => (fmt_num(*r), fmt_num(*r)),
            };
            let _ = write!(
                out,
                "<rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" rx=\"{rx}\" ry=\"{ry}\"{attrs}/>",
                fmt_num(size.width),
                fmt_num(size.height)
            );
        }
        Outline::Path(path) => {
            let _ = write!(out, "<path d=\"{}\"{attrs}/>", path_data(path));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Slot;
    use crate::pipeline::build_clay_filter;
    use iconclay_core::ClayStyle;

    #[test]
    fn test_fmt_num() {
        assert_eq!(fmt_num(12.0), "12");
        assert_eq!(fmt_num(-0.0), "0");
        assert_eq!(fmt_num(0.75), "0.75");
        assert_eq!(fmt_num(1.0 / 3.0), "0.333");
        assert_eq!(fmt_num(-1e-9), "0");
        assert_eq!(fmt_num(f64::NAN), "0");
    }

    #[test]
    fn test_place_transform() {
        assert_eq!(
            place_transform(Vec2::new(-20.0, 12.5), 45.0, Size::new(100.0, 50.0)),
            "translate(-20, 12.5) rotate(45, 50, 25)"
        );
    }

    #[test]
    fn test_path_data() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((10.5, 0.0));
        path.curve_to((1.0, 2.0), (3.0, 4.0), (5.0, 6.0));
        path.close_path();
        assert_eq!(path_data(&path), "M0 0 L10.5 0 C1 2 3 4 5 6 Z");
    }

    #[test]
    fn test_paint_attr() {
        assert_eq!(paint_attr("fill", ClayColor::rgb(255, 0, 0)), " fill=\"#ff0000\"");
        assert_eq!(paint_attr("fill", ClayColor::transparent()), " fill=\"none\"");
        assert_eq!(
            paint_attr("stop-color", ClayColor::new(0, 0, 0, 51)),
            " stop-color=\"#000000\" stop-opacity=\"0.2\""
        );
        assert_eq!(
            paint_attr("stop-color", ClayColor::new(255, 0, 0, 0)),
            " stop-color=\"#ff0000\" stop-opacity=\"0\""
        );
        assert_eq!(
            paint_attr("stroke", ClayColor::new(0, 0, 255, 128)),
            " stroke=\"#0000ff\" stroke-opacity=\"0.502\""
        );
        assert_eq!(escape("<a & \"b\">"), "&lt;a &amp; &quot;b&quot;&gt;");
    }

    #[test]
    fn test_filter_markup() {
        let graph = build_clay_filter(Size::new(100.0, 100.0), &ClayStyle::default(), 0.0).unwrap();
        let mut out = String::new();
        write_filter(&mut out, "clay-filter-a", &graph);

        assert!(out.starts_with(
            "<filter id=\"clay-filter-a\" x=\"-80\" y=\"-80\" width=\"260\" height=\"260\" filterUnits=\"userSpaceOnUse\" color-interpolation-filters=\"linearRGB\">"
        ));
        assert!(out.contains(&format!("<feColorMatrix in=\"SourceAlpha\" type=\"matrix\" values=\"{IDENTITY_MATRIX}\" result=\"BASE_ALPHA\"/>")));
        assert!(out.contains("<feDistantLight azimuth=\"45\" elevation=\"40\"/>"));
        assert!(out.contains("<feDistantLight azimuth=\"225\" elevation=\"40\"/>"));
        assert!(out.contains("<feComposite in=\"BASE_ALPHA\" in2=\"OFF_H\" operator=\"out\" result=\"BEVEL_H_RAW\"/>"));
        assert!(out.ends_with(
            "<feMerge><feMergeNode in=\"DROP_SHADOW\"/><feMergeNode in=\"SourceGraphic\"/><feMergeNode in=\"SHADOW_PASS\"/><feMergeNode in=\"LIGHT_PASS\"/><feMergeNode in=\"BEVEL_SHADOW\"/><feMergeNode in=\"BEVEL_HIGHLIGHT\"/><feMergeNode in=\"GLOSS\"/></feMerge></filter>"
        ));

        // Every named result appears in document order before it is read.
        let light = out.find(&format!("result=\"{}\"", Slot::LIGHT_PASS.name())).unwrap();
        let merge = out.find("<feMerge>").unwrap();
        assert!(light < merge);
    }

    #[test]
    fn test_gradient_markup() {
        let mut out = String::new();
        let fill = Fill::Linear { angle: 135.0, from: ClayColor::black(), to: ClayColor::white() };
        write_gradient(&mut out, "grad-a", &fill);
        assert_eq!(
            out,
            "<linearGradient id=\"grad-a\" x1=\"0%\" y1=\"100%\" x2=\"0%\" y2=\"0%\" gradientTransform=\"rotate(135 .5 .5)\"><stop offset=\"0%\" stop-color=\"#000000\"/><stop offset=\"100%\" stop-color=\"#ffffff\"/></linearGradient>"
        );

        let mut solid = String::new();
        write_gradient(&mut solid, "grad-b", &Fill::Solid(ClayColor::black()));
        assert!(solid.is_empty());

        let mut fade = String::new();
        let fill = Fill::Linear { angle: 0.0, from: ClayColor::new(0, 0, 0, 51), to: ClayColor::transparent() };
        write_gradient(&mut fade, "grad-c", &fill);
        assert!(fade.contains("<stop offset=\"0%\" stop-color=\"#000000\" stop-opacity=\"0.2\"/>"));
        assert!(fade.contains("<stop offset=\"100%\" stop-color=\"#000000\" stop-opacity=\"0\"/>"));
        assert!(!fade.contains("color-opacity"));
    }

    #[test]
    fn test_pattern_markup() {
        let tile = PatternTile {
            kind: SurfacePattern::Lines,
            size: 10.0,
            scale: 1.0,
            opacity: 0.1,
            color: ClayColor::black(),
        };
        let mut out = String::new();
        write_pattern(&mut out, "pat-a", &tile);
        assert_eq!(
            out,
            "<pattern id=\"pat-a\" width=\"10\" height=\"10\" patternUnits=\"userSpaceOnUse\" patternTransform=\"rotate(45)\"><g opacity=\"0.1\"><path d=\"M 0 10 L 10 0\" stroke=\"#000000\" stroke-width=\"1\"/></g></pattern>"
        );
    }
}
