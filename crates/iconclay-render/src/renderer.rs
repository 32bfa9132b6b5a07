//! Per-element layer rendering.
//!
//! [`ClayRenderer::render`] is a pure function of the element, an optional
//! mask element and an optional list of union children. It produces an
//! [`ElementLayer`]: SVG definitions plus a body drawn in the element's
//! local space (origin at its top-left corner, unrotated).

use crate::error::RenderError;
use crate::filter::FilterGraph;
use crate::icons::{BuiltinIcons, FALLBACK_ICON, ICON_VIEWBOX, IconGlyph, IconProvider};
use crate::paint::{Fill, pattern_tile, resolve_fill};
use crate::pipeline::build_clay_filter;
use crate::shape::{CornerRadius, Outline, element_outline};
use crate::svg::{
    SVG_NS, escape, fmt_num, paint_attr, place_transform, write_filter, write_gradient, write_outline, write_pattern,
};
use iconclay_core::{CanvasElement, ElementKind, IconLibrary};
use kurbo::{Size, Vec2};
use std::fmt::Write as _;

pub const DEFAULT_FONT_FAMILY: &str = "Inter, sans-serif";
pub const DEFAULT_ICON_STROKE_WIDTH: f64 = 2.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions<'a> {
    /// Element whose silhouette clips the layer.
    pub mask: Option<&'a CanvasElement>,
    /// Children drawn as one union silhouette under the element's style.
    pub merged_children: Option<&'a [&'a CanvasElement]>,
    /// Prepended to every definition id, to keep several renders of the
    /// same element apart in one document.
    pub id_prefix: &'a str,
}

impl<'a> RenderOptions<'a> {
    pub fn with_mask(mut self, mask: &'a CanvasElement) -> Self {
        self.mask = Some(mask);
        self
    }

    pub fn with_merged_children(mut self, children: &'a [&'a CanvasElement]) -> Self {
        self.merged_children = Some(children);
        self
    }

    pub fn with_id_prefix(mut self, prefix: &'a str) -> Self {
        self.id_prefix = prefix;
        self
    }
}

/// Rendered element: definitions plus the painted body.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementLayer {
    pub size: Size,
    pub defs: String,
    pub body: String,
    pub filter: Option<FilterGraph>,
}

impl ElementLayer {
    /// Definitions and body, for embedding in a larger document.
    pub fn write_inline(&self, out: &mut String) {
        if !self.defs.is_empty() {
            let _ = write!(out, "<defs>{}</defs>", self.defs);
        }
        out.push_str(&self.body);
    }

    /// A standalone document sized to the element.
    pub fn to_svg(&self) -> String {
        let (w, h) = (fmt_num(self.size.width), fmt_num(self.size.height));
        let mut out = format!(
            "<svg xmlns=\"{SVG_NS}\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\" overflow=\"visible\">"
        );
        self.write_inline(&mut out);
        out.push_str("</svg>");
        out
    }
}

struct LayerIds {
    gradient: String,
    filter: String,
    pattern: String,
    icon_mask: String,
    layer_mask: String,
}

impl LayerIds {
    fn new(prefix: &str, element: &CanvasElement) -> Self {
        let key = escape(&format!("{prefix}{}", element.id));
        Self {
            gradient: format!("grad-{key}"),
            filter: format!("clay-filter-{key}"),
            pattern: format!("pat-{key}"),
            icon_mask: format!("icon-mask-{key}"),
            layer_mask: format!("layer-mask-{key}"),
        }
    }
}

/// How content is painted in one pass.
struct Paint<'a> {
    fill: &'a str,
    /// Border and text strokes are drawn only on the main pass.
    stroke: bool,
}

pub struct ClayRenderer<P = BuiltinIcons> {
    icons: P,
}

impl Default for ClayRenderer<BuiltinIcons> {
    fn default() -> Self {
        Self::new(BuiltinIcons)
    }
}

impl<P: IconProvider> ClayRenderer<P> {
    pub fn new(icons: P) -> Self {
        Self { icons }
    }

    /// Render one element.
    ///
    /// Unknown icon names draw [`FALLBACK_ICON`]; an error is returned only
    /// when the provider cannot supply that either.
    pub fn render(&self, element: &CanvasElement, options: RenderOptions<'_>) -> Result<ElementLayer, RenderError> {
        let ids = LayerIds::new(options.id_prefix, element);
        let style = &element.style;
        let merged = options.merged_children;
        let mut defs = String::new();

        let fill = resolve_fill(style);
        write_gradient(&mut defs, &ids.gradient, &fill);
        let fill_attr = match fill {
            Fill::Solid(color) => paint_attr("fill", color),
            _ => format!(" fill=\"url(#{})\"", ids.gradient),
        };

        let tile = pattern_tile(style);
        if let Some(tile) = &tile {
            write_pattern(&mut defs, &ids.pattern, tile);
        }

        if element.kind == ElementKind::Icon && merged.is_none() {
            let glyph = self.glyph(element)?;
            write_icon_mask(&mut defs, &ids.icon_mask, element, &glyph);
        }

        if let Some(mask) = options.mask {
            write_layer_mask(&mut defs, &ids.layer_mask, element, mask);
        }

        let filter = build_clay_filter(element.size(), style, element.extrusion());
        if let Some(graph) = &filter {
            write_filter(&mut defs, &ids.filter, graph);
        }

        let mut body = String::new();
        if options.mask.is_some() {
            let _ = write!(body, "<g mask=\"url(#{})\">", ids.layer_mask);
        }
        match &filter {
            Some(_) => {
                let _ = write!(body, "<g filter=\"url(#{})\">", ids.filter);
            }
            None => body.push_str("<g>"),
        }
        write_content(&mut body, element, merged, &ids, &Paint { fill: &fill_attr, stroke: true });
        body.push_str("</g>");

        if tile.is_some() {
            let pattern_fill = format!(" fill=\"url(#{})\"", ids.pattern);
            body.push_str("<g>");
            write_content(&mut body, element, merged, &ids, &Paint { fill: &pattern_fill, stroke: false });
            body.push_str("</g>");
        }
        if options.mask.is_some() {
            body.push_str("</g>");
        }

        Ok(ElementLayer { size: element.size(), defs, body, filter })
    }

    fn glyph(&self, element: &CanvasElement) -> Result<IconGlyph, RenderError> {
        let library = element.icon_lib.unwrap_or_default();
        let name = element.icon_name.as_deref().unwrap_or(FALLBACK_ICON);
        match self.icons.resolve(library, name) {
            Ok(glyph) => Ok(glyph),
            Err(err) => {
                log::warn!("{err}, drawing {FALLBACK_ICON}");
                Ok(self.icons.resolve(IconLibrary::Lucide, FALLBACK_ICON)?)
            }
        }
    }
}

fn write_content(
    out: &mut String,
    element: &CanvasElement,
    merged: Option<&[&CanvasElement]>,
    ids: &LayerIds,
    paint: &Paint<'_>,
) {
    let Some(children) = merged else {
        write_shape(out, element, ids, paint);
        return;
    };

    for child in children {
        let Some(outline) = element_outline(child) else {
            log::warn!("Skipping {:?} element {} in union", child.kind, child.id);
            continue;
        };
        let offset = Vec2::new(child.x - element.x, child.y - element.y);
        let _ = write!(out, "<g transform=\"{}\">", place_transform(offset, child.rotation, child.size()));
        write_outline(out, &outline, &format!("{} stroke=\"none\"", paint.fill));
        out.push_str("</g>");
    }
}

fn write_shape(out: &mut String, element: &CanvasElement, ids: &LayerIds, paint: &Paint<'_>) {
    match element.kind {
        ElementKind::Text => write_text(out, element, paint),
        ElementKind::Icon => {
            let _ = write!(
                out,
                "<rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\"{} mask=\"url(#{})\"/>",
                fmt_num(element.width),
                fmt_num(element.height),
                paint.fill,
                ids.icon_mask
            );
        }
        _ => {
            let Some(outline) = element_outline(element) else {
                return;
            };
            let style = &element.style;
            let mut attrs = paint.fill.to_string();
            if paint.stroke && style.border_width > 0.0 {
                attrs.push_str(&paint_attr("stroke", style.border_color));
                let _ = write!(attrs, " stroke-width=\"{}\"", fmt_num(style.border_width));
            } else {
                attrs.push_str(" stroke=\"none\"");
            }
            write_outline(out, &outline, &attrs);
        }
    }
}

fn write_text(out: &mut String, element: &CanvasElement, paint: &Paint<'_>) {
    out.push_str("<text x=\"50%\" y=\"55%\" dominant-baseline=\"middle\" text-anchor=\"middle\"");
    if let Some(size) = element.font_size {
        let _ = write!(out, " font-size=\"{}\"", fmt_num(size));
    }
    let family = element.font_family.as_deref().unwrap_or(DEFAULT_FONT_FAMILY);
    let _ = write!(out, " font-family=\"{}\"", escape(family));
    if let Some(weight) = &element.font_weight {
        let _ = write!(out, " font-weight=\"{}\"", escape(weight));
    }
    if let Some(spacing) = element.letter_spacing {
        let _ = write!(out, " letter-spacing=\"{}\"", fmt_num(spacing));
    }
    out.push_str(paint.fill);

    let stroke_width = element.text_stroke_width.unwrap_or(0.0);
    match element.text_stroke_color {
        Some(color) if paint.stroke && stroke_width > 0.0 => {
            out.push_str(&paint_attr("stroke", color));
            let _ = write!(out, " stroke-width=\"{}\"", fmt_num(stroke_width));
        }
        _ => out.push_str(" stroke=\"none\""),
    }
    let _ = write!(out, ">{}</text>", escape(element.text.as_deref().unwrap_or_default()));
}

/// Stencil of the glyph, scaled from its 24-unit box to fit the element.
fn write_icon_mask(out: &mut String, id: &str, element: &CanvasElement, glyph: &IconGlyph) {
    let scale = element.width.min(element.height) / ICON_VIEWBOX;
    let tx = (element.width - ICON_VIEWBOX * scale) / 2.0;
    let ty = (element.height - ICON_VIEWBOX * scale) / 2.0;
    let (fill, stroke) = if element.icon_lib.is_some_and(IconLibrary::is_solid) {
        ("white", "none")
    } else {
        ("none", "white")
    };
    let stroke_width = element.text_stroke_width.unwrap_or(DEFAULT_ICON_STROKE_WIDTH);

    let _ = write!(
        out,
        "<mask id=\"{id}\"><g transform=\"translate({}, {}) scale({})\">",
        fmt_num(tx),
        fmt_num(ty),
        fmt_num(scale)
    );
    for d in &glyph.paths {
        let _ = write!(
            out,
            "<path d=\"{}\" fill=\"{fill}\" stroke=\"{stroke}\" stroke-width=\"{}\" stroke-linecap=\"round\" stroke-linejoin=\"round\"/>",
            escape(d),
            fmt_num(stroke_width)
        );
    }
    out.push_str("</g></mask>");
}

/// Clip region from the mask element's silhouette, in the masked element's
/// local space.
fn write_layer_mask(out: &mut String, id: &str, element: &CanvasElement, mask: &CanvasElement) {
    let outline = element_outline(mask).unwrap_or(Outline::Rect {
        size: mask.size(),
        radius: CornerRadius::Fixed(mask.style.border_radius),
    });
    let offset = Vec2::new(mask.x - element.x, mask.y - element.y);
    let _ = write!(
        out,
        "<mask id=\"{id}\" maskUnits=\"userSpaceOnUse\"><g transform=\"{}\">",
        place_transform(offset, mask.rotation, mask.size())
    );
    write_outline(out, &outline, " fill=\"white\"");
    out.push_str("</g></mask>");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IconError;
    use crate::icons::IconSet;
    use iconclay_core::{ClayColor, ClayStyle, ElementId, GradientType, SurfacePattern};
    use kurbo::Rect;

    fn element(kind: ElementKind, rect: Rect) -> CanvasElement {
        let mut el = CanvasElement::new(kind, kind.label(), rect);
        el.id = ElementId::from(format!("{}-1", kind.label().to_lowercase()));
        el.style = kind.default_style(None);
        el
    }

    fn render(el: &CanvasElement, options: RenderOptions<'_>) -> ElementLayer {
        ClayRenderer::default().render(el, options).unwrap()
    }

    #[test]
    fn test_default_rectangle() {
        let el = element(ElementKind::Rounded, Rect::new(10.0, 10.0, 138.0, 138.0));
        let layer = render(&el, RenderOptions::default());

        assert!(layer.filter.is_some());
        assert!(layer.defs.contains("<filter id=\"clay-filter-rounded-1\""));
        assert_eq!(
            layer.body,
            "<g filter=\"url(#clay-filter-rounded-1)\"><rect x=\"0\" y=\"0\" width=\"128\" height=\"128\" rx=\"40\" ry=\"40\" fill=\"#252525\" stroke=\"none\"/></g>"
        );
    }

    #[test]
    fn test_circle_and_border() {
        let mut el = element(ElementKind::Circle, Rect::new(0.0, 0.0, 100.0, 60.0));
        el.style.border_width = 3.0;
        el.style.border_color = ClayColor::rgb(0x44, 0x44, 0x44);
        let layer = render(&el, RenderOptions::default());
        assert!(layer.body.contains("rx=\"50%\" ry=\"50%\""));
        assert!(layer.body.contains("stroke=\"#444444\" stroke-width=\"3\""));
    }

    #[test]
    fn test_flat_style_has_no_filter() {
        let mut el = element(ElementKind::Star, Rect::new(0.0, 0.0, 50.0, 50.0));
        el.style = ClayStyle::flat();
        let layer = render(&el, RenderOptions::default());
        assert!(layer.filter.is_none());
        assert!(!layer.defs.contains("<filter"));
        assert!(layer.body.starts_with("<g><path d=\"M25 0 L"));
    }

    #[test]
    fn test_gradient_fill_reference() {
        let mut el = element(ElementKind::Squircle, Rect::new(0.0, 0.0, 80.0, 80.0));
        el.style.gradient = true;
        el.style.gradient_type = GradientType::Radial;
        let layer = render(&el, RenderOptions::default().with_id_prefix("preview-"));
        assert!(layer.defs.starts_with("<radialGradient id=\"grad-preview-squircle-1\""));
        assert!(layer.body.contains("fill=\"url(#grad-preview-squircle-1)\""));
        assert!(layer.defs.contains("clay-filter-preview-squircle-1"));
    }

    #[test]
    fn test_text_layer() {
        let mut el = element(ElementKind::Text, Rect::new(0.0, 0.0, 200.0, 100.0));
        el.text = Some("A&B".to_string());
        el.font_size = Some(100.0);
        el.font_weight = Some("700".to_string());
        el.text_stroke_color = Some(ClayColor::black());
        el.text_stroke_width = Some(2.0);
        let layer = render(&el, RenderOptions::default());

        assert!(layer.body.contains(
            "<text x=\"50%\" y=\"55%\" dominant-baseline=\"middle\" text-anchor=\"middle\" font-size=\"100\" font-family=\"Inter, sans-serif\" font-weight=\"700\" fill=\"#ffffff\" stroke=\"#000000\" stroke-width=\"2\">A&amp;B</text>"
        ));
    }

    #[test]
    fn test_icon_mask_fits_glyph_box() {
        let mut el = element(ElementKind::Icon, Rect::new(0.0, 0.0, 96.0, 48.0));
        el.icon_name = Some("Check".to_string());
        el.icon_lib = Some(IconLibrary::Lucide);
        let layer = render(&el, RenderOptions::default());

        assert!(layer.defs.contains("<mask id=\"icon-mask-icon-1\"><g transform=\"translate(24, 0) scale(2)\">"));
        assert!(layer.defs.contains("<path d=\"M20 6 9 17l-5-5\" fill=\"none\" stroke=\"white\" stroke-width=\"2\""));
        assert!(layer.body.contains("mask=\"url(#icon-mask-icon-1)\""));
    }

    #[test]
    fn test_solid_icon_and_fallback() {
        let mut el = element(ElementKind::Icon, Rect::new(0.0, 0.0, 48.0, 48.0));
        el.icon_name = Some("NoSuchIcon".to_string());
        el.icon_lib = Some(IconLibrary::HeroiconsSolid);
        let layer = render(&el, RenderOptions::default());
        assert!(layer.defs.contains("M12 17h.01\" fill=\"white\" stroke=\"none\""));

        let renderer = ClayRenderer::new(IconSet::<BuiltinIcons>::new());
        let err = renderer.render(&el, RenderOptions::default()).unwrap_err();
        assert_eq!(
            err,
            RenderError::Icon(IconError::NotFound { library: IconLibrary::Lucide, name: FALLBACK_ICON.to_string() })
        );
    }

    #[test]
    fn test_layer_mask() {
        let el = element(ElementKind::Rectangle, Rect::new(100.0, 100.0, 200.0, 200.0));
        let mut mask = element(ElementKind::Circle, Rect::new(120.0, 90.0, 170.0, 140.0));
        mask.rotation = 30.0;
        let layer = render(&el, RenderOptions::default().with_mask(&mask));

        assert!(layer.defs.contains(
            "<mask id=\"layer-mask-rectangle-1\" maskUnits=\"userSpaceOnUse\"><g transform=\"translate(20, -10) rotate(30, 25, 25)\"><rect x=\"0\" y=\"0\" width=\"50\" height=\"50\" rx=\"50%\" ry=\"50%\" fill=\"white\"/></g></mask>"
        ));
        assert!(layer.body.starts_with("<g mask=\"url(#layer-mask-rectangle-1)\"><g filter="));
        assert!(layer.body.ends_with("</g></g>"));
    }

    #[test]
    fn test_union_children_share_fill() {
        let mut folder = element(ElementKind::Folder, Rect::new(50.0, 50.0, 250.0, 150.0));
        folder.merge = true;
        folder.style.color = ClayColor::rgb(0xff, 0x00, 0x80);
        let mut a = element(ElementKind::Rounded, Rect::new(50.0, 50.0, 150.0, 150.0));
        a.style.border_width = 4.0;
        a.style.border_radius = 12.0;
        let mut b = element(ElementKind::Hexagon, Rect::new(150.0, 60.0, 250.0, 140.0));
        b.rotation = 90.0;
        let text = element(ElementKind::Text, Rect::new(60.0, 60.0, 100.0, 100.0));
        let children = [&a, &b, &text];

        let layer = render(&folder, RenderOptions::default().with_merged_children(&children));
        let body = &layer.body;
        assert!(body.contains(
            "<g transform=\"translate(0, 0) rotate(0, 50, 50)\"><rect x=\"0\" y=\"0\" width=\"100\" height=\"100\" rx=\"12\" ry=\"12\" fill=\"#ff0080\" stroke=\"none\"/></g>"
        ));
        assert!(body.contains("<g transform=\"translate(100, 10) rotate(90, 50, 40)\"><path d="));
        assert!(!body.contains("<text"));
        assert_eq!(body.matches("<g transform=").count(), 2);
        assert!(!body.contains("stroke-width"));
    }

    #[test]
    fn test_pattern_overlay() {
        let mut el = element(ElementKind::Rounded, Rect::new(0.0, 0.0, 64.0, 64.0));
        el.style.surface_pattern = SurfacePattern::Dots;
        let layer = render(&el, RenderOptions::default());

        assert!(layer.defs.contains("<pattern id=\"pat-rounded-1\""));
        assert!(layer.body.ends_with(
            "<g><rect x=\"0\" y=\"0\" width=\"64\" height=\"64\" rx=\"40\" ry=\"40\" fill=\"url(#pat-rounded-1)\" stroke=\"none\"/></g>"
        ));
    }

    #[test]
    fn test_standalone_document() {
        let el = element(ElementKind::Triangle, Rect::new(0.0, 0.0, 30.0, 20.0));
        let svg = render(&el, RenderOptions::default()).to_svg();
        assert!(svg.starts_with(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"30\" height=\"20\" viewBox=\"0 0 30 20\" overflow=\"visible\"><defs>"
        ));
        assert!(svg.ends_with("</g></svg>"));
    }
}
