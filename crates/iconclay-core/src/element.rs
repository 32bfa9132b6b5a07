//! Scene elements: identity, geometry, hierarchy links and type-specific props.

use crate::style::{ClayColor, ClayStyle, StylePatch};
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum width/height of any element after an edit.
pub const MIN_ELEMENT_SIZE: f64 = 1.0;

/// Unique element identifier.
///
/// Fresh ids are UUID v4 strings; ids loaded from project files may be any
/// string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ElementId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Element discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Rectangle,
    Circle,
    Rounded,
    Squircle,
    Triangle,
    Star,
    Hexagon,
    Text,
    Icon,
    Folder,
}

impl ElementKind {
    /// Display label used when naming new elements.
    pub fn label(self) -> &'static str {
        match self {
            ElementKind::Rectangle => "Rectangle",
            ElementKind::Circle => "Circle",
            ElementKind::Rounded => "Rounded",
            ElementKind::Squircle => "Squircle",
            ElementKind::Triangle => "Triangle",
            ElementKind::Star => "Star",
            ElementKind::Hexagon => "Hexagon",
            ElementKind::Text => "Text",
            ElementKind::Icon => "Icon",
            ElementKind::Folder => "Folder",
        }
    }

    /// Text and icons carry glyph content rather than a plain silhouette.
    pub fn is_glyph(self) -> bool {
        matches!(self, ElementKind::Text | ElementKind::Icon)
    }

    /// Whether the kind can take part in a union or a mask pairing.
    pub fn is_plain_shape(self) -> bool {
        !matches!(self, ElementKind::Text | ElementKind::Icon | ElementKind::Folder)
    }

    /// Size of a freshly added element.
    pub fn default_size(self) -> Size {
        match self {
            ElementKind::Text => Size::new(200.0, 100.0),
            ElementKind::Icon => Size::new(200.0, 200.0),
            ElementKind::Folder => Size::new(100.0, 100.0),
            _ => Size::new(128.0, 128.0),
        }
    }

    /// Style of a freshly added element of this kind.
    ///
    /// `canvas_fill` is the opaque canvas background, if any; new shapes
    /// take it as their base color so they read as part of the surface.
    pub fn default_style(self, canvas_fill: Option<ClayColor>) -> ClayStyle {
        match self {
            ElementKind::Text | ElementKind::Icon => ClayStyle::flat(),
            ElementKind::Folder => ClayStyle::default(),
            _ => {
                let base = ClayStyle::default();
                ClayStyle {
                    border_radius: match self {
                        ElementKind::Circle => 999.0,
                        ElementKind::Rectangle => 0.0,
                        _ => 40.0,
                    },
                    color: canvas_fill.unwrap_or(base.color),
                    depth: match self {
                        ElementKind::Triangle | ElementKind::Star | ElementKind::Hexagon => 10.0,
                        _ => base.depth,
                    },
                    ..base
                }
            }
        }
    }
}

/// Icon set a glyph is looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IconLibrary {
    #[default]
    Lucide,
    HeroiconsOutline,
    HeroiconsSolid,
}

impl IconLibrary {
    /// Solid glyphs are filled, the others are stroked outlines.
    pub fn is_solid(self) -> bool {
        self == IconLibrary::HeroiconsSolid
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

fn is_false(v: &bool) -> bool {
    !*v
}

/// A node of the scene.
///
/// Coordinates are absolute canvas units; `x`/`y` is the top-left corner of
/// the unrotated box and `rotation` (degrees) turns it about its center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasElement {
    pub id: ElementId,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default, skip_serializing_if = "is_false")]
    pub flip_x: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub flip_y: bool,
    #[serde(default)]
    pub z_index: i64,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub style: ClayStyle,

    // Hierarchy
    #[serde(default)]
    pub parent_id: Option<ElementId>,
    #[serde(default)]
    pub mask_id: Option<ElementId>,
    #[serde(default)]
    pub collapsed: bool,
    #[serde(default)]
    pub merge: bool,

    // Text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<f64>,

    // Icon
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_lib: Option<IconLibrary>,

    // Extrusion and stroke
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_extrusion: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_extrusion_color: Option<ClayColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_extrusion_angle: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_stroke_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_stroke_color: Option<ClayColor>,
}

fn default_visible() -> bool {
    true
}

impl CanvasElement {
    /// A bare element of `kind` occupying `rect`, with the default style.
    pub fn new(kind: ElementKind, name: impl Into<String>, rect: Rect) -> Self {
        Self {
            id: ElementId::new(),
            name: name.into(),
            kind,
            x: rect.x0,
            y: rect.y0,
            width: rect.width().max(MIN_ELEMENT_SIZE),
            height: rect.height().max(MIN_ELEMENT_SIZE),
            rotation: 0.0,
            flip_x: false,
            flip_y: false,
            z_index: 0,
            visible: true,
            locked: false,
            style: ClayStyle::default(),
            parent_id: None,
            mask_id: None,
            collapsed: false,
            merge: false,
            text: None,
            font_size: None,
            font_family: None,
            font_weight: None,
            text_align: None,
            letter_spacing: None,
            icon_name: None,
            icon_lib: None,
            text_extrusion: None,
            text_extrusion_color: None,
            text_extrusion_angle: None,
            text_stroke_width: None,
            text_stroke_color: None,
        }
    }

    pub fn with_style(mut self, style: ClayStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotation = degrees;
        self
    }

    pub fn with_parent(mut self, parent: Option<ElementId>) -> Self {
        self.parent_id = parent;
        self
    }

    /// The unrotated box.
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn is_folder(&self) -> bool {
        self.kind == ElementKind::Folder
    }

    /// Effective extrusion depth, zero when unset.
    pub fn extrusion(&self) -> f64 {
        self.text_extrusion.unwrap_or(0.0)
    }

    /// Scale geometry and size-dependent attributes relative to `origin`.
    ///
    /// Used when an enclosing folder is resized from `origin` to `new_origin`.
    pub(crate) fn rescale(&mut self, origin: Point, new_origin: Point, sx: f64, sy: f64) {
        let avg = (sx + sy) / 2.0;
        self.x = new_origin.x + (self.x - origin.x) * sx;
        self.y = new_origin.y + (self.y - origin.y) * sy;
        self.width *= sx;
        self.height *= sy;
        if let Some(size) = self.font_size.as_mut() {
            *size *= sy;
        }
        if self.style.border_radius != 0.0 {
            self.style.border_radius *= avg;
        }
        if self.style.border_width != 0.0 {
            self.style.border_width *= avg;
        }
        if let Some(depth) = self.text_extrusion.as_mut().filter(|d| **d != 0.0) {
            *depth *= avg;
        }
    }
}

/// Partial update of a [`CanvasElement`]; `None` leaves a field untouched.
///
/// Hierarchy links use a nested option: `Some(None)` clears the link.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementUpdate {
    pub name: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub rotation: Option<f64>,
    pub flip_x: Option<bool>,
    pub flip_y: Option<bool>,
    pub visible: Option<bool>,
    pub locked: Option<bool>,
    pub collapsed: Option<bool>,
    pub merge: Option<bool>,
    pub parent_id: Option<Option<ElementId>>,
    pub mask_id: Option<Option<ElementId>>,
    pub style: Option<StylePatch>,
    pub text: Option<String>,
    pub font_size: Option<f64>,
    pub font_family: Option<String>,
    pub font_weight: Option<String>,
    pub text_align: Option<TextAlign>,
    pub letter_spacing: Option<f64>,
    pub icon_name: Option<String>,
    pub icon_lib: Option<IconLibrary>,
    pub text_extrusion: Option<f64>,
    pub text_extrusion_color: Option<ClayColor>,
    pub text_extrusion_angle: Option<f64>,
    pub text_stroke_width: Option<f64>,
    pub text_stroke_color: Option<ClayColor>,
}

impl ElementUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(mut self, x: f64, y: f64) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn rotation(mut self, degrees: f64) -> Self {
        self.rotation = Some(degrees);
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = Some(visible);
        self
    }

    pub fn locked(mut self, locked: bool) -> Self {
        self.locked = Some(locked);
        self
    }

    pub fn style(mut self, patch: StylePatch) -> Self {
        self.style = Some(patch);
        self
    }

    pub fn parent(mut self, parent: Option<ElementId>) -> Self {
        self.parent_id = Some(parent);
        self
    }

    pub fn mask(mut self, mask: Option<ElementId>) -> Self {
        self.mask_id = Some(mask);
        self
    }

    /// Whether the update changes the element's size.
    pub fn resizes(&self, element: &CanvasElement) -> bool {
        self.width.is_some_and(|w| clamp_size(w) != element.width)
            || self.height.is_some_and(|h| clamp_size(h) != element.height)
    }

    /// Write every `Some` field into `element`, clamping the size.
    pub(crate) fn apply_to(&self, element: &mut CanvasElement) {
        fn set<T: Clone>(slot: &mut T, value: &Option<T>) {
            if let Some(v) = value {
                *slot = v.clone();
            }
        }
        fn set_opt<T: Clone>(slot: &mut Option<T>, value: &Option<T>) {
            if value.is_some() {
                slot.clone_from(value);
            }
        }

        set(&mut element.name, &self.name);
        set(&mut element.x, &self.x);
        set(&mut element.y, &self.y);
        set(&mut element.width, &self.width.map(clamp_size));
        set(&mut element.height, &self.height.map(clamp_size));
        set(&mut element.rotation, &self.rotation);
        set(&mut element.flip_x, &self.flip_x);
        set(&mut element.flip_y, &self.flip_y);
        set(&mut element.visible, &self.visible);
        set(&mut element.locked, &self.locked);
        set(&mut element.collapsed, &self.collapsed);
        set(&mut element.merge, &self.merge);
        set(&mut element.parent_id, &self.parent_id);
        set(&mut element.mask_id, &self.mask_id);
        if let Some(patch) = &self.style {
            element.style.apply(patch);
        }
        set_opt(&mut element.text, &self.text);
        set_opt(&mut element.font_size, &self.font_size);
        set_opt(&mut element.font_family, &self.font_family);
        set_opt(&mut element.font_weight, &self.font_weight);
        set_opt(&mut element.text_align, &self.text_align);
        set_opt(&mut element.letter_spacing, &self.letter_spacing);
        set_opt(&mut element.icon_name, &self.icon_name);
        set_opt(&mut element.icon_lib, &self.icon_lib);
        set_opt(&mut element.text_extrusion, &self.text_extrusion);
        set_opt(&mut element.text_extrusion_color, &self.text_extrusion_color);
        set_opt(&mut element.text_extrusion_angle, &self.text_extrusion_angle);
        set_opt(&mut element.text_stroke_width, &self.text_stroke_width);
        set_opt(&mut element.text_stroke_color, &self.text_stroke_color);
    }
}

fn clamp_size(v: f64) -> f64 {
    if v.is_finite() { v.max(MIN_ELEMENT_SIZE) } else { MIN_ELEMENT_SIZE }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let a = ElementId::new();
        let b = ElementId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_default_style_by_kind() {
        let rect = ElementKind::Rectangle.default_style(None);
        assert_eq!(rect.border_radius, 0.0);
        assert_eq!(rect.depth, 20.0);

        let circle = ElementKind::Circle.default_style(None);
        assert_eq!(circle.border_radius, 999.0);

        let star = ElementKind::Star.default_style(Some(ClayColor::white()));
        assert_eq!(star.depth, 10.0);
        assert_eq!(star.color, ClayColor::white());

        let text = ElementKind::Text.default_style(None);
        assert!(!text.lighting);
        assert!(!text.shadow_enabled);
        assert_eq!(text.gloss, 0.0);
        assert_eq!(text.color, ClayColor::white());
    }

    #[test]
    fn test_update_clamps_size() {
        let mut el = CanvasElement::new(ElementKind::Rectangle, "r", Rect::new(0.0, 0.0, 10.0, 10.0));
        ElementUpdate::new().size(-5.0, 0.0).apply_to(&mut el);
        assert_eq!(el.width, MIN_ELEMENT_SIZE);
        assert_eq!(el.height, MIN_ELEMENT_SIZE);
    }

    #[test]
    fn test_update_clears_links() {
        let mut el = CanvasElement::new(ElementKind::Rectangle, "r", Rect::new(0.0, 0.0, 10.0, 10.0));
        el.mask_id = Some(ElementId::from("m"));
        ElementUpdate::new().mask(None).apply_to(&mut el);
        assert_eq!(el.mask_id, None);
    }

    #[test]
    fn test_element_json_shape() {
        let json = r##"{
            "id": "1700000000000",
            "name": "Rectangle 1",
            "type": "rectangle",
            "x": 10, "y": 20, "width": 128, "height": 64,
            "rotation": 0, "zIndex": 0, "visible": true, "locked": false,
            "style": { "color": "#252525" },
            "parentId": null,
            "maskId": null
        }"##;
        let el: CanvasElement = serde_json::from_str(json).unwrap();
        assert_eq!(el.id.as_str(), "1700000000000");
        assert_eq!(el.kind, ElementKind::Rectangle);
        assert_eq!(el.parent_id, None);
        assert_eq!(el.style.depth, 20.0);

        let out = serde_json::to_value(&el).unwrap();
        assert_eq!(out["type"], "rectangle");
        assert_eq!(out["zIndex"], 0);
        assert!(out.get("flipX").is_none());
    }

    #[test]
    fn test_rescale_scales_attributes() {
        let mut el = CanvasElement::new(ElementKind::Text, "t", Rect::new(10.0, 10.0, 30.0, 20.0));
        el.font_size = Some(10.0);
        el.style.border_radius = 4.0;
        el.text_extrusion = Some(2.0);
        el.rescale(Point::ZERO, Point::ZERO, 2.0, 4.0);
        assert_eq!(el.x, 20.0);
        assert_eq!(el.y, 40.0);
        assert_eq!(el.width, 40.0);
        assert_eq!(el.height, 40.0);
        assert_eq!(el.font_size, Some(40.0));
        assert_eq!(el.style.border_radius, 12.0);
        assert_eq!(el.text_extrusion, Some(6.0));
    }
}
