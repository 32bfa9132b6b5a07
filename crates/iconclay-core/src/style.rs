//! Clay style model: the declarative per-element visual parameters.

use peniko::Color;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error returned when a color string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid color: {0:?}")]
pub struct ColorParseError(pub String);

/// An sRGB color with straight alpha, persisted as a hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClayColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl ClayColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const fn black() -> Self {
        Self::rgb(0, 0, 0)
    }

    pub const fn white() -> Self {
        Self::rgb(255, 255, 255)
    }

    pub const fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Parse `#rgb`, `#rrggbb`, `#rrggbbaa` or one of the named colors
    /// `black`, `white`, `transparent`/`none`.
    pub fn parse(input: &str) -> Result<Self, ColorParseError> {
        let trimmed = input.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "black" => return Ok(Self::black()),
            "white" => return Ok(Self::white()),
            "transparent" | "none" => return Ok(Self::transparent()),
            _ => {}
        }

        let err = || ColorParseError(input.to_string());
        let hex = trimmed.strip_prefix('#').ok_or_else(err)?;
        if !hex.is_ascii() {
            return Err(err());
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| err());

        match hex.len() {
            3 => Ok(Self::rgb(
                channel(&hex[0..1])? * 17,
                channel(&hex[1..2])? * 17,
                channel(&hex[2..3])? * 17,
            )),
            6 => Ok(Self::rgb(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            8 => Ok(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                channel(&hex[6..8])?,
            )),
            _ => Err(err()),
        }
    }

    /// The color without alpha as `#rrggbb`.
    pub fn rgb_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Alpha as a fraction in `[0, 1]`.
    pub fn alpha(&self) -> f64 {
        f64::from(self.a) / 255.0
    }

    pub fn is_opaque(&self) -> bool {
        self.a == 255
    }
}

impl fmt::Display for ClayColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_opaque() {
            write!(f, "{}", self.rgb_hex())
        } else {
            write!(f, "{}{:02x}", self.rgb_hex(), self.a)
        }
    }
}

impl TryFrom<String> for ClayColor {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ClayColor> for String {
    fn from(color: ClayColor) -> Self {
        color.to_string()
    }
}

impl From<Color> for ClayColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self::new(rgba.r, rgba.g, rgba.b, rgba.a)
    }
}

impl From<ClayColor> for Color {
    fn from(color: ClayColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Gradient geometry for the base fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradientType {
    #[default]
    Linear,
    Radial,
}

/// Repeating surface pattern overlaid on the silhouette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfacePattern {
    #[default]
    None,
    Dots,
    Lines,
    Grid,
}

/// CSS/SVG blend mode applied when the element is composited onto the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
    Hue,
    Saturation,
    Color,
    Luminosity,
}

impl BlendMode {
    /// The `mix-blend-mode` keyword.
    pub fn as_css(self) -> &'static str {
        match self {
            BlendMode::Normal => "normal",
            BlendMode::Multiply => "multiply",
            BlendMode::Screen => "screen",
            BlendMode::Overlay => "overlay",
            BlendMode::Darken => "darken",
            BlendMode::Lighten => "lighten",
            BlendMode::ColorDodge => "color-dodge",
            BlendMode::ColorBurn => "color-burn",
            BlendMode::HardLight => "hard-light",
            BlendMode::SoftLight => "soft-light",
            BlendMode::Difference => "difference",
            BlendMode::Exclusion => "exclusion",
            BlendMode::Hue => "hue",
            BlendMode::Saturation => "saturation",
            BlendMode::Color => "color",
            BlendMode::Luminosity => "luminosity",
        }
    }
}

/// Per-element clay material.
///
/// `surface_intensity`, `shadow_angle`, `shadow_distance` and `shadow_blur`
/// are optional so that projects saved before those controls existed keep
/// rendering through their legacy fallbacks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClayStyle {
    // Base fill
    pub color: ClayColor,
    pub gradient: bool,
    pub gradient_color: ClayColor,
    pub gradient_type: GradientType,
    pub gradient_angle: f64,
    pub opacity: f64,
    pub blend_mode: BlendMode,

    // Surface lighting
    pub lighting: bool,
    pub light_source: f64,
    pub depth: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surface_intensity: Option<f64>,

    // Drop shadow
    pub shadow_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow_angle: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow_distance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow_blur: Option<f64>,
    pub intensity: f64,

    // Surface texture
    pub blur: f64,
    pub convex: bool,

    // Bevel
    pub bevel: f64,
    pub bevel_intensity: f64,

    // Specular
    pub gloss: f64,
    pub specular_blur: f64,
    pub specular_color: ClayColor,

    // Grain
    pub noise: f64,
    pub noise_scale: f64,

    // Pattern
    pub surface_pattern: SurfacePattern,
    pub pattern_opacity: f64,
    pub pattern_scale: f64,

    // Border
    pub border_width: f64,
    pub border_color: ClayColor,
    pub border_radius: f64,
}

/// Drop shadow blur used when a legacy style has none.
pub const LEGACY_SHADOW_BLUR: f64 = 20.0;

impl Default for ClayStyle {
    fn default() -> Self {
        Self {
            color: ClayColor::rgb(0x25, 0x25, 0x25),
            gradient: false,
            gradient_color: ClayColor::rgb(0x33, 0x33, 0x33),
            gradient_type: GradientType::Linear,
            gradient_angle: 135.0,
            opacity: 1.0,
            blend_mode: BlendMode::Normal,

            lighting: true,
            light_source: 135.0,
            depth: 20.0,
            surface_intensity: Some(0.2),

            shadow_enabled: true,
            shadow_angle: Some(135.0),
            shadow_distance: Some(20.0),
            shadow_blur: Some(40.0),
            intensity: 0.3,

            blur: 10.0,
            convex: true,

            bevel: 2.0,
            bevel_intensity: 0.6,

            gloss: 15.0,
            specular_blur: 5.0,
            specular_color: ClayColor::white(),

            noise: 0.0,
            noise_scale: 1.0,

            surface_pattern: SurfacePattern::None,
            pattern_opacity: 0.1,
            pattern_scale: 1.0,

            border_width: 0.0,
            border_color: ClayColor::rgb(0x44, 0x44, 0x44),
            border_radius: 40.0,
        }
    }
}

impl ClayStyle {
    /// Flat material for text and icons: no lighting, shadow, bevel or gloss.
    pub fn flat() -> Self {
        Self {
            depth: 0.0,
            blur: 0.0,
            intensity: 0.0,
            surface_intensity: Some(0.0),
            bevel: 0.0,
            bevel_intensity: 0.0,
            gloss: 0.0,
            noise: 0.0,
            border_width: 0.0,
            gradient: false,
            lighting: false,
            shadow_enabled: false,
            color: ClayColor::white(),
            ..Self::default()
        }
    }

    /// Opacity of the internal shading pass, falling back to the legacy
    /// shared `intensity`.
    pub fn shading_opacity(&self) -> f64 {
        self.surface_intensity.unwrap_or(self.intensity)
    }

    /// Drop shadow angle, falling back to the light source.
    pub fn shadow_angle(&self) -> f64 {
        self.shadow_angle.unwrap_or(self.light_source)
    }

    /// Drop shadow distance, falling back to the surface depth.
    pub fn shadow_distance(&self) -> f64 {
        self.shadow_distance.unwrap_or(self.depth)
    }

    pub fn shadow_blur(&self) -> f64 {
        self.shadow_blur.unwrap_or(LEGACY_SHADOW_BLUR)
    }

    /// Noise scale with the degenerate zero replaced by 1.
    pub fn effective_noise_scale(&self) -> f64 {
        if self.noise_scale > 0.0 { self.noise_scale } else { 1.0 }
    }

    pub fn has_pattern(&self) -> bool {
        self.surface_pattern != SurfacePattern::None
    }

    /// Merge a partial update into this style.
    pub fn apply(&mut self, patch: &StylePatch) {
        patch.apply_to(self);
    }
}

/// Partial update of a [`ClayStyle`]; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StylePatch {
    pub color: Option<ClayColor>,
    pub gradient: Option<bool>,
    pub gradient_color: Option<ClayColor>,
    pub gradient_type: Option<GradientType>,
    pub gradient_angle: Option<f64>,
    pub opacity: Option<f64>,
    pub blend_mode: Option<BlendMode>,
    pub lighting: Option<bool>,
    pub light_source: Option<f64>,
    pub depth: Option<f64>,
    pub surface_intensity: Option<f64>,
    pub shadow_enabled: Option<bool>,
    pub shadow_angle: Option<f64>,
    pub shadow_distance: Option<f64>,
    pub shadow_blur: Option<f64>,
    pub intensity: Option<f64>,
    pub blur: Option<f64>,
    pub convex: Option<bool>,
    pub bevel: Option<f64>,
    pub bevel_intensity: Option<f64>,
    pub gloss: Option<f64>,
    pub specular_blur: Option<f64>,
    pub specular_color: Option<ClayColor>,
    pub noise: Option<f64>,
    pub noise_scale: Option<f64>,
    pub surface_pattern: Option<SurfacePattern>,
    pub pattern_opacity: Option<f64>,
    pub pattern_scale: Option<f64>,
    pub border_width: Option<f64>,
    pub border_color: Option<ClayColor>,
    pub border_radius: Option<f64>,
}

impl StylePatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Write every `Some` field into `style`.
    pub fn apply_to(&self, style: &mut ClayStyle) {
        fn set<T: Copy>(slot: &mut T, value: Option<T>) {
            if let Some(v) = value {
                *slot = v;
            }
        }
        fn set_opt<T: Copy>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }

        set(&mut style.color, self.color);
        set(&mut style.gradient, self.gradient);
        set(&mut style.gradient_color, self.gradient_color);
        set(&mut style.gradient_type, self.gradient_type);
        set(&mut style.gradient_angle, self.gradient_angle);
        set(&mut style.opacity, self.opacity.map(|o| o.clamp(0.0, 1.0)));
        set(&mut style.blend_mode, self.blend_mode);
        set(&mut style.lighting, self.lighting);
        set(&mut style.light_source, self.light_source);
        set(&mut style.depth, self.depth.map(|d| d.max(0.0)));
        set_opt(&mut style.surface_intensity, self.surface_intensity);
        set(&mut style.shadow_enabled, self.shadow_enabled);
        set_opt(&mut style.shadow_angle, self.shadow_angle);
        set_opt(&mut style.shadow_distance, self.shadow_distance);
        set_opt(&mut style.shadow_blur, self.shadow_blur);
        set(&mut style.intensity, self.intensity);
        set(&mut style.blur, self.blur.map(|b| b.max(0.0)));
        set(&mut style.convex, self.convex);
        set(&mut style.bevel, self.bevel);
        set(&mut style.bevel_intensity, self.bevel_intensity);
        set(&mut style.gloss, self.gloss);
        set(&mut style.specular_blur, self.specular_blur);
        set(&mut style.specular_color, self.specular_color);
        set(&mut style.noise, self.noise);
        set(&mut style.noise_scale, self.noise_scale);
        set(&mut style.surface_pattern, self.surface_pattern);
        set(&mut style.pattern_opacity, self.pattern_opacity);
        set(&mut style.pattern_scale, self.pattern_scale);
        set(&mut style.border_width, self.border_width);
        set(&mut style.border_color, self.border_color);
        set(&mut style.border_radius, self.border_radius);
    }
}

/// A named material preset.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialPreset {
    pub id: &'static str,
    pub name: &'static str,
    pub patch: StylePatch,
}

/// Built-in material presets.
pub fn material_presets() -> Vec<MaterialPreset> {
    #[allow(clippy::too_many_arguments)]
    fn lit(
        color: ClayColor,
        light: f64,
        depth: f64,
        surface: f64,
        blur: f64,
        shadow_blur: f64,
        shadow_opacity: f64,
        convex: bool,
        bevel: (f64, f64),
        gloss: f64,
    ) -> StylePatch {
        StylePatch {
            color: Some(color),
            gradient: Some(false),
            lighting: Some(true),
            light_source: Some(light),
            depth: Some(depth),
            surface_intensity: Some(surface),
            blur: Some(blur),
            shadow_enabled: Some(true),
            shadow_angle: Some(light),
            shadow_distance: Some(depth),
            shadow_blur: Some(shadow_blur),
            intensity: Some(shadow_opacity),
            convex: Some(convex),
            bevel: Some(bevel.0),
            bevel_intensity: Some(bevel.1),
            gloss: Some(gloss),
            ..StylePatch::default()
        }
    }

    fn with_gradient(mut patch: StylePatch, to: ClayColor, kind: GradientType, angle: f64) -> StylePatch {
        patch.gradient = Some(true);
        patch.gradient_color = Some(to);
        patch.gradient_type = Some(kind);
        patch.gradient_angle = Some(angle);
        patch
    }

    let mut soft_light = lit(ClayColor::rgb(0xe0, 0xe5, 0xec), 135.0, 18.0, 0.15, 20.0, 30.0, 0.15, true, (2.0, 0.4), 10.0);
    soft_light.border_width = Some(0.0);
    let mut soft_dark = lit(ClayColor::rgb(0x2a, 0x2a, 0x2a), 135.0, 18.0, 0.25, 25.0, 35.0, 0.4, true, (1.0, 0.3), 15.0);
    soft_dark.border_width = Some(0.0);

    vec![
        MaterialPreset { id: "soft-clay-light", name: "Soft Clay (Light)", patch: soft_light },
        MaterialPreset { id: "soft-clay-dark", name: "Soft Clay (Dark)", patch: soft_dark },
        MaterialPreset {
            id: "bubblegum",
            name: "Bubblegum Pop",
            patch: with_gradient(
                lit(ClayColor::rgb(0xff, 0x6b, 0x9d), 120.0, 25.0, 0.3, 10.0, 30.0, 0.25, true, (5.0, 0.7), 45.0),
                ClayColor::rgb(0xff, 0x8f, 0xab),
                GradientType::Radial,
                135.0,
            ),
        },
        MaterialPreset {
            id: "holographic",
            name: "Holographic",
            patch: with_gradient(
                lit(ClayColor::rgb(0x63, 0x66, 0xf1), 90.0, 10.0, 0.1, 5.0, 15.0, 0.2, true, (1.0, 0.8), 60.0),
                ClayColor::rgb(0xec, 0x48, 0x99),
                GradientType::Linear,
                45.0,
            ),
        },
        MaterialPreset {
            id: "deep-pressed",
            name: "Deep Pressed",
            patch: lit(ClayColor::rgb(0x25, 0x25, 0x25), 135.0, 12.0, 0.5, 5.0, 15.0, 0.6, false, (2.0, 0.5), 5.0),
        },
        MaterialPreset {
            id: "liquid-metal",
            name: "Liquid Metal",
            patch: with_gradient(
                lit(ClayColor::rgb(0x9c, 0xa3, 0xaf), 110.0, 30.0, 0.3, 15.0, 25.0, 0.3, true, (8.0, 0.9), 90.0),
                ClayColor::rgb(0xd1, 0xd5, 0xdb),
                GradientType::Linear,
                160.0,
            ),
        },
        MaterialPreset {
            id: "ceramic",
            name: "White Ceramic",
            patch: lit(ClayColor::rgb(0xf9, 0xfa, 0xfb), 145.0, 15.0, 0.05, 10.0, 20.0, 0.1, true, (1.0, 0.2), 70.0),
        },
    ]
}

/// Look up a preset by id.
pub fn material_preset(id: &str) -> Option<MaterialPreset> {
    material_presets().into_iter().find(|p| p.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_colors() {
        assert_eq!(ClayColor::parse("#fff").unwrap(), ClayColor::white());
        assert_eq!(ClayColor::parse("#252525").unwrap(), ClayColor::rgb(0x25, 0x25, 0x25));
        assert_eq!(ClayColor::parse("#ff000080").unwrap(), ClayColor::new(255, 0, 0, 128));
        assert_eq!(ClayColor::parse("transparent").unwrap(), ClayColor::transparent());
        assert!(ClayColor::parse("rgb(1,2,3)").is_err());
        assert!(ClayColor::parse("#12345").is_err());
    }

    #[test]
    fn test_color_serializes_as_hex() {
        let json = serde_json::to_string(&ClayColor::rgb(0x44, 0x44, 0x44)).unwrap();
        assert_eq!(json, "\"#444444\"");
        let back: ClayColor = serde_json::from_str("\"#FFFFFF\"").unwrap();
        assert_eq!(back, ClayColor::white());
    }

    #[test]
    fn test_default_style_values() {
        let style = ClayStyle::default();
        assert_eq!(style.depth, 20.0);
        assert_eq!(style.blur, 10.0);
        assert_eq!(style.bevel, 2.0);
        assert_eq!(style.gloss, 15.0);
        assert_eq!(style.border_radius, 40.0);
        assert!(style.lighting);
    }

    #[test]
    fn test_legacy_fallbacks() {
        let json = r##"{ "color": "#ff0000", "lightSource": 45, "depth": 12, "intensity": 0.7 }"##;
        let style: ClayStyle = serde_json::from_str(json).unwrap();
        assert_eq!(style.shading_opacity(), 0.7);
        assert_eq!(style.shadow_angle(), 45.0);
        assert_eq!(style.shadow_distance(), 12.0);
        assert_eq!(style.shadow_blur(), LEGACY_SHADOW_BLUR);
        // Missing non-legacy fields take the defaults.
        assert_eq!(style.gloss, 15.0);
    }

    #[test]
    fn test_patch_merges_only_set_fields() {
        let mut style = ClayStyle::default();
        let patch = StylePatch {
            gloss: Some(80.0),
            border_color: Some(ClayColor::black()),
            ..StylePatch::default()
        };
        style.apply(&patch);
        assert_eq!(style.gloss, 80.0);
        assert_eq!(style.border_color, ClayColor::black());
        assert_eq!(style.depth, 20.0);
    }

    #[test]
    fn test_presets_are_unique() {
        let presets = material_presets();
        assert_eq!(presets.len(), 7);
        let mut ids: Vec<_> = presets.iter().map(|p| p.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 7);
        assert!(material_preset("liquid-metal").is_some());
    }
}
