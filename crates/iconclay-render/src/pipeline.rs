//! The clay filter pipeline.
//!
//! [`build_clay_filter`] turns a style into a [`FilterGraph`]. The order of
//! the stages is fixed: silhouette prep, drop shadow, elevation map, the
//! two specular passes with optional bevel, gloss, noise, then one merge
//! that stacks atmosphere behind surface, shading behind highlights and
//! highlights behind specular.

use crate::filter::{ColorMatrix, CompositeOp, DistantLight, FilterGraph, FilterOp, Input, Slot};
use iconclay_core::{ClayColor, ClayStyle};
use kurbo::{Rect, Size, Vec2};

pub const KEY_LIGHT_ELEVATION: f64 = 40.0;
pub const KEY_SPECULAR_CONSTANT: f64 = 1.2;
pub const KEY_SPECULAR_EXPONENT: f64 = 12.0;
pub const FILL_SPECULAR_CONSTANT: f64 = 1.0;
pub const FILL_SPECULAR_EXPONENT: f64 = 10.0;
pub const GLOSS_ELEVATION: f64 = 60.0;
pub const GLOSS_SPECULAR_EXPONENT: f64 = 25.0;
/// `specularConstant = gloss / GLOSS_CONSTANT_DIVISOR`.
pub const GLOSS_CONSTANT_DIVISOR: f64 = 40.0;
/// Blur applied to the raw lighting passes before clipping.
pub const PASS_SMOOTHING: f64 = 0.75;
/// `baseFrequency = NOISE_BASE_FREQUENCY / noiseScale`.
pub const NOISE_BASE_FREQUENCY: f64 = 0.6;
pub const NOISE_OCTAVES: u32 = 3;
pub const MIN_FILTER_PADDING: f64 = 50.0;

/// Key and fill light azimuths for a light source angle, both in `[0, 360)`.
pub fn light_azimuths(light_source: f64) -> (f64, f64) {
    let azimuth = (light_source - 90.0).rem_euclid(360.0);
    let opposite = (azimuth + 180.0).rem_euclid(360.0);
    (azimuth, opposite)
}

/// Drop shadow displacement: half the shadow distance along the shadow angle.
pub fn shadow_offset(style: &ClayStyle) -> Vec2 {
    let angle = style.shadow_angle().to_radians();
    Vec2::new(angle.cos(), angle.sin()) * (style.shadow_distance() / 2.0)
}

/// Displacement of the light-facing bevel sliver.
pub fn bevel_offset(style: &ClayStyle) -> Vec2 {
    let angle = style.light_source.to_radians();
    Vec2::new(angle.cos(), angle.sin()) * style.bevel
}

/// Margin around the element the filter may paint into.
pub fn filter_padding(style: &ClayStyle) -> f64 {
    (style.blur * 4.0)
        .max(style.shadow_blur() * 2.0)
        .max(style.depth * 2.0)
        .max(MIN_FILTER_PADDING)
}

/// Whether any stage of the pipeline is active.
pub fn needs_filter(style: &ClayStyle, extrusion: f64) -> bool {
    style.lighting || style.shadow_enabled || extrusion > 0.0 || style.noise > 0.0 || style.has_pattern()
}

/// Build the filter for an element of `size` with `style`.
///
/// Returns `None` when nothing in the style needs a filter. `extrusion`
/// dilates the silhouette before lighting.
pub fn build_clay_filter(size: Size, style: &ClayStyle, extrusion: f64) -> Option<FilterGraph> {
    if !needs_filter(style, extrusion) {
        return None;
    }

    let pad = filter_padding(style);
    let region = Rect::new(-pad, -pad, size.width + pad, size.height + pad);
    let mut graph = FilterGraph::new(region);

    let base = if extrusion > 0.0 {
        graph.push(FilterOp::Dilate { input: Input::SourceAlpha, radius: extrusion / 2.0 }, Slot::BASE_ALPHA)
    } else {
        graph.push(
            FilterOp::ColorMatrix { input: Input::SourceAlpha, matrix: ColorMatrix::Identity },
            Slot::BASE_ALPHA,
        )
    };

    let drop_shadow = style.shadow_enabled.then(|| {
        let offset = shadow_offset(style);
        graph.push(
            FilterOp::DropShadow {
                input: base,
                dx: offset.x,
                dy: offset.y,
                std_deviation: style.shadow_blur() / 2.0,
                color: ClayColor::black(),
                opacity: style.intensity,
            },
            Slot::DROP_SHADOW,
        )
    });

    let elevation = graph.push(
        FilterOp::GaussianBlur { input: base, std_deviation: style.blur.max(1.0) },
        Slot::ELEVATION_MAP,
    );

    let lighting = style.lighting.then(|| push_lighting(&mut graph, style, base, elevation));
    let noise = (style.noise > 0.0).then(|| push_noise(&mut graph, style, base));

    let mut layers = Vec::new();
    layers.extend(drop_shadow);
    match noise {
        Some(noise) => layers.extend([noise, Input::SourceGraphic]),
        None => layers.push(Input::SourceGraphic),
    }
    if let Some(passes) = lighting {
        layers.extend([passes.shadow, passes.light]);
        if let Some((bevel_shadow, bevel_highlight)) = passes.bevel {
            layers.extend([bevel_shadow, bevel_highlight]);
        }
        layers.push(passes.gloss);
    }
    layers.extend(noise);
    graph.push_output(FilterOp::Merge(layers));

    Some(graph)
}

struct LightingPasses {
    shadow: Input,
    light: Input,
    bevel: Option<(Input, Input)>,
    gloss: Input,
}

fn push_lighting(graph: &mut FilterGraph, style: &ClayStyle, base: Input, elevation: Input) -> LightingPasses {
    let (azimuth, opposite) = light_azimuths(style.light_source);
    let surface_scale = style.depth / 2.0;

    // Key light
    let raw = graph.push(
        FilterOp::SpecularLighting {
            input: elevation,
            surface_scale,
            specular_constant: KEY_SPECULAR_CONSTANT,
            specular_exponent: KEY_SPECULAR_EXPONENT,
            color: ClayColor::white(),
            light: DistantLight { azimuth, elevation: KEY_LIGHT_ELEVATION },
        },
        Slot::LIGHT_PASS_RAW,
    );
    let smooth = graph.push(FilterOp::GaussianBlur { input: raw, std_deviation: PASS_SMOOTHING }, Slot::LIGHT_PASS_SMOOTH);
    let light = graph.push(
        FilterOp::Composite { input: smooth, input2: base, op: CompositeOp::In },
        Slot::LIGHT_PASS,
    );

    // Fill light from the opposite side, flooded black
    let raw = graph.push(
        FilterOp::SpecularLighting {
            input: elevation,
            surface_scale,
            specular_constant: FILL_SPECULAR_CONSTANT,
            specular_exponent: FILL_SPECULAR_EXPONENT,
            color: ClayColor::white(),
            light: DistantLight { azimuth: opposite, elevation: KEY_LIGHT_ELEVATION },
        },
        Slot::SHADOW_PASS_MAP_RAW,
    );
    let map = graph.push(FilterOp::GaussianBlur { input: raw, std_deviation: PASS_SMOOTHING }, Slot::SHADOW_PASS_MAP);
    let mask = graph.push(
        FilterOp::Composite { input: map, input2: base, op: CompositeOp::In },
        Slot::SHADOW_PASS_MASK,
    );
    let flood = graph.push(
        FilterOp::Flood { color: ClayColor::black(), opacity: style.shading_opacity() },
        Slot::SHADOW_FLOOD,
    );
    let shadow = graph.push(
        FilterOp::Composite { input: flood, input2: mask, op: CompositeOp::In },
        Slot::SHADOW_PASS,
    );

    let bevel = (style.bevel > 0.0).then(|| {
        let offset = bevel_offset(style);
        let highlight = push_bevel_sliver(graph, style, base, offset, ClayColor::white(), BEVEL_HIGHLIGHT_SLOTS);
        let shadow = push_bevel_sliver(graph, style, base, -offset, ClayColor::black(), BEVEL_SHADOW_SLOTS);
        (shadow, highlight)
    });

    let raw = graph.push(
        FilterOp::SpecularLighting {
            input: elevation,
            surface_scale: style.depth,
            specular_constant: style.gloss / GLOSS_CONSTANT_DIVISOR,
            specular_exponent: GLOSS_SPECULAR_EXPONENT,
            color: style.specular_color,
            light: DistantLight { azimuth, elevation: GLOSS_ELEVATION },
        },
        Slot::GLOSS_RAW,
    );
    let blurred = graph.push(
        FilterOp::GaussianBlur { input: raw, std_deviation: style.specular_blur },
        Slot::GLOSS_BLURRED,
    );
    let gloss = graph.push(
        FilterOp::Composite { input: blurred, input2: base, op: CompositeOp::In },
        Slot::GLOSS,
    );

    LightingPasses { shadow, light, bevel, gloss }
}

/// Result names of one bevel sliver: offset, raw, blur, masked, flood, out.
type SliverSlots = [Slot; 6];

const BEVEL_HIGHLIGHT_SLOTS: SliverSlots = [
    Slot::OFF_H,
    Slot::BEVEL_H_RAW,
    Slot::BEVEL_H_BLUR,
    Slot::BEVEL_H_MASKED,
    Slot::BEVEL_H_FLOOD,
    Slot::BEVEL_HIGHLIGHT,
];

const BEVEL_SHADOW_SLOTS: SliverSlots = [
    Slot::OFF_S,
    Slot::BEVEL_S_RAW,
    Slot::BEVEL_S_BLUR,
    Slot::BEVEL_S_MASKED,
    Slot::BEVEL_S_FLOOD,
    Slot::BEVEL_SHADOW,
];

/// Thin edge sliver: the silhouette minus a shifted copy of itself.
fn push_bevel_sliver(
    graph: &mut FilterGraph,
    style: &ClayStyle,
    base: Input,
    offset: Vec2,
    color: ClayColor,
    slots: SliverSlots,
) -> Input {
    let [off, raw, blur, masked, flood, out] = slots;
    let shifted = graph.push(FilterOp::Offset { input: base, dx: offset.x, dy: offset.y }, off);
    let sliver = graph.push(FilterOp::Composite { input: base, input2: shifted, op: CompositeOp::Out }, raw);
    let blurred = graph.push(
        FilterOp::GaussianBlur { input: sliver, std_deviation: style.bevel / 3.0 },
        blur,
    );
    let clipped = graph.push(FilterOp::Composite { input: blurred, input2: base, op: CompositeOp::In }, masked);
    let flood = graph.push(FilterOp::Flood { color, opacity: style.bevel_intensity }, flood);
    graph.push(FilterOp::Composite { input: flood, input2: clipped, op: CompositeOp::In }, out)
}

fn push_noise(graph: &mut FilterGraph, style: &ClayStyle, base: Input) -> Input {
    let raw = graph.push(
        FilterOp::Turbulence {
            base_frequency: NOISE_BASE_FREQUENCY / style.effective_noise_scale(),
            octaves: NOISE_OCTAVES,
        },
        Slot::NOISE_RAW,
    );
    let gray = graph.push(
        FilterOp::ColorMatrix { input: raw, matrix: ColorMatrix::Saturate(0.0) },
        Slot::NOISE_DESAT,
    );
    let alpha = graph.push(FilterOp::AlphaSlope { input: gray, slope: style.noise / 100.0 }, Slot::NOISE_ALPHA);
    graph.push(FilterOp::Composite { input: alpha, input2: base, op: CompositeOp::In }, Slot::NOISE_MASKED)
}
