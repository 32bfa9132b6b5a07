//! Filter graph IR.
//!
//! A [`FilterGraph`] is an ordered list of image primitives. Each primitive
//! reads from the source graphic, the source alpha or a named earlier
//! result, and may publish its own output under a [`Slot`] name. The list
//! order is evaluation order; the last primitive is the output.

use iconclay_core::ClayColor;
use kurbo::Rect;

/// Name of an intermediate result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot(pub &'static str);

impl Slot {
    pub const BASE_ALPHA: Slot = Slot("BASE_ALPHA");
    pub const DROP_SHADOW: Slot = Slot("DROP_SHADOW");
    pub const ELEVATION_MAP: Slot = Slot("ELEVATION_MAP");
    pub const LIGHT_PASS_RAW: Slot = Slot("LIGHT_PASS_RAW");
    pub const LIGHT_PASS_SMOOTH: Slot = Slot("LIGHT_PASS_SMOOTH");
    pub const LIGHT_PASS: Slot = Slot("LIGHT_PASS");
    pub const SHADOW_PASS_MAP_RAW: Slot = Slot("SHADOW_PASS_MAP_RAW");
    pub const SHADOW_PASS_MAP: Slot = Slot("SHADOW_PASS_MAP");
    pub const SHADOW_PASS_MASK: Slot = Slot("SHADOW_PASS_MASK");
    pub const SHADOW_FLOOD: Slot = Slot("SHADOW_FLOOD");
    pub const SHADOW_PASS: Slot = Slot("SHADOW_PASS");
    pub const OFF_H: Slot = Slot("OFF_H");
    pub const BEVEL_H_RAW: Slot = Slot("BEVEL_H_RAW");
    pub const BEVEL_H_BLUR: Slot = Slot("BEVEL_H_BLUR");
    pub const BEVEL_H_MASKED: Slot = Slot("BEVEL_H_MASKED");
    pub const BEVEL_H_FLOOD: Slot = Slot("BEVEL_H_FLOOD");
    pub const BEVEL_HIGHLIGHT: Slot = Slot("BEVEL_HIGHLIGHT");
    pub const OFF_S: Slot = Slot("OFF_S");
    pub const BEVEL_S_RAW: Slot = Slot("BEVEL_S_RAW");
    pub const BEVEL_S_BLUR: Slot = Slot("BEVEL_S_BLUR");
    pub const BEVEL_S_MASKED: Slot = Slot("BEVEL_S_MASKED");
    pub const BEVEL_S_FLOOD: Slot = Slot("BEVEL_S_FLOOD");
    pub const BEVEL_SHADOW: Slot = Slot("BEVEL_SHADOW");
    pub const GLOSS_RAW: Slot = Slot("GLOSS_RAW");
    pub const GLOSS_BLURRED: Slot = Slot("GLOSS_BLURRED");
    pub const GLOSS: Slot = Slot("GLOSS");
    pub const NOISE_RAW: Slot = Slot("NOISE_RAW");
    pub const NOISE_DESAT: Slot = Slot("NOISE_DESAT");
    pub const NOISE_ALPHA: Slot = Slot("NOISE_ALPHA");
    pub const NOISE_MASKED: Slot = Slot("NOISE_MASKED");

    pub fn name(self) -> &'static str {
        self.0
    }
}

/// Input of a primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    SourceGraphic,
    SourceAlpha,
    Slot(Slot),
}

impl From<Slot> for Input {
    fn from(slot: Slot) -> Self {
        Input::Slot(slot)
    }
}

/// Porter-Duff operator of a composite primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeOp {
    /// Keep `input` where `input2` is opaque.
    In,
    /// Keep `input` where `input2` is transparent.
    Out,
    Over,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorMatrix {
    /// Pass-through 4x5 identity matrix.
    Identity,
    /// Saturation, 0 for grayscale.
    Saturate(f64),
}

/// Directional light at infinity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistantLight {
    /// Degrees clockwise from the x axis.
    pub azimuth: f64,
    /// Degrees above the surface plane.
    pub elevation: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterOp {
    /// Grow the opaque area by `radius`.
    Dilate { input: Input, radius: f64 },
    ColorMatrix { input: Input, matrix: ColorMatrix },
    DropShadow { input: Input, dx: f64, dy: f64, std_deviation: f64, color: ClayColor, opacity: f64 },
    GaussianBlur { input: Input, std_deviation: f64 },
    SpecularLighting {
        input: Input,
        surface_scale: f64,
        specular_constant: f64,
        specular_exponent: f64,
        color: ClayColor,
        light: DistantLight,
    },
    Composite { input: Input, input2: Input, op: CompositeOp },
    Flood { color: ClayColor, opacity: f64 },
    Offset { input: Input, dx: f64, dy: f64 },
    /// Fractal noise with stitched tiles.
    Turbulence { base_frequency: f64, octaves: u32 },
    /// Linear transfer on the alpha channel: `a' = a * slope`.
    AlphaSlope { input: Input, slope: f64 },
    /// Draw each input over the previous one.
    Merge(Vec<Input>),
}

impl FilterOp {
    /// Inputs read by this primitive.
    pub fn inputs(&self) -> Vec<Input> {
        match self {
            FilterOp::Dilate { input, .. }
            | FilterOp::ColorMatrix { input, .. }
            | FilterOp::DropShadow { input, .. }
            | FilterOp::GaussianBlur { input, .. }
            | FilterOp::SpecularLighting { input, .. }
            | FilterOp::Offset { input, .. }
            | FilterOp::AlphaSlope { input, .. } => vec![*input],
            FilterOp::Composite { input, input2, .. } => vec![*input, *input2],
            FilterOp::Flood { .. } | FilterOp::Turbulence { .. } => Vec::new(),
            FilterOp::Merge(inputs) => inputs.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    pub op: FilterOp,
    pub result: Option<Slot>,
}

/// Ordered filter primitives over a user-space region.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterGraph {
    region: Rect,
    primitives: Vec<Primitive>,
}

impl FilterGraph {
    pub fn new(region: Rect) -> Self {
        Self { region, primitives: Vec::new() }
    }

    /// Region the filter may paint into, in element-local units.
    pub fn region(&self) -> Rect {
        self.region
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Append a primitive publishing its output as `result`.
    pub fn push(&mut self, op: FilterOp, result: Slot) -> Input {
        self.primitives.push(Primitive { op, result: Some(result) });
        Input::Slot(result)
    }

    /// Append an unnamed primitive, typically the final merge.
    pub fn push_output(&mut self, op: FilterOp) {
        self.primitives.push(Primitive { op, result: None });
    }

    /// The primitive that produces `slot`.
    pub fn producer(&self, slot: Slot) -> Option<&Primitive> {
        self.primitives.iter().find(|p| p.result == Some(slot))
    }

    pub fn defines(&self, slot: Slot) -> bool {
        self.producer(slot).is_some()
    }

    /// Layers of the final merge, bottom first.
    pub fn merge_layers(&self) -> &[Input] {
        match self.primitives.last().map(|p| &p.op) {
            Some(FilterOp::Merge(inputs)) => inputs,
            _ => &[],
        }
    }

    /// First input that reads a slot not produced earlier in the list.
    pub fn first_undefined_input(&self) -> Option<Slot> {
        for (i, primitive) in self.primitives.iter().enumerate() {
            for input in primitive.op.inputs() {
                if let Input::Slot(slot) = input {
                    if !self.primitives[..i].iter().any(|p| p.result == Some(slot)) {
                        return Some(slot);
                    }
                }
            }
        }
        None
    }
}
