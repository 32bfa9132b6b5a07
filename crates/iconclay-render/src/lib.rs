//! IconClay Render Library
//!
//! Turns scene elements into SVG. The clay look comes from a filter graph
//! built per element ([`pipeline`]); [`renderer`] wraps it with fills,
//! silhouettes, glyph stencils and clip masks, and [`export`] stitches the
//! layers of a whole scene into one document. [`ico`] packs a rasterized
//! PNG into an icon container.

pub mod error;
pub mod export;
pub mod filter;
pub mod ico;
pub mod icons;
pub mod paint;
pub mod pipeline;
pub mod renderer;
pub mod shape;
pub mod svg;

pub use error::{ExportError, IconError, RenderError};
pub use export::{export_scene_svg, write_scene_svg};
pub use filter::{FilterGraph, FilterOp, Input, Slot};
pub use ico::{convert_png_file, encode_ico, png_dimensions};
pub use icons::{BuiltinIcons, IconGlyph, IconProvider, IconSet};
pub use paint::{Fill, PatternTile};
pub use pipeline::build_clay_filter;
pub use renderer::{ClayRenderer, ElementLayer, RenderOptions};
pub use shape::Outline;
