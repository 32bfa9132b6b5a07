//! Canvas settings shared by the editor, project files and sessions.

use crate::style::ClayColor;
use kurbo::Size;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CANVAS_SIZE: Size = Size::new(512.0, 512.0);
pub const DEFAULT_GRID_SIZE: f64 = 16.0;

/// Offset applied to pasted and duplicated elements.
pub const PASTE_OFFSET: f64 = 20.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CanvasSettings {
    pub canvas_size: Size,
    pub background_color: ClayColor,
    pub transparent_background: bool,
    pub grid_size: f64,
    pub show_grid: bool,
    pub snap_to_grid: bool,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            canvas_size: DEFAULT_CANVAS_SIZE,
            background_color: ClayColor::rgb(0x25, 0x25, 0x25),
            transparent_background: true,
            grid_size: DEFAULT_GRID_SIZE,
            show_grid: true,
            snap_to_grid: true,
        }
    }
}

impl CanvasSettings {
    /// The opaque canvas fill, or `None` when the background is transparent.
    pub fn canvas_fill(&self) -> Option<ClayColor> {
        (!self.transparent_background).then_some(self.background_color)
    }
}
