//! Canvas view: zoom and pan.

use kurbo::{Affine, Point, Size, Vec2};
use serde::{Deserialize, Serialize};

pub const DEFAULT_ZOOM: f64 = 0.8;
pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 3.0;
/// Zoom change per wheel notch or zoom button press.
pub const ZOOM_STEP: f64 = 0.05;

/// Maps canvas coordinates to the screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct View {
    pub zoom: f64,
    /// Screen position of the canvas origin.
    pub view_offset: Vec2,
}

impl Default for View {
    fn default() -> Self {
        Self { zoom: DEFAULT_ZOOM, view_offset: Vec2::ZERO }
    }
}

impl View {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canvas to screen.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.view_offset) * Affine::scale(self.zoom)
    }

    pub fn screen_to_canvas(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.view_offset.x) / self.zoom,
            (screen.y - self.view_offset.y) / self.zoom,
        )
    }

    pub fn canvas_to_screen(&self, canvas: Point) -> Point {
        self.transform() * canvas
    }

    /// Screen-space delta to canvas units.
    pub fn screen_delta(&self, delta: Vec2) -> Vec2 {
        delta / self.zoom
    }

    pub fn pan(&mut self, delta: Vec2) {
        self.view_offset += delta;
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom + ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom - ZOOM_STEP);
    }

    /// Apply a wheel step: negative `delta_y` zooms in.
    pub fn wheel(&mut self, delta_y: f64) {
        if delta_y > 0.0 {
            self.zoom_out();
        } else if delta_y < 0.0 {
            self.zoom_in();
        }
    }

    /// Offset that centers a canvas of `canvas` size in `viewport`.
    pub fn center_canvas(&mut self, canvas: Size, viewport: Size) {
        self.view_offset = Vec2::new(
            (viewport.width - canvas.width * self.zoom) / 2.0,
            (viewport.height - canvas.height * self.zoom) / 2.0,
        );
    }
}
