//! Error types for rendering and export.

use iconclay_core::IconLibrary;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IconError {
    #[error("icon `{name}` not found in {library:?}")]
    NotFound { library: IconLibrary, name: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The glyph and the fallback glyph were both unavailable.
    #[error("icon unavailable: {0}")]
    Icon(#[from] IconError),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("image payload is empty")]
    EmptyPayload,
    #[error("invalid PNG payload: {0}")]
    InvalidPng(String),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
