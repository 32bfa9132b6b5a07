//! Error types for scene editing and project files.

use crate::element::{ElementId, ElementKind};
use thiserror::Error;

/// Rejected scene operation. The scene is left unchanged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    #[error("{operation} is not supported for {kind:?} elements")]
    UnsupportedElementType { operation: &'static str, kind: ElementKind },
    #[error("moving {element} under {parent} would create a cycle")]
    CyclicHierarchy { element: ElementId, parent: ElementId },
    #[error("{0} is not a folder")]
    NotAFolder(ElementId),
    #[error("invalid selection: {0}")]
    InvalidSelection(String),
}

/// Project file load/save failure.
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for ProjectError {
    fn from(err: serde_json::Error) -> Self {
        ProjectError::Serialization(err.to_string())
    }
}
