//! `.clay` project files.

use crate::editor::Editor;
use crate::element::CanvasElement;
use crate::error::ProjectError;
use crate::scene::Scene;
use crate::settings::CanvasSettings;
use crate::style::ClayColor;
use kurbo::Size;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

pub const PROJECT_VERSION: &str = "1.0.0";
pub const PROJECT_EXTENSION: &str = "clay";

/// On-disk project layout. Settings are optional on load and fall back to
/// the editor's current values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFile {
    #[serde(default)]
    pub version: String,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub timestamp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canvas_size: Option<Size>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<ClayColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transparent_background: Option<bool>,
    pub elements: Vec<CanvasElement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_grid: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snap_to_grid: Option<bool>,
}

impl ProjectFile {
    pub fn new(elements: Vec<CanvasElement>, settings: &CanvasSettings) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        Self {
            version: PROJECT_VERSION.to_string(),
            timestamp,
            canvas_size: Some(settings.canvas_size),
            background_color: Some(settings.background_color),
            transparent_background: Some(settings.transparent_background),
            elements,
            grid_size: Some(settings.grid_size),
            show_grid: Some(settings.show_grid),
            snap_to_grid: Some(settings.snap_to_grid),
        }
    }

    /// Parse a project, requiring an `elements` array.
    pub fn from_json(json: &str) -> Result<Self, ProjectError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        match value.get("elements") {
            Some(serde_json::Value::Array(_)) => {}
            Some(_) => return Err(ProjectError::Serialization("`elements` must be an array".to_string())),
            None => return Err(ProjectError::Serialization("missing `elements`".to_string())),
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_json(&self) -> Result<String, ProjectError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Settings from the file, with absent fields taken from `current`.
    pub fn settings_over(&self, current: &CanvasSettings) -> CanvasSettings {
        CanvasSettings {
            canvas_size: self.canvas_size.unwrap_or(current.canvas_size),
            background_color: self.background_color.unwrap_or(current.background_color),
            transparent_background: self.transparent_background.unwrap_or(current.transparent_background),
            grid_size: self.grid_size.unwrap_or(current.grid_size),
            show_grid: self.show_grid.unwrap_or(current.show_grid),
            snap_to_grid: self.snap_to_grid.unwrap_or(current.snap_to_grid),
        }
    }

    pub fn read(path: impl AsRef<Path>) -> Result<Self, ProjectError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), ProjectError> {
        let json = self.to_json()?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

impl Editor {
    /// Snapshot the document as a project file.
    pub fn to_project(&self) -> ProjectFile {
        ProjectFile::new(self.scene().elements().to_vec(), self.settings())
    }

    pub fn save_project_json(&self) -> Result<String, ProjectError> {
        self.to_project().to_json()
    }

    /// Replace the document with a parsed project and clear the selection.
    /// Records history so a load can be undone.
    pub fn load_project(&mut self, project: ProjectFile) {
        let settings = project.settings_over(self.settings());
        let count = project.elements.len();
        self.record_history();
        self.replace_document(Scene::from_elements(project.elements), settings);
        log::info!("Loaded project v{} with {count} elements", project.version);
    }

    /// Parse and load a project. On error the editor is left untouched.
    pub fn load_project_json(&mut self, json: &str) -> Result<(), ProjectError> {
        let project = ProjectFile::from_json(json)?;
        self.load_project(project);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::{Jitter, SelectTarget};
    use crate::element::ElementKind;

    fn editor_with_shape() -> Editor {
        let mut editor = Editor::new().with_jitter(Jitter::Fixed(0.0));
        editor.add_element(ElementKind::Hexagon);
        editor
    }

    #[test]
    fn test_save_shape() {
        let editor = editor_with_shape();
        let json = editor.save_project_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["version"], "1.0.0");
        assert_eq!(value["canvasSize"]["width"], 512.0);
        assert_eq!(value["backgroundColor"], "#252525");
        assert_eq!(value["transparentBackground"], true);
        assert_eq!(value["gridSize"], 16.0);
        assert_eq!(value["elements"][0]["type"], "hexagon");
        assert!(value["timestamp"].as_u64().unwrap() > 0);
    }

    #[test]
    fn test_roundtrip_replaces_document() {
        let source = editor_with_shape();
        let json = source.save_project_json().unwrap();

        let mut editor = Editor::new();
        let other = editor.add_element(ElementKind::Circle);
        editor.select(SelectTarget::One(other), false);
        editor.load_project_json(&json).unwrap();

        assert_eq!(editor.scene(), source.scene());
        assert!(editor.selection().is_empty());
        assert!(editor.undo());
        assert_eq!(editor.scene().len(), 1);
        assert_eq!(editor.scene().elements()[0].kind, ElementKind::Circle);
    }

    #[test]
    fn test_missing_settings_keep_current() {
        let mut editor = Editor::new();
        let mut settings = editor.settings().clone();
        settings.grid_size = 8.0;
        editor.set_settings(settings);

        editor.load_project_json(r#"{"elements": [], "showGrid": false}"#).unwrap();
        assert_eq!(editor.settings().grid_size, 8.0);
        assert!(!editor.settings().show_grid);
    }

    #[test]
    fn test_invalid_files_leave_state_untouched() {
        let mut editor = editor_with_shape();
        let before = editor.state().clone();

        for bad in [r#"{"elements": {}}"#, r#"{"version": "1.0.0"}"#, "not json", r#"{"elements": [{"id": 3}]}"#] {
            let err = editor.load_project_json(bad).unwrap_err();
            assert!(matches!(err, ProjectError::Serialization(_)), "{bad}: {err}");
            assert_eq!(editor.state(), &before);
        }
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(format!("icon.{PROJECT_EXTENSION}"));
        let editor = editor_with_shape();
        editor.to_project().write(&path).unwrap();

        let project = ProjectFile::read(&path).unwrap();
        assert_eq!(project.elements, editor.scene().elements());
        assert!(matches!(
            ProjectFile::read(dir.path().join("missing.clay")),
            Err(ProjectError::Io(_))
        ));
    }
}
