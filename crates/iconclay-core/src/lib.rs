//! IconClay Core Library
//!
//! Style model, scene graph and editing operations for the IconClay icon
//! designer. Nothing in this crate renders; see `iconclay-render`.

pub mod editor;
pub mod element;
pub mod error;
pub mod geometry;
pub mod guides;
pub mod history;
pub mod interaction;
pub mod project;
pub mod scene;
pub mod settings;
pub mod storage;
pub mod style;
pub mod view;

pub use editor::{Arrangement, DropPosition, Editor, EditorState, FlipAxis, Jitter, SelectTarget, UiFlags};
pub use element::{CanvasElement, ElementId, ElementKind, ElementUpdate, IconLibrary, TextAlign};
pub use error::{ProjectError, SceneError};
pub use guides::{Guide, GuideOrientation, SmartGuides, compute_smart_guides};
pub use history::History;
pub use interaction::{Interaction, Modifiers, PointerButton, PressOutcome, ResizeHandle};
pub use project::ProjectFile;
pub use scene::{LayerRow, Scene};
pub use settings::CanvasSettings;
pub use style::{BlendMode, ClayColor, ClayStyle, GradientType, MaterialPreset, StylePatch, SurfacePattern};
pub use view::View;
