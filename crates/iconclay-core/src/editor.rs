//! Editor: the scene plus selection, settings, clipboard and history.
//!
//! Every command that changes the document records one history snapshot
//! before mutating. Plain `update_element` calls do not, so continuous
//! gestures can record once at gesture start and then stream updates.

use crate::element::{CanvasElement, ElementId, ElementKind, ElementUpdate, IconLibrary, TextAlign};
use crate::error::SceneError;
use crate::history::History;
use crate::scene::Scene;
use crate::settings::{CanvasSettings, PASTE_OFFSET};
use crate::style::{ClayStyle, material_preset};
use crate::view::View;
use kurbo::{Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The undoable editor state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorState {
    #[serde(rename = "elements", default)]
    pub scene: Scene,
    #[serde(rename = "selectedIds", default)]
    pub selection: Vec<ElementId>,
    #[serde(flatten)]
    pub settings: CanvasSettings,
    #[serde(flatten)]
    pub view: View,
}

impl EditorState {
    pub fn is_selected(&self, id: &ElementId) -> bool {
        self.selection.contains(id)
    }

    /// Selected elements in paint order.
    pub fn selected_elements(&self) -> Vec<&CanvasElement> {
        self.scene.iter().filter(|el| self.is_selected(&el.id)).collect()
    }

    /// Selected elements whose parent is not selected, plus every
    /// descendant of the selected folders among them.
    pub fn movable_selection(&self) -> Vec<ElementId> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        let roots = self.scene.iter().filter(|el| {
            self.is_selected(&el.id) && !el.parent_id.as_ref().is_some_and(|p| self.is_selected(p))
        });
        for root in roots {
            let family = if root.is_folder() { self.scene.descendants_of(&root.id) } else { Vec::new() };
            for id in std::iter::once(root.id.clone()).chain(family) {
                if seen.insert(id.clone()) {
                    out.push(id);
                }
            }
        }
        out
    }
}

/// Modal flags that never survive a session restore.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UiFlags {
    pub is_icon_picker_open: bool,
    pub is_info_open: bool,
    pub is_preview_open: bool,
}

/// Selection target for [`Editor::select`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectTarget {
    Clear,
    One(ElementId),
    Many(Vec<ElementId>),
}

/// Z-order command for the first selected element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arrangement {
    Forward,
    Backward,
    Front,
    Back,
}

/// Where a dragged layer lands relative to the target row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropPosition {
    Above,
    Below,
    Inside,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipAxis {
    Horizontal,
    Vertical,
}

/// Placement offset for new elements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Jitter {
    /// Integer offset in `[-10, 10)` so new elements do not stack exactly.
    Random,
    Fixed(f64),
}

/// Editing session over one document.
#[derive(Debug, Clone)]
pub struct Editor {
    state: EditorState,
    history: History<EditorState>,
    clipboard: Vec<CanvasElement>,
    jitter: Jitter,
    pub ui: UiFlags,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    pub fn new() -> Self {
        Self::from_state(EditorState::default())
    }

    pub fn from_state(state: EditorState) -> Self {
        Self {
            state,
            history: History::new(),
            clipboard: Vec::new(),
            jitter: Jitter::Random,
            ui: UiFlags::default(),
        }
    }

    pub fn with_jitter(mut self, jitter: Jitter) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut EditorState {
        &mut self.state
    }

    pub fn scene(&self) -> &Scene {
        &self.state.scene
    }

    pub fn selection(&self) -> &[ElementId] {
        &self.state.selection
    }

    pub fn settings(&self) -> &CanvasSettings {
        &self.state.settings
    }

    pub fn view(&self) -> &View {
        &self.state.view
    }

    pub fn view_mut(&mut self) -> &mut View {
        &mut self.state.view
    }

    pub fn clipboard(&self) -> &[CanvasElement] {
        &self.clipboard
    }

    /// Replace the canvas settings. Records history.
    pub fn set_settings(&mut self, settings: CanvasSettings) {
        self.record_history();
        self.state.settings = settings;
    }

    // --- History ---

    /// Snapshot the current state. Clears the redo path.
    pub fn record_history(&mut self) {
        self.history.record(self.state.clone());
    }

    pub fn undo(&mut self) -> bool {
        self.history.undo(&mut self.state)
    }

    pub fn redo(&mut self) -> bool {
        self.history.redo(&mut self.state)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Start a new project: default state, empty history and clipboard.
    pub fn reset(&mut self) {
        self.state = EditorState::default();
        self.history.clear();
        self.clipboard.clear();
        self.ui = UiFlags::default();
    }

    /// Replace elements and settings wholesale, clearing the selection.
    pub(crate) fn replace_document(&mut self, scene: Scene, settings: CanvasSettings) {
        self.state.scene = scene;
        self.state.settings = settings;
        self.state.selection.clear();
    }

    // --- Creation ---

    /// Add an element of `kind` centered on the canvas and select it.
    pub fn add_element(&mut self, kind: ElementKind) -> ElementId {
        self.spawn(kind, None)
    }

    /// Swap the glyph of the selected icon, or add a new icon.
    pub fn select_icon(&mut self, name: &str, library: IconLibrary) -> ElementId {
        self.ui.is_icon_picker_open = false;
        let selected_icon = self
            .state
            .selection
            .first()
            .and_then(|id| self.state.scene.get(id))
            .filter(|el| el.kind == ElementKind::Icon)
            .map(|el| el.id.clone());

        match selected_icon {
            Some(id) => {
                self.record_history();
                let update = ElementUpdate {
                    name: Some(name.to_string()),
                    icon_name: Some(name.to_string()),
                    icon_lib: Some(library),
                    ..ElementUpdate::default()
                };
                // Glyph fields carry no hierarchy links, so this cannot fail.
                let _ = self.state.scene.update(&id, &update);
                id
            }
            None => self.spawn(ElementKind::Icon, Some((name, library))),
        }
    }

    fn spawn(&mut self, kind: ElementKind, icon: Option<(&str, IconLibrary)>) -> ElementId {
        self.record_history();

        let uuid = uuid::Uuid::new_v4();
        let jitter = match self.jitter {
            Jitter::Random => f64::from(uuid.as_bytes()[0] % 20) - 10.0,
            Jitter::Fixed(j) => j,
        };
        let canvas = self.state.settings.canvas_size;
        let size = kind.default_size();
        let x = canvas.width / 2.0 - size.width / 2.0 + jitter;
        let y = canvas.height / 2.0 - size.height / 2.0 + jitter;

        let name = match (kind, icon) {
            (_, Some((icon_name, _))) => icon_name.to_string(),
            (ElementKind::Folder, _) => "Group".to_string(),
            _ => format!("{} {}", kind.label(), self.state.scene.len() + 1),
        };

        let mut element = CanvasElement::new(kind, name, Rect::from_origin_size((x, y), size))
            .with_style(kind.default_style(self.state.settings.canvas_fill()));
        element.id = ElementId::from(uuid.to_string());
        element.z_index = self.state.scene.len() as i64;

        match kind {
            ElementKind::Text => {
                element.text = Some("Icon".to_string());
                element.font_size = Some(100.0);
                element.font_weight = Some("700".to_string());
                element.text_align = Some(TextAlign::Center);
                element.letter_spacing = Some(0.0);
                element.text_stroke_width = Some(0.0);
            }
            ElementKind::Icon => {
                let (icon_name, library) = icon.unwrap_or(("Star", IconLibrary::Lucide));
                element.icon_name = Some(icon_name.to_string());
                element.icon_lib = Some(library);
                element.text_stroke_width = Some(2.0);
            }
            _ => {}
        }

        let id = self.state.scene.push(element);
        log::debug!("Added {kind:?} element {id}");
        self.state.selection = vec![id.clone()];
        self.ui.is_icon_picker_open = false;
        id
    }

    // --- Editing ---

    /// Apply a partial update. Does not record history.
    pub fn update_element(&mut self, id: &ElementId, update: &ElementUpdate) -> Result<bool, SceneError> {
        self.state.scene.update(id, update)
    }

    pub fn select(&mut self, target: SelectTarget, multi: bool) {
        let selection = &mut self.state.selection;
        match target {
            SelectTarget::Clear => selection.clear(),
            SelectTarget::One(id) => {
                if !self.state.scene.contains(&id) {
                    log::debug!("select: no element {id}");
                    return;
                }
                if !multi {
                    *selection = vec![id];
                } else if let Some(pos) = selection.iter().position(|s| *s == id) {
                    selection.remove(pos);
                } else {
                    selection.push(id);
                }
            }
            SelectTarget::Many(ids) => {
                if !multi {
                    selection.clear();
                }
                for id in ids {
                    if self.state.scene.contains(&id) && !selection.contains(&id) {
                        selection.push(id);
                    }
                }
            }
        }
    }

    pub fn select_all(&mut self) {
        self.state.selection = self.state.scene.iter().map(|el| el.id.clone()).collect();
    }

    /// Select the layer-list rows between `anchor` and `target` inclusive.
    pub fn select_layer_range(&mut self, anchor: &ElementId, target: &ElementId, multi: bool) -> bool {
        let rows: Vec<ElementId> = self.state.scene.layer_order().into_iter().map(|r| r.id).collect();
        let (Some(a), Some(b)) = (
            rows.iter().position(|id| id == anchor),
            rows.iter().position(|id| id == target),
        ) else {
            return false;
        };
        let range = rows[a.min(b)..=a.max(b)].to_vec();
        self.select(SelectTarget::Many(range), multi);
        true
    }

    /// Delete `ids` (or the selection) with all folder descendants.
    pub fn delete_elements(&mut self, ids: Option<&[ElementId]>) -> Vec<ElementId> {
        let targets: Vec<ElementId> = ids.map_or_else(|| self.state.selection.clone(), <[ElementId]>::to_vec);
        if !targets.iter().any(|id| self.state.scene.contains(id)) {
            return Vec::new();
        }

        self.record_history();
        let removed = self.state.scene.delete(&targets);
        let removed_set: HashSet<&ElementId> = removed.iter().collect();
        self.state.selection.retain(|id| !removed_set.contains(id));
        removed
    }

    pub fn reorder_elements(&mut self, from: usize, to: usize) -> bool {
        if from >= self.state.scene.len() {
            return false;
        }
        self.record_history();
        self.state.scene.reorder(from, to)
    }

    // --- Structure ---

    /// Wrap the selection in a new folder placed just above its top-most
    /// member. The folder keeps a nominal 100x100 box at the origin.
    pub fn group_selection(&mut self) -> Result<Option<ElementId>, SceneError> {
        let selected = self.state.selected_elements();
        let Some(first) = selected.first() else {
            return Ok(None);
        };

        let first_parent = first.parent_id.clone();
        let parent = if selected.iter().all(|el| el.parent_id == first_parent) { first_parent } else { None };
        let folders = self.state.scene.iter().filter(|el| el.is_folder()).count();
        let folder = CanvasElement::new(
            ElementKind::Folder,
            format!("Group {}", folders + 1),
            Rect::new(0.0, 0.0, 100.0, 100.0),
        )
        .with_parent(parent);

        self.wrap_selection(folder).map(Some)
    }

    /// Merge the selected basic shapes into one union folder sized to their
    /// combined box.
    pub fn union_selection(&mut self) -> Result<Option<ElementId>, SceneError> {
        let selected = self.state.selected_elements();
        let Some(first) = selected.first() else {
            return Ok(None);
        };
        if let Some(bad) = selected.iter().find(|el| !el.kind.is_plain_shape()) {
            log::warn!("Union rejected: selection contains a {:?}", bad.kind);
            return Err(SceneError::UnsupportedElementType { operation: "union", kind: bad.kind });
        }

        let bounds = selected
            .iter()
            .map(|el| el.rect())
            .reduce(|a, b| a.union(b))
            .unwrap_or(Rect::ZERO);
        let style = ClayStyle { blur: first.style.blur.max(10.0), ..first.style.clone() };
        let mut folder = CanvasElement::new(ElementKind::Folder, "Union Shape", bounds)
            .with_style(style)
            .with_parent(first.parent_id.clone());
        folder.merge = true;

        self.wrap_selection(folder).map(Some)
    }

    fn wrap_selection(&mut self, mut folder: CanvasElement) -> Result<ElementId, SceneError> {
        let members: Vec<ElementId> = self.state.selected_elements().iter().map(|el| el.id.clone()).collect();
        let insert_at = members
            .iter()
            .filter_map(|id| self.state.scene.index_of(id))
            .max()
            .map_or(self.state.scene.len(), |i| i + 1);
        folder.z_index = self.state.scene.len() as i64;

        // Work on a copy so a rejected member leaves the scene untouched.
        let mut scene = self.state.scene.clone();
        let group = scene.insert(insert_at, folder);
        for id in &members {
            scene.reparent(id, Some(group.clone()))?;
        }

        self.record_history();
        self.state.scene = scene;
        self.state.selection = vec![group.clone()];
        Ok(group)
    }

    /// Dissolve the selected folders, moving their children up one level.
    pub fn ungroup_selection(&mut self) -> Vec<ElementId> {
        let folders: Vec<ElementId> = self
            .state
            .selected_elements()
            .iter()
            .filter(|el| el.is_folder())
            .map(|el| el.id.clone())
            .collect();
        if folders.is_empty() {
            return Vec::new();
        }

        self.record_history();
        let scene = &mut self.state.scene;
        let mut released = Vec::new();
        for folder in &folders {
            let parent = scene.get(folder).and_then(|el| el.parent_id.clone());
            for child in scene.children_of(Some(folder)).to_vec() {
                scene.modify(&child, |el| el.parent_id = parent.clone());
                released.push(child);
            }
            scene.delete(std::slice::from_ref(folder));
        }
        released.retain(|id| scene.contains(id));
        self.state.selection = released.clone();
        released
    }

    /// Clip the upper of two selected shapes by the lower one.
    ///
    /// The lower shape becomes invisible and the upper one stays selected.
    pub fn mask_selection(&mut self) -> Result<ElementId, SceneError> {
        let [a, b] = self.state.selection.as_slice() else {
            return Err(SceneError::InvalidSelection(format!(
                "masking needs exactly 2 elements, got {}",
                self.state.selection.len()
            )));
        };
        let scene = &self.state.scene;
        let (Some(ia), Some(ib)) = (scene.index_of(a), scene.index_of(b)) else {
            return Err(SceneError::InvalidSelection("selection references a missing element".to_string()));
        };
        for i in [ia, ib] {
            let kind = scene.elements()[i].kind;
            if !kind.is_plain_shape() {
                log::warn!("Mask rejected: selection contains a {kind:?}");
                return Err(SceneError::UnsupportedElementType { operation: "mask", kind });
            }
        }

        let (mask, content) = if ia < ib { (a.clone(), b.clone()) } else { (b.clone(), a.clone()) };
        self.record_history();
        let scene = &mut self.state.scene;
        scene.modify(&content, |el| el.mask_id = Some(mask.clone()));
        scene.modify(&mask, |el| el.visible = false);
        self.state.selection = vec![content.clone()];
        Ok(content)
    }

    /// Remove the mask from every selected element and show its mask shape again.
    pub fn unmask_selection(&mut self) -> usize {
        let pairs: Vec<(ElementId, ElementId)> = self
            .state
            .selection
            .iter()
            .filter_map(|id| {
                let mask = self.state.scene.get(id)?.mask_id.clone()?;
                Some((id.clone(), mask))
            })
            .collect();
        if pairs.is_empty() {
            return 0;
        }

        self.record_history();
        let scene = &mut self.state.scene;
        for (target, mask) in &pairs {
            scene.modify(target, |el| el.mask_id = None);
            scene.modify(mask, |el| el.visible = true);
        }
        pairs.len()
    }

    /// Move `id` into `parent` (or to the root).
    pub fn reparent(&mut self, id: &ElementId, parent: Option<ElementId>) -> Result<bool, SceneError> {
        if !self.state.scene.contains(id) {
            return Ok(false);
        }
        if let Some(parent) = &parent {
            self.state.scene.check_parent(id, parent)?;
        }
        self.record_history();
        self.state.scene.reparent(id, parent)
    }

    /// Layer-list drag and drop of `source` onto `target`.
    ///
    /// `Inside` nests the source in the target folder; `Above`/`Below`
    /// adopt the target's parent and move next to it in paint order.
    pub fn drop_layer(
        &mut self,
        source: &ElementId,
        target: &ElementId,
        position: DropPosition,
    ) -> Result<bool, SceneError> {
        if source == target {
            return Ok(false);
        }
        let scene = &self.state.scene;
        let Some(target_el) = scene.get(target) else {
            return Ok(false);
        };
        if !scene.contains(source) {
            return Ok(false);
        }
        if scene.is_descendant(source, target) {
            return Err(SceneError::CyclicHierarchy { element: source.clone(), parent: target.clone() });
        }

        let parent = match position {
            DropPosition::Inside => Some(target.clone()),
            DropPosition::Above | DropPosition::Below => target_el.parent_id.clone(),
        };
        if let Some(parent) = &parent {
            scene.check_parent(source, parent)?;
        }

        self.record_history();
        let scene = &mut self.state.scene;
        scene.reparent(source, parent)?;
        if position != DropPosition::Inside {
            if let (Some(from), Some(to)) = (scene.index_of(source), scene.index_of(target)) {
                let to = if from < to { to - 1 } else { to };
                let dest = if position == DropPosition::Above { to + 1 } else { to };
                scene.reorder(from, dest);
            }
        }
        Ok(true)
    }

    // --- Clipboard ---

    pub fn copy_selection(&mut self) -> usize {
        let selected: Vec<CanvasElement> = self.state.selected_elements().into_iter().cloned().collect();
        if !selected.is_empty() {
            self.clipboard = selected;
        }
        self.clipboard.len()
    }

    /// Paste the clipboard at the root, offset from the originals.
    pub fn paste(&mut self) -> Vec<ElementId> {
        if self.clipboard.is_empty() {
            return Vec::new();
        }
        let items = self.clipboard.clone();
        self.insert_copies(items, false)
    }

    /// Copy the selection in place, keeping each copy in its folder.
    pub fn duplicate_selection(&mut self) -> Vec<ElementId> {
        let items: Vec<CanvasElement> = self.state.selected_elements().into_iter().cloned().collect();
        if items.is_empty() {
            return Vec::new();
        }
        self.insert_copies(items, true)
    }

    fn insert_copies(&mut self, items: Vec<CanvasElement>, keep_parent: bool) -> Vec<ElementId> {
        self.record_history();
        let base = self.state.scene.len();
        let mut ids = Vec::with_capacity(items.len());
        for (i, mut copy) in items.into_iter().enumerate() {
            copy.id = ElementId::new();
            copy.x += PASTE_OFFSET;
            copy.y += PASTE_OFFSET;
            copy.name.push_str(" Copy");
            copy.mask_id = None;
            if !keep_parent {
                copy.parent_id = None;
            }
            copy.z_index = (base + i) as i64;
            ids.push(self.state.scene.push(copy));
        }
        self.state.selection = ids.clone();
        ids
    }

    // --- Transform helpers ---

    /// Move the selection, carrying folder contents along once.
    pub fn nudge_selection(&mut self, dx: f64, dy: f64) {
        let ids = self.state.movable_selection();
        if ids.is_empty() {
            return;
        }
        self.record_history();
        self.state.scene.translate(&ids, Vec2::new(dx, dy));
    }

    /// Change the paint order of the first selected element.
    pub fn arrange(&mut self, arrangement: Arrangement) -> bool {
        let Some(index) = self.state.selection.first().and_then(|id| self.state.scene.index_of(id)) else {
            return false;
        };
        let last = self.state.scene.len() - 1;
        let target = match arrangement {
            Arrangement::Backward => index.saturating_sub(1),
            Arrangement::Forward => (index + 1).min(last),
            Arrangement::Back => 0,
            Arrangement::Front => last,
        };
        if target == index {
            return false;
        }
        self.record_history();
        let scene = &mut self.state.scene;
        match arrangement {
            Arrangement::Backward | Arrangement::Forward => scene.swap(index, target),
            Arrangement::Back | Arrangement::Front => scene.reorder(index, target),
        }
    }

    /// Toggle the mirror flag of every selected element.
    pub fn flip_selected(&mut self, axis: FlipAxis) {
        let ids = self.state.selection.clone();
        if ids.is_empty() {
            return;
        }
        self.record_history();
        for id in &ids {
            self.state.scene.modify(id, |el| match axis {
                FlipAxis::Horizontal => el.flip_x = !el.flip_x,
                FlipAxis::Vertical => el.flip_y = !el.flip_y,
            });
        }
    }

    /// Merge a material preset into every selected element's style.
    pub fn apply_preset(&mut self, preset_id: &str) -> bool {
        let Some(preset) = material_preset(preset_id) else {
            log::warn!("Unknown material preset {preset_id:?}");
            return false;
        };
        if self.state.selection.is_empty() {
            return false;
        }
        self.record_history();
        for id in self.state.selection.clone() {
            self.state.scene.modify(&id, |el| el.style.apply(&preset.patch));
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::ClayColor;

    fn editor() -> Editor {
        Editor::new().with_jitter(Jitter::Fixed(0.0))
    }

    fn el<'a>(editor: &'a Editor, id: &ElementId) -> &'a CanvasElement {
        editor.scene().get(id).unwrap()
    }

    #[test]
    fn test_add_rectangle_defaults() {
        let mut editor = editor();
        let id = editor.add_element(ElementKind::Rectangle);
        let rect = el(&editor, &id);
        assert_eq!((rect.x, rect.y), (192.0, 192.0));
        assert_eq!((rect.width, rect.height), (128.0, 128.0));
        assert_eq!(rect.name, "Rectangle 1");
        assert_eq!(rect.style.depth, 20.0);
        assert_eq!(rect.style.blur, 10.0);
        assert_eq!(rect.style.bevel, 2.0);
        assert_eq!(rect.style.gloss, 15.0);
        assert_eq!(editor.selection(), &[id]);
    }

    #[test]
    fn test_random_jitter_stays_in_range() {
        let mut editor = Editor::new();
        for _ in 0..20 {
            let id = editor.add_element(ElementKind::Circle);
            let x = el(&editor, &id).x;
            assert!((182.0..=201.0).contains(&x), "x = {x}");
        }
    }

    #[test]
    fn test_add_text_and_icon() {
        let mut editor = editor();
        let text = editor.add_element(ElementKind::Text);
        let t = el(&editor, &text);
        assert_eq!((t.width, t.height), (200.0, 100.0));
        assert_eq!(t.y, 206.0);
        assert_eq!(t.text.as_deref(), Some("Icon"));
        assert!(!t.style.lighting);

        let icon = editor.add_element(ElementKind::Icon);
        let i = el(&editor, &icon);
        assert_eq!(i.icon_name.as_deref(), Some("Star"));
        assert_eq!(i.text_stroke_width, Some(2.0));
    }

    #[test]
    fn test_shape_takes_opaque_background() {
        let mut editor = editor();
        let mut settings = editor.settings().clone();
        settings.transparent_background = false;
        settings.background_color = ClayColor::rgb(1, 2, 3);
        editor.set_settings(settings);
        let id = editor.add_element(ElementKind::Squircle);
        assert_eq!(el(&editor, &id).style.color, ClayColor::rgb(1, 2, 3));
    }

    #[test]
    fn test_group_then_scale_folder() {
        let mut editor = editor();
        let rect = editor.add_element(ElementKind::Rounded);
        let group = editor.group_selection().unwrap().unwrap();

        assert_eq!(el(&editor, &group).parent_id, None);
        assert_eq!(el(&editor, &rect).parent_id.as_ref(), Some(&group));
        assert_eq!(editor.selection(), &[group.clone()]);
        assert_eq!(editor.scene().index_of(&group), Some(1));

        // Fit the folder box to its content without cascading, then double it.
        let fit = editor.scene().content_bounds(&group).unwrap();
        editor.state_mut().scene.modify(&group, |f| {
            f.x = fit.x0;
            f.y = fit.y0;
            f.width = fit.width();
            f.height = fit.height();
        });
        editor.update_element(&group, &ElementUpdate::new().size(256.0, 256.0)).unwrap();
        let r = el(&editor, &rect);
        assert_eq!((r.width, r.height), (256.0, 256.0));
        assert_eq!((r.x, r.y), (192.0, 192.0));
        assert_eq!(r.style.border_radius, 80.0);
    }

    #[test]
    fn test_group_keeps_shared_parent() {
        let mut editor = editor();
        let a = editor.add_element(ElementKind::Circle);
        let b = editor.add_element(ElementKind::Circle);
        editor.select(SelectTarget::Many(vec![a.clone(), b.clone()]), false);
        let outer = editor.group_selection().unwrap().unwrap();
        editor.select(SelectTarget::Many(vec![a.clone(), b.clone()]), false);
        let inner = editor.group_selection().unwrap().unwrap();
        assert_eq!(el(&editor, &inner).parent_id.as_ref(), Some(&outer));
        assert_eq!(el(&editor, &inner).name, "Group 2");
    }

    #[test]
    fn test_union_rejects_text_without_mutation() {
        let mut editor = editor();
        let a = editor.add_element(ElementKind::Circle);
        let t = editor.add_element(ElementKind::Text);
        editor.select(SelectTarget::Many(vec![a, t]), false);
        let before = editor.state().clone();
        let undo_depth = editor.history.undo_len();

        let result = editor.union_selection();
        assert!(matches!(
            result,
            Err(SceneError::UnsupportedElementType { kind: ElementKind::Text, .. })
        ));
        assert_eq!(editor.state(), &before);
        assert_eq!(editor.history.undo_len(), undo_depth);
    }

    #[test]
    fn test_union_bounds_and_style() {
        let mut editor = editor();
        let a = editor.add_element(ElementKind::Circle);
        let b = editor.add_element(ElementKind::Star);
        editor.update_element(&b, &ElementUpdate::new().position(300.0, 10.0)).unwrap();
        editor.select(SelectTarget::Many(vec![a.clone(), b.clone()]), false);

        let union = editor.union_selection().unwrap().unwrap();
        let u = el(&editor, &union);
        assert!(u.merge);
        assert_eq!(u.name, "Union Shape");
        assert_eq!(u.rect(), Rect::new(192.0, 10.0, 428.0, 320.0));
        assert_eq!(u.style.blur, 10.0);
        assert_eq!(u.style.border_radius, 999.0);
        assert_eq!(editor.scene().children_of(Some(&union)).len(), 2);
    }

    #[test]
    fn test_ungroup_releases_children() {
        let mut editor = editor();
        let a = editor.add_element(ElementKind::Circle);
        let group = editor.group_selection().unwrap().unwrap();
        let released = editor.ungroup_selection();
        assert_eq!(released, vec![a.clone()]);
        assert!(!editor.scene().contains(&group));
        assert_eq!(el(&editor, &a).parent_id, None);
        assert_eq!(editor.selection(), &[a]);
    }

    #[test]
    fn test_mask_and_unmask_roundtrip() {
        let mut editor = editor();
        let bottom = editor.add_element(ElementKind::Circle);
        let top = editor.add_element(ElementKind::Rectangle);
        editor.select(SelectTarget::Many(vec![top.clone(), bottom.clone()]), false);

        assert_eq!(editor.mask_selection(), Ok(top.clone()));
        assert!(!el(&editor, &bottom).visible);
        assert_eq!(el(&editor, &top).mask_id.as_ref(), Some(&bottom));
        assert_eq!(editor.selection(), &[top.clone()]);

        assert_eq!(editor.unmask_selection(), 1);
        assert!(el(&editor, &bottom).visible);
        assert_eq!(el(&editor, &top).mask_id, None);
    }

    #[test]
    fn test_mask_requires_two_shapes() {
        let mut editor = editor();
        let a = editor.add_element(ElementKind::Circle);
        assert!(matches!(editor.mask_selection(), Err(SceneError::InvalidSelection(_))));
        let icon = editor.add_element(ElementKind::Icon);
        editor.select(SelectTarget::Many(vec![a, icon]), false);
        assert!(matches!(editor.mask_selection(), Err(SceneError::UnsupportedElementType { .. })));
    }

    #[test]
    fn test_delete_masking_element_clears_mask() {
        let mut editor = editor();
        let bottom = editor.add_element(ElementKind::Circle);
        let top = editor.add_element(ElementKind::Rectangle);
        editor.select(SelectTarget::Many(vec![bottom.clone(), top.clone()]), false);
        editor.mask_selection().unwrap();

        editor.delete_elements(Some(std::slice::from_ref(&bottom)));
        assert_eq!(el(&editor, &top).mask_id, None);
        assert_eq!(editor.selection(), &[top]);
    }

    #[test]
    fn test_select_modes() {
        let mut editor = editor();
        let a = editor.add_element(ElementKind::Circle);
        let b = editor.add_element(ElementKind::Circle);

        editor.select(SelectTarget::One(a.clone()), false);
        editor.select(SelectTarget::One(b.clone()), true);
        assert_eq!(editor.selection(), &[a.clone(), b.clone()]);
        editor.select(SelectTarget::One(a.clone()), true);
        assert_eq!(editor.selection(), &[b.clone()]);
        editor.select(SelectTarget::Many(vec![a.clone(), b.clone()]), true);
        assert_eq!(editor.selection(), &[b.clone(), a.clone()]);
        editor.select(SelectTarget::Clear, false);
        assert!(editor.selection().is_empty());
        editor.select(SelectTarget::One(ElementId::from("ghost")), false);
        assert!(editor.selection().is_empty());
    }

    #[test]
    fn test_paste_and_duplicate() {
        let mut editor = editor();
        let a = editor.add_element(ElementKind::Circle);
        let group = editor.group_selection().unwrap().unwrap();
        editor.select(SelectTarget::One(a.clone()), false);

        let dup = editor.duplicate_selection();
        let d = el(&editor, &dup[0]);
        assert_eq!(d.parent_id.as_ref(), Some(&group));
        assert_eq!(d.name, "Circle 1 Copy");
        assert_eq!(d.x, 212.0);

        editor.select(SelectTarget::One(a.clone()), false);
        assert_eq!(editor.copy_selection(), 1);
        let pasted = editor.paste();
        let p = el(&editor, &pasted[0]);
        assert_eq!(p.parent_id, None);
        assert_ne!(p.id, a);
        assert_eq!(editor.selection(), pasted.as_slice());
    }

    #[test]
    fn test_nudge_moves_folder_content_once() {
        let mut editor = editor();
        let a = editor.add_element(ElementKind::Circle);
        let group = editor.group_selection().unwrap().unwrap();
        editor.select(SelectTarget::Many(vec![group.clone(), a.clone()]), false);
        editor.nudge_selection(1.0, -2.0);
        assert_eq!((el(&editor, &a).x, el(&editor, &a).y), (193.0, 190.0));
        assert_eq!(el(&editor, &group).x, 1.0);
    }

    #[test]
    fn test_arrange() {
        let mut editor = editor();
        let a = editor.add_element(ElementKind::Circle);
        let b = editor.add_element(ElementKind::Circle);
        let c = editor.add_element(ElementKind::Circle);
        editor.select(SelectTarget::One(a.clone()), false);
        assert!(editor.arrange(Arrangement::Front));
        assert_eq!(editor.scene().index_of(&a), Some(2));
        assert!(editor.arrange(Arrangement::Backward));
        assert_eq!(editor.scene().index_of(&a), Some(1));
        assert!(editor.arrange(Arrangement::Forward));
        assert_eq!(editor.scene().index_of(&a), Some(2));
        editor.select(SelectTarget::One(c.clone()), false);
        assert!(editor.arrange(Arrangement::Back));
        assert_eq!(editor.scene().index_of(&c), Some(0));
        assert!(editor.scene().contains(&b));
    }

    #[test]
    fn test_arrange_at_edge_keeps_history() {
        let mut editor = editor();
        let a = editor.add_element(ElementKind::Circle);
        let b = editor.add_element(ElementKind::Circle);
        editor.select(SelectTarget::One(a.clone()), false);
        let depth = editor.history.undo_len();

        assert!(!editor.arrange(Arrangement::Backward));
        assert!(!editor.arrange(Arrangement::Back));
        assert_eq!(editor.scene().index_of(&a), Some(0));
        editor.select(SelectTarget::One(b.clone()), false);
        assert!(!editor.arrange(Arrangement::Forward));
        assert!(!editor.arrange(Arrangement::Front));
        assert_eq!(editor.scene().index_of(&b), Some(1));
        assert_eq!(editor.history.undo_len(), depth);

        // A refused move leaves the redo path alone.
        assert!(editor.undo());
        let only = editor.scene().elements()[0].id.clone();
        editor.select(SelectTarget::One(only), false);
        assert!(!editor.arrange(Arrangement::Front));
        assert!(editor.can_redo());
    }

    #[test]
    fn test_history_linearity() {
        let mut editor = editor();
        let s0 = editor.state().clone();
        editor.add_element(ElementKind::Circle);
        let s1 = editor.state().clone();

        assert!(editor.undo());
        assert_eq!(editor.state(), &s0);
        assert!(editor.redo());
        assert_eq!(editor.state(), &s1);

        assert!(editor.undo());
        editor.add_element(ElementKind::Star);
        assert!(!editor.redo());
    }

    #[test]
    fn test_drop_layer_rules() {
        let mut editor = editor();
        let a = editor.add_element(ElementKind::Circle);
        let outer = editor.group_selection().unwrap().unwrap();
        let b = editor.add_element(ElementKind::Circle);

        assert!(matches!(
            editor.drop_layer(&outer, &a, DropPosition::Above),
            Err(SceneError::CyclicHierarchy { .. })
        ));
        assert_eq!(editor.drop_layer(&b, &outer, DropPosition::Inside), Ok(true));
        assert_eq!(el(&editor, &b).parent_id.as_ref(), Some(&outer));

        assert_eq!(editor.drop_layer(&b, &outer, DropPosition::Below), Ok(true));
        assert_eq!(el(&editor, &b).parent_id, None);
        let (ib, io) = (editor.scene().index_of(&b).unwrap(), editor.scene().index_of(&outer).unwrap());
        assert_eq!(ib + 1, io);
    }

    #[test]
    fn test_layer_range_select() {
        let mut editor = editor();
        let a = editor.add_element(ElementKind::Circle);
        let b = editor.add_element(ElementKind::Circle);
        let c = editor.add_element(ElementKind::Circle);
        assert!(editor.select_layer_range(&c, &a, false));
        assert_eq!(editor.selection(), &[c, b, a]);
    }

    #[test]
    fn test_select_icon_swaps_or_adds() {
        let mut editor = editor();
        let icon = editor.select_icon("Heart", IconLibrary::HeroiconsSolid);
        assert_eq!(el(&editor, &icon).name, "Heart");
        let same = editor.select_icon("Bell", IconLibrary::Lucide);
        assert_eq!(same, icon);
        assert_eq!(el(&editor, &icon).icon_name.as_deref(), Some("Bell"));
        assert_eq!(editor.scene().len(), 1);
    }

    #[test]
    fn test_apply_preset_and_flip() {
        let mut editor = editor();
        let a = editor.add_element(ElementKind::Circle);
        assert!(editor.apply_preset("liquid-metal"));
        assert_eq!(el(&editor, &a).style.gloss, 90.0);
        assert!(!editor.apply_preset("nope"));

        editor.flip_selected(FlipAxis::Horizontal);
        assert!(el(&editor, &a).flip_x);
        assert!(!el(&editor, &a).flip_y);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut editor = editor();
        editor.add_element(ElementKind::Circle);
        editor.copy_selection();
        editor.reset();
        assert!(editor.scene().is_empty());
        assert!(!editor.can_undo());
        assert!(editor.clipboard().is_empty());
    }
}
