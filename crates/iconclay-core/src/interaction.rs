//! Pointer gestures on the canvas: pan, box select, move and resize.
//!
//! The controller owns no event loop. A host forwards pointer samples in
//! screen coordinates and the controller turns them into editor updates.
//! Move and resize record one history snapshot at gesture start and then
//! stream plain element updates, so a whole drag undoes in one step.

use crate::editor::{Editor, SelectTarget};
use crate::element::{CanvasElement, ElementId, ElementUpdate};
use crate::geometry::{element_bounds, element_contains};
use crate::guides::{Guide, SMART_GUIDE_THRESHOLD, compute_smart_guides, snap_value};
use crate::scene::Scene;
use kurbo::{Point, Rect, Vec2};

/// Corner handle of the selection frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeHandle {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl ResizeHandle {
    /// Sign of the width and height change for a local drag delta.
    fn signs(self) -> (f64, f64) {
        match self {
            ResizeHandle::TopLeft => (-1.0, -1.0),
            ResizeHandle::TopRight => (1.0, -1.0),
            ResizeHandle::BottomLeft => (-1.0, 1.0),
            ResizeHandle::BottomRight => (1.0, 1.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Middle,
    Secondary,
}

/// Keyboard modifiers held during a pointer press.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub meta: bool,
    pub alt: bool,
}

impl Modifiers {
    /// Additive selection (shift, ctrl or cmd).
    pub fn multi(self) -> bool {
        self.shift || self.ctrl || self.meta
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Gesture {
    Pan {
        start: Point,
        initial_offset: Vec2,
    },
    BoxSelect {
        start: Point,
        current: Point,
        initial_selection: Vec<ElementId>,
    },
    Move {
        id: ElementId,
        start: Point,
        initial: Rect,
    },
    Resize {
        id: ElementId,
        handle: ResizeHandle,
        start: Point,
        initial: Rect,
        rotation: f64,
    },
}

/// What a pointer press started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PressOutcome {
    Panning,
    BoxSelecting,
    Moving(ElementId),
    /// The press landed on a locked element and was swallowed.
    Locked(ElementId),
    Ignored,
}

/// Canvas gesture state machine.
#[derive(Debug, Clone, Default)]
pub struct Interaction {
    gesture: Option<Gesture>,
    guides: Vec<Guide>,
}

impl Interaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.gesture.is_some()
    }

    /// Guides from the latest move sample.
    pub fn guides(&self) -> &[Guide] {
        &self.guides
    }

    /// The box-select rectangle in canvas coordinates, while one is active.
    pub fn marquee(&self) -> Option<Rect> {
        match &self.gesture {
            Some(Gesture::BoxSelect { start, current, .. }) => Some(Rect::from_points(*start, *current)),
            _ => None,
        }
    }

    /// Handle a press at `screen`.
    ///
    /// Middle button or alt pans. A press on an element selects it and
    /// starts a move; a press on empty canvas starts a box selection.
    pub fn pointer_down(
        &mut self,
        editor: &mut Editor,
        screen: Point,
        button: PointerButton,
        modifiers: Modifiers,
    ) -> PressOutcome {
        self.guides.clear();

        if button == PointerButton::Middle || modifiers.alt {
            self.gesture = Some(Gesture::Pan { start: screen, initial_offset: editor.view().view_offset });
            return PressOutcome::Panning;
        }
        if button != PointerButton::Primary {
            return PressOutcome::Ignored;
        }

        let point = editor.view().screen_to_canvas(screen);
        if let Some(hit) = hit_test(editor.scene(), point) {
            let Some(element) = editor.scene().get(&hit) else {
                return PressOutcome::Ignored;
            };
            if element.locked {
                return PressOutcome::Locked(hit);
            }
            let initial = element.rect();

            editor.select(SelectTarget::One(hit.clone()), modifiers.multi());
            editor.record_history();
            self.gesture = Some(Gesture::Move { id: hit.clone(), start: screen, initial });
            return PressOutcome::Moving(hit);
        }

        let initial_selection = if modifiers.multi() { editor.selection().to_vec() } else { Vec::new() };
        if !modifiers.multi() {
            editor.select(SelectTarget::Clear, false);
        }
        self.gesture = Some(Gesture::BoxSelect { start: point, current: point, initial_selection });
        PressOutcome::BoxSelecting
    }

    /// Start resizing `id` from one of its corner handles.
    pub fn begin_resize(&mut self, editor: &mut Editor, id: &ElementId, handle: ResizeHandle, screen: Point) -> bool {
        let Some(element) = editor.scene().get(id) else {
            log::debug!("begin_resize: no element {id}");
            return false;
        };
        if element.locked {
            return false;
        }
        let (initial, rotation) = (element.rect(), element.rotation);

        editor.record_history();
        self.guides.clear();
        self.gesture = Some(Gesture::Resize { id: id.clone(), handle, start: screen, initial, rotation });
        true
    }

    /// Feed a pointer sample. Returns true if the editor changed.
    pub fn pointer_move(&mut self, editor: &mut Editor, screen: Point) -> bool {
        let Some(gesture) = self.gesture.as_mut() else {
            return false;
        };

        match gesture {
            Gesture::Pan { start, initial_offset } => {
                editor.view_mut().view_offset = *initial_offset + (screen - *start);
                true
            }
            Gesture::BoxSelect { start, current, initial_selection } => {
                *current = editor.view().screen_to_canvas(screen);
                let area = Rect::from_points(*start, *current);
                let mut selection = initial_selection.clone();
                for el in editor.scene().iter() {
                    if el.visible && !el.locked && overlaps(element_bounds(el), area) && !selection.contains(&el.id) {
                        selection.push(el.id.clone());
                    }
                }
                editor.select(SelectTarget::Many(selection), false);
                true
            }
            Gesture::Move { id, start, initial } => {
                let (id, start, initial) = (id.clone(), *start, *initial);
                self.guides = drag_element(editor, &id, start, initial, screen);
                true
            }
            Gesture::Resize { id, handle, start, initial, rotation } => {
                let (id, handle, start, initial, rotation) = (id.clone(), *handle, *start, *initial, *rotation);
                resize_element(editor, &id, handle, start, initial, rotation, screen)
            }
        }
    }

    /// End the current gesture.
    pub fn pointer_up(&mut self) {
        self.gesture = None;
        self.guides.clear();
    }
}

/// Topmost visible, non-folder element under `point` (canvas coordinates).
///
/// Locked elements are still hit so a press on them does not fall through
/// to the canvas.
pub fn hit_test(scene: &Scene, point: Point) -> Option<ElementId> {
    scene
        .iter()
        .rev()
        .filter(|el| el.visible && !el.is_folder())
        .find(|el| element_contains(el, point))
        .map(|el| el.id.clone())
}

fn overlaps(a: Rect, b: Rect) -> bool {
    !(a.x0 > b.x1 || a.x1 < b.x0 || a.y0 > b.y1 || a.y1 < b.y0)
}

fn drag_element(editor: &mut Editor, id: &ElementId, start: Point, initial: Rect, screen: Point) -> Vec<Guide> {
    let delta = editor.view().screen_delta(screen - start);
    let mut origin = initial.origin() + delta;

    let scene = editor.scene();
    let family = scene.descendants_of(id);
    let others: Vec<&CanvasElement> = scene
        .iter()
        .filter(|el| el.id != *id && !family.contains(&el.id))
        .collect();
    let moving = Rect::from_origin_size(origin, initial.size());
    let snap = compute_smart_guides(
        moving,
        &others,
        editor.settings().canvas_size,
        editor.view().zoom,
        SMART_GUIDE_THRESHOLD,
    );

    let settings = editor.settings();
    if snap.is_snapped() {
        origin += snap.offset();
    } else if settings.snap_to_grid {
        origin.x = snap_value(origin.x, settings.grid_size);
        origin.y = snap_value(origin.y, settings.grid_size);
    }

    if let Err(err) = editor.update_element(id, &ElementUpdate::new().position(origin.x, origin.y)) {
        log::warn!("Move of {id} rejected: {err}");
    }
    snap.guides
}

/// Corner resize in the element's rotated frame, keeping the opposite
/// corner fixed on screen.
fn resize_element(
    editor: &mut Editor,
    id: &ElementId,
    handle: ResizeHandle,
    start: Point,
    initial: Rect,
    rotation: f64,
    screen: Point,
) -> bool {
    let raw = editor.view().screen_delta(screen - start);
    let (sin, cos) = rotation.to_radians().sin_cos();
    let local = Vec2::new(raw.x * cos + raw.y * sin, raw.y * cos - raw.x * sin);

    let (sx, sy) = handle.signs();
    let settings = editor.settings();
    let min_size = settings.grid_size.max(crate::element::MIN_ELEMENT_SIZE);
    let fit = |value: f64| {
        let value = value.max(min_size);
        if settings.snap_to_grid { snap_value(value, settings.grid_size).max(min_size) } else { value }
    };
    let width = fit(initial.width() + sx * local.x);
    let height = fit(initial.height() + sy * local.y);

    // Shift the center by half the size change toward the dragged corner.
    let shift = Vec2::new(sx * (width - initial.width()) / 2.0, sy * (height - initial.height()) / 2.0);
    let global = Vec2::new(shift.x * cos - shift.y * sin, shift.x * sin + shift.y * cos);
    let center = initial.center() + global;

    let update = ElementUpdate::new()
        .position(center.x - width / 2.0, center.y - height / 2.0)
        .size(width, height);
    match editor.update_element(id, &update) {
        Ok(changed) => changed,
        Err(err) => {
            log::warn!("Resize of {id} rejected: {err}");
            false
        }
    }
}
