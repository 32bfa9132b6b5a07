//! The element store.
//!
//! Elements live in one flat list whose order is the paint order (later is
//! on top). Hierarchy is expressed through `parent_id` back-pointers, so
//! z-order can interleave across folders. Lookups go through an index that
//! is rebuilt whenever ids, order or hierarchy links change.

use crate::element::{CanvasElement, ElementId, ElementKind, ElementUpdate};
use crate::error::SceneError;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// One row of the layer list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerRow {
    pub id: ElementId,
    /// Nesting level, 0 for root elements.
    pub depth: usize,
}

#[derive(Debug, Clone, Default)]
struct SceneIndex {
    positions: HashMap<ElementId, usize>,
    /// Children in paint order, keyed by parent (`None` for roots).
    children: HashMap<Option<ElementId>, Vec<ElementId>>,
}

/// Ordered element collection with indexed hierarchy queries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<CanvasElement>", into = "Vec<CanvasElement>")]
pub struct Scene {
    elements: Vec<CanvasElement>,
    index: SceneIndex,
}

impl PartialEq for Scene {
    fn eq(&self, other: &Self) -> bool {
        self.elements == other.elements
    }
}

impl From<Vec<CanvasElement>> for Scene {
    fn from(elements: Vec<CanvasElement>) -> Self {
        Self::from_elements(elements)
    }
}

impl From<Scene> for Vec<CanvasElement> {
    fn from(scene: Scene) -> Self {
        scene.elements
    }
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a scene from loaded elements, repairing duplicate ids,
    /// dangling references and parent cycles.
    pub fn from_elements(elements: Vec<CanvasElement>) -> Self {
        let mut scene = Self { elements, index: SceneIndex::default() };
        scene.dedupe_ids();
        scene.reindex();
        scene
    }

    pub fn elements(&self) -> &[CanvasElement] {
        &self.elements
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &CanvasElement> {
        self.elements.iter()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn index_of(&self, id: &ElementId) -> Option<usize> {
        self.index.positions.get(id).copied()
    }

    pub fn contains(&self, id: &ElementId) -> bool {
        self.index.positions.contains_key(id)
    }

    pub fn get(&self, id: &ElementId) -> Option<&CanvasElement> {
        self.index_of(id).map(|i| &self.elements[i])
    }

    /// Direct children of `parent` in paint order; `None` yields the roots.
    pub fn children_of(&self, parent: Option<&ElementId>) -> &[ElementId] {
        self.index
            .children
            .get(&parent.cloned())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All transitive descendants of `id`, depth first.
    pub fn descendants_of(&self, id: &ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut visited = HashSet::from([id.clone()]);
        let mut stack: Vec<&ElementId> = self.children_of(Some(id)).iter().rev().collect();
        while let Some(next) = stack.pop() {
            if !visited.insert(next.clone()) {
                continue;
            }
            out.push(next.clone());
            stack.extend(self.children_of(Some(next)).iter().rev());
        }
        out
    }

    /// Whether `candidate` sits somewhere below `ancestor`.
    pub fn is_descendant(&self, ancestor: &ElementId, candidate: &ElementId) -> bool {
        let mut visited = HashSet::new();
        let mut current = self.get(candidate).and_then(|el| el.parent_id.as_ref());
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            if !visited.insert(parent) {
                return false;
            }
            current = self.get(parent).and_then(|el| el.parent_id.as_ref());
        }
        false
    }

    /// The element whose shape clips `id`, if any.
    pub fn mask_of(&self, id: &ElementId) -> Option<&CanvasElement> {
        self.get(id)
            .and_then(|el| el.mask_id.as_ref())
            .and_then(|mask| self.get(mask))
    }

    /// Append an element on top of the paint order.
    pub fn push(&mut self, element: CanvasElement) -> ElementId {
        let len = self.elements.len();
        self.insert(len, element)
    }

    /// Insert an element at `index` (clamped to the end).
    pub fn insert(&mut self, index: usize, mut element: CanvasElement) -> ElementId {
        if self.contains(&element.id) {
            log::warn!("Duplicate element id {}, assigning a fresh one", element.id);
            element.id = ElementId::new();
        }
        let id = element.id.clone();
        let index = index.min(self.elements.len());
        self.elements.insert(index, element);
        self.reindex();
        id
    }

    /// Mutate one element in place. Returns false if `id` is unknown.
    ///
    /// The id is fixed: a change made through `f` is reverted. Hierarchy
    /// links changed through `f` are validated lazily: dangling or cyclic
    /// links are healed when the index is rebuilt.
    pub fn modify(&mut self, id: &ElementId, f: impl FnOnce(&mut CanvasElement)) -> bool {
        let Some(i) = self.index_of(id) else {
            log::debug!("modify: no element {id}");
            return false;
        };
        let el = &mut self.elements[i];
        let links = (el.parent_id.clone(), el.mask_id.clone());
        f(el);
        if el.id != *id {
            log::warn!("modify: id of {id} cannot change, keeping it");
            el.id = id.clone();
        }
        if (el.parent_id.clone(), el.mask_id.clone()) != links {
            self.reindex();
        }
        true
    }

    /// Apply a partial update, cascading folder resizes and moves to every
    /// descendant.
    ///
    /// Unknown ids are a no-op (`Ok(false)`). A parent change that would
    /// create a cycle or target a non-folder is rejected before anything is
    /// mutated.
    pub fn update(&mut self, id: &ElementId, update: &ElementUpdate) -> Result<bool, SceneError> {
        let Some(i) = self.index_of(id) else {
            log::debug!("update: no element {id}");
            return Ok(false);
        };
        if let Some(Some(parent)) = &update.parent_id {
            self.check_parent(id, parent)?;
        }

        let element = &self.elements[i];
        if element.is_folder() {
            let old = Point::new(element.x, element.y);
            let new = Point::new(update.x.unwrap_or(old.x), update.y.unwrap_or(old.y));
            if update.resizes(element) {
                let mut resized = element.clone();
                update.apply_to(&mut resized);
                let sx = resized.width / if element.width == 0.0 { 1.0 } else { element.width };
                let sy = resized.height / if element.height == 0.0 { 1.0 } else { element.height };
                for child in self.descendants_of(id) {
                    if let Some(j) = self.index_of(&child) {
                        self.elements[j].rescale(old, new, sx, sy);
                    }
                }
            } else if new != old {
                self.translate(&self.descendants_of(id), new - old);
            }
        }

        let touches_links = update.parent_id.is_some() || update.mask_id.is_some();
        update.apply_to(&mut self.elements[i]);
        if touches_links {
            self.reindex();
        }
        Ok(true)
    }

    /// Move `id` under `parent` (or to the root).
    pub fn reparent(&mut self, id: &ElementId, parent: Option<ElementId>) -> Result<bool, SceneError> {
        if !self.contains(id) {
            log::debug!("reparent: no element {id}");
            return Ok(false);
        }
        if let Some(parent) = &parent {
            self.check_parent(id, parent)?;
        }
        Ok(self.modify(id, |el| el.parent_id = parent))
    }

    /// Validate that `parent` may become the parent of `id`.
    pub fn check_parent(&self, id: &ElementId, parent: &ElementId) -> Result<(), SceneError> {
        if parent == id || self.is_descendant(id, parent) {
            return Err(SceneError::CyclicHierarchy { element: id.clone(), parent: parent.clone() });
        }
        match self.get(parent) {
            Some(el) if el.kind == ElementKind::Folder => Ok(()),
            _ => Err(SceneError::NotAFolder(parent.clone())),
        }
    }

    /// Translate the given elements by `delta`.
    pub fn translate(&mut self, ids: &[ElementId], delta: Vec2) {
        for id in ids {
            if let Some(i) = self.index_of(id) {
                let el = &mut self.elements[i];
                el.x += delta.x;
                el.y += delta.y;
            }
        }
    }

    /// Delete elements and, for folders, all their descendants.
    ///
    /// Elements masked by a deleted element lose their mask. Returns every
    /// removed id.
    pub fn delete(&mut self, ids: &[ElementId]) -> Vec<ElementId> {
        let mut doomed: Vec<ElementId> = Vec::new();
        let mut seen = HashSet::new();
        for id in ids.iter().filter(|id| self.contains(id)) {
            let expanded = std::iter::once(id.clone()).chain(self.descendants_of(id));
            for victim in expanded {
                if seen.insert(victim.clone()) {
                    doomed.push(victim);
                }
            }
        }
        if doomed.is_empty() {
            return doomed;
        }

        self.elements.retain(|el| !seen.contains(&el.id));
        for el in &mut self.elements {
            if el.mask_id.as_ref().is_some_and(|m| seen.contains(m)) {
                el.mask_id = None;
            }
        }
        self.reindex();
        doomed
    }

    /// Move the element at `from` to `to` in the paint order.
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        if from >= self.elements.len() {
            return false;
        }
        let item = self.elements.remove(from);
        let to = to.min(self.elements.len());
        self.elements.insert(to, item);
        self.reindex();
        true
    }

    /// Swap the elements at `a` and `b`.
    pub fn swap(&mut self, a: usize, b: usize) -> bool {
        if a >= self.elements.len() || b >= self.elements.len() {
            return false;
        }
        self.elements.swap(a, b);
        self.reindex();
        true
    }

    /// Union of the unrotated boxes of a folder's content, recursing into
    /// nested folders. `None` for empty folders.
    pub fn content_bounds(&self, folder: &ElementId) -> Option<Rect> {
        let mut visited = HashSet::from([folder.clone()]);
        self.content_bounds_inner(folder, &mut visited)
    }

    fn content_bounds_inner(&self, folder: &ElementId, visited: &mut HashSet<ElementId>) -> Option<Rect> {
        let mut bounds: Option<Rect> = None;
        for child_id in self.children_of(Some(folder)) {
            if !visited.insert(child_id.clone()) {
                continue;
            }
            let Some(child) = self.get(child_id) else { continue };
            let rect = if child.is_folder() {
                self.content_bounds_inner(child_id, visited)
            } else {
                Some(child.rect())
            };
            if let Some(rect) = rect {
                bounds = Some(bounds.map_or(rect, |b| b.union(rect)));
            }
        }
        bounds
    }

    /// The layer list: siblings top-most first, collapsed folders closed.
    pub fn layer_order(&self) -> Vec<LayerRow> {
        let mut rows = Vec::new();
        let mut visited = HashSet::new();
        self.collect_layers(None, 0, &mut rows, &mut visited);
        rows
    }

    fn collect_layers(
        &self,
        parent: Option<&ElementId>,
        depth: usize,
        rows: &mut Vec<LayerRow>,
        visited: &mut HashSet<ElementId>,
    ) {
        for id in self.children_of(parent).iter().rev() {
            if !visited.insert(id.clone()) {
                continue;
            }
            rows.push(LayerRow { id: id.clone(), depth });
            if let Some(el) = self.get(id).filter(|el| el.is_folder() && !el.collapsed) {
                self.collect_layers(Some(&el.id), depth + 1, rows, visited);
            }
        }
    }

    /// Remove every element.
    pub fn clear(&mut self) {
        self.elements.clear();
        self.reindex();
    }

    fn dedupe_ids(&mut self) {
        let mut seen = HashSet::new();
        for el in &mut self.elements {
            if !seen.insert(el.id.clone()) {
                log::warn!("Duplicate element id {}, assigning a fresh one", el.id);
                el.id = ElementId::new();
                seen.insert(el.id.clone());
            }
        }
    }

    /// Rebuild the lookup index and heal broken hierarchy links.
    fn reindex(&mut self) {
        let positions: HashMap<ElementId, usize> = self
            .elements
            .iter()
            .enumerate()
            .map(|(i, el)| (el.id.clone(), i))
            .collect();

        let folders: HashSet<ElementId> = self
            .elements
            .iter()
            .filter(|el| el.is_folder())
            .map(|el| el.id.clone())
            .collect();

        for el in &mut self.elements {
            if let Some(parent) = el.parent_id.as_ref().filter(|p| !folders.contains(*p)) {
                log::warn!("Element {} has dangling parent {}, moving to root", el.id, parent);
                el.parent_id = None;
            }
            if let Some(mask) = el.mask_id.as_ref().filter(|m| !positions.contains_key(*m) || **m == el.id) {
                log::warn!("Element {} has dangling mask {}, clearing", el.id, mask);
                el.mask_id = None;
            }
        }

        // Break parent cycles at the element whose chain leads back to itself.
        for i in 0..self.elements.len() {
            let own = self.elements[i].id.clone();
            let mut visited = HashSet::new();
            let mut current = self.elements[i].parent_id.clone();
            while let Some(parent) = current {
                if parent == own {
                    log::warn!("Element {own} is its own ancestor, moving to root");
                    self.elements[i].parent_id = None;
                    break;
                }
                if !visited.insert(parent.clone()) {
                    break;
                }
                current = positions.get(&parent).and_then(|&j| self.elements[j].parent_id.clone());
            }
        }

        let mut children: HashMap<Option<ElementId>, Vec<ElementId>> = HashMap::new();
        for el in &self.elements {
            children.entry(el.parent_id.clone()).or_default().push(el.id.clone());
        }

        self.index = SceneIndex { positions, children };
    }
}
