//! Debounced session auto-save and restore.

use super::{Storage, StorageError, StorageResult};
use crate::editor::{Editor, EditorState, UiFlags};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Storage key of the auto-saved session.
pub const SESSION_KEY: &str = "iconclay_session_v1";

/// Quiet period after the last change before a session is written.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_secs(1);

/// Persisted editor state, including the modal flags at save time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    #[serde(flatten)]
    pub state: EditorState,
    #[serde(flatten)]
    pub ui: UiFlags,
}

impl SessionRecord {
    pub fn capture(editor: &Editor) -> Self {
        Self { state: editor.state().clone(), ui: editor.ui }
    }

    /// Rebuild an editor. Modals start closed and nothing is selected.
    pub fn into_editor(self) -> Editor {
        let mut state = self.state;
        state.selection.clear();
        Editor::from_state(state)
    }
}

/// Writes the session once edits have settled.
pub struct SessionSaver<S: Storage> {
    storage: Arc<S>,
    key: String,
    quiet_period: Duration,
    last_change: Option<Instant>,
    dirty: bool,
}

impl<S: Storage> SessionSaver<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            storage,
            key: SESSION_KEY.to_string(),
            quiet_period: DEFAULT_QUIET_PERIOD,
            last_change: None,
            dirty: false,
        }
    }

    pub fn with_quiet_period(mut self, quiet_period: Duration) -> Self {
        self.quiet_period = quiet_period;
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    /// Note an edit. Each call restarts the quiet period.
    pub fn mark_changed(&mut self) {
        self.dirty = true;
        self.last_change = Some(Instant::now());
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Dirty and no change for at least the quiet period.
    pub fn should_save(&self) -> bool {
        self.dirty && self.last_change.is_none_or(|t| t.elapsed() >= self.quiet_period)
    }

    /// Save if the quiet period has passed. Returns true if a write happened.
    pub async fn maybe_save(&mut self, editor: &Editor) -> StorageResult<bool> {
        if !self.should_save() {
            return Ok(false);
        }
        self.save(editor).await?;
        Ok(true)
    }

    /// Write the session now.
    pub async fn save(&mut self, editor: &Editor) -> StorageResult<()> {
        self.storage.save(&self.key, &SessionRecord::capture(editor)).await?;
        self.dirty = false;
        log::debug!("Session saved ({} elements)", editor.scene().len());
        Ok(())
    }

    /// Load the saved session, if any.
    pub async fn restore(&mut self) -> StorageResult<Option<Editor>> {
        match self.storage.load(&self.key).await {
            Ok(record) => {
                self.dirty = false;
                log::info!("Restored session with {} elements", record.state.scene.len());
                Ok(Some(record.into_editor()))
            }
            Err(StorageError::NotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Forget the saved session.
    pub async fn clear(&mut self) -> StorageResult<()> {
        self.dirty = false;
        self.storage.delete(&self.key).await
    }

    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::SelectTarget;
    use crate::element::ElementKind;
    use crate::storage::{MemoryStorage, block_on};

    #[test]
    fn test_debounce() {
        let storage = Arc::new(MemoryStorage::new());
        let mut saver = SessionSaver::new(storage.clone()).with_quiet_period(Duration::from_secs(3600));
        let editor = Editor::new();

        assert!(!saver.should_save());
        saver.mark_changed();
        assert!(saver.is_dirty());
        assert!(!block_on(saver.maybe_save(&editor)).unwrap());
        assert!(!block_on(storage.exists(SESSION_KEY)).unwrap());

        let mut saver = saver.with_quiet_period(Duration::ZERO);
        assert!(block_on(saver.maybe_save(&editor)).unwrap());
        assert!(!saver.is_dirty());
        assert!(block_on(storage.exists(SESSION_KEY)).unwrap());
    }

    #[test]
    fn test_restore_resets_transient_state() {
        let storage = Arc::new(MemoryStorage::new());
        let mut saver = SessionSaver::new(storage.clone());

        let mut editor = Editor::new();
        let id = editor.add_element(ElementKind::Squircle);
        editor.select(SelectTarget::One(id), false);
        editor.ui.is_info_open = true;
        editor.ui.is_preview_open = true;
        editor.view_mut().set_zoom(1.5);
        block_on(saver.save(&editor)).unwrap();

        let stored = block_on(storage.load(SESSION_KEY)).unwrap();
        assert!(stored.ui.is_info_open);

        let restored = block_on(saver.restore()).unwrap().unwrap();
        assert_eq!(restored.scene(), editor.scene());
        assert!(restored.selection().is_empty());
        assert_eq!(restored.ui, UiFlags::default());
        assert_eq!(restored.view().zoom, 1.5);
        assert!(!restored.can_undo());
    }

    #[test]
    fn test_record_uses_flat_keys() {
        let record = SessionRecord::capture(&Editor::new());
        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("elements").is_some());
        assert!(value.get("selectedIds").is_some());
        assert!(value.get("canvasSize").is_some());
        assert!(value.get("zoom").is_some());
        assert!(value.get("isIconPickerOpen").is_some());
    }

    #[test]
    fn test_restore_missing_and_clear() {
        let storage = Arc::new(MemoryStorage::new());
        let mut saver = SessionSaver::new(storage);
        assert!(block_on(saver.restore()).unwrap().is_none());

        block_on(saver.save(&Editor::new())).unwrap();
        block_on(saver.clear()).unwrap();
        assert!(block_on(saver.restore()).unwrap().is_none());
    }
}
