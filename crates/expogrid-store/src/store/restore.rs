#![forbid(unsafe_code)]

//! Serialization and restore at the persistence boundary.

use super::Store;
use crate::notify::StoreEvent;
use crate::persist::EditorState;
use crate::selection::Selection;
use crate::session::now_millis;

impl Store {
    /// Everything a host needs to persist the session.
    #[must_use]
    pub fn serialize(&self) -> EditorState {
        EditorState {
            exhibition: self.exhibition.clone(),
            active_floor_index: self.active_floor,
            show_floor_annotations: self.session.show_floor_annotations,
            preview_view_presets: self.session.preview_presets.clone(),
            active_preview_view_preset_id: self.session.active_preset_id.clone(),
            snapshot_name_seq: self.session.snapshot_name_seq,
            saved_at: now_millis(),
        }
    }

    /// Replaces the session with `state`.
    ///
    /// Clears selection, drawing and undo history, drops every index,
    /// repairs escalator links and raises the booth id counters past the
    /// restored ids.
    ///
    /// # Panics
    ///
    /// Panics if `state` fails [`EditorState::validate`]. Decode untrusted
    /// input with [`EditorState::from_json`], which validates.
    pub fn restore(&mut self, state: EditorState) {
        if let Err(err) = state.validate() {
            panic!("restore called with a corrupt editor state: {err}");
        }
        self.exhibition = state.exhibition;
        self.active_floor = state
            .active_floor_index
            .min(self.exhibition.floors.len().saturating_sub(1));
        self.selection = Selection::None;
        self.session.drawing_cells.clear();
        self.session.show_floor_annotations = state.show_floor_annotations;
        self.session
            .set_presets(state.preview_view_presets, state.active_preview_view_preset_id);
        self.session.snapshot_name_seq = state.snapshot_name_seq.max(1);
        self.invalidate_indexes();
        self.history.clear();
        self.clear_constraint_error();
        self.sanitize_escalator_links();
        self.ids.sync_from(&self.exhibition.floors);

        tracing::info!(
            message = "store.restore",
            id = %self.exhibition.id,
            floors = self.exhibition.floors.len(),
            links = self.exhibition.escalator_links.len()
        );
        self.emit(StoreEvent::ExhibitionChanged(&self.exhibition));
        self.emit(StoreEvent::ActiveFloorChanged(self.active_floor));
        self.emit(StoreEvent::FloorAnnotationsChanged(self.session.show_floor_annotations));
        self.emit_presets_changed();
        self.emit(StoreEvent::SnapshotSeqChanged(self.session.snapshot_name_seq));
    }
}
