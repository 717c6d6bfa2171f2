#![forbid(unsafe_code)]

//! Editor session setters. Each announces its own change event.

use super::Store;
use crate::notify::StoreEvent;
use crate::session::{EditMode, EditTool, PreviewPresetDraft, PreviewViewPreset, ViewFilter};

impl Store {
    /// Switches tool and discards any in-progress booth drawing.
    pub fn set_edit_tool(&mut self, tool: EditTool) {
        self.session.edit_tool = tool;
        self.session.drawing_cells.clear();
        self.emit(StoreEvent::ToolChanged(tool));
    }

    pub fn set_edit_mode(&mut self, mode: EditMode) {
        self.session.edit_mode = mode;
        self.emit(StoreEvent::EditModeChanged(mode));
    }

    pub fn set_view_filter(&mut self, filter: ViewFilter) {
        self.session.view_filter = filter;
        self.emit(StoreEvent::ViewFilterChanged(filter));
    }

    pub fn set_show_floor_annotations(&mut self, show: bool) {
        self.session.show_floor_annotations = show;
        self.emit(StoreEvent::FloorAnnotationsChanged(show));
    }

    // ----- Preview presets -----

    #[must_use]
    pub fn preview_view_presets(&self) -> &[PreviewViewPreset] {
        &self.session.preview_presets
    }

    #[must_use]
    pub fn active_preview_view_preset_id(&self) -> Option<&str> {
        self.session.active_preset_id.as_deref()
    }

    /// Replaces all presets, keeping at most the configured number.
    pub fn set_preview_view_presets(&mut self, presets: Vec<PreviewViewPreset>, active_id: Option<String>) {
        self.session.set_presets(presets, active_id);
        self.emit_presets_changed();
    }

    /// Saves a camera preset and makes it active. Returns its id.
    ///
    /// With `target_id` naming an existing preset, that preset is
    /// overwritten in place; otherwise a new one is appended and the oldest
    /// evicted beyond the cap.
    pub fn save_preview_view_preset(&mut self, draft: PreviewPresetDraft, target_id: Option<&str>) -> String {
        let id = self.session.save_preset(draft, target_id);
        tracing::debug!(message = "store.save_preview_view_preset", id = %id, count = self.session.preview_presets.len());
        self.emit_presets_changed();
        id
    }

    pub fn remove_preview_view_preset(&mut self, id: &str) -> bool {
        let removed = self.session.remove_preset(id);
        if removed {
            self.emit_presets_changed();
        }
        removed
    }

    /// Marks preset `id` active, or clears the active preset with `None`.
    /// Unknown ids are ignored.
    pub fn set_active_preview_view_preset(&mut self, id: Option<&str>) -> bool {
        match id {
            Some(id) if !self.session.preview_presets.iter().any(|p| p.id == id) => false,
            id => {
                self.session.active_preset_id = id.map(str::to_owned);
                self.emit_presets_changed();
                true
            }
        }
    }

    pub(super) fn emit_presets_changed(&self) {
        self.emit(StoreEvent::PreviewViewsChanged {
            presets: &self.session.preview_presets,
            active_id: self.session.active_preset_id.as_deref(),
        });
    }

    // ----- Snapshot naming -----

    /// `expoGrid` followed by the zero-padded sequence number.
    #[must_use]
    pub fn default_snapshot_name(&self) -> String {
        self.session.default_snapshot_name()
    }

    /// Advances the snapshot name sequence after a save. Returns the new
    /// sequence number.
    pub fn mark_snapshot_saved(&mut self) -> u32 {
        let seq = self.session.snapshot_name_seq.saturating_add(1);
        self.session.snapshot_name_seq = seq;
        self.emit(StoreEvent::SnapshotSeqChanged(seq));
        seq
    }
}
