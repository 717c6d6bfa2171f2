#![forbid(unsafe_code)]

//! Undo replay.
//!
//! Replay never records history: it writes the tree directly instead of
//! calling the public mutators, and the sanitize pass runs in
//! [`ApplyMode::Undo`] so that only the closing event battery is emitted.

use expogrid_model::CellType;

use super::Store;
use crate::notify::{CellEdit, GridChange, StoreEvent};
use crate::selection::{CellSelection, Selection};
use crate::undo::{ApplyMode, UndoEntry, UndoPatch, UndoSnapshot};

impl Store {
    /// Reverts the most recent recorded edit.
    ///
    /// Returns `false` when the history is empty or the entry's target no
    /// longer exists. The entry is consumed either way.
    pub fn undo(&mut self) -> bool {
        let Some(record) = self.history.pop() else {
            return false;
        };
        tracing::debug!(message = "store.undo", description = record.description);
        match record.entry {
            UndoEntry::Patch(patch) => self.undo_patch(patch),
            UndoEntry::Snapshot(snapshot) => {
                self.undo_snapshot(*snapshot);
                true
            }
        }
    }

    fn undo_patch(&mut self, patch: UndoPatch) -> bool {
        match patch {
            UndoPatch::SetCell {
                floor_id,
                change,
                links_before,
            } => {
                let Some(idx) = self.floor_position(&floor_id) else {
                    return false;
                };
                if self.exhibition.floors[idx].grid.set(change.pos, change.from).is_none() {
                    return false;
                }
                let links_restored = links_before.is_some();
                if let Some(links) = links_before {
                    self.exhibition.escalator_links = links;
                    self.link_index.get_mut().invalidate();
                }
                if idx == self.active_floor
                    && self.selection.cell().is_some_and(|s| s.anchor() == change.pos)
                {
                    self.selection = if matches!(
                        change.from,
                        CellType::Elevator | CellType::Escalator | CellType::LedScreen
                    ) {
                        Selection::Cell(CellSelection::new(change.pos, change.from, Vec::new()))
                    } else {
                        Selection::None
                    };
                }
                self.emit(StoreEvent::GridChanged(GridChange {
                    floor: &self.exhibition.floors[idx],
                    cell: Some(CellEdit {
                        x: change.pos.x,
                        z: change.pos.z,
                        cell_type: change.from,
                    }),
                }));
                if links_restored {
                    self.emit_links_changed();
                }
                self.emit_selection();
                true
            }
            UndoPatch::SetCells { floor_id, changes } => {
                let Some(idx) = self.floor_position(&floor_id) else {
                    return false;
                };
                let grid = &mut self.exhibition.floors[idx].grid;
                for change in changes.iter().rev() {
                    grid.set(change.pos, change.from);
                }
                self.emit(StoreEvent::GridChanged(GridChange {
                    floor: &self.exhibition.floors[idx],
                    cell: None,
                }));
                self.emit_selection();
                true
            }
            UndoPatch::UpdateBooth {
                floor_id,
                booth_id,
                before,
            } => {
                let Some(idx) = self.floor_position(&floor_id) else {
                    return false;
                };
                let Some(position) = self
                    .booth_index
                    .get_mut()
                    .locate(&self.exhibition.floors[idx], &booth_id)
                else {
                    return false;
                };
                self.exhibition.floors[idx].booths[position].revert(&before);
                self.emit(StoreEvent::BoothUpdated(&self.exhibition.floors[idx].booths[position]));
                self.emit_selection();
                true
            }
        }
    }

    fn undo_snapshot(&mut self, snapshot: UndoSnapshot) {
        self.exhibition = snapshot.exhibition;
        self.invalidate_indexes();
        self.active_floor = snapshot
            .active_floor
            .min(self.exhibition.floors.len().saturating_sub(1));
        self.selection = snapshot.selection;
        self.session.edit_mode = snapshot.edit_mode;
        self.session.view_filter = snapshot.view_filter;
        self.session.edit_tool = snapshot.edit_tool;
        self.session.drawing_cells.clear();
        self.sanitize_links(ApplyMode::Undo);
        self.ids.sync_from(&self.exhibition.floors);

        tracing::info!(
            message = "store.undo_snapshot",
            floors = self.exhibition.floors.len(),
            active_floor = self.active_floor
        );
        self.emit(StoreEvent::ExhibitionChanged(&self.exhibition));
        self.emit(StoreEvent::ActiveFloorChanged(self.active_floor));
        if let Some(floor) = self.active_floor() {
            self.emit(StoreEvent::FloorChanged(floor));
            self.emit(StoreEvent::GridChanged(GridChange { floor, cell: None }));
        }
        self.emit_links_changed();
        self.emit_selection();
        self.emit(StoreEvent::ToolChanged(self.session.edit_tool));
        self.emit(StoreEvent::ViewFilterChanged(self.session.view_filter));
        self.emit(StoreEvent::EditModeChanged(self.session.edit_mode));
    }
}
