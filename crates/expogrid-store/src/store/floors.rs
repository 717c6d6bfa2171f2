#![forbid(unsafe_code)]

//! Exhibition and floor lifecycle.

use expogrid_model::{CellType, Exhibition, ExhibitionDraft, ExhibitionPatch, Floor, FloorDraft};

use super::Store;
use crate::error::{ConstraintError, StoreResult};
use crate::notify::StoreEvent;
use crate::persist::{validate_exhibition, validate_floor};
use crate::selection::Selection;
use crate::undo::ApplyMode;

impl Store {
    /// Replaces the exhibition with a freshly constructed one.
    ///
    /// Clears undo history, indexes, selection, drawing and preview presets.
    ///
    /// # Panics
    ///
    /// Panics if floors supplied with the draft fail
    /// [`validate_exhibition`](crate::persist::validate_exhibition).
    pub fn init_exhibition(&mut self, draft: ExhibitionDraft) {
        let exhibition = Exhibition::new(draft);
        if let Err(err) = validate_exhibition(&exhibition) {
            panic!("init_exhibition called with inconsistent floors: {err}");
        }
        self.exhibition = exhibition;
        self.active_floor = 0;
        self.selection = Selection::None;
        self.history.clear();
        self.invalidate_indexes();
        self.ids.sync_from(&self.exhibition.floors);
        self.session.drawing_cells.clear();
        self.session.set_presets(Vec::new(), None);
        self.clear_constraint_error();
        tracing::info!(
            message = "store.init_exhibition",
            id = %self.exhibition.id,
            floors = self.exhibition.floors.len()
        );
        self.emit(StoreEvent::ExhibitionChanged(&self.exhibition));
        self.emit_presets_changed();
    }

    /// Edits exhibition metadata.
    pub fn update_exhibition(&mut self, patch: &ExhibitionPatch) {
        self.capture_snapshot("edit exhibition");
        self.exhibition.apply(patch);
        tracing::debug!(message = "store.update_exhibition", name = %self.exhibition.name);
        self.emit(StoreEvent::ExhibitionChanged(&self.exhibition));
    }

    /// Appends a floor and makes it active.
    ///
    /// A zero width or depth takes the configured default. An unlabelled
    /// floor is named `L{n}` after its position. Booths supplied with the
    /// draft must agree with its grid and carry distinct ids. A supplied
    /// floor id must not already be in use.
    pub fn add_floor(&mut self, mut draft: FloorDraft) -> StoreResult<&Floor> {
        const OP: &str = "add_floor";
        let max = self.config.max_floors;
        if self.exhibition.floors.len() >= max {
            return self.reject(OP, ConstraintError::FloorLimit { max });
        }
        if draft.width == 0 {
            draft.width = self.config.default_floor_width;
        }
        if draft.depth == 0 {
            draft.depth = self.config.default_floor_depth;
        }
        let area = u64::from(draft.width) * u64::from(draft.depth);
        if area > self.config.max_floor_area {
            let max = self.config.max_floor_area;
            return self.reject(OP, ConstraintError::FloorArea { area, max });
        }
        let index = self.exhibition.floors.len();
        if draft.label.is_none() {
            draft.label = Some(format!("L{}", index + 1));
        }
        let floor = Floor::new(draft);
        if self.floor_position(&floor.id).is_some() {
            let id = floor.id;
            return self.reject(OP, ConstraintError::DuplicateFloorId { id });
        }
        if let Err(err) = validate_floor(&floor) {
            let reason = err.to_string();
            return self.reject(OP, ConstraintError::InvalidFloor { reason });
        }

        self.capture_snapshot("add floor");
        self.ids.sync_from(std::iter::once(&floor));
        self.exhibition.floors.push(floor);
        self.clear_constraint_error();
        tracing::debug!(message = "store.add_floor", index, area);
        self.emit(StoreEvent::FloorAdded {
            floor: &self.exhibition.floors[index],
            index,
        });
        self.switch_active_floor(index);
        Ok(&self.exhibition.floors[index])
    }

    /// Removes floor `index`, dropping links that touched it and renumbering
    /// links above it. The last remaining floor cannot be removed.
    pub fn remove_floor(&mut self, index: usize) -> StoreResult<Floor> {
        const OP: &str = "remove_floor";
        let count = self.exhibition.floors.len();
        if index >= count {
            return self.reject(OP, ConstraintError::FloorOutOfRange { index, count });
        }
        if count == 1 {
            return self.reject(OP, ConstraintError::LastFloor);
        }

        self.capture_snapshot("remove floor");
        let removed = self.exhibition.floors.remove(index);
        self.booth_index.get_mut().invalidate(&removed.id);
        let links = &mut self.exhibition.escalator_links;
        links.retain(|l| l.floor_a != index && l.floor_b != index);
        for link in links.iter_mut() {
            if link.floor_a > index {
                link.floor_a -= 1;
            }
            if link.floor_b > index {
                link.floor_b -= 1;
            }
        }
        self.link_index.get_mut().invalidate();
        self.sanitize_links(ApplyMode::Live);
        if self.active_floor >= self.exhibition.floors.len() {
            self.active_floor = self.exhibition.floors.len() - 1;
        }

        tracing::debug!(message = "store.remove_floor", index, floor_id = %removed.id);
        self.emit(StoreEvent::FloorRemoved {
            floor: &removed,
            index,
        });
        self.emit(StoreEvent::ActiveFloorChanged(self.active_floor));
        self.emit_links_changed();
        Ok(removed)
    }

    /// Switches the active floor and clears the selection.
    pub fn set_active_floor(&mut self, index: usize) -> StoreResult<()> {
        let index = self.require_floor("set_active_floor", index)?;
        self.switch_active_floor(index);
        Ok(())
    }

    fn switch_active_floor(&mut self, index: usize) {
        self.active_floor = index;
        self.selection = Selection::None;
        self.session.drawing_cells.clear();
        self.emit(StoreEvent::ActiveFloorChanged(index));
    }

    /// Resizes the active floor.
    ///
    /// Cells inside both old and new bounds keep their type. Booths that no
    /// longer fit entirely are dropped and their surviving cells cleared.
    pub fn update_floor_size(&mut self, width: u32, depth: u32) -> StoreResult<()> {
        const OP: &str = "update_floor_size";
        let idx = self.require_active_floor(OP)?;
        if width == 0 || depth == 0 {
            return self.reject(OP, ConstraintError::FloorSize { width, depth });
        }
        let area = u64::from(width) * u64::from(depth);
        if area > self.config.max_floor_area {
            let max = self.config.max_floor_area;
            return self.reject(OP, ConstraintError::FloorArea { area, max });
        }

        self.capture_snapshot("resize floor");
        let floor = &mut self.exhibition.floors[idx];
        floor.grid = floor.grid.resized(width, depth);
        let (kept, dropped): (Vec<_>, Vec<_>) = std::mem::take(&mut floor.booths)
            .into_iter()
            .partition(|b| b.cells.iter().all(|&c| floor.grid.contains(c)));
        for booth in &dropped {
            for &cell in &booth.cells {
                if floor.grid.get(cell) == Some(CellType::Booth) {
                    floor.grid.set(cell, CellType::Empty);
                }
            }
        }
        floor.booths = kept;
        self.booth_index.get_mut().rebuild(floor);
        if self
            .selection
            .booth_id()
            .is_some_and(|id| dropped.iter().any(|b| b.id == id))
        {
            self.selection = Selection::None;
        }
        self.sanitize_links(ApplyMode::Live);
        self.clear_constraint_error();

        tracing::debug!(
            message = "store.update_floor_size",
            index = idx,
            width,
            depth,
            dropped_booths = dropped.len()
        );
        self.emit(StoreEvent::FloorChanged(&self.exhibition.floors[idx]));
        Ok(())
    }
}
