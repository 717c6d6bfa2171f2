#![forbid(unsafe_code)]

//! Selection state machine and the operations on a selected cell region.
//!
//! States are none, a booth id, or a cell region. Only the setters here,
//! removal of the selected booth, and switching floors change it.

use ahash::{AHashMap, AHashSet};
use expogrid_model::{Booth, CellPos, CellType, Endpoint};

use super::Store;
use crate::error::{ConstraintError, StoreResult};
use crate::notify::{GridChange, StoreEvent};
use crate::selection::{CellSelection, Selection};
use crate::undo::ApplyMode;

impl Store {
    pub fn select_booth(&mut self, id: impl Into<String>) {
        self.selection = Selection::Booth(id.into());
        self.emit(StoreEvent::BoothSelected(self.selection.booth_id()));
        self.emit(StoreEvent::CellSelected(None));
    }

    /// Selects the cell at `(x, z)` on the active floor. For movable types
    /// the whole connected region of `ty` is resolved and cached.
    pub fn select_cell(&mut self, x: i32, z: i32, ty: CellType) {
        let pos = CellPos::new(x, z);
        let cells = match self.active_floor() {
            Some(floor) => floor.connected_cells(pos, ty),
            None => vec![pos],
        };
        self.selection = Selection::Cell(CellSelection::new(pos, ty, cells));
        self.emit(StoreEvent::CellSelected(self.selection.cell()));
        self.emit(StoreEvent::BoothSelected(None));
    }

    pub fn clear_selection(&mut self) {
        self.selection = Selection::None;
        self.emit_selection();
    }

    /// The selected booth, resolved on the active floor.
    #[must_use]
    pub fn selected_booth(&self) -> Option<&Booth> {
        let id = self.selection.booth_id()?;
        self.booth_on_floor(self.active_floor, id)
    }

    /// Cells of the selected region.
    ///
    /// The cached set is returned while every cell still holds the selected
    /// type; otherwise the region is flood-filled again from the anchor and
    /// the cache refreshed.
    pub fn selected_cell_group_cells(&mut self) -> Vec<CellPos> {
        let Some(floor) = self.exhibition.floors.get(self.active_floor) else {
            return Vec::new();
        };
        let Some(selected) = self.selection.cell() else {
            return Vec::new();
        };
        let ty = selected.cell_type;
        if !ty.is_movable() {
            return Vec::new();
        }
        if !selected.cells.is_empty() && selected.cells.iter().all(|&c| floor.cell(c) == Some(ty)) {
            return selected.cells.clone();
        }
        let cells = floor.connected_cells(selected.anchor(), ty);
        if let Some(selected) = self.selection.cell_mut() {
            selected.cells.clone_from(&cells);
        }
        cells
    }

    /// Shifts the selected region by `(dx, dz)`.
    ///
    /// Target cells must be in bounds and either EMPTY or part of the region.
    /// Escalator links follow moved escalator cells.
    pub fn move_selected_cell_group(&mut self, dx: i32, dz: i32) -> StoreResult<()> {
        const OP: &str = "move_selected_cell_group";
        let idx = self.require_active_floor(OP)?;
        let Some(selected) = self.selection.cell().filter(|s| s.cell_type.is_movable()) else {
            return self.reject(OP, ConstraintError::NoCellSelection);
        };
        let ty = selected.cell_type;
        let anchor = selected.anchor();
        if dx == 0 && dz == 0 {
            return self.reject(OP, ConstraintError::ZeroOffset);
        }
        let cells = self.selected_cell_group_cells();
        if cells.is_empty() {
            return self.reject(OP, ConstraintError::NoCellSelection);
        }
        let region: AHashSet<CellPos> = cells.iter().copied().collect();
        let next: Vec<CellPos> = cells.iter().map(|c| c.offset(dx, dz)).collect();
        let floor = &self.exhibition.floors[idx];
        for &pos in &next {
            match floor.cell(pos) {
                None => return self.reject(OP, ConstraintError::OutOfBounds { pos }),
                Some(CellType::Empty) => {}
                Some(found) if found == ty && region.contains(&pos) => {}
                Some(found) => return self.reject(OP, ConstraintError::CellOccupied { pos, found }),
            }
        }

        self.capture_snapshot("move cells");
        let grid = &mut self.exhibition.floors[idx].grid;
        for &pos in &cells {
            grid.set(pos, CellType::Empty);
        }
        for &pos in &next {
            grid.set(pos, ty);
        }
        if ty == CellType::Escalator {
            let moves: AHashMap<CellPos, CellPos> = cells.iter().copied().zip(next.iter().copied()).collect();
            self.remap_link_endpoints(idx, &moves);
            self.sanitize_links(ApplyMode::Live);
        }
        self.selection = Selection::Cell(CellSelection::new(anchor.offset(dx, dz), ty, next));

        tracing::debug!(message = "store.move_selected_cell_group", floor = idx, cells = cells.len(), dx, dz);
        if ty == CellType::Escalator {
            self.emit_links_changed();
        }
        self.emit(StoreEvent::GridChanged(GridChange {
            floor: &self.exhibition.floors[idx],
            cell: None,
        }));
        self.emit(StoreEvent::CellSelected(self.selection.cell()));
        Ok(())
    }

    /// Clears every cell of the selected region to EMPTY, dropping escalator
    /// links first. Returns the number of cells cleared.
    pub fn delete_selected_cell(&mut self) -> StoreResult<usize> {
        const OP: &str = "delete_selected_cell";
        let idx = self.require_active_floor(OP)?;
        let Some(ty) = self.selection.cell().map(|s| s.cell_type) else {
            return self.reject(OP, ConstraintError::NoCellSelection);
        };
        let cells = self.selected_cell_group_cells();
        if cells.is_empty() {
            return self.reject(OP, ConstraintError::NoCellSelection);
        }

        self.capture_snapshot("delete cells");
        if ty == CellType::Escalator {
            for &pos in &cells {
                self.unlink_cell(Endpoint { floor: idx, pos });
            }
        }
        let grid = &mut self.exhibition.floors[idx].grid;
        for &pos in &cells {
            grid.set(pos, CellType::Empty);
        }
        self.selection = Selection::None;

        tracing::debug!(message = "store.delete_selected_cell", floor = idx, cells = cells.len(), %ty);
        self.emit(StoreEvent::GridChanged(GridChange {
            floor: &self.exhibition.floors[idx],
            cell: None,
        }));
        self.emit(StoreEvent::CellSelected(None));
        Ok(cells.len())
    }
}
