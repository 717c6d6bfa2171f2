#![forbid(unsafe_code)]

//! Cell painting.

use expogrid_model::{CellPos, CellType, Endpoint};

use super::Store;
use crate::error::{ConstraintError, StoreResult};
use crate::notify::{CellEdit, GridChange, StoreEvent};
use crate::undo::{CellChange, UndoPatch};

impl Store {
    /// Paints one cell of the active floor.
    ///
    /// Returns `Ok(false)` when the cell already holds `ty`. Booth cells
    /// change only through the booth operations. Retyping an escalator cell
    /// drops its links; painting an escalator links it to matching cells on
    /// the floors directly above and below.
    pub fn set_cell(&mut self, x: i32, z: i32, ty: CellType) -> StoreResult<bool> {
        const OP: &str = "set_cell";
        let idx = self.require_active_floor(OP)?;
        let pos = CellPos::new(x, z);
        if ty == CellType::Booth {
            return self.reject(OP, ConstraintError::BoothPaint);
        }
        let floor = &self.exhibition.floors[idx];
        let Some(old) = floor.cell(pos) else {
            return self.reject(OP, ConstraintError::OutOfBounds { pos });
        };
        if old == CellType::Booth {
            return self.reject(OP, ConstraintError::BoothCellProtected { pos });
        }
        if old == ty {
            return Ok(false);
        }

        let touches_escalator = old == CellType::Escalator || ty == CellType::Escalator;
        let patch = UndoPatch::SetCell {
            floor_id: floor.id.clone(),
            change: CellChange { pos, from: old, to: ty },
            links_before: touches_escalator.then(|| self.exhibition.escalator_links.clone()),
        };
        self.capture_patch("paint cell", patch);
        self.exhibition.floors[idx].grid.set(pos, ty);

        tracing::debug!(message = "store.set_cell", floor = idx, %pos, from = %old, to = %ty);
        self.emit(StoreEvent::GridChanged(GridChange {
            floor: &self.exhibition.floors[idx],
            cell: Some(CellEdit { x, z, cell_type: ty }),
        }));
        let endpoint = Endpoint { floor: idx, pos };
        if old == CellType::Escalator {
            self.unlink_cell(endpoint);
        }
        if ty == CellType::Escalator {
            self.link_adjacent_floors(endpoint);
        }
        Ok(true)
    }

    /// Paints many cells of the active floor as one undo step.
    ///
    /// Out-of-bounds, booth and already-matching cells are skipped. No
    /// escalator links are created or removed. Returns the number of cells
    /// changed.
    pub fn set_cells(&mut self, cells: &[CellPos], ty: CellType) -> StoreResult<usize> {
        const OP: &str = "set_cells";
        let idx = self.require_active_floor(OP)?;
        if ty == CellType::Booth {
            return self.reject(OP, ConstraintError::BoothPaint);
        }
        let floor = &mut self.exhibition.floors[idx];
        let mut changes = Vec::new();
        for &pos in cells {
            match floor.cell(pos) {
                Some(old) if old != ty && old != CellType::Booth => {
                    floor.grid.set(pos, ty);
                    changes.push(CellChange { pos, from: old, to: ty });
                }
                _ => {}
            }
        }
        if changes.is_empty() {
            return Ok(0);
        }

        let changed = changes.len();
        let floor_id = floor.id.clone();
        self.capture_patch("paint cells", UndoPatch::SetCells { floor_id, changes });
        tracing::debug!(message = "store.set_cells", floor = idx, changed, to = %ty);
        self.emit(StoreEvent::GridChanged(GridChange {
            floor: &self.exhibition.floors[idx],
            cell: None,
        }));
        Ok(changed)
    }

    /// The 4-connected region of `ty` containing `(x, z)` on floor
    /// `floor_index`.
    ///
    /// Empty for non-movable types, a missing floor, or a cell that does not
    /// hold `ty`.
    #[must_use]
    pub fn connected_cells(&self, floor_index: usize, x: i32, z: i32, ty: CellType) -> Vec<CellPos> {
        self.exhibition
            .floors
            .get(floor_index)
            .map(|floor| floor.connected_cells(CellPos::new(x, z), ty))
            .unwrap_or_default()
    }
}
