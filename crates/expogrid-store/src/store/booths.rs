#![forbid(unsafe_code)]

//! Booth placement, editing and removal, plus the drawing and template
//! tools that feed [`Store::add_booth`].

use ahash::AHashSet;
use expogrid_model::{Booth, BoothDraft, BoothPatch, CellPos, CellType, is_contiguous};

use super::Store;
use crate::error::{ConstraintError, StoreResult};
use crate::notify::{GridChange, StoreEvent};
use crate::selection::Selection;
use crate::session::BoothTemplate;
use crate::undo::UndoPatch;

impl Store {
    /// Places a booth over `cells` on the active floor.
    ///
    /// Every cell must be in bounds and EMPTY, listed once, and the set must
    /// be 4-connected. The id is the floor label's initial plus the next
    /// number for that letter.
    pub fn add_booth(&mut self, cells: &[CellPos]) -> StoreResult<&Booth> {
        let (floor, position) = self.place_booth("add_booth", cells)?;
        Ok(&self.exhibition.floors[floor].booths[position])
    }

    fn place_booth(&mut self, op: &'static str, cells: &[CellPos]) -> StoreResult<(usize, usize)> {
        let idx = self.require_active_floor(op)?;
        if cells.is_empty() {
            return self.reject(op, ConstraintError::EmptyBooth);
        }
        let floor = &self.exhibition.floors[idx];
        let mut seen = AHashSet::with_capacity(cells.len());
        for &pos in cells {
            match floor.cell(pos) {
                None => return self.reject(op, ConstraintError::OutOfBounds { pos }),
                Some(CellType::Empty) => {}
                Some(found) => return self.reject(op, ConstraintError::CellOccupied { pos, found }),
            }
            if !seen.insert(pos) {
                return self.reject(op, ConstraintError::DuplicateCell { pos });
            }
        }
        if !is_contiguous(cells) {
            return self.reject(op, ConstraintError::NotContiguous);
        }

        self.capture_snapshot("add booth");
        let floor = &mut self.exhibition.floors[idx];
        let booth = Booth::new(BoothDraft {
            id: self.ids.next(&floor.label),
            floor_id: floor.id.clone(),
            cells: cells.to_vec(),
            ..BoothDraft::default()
        });
        for &pos in cells {
            floor.grid.set(pos, CellType::Booth);
        }
        floor.booths.push(booth);
        let position = floor.booths.len() - 1;
        self.booth_index
            .get_mut()
            .ensure(floor)
            .insert(&floor.booths[position], position);

        let floor = &self.exhibition.floors[idx];
        let booth = &floor.booths[position];
        tracing::debug!(message = "store.add_booth", floor = idx, id = %booth.id, area = booth.area);
        self.emit(StoreEvent::BoothAdded(booth));
        self.emit(StoreEvent::GridChanged(GridChange { floor, cell: None }));
        Ok((idx, position))
    }

    /// Removes booth `id` from the active floor.
    pub fn remove_booth(&mut self, id: &str) -> StoreResult<Booth> {
        let floor = self.active_floor;
        self.remove_booth_on_floor(floor, id)
    }

    /// Removes booth `id` from floor `floor_index`, clearing its cells.
    pub fn remove_booth_on_floor(&mut self, floor_index: usize, id: &str) -> StoreResult<Booth> {
        const OP: &str = "remove_booth";
        let idx = self.require_floor(OP, floor_index)?;
        let Some(position) = self.booth_index.get_mut().locate(&self.exhibition.floors[idx], id) else {
            return self.reject(OP, ConstraintError::booth_not_found(id));
        };

        self.capture_snapshot("remove booth");
        let floor = &mut self.exhibition.floors[idx];
        let booth = floor.booths.remove(position);
        for &pos in &booth.cells {
            floor.grid.set(pos, CellType::Empty);
        }
        let table = self.booth_index.get_mut().ensure(floor);
        table.remove(&booth);
        table.reindex_positions_from(floor, position);
        if idx == self.active_floor && self.selection.booth_id() == Some(id) {
            self.selection = Selection::None;
        }

        tracing::debug!(message = "store.remove_booth", floor = idx, id);
        self.emit(StoreEvent::BoothRemoved(&booth));
        self.emit(StoreEvent::GridChanged(GridChange {
            floor: &self.exhibition.floors[idx],
            cell: None,
        }));
        Ok(booth)
    }

    /// Applies `patch` to booth `id` on the active floor.
    pub fn update_booth(&mut self, id: &str, patch: &BoothPatch) -> StoreResult<&Booth> {
        let floor = self.active_floor;
        self.update_booth_on_floor(floor, id, patch)
    }

    /// Applies the fields set in `patch` to booth `id` on floor
    /// `floor_index`, recording the previous values of exactly those fields.
    /// An empty patch changes nothing and records nothing.
    pub fn update_booth_on_floor(
        &mut self,
        floor_index: usize,
        id: &str,
        patch: &BoothPatch,
    ) -> StoreResult<&Booth> {
        const OP: &str = "update_booth";
        let idx = self.require_floor(OP, floor_index)?;
        let Some(position) = self.booth_index.get_mut().locate(&self.exhibition.floors[idx], id) else {
            return self.reject(OP, ConstraintError::booth_not_found(id));
        };
        if patch.is_empty() {
            return Ok(&self.exhibition.floors[idx].booths[position]);
        }

        let floor = &mut self.exhibition.floors[idx];
        let floor_id = floor.id.clone();
        let before = floor.booths[position].apply(patch);
        self.capture_patch(
            "edit booth",
            UndoPatch::UpdateBooth {
                floor_id,
                booth_id: id.to_owned(),
                before,
            },
        );

        let booth = &self.exhibition.floors[idx].booths[position];
        tracing::debug!(message = "store.update_booth", floor = idx, id);
        self.emit(StoreEvent::BoothUpdated(booth));
        Ok(booth)
    }

    /// Shifts booth `id` on the active floor by `(dx, dz)`.
    ///
    /// Target cells must be in bounds and either EMPTY or part of the booth
    /// itself.
    pub fn move_booth(&mut self, id: &str, dx: i32, dz: i32) -> StoreResult<()> {
        const OP: &str = "move_booth";
        let idx = self.require_active_floor(OP)?;
        if dx == 0 && dz == 0 {
            return self.reject(OP, ConstraintError::ZeroOffset);
        }
        let Some(position) = self.booth_index.get_mut().locate(&self.exhibition.floors[idx], id) else {
            return self.reject(OP, ConstraintError::booth_not_found(id));
        };
        let floor = &self.exhibition.floors[idx];
        let booth = &floor.booths[position];
        let next: Vec<CellPos> = booth.cells.iter().map(|c| c.offset(dx, dz)).collect();
        for &pos in &next {
            match floor.cell(pos) {
                None => return self.reject(OP, ConstraintError::OutOfBounds { pos }),
                Some(CellType::Empty) => {}
                Some(CellType::Booth) if booth.occupies(pos) => {}
                Some(found) => return self.reject(OP, ConstraintError::CellOccupied { pos, found }),
            }
        }

        self.capture_snapshot("move booth");
        let floor = &mut self.exhibition.floors[idx];
        let index = self.booth_index.get_mut();
        index.ensure(floor).unindex_cells(&floor.booths[position]);
        for &pos in &floor.booths[position].cells {
            floor.grid.set(pos, CellType::Empty);
        }
        for &pos in &next {
            floor.grid.set(pos, CellType::Booth);
        }
        floor.booths[position].cells = next;
        index.ensure(floor).index_cells(&floor.booths[position]);

        let floor = &self.exhibition.floors[idx];
        tracing::debug!(message = "store.move_booth", floor = idx, id, dx, dz);
        self.emit(StoreEvent::BoothUpdated(&floor.booths[position]));
        self.emit(StoreEvent::GridChanged(GridChange { floor, cell: None }));
        Ok(())
    }

    /// The booth covering `(x, z)` on the active floor.
    #[must_use]
    pub fn find_booth_at(&self, x: i32, z: i32) -> Option<&Booth> {
        let floor = self.active_floor()?;
        let position = self
            .booth_index
            .borrow_mut()
            .booth_at(floor, CellPos::new(x, z))?;
        floor.booths.get(position)
    }

    /// Booth `id` on floor `floor_index`.
    #[must_use]
    pub fn booth_on_floor(&self, floor_index: usize, id: &str) -> Option<&Booth> {
        let floor = self.exhibition.floors.get(floor_index)?;
        let position = self.booth_index.borrow_mut().locate(floor, id)?;
        floor.booths.get(position)
    }

    // ----- Drawing and template tools -----

    /// Cells picked so far with the booth-draw tool.
    #[must_use]
    pub fn drawing_cells(&self) -> &[CellPos] {
        &self.session.drawing_cells
    }

    /// Adds `(x, z)` to the drawing, or removes it if already present. Only
    /// EMPTY cells of the active floor can be drawn.
    pub fn toggle_drawing_cell(&mut self, x: i32, z: i32) -> StoreResult<()> {
        const OP: &str = "toggle_drawing_cell";
        let idx = self.require_active_floor(OP)?;
        let pos = CellPos::new(x, z);
        match self.exhibition.floors[idx].cell(pos) {
            None => self.reject(OP, ConstraintError::OutOfBounds { pos }),
            Some(CellType::Empty) => {
                self.session.toggle_drawing_cell(pos);
                Ok(())
            }
            Some(found) => self.reject(OP, ConstraintError::CellOccupied { pos, found }),
        }
    }

    /// Adds every EMPTY cell of the rectangle spanned by the two corners,
    /// clamped to the active floor. Returns the number of cells added.
    pub fn add_drawing_rect(&mut self, x1: i32, z1: i32, x2: i32, z2: i32) -> StoreResult<usize> {
        let idx = self.require_active_floor("add_drawing_rect")?;
        let floor = &self.exhibition.floors[idx];
        let max_x = i32::try_from(floor.width()).unwrap_or(i32::MAX) - 1;
        let max_z = i32::try_from(floor.depth()).unwrap_or(i32::MAX) - 1;
        let (lo_x, hi_x) = (x1.min(x2).max(0), x1.max(x2).min(max_x));
        let (lo_z, hi_z) = (z1.min(z2).max(0), z1.max(z2).min(max_z));
        let drawing = &mut self.session.drawing_cells;
        let mut added = 0;
        for x in lo_x..=hi_x {
            for z in lo_z..=hi_z {
                let pos = CellPos::new(x, z);
                if floor.cell(pos) == Some(CellType::Empty) && !drawing.contains(&pos) {
                    drawing.push(pos);
                    added += 1;
                }
            }
        }
        Ok(added)
    }

    pub fn clear_drawing(&mut self) {
        self.session.drawing_cells.clear();
    }

    /// Places a booth over the drawn cells and clears the drawing.
    pub fn commit_drawing(&mut self) -> StoreResult<&Booth> {
        let cells = self.session.drawing_cells.clone();
        let (floor, position) = self.place_booth("commit_drawing", &cells)?;
        self.session.drawing_cells.clear();
        Ok(&self.exhibition.floors[floor].booths[position])
    }

    /// Sets the booth-template size. Both sides must be positive and the
    /// area within the floor-area cap.
    pub fn set_booth_template(&mut self, w: u32, h: u32) -> StoreResult<()> {
        let template = BoothTemplate { w, h };
        let max = self.config.max_floor_area;
        if w == 0 || h == 0 || template.area() > max {
            return self.reject("set_booth_template", ConstraintError::TemplateSize { w, h, max });
        }
        self.session.booth_template = template;
        Ok(())
    }

    /// Places a booth of the current template size with its corner at
    /// `(x, z)`. The whole rectangle must lie on the active floor.
    pub fn place_booth_template(&mut self, x: i32, z: i32) -> StoreResult<&Booth> {
        const OP: &str = "place_booth_template";
        let idx = self.require_active_floor(OP)?;
        let template = self.session.booth_template;
        let anchor = CellPos::new(x, z);
        let floor = &self.exhibition.floors[idx];
        for pos in [anchor, template.far_corner(anchor)] {
            if !floor.contains(pos) {
                return self.reject(OP, ConstraintError::OutOfBounds { pos });
            }
        }
        let cells = template.cells_at(anchor);
        let (floor, position) = self.place_booth(OP, &cells)?;
        Ok(&self.exhibition.floors[floor].booths[position])
    }
}
