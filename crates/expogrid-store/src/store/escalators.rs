#![forbid(unsafe_code)]

//! Escalator links between vertically adjacent floors.
//!
//! Links are derived data: painting an escalator cell creates them and
//! retyping one removes them. The explicit operations here let an editor
//! add, move or drop links by hand. [`Store::sanitize_escalator_links`]
//! restores the link invariants after anything that may have broken them.

use ahash::{AHashMap, AHashSet};
use expogrid_model::{CellPos, CellType, Endpoint, EscalatorLink};

use super::Store;
use crate::error::{ConstraintError, StoreResult};
use crate::notify::{GridChange, StoreEvent};
use crate::selection::{CellSelection, Selection};
use crate::undo::ApplyMode;

impl Store {
    /// Links two escalator cells on adjacent floors.
    pub fn add_escalator_link(&mut self, a: Endpoint, b: Endpoint) -> StoreResult<&EscalatorLink> {
        const OP: &str = "add_escalator_link";
        self.require_floor(OP, a.floor)?;
        self.require_floor(OP, b.floor)?;
        if a.floor.abs_diff(b.floor) != 1 {
            let (floor_a, floor_b) = (a.floor, b.floor);
            return self.reject(OP, ConstraintError::NonAdjacentFloors { floor_a, floor_b });
        }
        for end in [a, b] {
            match self.exhibition.cell_at(end) {
                None => return self.reject(OP, ConstraintError::OutOfBounds { pos: end.pos }),
                Some(CellType::Escalator) => {}
                Some(_) => {
                    let (floor, pos) = (end.floor, end.pos);
                    return self.reject(OP, ConstraintError::NotEscalator { floor, pos });
                }
            }
        }
        let duplicate = self
            .link_index
            .get_mut()
            .ensure(&self.exhibition.escalator_links)
            .has_pair(a, b);
        if duplicate {
            return self.reject(OP, ConstraintError::DuplicateLink);
        }

        self.capture_snapshot("link escalators");
        self.exhibition.escalator_links.push(EscalatorLink::new(a, b));
        self.link_index.get_mut().invalidate();
        tracing::debug!(message = "store.add_escalator_link", floor_a = a.floor, floor_b = b.floor);
        self.emit_links_changed();
        let last = self.exhibition.escalator_links.len() - 1;
        Ok(&self.exhibition.escalator_links[last])
    }

    pub fn remove_escalator_link(&mut self, id: &str) -> StoreResult<EscalatorLink> {
        let Some(pos) = self.exhibition.escalator_links.iter().position(|l| l.id == id) else {
            return self.reject("remove_escalator_link", ConstraintError::link_not_found(id));
        };
        self.capture_snapshot("unlink escalators");
        let removed = self.exhibition.escalator_links.remove(pos);
        self.link_index.get_mut().invalidate();
        tracing::debug!(message = "store.remove_escalator_link", id);
        self.emit_links_changed();
        Ok(removed)
    }

    /// Re-points the end of link `id` that sits on `floor` to `(x, z)`,
    /// which must be an escalator cell.
    pub fn move_escalator_endpoint(&mut self, id: &str, floor: usize, x: i32, z: i32) -> StoreResult<()> {
        const OP: &str = "move_escalator_endpoint";
        let Some(link_pos) = self.exhibition.escalator_links.iter().position(|l| l.id == id) else {
            return self.reject(OP, ConstraintError::link_not_found(id));
        };
        let link = &self.exhibition.escalator_links[link_pos];
        let on_a = link.floor_a == floor;
        if !on_a && link.floor_b != floor {
            let id = id.to_owned();
            return self.reject(OP, ConstraintError::LinkFloorMismatch { id, floor });
        }
        let pos = CellPos::new(x, z);
        match self.exhibition.cell_at(Endpoint { floor, pos }) {
            None => return self.reject(OP, ConstraintError::OutOfBounds { pos }),
            Some(CellType::Escalator) => {}
            Some(_) => return self.reject(OP, ConstraintError::NotEscalator { floor, pos }),
        }

        self.capture_snapshot("move escalator link");
        let link = &mut self.exhibition.escalator_links[link_pos];
        if on_a {
            link.set_a(pos);
        } else {
            link.set_b(pos);
        }
        self.link_index.get_mut().invalidate();
        self.sanitize_links(ApplyMode::Live);
        tracing::debug!(message = "store.move_escalator_endpoint", id, floor, %pos);
        self.emit_links_changed();
        Ok(())
    }

    /// Moves the escalator cell at `(from_x, from_z)` on floor
    /// `floor_index` to the empty cell `(to_x, to_z)`, carrying every link
    /// attached to it.
    pub fn move_escalator_cell_group(
        &mut self,
        floor_index: usize,
        from_x: i32,
        from_z: i32,
        to_x: i32,
        to_z: i32,
    ) -> StoreResult<()> {
        const OP: &str = "move_escalator_cell_group";
        self.require_floor(OP, floor_index)?;
        let from = CellPos::new(from_x, from_z);
        let to = CellPos::new(to_x, to_z);
        let floor = &self.exhibition.floors[floor_index];
        if floor.cell(from) != Some(CellType::Escalator) {
            return self.reject(OP, ConstraintError::NotEscalator { floor: floor_index, pos: from });
        }
        match floor.cell(to) {
            None => return self.reject(OP, ConstraintError::OutOfBounds { pos: to }),
            Some(CellType::Empty) => {}
            Some(found) => return self.reject(OP, ConstraintError::CellOccupied { pos: to, found }),
        }

        self.capture_snapshot("move escalator");
        let source = Endpoint { floor: floor_index, pos: from };
        for link in &mut self.exhibition.escalator_links {
            if link.a() == source {
                link.set_a(to);
            }
            if link.b() == source {
                link.set_b(to);
            }
        }
        self.link_index.get_mut().invalidate();
        let grid = &mut self.exhibition.floors[floor_index].grid;
        grid.set(from, CellType::Empty);
        grid.set(to, CellType::Escalator);

        let follow_selection = floor_index == self.active_floor
            && self
                .selection
                .cell()
                .is_some_and(|s| s.cell_type == CellType::Escalator && s.anchor() == from);
        if follow_selection {
            self.selection = Selection::Cell(CellSelection::new(to, CellType::Escalator, Vec::new()));
        }

        tracing::debug!(message = "store.move_escalator_cell_group", floor = floor_index, %from, %to);
        self.emit_links_changed();
        self.emit(StoreEvent::GridChanged(GridChange {
            floor: &self.exhibition.floors[floor_index],
            cell: None,
        }));
        if follow_selection {
            self.emit(StoreEvent::CellSelected(self.selection.cell()));
        }
        Ok(())
    }

    /// Links touching `(x, z)` on floor `floor`, in list order.
    #[must_use]
    pub fn find_escalator_links_at(&self, floor: usize, x: i32, z: i32) -> Vec<&EscalatorLink> {
        let links = &self.exhibition.escalator_links;
        let mut cache = self.link_index.borrow_mut();
        cache
            .ensure(links)
            .links_at(Endpoint::new(floor, x, z))
            .iter()
            .filter_map(|&i| links.get(i))
            .collect()
    }

    /// Links the escalator cell at `(x, z)` on floor `floor` to matching
    /// escalator cells on the adjacent floors. Returns the number of links
    /// created.
    pub fn auto_detect_escalator_link(&mut self, floor: usize, x: i32, z: i32) -> StoreResult<usize> {
        const OP: &str = "auto_detect_escalator_link";
        self.require_floor(OP, floor)?;
        let endpoint = Endpoint::new(floor, x, z);
        match self.exhibition.cell_at(endpoint) {
            None => return self.reject(OP, ConstraintError::OutOfBounds { pos: endpoint.pos }),
            Some(CellType::Escalator) => {}
            Some(_) => {
                return self.reject(OP, ConstraintError::NotEscalator { floor, pos: endpoint.pos });
            }
        }
        if self.link_candidates(endpoint).is_empty() {
            return Ok(0);
        }
        self.capture_snapshot("link escalators");
        Ok(self.link_adjacent_floors(endpoint))
    }

    /// Drops every link touching `(x, z)` on floor `floor`. Returns the
    /// number removed.
    pub fn remove_escalator_links_for_cell(&mut self, floor: usize, x: i32, z: i32) -> usize {
        let endpoint = Endpoint::new(floor, x, z);
        if !self.exhibition.escalator_links.iter().any(|l| l.touches(endpoint)) {
            return 0;
        }
        self.capture_snapshot("unlink escalators");
        self.unlink_cell(endpoint)
    }

    /// Normalizes every link and drops the invalid ones: non-adjacent or
    /// missing floors, endpoints that are not escalator cells, and repeated
    /// endpoint pairs. Idempotent. Returns the number removed.
    pub fn sanitize_escalator_links(&mut self) -> usize {
        self.sanitize_links(ApplyMode::Live)
    }

    // ----- Internals -----

    /// Announces repairs only in [`ApplyMode::Live`]; an undo emits its own
    /// battery of events afterwards.
    pub(super) fn sanitize_links(&mut self, mode: ApplyMode) -> usize {
        let links = std::mem::take(&mut self.exhibition.escalator_links);
        let before = links.len();
        let exhibition = &self.exhibition;
        let mut seen = AHashSet::with_capacity(before);
        let kept: Vec<EscalatorLink> = links
            .into_iter()
            .filter_map(|mut link| {
                link.normalize();
                let (a, b) = (link.a(), link.b());
                let valid = b.floor == a.floor + 1
                    && exhibition.cell_at(a) == Some(CellType::Escalator)
                    && exhibition.cell_at(b) == Some(CellType::Escalator)
                    && seen.insert(link.pair_key());
                valid.then_some(link)
            })
            .collect();
        self.exhibition.escalator_links = kept;
        self.link_index.get_mut().invalidate();

        let removed = before - self.exhibition.escalator_links.len();
        if removed > 0 {
            tracing::warn!(message = "store.sanitize_links", removed, kept = before - removed);
            if mode.is_live() {
                self.emit_links_changed();
            }
        }
        removed
    }

    /// Escalator cells at the same position on the floors directly below
    /// and above `endpoint` that are not yet linked to it.
    fn link_candidates(&self, endpoint: Endpoint) -> Vec<Endpoint> {
        let links = &self.exhibition.escalator_links;
        let mut cache = self.link_index.borrow_mut();
        let index = cache.ensure(links);
        [endpoint.floor.checked_sub(1), endpoint.floor.checked_add(1)]
            .into_iter()
            .flatten()
            .map(|floor| Endpoint { floor, pos: endpoint.pos })
            .filter(|&other| {
                self.exhibition.cell_at(other) == Some(CellType::Escalator)
                    && !index.has_pair(endpoint, other)
            })
            .collect()
    }

    /// Creates the missing links from `endpoint` to the adjacent floors.
    /// Records no history. Returns the number created.
    pub(super) fn link_adjacent_floors(&mut self, endpoint: Endpoint) -> usize {
        let candidates = self.link_candidates(endpoint);
        if candidates.is_empty() {
            return 0;
        }
        for &other in &candidates {
            self.exhibition.escalator_links.push(EscalatorLink::new(endpoint, other));
        }
        self.link_index.get_mut().invalidate();
        tracing::debug!(
            message = "store.link_escalators",
            floor = endpoint.floor,
            pos = %endpoint.pos,
            created = candidates.len()
        );
        self.emit_links_changed();
        candidates.len()
    }

    /// Drops every link touching `endpoint`. Records no history. Returns
    /// the number removed.
    pub(super) fn unlink_cell(&mut self, endpoint: Endpoint) -> usize {
        let before = self.exhibition.escalator_links.len();
        self.exhibition.escalator_links.retain(|l| !l.touches(endpoint));
        let removed = before - self.exhibition.escalator_links.len();
        if removed > 0 {
            self.link_index.get_mut().invalidate();
            tracing::debug!(
                message = "store.unlink_escalators",
                floor = endpoint.floor,
                pos = %endpoint.pos,
                removed
            );
            self.emit_links_changed();
        }
        removed
    }

    /// Rewrites link endpoints on `floor` through `moves`.
    pub(super) fn remap_link_endpoints(&mut self, floor: usize, moves: &AHashMap<CellPos, CellPos>) {
        for link in &mut self.exhibition.escalator_links {
            if link.floor_a == floor
                && let Some(&to) = moves.get(&link.a().pos)
            {
                link.set_a(to);
            }
            if link.floor_b == floor
                && let Some(&to) = moves.get(&link.b().pos)
            {
                link.set_b(to);
            }
        }
        self.link_index.get_mut().invalidate();
    }
}
