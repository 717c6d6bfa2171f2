#![forbid(unsafe_code)]

//! Lazily rebuilt lookup tables over the exhibition tree.
//!
//! # Design
//!
//! Booth tables are keyed by floor id so they survive floor reordering.
//! Each floor's table maps cell to booth id and booth id to position in
//! the floor's booth list. A missing table is rebuilt from the floor on
//! first use; structural edits either patch a table in place or drop it.
//!
//! The escalator link table maps each endpoint to the positions of the
//! links touching it, plus the set of normalized endpoint pairs. Any edit
//! to the link list drops it.
//!
//! # Invariants
//!
//! 1. A cached table agrees with its source after every store method
//!    returns.
//! 2. Lookups validate positions against the source list and fall back to
//!    a scan, re-indexing the hit, so a stale position can never return the
//!    wrong booth.

use ahash::{AHashMap, AHashSet};
use expogrid_model::{Booth, CellPos, Endpoint, EscalatorLink, Floor, pair_key};

#[derive(Debug, Clone, Default)]
pub(crate) struct FloorBoothIndex {
    by_cell: AHashMap<CellPos, String>,
    position: AHashMap<String, usize>,
}

impl FloorBoothIndex {
    fn build(floor: &Floor) -> Self {
        let mut index = Self::default();
        for (pos, booth) in floor.booths.iter().enumerate() {
            index.insert(booth, pos);
        }
        index
    }

    pub(crate) fn insert(&mut self, booth: &Booth, position: usize) {
        self.index_cells(booth);
        self.position.insert(booth.id.clone(), position);
    }

    pub(crate) fn index_cells(&mut self, booth: &Booth) {
        for &cell in &booth.cells {
            self.by_cell.insert(cell, booth.id.clone());
        }
    }

    /// Drops `booth`'s cells, leaving entries another booth owns untouched.
    pub(crate) fn unindex_cells(&mut self, booth: &Booth) {
        for cell in &booth.cells {
            if self.by_cell.get(cell).is_some_and(|owner| *owner == booth.id) {
                self.by_cell.remove(cell);
            }
        }
    }

    pub(crate) fn remove(&mut self, booth: &Booth) {
        self.unindex_cells(booth);
        self.position.remove(&booth.id);
    }

    /// Re-records positions for `floor.booths[start..]`.
    pub(crate) fn reindex_positions_from(&mut self, floor: &Floor, start: usize) {
        for (pos, booth) in floor.booths.iter().enumerate().skip(start) {
            self.position.insert(booth.id.clone(), pos);
        }
    }

    fn booth_id_at(&self, cell: CellPos) -> Option<&str> {
        self.by_cell.get(&cell).map(String::as_str)
    }
}

/// Booth tables for every floor, keyed by floor id.
#[derive(Debug, Clone, Default)]
pub(crate) struct BoothIndex {
    floors: AHashMap<String, FloorBoothIndex>,
}

impl BoothIndex {
    /// The table for `floor`, built on first use.
    pub(crate) fn ensure(&mut self, floor: &Floor) -> &mut FloorBoothIndex {
        self.floors.entry(floor.id.clone()).or_insert_with(|| {
            tracing::trace!(message = "index.booths.rebuild", floor_id = %floor.id, booths = floor.booths.len());
            FloorBoothIndex::build(floor)
        })
    }

    /// Discards and rebuilds the table for `floor`.
    pub(crate) fn rebuild(&mut self, floor: &Floor) {
        self.floors.remove(&floor.id);
        self.ensure(floor);
    }

    pub(crate) fn invalidate(&mut self, floor_id: &str) {
        self.floors.remove(floor_id);
    }

    pub(crate) fn clear(&mut self) {
        self.floors.clear();
    }

    #[cfg(test)]
    pub(crate) fn is_cached(&self, floor_id: &str) -> bool {
        self.floors.contains_key(floor_id)
    }

    /// Position of booth `id` in `floor.booths`.
    pub(crate) fn locate(&mut self, floor: &Floor, id: &str) -> Option<usize> {
        let table = self.ensure(floor);
        if let Some(&pos) = table.position.get(id)
            && floor.booths.get(pos).is_some_and(|b| b.id == id)
        {
            return Some(pos);
        }
        let pos = floor.booth_position(id)?;
        table.position.insert(id.to_owned(), pos);
        Some(pos)
    }

    /// Position of the booth covering `cell`, if any.
    pub(crate) fn booth_at(&mut self, floor: &Floor, cell: CellPos) -> Option<usize> {
        let id = self.ensure(floor).booth_id_at(cell)?.to_owned();
        self.locate(floor, &id)
    }
}

/// Endpoint lookup over the exhibition's escalator links.
#[derive(Debug, Clone, Default)]
pub(crate) struct LinkIndex {
    by_endpoint: AHashMap<Endpoint, Vec<usize>>,
    pairs: AHashSet<(Endpoint, Endpoint)>,
}

impl LinkIndex {
    fn build(links: &[EscalatorLink]) -> Self {
        let mut index = Self::default();
        for (i, link) in links.iter().enumerate() {
            index.by_endpoint.entry(link.a()).or_default().push(i);
            index.by_endpoint.entry(link.b()).or_default().push(i);
            index.pairs.insert(link.pair_key());
        }
        index
    }

    /// Positions of links with an endpoint at `endpoint`, in list order.
    pub(crate) fn links_at(&self, endpoint: Endpoint) -> &[usize] {
        self.by_endpoint.get(&endpoint).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn has_pair(&self, a: Endpoint, b: Endpoint) -> bool {
        self.pairs.contains(&pair_key(a, b))
    }
}

/// Lazily built [`LinkIndex`].
#[derive(Debug, Clone, Default)]
pub(crate) struct LinkCache {
    cached: Option<LinkIndex>,
}

impl LinkCache {
    pub(crate) fn ensure(&mut self, links: &[EscalatorLink]) -> &mut LinkIndex {
        self.cached.get_or_insert_with(|| {
            tracing::trace!(message = "index.links.rebuild", links = links.len());
            LinkIndex::build(links)
        })
    }

    pub(crate) fn invalidate(&mut self) {
        self.cached = None;
    }

    #[cfg(test)]
    pub(crate) fn is_cached(&self) -> bool {
        self.cached.is_some()
    }
}
