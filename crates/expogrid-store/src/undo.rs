#![forbid(unsafe_code)]

//! Bounded undo history of snapshots and patches.
//!
//! # Design
//!
//! 1. **Snapshots** are structural deep copies of the exhibition plus the
//!    editor fields an undo restores (active floor, selection, mode, filter,
//!    tool). Used by structural edits: floors, booths, moves, deletes.
//! 2. **Patches** record just enough "before" data to invert a frequent,
//!    narrow edit: one cell, a batch of cells, or some booth fields.
//!
//! # Invariants
//!
//! - Applying an entry's inverse restores the grid, booth lists and
//!   escalator links exactly as they were before the recorded call.
//! - The history never holds more than `limit` entries; the oldest goes
//!   first.
//! - Nothing is recorded while an undo is being applied. Store internals
//!   take an explicit [`ApplyMode`] instead of consulting a flag.
//!
//! # Failure Modes
//!
//! - **Stale patch target**: the floor or booth a patch names is gone.
//!   The entry is consumed and undo reports that nothing was applied.

use std::collections::VecDeque;

use expogrid_model::{BoothPatch, CellPos, CellType, EscalatorLink, Exhibition};
use web_time::Instant;

use crate::selection::Selection;
use crate::session::{EditMode, EditTool, ViewFilter};

/// Whether an internal mutation runs as a live edit or while replaying undo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ApplyMode {
    /// A user edit: record history and announce integrity repairs.
    Live,
    /// Restoring an undo entry: record nothing, leave events to the caller.
    Undo,
}

impl ApplyMode {
    pub(crate) const fn is_live(self) -> bool {
        matches!(self, Self::Live)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UndoSnapshot {
    pub exhibition: Exhibition,
    pub active_floor: usize,
    pub selection: Selection,
    pub edit_mode: EditMode,
    pub view_filter: ViewFilter,
    pub edit_tool: EditTool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellChange {
    pub pos: CellPos,
    pub from: CellType,
    pub to: CellType,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UndoPatch {
    SetCell {
        floor_id: String,
        change: CellChange,
        /// Full link list before the edit, present when the edit touched
        /// escalator cells and may have created or removed links.
        links_before: Option<Vec<EscalatorLink>>,
    },
    SetCells {
        floor_id: String,
        changes: Vec<CellChange>,
    },
    UpdateBooth {
        floor_id: String,
        booth_id: String,
        before: BoothPatch,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum UndoEntry {
    Snapshot(Box<UndoSnapshot>),
    Patch(UndoPatch),
}

impl UndoEntry {
    #[must_use]
    pub const fn is_snapshot(&self) -> bool {
        matches!(self, Self::Snapshot(_))
    }
}

/// One history slot: the entry plus display metadata.
#[derive(Debug, Clone)]
pub struct UndoRecord {
    pub entry: UndoEntry,
    /// Short label for UI ("add booth", "paint cell").
    pub description: &'static str,
    pub recorded_at: Instant,
}

impl UndoRecord {
    #[must_use]
    pub fn new(description: &'static str, entry: UndoEntry) -> Self {
        Self {
            entry,
            description,
            recorded_at: Instant::now(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UndoHistory {
    entries: VecDeque<UndoRecord>,
    limit: usize,
}

impl UndoHistory {
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(limit.min(64)),
            limit,
        }
    }

    pub fn push(&mut self, record: UndoRecord) {
        self.entries.push_back(record);
        while self.entries.len() > self.limit {
            if let Some(evicted) = self.entries.pop_front() {
                tracing::trace!(message = "undo.evict", description = evicted.description);
            }
        }
    }

    pub fn pop(&mut self) -> Option<UndoRecord> {
        self.entries.pop_back()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Description of the entry the next undo would apply.
    #[must_use]
    pub fn next_description(&self) -> Option<&'static str> {
        self.entries.back().map(|r| r.description)
    }

    /// Descriptions from oldest to newest.
    pub fn descriptions(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|r| r.description)
    }
}
