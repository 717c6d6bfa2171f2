#![forbid(unsafe_code)]

//! The consistency engine.
//!
//! [`Store`] owns one [`Exhibition`] plus everything an editor layers on top
//! of it: the active floor, the selection, session state, undo history and
//! the lookup indexes. Every mutation goes through a `Store` method, which
//! either applies completely and announces itself on the [`EventBus`], or
//! returns a [`ConstraintError`] having changed nothing.
//!
//! # Invariants
//!
//! 1. On every floor a cell is BOOTH exactly when one booth lists it.
//! 2. Cached indexes agree with the tree whenever a method returns.
//! 3. A rejected call leaves the tree, history, indexes and subscribers
//!    untouched; only `last_constraint_error` is updated.
//! 4. History entries are recorded only by live edits, never while an undo
//!    is being applied.
//!
//! # Failure Modes
//!
//! - **Stale links**: cell retyping, floor removal or resizing can leave
//!   escalator links pointing at non-escalator cells. The sanitize pass
//!   repairs the list after each such edit.
//! - **Reentrant subscriber**: callbacks run while the emitting method is
//!   still on the stack and cannot reach the store mutably. See
//!   [`crate::notify`] for the usage contract.
//!
//! Operations are grouped by concern: `floors`, `grid`, `booths`,
//! `selection`, `escalators`, `history`, `session` and `restore`.

mod booths;
mod escalators;
mod floors;
mod grid;
mod history;
mod restore;
mod selection;
mod session;

use std::cell::RefCell;

use expogrid_model::{
    BoothIdGenerator, EscalatorLink, Exhibition, ExhibitionDraft, ExhibitionExport, Floor,
};

use crate::config::StoreConfig;
use crate::error::{ConstraintError, StoreResult};
use crate::index::{BoothIndex, LinkCache};
use crate::notify::{EventBus, StoreEvent, Subscription};
use crate::selection::{CellSelection, Selection};
use crate::session::Session;
use crate::undo::{UndoEntry, UndoHistory, UndoPatch, UndoRecord, UndoSnapshot};

/// The floorplan store. See the [module docs](self).
#[derive(Debug)]
pub struct Store {
    config: StoreConfig,
    exhibition: Exhibition,
    active_floor: usize,
    selection: Selection,
    session: Session,
    history: UndoHistory,
    ids: BoothIdGenerator,
    booth_index: RefCell<BoothIndex>,
    link_index: RefCell<LinkCache>,
    last_constraint_error: String,
    bus: EventBus,
}

impl Default for Store {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl Store {
    /// A store holding an empty exhibition with no floors.
    #[must_use]
    pub fn new(config: StoreConfig) -> Self {
        let session = Session::new(config.default_booth_template, config.preview_preset_limit);
        let history = UndoHistory::new(config.undo_limit);
        Self {
            config,
            exhibition: Exhibition::new(ExhibitionDraft::default()),
            active_floor: 0,
            selection: Selection::None,
            session,
            history,
            ids: BoothIdGenerator::new(),
            booth_index: RefCell::new(BoothIndex::default()),
            link_index: RefCell::new(LinkCache::default()),
            last_constraint_error: String::new(),
            bus: EventBus::new(),
        }
    }

    // ----- Accessors -----

    #[must_use]
    pub const fn config(&self) -> &StoreConfig {
        &self.config
    }

    #[must_use]
    pub const fn exhibition(&self) -> &Exhibition {
        &self.exhibition
    }

    #[must_use]
    pub fn floors(&self) -> &[Floor] {
        &self.exhibition.floors
    }

    #[must_use]
    pub fn floor(&self, index: usize) -> Option<&Floor> {
        self.exhibition.floors.get(index)
    }

    #[must_use]
    pub const fn active_floor_index(&self) -> usize {
        self.active_floor
    }

    /// The active floor, or `None` before the first floor is added.
    #[must_use]
    pub fn active_floor(&self) -> Option<&Floor> {
        self.exhibition.floors.get(self.active_floor)
    }

    #[must_use]
    pub fn escalator_links(&self) -> &[EscalatorLink] {
        &self.exhibition.escalator_links
    }

    #[must_use]
    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    #[must_use]
    pub fn selected_booth_id(&self) -> Option<&str> {
        self.selection.booth_id()
    }

    #[must_use]
    pub fn selected_cell(&self) -> Option<&CellSelection> {
        self.selection.cell()
    }

    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Display text of the most recent rejection; empty when none.
    #[must_use]
    pub fn last_constraint_error(&self) -> &str {
        &self.last_constraint_error
    }

    #[must_use]
    pub const fn undo_history(&self) -> &UndoHistory {
        &self.history
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    #[must_use]
    pub const fn id_generator(&self) -> &BoothIdGenerator {
        &self.ids
    }

    /// Handle to the change notifier.
    #[must_use]
    pub const fn events(&self) -> &EventBus {
        &self.bus
    }

    /// Shorthand for `self.events().subscribe(callback)`.
    #[must_use = "dropping the Subscription unsubscribes immediately"]
    pub fn subscribe(&self, callback: impl Fn(&StoreEvent<'_>) + 'static) -> Subscription {
        self.bus.subscribe(callback)
    }

    /// Flattened interchange projection of the current exhibition.
    #[must_use]
    pub fn export(&self) -> ExhibitionExport<'_> {
        ExhibitionExport::from(&self.exhibition)
    }

    // ----- Internals -----

    fn emit(&self, event: StoreEvent<'_>) {
        self.bus.emit(&event);
    }

    fn emit_links_changed(&self) {
        self.emit(StoreEvent::EscalatorLinksChanged(&self.exhibition.escalator_links));
    }

    /// booth-selected then cell-selected, reflecting the current selection.
    fn emit_selection(&self) {
        self.emit(StoreEvent::BoothSelected(self.selection.booth_id()));
        self.emit(StoreEvent::CellSelected(self.selection.cell()));
    }

    /// Records `err` as the last constraint error and returns it.
    fn reject<T>(&mut self, op: &'static str, err: ConstraintError) -> StoreResult<T> {
        tracing::debug!(message = "store.rejected", op, error = %err);
        self.last_constraint_error = err.to_string();
        Err(err)
    }

    fn clear_constraint_error(&mut self) {
        self.last_constraint_error.clear();
    }

    fn require_active_floor(&mut self, op: &'static str) -> StoreResult<usize> {
        if self.active_floor < self.exhibition.floors.len() {
            Ok(self.active_floor)
        } else {
            self.reject(op, ConstraintError::NoActiveFloor)
        }
    }

    fn require_floor(&mut self, op: &'static str, index: usize) -> StoreResult<usize> {
        let count = self.exhibition.floors.len();
        if index < count {
            Ok(index)
        } else {
            self.reject(op, ConstraintError::FloorOutOfRange { index, count })
        }
    }

    fn snapshot(&self) -> UndoSnapshot {
        UndoSnapshot {
            exhibition: self.exhibition.clone(),
            active_floor: self.active_floor,
            selection: self.selection.clone(),
            edit_mode: self.session.edit_mode,
            view_filter: self.session.view_filter,
            edit_tool: self.session.edit_tool,
        }
    }

    /// Records a full snapshot of the current state.
    fn capture_snapshot(&mut self, description: &'static str) {
        let entry = UndoEntry::Snapshot(Box::new(self.snapshot()));
        self.history.push(UndoRecord::new(description, entry));
    }

    fn capture_patch(&mut self, description: &'static str, patch: UndoPatch) {
        self.history.push(UndoRecord::new(description, UndoEntry::Patch(patch)));
    }

    fn invalidate_indexes(&mut self) {
        self.booth_index.get_mut().clear();
        self.link_index.get_mut().invalidate();
    }

    fn floor_position(&self, floor_id: &str) -> Option<usize> {
        self.exhibition.floors.iter().position(|f| f.id == floor_id)
    }
}

#[cfg(test)]
mod tests;
