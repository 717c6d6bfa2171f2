#![forbid(unsafe_code)]

//! Synchronous change notification.
//!
//! The store announces every state transition as a [`StoreEvent`]. Payloads
//! borrow from the store, so a subscriber sees the post-change state and
//! cannot hold on to it past the callback.
//!
//! # Architecture
//!
//! [`EventBus`] keeps its subscriber list in `Rc<RefCell<..>>`. The list holds
//! `Weak` callbacks; the strong reference lives in the [`Subscription`]
//! returned to the caller, so dropping the guard is enough to unsubscribe.
//! Dead entries are pruned lazily during the next emit.
//!
//! # Invariants
//!
//! 1. Subscribers are notified in registration order.
//! 2. `emit` returns only after every live subscriber has run.
//! 3. Dropping a [`Subscription`] removes the callback before the next
//!    notification cycle.
//!
//! # Usage contract
//!
//! Delivery is same-thread and reentrant-unsafe: a callback runs while the
//! store method that emitted is still on the stack. Callbacks must not call
//! back into the store to mutate it. Subscribing or dropping a subscription
//! from inside a callback is fine; the change applies from the next emit.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use expogrid_model::{Booth, EscalatorLink, Exhibition, Floor};

use crate::selection::CellSelection;
use crate::session::{EditMode, EditTool, PreviewViewPreset, ViewFilter};

/// Payload of `grid-changed`.
///
/// `cell` is present for single-cell edits and absent for bulk edits or
/// rebuilds.
#[derive(Debug, Clone, Copy)]
pub struct GridChange<'a> {
    pub floor: &'a Floor,
    pub cell: Option<CellEdit>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellEdit {
    pub x: i32,
    pub z: i32,
    pub cell_type: expogrid_model::CellType,
}

#[derive(Debug, Clone, Copy)]
pub enum StoreEvent<'a> {
    ExhibitionChanged(&'a Exhibition),
    FloorAdded { floor: &'a Floor, index: usize },
    FloorRemoved { floor: &'a Floor, index: usize },
    ActiveFloorChanged(usize),
    FloorChanged(&'a Floor),
    GridChanged(GridChange<'a>),
    BoothAdded(&'a Booth),
    BoothUpdated(&'a Booth),
    BoothRemoved(&'a Booth),
    BoothSelected(Option<&'a str>),
    CellSelected(Option<&'a CellSelection>),
    EscalatorLinksChanged(&'a [EscalatorLink]),
    ToolChanged(EditTool),
    EditModeChanged(EditMode),
    ViewFilterChanged(ViewFilter),
    FloorAnnotationsChanged(bool),
    PreviewViewsChanged {
        presets: &'a [PreviewViewPreset],
        active_id: Option<&'a str>,
    },
    SnapshotSeqChanged(u32),
}

/// Discriminant of a [`StoreEvent`], for filtered subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    ExhibitionChanged,
    FloorAdded,
    FloorRemoved,
    ActiveFloorChanged,
    FloorChanged,
    GridChanged,
    BoothAdded,
    BoothUpdated,
    BoothRemoved,
    BoothSelected,
    CellSelected,
    EscalatorLinksChanged,
    ToolChanged,
    EditModeChanged,
    ViewFilterChanged,
    FloorAnnotationsChanged,
    PreviewViewsChanged,
    SnapshotSeqChanged,
}

impl EventKind {
    /// Channel name as used by the editor's event vocabulary.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ExhibitionChanged => "exhibition-changed",
            Self::FloorAdded => "floor-added",
            Self::FloorRemoved => "floor-removed",
            Self::ActiveFloorChanged => "active-floor-changed",
            Self::FloorChanged => "floor-changed",
            Self::GridChanged => "grid-changed",
            Self::BoothAdded => "booth-added",
            Self::BoothUpdated => "booth-updated",
            Self::BoothRemoved => "booth-removed",
            Self::BoothSelected => "booth-selected",
            Self::CellSelected => "cell-selected",
            Self::EscalatorLinksChanged => "escalator-links-changed",
            Self::ToolChanged => "tool-changed",
            Self::EditModeChanged => "edit-mode-changed",
            Self::ViewFilterChanged => "view-filter-changed",
            Self::FloorAnnotationsChanged => "floor-annotations-changed",
            Self::PreviewViewsChanged => "preview-views-changed",
            Self::SnapshotSeqChanged => "snapshot-seq-changed",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl StoreEvent<'_> {
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::ExhibitionChanged(_) => EventKind::ExhibitionChanged,
            Self::FloorAdded { .. } => EventKind::FloorAdded,
            Self::FloorRemoved { .. } => EventKind::FloorRemoved,
            Self::ActiveFloorChanged(_) => EventKind::ActiveFloorChanged,
            Self::FloorChanged(_) => EventKind::FloorChanged,
            Self::GridChanged(_) => EventKind::GridChanged,
            Self::BoothAdded(_) => EventKind::BoothAdded,
            Self::BoothUpdated(_) => EventKind::BoothUpdated,
            Self::BoothRemoved(_) => EventKind::BoothRemoved,
            Self::BoothSelected(_) => EventKind::BoothSelected,
            Self::CellSelected(_) => EventKind::CellSelected,
            Self::EscalatorLinksChanged(_) => EventKind::EscalatorLinksChanged,
            Self::ToolChanged(_) => EventKind::ToolChanged,
            Self::EditModeChanged(_) => EventKind::EditModeChanged,
            Self::ViewFilterChanged(_) => EventKind::ViewFilterChanged,
            Self::FloorAnnotationsChanged(_) => EventKind::FloorAnnotationsChanged,
            Self::PreviewViewsChanged { .. } => EventKind::PreviewViewsChanged,
            Self::SnapshotSeqChanged(_) => EventKind::SnapshotSeqChanged,
        }
    }
}

type Callback = dyn Fn(&StoreEvent<'_>);

struct BusInner {
    subscribers: Vec<Weak<Callback>>,
    /// Events delivered since creation.
    emitted: Cell<u64>,
}

/// Subscriber registry for [`StoreEvent`]s.
///
/// Cloning an `EventBus` creates a new handle to the **same** registry.
#[derive(Clone)]
pub struct EventBus {
    inner: Rc<RefCell<BusInner>>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("EventBus")
            .field("subscribers", &inner.subscribers.len())
            .field("emitted", &inner.emitted.get())
            .finish()
    }
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(BusInner {
                subscribers: Vec::new(),
                emitted: Cell::new(0),
            })),
        }
    }

    /// Registers `callback` for every event. Keep the returned guard alive
    /// for as long as the callback should run.
    #[must_use = "dropping the Subscription unsubscribes immediately"]
    pub fn subscribe(&self, callback: impl Fn(&StoreEvent<'_>) + 'static) -> Subscription {
        let strong: Rc<Callback> = Rc::new(callback);
        self.inner
            .borrow_mut()
            .subscribers
            .push(Rc::downgrade(&strong));
        Subscription { _callback: strong }
    }

    /// Registers `callback` for events of one kind only.
    #[must_use = "dropping the Subscription unsubscribes immediately"]
    pub fn on(&self, kind: EventKind, callback: impl Fn(&StoreEvent<'_>) + 'static) -> Subscription {
        self.subscribe(move |event| {
            if event.kind() == kind {
                callback(event);
            }
        })
    }

    /// Delivers `event` to every live subscriber, in registration order.
    pub fn emit(&self, event: &StoreEvent<'_>) {
        // Snapshot first so callbacks may subscribe or unsubscribe.
        let live: Vec<Rc<Callback>> = {
            let mut inner = self.inner.borrow_mut();
            inner.subscribers.retain(|w| w.strong_count() > 0);
            inner.emitted.set(inner.emitted.get() + 1);
            inner.subscribers.iter().filter_map(Weak::upgrade).collect()
        };
        for callback in live {
            callback(event);
        }
    }

    /// Number of subscribers still alive.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .borrow()
            .subscribers
            .iter()
            .filter(|w| w.strong_count() > 0)
            .count()
    }

    /// Total events emitted through this bus.
    #[must_use]
    pub fn emitted(&self) -> u64 {
        self.inner.borrow().emitted.get()
    }
}

/// RAII guard for a bus subscription. Dropping it unsubscribes.
pub struct Subscription {
    _callback: Rc<Callback>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}
