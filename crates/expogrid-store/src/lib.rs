#![forbid(unsafe_code)]

//! Consistency engine for the ExpoGrid floorplan editor.
//!
//! A [`Store`] owns one exhibition and is the only writer of it. Every
//! mutation is a synchronous method that either applies fully or is
//! rejected with a [`ConstraintError`], and every applied change is
//! announced on the store's [`EventBus`].
//!
//! # Example
//!
//! ```
//! use expogrid_store::{Store, StoreConfig};
//! use expogrid_store::model::{CellPos, CellType, FloorDraft};
//!
//! let mut store = Store::new(StoreConfig::default());
//! store.add_floor(FloorDraft::sized(10, 10)).unwrap();
//! let booth = store
//!     .add_booth(&[CellPos::new(0, 0), CellPos::new(1, 0), CellPos::new(2, 0)])
//!     .unwrap();
//! assert_eq!(booth.id, "L001");
//! assert_eq!(booth.area, 3);
//!
//! store.set_cell(5, 5, CellType::Corridor).unwrap();
//! assert!(store.undo());
//! assert_eq!(store.active_floor().unwrap().cell(CellPos::new(5, 5)), Some(CellType::Empty));
//! ```

pub mod config;
pub mod error;
mod index;
pub mod notify;
pub mod persist;
pub mod selection;
pub mod session;
mod store;
pub mod undo;

pub use expogrid_model as model;

pub use config::StoreConfig;
pub use error::{ConstraintError, SnapshotError, StoreResult};
pub use notify::{CellEdit, EventBus, EventKind, GridChange, StoreEvent, Subscription};
pub use persist::EditorState;
pub use selection::{CellSelection, Selection};
pub use session::{
    BoothTemplate, EditMode, EditTool, ParseSessionError, PreviewPresetDraft, PreviewViewPreset,
    Session, Vec3, ViewFilter,
};
pub use store::Store;
pub use undo::{CellChange, UndoEntry, UndoHistory, UndoPatch, UndoRecord, UndoSnapshot};
