#![forbid(unsafe_code)]

//! ExpoGrid public facade crate.
//!
//! Re-exports the entity model and the consistency engine. Most hosts only
//! need the [`prelude`].

pub use expogrid_model as model;
pub use expogrid_store as store;

pub mod prelude {
    pub use expogrid_model::{
        Booth, BoothPatch, BoothStatus, CellPos, CellType, Endpoint, EscalatorLink, Exhibition,
        ExhibitionDraft, ExhibitionPatch, Floor, FloorDraft,
    };
    pub use expogrid_store::{
        ConstraintError, EditMode, EditTool, EditorState, EventKind, Selection, Store, StoreConfig,
        StoreEvent, StoreResult, Subscription, ViewFilter,
    };
}
