#![forbid(unsafe_code)]

//! Entity types for the ExpoGrid floorplan editor.
//!
//! An [`Exhibition`] owns an ordered list of [`Floor`]s and the
//! [`EscalatorLink`]s joining vertically adjacent floors. Each floor owns a
//! [`Grid`] of [`CellType`]s and the [`Booth`]s placed on it.
//!
//! The constructors in this crate are pure: they fill defaults and derived
//! fields (area, total price, rent) but never enforce cross-entity rules.
//! Placement, adjacency, and uniqueness are the job of the store that owns
//! the tree.
//!
//! # Coordinates
//!
//! Cells are addressed by [`CellPos`] `(x, z)` with `x` in `0..width` and `z`
//! in `0..depth`. Coordinates are signed so that offsets and out-of-range
//! input can be represented and rejected instead of wrapping.

pub mod booth;
pub mod booth_id;
pub mod cell;
pub mod exhibition;
pub mod export;
pub mod floor;
pub mod grid;

pub use booth::{
    Booth, BoothDraft, BoothPatch, BoothStatus, Orientation, PowerPatch, PowerSpec, Voltage,
    VoltageError,
};
pub use booth_id::BoothIdGenerator;
pub use cell::{CellPos, CellType, ParseCellTypeError, is_contiguous};
pub use exhibition::{Endpoint, EscalatorLink, Exhibition, ExhibitionDraft, ExhibitionPatch, pair_key};
pub use export::ExhibitionExport;
pub use floor::{DEFAULT_FLOOR_DEPTH, DEFAULT_FLOOR_WIDTH, Floor, FloorDraft, FloorShapeError};
pub use grid::{Grid, GridShapeError};

/// Fresh random identifier used for exhibitions, floors and links.
#[must_use]
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
