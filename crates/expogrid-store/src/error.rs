#![forbid(unsafe_code)]

//! Rejections and persistence failures.
//!
//! A [`ConstraintError`] means the requested edit was refused and nothing
//! changed: no state, no undo entry, no event. Its `Display` text is what
//! the UI shows and what the store records as the last constraint error.

use expogrid_model::{CellPos, CellType, FloorShapeError};
use thiserror::Error;

pub type StoreResult<T> = std::result::Result<T, ConstraintError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstraintError {
    #[error("an exhibition may have at most {max} floors")]
    FloorLimit { max: usize },

    #[error("floor area {area} exceeds the maximum of {max} square meters")]
    FloorArea { area: u64, max: u64 },

    #[error("floor dimensions must be positive (got {width}x{depth})")]
    FloorSize { width: u32, depth: u32 },

    #[error("no active floor")]
    NoActiveFloor,

    #[error("floor index {index} out of range (floor count {count})")]
    FloorOutOfRange { index: usize, count: usize },

    #[error("the last floor cannot be removed")]
    LastFloor,

    #[error("cell {pos} is outside the floor")]
    OutOfBounds { pos: CellPos },

    #[error("cell {pos} is occupied by {found}")]
    CellOccupied { pos: CellPos, found: CellType },

    #[error("booth cell {pos} can only be cleared by removing its booth")]
    BoothCellProtected { pos: CellPos },

    #[error("booth cells are placed with a booth, not painted")]
    BoothPaint,

    #[error("booth cells must be contiguous")]
    NotContiguous,

    #[error("a booth needs at least one cell")]
    EmptyBooth,

    #[error("cell {pos} is listed more than once")]
    DuplicateCell { pos: CellPos },

    #[error("booth {id} not found")]
    BoothNotFound { id: String },

    #[error("escalator links must join adjacent floors (got {floor_a} and {floor_b})")]
    NonAdjacentFloors { floor_a: usize, floor_b: usize },

    #[error("cell {pos} on floor {floor} is not an escalator")]
    NotEscalator { floor: usize, pos: CellPos },

    #[error("an escalator link between these cells already exists")]
    DuplicateLink,

    #[error("escalator link {id} not found")]
    LinkNotFound { id: String },

    #[error("escalator link {id} has no endpoint on floor {floor}")]
    LinkFloorMismatch { id: String, floor: usize },

    #[error("booth template {w}x{h} must be non-empty and at most {max} square meters")]
    TemplateSize { w: u32, h: u32, max: u64 },

    #[error("floor id {id} is already in use")]
    DuplicateFloorId { id: String },

    #[error("invalid floor: {reason}")]
    InvalidFloor { reason: String },

    #[error("no public-area cell is selected")]
    NoCellSelection,

    #[error("move offset is zero")]
    ZeroOffset,
}

impl ConstraintError {
    #[must_use]
    pub fn booth_not_found(id: impl Into<String>) -> Self {
        Self::BoothNotFound { id: id.into() }
    }

    #[must_use]
    pub fn link_not_found(id: impl Into<String>) -> Self {
        Self::LinkNotFound { id: id.into() }
    }
}

/// Failure to decode or validate a persisted editor state.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Shape(#[from] FloorShapeError),

    #[error("floor {floor}: booth {booth} cell {pos} is {found}, expected booth")]
    BoothCellMismatch {
        floor: String,
        booth: String,
        pos: CellPos,
        found: String,
    },

    #[error("floor {floor}: booth cell {pos} has no owning booth")]
    OrphanBoothCell { floor: String, pos: CellPos },

    #[error("floor {floor}: cell {pos} is claimed by more than one booth")]
    SharedBoothCell { floor: String, pos: CellPos },

    #[error("floor id {id} appears more than once")]
    DuplicateFloorId { id: String },

    #[error("floor {floor}: booth id {booth} appears more than once")]
    DuplicateBoothId { floor: String, booth: String },
}
