#![forbid(unsafe_code)]
//! Editor selection: nothing, one booth, or one public-area cell region.
//!
//! # State transitions
//!
//! ```text
//!                select_booth                 select_cell
//!  ┌──────┐ ───────────────▶ ┌────────┐ ◀──────────────▶ ┌──────┐
//!  │ None │                  │ Booth  │                  │ Cell │
//!  └──────┘ ◀─────────────── └────────┘                  └──────┘
//!      ▲    clear / remove selected booth / switch floor     │
//!      └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Invariants
//!
//! 1. At most one of booth id and cell descriptor is set.
//! 2. Switching the active floor always returns to `None`.

use expogrid_model::{CellPos, CellType};
use serde::{Deserialize, Serialize};

/// A selected public-area cell plus its cached connected region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSelection {
    pub x: i32,
    pub z: i32,
    #[serde(rename = "type")]
    pub cell_type: CellType,
    /// Contiguous same-typed region containing `(x, z)`. Empty when the
    /// type is not movable.
    #[serde(default)]
    pub cells: Vec<CellPos>,
}

impl CellSelection {
    #[must_use]
    pub fn new(pos: CellPos, cell_type: CellType, cells: Vec<CellPos>) -> Self {
        Self {
            x: pos.x,
            z: pos.z,
            cell_type,
            cells,
        }
    }

    #[must_use]
    pub const fn anchor(&self) -> CellPos {
        CellPos::new(self.x, self.z)
    }

    /// Whether `pos` is part of the selection (the region, or the anchor
    /// when no region is cached).
    #[must_use]
    pub fn contains(&self, pos: CellPos) -> bool {
        if self.cells.is_empty() {
            self.anchor() == pos
        } else {
            self.cells.contains(&pos)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    None,
    Booth(String),
    Cell(CellSelection),
}

impl Selection {
    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn booth_id(&self) -> Option<&str> {
        match self {
            Self::Booth(id) => Some(id),
            _ => None,
        }
    }

    #[must_use]
    pub fn cell(&self) -> Option<&CellSelection> {
        match self {
            Self::Cell(cell) => Some(cell),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub(crate) fn cell_mut(&mut self) -> Option<&mut CellSelection> {
        match self {
            Self::Cell(cell) => Some(cell),
            _ => None,
        }
    }
}
