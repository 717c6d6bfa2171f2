#![forbid(unsafe_code)]

//! One exhibition level: a cell grid plus the booths placed on it.
//!
//! Width and depth are not stored beside the grid; they are read from it,
//! so a floor whose dimensions disagree with its grid cannot be built. The
//! wire form still carries `width` and `depth` and is validated on decode.

use std::collections::VecDeque;

use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::booth::Booth;
use crate::cell::{CellPos, CellType};
use crate::grid::{Grid, GridShapeError};

pub const DEFAULT_FLOOR_WIDTH: u32 = 12;
pub const DEFAULT_FLOOR_DEPTH: u32 = 8;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FloorShapeError {
    #[error(transparent)]
    Grid(#[from] GridShapeError),
    #[error("floor {id} declares {width}x{depth} but its grid is {grid_width}x{grid_depth}")]
    DimensionMismatch {
        id: String,
        width: u32,
        depth: u32,
        grid_width: u32,
        grid_depth: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "FloorRepr", try_from = "FloorRepr")]
pub struct Floor {
    pub id: String,
    pub label: String,
    pub grid: Grid,
    pub booths: Vec<Booth>,
}

/// Constructor overrides for [`Floor::new`].
///
/// A zero width or depth falls back to the default size. A supplied grid is
/// resized to the requested dimensions so the result is always consistent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FloorDraft {
    pub id: Option<String>,
    pub label: Option<String>,
    pub width: u32,
    pub depth: u32,
    pub grid: Option<Grid>,
    pub booths: Vec<Booth>,
}

impl FloorDraft {
    #[must_use]
    pub fn sized(width: u32, depth: u32) -> Self {
        Self {
            width,
            depth,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Width and depth after applying defaults.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        let width = if self.width == 0 { DEFAULT_FLOOR_WIDTH } else { self.width };
        let depth = if self.depth == 0 { DEFAULT_FLOOR_DEPTH } else { self.depth };
        (width, depth)
    }
}

impl Floor {
    #[must_use]
    pub fn new(draft: FloorDraft) -> Self {
        let (width, depth) = draft.dimensions();
        let grid = match draft.grid {
            Some(grid) if grid.width() == width && grid.depth() == depth => grid,
            Some(grid) => grid.resized(width, depth),
            None => Grid::new(width, depth),
        };
        Self {
            id: draft.id.unwrap_or_else(crate::new_id),
            label: draft.label.unwrap_or_else(|| "L1".to_owned()),
            grid,
            booths: draft.booths,
        }
    }

    #[must_use]
    pub const fn width(&self) -> u32 {
        self.grid.width()
    }

    #[must_use]
    pub const fn depth(&self) -> u32 {
        self.grid.depth()
    }

    #[must_use]
    pub fn area(&self) -> u64 {
        u64::from(self.width()) * u64::from(self.depth())
    }

    #[must_use]
    pub fn contains(&self, pos: CellPos) -> bool {
        self.grid.contains(pos)
    }

    #[must_use]
    pub fn cell(&self, pos: CellPos) -> Option<CellType> {
        self.grid.get(pos)
    }

    /// Linear booth lookup. The store keeps an index for the hot path.
    #[must_use]
    pub fn booth(&self, id: &str) -> Option<&Booth> {
        self.booths.iter().find(|b| b.id == id)
    }

    #[must_use]
    pub fn booth_position(&self, id: &str) -> Option<usize> {
        self.booths.iter().position(|b| b.id == id)
    }

    /// The 4-connected region of `ty` cells containing `pos`, in BFS order.
    ///
    /// Empty when `ty` is not a movable public-area type, `pos` is outside
    /// the floor, or the cell at `pos` is not `ty`.
    #[must_use]
    pub fn connected_cells(&self, pos: CellPos, ty: CellType) -> Vec<CellPos> {
        if !ty.is_movable() || self.cell(pos) != Some(ty) {
            return Vec::new();
        }
        let mut visited = AHashSet::from([pos]);
        let mut queue = VecDeque::from([pos]);
        let mut out = Vec::new();
        while let Some(cur) = queue.pop_front() {
            out.push(cur);
            for next in cur.neighbors() {
                if self.cell(next) == Some(ty) && visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        out
    }
}

#[derive(Serialize, Deserialize)]
struct FloorRepr {
    id: String,
    label: String,
    width: u32,
    depth: u32,
    grid: Grid,
    #[serde(default)]
    booths: Vec<Booth>,
}

impl From<Floor> for FloorRepr {
    fn from(floor: Floor) -> Self {
        Self {
            width: floor.width(),
            depth: floor.depth(),
            id: floor.id,
            label: floor.label,
            grid: floor.grid,
            booths: floor.booths,
        }
    }
}

impl TryFrom<FloorRepr> for Floor {
    type Error = FloorShapeError;

    fn try_from(repr: FloorRepr) -> Result<Self, Self::Error> {
        if repr.grid.width() != repr.width || repr.grid.depth() != repr.depth {
            return Err(FloorShapeError::DimensionMismatch {
                id: repr.id,
                width: repr.width,
                depth: repr.depth,
                grid_width: repr.grid.width(),
                grid_depth: repr.grid.depth(),
            });
        }
        Ok(Self {
            id: repr.id,
            label: repr.label,
            grid: repr.grid,
            booths: repr.booths,
        })
    }
}
