#![forbid(unsafe_code)]

//! Dense per-floor cell storage.
//!
//! # Layout
//!
//! Cells are stored column-major: index `x * depth + z`. The wire form is
//! the nested `[x][z]` array the editor has always exchanged, so a column
//! is a contiguous slice and serialization never copies cells one by one.
//!
//! # Invariants
//!
//! - `cells.len() == width * depth` at all times.
//! - Every cell holds exactly one [`CellType`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cell::{CellPos, CellType};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridShapeError {
    #[error("grid column {column} has {found} cells, expected {expected}")]
    RaggedColumn {
        column: usize,
        found: usize,
        expected: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<Vec<CellType>>", try_from = "Vec<Vec<CellType>>")]
pub struct Grid {
    width: u32,
    depth: u32,
    cells: Vec<CellType>,
}

impl Grid {
    /// A `width` x `depth` grid filled with [`CellType::Empty`].
    #[must_use]
    pub fn new(width: u32, depth: u32) -> Self {
        Self {
            width,
            depth,
            cells: vec![CellType::Empty; width as usize * depth as usize],
        }
    }

    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub const fn depth(&self) -> u32 {
        self.depth
    }

    #[must_use]
    pub fn contains(&self, pos: CellPos) -> bool {
        self.index(pos).is_some()
    }

    fn index(&self, pos: CellPos) -> Option<usize> {
        let x = u32::try_from(pos.x).ok().filter(|&x| x < self.width)?;
        let z = u32::try_from(pos.z).ok().filter(|&z| z < self.depth)?;
        Some(x as usize * self.depth as usize + z as usize)
    }

    /// Cell type at `pos`, or `None` outside the grid.
    #[must_use]
    pub fn get(&self, pos: CellPos) -> Option<CellType> {
        self.index(pos).map(|i| self.cells[i])
    }

    /// Writes `ty` at `pos` and returns the previous type.
    ///
    /// Returns `None` (and writes nothing) outside the grid.
    pub fn set(&mut self, pos: CellPos, ty: CellType) -> Option<CellType> {
        let i = self.index(pos)?;
        Some(std::mem::replace(&mut self.cells[i], ty))
    }

    /// A new grid of the given size that keeps every cell inside the
    /// overlap of the old and new bounds. Cells outside the old bounds are
    /// empty.
    #[must_use]
    pub fn resized(&self, width: u32, depth: u32) -> Self {
        let mut next = Self::new(width, depth);
        let keep_w = self.width.min(width) as usize;
        let keep_d = self.depth.min(depth) as usize;
        for x in 0..keep_w {
            let src = x * self.depth as usize;
            let dst = x * depth as usize;
            next.cells[dst..dst + keep_d].copy_from_slice(&self.cells[src..src + keep_d]);
        }
        next
    }

    /// Column `x` as a slice indexed by `z`.
    #[must_use]
    pub fn column(&self, x: u32) -> Option<&[CellType]> {
        if x >= self.width {
            return None;
        }
        let d = self.depth as usize;
        let start = x as usize * d;
        Some(&self.cells[start..start + d])
    }

    /// All columns in `x` order.
    pub fn columns(&self) -> impl Iterator<Item = &[CellType]> + '_ {
        let d = self.depth as usize;
        (0..self.width as usize).map(move |x| &self.cells[x * d..x * d + d])
    }

    /// Every `(position, type)` pair in column-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellPos, CellType)> + '_ {
        let d = self.depth as usize;
        self.cells.iter().enumerate().map(move |(i, &ty)| {
            // Bounded by width * depth, both u32.
            let x = (i / d) as i32;
            let z = (i % d) as i32;
            (CellPos::new(x, z), ty)
        })
    }

    /// Number of cells holding `ty`.
    #[must_use]
    pub fn count(&self, ty: CellType) -> usize {
        self.cells.iter().filter(|&&c| c == ty).count()
    }
}

impl From<Grid> for Vec<Vec<CellType>> {
    fn from(grid: Grid) -> Self {
        grid.columns().map(<[CellType]>::to_vec).collect()
    }
}

impl TryFrom<Vec<Vec<CellType>>> for Grid {
    type Error = GridShapeError;

    fn try_from(columns: Vec<Vec<CellType>>) -> Result<Self, Self::Error> {
        let expected = columns.first().map_or(0, Vec::len);
        let mut cells = Vec::with_capacity(columns.len() * expected);
        for (column, col) in columns.iter().enumerate() {
            if col.len() != expected {
                return Err(GridShapeError::RaggedColumn {
                    column,
                    found: col.len(),
                    expected,
                });
            }
            cells.extend_from_slice(col);
        }
        Ok(Self {
            width: u32::try_from(columns.len()).unwrap_or(u32::MAX),
            depth: u32::try_from(expected).unwrap_or(u32::MAX),
            cells,
        })
    }
}
