#![forbid(unsafe_code)]

//! Cell categories, grid coordinates, and 4-connectivity.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The category assigned to one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CellType {
    #[default]
    Empty,
    Corridor,
    Restricted,
    Entrance,
    Booth,
    Elevator,
    Escalator,
    LedScreen,
}

impl CellType {
    pub const ALL: [Self; 8] = [
        Self::Empty,
        Self::Corridor,
        Self::Restricted,
        Self::Entrance,
        Self::Booth,
        Self::Elevator,
        Self::Escalator,
        Self::LedScreen,
    ];

    /// Wire name, identical to the serde representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Corridor => "corridor",
            Self::Restricted => "restricted",
            Self::Entrance => "entrance",
            Self::Booth => "booth",
            Self::Elevator => "elevator",
            Self::Escalator => "escalator",
            Self::LedScreen => "ledScreen",
        }
    }

    /// Public-area types that are selected and moved as whole regions.
    ///
    /// Booth cells move with their booth and empty cells are not selectable.
    #[must_use]
    pub const fn is_movable(self) -> bool {
        matches!(
            self,
            Self::Corridor
                | Self::Restricted
                | Self::Entrance
                | Self::LedScreen
                | Self::Elevator
                | Self::Escalator
        )
    }
}

impl fmt::Display for CellType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown cell type: {0:?}")]
pub struct ParseCellTypeError(pub String);

impl FromStr for CellType {
    type Err = ParseCellTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|ty| ty.as_str() == s)
            .ok_or_else(|| ParseCellTypeError(s.to_owned()))
    }
}

/// A grid coordinate. Serializes as `{ "x": .., "z": .. }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellPos {
    pub x: i32,
    pub z: i32,
}

impl CellPos {
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// This position shifted by `(dx, dz)`. Saturates instead of overflowing.
    #[must_use]
    pub const fn offset(self, dx: i32, dz: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            z: self.z.saturating_add(dz),
        }
    }

    /// The four orthogonal neighbours (E, W, S, N).
    #[must_use]
    pub const fn neighbors(self) -> [Self; 4] {
        [
            self.offset(1, 0),
            self.offset(-1, 0),
            self.offset(0, 1),
            self.offset(0, -1),
        ]
    }
}

impl From<(i32, i32)> for CellPos {
    fn from((x, z): (i32, i32)) -> Self {
        Self { x, z }
    }
}

impl fmt::Display for CellPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// Whether `cells` forms a single 4-connected region.
///
/// The empty set and singletons are contiguous. A list containing the same
/// position twice is not: the flood fill can never visit more distinct cells
/// than the list holds entries.
#[must_use]
pub fn is_contiguous(cells: &[CellPos]) -> bool {
    let Some(&start) = cells.first() else {
        return true;
    };
    if cells.len() == 1 {
        return true;
    }
    let members: AHashSet<CellPos> = cells.iter().copied().collect();
    let mut visited = AHashSet::with_capacity(members.len());
    let mut queue = VecDeque::from([start]);
    visited.insert(start);
    while let Some(cur) = queue.pop_front() {
        for next in cur.neighbors() {
            if members.contains(&next) && visited.insert(next) {
                queue.push_back(next);
            }
        }
    }
    visited.len() == cells.len()
}
