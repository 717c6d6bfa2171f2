#![forbid(unsafe_code)]

//! The exhibition root aggregate and escalator links.

use serde::{Deserialize, Serialize};

use crate::cell::{CellPos, CellType};
use crate::floor::Floor;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exhibition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub floors: Vec<Floor>,
    #[serde(default)]
    pub escalator_links: Vec<EscalatorLink>,
}

/// Constructor overrides for [`Exhibition::new`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExhibitionDraft {
    pub id: Option<String>,
    pub name: Option<String>,
    pub start_time: String,
    pub end_time: String,
    pub description: String,
    pub floors: Vec<Floor>,
    pub escalator_links: Vec<EscalatorLink>,
}

impl ExhibitionDraft {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// Metadata edit; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExhibitionPatch {
    pub name: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub description: Option<String>,
}

impl Exhibition {
    #[must_use]
    pub fn new(draft: ExhibitionDraft) -> Self {
        Self {
            id: draft.id.unwrap_or_else(crate::new_id),
            name: draft.name.unwrap_or_else(|| "New Exhibition".to_owned()),
            start_time: draft.start_time,
            end_time: draft.end_time,
            description: draft.description,
            floors: draft.floors,
            escalator_links: draft.escalator_links,
        }
    }

    pub fn apply(&mut self, patch: &ExhibitionPatch) {
        if let Some(name) = &patch.name {
            self.name.clone_from(name);
        }
        if let Some(start) = &patch.start_time {
            self.start_time.clone_from(start);
        }
        if let Some(end) = &patch.end_time {
            self.end_time.clone_from(end);
        }
        if let Some(description) = &patch.description {
            self.description.clone_from(description);
        }
    }

    /// Cell type at `endpoint`, or `None` when the floor or cell is missing.
    #[must_use]
    pub fn cell_at(&self, endpoint: Endpoint) -> Option<CellType> {
        self.floors.get(endpoint.floor)?.cell(endpoint.pos)
    }
}

/// One end of an escalator link: a cell on a specific floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Endpoint {
    pub floor: usize,
    pub pos: CellPos,
}

impl Endpoint {
    #[must_use]
    pub const fn new(floor: usize, x: i32, z: i32) -> Self {
        Self {
            floor,
            pos: CellPos::new(x, z),
        }
    }
}

/// An undirected pairing of escalator cells on adjacent floors.
///
/// Stored with `floor_a <= floor_b` once normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EscalatorLink {
    pub id: String,
    pub floor_a: usize,
    pub x_a: i32,
    pub z_a: i32,
    pub floor_b: usize,
    pub x_b: i32,
    pub z_b: i32,
}

impl EscalatorLink {
    /// A link between `a` and `b` with a fresh id, stored normalized.
    #[must_use]
    pub fn new(a: Endpoint, b: Endpoint) -> Self {
        let mut link = Self {
            id: crate::new_id(),
            floor_a: a.floor,
            x_a: a.pos.x,
            z_a: a.pos.z,
            floor_b: b.floor,
            x_b: b.pos.x,
            z_b: b.pos.z,
        };
        link.normalize();
        link
    }

    #[must_use]
    pub const fn a(&self) -> Endpoint {
        Endpoint::new(self.floor_a, self.x_a, self.z_a)
    }

    #[must_use]
    pub const fn b(&self) -> Endpoint {
        Endpoint::new(self.floor_b, self.x_b, self.z_b)
    }

    pub fn set_a(&mut self, pos: CellPos) {
        self.x_a = pos.x;
        self.z_a = pos.z;
    }

    pub fn set_b(&mut self, pos: CellPos) {
        self.x_b = pos.x;
        self.z_b = pos.z;
    }

    #[must_use]
    pub fn touches(&self, endpoint: Endpoint) -> bool {
        self.a() == endpoint || self.b() == endpoint
    }

    /// Swaps the A and B sides together if `floor_a > floor_b`.
    ///
    /// Returns whether a swap happened.
    pub fn normalize(&mut self) -> bool {
        if self.floor_a <= self.floor_b {
            return false;
        }
        std::mem::swap(&mut self.floor_a, &mut self.floor_b);
        std::mem::swap(&mut self.x_a, &mut self.x_b);
        std::mem::swap(&mut self.z_a, &mut self.z_b);
        true
    }

    /// Order-independent identity of the endpoint pair.
    #[must_use]
    pub fn pair_key(&self) -> (Endpoint, Endpoint) {
        pair_key(self.a(), self.b())
    }
}

/// Order-independent identity of an endpoint pair: the lower floor first.
#[must_use]
pub fn pair_key(a: Endpoint, b: Endpoint) -> (Endpoint, Endpoint) {
    if a.floor <= b.floor { (a, b) } else { (b, a) }
}
