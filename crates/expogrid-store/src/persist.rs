#![forbid(unsafe_code)]

//! Persistence boundary: the data a host saves and hands back to
//! [`Store::restore`](crate::Store::restore).
//!
//! The store never decides when to save or where bytes go. It produces an
//! [`EditorState`] on request and accepts one back.

use ahash::AHashSet;
use expogrid_model::{CellType, Exhibition, Floor};
use serde::{Deserialize, Serialize};

use crate::error::SnapshotError;
use crate::session::PreviewViewPreset;

const fn default_true() -> bool {
    true
}

const fn default_seq() -> u32 {
    1
}

/// Everything needed to rebuild an editing session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorState {
    pub exhibition: Exhibition,
    #[serde(default)]
    pub active_floor_index: usize,
    #[serde(default = "default_true")]
    pub show_floor_annotations: bool,
    #[serde(default)]
    pub preview_view_presets: Vec<PreviewViewPreset>,
    #[serde(default)]
    pub active_preview_view_preset_id: Option<String>,
    #[serde(default = "default_seq")]
    pub snapshot_name_seq: u32,
    /// Milliseconds since the Unix epoch at serialization time.
    #[serde(default)]
    pub saved_at: u64,
}

impl EditorState {
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decodes and validates a saved state.
    pub fn from_json(text: &str) -> Result<Self, SnapshotError> {
        let state: Self = serde_json::from_str(text)?;
        state.validate()?;
        Ok(state)
    }

    /// Checks floor id uniqueness and the grid/booth bijection on every
    /// floor.
    ///
    /// Grid dimensions are already enforced while decoding. Escalator links
    /// are not checked here; restore repairs them with the sanitize pass.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        validate_exhibition(&self.exhibition)
    }
}

/// Floor ids are unique and every floor passes [`validate_floor`].
pub fn validate_exhibition(exhibition: &Exhibition) -> Result<(), SnapshotError> {
    let mut ids = AHashSet::new();
    for floor in &exhibition.floors {
        if !ids.insert(floor.id.as_str()) {
            return Err(SnapshotError::DuplicateFloorId {
                id: floor.id.clone(),
            });
        }
        validate_floor(floor)?;
    }
    Ok(())
}

/// Verifies that booth ids are unique on the floor and that exactly the
/// cells listed by its booths are BOOTH.
pub fn validate_floor(floor: &Floor) -> Result<(), SnapshotError> {
    let mut claimed = AHashSet::new();
    let mut booth_ids = AHashSet::new();
    for booth in &floor.booths {
        if !booth_ids.insert(booth.id.as_str()) {
            return Err(SnapshotError::DuplicateBoothId {
                floor: floor.id.clone(),
                booth: booth.id.clone(),
            });
        }
        for &pos in &booth.cells {
            match floor.cell(pos) {
                Some(CellType::Booth) => {}
                found => {
                    return Err(SnapshotError::BoothCellMismatch {
                        floor: floor.id.clone(),
                        booth: booth.id.clone(),
                        pos,
                        found: found.map_or_else(|| "out of bounds".to_owned(), |t| t.to_string()),
                    });
                }
            }
            if !claimed.insert(pos) {
                return Err(SnapshotError::SharedBoothCell {
                    floor: floor.id.clone(),
                    pos,
                });
            }
        }
    }
    if let Some((pos, _)) = floor
        .grid
        .iter()
        .find(|&(pos, ty)| ty == CellType::Booth && !claimed.contains(&pos))
    {
        return Err(SnapshotError::OrphanBoothCell {
            floor: floor.id.clone(),
            pos,
        });
    }
    Ok(())
}
