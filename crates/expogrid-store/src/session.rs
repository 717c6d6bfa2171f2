#![forbid(unsafe_code)]

//! Editor session state: tool, mode, view filter, booth drawing, and saved
//! preview camera presets.
//!
//! These fields carry no floorplan invariants. The store owns one
//! [`Session`] and wraps each setter with the matching change event.

use std::fmt;
use std::str::FromStr;

use expogrid_model::{BoothStatus, CellPos, CellType};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use web_time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value:?}")]
pub struct ParseSessionError {
    pub kind: &'static str,
    pub value: String,
}

/// Active grid-editor tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EditTool {
    #[default]
    Select,
    Corridor,
    Restricted,
    Entrance,
    LedScreen,
    Elevator,
    Escalator,
    BoothTemplate,
    BoothDraw,
}

impl EditTool {
    pub const ALL: [Self; 9] = [
        Self::Select,
        Self::Corridor,
        Self::Restricted,
        Self::Entrance,
        Self::LedScreen,
        Self::Elevator,
        Self::Escalator,
        Self::BoothTemplate,
        Self::BoothDraw,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Corridor => "corridor",
            Self::Restricted => "restricted",
            Self::Entrance => "entrance",
            Self::LedScreen => "ledScreen",
            Self::Elevator => "elevator",
            Self::Escalator => "escalator",
            Self::BoothTemplate => "boothTemplate",
            Self::BoothDraw => "boothDraw",
        }
    }

    /// Cell type painted by this tool, for the painting tools.
    #[must_use]
    pub const fn paint_type(self) -> Option<CellType> {
        match self {
            Self::Corridor => Some(CellType::Corridor),
            Self::Restricted => Some(CellType::Restricted),
            Self::Entrance => Some(CellType::Entrance),
            Self::LedScreen => Some(CellType::LedScreen),
            Self::Elevator => Some(CellType::Elevator),
            Self::Escalator => Some(CellType::Escalator),
            Self::Select | Self::BoothTemplate | Self::BoothDraw => None,
        }
    }
}

impl fmt::Display for EditTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EditTool {
    type Err = ParseSessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ParseSessionError {
                kind: "edit tool",
                value: s.to_owned(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditMode {
    #[default]
    Edit,
    Preview,
}

impl EditMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Edit => "edit",
            Self::Preview => "preview",
        }
    }
}

/// Which cells the renderers should draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ViewFilter {
    #[default]
    #[serde(rename = "all")]
    All,
    #[serde(rename = "elevator")]
    Elevator,
    #[serde(rename = "escalator")]
    Escalator,
    #[serde(rename = "booth")]
    Booth,
    #[serde(rename = "booth-reserved")]
    BoothReserved,
    #[serde(rename = "booth-sold")]
    BoothSold,
    #[serde(rename = "corridor")]
    Corridor,
    #[serde(rename = "restricted")]
    Restricted,
    #[serde(rename = "entrance")]
    Entrance,
    #[serde(rename = "ledScreen")]
    LedScreen,
}

impl ViewFilter {
    pub const ALL: [Self; 10] = [
        Self::All,
        Self::Elevator,
        Self::Escalator,
        Self::Booth,
        Self::BoothReserved,
        Self::BoothSold,
        Self::Corridor,
        Self::Restricted,
        Self::Entrance,
        Self::LedScreen,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Elevator => "elevator",
            Self::Escalator => "escalator",
            Self::Booth => "booth",
            Self::BoothReserved => "booth-reserved",
            Self::BoothSold => "booth-sold",
            Self::Corridor => "corridor",
            Self::Restricted => "restricted",
            Self::Entrance => "entrance",
            Self::LedScreen => "ledScreen",
        }
    }

    /// Whether a cell of type `ty` is visible under this filter.
    ///
    /// `booth_status` is the status of the booth covering the cell, if any.
    /// A booth cell with no owning booth is never shown by a filtered view.
    #[must_use]
    pub fn shows_cell(self, ty: CellType, booth_status: Option<BoothStatus>) -> bool {
        if self == Self::All {
            return true;
        }
        if ty == CellType::Booth {
            return match (self, booth_status) {
                (_, None) => false,
                (Self::Booth, Some(_)) => true,
                (Self::BoothReserved, Some(status)) => status == BoothStatus::Reserved,
                (Self::BoothSold, Some(status)) => status == BoothStatus::Sold,
                _ => false,
            };
        }
        let shown = match self {
            Self::Elevator => CellType::Elevator,
            Self::Escalator => CellType::Escalator,
            Self::Corridor => CellType::Corridor,
            Self::Restricted => CellType::Restricted,
            Self::Entrance => CellType::Entrance,
            Self::LedScreen => CellType::LedScreen,
            Self::All | Self::Booth | Self::BoothReserved | Self::BoothSold => return false,
        };
        shown == ty
    }
}

impl FromStr for ViewFilter {
    type Err = ParseSessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| ParseSessionError {
                kind: "view filter",
                value: s.to_owned(),
            })
    }
}

/// Rectangle stamped by the booth-template tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoothTemplate {
    pub w: u32,
    pub h: u32,
}

impl Default for BoothTemplate {
    fn default() -> Self {
        Self { w: 3, h: 3 }
    }
}

impl BoothTemplate {
    #[must_use]
    pub fn area(self) -> u64 {
        u64::from(self.w) * u64::from(self.h)
    }

    /// Corner diagonally opposite `anchor`, saturating at the coordinate
    /// range. Equal to `anchor` for an empty template.
    #[must_use]
    pub fn far_corner(self, anchor: CellPos) -> CellPos {
        let w = i32::try_from(self.w).unwrap_or(i32::MAX);
        let h = i32::try_from(self.h).unwrap_or(i32::MAX);
        anchor.offset(w.saturating_sub(1).max(0), h.saturating_sub(1).max(0))
    }

    /// Cells covered when the template's corner is placed at `anchor`.
    ///
    /// Allocates `w * h` positions; callers bound the template first.
    #[must_use]
    pub fn cells_at(self, anchor: CellPos) -> Vec<CellPos> {
        let w = i32::try_from(self.w).unwrap_or(i32::MAX);
        let h = i32::try_from(self.h).unwrap_or(i32::MAX);
        let capacity = usize::try_from(self.w)
            .ok()
            .zip(usize::try_from(self.h).ok())
            .and_then(|(w, h)| w.checked_mul(h))
            .unwrap_or(0);
        let mut cells = Vec::with_capacity(capacity);
        for dx in 0..w {
            for dz in 0..h {
                cells.push(anchor.offset(dx, dz));
            }
        }
        cells
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// A saved 3D preview camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewViewPreset {
    pub id: String,
    pub name: String,
    pub floor_index: usize,
    pub camera: Vec3,
    pub target: Vec3,
    /// Milliseconds since the Unix epoch.
    pub created_at: u64,
    pub updated_at: u64,
}

/// Caller-supplied part of a [`PreviewViewPreset`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewPresetDraft {
    pub name: String,
    pub floor_index: usize,
    pub camera: Vec3,
    pub target: Vec3,
}

pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

/// Mutable editor state that sits beside the exhibition tree.
#[derive(Debug, Clone)]
pub struct Session {
    pub edit_tool: EditTool,
    pub edit_mode: EditMode,
    pub view_filter: ViewFilter,
    pub booth_template: BoothTemplate,
    pub show_floor_annotations: bool,
    /// Cells picked so far with the booth-draw tool.
    pub drawing_cells: Vec<CellPos>,
    pub preview_presets: Vec<PreviewViewPreset>,
    pub active_preset_id: Option<String>,
    /// Sequence number used for the next default snapshot name.
    pub snapshot_name_seq: u32,
    preset_limit: usize,
}

impl Session {
    #[must_use]
    pub fn new(booth_template: BoothTemplate, preset_limit: usize) -> Self {
        Self {
            edit_tool: EditTool::default(),
            edit_mode: EditMode::default(),
            view_filter: ViewFilter::default(),
            booth_template,
            show_floor_annotations: true,
            drawing_cells: Vec::new(),
            preview_presets: Vec::new(),
            active_preset_id: None,
            snapshot_name_seq: 1,
            preset_limit,
        }
    }

    #[must_use]
    pub const fn preset_limit(&self) -> usize {
        self.preset_limit
    }

    #[must_use]
    pub fn default_snapshot_name(&self) -> String {
        format!("expoGrid{:03}", self.snapshot_name_seq)
    }

    /// Replaces all presets, keeping at most the limit.
    pub fn set_presets(&mut self, mut presets: Vec<PreviewViewPreset>, active_id: Option<String>) {
        presets.truncate(self.preset_limit);
        self.preview_presets = presets;
        self.active_preset_id = active_id;
    }

    /// Overwrites the preset `target_id` in place when it exists, otherwise
    /// appends a new preset and evicts the oldest beyond the limit. The
    /// saved preset becomes active. Returns its id.
    pub fn save_preset(&mut self, draft: PreviewPresetDraft, target_id: Option<&str>) -> String {
        let now = now_millis();
        if let Some(target) = target_id
            && let Some(existing) = self.preview_presets.iter_mut().find(|p| p.id == target)
        {
            existing.name = draft.name;
            existing.floor_index = draft.floor_index;
            existing.camera = draft.camera;
            existing.target = draft.target;
            existing.updated_at = now;
            self.active_preset_id = Some(existing.id.clone());
            return existing.id.clone();
        }
        let id = expogrid_model::new_id();
        self.preview_presets.push(PreviewViewPreset {
            id: id.clone(),
            name: draft.name,
            floor_index: draft.floor_index,
            camera: draft.camera,
            target: draft.target,
            created_at: now,
            updated_at: now,
        });
        while self.preview_presets.len() > self.preset_limit {
            self.preview_presets.remove(0);
        }
        self.active_preset_id = Some(id.clone());
        id
    }

    /// Removes preset `id`. Clears the active id if it pointed there.
    pub fn remove_preset(&mut self, id: &str) -> bool {
        let Some(idx) = self.preview_presets.iter().position(|p| p.id == id) else {
            return false;
        };
        self.preview_presets.remove(idx);
        if self.active_preset_id.as_deref() == Some(id) {
            self.active_preset_id = None;
        }
        true
    }

    /// Toggles `pos` in the drawing set.
    pub fn toggle_drawing_cell(&mut self, pos: CellPos) {
        if let Some(idx) = self.drawing_cells.iter().position(|&c| c == pos) {
            self.drawing_cells.remove(idx);
        } else {
            self.drawing_cells.push(pos);
        }
    }
}
