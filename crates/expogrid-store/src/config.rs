#![forbid(unsafe_code)]

//! Store limits and defaults.

use serde::Deserialize;

use crate::session::BoothTemplate;

/// Caps and defaults applied by the [`Store`](crate::Store).
///
/// Every field has a default, so a partial JSON document is a valid config:
///
/// ```
/// use expogrid_store::StoreConfig;
///
/// let cfg = StoreConfig::from_json(r#"{ "undoLimit": 50 }"#).unwrap();
/// assert_eq!(cfg.undo_limit, 50);
/// assert_eq!(cfg.max_floors, 9);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreConfig {
    /// Maximum number of floors in one exhibition.
    pub max_floors: usize,
    /// Maximum `width * depth` of a single floor, in square meters.
    pub max_floor_area: u64,
    /// Undo entries kept; the oldest is dropped first.
    pub undo_limit: usize,
    /// Saved preview camera presets kept; the oldest is evicted first.
    pub preview_preset_limit: usize,
    pub default_floor_width: u32,
    pub default_floor_depth: u32,
    pub default_booth_template: BoothTemplate,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_floors: 9,
            max_floor_area: 30_000,
            undo_limit: 20,
            preview_preset_limit: 3,
            default_floor_width: expogrid_model::DEFAULT_FLOOR_WIDTH,
            default_floor_depth: expogrid_model::DEFAULT_FLOOR_DEPTH,
            default_booth_template: BoothTemplate::default(),
        }
    }
}

impl StoreConfig {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    #[must_use]
    pub fn with_max_floors(mut self, max: usize) -> Self {
        self.max_floors = max;
        self
    }

    #[must_use]
    pub fn with_max_floor_area(mut self, area: u64) -> Self {
        self.max_floor_area = area;
        self
    }

    #[must_use]
    pub fn with_undo_limit(mut self, limit: usize) -> Self {
        self.undo_limit = limit;
        self
    }

    #[must_use]
    pub fn with_preview_preset_limit(mut self, limit: usize) -> Self {
        self.preview_preset_limit = limit;
        self
    }

    #[must_use]
    pub fn with_default_floor_size(mut self, width: u32, depth: u32) -> Self {
        self.default_floor_width = width;
        self.default_floor_depth = depth;
        self
    }

    #[must_use]
    pub fn with_default_booth_template(mut self, template: BoothTemplate) -> Self {
        self.default_booth_template = template;
        self
    }
}
