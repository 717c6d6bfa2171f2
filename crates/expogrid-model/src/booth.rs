#![forbid(unsafe_code)]

//! Booths: rentable contiguous cell regions with commercial metadata.
//!
//! # Derived fields
//!
//! `area` is the cell count and `total_price` is `price_per_unit * area`.
//! `booth_rent` starts at the total price unless explicitly provided; an
//! explicit zero is kept.
//!
//! # Field edits
//!
//! [`Booth::apply`] writes a [`BoothPatch`] and returns the inverse patch:
//! the prior value of exactly the fields the patch touched. Feeding that
//! inverse to [`Booth::revert`] restores the booth bit for bit.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cell::CellPos;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoothStatus {
    #[default]
    Idle,
    Reserved,
    Sold,
}

impl BoothStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Reserved => "reserved",
            Self::Sold => "sold",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Orientation {
    #[default]
    Standard,
    EntranceFacing,
    MainCorridor,
    Corner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unsupported voltage {0}V (expected 220 or 380)")]
pub struct VoltageError(pub u16);

/// Supply voltage. Serialized as the bare number of volts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum Voltage {
    #[default]
    V220,
    V380,
}

impl Voltage {
    #[must_use]
    pub const fn volts(self) -> u16 {
        match self {
            Self::V220 => 220,
            Self::V380 => 380,
        }
    }
}

impl From<Voltage> for u16 {
    fn from(v: Voltage) -> Self {
        v.volts()
    }
}

impl TryFrom<u16> for Voltage {
    type Error = VoltageError;

    fn try_from(volts: u16) -> Result<Self, Self::Error> {
        match volts {
            220 => Ok(Self::V220),
            380 => Ok(Self::V380),
            other => Err(VoltageError(other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerSpec {
    #[serde(rename = "type")]
    pub kind: String,
    pub voltage: Voltage,
    pub wattage: u32,
}

impl Default for PowerSpec {
    fn default() -> Self {
        Self {
            kind: "standard".to_owned(),
            voltage: Voltage::V220,
            wattage: 0,
        }
    }
}

/// Partial power update; absent keys are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerPatch {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voltage: Option<Voltage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wattage: Option<u32>,
}

impl PowerPatch {
    fn merge_into(&self, power: &mut PowerSpec) -> Self {
        let mut before = Self::default();
        if let Some(kind) = &self.kind {
            before.kind = Some(std::mem::replace(&mut power.kind, kind.clone()));
        }
        if let Some(voltage) = self.voltage {
            before.voltage = Some(std::mem::replace(&mut power.voltage, voltage));
        }
        if let Some(wattage) = self.wattage {
            before.wattage = Some(std::mem::replace(&mut power.wattage, wattage));
        }
        before
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booth {
    pub id: String,
    pub floor_id: String,
    pub cells: Vec<CellPos>,
    pub area: usize,
    pub price_per_unit: f64,
    pub total_price: f64,
    #[serde(default)]
    pub brand_name: String,
    #[serde(default)]
    pub contact_name: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub contact_email: String,
    pub booth_rent: f64,
    #[serde(default)]
    pub orientation: Orientation,
    #[serde(default)]
    pub power: PowerSpec,
    #[serde(default)]
    pub status: BoothStatus,
}

/// Constructor overrides for [`Booth::new`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoothDraft {
    pub id: String,
    pub floor_id: String,
    pub cells: Vec<CellPos>,
    pub price_per_unit: f64,
    /// `None` means "follow the total price"; `Some(0.0)` is a real zero.
    pub booth_rent: Option<f64>,
    pub brand_name: String,
    pub contact_name: String,
    pub company_name: String,
    pub website: String,
    pub contact_email: String,
    pub orientation: Orientation,
    pub power: Option<PowerSpec>,
    pub status: BoothStatus,
}

impl Booth {
    #[must_use]
    pub fn new(draft: BoothDraft) -> Self {
        let area = draft.cells.len();
        let total_price = draft.price_per_unit * area as f64;
        Self {
            id: draft.id,
            floor_id: draft.floor_id,
            cells: draft.cells,
            area,
            price_per_unit: draft.price_per_unit,
            total_price,
            brand_name: draft.brand_name,
            contact_name: draft.contact_name,
            company_name: draft.company_name,
            website: draft.website,
            contact_email: draft.contact_email,
            booth_rent: draft.booth_rent.unwrap_or(total_price),
            orientation: draft.orientation,
            power: draft.power.unwrap_or_default(),
            status: draft.status,
        }
    }

    /// Whether this booth occupies `pos`.
    #[must_use]
    pub fn occupies(&self, pos: CellPos) -> bool {
        self.cells.contains(&pos)
    }

    /// Applies the fields present in `patch` and returns their prior values.
    ///
    /// Text fields are trimmed. A price-per-unit change recomputes the total
    /// price. A non-finite rent is stored as zero.
    pub fn apply(&mut self, patch: &BoothPatch) -> BoothPatch {
        let mut before = BoothPatch::default();
        if let Some(price) = patch.price_per_unit {
            before.price_per_unit = Some(self.price_per_unit);
            self.set_price_per_unit(price);
        }
        if let Some(orientation) = patch.orientation {
            before.orientation = Some(std::mem::replace(&mut self.orientation, orientation));
        }
        if let Some(power) = &patch.power {
            before.power = Some(power.merge_into(&mut self.power));
        }
        if let Some(status) = patch.status {
            before.status = Some(std::mem::replace(&mut self.status, status));
        }
        for (field, before_slot, value) in [
            (&mut self.brand_name, &mut before.brand_name, &patch.brand_name),
            (&mut self.contact_name, &mut before.contact_name, &patch.contact_name),
            (&mut self.company_name, &mut before.company_name, &patch.company_name),
            (&mut self.website, &mut before.website, &patch.website),
            (&mut self.contact_email, &mut before.contact_email, &patch.contact_email),
        ] {
            if let Some(value) = value {
                *before_slot = Some(std::mem::replace(field, value.trim().to_owned()));
            }
        }
        if let Some(rent) = patch.booth_rent {
            before.booth_rent = Some(self.booth_rent);
            self.booth_rent = if rent.is_finite() { rent } else { 0.0 };
        }
        before
    }

    /// Restores the values recorded by [`Booth::apply`] verbatim.
    pub fn revert(&mut self, before: &BoothPatch) {
        if let Some(price) = before.price_per_unit {
            self.set_price_per_unit(price);
        }
        if let Some(orientation) = before.orientation {
            self.orientation = orientation;
        }
        if let Some(power) = &before.power {
            power.merge_into(&mut self.power);
        }
        if let Some(status) = before.status {
            self.status = status;
        }
        for (field, value) in [
            (&mut self.brand_name, &before.brand_name),
            (&mut self.contact_name, &before.contact_name),
            (&mut self.company_name, &before.company_name),
            (&mut self.website, &before.website),
            (&mut self.contact_email, &before.contact_email),
        ] {
            if let Some(value) = value {
                field.clone_from(value);
            }
        }
        if let Some(rent) = before.booth_rent {
            self.booth_rent = rent;
        }
    }

    fn set_price_per_unit(&mut self, price: f64) {
        self.price_per_unit = price;
        self.total_price = price * self.area as f64;
    }
}

/// A partial booth update. Only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BoothPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_unit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation: Option<Orientation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power: Option<PowerPatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<BoothStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booth_rent: Option<f64>,
}

impl BoothPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    #[must_use]
    pub fn with_price_per_unit(mut self, price: f64) -> Self {
        self.price_per_unit = Some(price);
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: BoothStatus) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn with_brand_name(mut self, name: impl Into<String>) -> Self {
        self.brand_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_booth_rent(mut self, rent: f64) -> Self {
        self.booth_rent = Some(rent);
        self
    }

    #[must_use]
    pub fn with_power(mut self, power: PowerPatch) -> Self {
        self.power = Some(power);
        self
    }
}
