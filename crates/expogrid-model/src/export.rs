#![forbid(unsafe_code)]

//! Flattened interchange projection of an [`Exhibition`].
//!
//! The projection borrows from the tree; nothing internal to the store
//! (indexes, selection, undo) is reachable through it. Power descriptors
//! are copied so the exported document never aliases live booth state.

use serde::Serialize;

use crate::booth::{Booth, BoothStatus, Orientation, PowerSpec};
use crate::cell::{CellPos, CellType};
use crate::exhibition::{EscalatorLink, Exhibition};
use crate::floor::Floor;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExhibitionExport<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub start_time: &'a str,
    pub end_time: &'a str,
    pub description: &'a str,
    pub floors: Vec<FloorExport<'a>>,
    pub escalator_links: Vec<LinkExport<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FloorExport<'a> {
    pub id: &'a str,
    pub label: &'a str,
    pub width: u32,
    pub depth: u32,
    pub grid: Vec<&'a [CellType]>,
    pub booths: Vec<BoothExport<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoothExport<'a> {
    pub id: &'a str,
    pub floor_id: &'a str,
    pub cells: &'a [CellPos],
    pub area: usize,
    pub price_per_unit: f64,
    pub total_price: f64,
    pub brand_name: &'a str,
    pub contact_name: &'a str,
    pub company_name: &'a str,
    pub website: &'a str,
    pub contact_email: &'a str,
    pub booth_rent: f64,
    pub orientation: Orientation,
    pub power: PowerSpec,
    pub status: BoothStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkExport<'a> {
    pub id: &'a str,
    pub floor_a: usize,
    pub x_a: i32,
    pub z_a: i32,
    pub floor_b: usize,
    pub x_b: i32,
    pub z_b: i32,
}

impl<'a> From<&'a Exhibition> for ExhibitionExport<'a> {
    fn from(ex: &'a Exhibition) -> Self {
        Self {
            id: &ex.id,
            name: &ex.name,
            start_time: &ex.start_time,
            end_time: &ex.end_time,
            description: &ex.description,
            floors: ex.floors.iter().map(FloorExport::from).collect(),
            escalator_links: ex.escalator_links.iter().map(LinkExport::from).collect(),
        }
    }
}

impl<'a> From<&'a Floor> for FloorExport<'a> {
    fn from(floor: &'a Floor) -> Self {
        Self {
            id: &floor.id,
            label: &floor.label,
            width: floor.width(),
            depth: floor.depth(),
            grid: floor.grid.columns().collect(),
            booths: floor.booths.iter().map(BoothExport::from).collect(),
        }
    }
}

impl<'a> From<&'a Booth> for BoothExport<'a> {
    fn from(b: &'a Booth) -> Self {
        Self {
            id: &b.id,
            floor_id: &b.floor_id,
            cells: &b.cells,
            area: b.area,
            price_per_unit: b.price_per_unit,
            total_price: b.total_price,
            brand_name: &b.brand_name,
            contact_name: &b.contact_name,
            company_name: &b.company_name,
            website: &b.website,
            contact_email: &b.contact_email,
            // A rent that never made it past the JSON boundary falls back to
            // the computed total.
            booth_rent: if b.booth_rent.is_finite() { b.booth_rent } else { b.total_price },
            orientation: b.orientation,
            power: b.power.clone(),
            status: b.status,
        }
    }
}

impl<'a> From<&'a EscalatorLink> for LinkExport<'a> {
    fn from(l: &'a EscalatorLink) -> Self {
        Self {
            id: &l.id,
            floor_a: l.floor_a,
            x_a: l.x_a,
            z_a: l.z_a,
            floor_b: l.floor_b,
            x_b: l.x_b,
            z_b: l.z_b,
        }
    }
}

impl ExhibitionExport<'_> {
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_value(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}
