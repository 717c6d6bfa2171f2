#![no_main]

use std::collections::HashSet;

use arbitrary::Arbitrary;
use expogrid_model::{CellPos, CellType, Endpoint, FloorDraft};
use expogrid_store::persist::validate_floor;
use expogrid_store::{Store, StoreConfig};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug, Clone, Copy)]
enum Paint {
    Empty,
    Corridor,
    Restricted,
    Entrance,
    LedScreen,
    Elevator,
    Escalator,
}

impl Paint {
    fn cell_type(self) -> CellType {
        match self {
            Paint::Empty => CellType::Empty,
            Paint::Corridor => CellType::Corridor,
            Paint::Restricted => CellType::Restricted,
            Paint::Entrance => CellType::Entrance,
            Paint::LedScreen => CellType::LedScreen,
            Paint::Elevator => CellType::Elevator,
            Paint::Escalator => CellType::Escalator,
        }
    }
}

#[derive(Arbitrary, Debug)]
enum FuzzOp {
    AddFloor { w: u8, d: u8 },
    RemoveFloor(u8),
    SwitchFloor(u8),
    Resize { w: u8, d: u8 },
    SetCell { x: i8, z: i8, paint: Paint },
    SetCells { cells: Vec<(i8, i8)>, paint: Paint },
    AddBooth(Vec<(i8, i8)>),
    RemoveBoothAt { x: i8, z: i8 },
    MoveBoothAt { x: i8, z: i8, dx: i8, dz: i8 },
    SelectMove { x: i8, z: i8, dx: i8, dz: i8 },
    DeleteSelected { x: i8, z: i8 },
    LinkCells { floor: u8, x: i8, z: i8, x2: i8, z2: i8 },
    MoveEscalator { x: i8, z: i8, tx: i8, tz: i8 },
    AutoLink { x: i8, z: i8 },
    Template { w: u32, h: u32, x: i8, z: i8 },
    Undo,
}

fn pos(x: i8, z: i8) -> CellPos {
    CellPos::new(i32::from(x), i32::from(z))
}

fn apply(store: &mut Store, op: &FuzzOp) {
    let active = store.active_floor_index();
    match *op {
        FuzzOp::AddFloor { w, d } => {
            let _ = store.add_floor(FloorDraft::sized(u32::from(w % 40), u32::from(d % 40)));
        }
        FuzzOp::RemoveFloor(i) => {
            let _ = store.remove_floor(usize::from(i % 10));
        }
        FuzzOp::SwitchFloor(i) => {
            let _ = store.set_active_floor(usize::from(i % 10));
        }
        FuzzOp::Resize { w, d } => {
            let _ = store.update_floor_size(u32::from(w % 40), u32::from(d % 40));
        }
        FuzzOp::SetCell { x, z, paint } => {
            let _ = store.set_cell(i32::from(x), i32::from(z), paint.cell_type());
        }
        FuzzOp::SetCells { ref cells, paint } => {
            let cells: Vec<CellPos> = cells.iter().take(64).map(|&(x, z)| pos(x, z)).collect();
            let _ = store.set_cells(&cells, paint.cell_type());
        }
        FuzzOp::AddBooth(ref cells) => {
            let cells: Vec<CellPos> = cells.iter().take(32).map(|&(x, z)| pos(x, z)).collect();
            let _ = store.add_booth(&cells);
        }
        FuzzOp::Template { w, h, x, z } => {
            let _ = store.set_booth_template(w, h);
            let _ = store.place_booth_template(i32::from(x), i32::from(z));
        }
        FuzzOp::RemoveBoothAt { x, z } => {
            if let Some(id) = store.find_booth_at(i32::from(x), i32::from(z)).map(|b| b.id.clone()) {
                let _ = store.remove_booth(&id);
            }
        }
        FuzzOp::MoveBoothAt { x, z, dx, dz } => {
            if let Some(id) = store.find_booth_at(i32::from(x), i32::from(z)).map(|b| b.id.clone()) {
                let _ = store.move_booth(&id, i32::from(dx % 4), i32::from(dz % 4));
            }
        }
        FuzzOp::SelectMove { x, z, dx, dz } => {
            if let Some(ty) = store.active_floor().and_then(|f| f.cell(pos(x, z))) {
                store.select_cell(i32::from(x), i32::from(z), ty);
                let _ = store.move_selected_cell_group(i32::from(dx % 4), i32::from(dz % 4));
            }
        }
        FuzzOp::DeleteSelected { x, z } => {
            if let Some(ty) = store.active_floor().and_then(|f| f.cell(pos(x, z))) {
                store.select_cell(i32::from(x), i32::from(z), ty);
                let _ = store.delete_selected_cell();
            }
        }
        FuzzOp::LinkCells { floor, x, z, x2, z2 } => {
            let a = Endpoint::new(active, i32::from(x), i32::from(z));
            let b = Endpoint::new(usize::from(floor % 10), i32::from(x2), i32::from(z2));
            let _ = store.add_escalator_link(a, b);
        }
        FuzzOp::MoveEscalator { x, z, tx, tz } => {
            let _ = store.move_escalator_cell_group(
                active,
                i32::from(x),
                i32::from(z),
                i32::from(tx),
                i32::from(tz),
            );
        }
        FuzzOp::AutoLink { x, z } => {
            let _ = store.auto_detect_escalator_link(active, i32::from(x), i32::from(z));
        }
        FuzzOp::Undo => {
            store.undo();
        }
    }
}

fn check_invariants(store: &mut Store) {
    for floor in store.floors() {
        if let Err(err) = validate_floor(floor) {
            panic!("bijection broken on {}: {err}", floor.label);
        }
    }
    assert!(store.active_floor_index() < store.floors().len().max(1));

    store.sanitize_escalator_links();
    let ex = store.exhibition();
    let mut pairs = HashSet::new();
    for link in &ex.escalator_links {
        let (a, b) = (link.a(), link.b());
        assert_eq!(b.floor, a.floor + 1, "link {} not adjacent", link.id);
        assert_eq!(ex.cell_at(a), Some(CellType::Escalator));
        assert_eq!(ex.cell_at(b), Some(CellType::Escalator));
        assert!(pairs.insert((a, b)), "duplicate link {}", link.id);
    }
}

fuzz_target!(|ops: Vec<FuzzOp>| {
    let mut store = Store::new(StoreConfig::default().with_undo_limit(32));
    let _ = store.add_floor(FloorDraft::sized(8, 8));
    let _ = store.add_floor(FloorDraft::sized(8, 8));
    for op in ops.iter().take(256) {
        apply(&mut store, op);
        check_invariants(&mut store);
    }
});
