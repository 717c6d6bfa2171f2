use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use expogrid_model::{
    BoothPatch, CellPos, CellType, Endpoint, EscalatorLink, ExhibitionDraft, ExhibitionPatch,
    FloorDraft,
};
use tracing::Subscriber;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};

use super::Store;
use crate::config::StoreConfig;
use crate::error::ConstraintError;
use crate::notify::{StoreEvent, Subscription};
use crate::persist::validate_floor;
use crate::selection::Selection;
use crate::session::{BoothTemplate, EditMode, EditTool, PreviewPresetDraft, ViewFilter};

fn store_with_floor(width: u32, depth: u32) -> Store {
    let mut store = Store::default();
    store.add_floor(FloorDraft::sized(width, depth)).unwrap();
    store
}

fn store_with_floors(count: usize) -> Store {
    let mut store = Store::default();
    for _ in 0..count {
        store.add_floor(FloorDraft::sized(10, 10)).unwrap();
    }
    store
}

fn cells(list: &[(i32, i32)]) -> Vec<CellPos> {
    list.iter().copied().map(CellPos::from).collect()
}

fn record(store: &Store) -> (Rc<RefCell<Vec<&'static str>>>, Subscription) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    let sub = store.subscribe(move |event| sink.borrow_mut().push(event.kind().as_str()));
    (log, sub)
}

fn paint_on(store: &mut Store, floor: usize, x: i32, z: i32, ty: CellType) {
    store.set_active_floor(floor).unwrap();
    store.set_cell(x, z, ty).unwrap();
}

fn assert_consistent(store: &Store) {
    for floor in store.floors() {
        validate_floor(floor).unwrap();
    }
}

// ---------------------------------------------------------------------------
// Log capture
// ---------------------------------------------------------------------------

struct CaptureLayer {
    lines: Arc<Mutex<Vec<String>>>,
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        struct Message(Option<String>);
        impl tracing::field::Visit for Message {
            fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
                if field.name() == "message" {
                    self.0 = Some(value.to_owned());
                }
            }

            fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
                if field.name() == "message" && self.0.is_none() {
                    self.0 = Some(format!("{value:?}"));
                }
            }
        }
        let mut message = Message(None);
        event.record(&mut message);
        if let Some(text) = message.0 {
            let level = event.metadata().level();
            self.lines.lock().expect("log capture lock").push(format!("{level} {text}"));
        }
    }
}

fn capture_logs(f: impl FnOnce()) -> Vec<String> {
    let lines = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry().with(CaptureLayer {
        lines: Arc::clone(&lines),
    });
    {
        let _guard = tracing::subscriber::set_default(subscriber);
        f();
    }
    let out = lines.lock().expect("log capture lock").clone();
    out
}

// ---------------------------------------------------------------------------
// Floors
// ---------------------------------------------------------------------------

#[test]
fn test_new_store_has_no_active_floor() {
    let mut store = Store::default();
    assert!(store.active_floor().is_none());
    assert_eq!(
        store.set_cell(0, 0, CellType::Corridor),
        Err(ConstraintError::NoActiveFloor)
    );
    assert_eq!(store.last_constraint_error(), "no active floor");
}

#[test]
fn test_add_floor_labels_and_activates() {
    let mut store = Store::default();
    let (log, _sub) = record(&store);
    store.add_floor(FloorDraft::default()).unwrap();
    let second = store.add_floor(FloorDraft::sized(5, 4)).unwrap();
    assert_eq!(second.label, "L2");
    assert_eq!((second.width(), second.depth()), (5, 4));
    assert_eq!(store.active_floor_index(), 1);
    assert_eq!(store.floors()[0].label, "L1");
    assert_eq!(
        *log.borrow(),
        vec!["floor-added", "active-floor-changed", "floor-added", "active-floor-changed"]
    );
}

#[test]
fn test_add_floor_uses_configured_default_size() {
    let mut store = Store::new(StoreConfig::default().with_default_floor_size(20, 15));
    let floor = store.add_floor(FloorDraft::default().with_label("Hall B")).unwrap();
    assert_eq!((floor.width(), floor.depth()), (20, 15));
    assert_eq!(floor.label, "Hall B");
}

#[test]
fn test_add_floor_rejects_oversized_area_silently() {
    let mut store = Store::default();
    let (log, _sub) = record(&store);
    let err = store.add_floor(FloorDraft::sized(200, 200)).unwrap_err();
    assert_eq!(err, ConstraintError::FloorArea { area: 40_000, max: 30_000 });
    assert!(store.last_constraint_error().contains("30000"));
    assert!(store.floors().is_empty());
    assert!(log.borrow().is_empty());
    assert!(!store.can_undo());
}

#[test]
fn test_successful_add_floor_clears_last_error() {
    let mut store = Store::default();
    let _ = store.add_floor(FloorDraft::sized(500, 500));
    assert!(!store.last_constraint_error().is_empty());
    store.add_floor(FloorDraft::default()).unwrap();
    assert!(store.last_constraint_error().is_empty());
}

#[test]
fn test_add_floor_rejects_taken_id() {
    let mut store = Store::default();
    let draft = FloorDraft {
        id: Some("hall".into()),
        ..FloorDraft::sized(4, 4)
    };
    store.add_floor(draft.clone()).unwrap();
    let (log, _sub) = record(&store);

    let err = store.add_floor(draft).unwrap_err();
    assert_eq!(err, ConstraintError::DuplicateFloorId { id: "hall".into() });
    assert!(store.last_constraint_error().contains("hall"));
    assert_eq!(store.floors().len(), 1);
    assert_eq!(store.undo_history().len(), 1);
    assert!(log.borrow().is_empty());
}

#[test]
fn test_add_floor_rejects_repeated_booth_ids() {
    let mut store = Store::default();
    let mut draft = FloorDraft::sized(4, 4);
    let mut grid = expogrid_model::Grid::new(4, 4);
    for (x, z) in [(0, 0), (3, 3)] {
        grid.set(CellPos::new(x, z), CellType::Booth);
        draft.booths.push(expogrid_model::Booth::new(expogrid_model::BoothDraft {
            id: "L001".into(),
            cells: vec![CellPos::new(x, z)],
            ..expogrid_model::BoothDraft::default()
        }));
    }
    draft.grid = Some(grid);
    assert!(matches!(
        store.add_floor(draft),
        Err(ConstraintError::InvalidFloor { .. })
    ));
    assert!(store.floors().is_empty());
}

#[test]
fn test_add_floor_rejects_inconsistent_booths() {
    let mut store = Store::default();
    let mut draft = FloorDraft::sized(4, 4);
    draft.booths.push(expogrid_model::Booth::new(expogrid_model::BoothDraft {
        id: "L001".into(),
        cells: cells(&[(0, 0)]),
        ..expogrid_model::BoothDraft::default()
    }));
    let err = store.add_floor(draft).unwrap_err();
    assert!(matches!(err, ConstraintError::InvalidFloor { .. }), "{err}");
}

#[test]
fn test_remove_floor_drops_and_renumbers_links() {
    let mut store = store_with_floors(3);
    for floor in 0..3 {
        paint_on(&mut store, floor, 1, 1, CellType::Escalator);
    }
    assert_eq!(store.escalator_links().len(), 2);

    let (log, _sub) = record(&store);
    let removed = store.remove_floor(0).unwrap();
    assert_eq!(removed.label, "L1");
    let links = store.escalator_links();
    assert_eq!(links.len(), 1);
    assert_eq!((links[0].floor_a, links[0].floor_b), (0, 1));
    assert_eq!(store.active_floor_index(), 1);
    assert_eq!(
        *log.borrow(),
        vec!["floor-removed", "active-floor-changed", "escalator-links-changed"]
    );
}

#[test]
fn test_remove_last_floor_is_rejected() {
    let mut store = store_with_floor(4, 4);
    assert_eq!(store.remove_floor(0), Err(ConstraintError::LastFloor));
    assert_eq!(
        store.remove_floor(3),
        Err(ConstraintError::FloorOutOfRange { index: 3, count: 1 })
    );
    assert_eq!(store.floors().len(), 1);
}

#[test]
fn test_set_active_floor_clears_selection() {
    let mut store = store_with_floors(2);
    store.select_booth("L001");
    store.set_active_floor(0).unwrap();
    assert!(store.selection().is_none());
    assert!(store.set_active_floor(2).is_err());
    assert_eq!(store.active_floor_index(), 0);
}

#[test]
fn test_update_floor_size_drops_booths_that_no_longer_fit() {
    let mut store = store_with_floor(10, 10);
    let outside = store.add_booth(&cells(&[(7, 0), (8, 0)])).unwrap().id.clone();
    let inside = store.add_booth(&cells(&[(0, 0)])).unwrap().id.clone();
    store.select_booth(outside.clone());

    store.update_floor_size(8, 8).unwrap();
    let floor = store.active_floor().unwrap();
    assert_eq!((floor.width(), floor.depth()), (8, 8));
    assert!(floor.booth(&outside).is_none());
    assert_eq!(floor.cell(CellPos::new(7, 0)), Some(CellType::Empty));
    assert_eq!(store.find_booth_at(0, 0).map(|b| b.id.as_str()), Some(inside.as_str()));
    assert!(store.selection().is_none());
    assert_consistent(&store);
}

#[test]
fn test_update_floor_size_rejections() {
    let mut store = store_with_floor(10, 10);
    assert_eq!(
        store.update_floor_size(0, 5),
        Err(ConstraintError::FloorSize { width: 0, depth: 5 })
    );
    assert!(matches!(
        store.update_floor_size(300, 300),
        Err(ConstraintError::FloorArea { .. })
    ));
    assert_eq!(store.active_floor().unwrap().width(), 10);
}

#[test]
fn test_update_and_init_exhibition() {
    let mut store = store_with_floor(4, 4);
    store.update_exhibition(&ExhibitionPatch {
        name: Some("Autumn Expo".into()),
        ..ExhibitionPatch::default()
    });
    assert_eq!(store.exhibition().name, "Autumn Expo");
    assert!(store.undo());
    assert_eq!(store.exhibition().name, "New Exhibition");

    store.save_preview_view_preset(PreviewPresetDraft::default(), None);
    let (log, _sub) = record(&store);
    store.init_exhibition(ExhibitionDraft::named("Fresh"));
    assert_eq!(store.exhibition().name, "Fresh");
    assert!(store.floors().is_empty());
    assert!(store.preview_view_presets().is_empty());
    assert!(!store.can_undo());
    assert_eq!(*log.borrow(), vec!["exhibition-changed", "preview-views-changed"]);
}

// ---------------------------------------------------------------------------
// Cells
// ---------------------------------------------------------------------------

#[test]
fn test_set_cell_unchanged_type_is_a_noop() {
    let mut store = store_with_floor(4, 4);
    let (log, _sub) = record(&store);
    assert_eq!(store.set_cell(1, 1, CellType::Empty), Ok(false));
    assert!(!store.can_undo());
    assert!(log.borrow().is_empty());
}

#[test]
fn test_set_cell_out_of_bounds_rejected() {
    let mut store = store_with_floor(4, 4);
    let err = store.set_cell(4, 0, CellType::Corridor).unwrap_err();
    assert_eq!(err, ConstraintError::OutOfBounds { pos: CellPos::new(4, 0) });
    assert!(!store.can_undo());
}

#[test]
fn test_set_cell_protects_booth_cells() {
    let mut store = store_with_floor(4, 4);
    store.add_booth(&cells(&[(0, 0)])).unwrap();
    let depth = store.undo_history().len();
    assert_eq!(
        store.set_cell(0, 0, CellType::Corridor),
        Err(ConstraintError::BoothCellProtected { pos: CellPos::new(0, 0) })
    );
    assert_eq!(
        store.set_cell(0, 0, CellType::Empty),
        Err(ConstraintError::BoothCellProtected { pos: CellPos::new(0, 0) })
    );
    assert_eq!(store.set_cell(1, 1, CellType::Booth), Err(ConstraintError::BoothPaint));
    assert_eq!(store.undo_history().len(), depth);
    assert_consistent(&store);
}

#[test]
fn test_set_cell_escalator_links_adjacent_floor() {
    let mut store = store_with_floors(2);
    paint_on(&mut store, 0, 3, 3, CellType::Escalator);
    assert!(store.escalator_links().is_empty());

    store.set_active_floor(1).unwrap();
    let (log, _sub) = record(&store);
    store.set_cell(3, 3, CellType::Escalator).unwrap();
    assert_eq!(*log.borrow(), vec!["grid-changed", "escalator-links-changed"]);
    let link = &store.escalator_links()[0];
    assert_eq!(link.a(), Endpoint::new(0, 3, 3));
    assert_eq!(link.b(), Endpoint::new(1, 3, 3));
    assert_eq!(store.find_escalator_links_at(1, 3, 3).len(), 1);
}

#[test]
fn test_set_cell_undo_restores_link_list() {
    let mut store = store_with_floors(2);
    paint_on(&mut store, 0, 3, 3, CellType::Escalator);
    paint_on(&mut store, 1, 3, 3, CellType::Escalator);
    assert_eq!(store.escalator_links().len(), 1);

    let (log, _sub) = record(&store);
    assert!(store.undo());
    assert!(store.escalator_links().is_empty());
    assert_eq!(store.floors()[1].cell(CellPos::new(3, 3)), Some(CellType::Empty));
    assert_eq!(
        *log.borrow(),
        vec!["grid-changed", "escalator-links-changed", "booth-selected", "cell-selected"]
    );
    assert!(store.find_escalator_links_at(0, 3, 3).is_empty());
}

#[test]
fn test_retyping_escalator_drops_its_links() {
    let mut store = store_with_floors(2);
    paint_on(&mut store, 0, 3, 3, CellType::Escalator);
    paint_on(&mut store, 1, 3, 3, CellType::Escalator);
    store.set_cell(3, 3, CellType::Corridor).unwrap();
    assert!(store.escalator_links().is_empty());
    assert!(store.undo());
    assert_eq!(store.escalator_links().len(), 1);
}

#[test]
fn test_set_cells_batches_one_patch_and_skips_booths() {
    let mut store = store_with_floor(6, 6);
    store.add_booth(&cells(&[(0, 0)])).unwrap();
    let depth = store.undo_history().len();
    let (log, _sub) = record(&store);

    let changed = store
        .set_cells(&cells(&[(0, 0), (1, 0), (2, 0), (9, 9)]), CellType::Corridor)
        .unwrap();
    assert_eq!(changed, 2);
    assert_eq!(store.undo_history().len(), depth + 1);
    assert_eq!(*log.borrow(), vec!["grid-changed"]);
    assert_consistent(&store);

    assert!(store.undo());
    let floor = store.active_floor().unwrap();
    assert_eq!(floor.cell(CellPos::new(1, 0)), Some(CellType::Empty));
    assert_eq!(floor.cell(CellPos::new(0, 0)), Some(CellType::Booth));
}

#[test]
fn test_set_cells_without_change_records_nothing() {
    let mut store = store_with_floor(6, 6);
    let (log, _sub) = record(&store);
    assert_eq!(store.set_cells(&cells(&[(1, 1)]), CellType::Empty), Ok(0));
    assert!(!store.can_undo());
    assert!(log.borrow().is_empty());
}

#[test]
fn test_set_cells_has_no_escalator_side_effects() {
    let mut store = store_with_floors(2);
    paint_on(&mut store, 0, 2, 2, CellType::Escalator);
    store.set_active_floor(1).unwrap();
    store.set_cells(&cells(&[(2, 2)]), CellType::Escalator).unwrap();
    assert!(store.escalator_links().is_empty());
}

// ---------------------------------------------------------------------------
// Booths
// ---------------------------------------------------------------------------

#[test]
fn test_add_booth_indexes_lazily() {
    let mut store = store_with_floor(10, 10);
    let floor_id = store.active_floor().unwrap().id.clone();
    assert!(!store.booth_index.borrow().is_cached(&floor_id));
    store.add_booth(&cells(&[(2, 2), (2, 3)])).unwrap();
    assert!(store.booth_index.borrow().is_cached(&floor_id));
    assert_eq!(store.find_booth_at(2, 3).map(|b| b.area), Some(2));
    assert!(store.find_booth_at(3, 3).is_none());
}

#[test]
fn test_add_booth_rejections() {
    let mut store = store_with_floor(10, 10);
    store.set_cell(5, 5, CellType::Corridor).unwrap();
    let depth = store.undo_history().len();
    assert_eq!(store.add_booth(&[]).unwrap_err(), ConstraintError::EmptyBooth);
    assert_eq!(
        store.add_booth(&cells(&[(1, 1), (1, 1)])).unwrap_err(),
        ConstraintError::DuplicateCell { pos: CellPos::new(1, 1) }
    );
    assert_eq!(
        store.add_booth(&cells(&[(5, 5)])).unwrap_err(),
        ConstraintError::CellOccupied {
            pos: CellPos::new(5, 5),
            found: CellType::Corridor
        }
    );
    assert_eq!(
        store.add_booth(&cells(&[(0, 0), (2, 0)])).unwrap_err(),
        ConstraintError::NotContiguous
    );
    assert_eq!(store.undo_history().len(), depth);
    assert!(store.active_floor().unwrap().booths.is_empty());
}

#[test]
fn test_remove_booth_clears_selection_and_reindexes() {
    let mut store = store_with_floor(10, 10);
    let first = store.add_booth(&cells(&[(0, 0)])).unwrap().id.clone();
    let second = store.add_booth(&cells(&[(4, 4)])).unwrap().id.clone();
    store.select_booth(first.clone());

    let (log, _sub) = record(&store);
    let removed = store.remove_booth(&first).unwrap();
    assert_eq!(removed.id, first);
    assert!(store.selection().is_none());
    assert_eq!(*log.borrow(), vec!["booth-removed", "grid-changed"]);
    assert_eq!(store.find_booth_at(4, 4).map(|b| b.id.clone()), Some(second));
    assert_eq!(store.active_floor().unwrap().cell(CellPos::new(0, 0)), Some(CellType::Empty));
    assert_eq!(store.remove_booth(&first).unwrap_err(), ConstraintError::booth_not_found(&first));
}

#[test]
fn test_remove_booth_on_other_floor_keeps_selection() {
    let mut store = store_with_floors(2);
    store.set_active_floor(0).unwrap();
    let id = store.add_booth(&cells(&[(0, 0)])).unwrap().id.clone();
    store.set_active_floor(1).unwrap();
    store.select_booth(id.clone());
    store.remove_booth_on_floor(0, &id).unwrap();
    assert_eq!(store.selected_booth_id(), Some(id.as_str()));
    assert!(store.floors()[0].booths.is_empty());
}

#[test]
fn test_update_booth_records_patch_of_touched_fields() {
    let mut store = store_with_floor(10, 10);
    let id = store.add_booth(&cells(&[(0, 0), (1, 0)])).unwrap().id.clone();
    let depth = store.undo_history().len();

    let patch = BoothPatch::default()
        .with_brand_name("  Acme  ")
        .with_price_per_unit(100.0);
    let booth = store.update_booth(&id, &patch).unwrap();
    assert_eq!(booth.brand_name, "Acme");
    assert!((booth.total_price - 200.0).abs() < f64::EPSILON);
    assert_eq!(store.undo_history().len(), depth + 1);
    assert_eq!(store.undo_history().next_description(), Some("edit booth"));

    assert!(store.undo());
    let booth = store.active_floor().unwrap().booth(&id).unwrap();
    assert_eq!(booth.brand_name, "");
    assert!(booth.total_price.abs() < f64::EPSILON);
}

#[test]
fn test_update_booth_with_empty_patch_records_nothing() {
    let mut store = store_with_floor(10, 10);
    let id = store.add_booth(&cells(&[(0, 0)])).unwrap().id.clone();
    let depth = store.undo_history().len();
    let (log, _sub) = record(&store);
    store.update_booth(&id, &BoothPatch::default()).unwrap();
    assert_eq!(store.undo_history().len(), depth);
    assert!(log.borrow().is_empty());
}

#[test]
fn test_move_booth_may_overlap_its_own_cells() {
    let mut store = store_with_floor(10, 10);
    let id = store.add_booth(&cells(&[(0, 0), (1, 0), (2, 0)])).unwrap().id.clone();
    let (log, _sub) = record(&store);
    store.move_booth(&id, 1, 0).unwrap();
    assert_eq!(*log.borrow(), vec!["booth-updated", "grid-changed"]);
    let floor = store.active_floor().unwrap();
    assert_eq!(floor.cell(CellPos::new(0, 0)), Some(CellType::Empty));
    assert_eq!(floor.cell(CellPos::new(3, 0)), Some(CellType::Booth));
    assert!(store.find_booth_at(0, 0).is_none());
    assert_eq!(store.find_booth_at(3, 0).map(|b| b.id.clone()), Some(id));
    assert_consistent(&store);
}

#[test]
fn test_move_booth_rejections_change_nothing() {
    let mut store = store_with_floor(5, 5);
    let id = store.add_booth(&cells(&[(0, 0)])).unwrap().id.clone();
    store.set_cell(1, 0, CellType::Corridor).unwrap();
    let before = store.exhibition().clone();
    assert!(matches!(store.move_booth(&id, 1, 0), Err(ConstraintError::CellOccupied { .. })));
    assert!(matches!(store.move_booth(&id, -1, 0), Err(ConstraintError::OutOfBounds { .. })));
    assert_eq!(store.move_booth(&id, 0, 0), Err(ConstraintError::ZeroOffset));
    assert_eq!(store.exhibition(), &before);
}

#[test]
fn test_find_booth_after_snapshot_undo() {
    let mut store = store_with_floor(10, 10);
    let id = store.add_booth(&cells(&[(0, 0)])).unwrap().id.clone();
    store.move_booth(&id, 2, 2).unwrap();
    assert!(store.undo());
    assert_eq!(store.find_booth_at(0, 0).map(|b| b.id.clone()), Some(id));
    assert!(store.find_booth_at(2, 2).is_none());
}

#[test]
fn test_booth_ids_survive_undo() {
    let mut store = store_with_floor(10, 10);
    store.add_booth(&cells(&[(0, 0)])).unwrap();
    store.add_booth(&cells(&[(2, 0)])).unwrap();
    assert!(store.undo());
    let next = store.add_booth(&cells(&[(4, 0)])).unwrap();
    assert_eq!(next.id, "L003");
}

// ---------------------------------------------------------------------------
// Drawing and templates
// ---------------------------------------------------------------------------

#[test]
fn test_drawing_rect_and_commit() {
    let mut store = store_with_floor(6, 6);
    store.set_cell(1, 1, CellType::Corridor).unwrap();
    assert_eq!(store.add_drawing_rect(-3, -3, 1, 1), Ok(3));
    assert_eq!(store.add_drawing_rect(0, 0, 1, 1), Ok(0));
    assert!(matches!(
        store.toggle_drawing_cell(1, 1),
        Err(ConstraintError::CellOccupied { .. })
    ));
    store.toggle_drawing_cell(0, 1).unwrap();
    assert_eq!(store.drawing_cells().len(), 2);

    let booth = store.commit_drawing().unwrap();
    assert_eq!(booth.area, 2);
    assert!(store.drawing_cells().is_empty());
}

#[test]
fn test_failed_commit_keeps_drawing() {
    let mut store = store_with_floor(6, 6);
    store.toggle_drawing_cell(0, 0).unwrap();
    store.toggle_drawing_cell(3, 3).unwrap();
    assert_eq!(store.commit_drawing().unwrap_err(), ConstraintError::NotContiguous);
    assert_eq!(store.drawing_cells().len(), 2);
}

#[test]
fn test_set_edit_tool_discards_drawing() {
    let mut store = store_with_floor(6, 6);
    store.toggle_drawing_cell(0, 0).unwrap();
    let (log, _sub) = record(&store);
    store.set_edit_tool(EditTool::BoothTemplate);
    assert!(store.drawing_cells().is_empty());
    assert_eq!(store.session().edit_tool, EditTool::BoothTemplate);
    assert_eq!(*log.borrow(), vec!["tool-changed"]);
}

#[test]
fn test_place_booth_template() {
    let mut store = store_with_floor(10, 10);
    assert_eq!(store.place_booth_template(0, 0).unwrap().area, 9);
    store.set_booth_template(2, 1).unwrap();
    assert_eq!(store.place_booth_template(5, 5).unwrap().area, 2);
    assert!(matches!(
        store.place_booth_template(9, 0),
        Err(ConstraintError::OutOfBounds { .. })
    ));
}

#[test]
fn test_booth_template_size_is_bounded() {
    let mut store = store_with_floor(10, 10);
    assert!(matches!(
        store.set_booth_template(200_000, 200_000),
        Err(ConstraintError::TemplateSize { max: 30_000, .. })
    ));
    assert!(store.set_booth_template(0, 3).is_err());
    assert!(store.last_constraint_error().contains("30000"));
    assert_eq!(store.session().booth_template, BoothTemplate { w: 3, h: 3 });

    // Within the area cap but wider than the floor.
    store.set_booth_template(100, 1).unwrap();
    let before = store.exhibition().clone();
    assert_eq!(
        store.place_booth_template(0, 0).unwrap_err(),
        ConstraintError::OutOfBounds { pos: CellPos::new(99, 0) }
    );
    assert_eq!(store.exhibition(), &before);
}

#[test]
fn test_oversized_configured_template_is_refused() {
    let config = StoreConfig::default()
        .with_default_booth_template(BoothTemplate { w: 200_000, h: 200_000 });
    let mut store = Store::new(config);
    store.add_floor(FloorDraft::sized(10, 10)).unwrap();
    assert!(matches!(
        store.place_booth_template(0, 0),
        Err(ConstraintError::OutOfBounds { .. })
    ));
    assert!(store.active_floor().unwrap().booths.is_empty());
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

#[test]
fn test_selection_setters_are_exclusive() {
    let mut store = store_with_floor(6, 6);
    store.set_cells(&cells(&[(1, 1), (1, 2)]), CellType::Corridor).unwrap();
    let (log, _sub) = record(&store);

    store.select_booth("L001");
    store.select_cell(1, 1, CellType::Corridor);
    assert!(store.selected_booth_id().is_none());
    assert_eq!(store.selected_cell().map(|s| s.cells.len()), Some(2));
    store.clear_selection();
    assert!(store.selection().is_none());
    assert_eq!(
        *log.borrow(),
        vec![
            "booth-selected",
            "cell-selected",
            "cell-selected",
            "booth-selected",
            "booth-selected",
            "cell-selected"
        ]
    );
}

#[test]
fn test_selected_booth_resolves_on_active_floor() {
    let mut store = store_with_floor(6, 6);
    let id = store.add_booth(&cells(&[(0, 0)])).unwrap().id.clone();
    store.select_booth(id.clone());
    assert_eq!(store.selected_booth().map(|b| b.id.clone()), Some(id));
    store.select_booth("Z999");
    assert!(store.selected_booth().is_none());
}

#[test]
fn test_selected_region_refreshes_when_stale() {
    let mut store = store_with_floor(6, 6);
    store.set_cells(&cells(&[(1, 1), (1, 2)]), CellType::Corridor).unwrap();
    store.select_cell(1, 1, CellType::Corridor);
    store.set_cell(1, 2, CellType::Empty).unwrap();
    assert_eq!(store.selected_cell_group_cells(), cells(&[(1, 1)]));
    assert_eq!(store.selected_cell().map(|s| s.cells.clone()), Some(cells(&[(1, 1)])));
}

#[test]
fn test_non_movable_selection_has_no_region() {
    let mut store = store_with_floor(6, 6);
    store.select_cell(0, 0, CellType::Empty);
    assert!(store.selected_cell_group_cells().is_empty());
    assert_eq!(
        store.move_selected_cell_group(1, 0),
        Err(ConstraintError::NoCellSelection)
    );
}

#[test]
fn test_move_selected_region() {
    let mut store = store_with_floor(6, 6);
    store.set_cells(&cells(&[(1, 1), (1, 2)]), CellType::Restricted).unwrap();
    store.select_cell(1, 1, CellType::Restricted);
    store.move_selected_cell_group(0, 1).unwrap();
    let floor = store.active_floor().unwrap();
    assert_eq!(floor.cell(CellPos::new(1, 1)), Some(CellType::Empty));
    assert_eq!(floor.cell(CellPos::new(1, 3)), Some(CellType::Restricted));
    let selected = store.selected_cell().unwrap();
    assert_eq!(selected.anchor(), CellPos::new(1, 2));
    let mut moved = selected.cells.clone();
    moved.sort_unstable();
    assert_eq!(moved, cells(&[(1, 2), (1, 3)]));
}

#[test]
fn test_move_selected_escalator_carries_links() {
    let mut store = store_with_floors(2);
    paint_on(&mut store, 0, 2, 2, CellType::Escalator);
    paint_on(&mut store, 1, 2, 2, CellType::Escalator);
    store.select_cell(2, 2, CellType::Escalator);
    store.move_selected_cell_group(1, 0).unwrap();
    let link = &store.escalator_links()[0];
    assert_eq!(link.a(), Endpoint::new(0, 2, 2));
    assert_eq!(link.b(), Endpoint::new(1, 3, 2));
    assert_eq!(store.find_escalator_links_at(1, 3, 2).len(), 1);
}

#[test]
fn test_delete_selected_escalator_drops_links() {
    let mut store = store_with_floors(2);
    paint_on(&mut store, 0, 2, 2, CellType::Escalator);
    paint_on(&mut store, 1, 2, 2, CellType::Escalator);
    store.select_cell(2, 2, CellType::Escalator);
    let (log, _sub) = record(&store);
    assert_eq!(store.delete_selected_cell(), Ok(1));
    assert!(store.escalator_links().is_empty());
    assert!(store.selection().is_none());
    assert_eq!(
        *log.borrow(),
        vec!["escalator-links-changed", "grid-changed", "cell-selected"]
    );
    assert!(store.undo());
    assert_eq!(store.escalator_links().len(), 1);
}

#[test]
fn test_undo_of_selected_led_screen_reselects_it() {
    let mut store = store_with_floor(6, 6);
    store.set_cell(2, 2, CellType::LedScreen).unwrap();
    store.set_cell(2, 2, CellType::Corridor).unwrap();
    store.select_cell(2, 2, CellType::Corridor);
    assert!(store.undo());
    assert_eq!(store.selected_cell().map(|s| s.cell_type), Some(CellType::LedScreen));
    assert!(store.undo());
    assert!(store.selection().is_none());
}

// ---------------------------------------------------------------------------
// Escalators
// ---------------------------------------------------------------------------

#[test]
fn test_add_escalator_link_rules() {
    let mut store = store_with_floors(3);
    paint_on(&mut store, 0, 1, 1, CellType::Escalator);
    paint_on(&mut store, 2, 1, 1, CellType::Escalator);
    assert_eq!(
        store
            .add_escalator_link(Endpoint::new(0, 1, 1), Endpoint::new(2, 1, 1))
            .unwrap_err(),
        ConstraintError::NonAdjacentFloors { floor_a: 0, floor_b: 2 }
    );
    assert!(matches!(
        store.add_escalator_link(Endpoint::new(0, 1, 1), Endpoint::new(1, 1, 1)),
        Err(ConstraintError::NotEscalator { floor: 1, .. })
    ));

    paint_on(&mut store, 1, 4, 4, CellType::Escalator);
    let link = store
        .add_escalator_link(Endpoint::new(1, 4, 4), Endpoint::new(0, 1, 1))
        .unwrap();
    assert_eq!((link.floor_a, link.floor_b), (0, 1));
    assert_eq!(
        store
            .add_escalator_link(Endpoint::new(0, 1, 1), Endpoint::new(1, 4, 4))
            .unwrap_err(),
        ConstraintError::DuplicateLink
    );
}

#[test]
fn test_remove_escalator_link() {
    let mut store = store_with_floors(2);
    paint_on(&mut store, 0, 1, 1, CellType::Escalator);
    paint_on(&mut store, 1, 1, 1, CellType::Escalator);
    let id = store.escalator_links()[0].id.clone();
    assert_eq!(store.remove_escalator_link(&id).map(|l| l.id), Ok(id.clone()));
    assert_eq!(
        store.remove_escalator_link(&id).unwrap_err(),
        ConstraintError::link_not_found(&id)
    );
}

#[test]
fn test_move_escalator_endpoint_rules() {
    let mut store = store_with_floors(2);
    paint_on(&mut store, 0, 2, 2, CellType::Escalator);
    paint_on(&mut store, 1, 2, 2, CellType::Escalator);
    paint_on(&mut store, 1, 5, 5, CellType::Escalator);
    let id = store.escalator_links()[0].id.clone();

    store.move_escalator_endpoint(&id, 1, 5, 5).unwrap();
    assert_eq!(store.escalator_links()[0].b(), Endpoint::new(1, 5, 5));
    assert!(matches!(
        store.move_escalator_endpoint(&id, 1, 6, 6),
        Err(ConstraintError::NotEscalator { .. })
    ));
    assert!(matches!(
        store.move_escalator_endpoint(&id, 1, 60, 6),
        Err(ConstraintError::OutOfBounds { .. })
    ));
    assert_eq!(
        store.move_escalator_endpoint(&id, 3, 5, 5).unwrap_err(),
        ConstraintError::LinkFloorMismatch { id: id.clone(), floor: 3 }
    );
}

#[test]
fn test_move_escalator_cell_follows_selection() {
    let mut store = store_with_floors(2);
    paint_on(&mut store, 0, 2, 2, CellType::Escalator);
    paint_on(&mut store, 1, 2, 2, CellType::Escalator);
    store.select_cell(2, 2, CellType::Escalator);

    store.move_escalator_cell_group(1, 2, 2, 4, 4).unwrap();
    assert_eq!(store.escalator_links()[0].b(), Endpoint::new(1, 4, 4));
    assert_eq!(store.selected_cell().map(|s| s.anchor()), Some(CellPos::new(4, 4)));
    assert_eq!(store.selected_cell_group_cells(), cells(&[(4, 4)]));
    let floor = &store.floors()[1];
    assert_eq!(floor.cell(CellPos::new(2, 2)), Some(CellType::Empty));
    assert_eq!(floor.cell(CellPos::new(4, 4)), Some(CellType::Escalator));
}

#[test]
fn test_auto_detect_and_remove_for_cell() {
    let mut store = store_with_floors(3);
    store.set_active_floor(0).unwrap();
    store.set_cells(&cells(&[(1, 1)]), CellType::Escalator).unwrap();
    store.set_active_floor(2).unwrap();
    store.set_cells(&cells(&[(1, 1)]), CellType::Escalator).unwrap();
    store.set_active_floor(1).unwrap();
    store.set_cells(&cells(&[(1, 1)]), CellType::Escalator).unwrap();
    assert!(store.escalator_links().is_empty());

    assert_eq!(store.auto_detect_escalator_link(1, 1, 1), Ok(2));
    assert_eq!(store.auto_detect_escalator_link(1, 1, 1), Ok(0));
    assert!(matches!(
        store.auto_detect_escalator_link(1, 0, 0),
        Err(ConstraintError::NotEscalator { .. })
    ));
    assert_eq!(store.remove_escalator_links_for_cell(1, 1, 1), 2);
    assert_eq!(store.remove_escalator_links_for_cell(1, 1, 1), 0);
}

#[test]
fn test_sanitize_repairs_and_is_idempotent() {
    let mut store = store_with_floors(3);
    paint_on(&mut store, 0, 1, 1, CellType::Escalator);
    paint_on(&mut store, 1, 1, 1, CellType::Escalator);
    assert_eq!(store.escalator_links().len(), 1);

    let reversed = EscalatorLink {
        id: "rev".into(),
        floor_a: 1,
        x_a: 1,
        z_a: 1,
        floor_b: 0,
        x_b: 1,
        z_b: 1,
    };
    let mut skip = reversed.clone();
    skip.id = "skip".into();
    skip.floor_b = 2;
    let mut dead = reversed.clone();
    dead.id = "dead".into();
    dead.x_b = 5;
    store.exhibition.escalator_links.extend([reversed, skip, dead]);

    let (log, _sub) = record(&store);
    assert_eq!(store.sanitize_escalator_links(), 3);
    assert_eq!(store.sanitize_escalator_links(), 0);
    assert_eq!(store.escalator_links().len(), 1);
    assert_eq!(*log.borrow(), vec!["escalator-links-changed"]);
}

// ---------------------------------------------------------------------------
// Undo
// ---------------------------------------------------------------------------

#[test]
fn test_undo_on_empty_history() {
    let mut store = Store::default();
    assert!(!store.undo());
}

#[test]
fn test_snapshot_undo_restores_editor_fields_and_emits_battery() {
    let mut store = store_with_floor(6, 6);
    store.set_edit_mode(EditMode::Preview);
    store.set_view_filter(ViewFilter::BoothSold);
    store.add_booth(&cells(&[(0, 0)])).unwrap();
    store.set_edit_mode(EditMode::Edit);
    store.set_view_filter(ViewFilter::All);

    let (log, _sub) = record(&store);
    assert!(store.undo());
    assert_eq!(store.session().edit_mode, EditMode::Preview);
    assert_eq!(store.session().view_filter, ViewFilter::BoothSold);
    assert!(store.active_floor().unwrap().booths.is_empty());
    assert_eq!(
        *log.borrow(),
        vec![
            "exhibition-changed",
            "active-floor-changed",
            "floor-changed",
            "grid-changed",
            "escalator-links-changed",
            "booth-selected",
            "cell-selected",
            "tool-changed",
            "view-filter-changed",
            "edit-mode-changed"
        ]
    );
}

#[test]
fn test_undo_never_records_history() {
    let mut store = store_with_floors(2);
    paint_on(&mut store, 0, 1, 1, CellType::Escalator);
    paint_on(&mut store, 1, 1, 1, CellType::Escalator);
    let depth = store.undo_history().len();
    assert!(store.undo());
    assert_eq!(store.undo_history().len(), depth - 1);
}

#[test]
fn test_undo_limit_drops_oldest() {
    let mut store = Store::new(StoreConfig::default().with_undo_limit(2));
    store.add_floor(FloorDraft::sized(5, 5)).unwrap();
    for x in 0..3 {
        store.set_cell(x, 0, CellType::Corridor).unwrap();
    }
    assert_eq!(store.undo_history().len(), 2);
    assert!(store.undo());
    assert!(store.undo());
    assert!(!store.undo());
    assert_eq!(store.active_floor().unwrap().cell(CellPos::new(0, 0)), Some(CellType::Corridor));
}

#[test]
fn test_patch_for_removed_floor_is_consumed() {
    let mut store = store_with_floors(2);
    store.set_cell(0, 0, CellType::Corridor).unwrap();
    let floor_id = store.floors()[1].id.clone();
    store.exhibition.floors.retain(|f| f.id != floor_id);
    store.active_floor = 0;
    assert!(!store.undo());
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[test]
fn test_preview_presets() {
    let mut store = Store::default();
    let (log, _sub) = record(&store);
    let first = store.save_preview_view_preset(PreviewPresetDraft::default(), None);
    for _ in 0..3 {
        store.save_preview_view_preset(PreviewPresetDraft::default(), None);
    }
    assert_eq!(store.preview_view_presets().len(), 3);
    assert!(store.preview_view_presets().iter().all(|p| p.id != first));
    assert!(!store.set_active_preview_view_preset(Some(&first)));
    assert!(store.set_active_preview_view_preset(None));
    assert!(store.active_preview_view_preset_id().is_none());
    let last = store.preview_view_presets()[2].id.clone();
    assert!(store.remove_preview_view_preset(&last));
    assert!(!store.remove_preview_view_preset(&last));
    assert_eq!(log.borrow().len(), 6);
    assert!(log.borrow().iter().all(|k| *k == "preview-views-changed"));
}

#[test]
fn test_snapshot_naming_and_toggles() {
    let mut store = Store::default();
    assert_eq!(store.default_snapshot_name(), "expoGrid001");
    let (log, _sub) = record(&store);
    assert_eq!(store.mark_snapshot_saved(), 2);
    assert_eq!(store.default_snapshot_name(), "expoGrid002");
    store.set_show_floor_annotations(false);
    assert!(!store.session().show_floor_annotations);
    assert_eq!(*log.borrow(), vec!["snapshot-seq-changed", "floor-annotations-changed"]);
}

#[test]
fn test_events_carry_post_change_state() {
    let mut store = store_with_floor(6, 6);
    let seen = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&seen);
    let _sub = store.subscribe(move |event| {
        if let StoreEvent::GridChanged(change) = event {
            *sink.borrow_mut() = change
                .cell
                .map(|c| (c.x, c.z, c.cell_type, change.floor.cell(CellPos::new(c.x, c.z))));
        }
    });
    store.set_cell(2, 3, CellType::Entrance).unwrap();
    assert_eq!(
        *seen.borrow(),
        Some((2, 3, CellType::Entrance, Some(CellType::Entrance)))
    );
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

#[test]
fn test_serialize_restore_round_trip() {
    let mut source = store_with_floors(2);
    source.add_booth(&cells(&[(0, 0), (0, 1)])).unwrap();
    paint_on(&mut source, 0, 4, 4, CellType::Escalator);
    paint_on(&mut source, 1, 4, 4, CellType::Escalator);
    source.mark_snapshot_saved();
    let state = source.serialize();
    let json = state.to_json().unwrap();

    let mut target = Store::default();
    let (log, _sub) = record(&target);
    target.restore(crate::persist::EditorState::from_json(&json).unwrap());
    assert_eq!(target.exhibition(), source.exhibition());
    assert_eq!(target.active_floor_index(), 1);
    assert_eq!(target.default_snapshot_name(), "expoGrid002");
    assert!(!target.can_undo());
    assert_eq!(
        *log.borrow(),
        vec![
            "exhibition-changed",
            "active-floor-changed",
            "floor-annotations-changed",
            "preview-views-changed",
            "snapshot-seq-changed"
        ]
    );
    let next = target.add_booth(&cells(&[(9, 9)])).unwrap();
    assert_eq!(next.id, "L002");
}

#[test]
fn test_restore_clamps_and_clears() {
    let mut store = store_with_floor(4, 4);
    let mut state = store.serialize();
    state.active_floor_index = 7;
    state.snapshot_name_seq = 0;
    store.select_booth("L001");
    store.restore(state);
    assert_eq!(store.active_floor_index(), 0);
    assert_eq!(store.session().snapshot_name_seq, 1);
    assert_eq!(store.selection(), &Selection::None);
}

#[test]
#[should_panic(expected = "corrupt editor state")]
fn test_restore_panics_on_corrupt_state() {
    let mut store = store_with_floor(4, 4);
    let mut state = store.serialize();
    state.exhibition.floors[0].grid.set(CellPos::new(0, 0), CellType::Booth);
    store.restore(state);
}

#[test]
#[should_panic(expected = "inconsistent floors")]
fn test_init_exhibition_panics_on_repeated_floor_ids() {
    let mut store = Store::default();
    let floor = |label: &str| {
        expogrid_model::Floor::new(FloorDraft {
            id: Some("same".into()),
            ..FloorDraft::sized(3, 3).with_label(label)
        })
    };
    store.init_exhibition(ExhibitionDraft {
        floors: vec![floor("L1"), floor("L2")],
        ..ExhibitionDraft::named("Twins")
    });
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[test]
fn test_accepted_and_rejected_mutations_are_logged() {
    let logs = capture_logs(|| {
        let mut store = store_with_floor(4, 4);
        store.set_cell(0, 0, CellType::Corridor).unwrap();
        let _ = store.set_cell(9, 9, CellType::Corridor);
    });
    assert!(logs.iter().any(|l| l == "DEBUG store.add_floor"), "{logs:?}");
    assert!(logs.iter().any(|l| l == "DEBUG store.set_cell"), "{logs:?}");
    assert!(logs.iter().any(|l| l == "DEBUG store.rejected"), "{logs:?}");
}

#[test]
fn test_link_drift_and_whole_tree_replacement_are_logged() {
    let logs = capture_logs(|| {
        let mut store = store_with_floors(2);
        store.exhibition.escalator_links.push(EscalatorLink::new(
            Endpoint::new(0, 0, 0),
            Endpoint::new(1, 0, 0),
        ));
        store.sanitize_escalator_links();
        store.init_exhibition(ExhibitionDraft::default());
    });
    assert!(logs.iter().any(|l| l == "WARN store.sanitize_links"), "{logs:?}");
    assert!(logs.iter().any(|l| l == "INFO store.init_exhibition"), "{logs:?}");
}
