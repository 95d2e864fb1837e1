#![allow(clippy::float_cmp)]

use super::*;
use crate::doc::{Bounds, Cell, ChildNode, PropertyTree};
use crate::headless::HeadlessSurface;
use crate::memory_store::MemoryStore;
use crate::sync::synthetic_panel;

// =============================================================
// Helpers
// =============================================================

struct Fixture {
    store: Arc<MemoryStore>,
    surface: Arc<HeadlessSurface>,
    editor: SheetEditor,
}

fn tree() -> PropertyTree {
    let mut cells = vec![
        Cell { col: Some(0), row: Some(0), colspan: Some(4), rowspan: Some(4), ..Cell::new("a", Bounds::new(50.0, 50.0, 10.0, 10.0)) },
        Cell::new("b", Bounds::new(0.0, 0.0, 20.0, 20.0)),
        Cell::new("c", Bounds::new(20.0, 30.0, 10.0, 10.0)),
        Cell::new("d", Bounds::new(10.0, 20.0, 30.0, 40.0)),
    ];
    let mut children: Vec<ChildNode> = cells.iter().map(|c| ChildNode::new(c.name.clone(), "chart")).collect();
    let (panel_cell, panel_child) = synthetic_panel("panel", "sheet-editor");
    cells.push(panel_cell);
    children.push(panel_child);
    PropertyTree::new(SheetProperties::new(cells), children)
}

async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}

async fn fixture(mode: &str) -> Fixture {
    let store = Arc::new(MemoryStore::new(tree()));
    let surface = Arc::new(HeadlessSurface::new(Rect::new(0.0, 0.0, 1000.0, 800.0)));
    for (i, id) in ["a", "b", "c", "d", "panel"].iter().enumerate() {
        let offset = 120.0 * i as f64;
        surface.add_element(id, Rect::new(offset, 100.0, 100.0, 80.0));
    }
    let editor = SheetEditor::start(
        Arc::clone(&store) as Arc<dyn DocumentStore>,
        Arc::clone(&surface) as Arc<dyn Surface>,
        mode,
        EditorConfig::default(),
    );
    settle().await;
    Fixture { store, surface, editor }
}

fn names(props: &SheetProperties) -> Vec<&str> {
    props.cells.iter().map(|c| c.name.as_str()).collect()
}

fn ids(list: &[&str]) -> Vec<ObjectId> {
    list.iter().map(|s| (*s).to_string()).collect()
}

fn no_modifiers() -> Modifiers {
    Modifiers::default()
}

// =============================================================
// Startup
// =============================================================

#[tokio::test]
async fn start_fetches_and_builds_registry() {
    let f = fixture("edit").await;
    assert!(f.editor.is_edit_mode());
    assert_eq!(f.store.calls().get_properties, 1);
    assert_eq!(f.editor.objects().len(), 5);
    assert_eq!(f.surface.z_index("a"), Some(1));
    assert_eq!(f.surface.z_index("panel"), Some(5));
    assert!(f.editor.objects()[4].is_synthetic());
    let grid = f.editor.grid().unwrap();
    assert_eq!((grid.width(), grid.height()), (996.0, 796.0));
}

#[tokio::test]
async fn only_exact_edit_opens_the_gate() {
    assert!(!fixture("Edit").await.editor.is_edit_mode());
    assert!(!fixture("analysis").await.editor.is_edit_mode());
}

// =============================================================
// Edit-mode gate
// =============================================================

#[tokio::test]
async fn closed_gate_produces_no_writes() {
    let mut f = fixture("analysis").await;
    let node = f.surface.node_in("c").unwrap();

    assert!(f.editor.on_click(node, no_modifiers()).is_empty());
    f.editor.on_pointer_down(node, Point::new(130.0, 110.0));
    assert!(f.editor.on_pointer_move(Point::new(180.0, 110.0)).is_empty());
    f.editor.on_pointer_up(no_modifiers()).await.unwrap();
    f.editor.on_handle_down("d", ResizeAnchor::Nw, Point::new(360.0, 100.0));
    f.editor.on_pointer_move(Point::new(380.0, 110.0));
    f.editor.on_pointer_up(no_modifiers()).await.unwrap();
    f.editor.on_key_down("ArrowLeft", no_modifiers()).await.unwrap();
    f.editor.on_key_down("Delete", no_modifiers()).await.unwrap();

    let calls = f.store.calls();
    assert_eq!(calls.set_properties, 0);
    assert_eq!(calls.set_full_property_tree, 0);
    assert!(f.editor.selection().is_empty());
    assert!(f.surface.previews().is_empty());
}

#[tokio::test]
async fn toggling_mode_refetches() {
    let mut f = fixture("analysis").await;
    let actions = f.editor.set_mode("edit");
    assert_eq!(actions, vec![Action::EditModeChanged(true)]);
    settle().await;
    assert_eq!(f.store.calls().get_properties, 2);

    assert!(f.editor.set_edit_mode(true).is_empty());
    settle().await;
    assert_eq!(f.store.calls().get_properties, 2);
}

#[tokio::test]
async fn closing_gate_mid_drag_cancels_without_commit() {
    let mut f = fixture("edit").await;
    let node = f.surface.node_in("c").unwrap();
    f.editor.on_pointer_down(node, Point::new(250.0, 110.0));
    f.editor.on_pointer_move(Point::new(300.0, 110.0));
    assert_eq!(f.surface.previews().len(), 1);

    let actions = f.editor.set_edit_mode(false);
    assert_eq!(actions, vec![Action::EditModeChanged(false), Action::GestureCancelled { id: "c".into() }]);
    assert!(f.editor.input().is_idle());
    assert!(f.surface.previews().is_empty());
    assert_eq!(f.surface.active_captures(), 0);

    assert!(f.editor.on_pointer_up(no_modifiers()).await.unwrap().is_empty());
    assert_eq!(f.store.calls().set_properties, 0);
}

// =============================================================
// Selection
// =============================================================

#[tokio::test]
async fn click_scenario_and_markers() {
    let mut f = fixture("edit").await;
    let a = f.surface.node_in("a").unwrap();
    let b = f.surface.node_in("b").unwrap();

    assert_eq!(f.editor.on_click(a, no_modifiers()), vec![Action::SelectionChanged(ids(&["a"]))]);
    assert_eq!(f.editor.on_click(b, Modifiers::shift()), vec![Action::SelectionChanged(ids(&["a", "b"]))]);
    assert_eq!(f.editor.on_click(a, Modifiers::shift()), vec![Action::SelectionChanged(ids(&["b"]))]);
    settle().await;
    assert!(!f.surface.is_selected("a"));
    assert!(f.surface.is_selected("b"));

    assert!(f.editor.on_click(f.surface.background_node(), Modifiers::shift()).is_empty());
    f.editor.on_click(f.surface.background_node(), no_modifiers());
    assert!(f.editor.selection().is_empty());
}

// =============================================================
// Drag
// =============================================================

#[tokio::test]
async fn drag_scenario_moves_and_restacks() {
    let mut f = fixture("edit").await;
    let node = f.surface.node_in("c").unwrap();

    assert!(f.editor.on_pointer_down(node, Point::new(250.0, 110.0)).is_empty());
    assert_eq!(f.surface.active_captures(), 1);
    let first = f.editor.on_pointer_move(Point::new(270.0, 110.0));
    assert_eq!(first, vec![Action::PreviewShown(Rect::new(260.0, 100.0, 100.0, 80.0))]);
    let second = f.editor.on_pointer_move(Point::new(300.0, 110.0));
    assert_eq!(second, vec![Action::PreviewMoved(Rect::new(290.0, 100.0, 100.0, 80.0))]);

    let actions = f.editor.on_pointer_up(no_modifiers()).await.unwrap();
    assert_eq!(
        actions,
        vec![Action::SelectionChanged(ids(&["c"])), Action::PropertiesPushed { id: "c".into() }]
    );
    assert!(f.surface.previews().is_empty());
    assert_eq!(f.surface.active_captures(), 0);

    let snap = f.store.snapshot();
    assert_eq!(names(&snap.property), ["a", "b", "d", "panel", "c"]);
    let c = snap.property.cell("c").unwrap();
    assert!((c.bounds.x - (20.0 + 50.0 / 996.0 * 100.0)).abs() < 1e-9);
    assert_eq!(c.bounds.y, 30.0);

    // Optimistic: the pushed value is already the latest.
    assert_eq!(f.editor.latest_properties().map(|p| p.cells[4].name.clone()), Some("c".into()));
}

#[tokio::test]
async fn press_and_release_without_move_does_not_commit() {
    let mut f = fixture("edit").await;
    let node = f.surface.node_in("c").unwrap();
    f.editor.on_pointer_down(node, Point::new(250.0, 110.0));
    assert!(f.editor.on_pointer_up(no_modifiers()).await.unwrap().is_empty());
    assert_eq!(f.store.calls().set_properties, 0);
    assert!(f.editor.selection().is_empty());
    assert_eq!(f.surface.active_captures(), 0);
}

#[tokio::test]
async fn synthetic_panel_cannot_be_dragged() {
    let mut f = fixture("edit").await;
    let node = f.surface.node_in("panel").unwrap();
    f.editor.on_pointer_down(node, Point::new(490.0, 110.0));
    assert!(f.editor.input().is_idle());
    assert!(f.editor.on_pointer_move(Point::new(500.0, 110.0)).is_empty());
}

#[tokio::test]
async fn drag_with_shift_adds_to_selection() {
    let mut f = fixture("edit").await;
    f.editor.on_click(f.surface.node_in("a").unwrap(), no_modifiers());
    f.editor.on_pointer_down(f.surface.node_in("c").unwrap(), Point::new(250.0, 110.0));
    f.editor.on_pointer_move(Point::new(251.0, 111.0));
    f.editor.on_pointer_up(Modifiers::shift()).await.unwrap();
    assert_eq!(f.editor.selection().ids(), ["a".to_string(), "c".to_string()]);
}

#[tokio::test]
async fn failed_push_leaves_editor_idle() {
    let mut f = fixture("edit").await;
    f.store.fail_writes(true);
    f.editor.on_pointer_down(f.surface.node_in("c").unwrap(), Point::new(250.0, 110.0));
    f.editor.on_pointer_move(Point::new(300.0, 110.0));

    let err = f.editor.on_pointer_up(no_modifiers()).await.unwrap_err();
    assert_eq!(err.error_code(), "E_STORE_REJECTED");
    assert!(f.editor.input().is_idle());
    assert!(f.surface.previews().is_empty());
    assert_eq!(f.surface.active_captures(), 0);
    assert_eq!(f.editor.latest_properties().map(|p| names(&p).join(",")), Some("a,b,c,d,panel".into()));
    assert!(f.editor.selection().is_empty());
}

#[tokio::test]
async fn failed_push_keeps_existing_selection() {
    let mut f = fixture("edit").await;
    f.editor.on_click(f.surface.node_in("a").unwrap(), no_modifiers());
    f.store.fail_writes(true);
    f.editor.on_pointer_down(f.surface.node_in("c").unwrap(), Point::new(250.0, 110.0));
    f.editor.on_pointer_move(Point::new(300.0, 110.0));

    assert!(f.editor.on_pointer_up(no_modifiers()).await.is_err());
    assert_eq!(f.editor.selection().ids(), ids(&["a"]).as_slice());
}

#[tokio::test]
async fn gestures_wait_for_a_usable_grid() {
    let mut f = fixture("edit").await;
    f.surface.set_container(Rect::new(0.0, 0.0, 4.0, 4.0));
    f.editor.on_surface_resized();
    assert!(f.editor.grid().is_none());

    f.editor.on_pointer_down(f.surface.node_in("c").unwrap(), Point::new(250.0, 110.0));
    assert!(f.editor.input().is_idle());
    f.editor.on_key_down("ArrowLeft", no_modifiers()).await.unwrap();
    assert_eq!(f.store.calls().set_properties, 0);
}

// =============================================================
// Resize
// =============================================================

#[tokio::test]
async fn resize_scenario_top_left() {
    let mut f = fixture("edit").await;
    f.editor.on_handle_down("d", ResizeAnchor::Nw, Point::new(360.0, 100.0));
    let shown = f.editor.on_pointer_move(Point::new(380.0, 110.0));
    assert_eq!(shown, vec![Action::PreviewShown(Rect::new(380.0, 110.0, 80.0, 70.0))]);

    let actions = f.editor.on_pointer_up(no_modifiers()).await.unwrap();
    assert_eq!(actions, vec![Action::PropertiesPushed { id: "d".into() }]);

    let snap = f.store.snapshot();
    assert_eq!(names(&snap.property), ["a", "b", "c", "d", "panel"]);
    let d = snap.property.cell("d").unwrap().bounds;
    assert!((d.x - (10.0 + 20.0 / 996.0 * 100.0)).abs() < 1e-9);
    assert!((d.y - (20.0 + 10.0 / 796.0 * 100.0)).abs() < 1e-9);
    assert!((d.width - (30.0 - 20.0 / 996.0 * 100.0)).abs() < 1e-9);
    assert!((d.height - (40.0 - 10.0 / 796.0 * 100.0)).abs() < 1e-9);
    assert!(f.editor.selection().is_empty());
}

#[tokio::test]
async fn resize_ignores_unknown_and_synthetic_targets() {
    let mut f = fixture("edit").await;
    f.editor.on_handle_down("ghost", ResizeAnchor::E, Point::default());
    assert!(f.editor.input().is_idle());
    f.editor.on_handle_down("panel", ResizeAnchor::E, Point::default());
    assert!(f.editor.input().is_idle());
}

// =============================================================
// Nudge
// =============================================================

#[tokio::test]
async fn nudge_scenario_left_arrow() {
    let mut f = fixture("edit").await;
    f.editor.on_click(f.surface.node_in("a").unwrap(), no_modifiers());

    let actions = f.editor.on_key_down("ArrowLeft", no_modifiers()).await.unwrap();
    assert_eq!(actions, vec![Action::PropertiesPushed { id: "a".into() }]);
    let a = f.store.snapshot().property.cell("a").cloned().unwrap();
    assert!((a.bounds.x - 49.8996).abs() < 1e-4);
    assert_eq!(a.bounds.y, 50.0);
    assert!(!a.has_snap_hints());
}

#[tokio::test]
async fn consecutive_nudges_build_on_each_other() {
    let mut f = fixture("edit").await;
    f.editor.on_click(f.surface.node_in("b").unwrap(), no_modifiers());
    f.editor.on_key_down("ArrowDown", Modifiers::shift()).await.unwrap();
    f.editor.on_key_down("ArrowDown", Modifiers::shift()).await.unwrap();
    let b = f.store.snapshot().property.cell("b").cloned().unwrap();
    assert!((b.bounds.y - 2.0 * 10.0 / 796.0 * 100.0).abs() < 1e-9);
}

#[tokio::test]
async fn nudge_reports_only_cells_it_moved() {
    let mut f = fixture("edit").await;
    f.editor.on_click(f.surface.node_in("a").unwrap(), no_modifiers());
    f.editor.on_click(f.surface.node_in("b").unwrap(), Modifiers::shift());
    let mut changed = tree();
    changed.property.cells.remove(1);
    f.store.replace_tree(changed);
    settle().await;

    let actions = f.editor.on_key_down("ArrowRight", no_modifiers()).await.unwrap();
    assert_eq!(actions, vec![Action::PropertiesPushed { id: "a".into() }]);
    assert_eq!(f.editor.selection().len(), 2);
}

#[tokio::test]
async fn nudge_with_empty_selection_does_not_push() {
    let mut f = fixture("edit").await;
    assert!(f.editor.on_key_down("ArrowUp", no_modifiers()).await.unwrap().is_empty());
    assert_eq!(f.store.calls().set_properties, 0);
}

// =============================================================
// Delete
// =============================================================

#[tokio::test]
async fn delete_removes_selection_everywhere() {
    let mut f = fixture("edit").await;
    f.editor.on_click(f.surface.node_in("a").unwrap(), no_modifiers());
    f.editor.on_click(f.surface.node_in("c").unwrap(), Modifiers::shift());

    let actions = f.editor.on_key_down("Delete", no_modifiers()).await.unwrap();
    assert_eq!(
        actions,
        vec![Action::ObjectsDeleted(ids(&["a", "c"])), Action::SelectionChanged(Vec::new())]
    );
    let snap = f.store.snapshot();
    assert_eq!(snap.property.cells.len(), 3);
    assert_eq!(snap.children.len(), 3);
    assert!(snap.children.iter().all(|c| c.id() != "a" && c.id() != "c"));
    assert!(f.editor.selection().is_empty());
}

#[tokio::test]
async fn failed_delete_keeps_selection() {
    let mut f = fixture("edit").await;
    f.editor.on_click(f.surface.node_in("a").unwrap(), no_modifiers());
    f.store.fail_writes(true);
    assert!(f.editor.on_key_down("Delete", no_modifiers()).await.is_err());
    assert_eq!(f.editor.selection().ids(), ["a".to_string()]);
}

#[tokio::test]
async fn delete_with_nothing_selected_is_a_no_op() {
    let mut f = fixture("edit").await;
    assert!(f.editor.on_key_down("Delete", no_modifiers()).await.unwrap().is_empty());
    assert_eq!(f.store.calls().get_full_property_tree, 0);
}

// =============================================================
// Sync loop
// =============================================================

#[tokio::test]
async fn invalidation_burst_rebuilds_registry_once() {
    let f = fixture("edit").await;
    let generation = f.editor.registry().generation();
    f.store.invalidate();
    f.store.invalidate();
    f.store.invalidate();
    settle().await;
    assert_eq!(f.store.calls().get_properties, 2);
    assert_eq!(f.editor.registry().generation(), generation + 1);
}

#[tokio::test]
async fn out_of_band_change_reaches_next_commit() {
    let mut f = fixture("edit").await;
    let mut changed = tree();
    changed.property.cells[1].bounds.x = 70.0;
    f.store.replace_tree(changed);
    settle().await;

    f.editor.on_click(f.surface.node_in("b").unwrap(), no_modifiers());
    f.editor.on_key_down("ArrowRight", no_modifiers()).await.unwrap();
    let b = f.store.snapshot().property.cell("b").cloned().unwrap();
    assert!((b.bounds.x - (70.0 + 100.0 / 996.0)).abs() < 1e-9);
}

// =============================================================
// Teardown
// =============================================================

#[tokio::test]
async fn destroy_unbinds_and_clears() {
    let mut f = fixture("edit").await;
    f.editor.on_click(f.surface.node_in("a").unwrap(), no_modifiers());
    f.editor.on_pointer_down(f.surface.node_in("b").unwrap(), Point::new(130.0, 110.0));
    f.editor.on_pointer_move(Point::new(140.0, 110.0));

    f.editor.destroy();
    f.editor.destroy();
    assert_eq!(f.store.listener_count(), 0);
    assert!(f.editor.selection().is_empty());
    assert!(f.surface.previews().is_empty());
    assert_eq!(f.surface.active_captures(), 0);

    f.store.invalidate();
    settle().await;
    assert_eq!(f.store.calls().get_properties, 1);
}

#[tokio::test]
async fn drop_unbinds() {
    let f = fixture("edit").await;
    let store = Arc::clone(&f.store);
    drop(f);
    assert_eq!(store.listener_count(), 0);
}
