//! Selection gesture: attribute a click to an object and update the selection.

#[cfg(test)]
#[path = "select_test.rs"]
mod select_test;

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::registry::{SheetObject, object_at};
use crate::selection::{Selection, SelectionStore};
use crate::surface::{NodeRef, Surface};

/// Apply a click on `target`. Returns true if the selection changed.
pub fn apply_click(
    selection: &SelectionStore,
    objects: &[SheetObject],
    surface: &dyn Surface,
    target: NodeRef,
    additive: bool,
) -> bool {
    match object_at(objects, surface, target) {
        Some(object) => {
            debug!(object = %object.id, additive, "object clicked");
            selection.select(&object.id, additive)
        }
        None => selection.click_empty(additive),
    }
}

/// Set or clear the selected marker on every live object.
pub fn paint_selection(selection: &Selection, objects: &[SheetObject], surface: &dyn Surface) {
    for object in objects {
        if let Some(element) = object.element {
            surface.set_selected(element, selection.contains(&object.id));
        }
    }
}

/// Repaint selection markers whenever the selection or the object list
/// changes.
pub fn spawn_marker_task(
    mut objects: watch::Receiver<Arc<Vec<SheetObject>>>,
    mut selection: watch::Receiver<Selection>,
    surface: Arc<dyn Surface>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                changed = objects.changed() => if changed.is_err() { break },
                changed = selection.changed() => if changed.is_err() { break },
            }
            let current = Arc::clone(&objects.borrow_and_update());
            let selected = selection.borrow_and_update().clone();
            paint_selection(&selected, &current, surface.as_ref());
        }
    })
}
