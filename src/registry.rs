//! Object registry: the live list of sheet objects and their rendered roots.
//!
//! DESIGN
//! ======
//! Rebuilt from scratch every time new sheet properties land. The rebuild
//! waits one scheduling tick so the host can render the properties first,
//! then maps each cell to its element by identifier and overwrites each
//! element's stacking index with its 1-based list position.
//!
//! Cells whose element is not rendered yet keep a dead handle (`None`).
//! Gestures that meet a dead handle do nothing.

#[cfg(test)]
#[path = "registry_test.rs"]
mod registry_test;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::doc::{ObjectId, SheetProperties};
use crate::surface::{ElementHandle, NodeRef, Surface};

/// Whether an object is a regular panel or one injected by the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Normal,
    /// System-injected panel; never a drag or resize target.
    Synthetic,
}

/// One object on the sheet as the editor sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetObject {
    pub id: ObjectId,
    /// Rendered root, or `None` if it was not in the document at rebuild time.
    pub element: Option<ElementHandle>,
    pub kind: ObjectKind,
}

impl SheetObject {
    #[must_use]
    pub fn is_synthetic(&self) -> bool {
        self.kind == ObjectKind::Synthetic
    }
}

/// Map cells to rendered elements and restack them. Pure apart from the
/// stacking side effect on `surface`.
pub fn build_objects(props: &SheetProperties, surface: &dyn Surface, synthetic_type: &str) -> Vec<SheetObject> {
    props
        .cells
        .iter()
        .enumerate()
        .map(|(index, cell)| {
            let element = surface.lookup(&cell.name);
            if let Some(el) = element {
                surface.set_stacking(el, index + 1);
            }
            let kind = if cell.kind.as_deref() == Some(synthetic_type) {
                ObjectKind::Synthetic
            } else {
                ObjectKind::Normal
            };
            SheetObject { id: cell.name.clone(), element, kind }
        })
        .collect()
}

/// The object whose element subtree contains `target`.
///
/// Hit areas may overlap; the topmost match (latest in stacking order)
/// wins, which is the object the user can see.
#[must_use]
pub fn object_at<'a>(objects: &'a [SheetObject], surface: &dyn Surface, target: NodeRef) -> Option<&'a SheetObject> {
    objects
        .iter()
        .rev()
        .find(|obj| obj.element.is_some_and(|el| surface.contains(el, target)))
}

/// Latest object list plus a rebuild counter.
#[derive(Debug)]
pub struct ObjectRegistry {
    tx: watch::Sender<Arc<Vec<SheetObject>>>,
    generation: AtomicU64,
}

impl Default for ObjectRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectRegistry {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Arc::new(Vec::new()));
        Self { tx, generation: AtomicU64::new(0) }
    }

    /// Current object list.
    #[must_use]
    pub fn objects(&self) -> Arc<Vec<SheetObject>> {
        Arc::clone(&self.tx.borrow())
    }

    /// How many rebuilds have completed.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<SheetObject>>> {
        self.tx.subscribe()
    }

    /// Rebuild from `props` and publish.
    pub fn rebuild(&self, props: &SheetProperties, surface: &dyn Surface, synthetic_type: &str) {
        let objects = build_objects(props, surface, synthetic_type);
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(objects = objects.len(), generation, "object registry rebuilt");
        self.tx.send_replace(Arc::new(objects));
    }
}

/// Spawn the task that rebuilds `registry` whenever `props` publishes.
pub fn spawn_registry_task(
    registry: Arc<ObjectRegistry>,
    mut props: watch::Receiver<Option<Arc<SheetProperties>>>,
    surface: Arc<dyn Surface>,
    synthetic_type: String,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while props.changed().await.is_ok() {
            // Let the host render the new properties before looking up elements.
            tokio::task::yield_now().await;
            let latest = props.borrow_and_update().clone();
            if let Some(latest) = latest {
                registry.rebuild(&latest, surface.as_ref(), &synthetic_type);
            }
        }
    })
}
