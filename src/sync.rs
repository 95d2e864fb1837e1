//! Remote sync layer: fetch, push, and invalidation-driven refetch.
//!
//! DESIGN
//! ======
//! The latest sheet properties live in a `watch` channel: one writer (this
//! layer), many readers (registry, gestures). Every reader sees the value
//! current at the moment it looks, never one captured earlier.
//!
//! Refetches are requested by bumping a generation counter held in a second
//! `watch` channel. Requests come from three places: an explicit call, the
//! store's invalidation notification, and edit-mode toggles. The refetch
//! task yields one tick after waking and then marks every pending bump as
//! seen, so a burst of notifications inside one tick costs one round-trip.
//!
//! ERROR HANDLING
//! ==============
//! Failed fetches and pushes are logged and returned to the caller. Nothing
//! retries automatically. A failed background refetch leaves the previous
//! properties in place.

#[cfg(test)]
#[path = "sync_test.rs"]
mod sync_test;

use std::sync::Arc;

use serde_json::{Value, json};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::consts::{SYNTHETIC_COLSPAN, SYNTHETIC_HEIGHT_PCT, SYNTHETIC_ROWSPAN, SYNTHETIC_WIDTH_PCT};
use crate::doc::{Bounds, Cell, ChildNode, PropertyTree, SheetProperties};
use crate::store::{DocumentApp, DocumentStore, ListenerId, StoreError};

type PropertiesTx = watch::Sender<Option<Arc<SheetProperties>>>;

fn bump(refresh: &watch::Sender<u64>) {
    refresh.send_modify(|generation| *generation += 1);
}

pub struct RemoteSync {
    store: Arc<dyn DocumentStore>,
    properties: Arc<PropertiesTx>,
    refresh: Arc<watch::Sender<u64>>,
    listener: Option<ListenerId>,
    task: Option<JoinHandle<()>>,
}

impl RemoteSync {
    /// Bind the invalidation listener, start the refetch task, and request
    /// the initial fetch. Must be called inside a tokio runtime.
    #[must_use]
    pub fn start(store: Arc<dyn DocumentStore>) -> Self {
        let (properties, _) = watch::channel(None);
        let properties = Arc::new(properties);
        let (refresh, refresh_rx) = watch::channel(0_u64);
        let refresh = Arc::new(refresh);

        let notify = Arc::clone(&refresh);
        let listener = store.bind_invalidated(Arc::new(move || bump(&notify)));
        let task = spawn_refetch_task(Arc::clone(&store), refresh_rx, Arc::clone(&properties));
        bump(&refresh);

        Self { store, properties, refresh, listener: Some(listener), task: Some(task) }
    }

    /// Schedule a refetch. Coalesces with any other request in the same tick.
    pub fn request_refresh(&self) {
        bump(&self.refresh);
    }

    /// The most recently observed sheet properties.
    #[must_use]
    pub fn latest(&self) -> Option<Arc<SheetProperties>> {
        self.properties.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<SheetProperties>>> {
        self.properties.subscribe()
    }

    /// Fetch now and publish the result.
    ///
    /// # Errors
    ///
    /// Returns the store's error; the published value is left unchanged.
    pub async fn fetch_properties(&self) -> Result<Arc<SheetProperties>, StoreError> {
        let props = Arc::new(self.store.get_properties().await.inspect_err(|e| {
            warn!(error = %e, code = e.error_code(), "sheet properties fetch failed");
        })?);
        self.properties.send_replace(Some(Arc::clone(&props)));
        Ok(props)
    }

    /// Persist `props`. On success the pushed value becomes the latest known
    /// properties until the store's own invalidation refetch replaces it.
    ///
    /// # Errors
    ///
    /// Returns the store's error; the published value is left unchanged.
    pub async fn push_properties(&self, props: SheetProperties) -> Result<(), StoreError> {
        self.store.set_properties(&props).await.inspect_err(|e| {
            warn!(error = %e, code = e.error_code(), "sheet properties push failed");
        })?;
        debug!(cells = props.cells.len(), "sheet properties pushed");
        self.properties.send_replace(Some(Arc::new(props)));
        Ok(())
    }

    /// Fetch the full property tree.
    ///
    /// # Errors
    ///
    /// Returns the store's error.
    pub async fn fetch_full_tree(&self) -> Result<PropertyTree, StoreError> {
        self.store.get_full_property_tree().await.inspect_err(|e| {
            warn!(error = %e, code = e.error_code(), "property tree fetch failed");
        })
    }

    /// Persist the full property tree; its shallow properties become the
    /// latest known value on success.
    ///
    /// # Errors
    ///
    /// Returns the store's error.
    pub async fn push_full_tree(&self, tree: PropertyTree) -> Result<(), StoreError> {
        self.store.set_full_property_tree(&tree).await.inspect_err(|e| {
            warn!(error = %e, code = e.error_code(), "property tree push failed");
        })?;
        debug!(children = tree.children.len(), cells = tree.property.cells.len(), "property tree pushed");
        self.properties.send_replace(Some(Arc::new(tree.property)));
        Ok(())
    }

    /// Unbind the invalidation listener and stop the refetch task. Idempotent.
    pub fn shutdown(&mut self) {
        if let Some(listener) = self.listener.take() {
            self.store.unbind_invalidated(listener);
        }
        if let Some(task) = self.task.take() {
            task.abort();
            info!("remote sync stopped");
        }
    }
}

impl Drop for RemoteSync {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn spawn_refetch_task(
    store: Arc<dyn DocumentStore>,
    mut refresh: watch::Receiver<u64>,
    properties: Arc<PropertiesTx>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while refresh.changed().await.is_ok() {
            // Coalesce every request raised within this tick.
            tokio::task::yield_now().await;
            let generation = *refresh.borrow_and_update();
            match store.get_properties().await {
                Ok(props) => {
                    debug!(generation, cells = props.cells.len(), "sheet properties refetched");
                    properties.send_replace(Some(Arc::new(props)));
                }
                Err(e) => {
                    warn!(generation, error = %e, code = e.error_code(), "sheet properties refetch failed");
                }
            }
        }
    })
}

// =============================================================================
// SYNTHETIC PANEL
// =============================================================================

/// Cell and child node for a freshly installed synthetic panel.
#[must_use]
pub fn synthetic_panel(id: &str, synthetic_type: &str) -> (Cell, ChildNode) {
    let cell = Cell {
        kind: Some(synthetic_type.to_string()),
        col: Some(0),
        row: Some(0),
        colspan: Some(SYNTHETIC_COLSPAN),
        rowspan: Some(SYNTHETIC_ROWSPAN),
        ..Cell::new(id, Bounds::new(0.0, 0.0, SYNTHETIC_WIDTH_PCT, SYNTHETIC_HEIGHT_PCT))
    };
    let mut child = ChildNode::new(id, synthetic_type);
    if let Value::Object(definition) = synthetic_definition(synthetic_type) {
        child.property.extra = definition;
    }
    (cell, child)
}

/// Property fields the host needs to render and list the panel as an
/// extension visualization.
fn synthetic_definition(synthetic_type: &str) -> Value {
    json!({
        "showTitles": true,
        "title": "",
        "subtitle": "",
        "footnote": "",
        "showDetails": false,
        "qStateName": "",
        "visualization": synthetic_type,
        "qHyperCubeDef": { "qDimensions": [], "qMeasures": [], "qInitialDataFetch": [] },
        "extensionMeta": {
            "translationKey": "",
            "icon": "puzzle",
            "iconChar": "puzzle",
            "isLibraryItem": true,
            "visible": true,
            "name": "Sheet Editor",
            "description": "Sheet Editor",
            "template": synthetic_type,
            "isThirdParty": true,
            "type": "visualization"
        }
    })
}

/// Add the editor's own panel to every sheet in `app` that lacks one.
///
/// Sheets are visited one at a time in app order. Returns how many sheets
/// received a panel.
///
/// # Errors
///
/// Stops at the first store failure and returns it.
pub async fn install_synthetic_panels(app: &dyn DocumentApp, synthetic_type: &str) -> Result<usize, StoreError> {
    let mut installed = 0;
    for sheet_id in app.sheet_ids().await? {
        let sheet = app.get_object(&sheet_id).await?;
        if sheet.get_properties().await?.has_cell_of_kind(synthetic_type) {
            continue;
        }

        let mut tree = sheet.get_full_property_tree().await?;
        let panel_id = Uuid::new_v4().to_string();
        let (cell, child) = synthetic_panel(&panel_id, synthetic_type);
        tree.children.push(child);
        tree.property.cells.push(cell);
        sheet.set_full_property_tree(&tree).await?;

        info!(sheet = %sheet_id, panel = %panel_id, "synthetic panel installed");
        installed += 1;
    }
    Ok(installed)
}
