//! In-memory [`DocumentStore`] and [`DocumentApp`].
//!
//! Honours the same contract as a remote store: every successful write fires
//! the invalidation listeners, reads hand out clones, and failures can be
//! injected per operation. Call counters let tests assert exactly how many
//! round-trips a gesture caused.

#[cfg(test)]
#[path = "memory_store_test.rs"]
mod memory_store_test;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::doc::{PropertyTree, SheetProperties};
use crate::store::{DocumentApp, DocumentStore, InvalidationListener, ListenerId, StoreError};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Per-operation call counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub get_properties: usize,
    pub set_properties: usize,
    pub get_full_property_tree: usize,
    pub set_full_property_tree: usize,
}

#[derive(Default)]
struct Listeners {
    next_id: u64,
    bound: Vec<(ListenerId, InvalidationListener)>,
}

/// A single sheet held in memory.
#[derive(Default)]
pub struct MemoryStore {
    tree: Mutex<PropertyTree>,
    listeners: Mutex<Listeners>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    get_properties: AtomicUsize,
    set_properties: AtomicUsize,
    get_tree: AtomicUsize,
    set_tree: AtomicUsize,
}

impl MemoryStore {
    #[must_use]
    pub fn new(tree: PropertyTree) -> Self {
        Self { tree: Mutex::new(tree), ..Self::default() }
    }

    /// Current tree, bypassing counters.
    #[must_use]
    pub fn snapshot(&self) -> PropertyTree {
        lock(&self.tree).clone()
    }

    /// Replace the tree out-of-band (as another client would) and notify.
    pub fn replace_tree(&self, tree: PropertyTree) {
        *lock(&self.tree) = tree;
        self.invalidate();
    }

    /// Fire every bound invalidation listener.
    pub fn invalidate(&self) {
        let listeners: Vec<InvalidationListener> = lock(&self.listeners)
            .bound
            .iter()
            .map(|(_, f)| Arc::clone(f))
            .collect();
        debug!(listeners = listeners.len(), "memory store invalidated");
        for listener in listeners {
            listener();
        }
    }

    /// Make every subsequent read fail (or succeed again).
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent write fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn calls(&self) -> CallCounts {
        CallCounts {
            get_properties: self.get_properties.load(Ordering::SeqCst),
            set_properties: self.set_properties.load(Ordering::SeqCst),
            get_full_property_tree: self.get_tree.load(Ordering::SeqCst),
            set_full_property_tree: self.set_tree.load(Ordering::SeqCst),
        }
    }

    /// Number of listeners currently bound.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        lock(&self.listeners).bound.len()
    }

    fn check_read(&self) -> Result<(), StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("read failure injected".into()));
        }
        Ok(())
    }

    fn check_write(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Rejected("write failure injected".into()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryStore {
    async fn get_properties(&self) -> Result<SheetProperties, StoreError> {
        self.get_properties.fetch_add(1, Ordering::SeqCst);
        self.check_read()?;
        Ok(lock(&self.tree).property.clone())
    }

    async fn set_properties(&self, props: &SheetProperties) -> Result<(), StoreError> {
        self.set_properties.fetch_add(1, Ordering::SeqCst);
        self.check_write()?;
        lock(&self.tree).property = props.clone();
        self.invalidate();
        Ok(())
    }

    async fn get_full_property_tree(&self) -> Result<PropertyTree, StoreError> {
        self.get_tree.fetch_add(1, Ordering::SeqCst);
        self.check_read()?;
        Ok(lock(&self.tree).clone())
    }

    async fn set_full_property_tree(&self, tree: &PropertyTree) -> Result<(), StoreError> {
        self.set_tree.fetch_add(1, Ordering::SeqCst);
        self.check_write()?;
        *lock(&self.tree) = tree.clone();
        self.invalidate();
        Ok(())
    }

    fn bind_invalidated(&self, listener: InvalidationListener) -> ListenerId {
        let mut listeners = lock(&self.listeners);
        listeners.next_id += 1;
        let id = ListenerId(listeners.next_id);
        listeners.bound.push((id, listener));
        id
    }

    fn unbind_invalidated(&self, id: ListenerId) {
        lock(&self.listeners).bound.retain(|(bound, _)| *bound != id);
    }
}

/// An app holding several in-memory sheets, in insertion order.
#[derive(Default)]
pub struct MemoryApp {
    order: Vec<String>,
    sheets: HashMap<String, Arc<MemoryStore>>,
}

impl MemoryApp {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sheet and return its store.
    pub fn add_sheet(&mut self, id: &str, tree: PropertyTree) -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new(tree));
        if !self.sheets.contains_key(id) {
            self.order.push(id.to_string());
        }
        self.sheets.insert(id.to_string(), Arc::clone(&store));
        store
    }
}

#[async_trait::async_trait]
impl DocumentApp for MemoryApp {
    async fn sheet_ids(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.order.clone())
    }

    async fn get_object(&self, id: &str) -> Result<Arc<dyn DocumentStore>, StoreError> {
        let store = self
            .sheets
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        Ok(Arc::clone(store) as Arc<dyn DocumentStore>)
    }
}
