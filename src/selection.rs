//! Selection store: the ordered set of selected object ids.
//!
//! The store is the only writer of the selection. Gestures read snapshots;
//! the click gesture feeds transitions through [`SelectionStore::select`]
//! and [`SelectionStore::clear`].

#[cfg(test)]
#[path = "selection_test.rs"]
mod selection_test;

use tokio::sync::watch;

use crate::doc::ObjectId;

/// Ordered set of selected object ids. No duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<ObjectId>,
}

impl Selection {
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|s| s == id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn ids(&self) -> &[ObjectId] {
        &self.ids
    }

    /// Apply a click. `object` is `None` for a click on empty sheet space.
    /// Returns true if the selection changed.
    ///
    /// | clicked | additive | result |
    /// |---------|----------|--------|
    /// | yes | no  | just that object |
    /// | yes | yes | toggle membership |
    /// | no  | no  | empty |
    /// | no  | yes | unchanged |
    pub fn click(&mut self, object: Option<&str>, additive: bool) -> bool {
        let before = self.ids.len();
        match (object, additive) {
            (Some(id), false) => {
                if self.ids.len() == 1 && self.ids[0] == id {
                    return false;
                }
                self.ids = vec![id.to_string()];
                true
            }
            (Some(id), true) => {
                if let Some(index) = self.ids.iter().position(|s| s == id) {
                    self.ids.remove(index);
                } else {
                    self.ids.push(id.to_string());
                }
                true
            }
            (None, false) => {
                self.ids.clear();
                before > 0
            }
            (None, true) => false,
        }
    }

    /// Drop the given ids. Returns true if any were selected.
    pub fn remove_all(&mut self, ids: &[ObjectId]) -> bool {
        let before = self.ids.len();
        self.ids.retain(|s| !ids.contains(s));
        self.ids.len() != before
    }
}

/// Owner of the live selection.
#[derive(Debug)]
pub struct SelectionStore {
    tx: watch::Sender<Selection>,
}

impl Default for SelectionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionStore {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Selection::default());
        Self { tx }
    }

    /// Select `id`, replacing the selection or toggling it when `additive`.
    pub fn select(&self, id: &str, additive: bool) -> bool {
        self.tx.send_if_modified(|sel| sel.click(Some(id), additive))
    }

    /// A click that hit no object.
    pub fn click_empty(&self, additive: bool) -> bool {
        self.tx.send_if_modified(|sel| sel.click(None, additive))
    }

    pub fn clear(&self) -> bool {
        self.click_empty(false)
    }

    /// Drop ids that no longer exist.
    pub fn remove_all(&self, ids: &[ObjectId]) -> bool {
        self.tx.send_if_modified(|sel| sel.remove_all(ids))
    }

    #[must_use]
    pub fn snapshot(&self) -> Selection {
        self.tx.borrow().clone()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.tx.borrow().contains(id)
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Selection> {
        self.tx.subscribe()
    }
}
