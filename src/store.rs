//! Remote document store contract.
//!
//! DESIGN
//! ======
//! The store is authoritative for cell geometry and the object tree. It is
//! reached only through async calls and may change out-of-band; when it
//! does it fires a payload-free invalidation to every bound listener.
//! Writes are last-write-wins: no version token is exchanged, so a push
//! racing another client's push may be silently overwritten.

use std::sync::Arc;

use crate::doc::{PropertyTree, SheetProperties};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store rejected request: {0}")]
    Rejected(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("malformed store payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl StoreError {
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Rejected(_) => "E_STORE_REJECTED",
            Self::Unavailable(_) => "E_STORE_UNAVAILABLE",
            Self::NotFound(_) => "E_STORE_NOT_FOUND",
            Self::Malformed(_) => "E_STORE_MALFORMED",
        }
    }
}

/// Callback fired when the store's data changed out-of-band.
pub type InvalidationListener = Arc<dyn Fn() + Send + Sync>;

/// Token returned by [`DocumentStore::bind_invalidated`], used to unbind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

// =============================================================================
// TRAITS
// =============================================================================

/// One sheet object in the remote store.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read the sheet's shallow properties.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the store rejects the read.
    async fn get_properties(&self) -> Result<SheetProperties, StoreError>;

    /// Replace the sheet's shallow properties.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the store rejects the write.
    async fn set_properties(&self, props: &SheetProperties) -> Result<(), StoreError>;

    /// Read the sheet's properties together with every child definition.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the store rejects the read.
    async fn get_full_property_tree(&self) -> Result<PropertyTree, StoreError>;

    /// Replace the full property tree.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the store rejects the write.
    async fn set_full_property_tree(&self, tree: &PropertyTree) -> Result<(), StoreError>;

    /// Register an invalidation listener.
    fn bind_invalidated(&self, listener: InvalidationListener) -> ListenerId;

    /// Remove a listener registered with [`DocumentStore::bind_invalidated`].
    fn unbind_invalidated(&self, id: ListenerId);
}

/// The app that owns the sheets.
#[async_trait::async_trait]
pub trait DocumentApp: Send + Sync {
    /// Ids of every sheet in the app, in app order.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the listing fails.
    async fn sheet_ids(&self) -> Result<Vec<String>, StoreError>;

    /// Open a sheet object by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no such object exists.
    async fn get_object(&self, id: &str) -> Result<Arc<dyn DocumentStore>, StoreError>;
}
