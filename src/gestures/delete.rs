//! Delete gesture: remove every selected object from the cell list and the
//! property tree in one write.

#[cfg(test)]
#[path = "delete_test.rs"]
mod delete_test;

use tracing::info;

use crate::doc::ObjectId;
use crate::store::StoreError;
use crate::sync::RemoteSync;

/// What a delete removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deleted {
    pub ids: Vec<ObjectId>,
    pub children_removed: usize,
    pub cells_removed: usize,
}

/// Fetch the full tree, strip `ids` from it, and push it back.
///
/// An empty `ids` is a no-op and costs no round-trip.
///
/// # Errors
///
/// Returns the store error from the fetch or the push; nothing is written
/// if the fetch fails.
pub async fn delete_objects(sync: &RemoteSync, ids: &[ObjectId]) -> Result<Option<Deleted>, StoreError> {
    if ids.is_empty() {
        return Ok(None);
    }
    let mut tree = sync.fetch_full_tree().await?;
    let (children_removed, cells_removed) = tree.remove_objects(ids);
    sync.push_full_tree(tree).await?;
    info!(count = ids.len(), children_removed, cells_removed, "objects deleted");
    Ok(Some(Deleted { ids: ids.to_vec(), children_removed, cells_removed }))
}
