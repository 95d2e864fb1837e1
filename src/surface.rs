//! Host rendering surface: the DOM contract the editor drives.
//!
//! The editor never renders anything itself. It asks the host to look up an
//! object's rendered root, read its on-screen rectangle, tag it as selected,
//! set its stacking index, and show a translucent preview box while a drag
//! or resize is in flight.
//!
//! Pointer capture and preview boxes are handed out as guards
//! ([`CaptureGuard`], [`PreviewGuard`]) that release on drop, so a gesture
//! session that ends on any path (release, cancel, teardown, failed push)
//! cannot leak window-level handlers or leave a preview on screen.

use std::sync::Arc;

use crate::geometry::Rect;

/// Opaque reference to an object's rendered root element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementHandle(pub u64);

/// Opaque reference to any node in the document (an event target).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef(pub u64);

/// Opaque reference to a preview box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PreviewId(pub u64);

/// Opaque reference to an installed window-level pointer capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CaptureId(pub u64);

/// Operations the editor needs from the host's document.
pub trait Surface: Send + Sync {
    /// Find the rendered root carrying the identifier attribute `id`.
    fn lookup(&self, id: &str) -> Option<ElementHandle>;

    /// Whether `target` lies within `element`'s subtree (inclusive).
    fn contains(&self, element: ElementHandle, target: NodeRef) -> bool;

    /// On-screen rectangle of `element`, or `None` if it is gone.
    fn bounding_rect(&self, element: ElementHandle) -> Option<Rect>;

    /// Bounding box of the grid container.
    fn container_rect(&self) -> Option<Rect>;

    /// Overwrite the element's stacking index.
    fn set_stacking(&self, element: ElementHandle, z_index: usize);

    /// Add or remove the "selected" visual marker.
    fn set_selected(&self, element: ElementHandle, selected: bool);

    /// Materialize a preview box.
    fn show_preview(&self, rect: Rect) -> PreviewId;

    /// Reposition an existing preview box.
    fn move_preview(&self, preview: PreviewId, rect: Rect);

    /// Remove a preview box.
    fn remove_preview(&self, preview: PreviewId);

    /// Install window-level move/up interception.
    fn begin_capture(&self) -> CaptureId;

    /// Remove a capture installed by [`Surface::begin_capture`].
    fn end_capture(&self, capture: CaptureId);
}

/// Scoped pointer capture. Released when dropped.
pub struct CaptureGuard {
    surface: Arc<dyn Surface>,
    id: CaptureId,
}

impl CaptureGuard {
    /// Install a capture on `surface`.
    #[must_use]
    pub fn begin(surface: &Arc<dyn Surface>) -> Self {
        let id = surface.begin_capture();
        Self { surface: Arc::clone(surface), id }
    }

    /// Release now. Equivalent to dropping.
    pub fn release(self) {}
}

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        self.surface.end_capture(self.id);
    }
}

impl std::fmt::Debug for CaptureGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("CaptureGuard").field(&self.id).finish()
    }
}

/// Scoped preview box. Removed when dropped.
pub struct PreviewGuard {
    surface: Arc<dyn Surface>,
    id: PreviewId,
}

impl PreviewGuard {
    /// Show a preview at `rect`.
    #[must_use]
    pub fn show(surface: &Arc<dyn Surface>, rect: Rect) -> Self {
        let id = surface.show_preview(rect);
        Self { surface: Arc::clone(surface), id }
    }

    pub fn move_to(&self, rect: Rect) {
        self.surface.move_preview(self.id, rect);
    }
}

impl Drop for PreviewGuard {
    fn drop(&mut self) {
        self.surface.remove_preview(self.id);
    }
}

impl std::fmt::Debug for PreviewGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PreviewGuard").field(&self.id).finish()
    }
}
