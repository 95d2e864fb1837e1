//! In-process [`Surface`] with no real DOM behind it.
//!
//! Keeps just enough state (element rectangles, stacking, selection markers,
//! previews, captures) for tests and the replay harness to drive the editor
//! and inspect what it asked the host to do.

#[cfg(test)]
#[path = "headless_test.rs"]
mod headless_test;

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::geometry::Rect;
use crate::surface::{CaptureId, ElementHandle, NodeRef, PreviewId, Surface};

#[derive(Debug, Clone)]
struct Element {
    handle: ElementHandle,
    rect: Rect,
    z_index: Option<usize>,
    selected: bool,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: u64,
    container: Option<Rect>,
    elements: HashMap<String, Element>,
    /// Child node -> owning element.
    nodes: HashMap<NodeRef, ElementHandle>,
    previews: HashMap<PreviewId, Rect>,
    captures: HashSet<CaptureId>,
}

impl Inner {
    fn next(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Headless surface. Cheap to share behind an `Arc`.
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    inner: Mutex<Inner>,
}

impl HeadlessSurface {
    /// A surface whose grid container occupies `container`.
    #[must_use]
    pub fn new(container: Rect) -> Self {
        let surface = Self::default();
        surface.lock().container = Some(container);
        surface
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Resize the grid container.
    pub fn set_container(&self, rect: Rect) {
        self.lock().container = Some(rect);
    }

    /// Render an element for object `id` at `rect`, replacing any previous one.
    pub fn add_element(&self, id: &str, rect: Rect) -> ElementHandle {
        let mut inner = self.lock();
        let handle = ElementHandle(inner.next());
        inner
            .elements
            .insert(id.to_string(), Element { handle, rect, z_index: None, selected: false });
        handle
    }

    /// Remove object `id`'s element and every node inside it.
    pub fn remove_element(&self, id: &str) {
        let mut inner = self.lock();
        if let Some(el) = inner.elements.remove(id) {
            inner.nodes.retain(|_, owner| *owner != el.handle);
        }
    }

    /// Move object `id`'s element.
    pub fn set_rect(&self, id: &str, rect: Rect) {
        if let Some(el) = self.lock().elements.get_mut(id) {
            el.rect = rect;
        }
    }

    /// A fresh descendant node of object `id`'s element, usable as a click target.
    pub fn node_in(&self, id: &str) -> Option<NodeRef> {
        let mut inner = self.lock();
        let owner = inner.elements.get(id)?.handle;
        let node = NodeRef(inner.next());
        inner.nodes.insert(node, owner);
        Some(node)
    }

    /// A node outside every object (empty sheet space).
    pub fn background_node(&self) -> NodeRef {
        NodeRef(self.lock().next())
    }

    #[must_use]
    pub fn z_index(&self, id: &str) -> Option<usize> {
        self.lock().elements.get(id).and_then(|el| el.z_index)
    }

    #[must_use]
    pub fn is_selected(&self, id: &str) -> bool {
        self.lock().elements.get(id).is_some_and(|el| el.selected)
    }

    /// Rectangles of every preview currently on screen.
    #[must_use]
    pub fn previews(&self) -> Vec<Rect> {
        self.lock().previews.values().copied().collect()
    }

    /// Number of captures currently installed.
    #[must_use]
    pub fn active_captures(&self) -> usize {
        self.lock().captures.len()
    }

    /// Rectangle of every element, keyed by object id.
    #[must_use]
    pub fn element_rects(&self) -> HashMap<String, Rect> {
        self.lock().elements.iter().map(|(id, el)| (id.clone(), el.rect)).collect()
    }
}

impl Surface for HeadlessSurface {
    fn lookup(&self, id: &str) -> Option<ElementHandle> {
        self.lock().elements.get(id).map(|el| el.handle)
    }

    fn contains(&self, element: ElementHandle, target: NodeRef) -> bool {
        let inner = self.lock();
        let alive = inner.elements.values().any(|el| el.handle == element);
        alive && (target.0 == element.0 || inner.nodes.get(&target) == Some(&element))
    }

    fn bounding_rect(&self, element: ElementHandle) -> Option<Rect> {
        self.lock()
            .elements
            .values()
            .find(|el| el.handle == element)
            .map(|el| el.rect)
    }

    fn container_rect(&self) -> Option<Rect> {
        self.lock().container
    }

    fn set_stacking(&self, element: ElementHandle, z_index: usize) {
        if let Some(el) = self.lock().elements.values_mut().find(|el| el.handle == element) {
            el.z_index = Some(z_index);
        }
    }

    fn set_selected(&self, element: ElementHandle, selected: bool) {
        if let Some(el) = self.lock().elements.values_mut().find(|el| el.handle == element) {
            el.selected = selected;
        }
    }

    fn show_preview(&self, rect: Rect) -> PreviewId {
        let mut inner = self.lock();
        let id = PreviewId(inner.next());
        inner.previews.insert(id, rect);
        id
    }

    fn move_preview(&self, preview: PreviewId, rect: Rect) {
        if let Some(r) = self.lock().previews.get_mut(&preview) {
            *r = rect;
        }
    }

    fn remove_preview(&self, preview: PreviewId) {
        self.lock().previews.remove(&preview);
    }

    fn begin_capture(&self) -> CaptureId {
        let mut inner = self.lock();
        let id = CaptureId(inner.next());
        inner.captures.insert(id);
        id
    }

    fn end_capture(&self, capture: CaptureId) {
        self.lock().captures.remove(&capture);
    }
}
