//! Gesture logic: select, drag, resize, nudge, delete.
//!
//! Each gesture is split into the part that talks to the surface (sessions,
//! preview boxes, capture) and a pure commit function that takes the latest
//! sheet properties and returns the properties to push. The engine owns the
//! sessions and decides when to call the commit functions.

pub mod delete;
pub mod drag;
pub mod nudge;
pub mod resize;
pub mod select;


use std::sync::Arc;

use tracing::debug;

use crate::doc::ObjectId;
use crate::geometry::{PixelDelta, Point, Rect};
use crate::registry::SheetObject;
use crate::surface::{CaptureGuard, PreviewGuard, Surface};

/// Preview box placement after a pointer move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewStep {
    pub rect: Rect,
    /// True when this move materialized the preview.
    pub created: bool,
}

/// What a pointer gesture leaves behind on release.
#[derive(Debug, Clone, PartialEq)]
pub struct Release {
    pub target: ObjectId,
    /// Pointer delta of the last move in the session.
    pub delta: PixelDelta,
}

/// Pointer-driven session shared by drag and resize.
///
/// Holds the capture from arm until release. The preview appears on the
/// first move; before that the session is only armed and releasing it is a
/// plain click.
#[derive(Debug)]
pub struct PointerSession {
    target: ObjectId,
    start_pointer: Point,
    start_rect: Rect,
    last_delta: PixelDelta,
    preview: Option<PreviewGuard>,
    capture: CaptureGuard,
}

impl PointerSession {
    /// Arm on `object`. Returns `None` for synthetic objects and dead handles.
    pub fn arm(object: &SheetObject, pointer: Point, surface: &Arc<dyn Surface>) -> Option<Self> {
        if object.is_synthetic() {
            return None;
        }
        let start_rect = surface.bounding_rect(object.element?)?;
        Some(Self {
            target: object.id.clone(),
            start_pointer: pointer,
            start_rect,
            last_delta: PixelDelta::default(),
            preview: None,
            capture: CaptureGuard::begin(surface),
        })
    }

    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    #[must_use]
    pub fn start_rect(&self) -> Rect {
        self.start_rect
    }

    /// Whether any move has been seen since arming.
    #[must_use]
    pub fn has_moved(&self) -> bool {
        self.preview.is_some()
    }

    /// Record a move and place the preview at `shape(start_rect, delta)`.
    pub fn track(
        &mut self,
        pointer: Point,
        surface: &Arc<dyn Surface>,
        shape: impl Fn(Rect, PixelDelta) -> Rect,
    ) -> PreviewStep {
        self.last_delta = pointer.delta_from(self.start_pointer);
        let rect = shape(self.start_rect, self.last_delta);
        let created = match &self.preview {
            Some(preview) => {
                preview.move_to(rect);
                false
            }
            None => {
                let preview = PreviewGuard::show(surface, self.start_rect);
                preview.move_to(rect);
                self.preview = Some(preview);
                true
            }
        };
        PreviewStep { rect, created }
    }

    /// Remove the preview and release the capture. Returns `None` if the
    /// pointer never moved.
    #[must_use]
    pub fn finish(self) -> Option<Release> {
        let Self { target, last_delta, preview, capture, .. } = self;
        let moved = preview.is_some();
        drop(preview);
        capture.release();
        if !moved {
            debug!(object = %target, "pointer released without moving");
            return None;
        }
        Some(Release { target, delta: last_delta })
    }
}
