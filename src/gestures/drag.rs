//! Drag gesture: move one object by the pointer delta.
//!
//! idle → armed (pointer-down on a non-synthetic object) → moving (first
//! move) → idle (pointer-up). Only a session that moved commits.

#[cfg(test)]
#[path = "drag_test.rs"]
mod drag_test;

use std::sync::Arc;

use crate::doc::{CellPatch, SheetProperties};
use crate::geometry::{BoundsDelta, GridMetrics, PixelDelta, Point, Rect};
use crate::registry::SheetObject;
use crate::surface::Surface;

use super::{PointerSession, PreviewStep, Release};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    Armed,
    Moving,
}

#[derive(Debug)]
pub struct DragSession {
    session: PointerSession,
}

impl DragSession {
    /// Arm a drag. `None` for synthetic objects and dead handles.
    pub fn arm(object: &SheetObject, pointer: Point, surface: &Arc<dyn Surface>) -> Option<Self> {
        PointerSession::arm(object, pointer, surface).map(|session| Self { session })
    }

    #[must_use]
    pub fn target(&self) -> &str {
        self.session.target()
    }

    #[must_use]
    pub fn phase(&self) -> DragPhase {
        if self.session.has_moved() { DragPhase::Moving } else { DragPhase::Armed }
    }

    /// Follow the pointer with the preview; the object itself stays put.
    pub fn track(&mut self, pointer: Point, surface: &Arc<dyn Surface>) -> PreviewStep {
        self.session.track(pointer, surface, Rect::translated)
    }

    #[must_use]
    pub fn finish(self) -> Option<Release> {
        self.session.finish()
    }
}

/// Properties after moving `target` by `delta` pixels.
///
/// The cell is shifted in percent space, loses its grid-snap hints, and
/// moves to the end of the list so it renders on top. Returns `None` if the
/// cell is gone from `props`.
#[must_use]
pub fn commit_drag(
    props: &SheetProperties,
    target: &str,
    grid: &GridMetrics,
    delta: PixelDelta,
) -> Option<SheetProperties> {
    let cell = props.cell(target)?;
    let shift = grid.bounds_to_percent(BoundsDelta { x: delta.dx, y: delta.dy, ..BoundsDelta::default() });
    let patch = CellPatch::free_form(cell.bounds.offset(shift));

    let mut next = props.clone();
    next.patch_cell(target, &patch);
    next.bring_to_front(target);
    Some(next)
}
