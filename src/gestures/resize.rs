//! Resize gesture: drag one of eight handles to change an object's bounds.

#[cfg(test)]
#[path = "resize_test.rs"]
mod resize_test;

use std::sync::Arc;

use serde::Deserialize;

use crate::doc::{CellPatch, SheetProperties};
use crate::geometry::{BoundsDelta, GridMetrics, PixelDelta, Point};
use crate::registry::SheetObject;
use crate::surface::Surface;

use super::{PointerSession, PreviewStep, Release};

/// Anchor position for resize handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ResizeAnchor {
    #[serde(rename = "top")]
    N,
    #[serde(rename = "top-right")]
    Ne,
    #[serde(rename = "right")]
    E,
    #[serde(rename = "bottom-right")]
    Se,
    #[serde(rename = "bottom")]
    S,
    #[serde(rename = "bottom-left")]
    Sw,
    #[serde(rename = "left")]
    W,
    #[serde(rename = "top-left")]
    Nw,
}

impl ResizeAnchor {
    pub const ALL: [Self; 8] = [Self::N, Self::Ne, Self::E, Self::Se, Self::S, Self::Sw, Self::W, Self::Nw];

    fn moves_left_edge(self) -> bool {
        matches!(self, Self::W | Self::Nw | Self::Sw)
    }

    fn moves_right_edge(self) -> bool {
        matches!(self, Self::E | Self::Ne | Self::Se)
    }

    fn moves_top_edge(self) -> bool {
        matches!(self, Self::N | Self::Nw | Self::Ne)
    }

    fn moves_bottom_edge(self) -> bool {
        matches!(self, Self::S | Self::Sw | Self::Se)
    }

    /// Constrain a raw pointer delta to the axes this handle controls.
    ///
    /// Left edges move x and shrink width as the pointer moves right; top
    /// edges do the same for y and height. Right and bottom edges only grow.
    #[must_use]
    pub fn constrain(self, delta: PixelDelta) -> BoundsDelta {
        let mut out = BoundsDelta::default();
        if self.moves_left_edge() {
            out.x = delta.dx;
            out.width = -delta.dx;
        } else if self.moves_right_edge() {
            out.width = delta.dx;
        }
        if self.moves_top_edge() {
            out.y = delta.dy;
            out.height = -delta.dy;
        } else if self.moves_bottom_edge() {
            out.height = delta.dy;
        }
        out
    }
}

#[derive(Debug)]
pub struct ResizeSession {
    session: PointerSession,
    anchor: ResizeAnchor,
}

impl ResizeSession {
    /// Arm a resize from `anchor`. `None` for synthetic objects and dead handles.
    pub fn arm(
        object: &SheetObject,
        anchor: ResizeAnchor,
        pointer: Point,
        surface: &Arc<dyn Surface>,
    ) -> Option<Self> {
        PointerSession::arm(object, pointer, surface).map(|session| Self { session, anchor })
    }

    #[must_use]
    pub fn target(&self) -> &str {
        self.session.target()
    }

    #[must_use]
    pub fn anchor(&self) -> ResizeAnchor {
        self.anchor
    }

    /// Preview is the start rectangle adjusted by the constrained delta.
    pub fn track(&mut self, pointer: Point, surface: &Arc<dyn Surface>) -> PreviewStep {
        let anchor = self.anchor;
        self.session.track(pointer, surface, |start, delta| start.adjusted(anchor.constrain(delta)))
    }

    #[must_use]
    pub fn finish(self) -> Option<Release> {
        self.session.finish()
    }
}

/// Properties after resizing `target` from `anchor` by `delta` pixels.
///
/// Snap hints are cleared; stacking order is left alone. Returns `None` if
/// the cell is gone from `props`.
#[must_use]
pub fn commit_resize(
    props: &SheetProperties,
    target: &str,
    anchor: ResizeAnchor,
    grid: &GridMetrics,
    delta: PixelDelta,
) -> Option<SheetProperties> {
    let cell = props.cell(target)?;
    let change = grid.bounds_to_percent(anchor.constrain(delta));
    let patch = CellPatch::free_form(cell.bounds.offset(change));

    let mut next = props.clone();
    next.patch_cell(target, &patch);
    Some(next)
}
