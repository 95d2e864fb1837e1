//! Nudge gesture: arrow keys shift the selected objects by one pixel, or by
//! a coarse multiple of it with Shift held.

#[cfg(test)]
#[path = "nudge_test.rs"]
mod nudge_test;

use crate::doc::{CellPatch, SheetProperties};
use crate::geometry::GridMetrics;
use crate::selection::Selection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// A signed one-axis shift in percent of grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nudge {
    pub axis: Axis,
    pub shift: f64,
}

/// Step sizes for nudging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NudgeStep {
    pub step_px: f64,
    pub coarse_multiplier: f64,
}

/// Map an arrow key to a nudge. `None` for every other key.
#[must_use]
pub fn nudge_for_key(key: &str, coarse: bool, grid: &GridMetrics, step: NudgeStep) -> Option<Nudge> {
    let (axis, sign) = match key {
        "ArrowLeft" => (Axis::X, -1.0),
        "ArrowRight" => (Axis::X, 1.0),
        "ArrowUp" => (Axis::Y, -1.0),
        "ArrowDown" => (Axis::Y, 1.0),
        _ => return None,
    };
    let px = if coarse { step.step_px * step.coarse_multiplier } else { step.step_px };
    let magnitude = match axis {
        Axis::X => grid.x_to_percent(px),
        Axis::Y => grid.y_to_percent(px),
    };
    Some(Nudge { axis, shift: sign * magnitude })
}

/// Properties after applying `nudge` to every selected cell.
///
/// Only the nudged axis changes; touched cells lose their snap hints and
/// unselected cells pass through as they are. Returns `None` when no
/// selected cell exists in `props`.
#[must_use]
pub fn apply_nudge(props: &SheetProperties, selection: &Selection, nudge: Nudge) -> Option<SheetProperties> {
    let mut next = props.clone();
    let mut touched = 0_usize;
    for cell in next.cells.iter_mut().filter(|c| selection.contains(&c.name)) {
        let mut bounds = cell.bounds;
        match nudge.axis {
            Axis::X => bounds.x += nudge.shift,
            Axis::Y => bounds.y += nudge.shift,
        }
        cell.apply(&CellPatch::free_form(bounds));
        touched += 1;
    }
    (touched > 0).then_some(next)
}
