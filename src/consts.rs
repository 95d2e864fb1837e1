//! Shared numeric and naming constants for the sheet editor.

// ── Grid ────────────────────────────────────────────────────────

/// Pixels trimmed from each axis of the host container before percent math.
pub const GRID_INSET_PX: f64 = 4.0;

/// Percent scale: cell bounds are stored as percentages of the grid.
pub const PERCENT: f64 = 100.0;

// ── Nudge ───────────────────────────────────────────────────────

/// Base nudge step in screen pixels.
pub const NUDGE_STEP_PX: f64 = 1.0;

/// Multiplier applied to the nudge step while the coarse modifier is held.
pub const NUDGE_COARSE_MULTIPLIER: f64 = 10.0;

// ── Keys ────────────────────────────────────────────────────────

/// Default key that deletes the current selection.
pub const DELETE_KEY: &str = "Delete";

// ── Synthetic panel ─────────────────────────────────────────────

/// Cell `type` marking the editor's own injected panel.
pub const SYNTHETIC_TYPE: &str = "sheet-editor";

/// Default synthetic panel width, in percent of the grid.
pub const SYNTHETIC_WIDTH_PCT: f64 = 50.0;

/// Default synthetic panel height, in percent of the grid (two of twelve rows).
pub const SYNTHETIC_HEIGHT_PCT: f64 = 100.0 / 6.0;

/// Grid-snap column span of a freshly installed synthetic panel.
pub const SYNTHETIC_COLSPAN: i64 = 12;

/// Grid-snap row span of a freshly installed synthetic panel.
pub const SYNTHETIC_ROWSPAN: i64 = 2;
