//! Editor configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use crate::consts::{DELETE_KEY, GRID_INSET_PX, NUDGE_COARSE_MULTIPLIER, NUDGE_STEP_PX, SYNTHETIC_TYPE};

#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    /// Pixels trimmed from each axis of the grid container.
    pub grid_inset_px: f64,
    /// Fine nudge step in pixels.
    pub nudge_step_px: f64,
    /// Multiplier applied to the nudge step while Shift is held.
    pub nudge_coarse_multiplier: f64,
    /// Key that deletes the selection.
    pub delete_key: String,
    /// Cell `type` of system-injected panels.
    pub synthetic_type: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            grid_inset_px: GRID_INSET_PX,
            nudge_step_px: NUDGE_STEP_PX,
            nudge_coarse_multiplier: NUDGE_COARSE_MULTIPLIER,
            delete_key: DELETE_KEY.to_string(),
            synthetic_type: SYNTHETIC_TYPE.to_string(),
        }
    }
}

impl EditorConfig {
    /// Build config from environment variables, falling back to defaults.
    ///
    /// Optional:
    /// - `SHEET_EDITOR_GRID_INSET_PX`: default 4
    /// - `SHEET_EDITOR_NUDGE_STEP_PX`: default 1
    /// - `SHEET_EDITOR_NUDGE_COARSE_MULTIPLIER`: default 10
    /// - `SHEET_EDITOR_DELETE_KEY`: default `Delete`
    /// - `SHEET_EDITOR_SYNTHETIC_TYPE`: default `sheet-editor`
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| match std::env::var(key) {
            Ok(value) => Some(value),
            Err(_) => None,
        })
    }

    /// Build config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            grid_inset_px: parse_or(&lookup, "SHEET_EDITOR_GRID_INSET_PX", defaults.grid_inset_px),
            nudge_step_px: parse_or(&lookup, "SHEET_EDITOR_NUDGE_STEP_PX", defaults.nudge_step_px),
            nudge_coarse_multiplier: parse_or(
                &lookup,
                "SHEET_EDITOR_NUDGE_COARSE_MULTIPLIER",
                defaults.nudge_coarse_multiplier,
            ),
            delete_key: non_empty_or(&lookup, "SHEET_EDITOR_DELETE_KEY", defaults.delete_key),
            synthetic_type: non_empty_or(&lookup, "SHEET_EDITOR_SYNTHETIC_TYPE", defaults.synthetic_type),
        }
    }
}

fn parse_or<F>(lookup: &F, key: &str, default: f64) -> f64
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).map(|raw| raw.trim().parse::<f64>()) {
        Some(Ok(v)) if v.is_finite() => v,
        _ => default,
    }
}

fn non_empty_or<F>(lookup: &F, key: &str, default: String) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|v| !v.trim().is_empty()).unwrap_or(default)
}
