//! Headless replay of recorded input against an in-memory sheet.
//!
//! A script names a grid container, a navigation mode, a starting property
//! tree, and a list of input events. The replay mounts a [`SheetEditor`] on
//! a [`MemoryStore`] and a [`HeadlessSurface`], feeds it the events in
//! order, and hands back the resulting tree. Store failures during the
//! replay are logged and the replay carries on, the way a host would.

#[cfg(test)]
#[path = "replay_test.rs"]
mod replay_test;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::EditorConfig;
use crate::doc::{ObjectId, PropertyTree};
use crate::engine::{Action, SheetEditor};
use crate::geometry::{GridMetrics, Point, Rect};
use crate::gestures::resize::ResizeAnchor;
use crate::headless::HeadlessSurface;
use crate::input::Modifiers;
use crate::memory_store::MemoryStore;
use crate::store::{DocumentStore, StoreError};
use crate::surface::Surface;

/// Scheduling ticks granted to background tasks between events.
const SETTLE_TICKS: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid replay script: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("event {index} targets `{id}`, which has no element")]
    UnknownTarget { index: usize, id: ObjectId },
}

impl ReplayError {
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "E_REPLAY_IO",
            Self::Parse(_) => "E_REPLAY_PARSE",
            Self::UnknownTarget { .. } => "E_REPLAY_UNKNOWN_TARGET",
        }
    }
}

/// A recorded session.
#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    /// Bounding box of the grid container, in pixels.
    pub grid: Rect,
    #[serde(default = "default_mode")]
    pub mode: String,
    pub tree: PropertyTree,
    /// Rendered element per object id. Derived from cell bounds when absent.
    #[serde(default)]
    pub elements: Option<BTreeMap<ObjectId, Rect>>,
    #[serde(default)]
    pub events: Vec<Event>,
}

fn default_mode() -> String {
    "edit".to_string()
}

/// One recorded input.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Click on an object, or on empty space when `target` is absent.
    Click {
        #[serde(default)]
        target: Option<ObjectId>,
        #[serde(default)]
        modifiers: Modifiers,
    },
    PointerDown {
        target: ObjectId,
        x: f64,
        y: f64,
    },
    HandleDown {
        target: ObjectId,
        handle: ResizeAnchor,
        x: f64,
        y: f64,
    },
    PointerMove {
        x: f64,
        y: f64,
    },
    PointerUp {
        #[serde(default)]
        modifiers: Modifiers,
    },
    KeyDown {
        key: String,
        #[serde(default)]
        modifiers: Modifiers,
    },
    SetMode {
        mode: String,
    },
    /// The host container changed size.
    Resize {
        container: Rect,
    },
    /// Another client rewrote the sheet.
    Remote {
        tree: PropertyTree,
    },
}

/// Result of a replay.
#[derive(Debug)]
pub struct Outcome {
    pub tree: PropertyTree,
    pub selection: Vec<ObjectId>,
    pub actions: Vec<Action>,
    /// Store failures hit along the way.
    pub failures: Vec<StoreError>,
}

/// Read and parse a script file.
///
/// # Errors
///
/// Returns [`ReplayError::Io`] if the file cannot be read and
/// [`ReplayError::Parse`] if it is not a valid script.
pub fn load_script(path: &Path) -> Result<Script, ReplayError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ReplayError::Io { path: path.to_path_buf(), source })?;
    Ok(serde_json::from_str(&raw)?)
}

/// Element rectangles laid out from cell bounds on `container`.
fn derived_elements(tree: &PropertyTree, container: Rect, inset_px: f64) -> BTreeMap<ObjectId, Rect> {
    let Some(grid) = GridMetrics::from_container(container, inset_px) else {
        return BTreeMap::new();
    };
    tree.property
        .cells
        .iter()
        .map(|cell| {
            let b = cell.bounds;
            let rect = Rect::new(
                container.x + grid.x_to_pixels(b.x),
                container.y + grid.y_to_pixels(b.y),
                grid.x_to_pixels(b.width),
                grid.y_to_pixels(b.height),
            );
            (cell.name.clone(), rect)
        })
        .collect()
}

async fn settle() {
    for _ in 0..SETTLE_TICKS {
        tokio::task::yield_now().await;
    }
}

/// Run `script` to completion. Must be called inside a tokio runtime.
///
/// # Errors
///
/// Returns [`ReplayError::UnknownTarget`] if an event names an object with
/// no element. Store failures do not abort the replay; they are collected
/// in [`Outcome::failures`].
pub async fn run(script: Script, config: EditorConfig) -> Result<Outcome, ReplayError> {
    let elements = script
        .elements
        .clone()
        .unwrap_or_else(|| derived_elements(&script.tree, script.grid, config.grid_inset_px));

    let store = Arc::new(MemoryStore::new(script.tree));
    let surface = Arc::new(HeadlessSurface::new(script.grid));
    for (id, rect) in &elements {
        surface.add_element(id, *rect);
    }

    let mut editor = SheetEditor::start(
        Arc::clone(&store) as Arc<dyn DocumentStore>,
        Arc::clone(&surface) as Arc<dyn Surface>,
        &script.mode,
        config,
    );
    settle().await;

    let mut actions = Vec::new();
    let mut failures = Vec::new();
    for (index, event) in script.events.into_iter().enumerate() {
        debug!(index, ?event, "replaying event");
        let node = |id: &ObjectId| {
            surface
                .node_in(id)
                .ok_or_else(|| ReplayError::UnknownTarget { index, id: id.clone() })
        };
        let step = match event {
            Event::Click { target, modifiers } => {
                let target = match &target {
                    Some(id) => node(id)?,
                    None => surface.background_node(),
                };
                Ok(editor.on_click(target, modifiers))
            }
            Event::PointerDown { target, x, y } => Ok(editor.on_pointer_down(node(&target)?, Point::new(x, y))),
            Event::HandleDown { target, handle, x, y } => Ok(editor.on_handle_down(&target, handle, Point::new(x, y))),
            Event::PointerMove { x, y } => Ok(editor.on_pointer_move(Point::new(x, y))),
            Event::PointerUp { modifiers } => editor.on_pointer_up(modifiers).await,
            Event::KeyDown { key, modifiers } => editor.on_key_down(&key, modifiers).await,
            Event::SetMode { mode } => Ok(editor.set_mode(&mode)),
            Event::Resize { container } => {
                surface.set_container(container);
                editor.on_surface_resized();
                Ok(Vec::new())
            }
            Event::Remote { tree } => {
                store.replace_tree(tree);
                Ok(Vec::new())
            }
        };
        match step {
            Ok(produced) => actions.extend(produced),
            Err(e) => {
                warn!(index, error = %e, code = e.error_code(), "replayed event failed");
                failures.push(e);
            }
        }
        settle().await;
    }

    let selection = editor.selection().ids().to_vec();
    editor.destroy();
    info!(actions = actions.len(), failures = failures.len(), "replay finished");
    Ok(Outcome { tree: store.snapshot(), selection, actions, failures })
}
