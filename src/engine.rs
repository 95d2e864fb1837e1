//! The sheet editor: one instance per mounted sheet.
//!
//! `SheetEditor` owns every piece of per-instance state (edit-mode gate,
//! selection, grid metrics, the gesture in flight) and the background tasks
//! that keep the object registry and selection markers current. Host input
//! arrives through the `on_*` handlers, which return the [`Action`]s they
//! caused.
//!
//! Handlers that write to the store are async. They move the gesture state
//! back to idle before the first await, so a failed push never leaves a
//! preview on screen or a gesture stuck half-way.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::EditorConfig;
use crate::doc::{ObjectId, SheetProperties};
use crate::geometry::{GridMetrics, Point, Rect};
use crate::gestures::delete::delete_objects;
use crate::gestures::drag::{DragSession, commit_drag};
use crate::gestures::nudge::{NudgeStep, apply_nudge, nudge_for_key};
use crate::gestures::resize::{ResizeAnchor, ResizeSession, commit_resize};
use crate::gestures::select::{apply_click, spawn_marker_task};
use crate::gestures::{PreviewStep, Release};
use crate::input::{InputState, Modifiers};
use crate::mode::{EditModeGate, is_edit_mode};
use crate::registry::{ObjectRegistry, SheetObject, object_at, spawn_registry_task};
use crate::selection::{Selection, SelectionStore};
use crate::store::{DocumentStore, StoreError};
use crate::surface::{NodeRef, Surface};
use crate::sync::RemoteSync;

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SelectionChanged(Vec<ObjectId>),
    PreviewShown(Rect),
    PreviewMoved(Rect),
    PropertiesPushed { id: ObjectId },
    ObjectsDeleted(Vec<ObjectId>),
    GestureCancelled { id: ObjectId },
    EditModeChanged(bool),
}

pub struct SheetEditor {
    config: EditorConfig,
    surface: Arc<dyn Surface>,
    gate: EditModeGate,
    selection: SelectionStore,
    sync: RemoteSync,
    registry: Arc<ObjectRegistry>,
    tasks: Vec<JoinHandle<()>>,
    grid: Option<GridMetrics>,
    input: InputState,
}

impl SheetEditor {
    /// Mount an editor on `store`, rendering into `surface`. `mode` is the
    /// host's navigation mode string. Must be called inside a tokio runtime.
    #[must_use]
    pub fn start(store: Arc<dyn DocumentStore>, surface: Arc<dyn Surface>, mode: &str, config: EditorConfig) -> Self {
        let sync = RemoteSync::start(store);
        let selection = SelectionStore::new();
        let registry = Arc::new(ObjectRegistry::new());
        let tasks = vec![
            spawn_registry_task(
                Arc::clone(&registry),
                sync.subscribe(),
                Arc::clone(&surface),
                config.synthetic_type.clone(),
            ),
            spawn_marker_task(registry.subscribe(), selection.subscribe(), Arc::clone(&surface)),
        ];
        let mut editor = Self {
            config,
            surface,
            gate: EditModeGate::from_mode(mode),
            selection,
            sync,
            registry,
            tasks,
            grid: None,
            input: InputState::Idle,
        };
        editor.on_surface_resized();
        info!(edit_mode = editor.gate.is_open(), "sheet editor started");
        editor
    }

    // --- Mode ---

    /// Apply a host navigation mode string.
    pub fn set_mode(&mut self, mode: &str) -> Vec<Action> {
        self.set_edit_mode(is_edit_mode(mode))
    }

    /// Open or close the edit-mode gate. A change refetches the sheet
    /// properties; closing it also cancels any gesture in flight.
    pub fn set_edit_mode(&mut self, open: bool) -> Vec<Action> {
        if !self.gate.set(open) {
            return Vec::new();
        }
        info!(edit_mode = open, "edit mode changed");
        self.sync.request_refresh();
        let mut actions = vec![Action::EditModeChanged(open)];
        if !open {
            actions.extend(self.cancel_gesture());
        }
        actions
    }

    /// Drop the gesture in flight without committing.
    fn cancel_gesture(&mut self) -> Option<Action> {
        let id = self.input.target()?.to_string();
        self.input = InputState::Idle;
        debug!(object = %id, "gesture cancelled");
        Some(Action::GestureCancelled { id })
    }

    // --- Surface ---

    /// Recompute grid metrics from the container. Call whenever the host
    /// surface resizes.
    pub fn on_surface_resized(&mut self) {
        let inset = self.config.grid_inset_px;
        self.grid = self
            .surface
            .container_rect()
            .and_then(|rect| GridMetrics::from_container(rect, inset));
        debug!(grid = ?self.grid, "grid metrics updated");
    }

    // --- Pointer input ---

    /// Document-wide click.
    pub fn on_click(&mut self, target: NodeRef, modifiers: Modifiers) -> Vec<Action> {
        if !self.gate.is_open() {
            return Vec::new();
        }
        let objects = self.registry.objects();
        if apply_click(&self.selection, &objects, self.surface.as_ref(), target, modifiers.additive()) {
            return vec![self.selection_changed()];
        }
        Vec::new()
    }

    /// Pointer-down on an object's body: arms a drag.
    pub fn on_pointer_down(&mut self, target: NodeRef, pointer: Point) -> Vec<Action> {
        if !self.gate.is_open() || !self.input.is_idle() || self.grid.is_none() {
            return Vec::new();
        }
        let objects = self.registry.objects();
        let Some(object) = object_at(&objects, self.surface.as_ref(), target) else {
            return Vec::new();
        };
        if let Some(session) = DragSession::arm(object, pointer, &self.surface) {
            debug!(object = %object.id, "drag armed");
            self.input = InputState::Dragging(session);
        }
        Vec::new()
    }

    /// Pointer-down on one of an object's resize handles: arms a resize.
    pub fn on_handle_down(&mut self, id: &str, anchor: ResizeAnchor, pointer: Point) -> Vec<Action> {
        if !self.gate.is_open() || !self.input.is_idle() || self.grid.is_none() {
            return Vec::new();
        }
        let objects = self.registry.objects();
        let Some(object) = objects.iter().find(|o| o.id == id) else {
            return Vec::new();
        };
        if let Some(session) = ResizeSession::arm(object, anchor, pointer, &self.surface) {
            debug!(object = %object.id, ?anchor, "resize armed");
            self.input = InputState::Resizing(session);
        }
        Vec::new()
    }

    pub fn on_pointer_move(&mut self, pointer: Point) -> Vec<Action> {
        let step = match &mut self.input {
            InputState::Idle => return Vec::new(),
            InputState::Dragging(session) => session.track(pointer, &self.surface),
            InputState::Resizing(session) => session.track(pointer, &self.surface),
        };
        vec![preview_action(step)]
    }

    /// Pointer release: commits the gesture in flight if the pointer moved.
    ///
    /// # Errors
    ///
    /// Returns the store error if the push fails. The gesture is idle and
    /// its preview removed either way; the selection is left untouched.
    pub async fn on_pointer_up(&mut self, modifiers: Modifiers) -> Result<Vec<Action>, StoreError> {
        match std::mem::take(&mut self.input) {
            InputState::Idle => Ok(Vec::new()),
            InputState::Dragging(session) => match session.finish() {
                Some(release) => self.finish_drag(release, modifiers).await,
                None => Ok(Vec::new()),
            },
            InputState::Resizing(session) => {
                let anchor = session.anchor();
                match session.finish() {
                    Some(release) => self.finish_resize(release, anchor).await,
                    None => Ok(Vec::new()),
                }
            }
        }
    }

    async fn finish_drag(&mut self, release: Release, modifiers: Modifiers) -> Result<Vec<Action>, StoreError> {
        let next = self.grid.and_then(|grid| {
            self.latest_properties()
                .and_then(|props| commit_drag(&props, &release.target, &grid, release.delta))
        });
        let pushed = match next {
            Some(next) => {
                debug!(object = %release.target, dx = release.delta.dx, dy = release.delta.dy, "drag committed");
                Some(self.push(next, release.target.clone()).await?)
            }
            None => None,
        };

        // Selection follows the release only once the commit has landed.
        let mut actions = Vec::new();
        if self.selection.select(&release.target, modifiers.additive()) {
            actions.push(self.selection_changed());
        }
        actions.extend(pushed);
        Ok(actions)
    }

    async fn finish_resize(&mut self, release: Release, anchor: ResizeAnchor) -> Result<Vec<Action>, StoreError> {
        let Some(grid) = self.grid else {
            return Ok(Vec::new());
        };
        let next = self
            .latest_properties()
            .and_then(|props| commit_resize(&props, &release.target, anchor, &grid, release.delta));
        let Some(next) = next else {
            return Ok(Vec::new());
        };
        debug!(object = %release.target, ?anchor, dx = release.delta.dx, dy = release.delta.dy, "resize committed");
        Ok(vec![self.push(next, release.target).await?])
    }

    // --- Keyboard input ---

    /// Key press: the delete key removes the selection, arrows nudge it.
    ///
    /// # Errors
    ///
    /// Returns the store error if a fetch or push fails. The selection is
    /// left as it was.
    pub async fn on_key_down(&mut self, key: &str, modifiers: Modifiers) -> Result<Vec<Action>, StoreError> {
        if !self.gate.is_open() {
            return Ok(Vec::new());
        }
        if key == self.config.delete_key {
            return self.delete_selection().await;
        }
        let Some(grid) = self.grid else {
            return Ok(Vec::new());
        };
        let step = NudgeStep {
            step_px: self.config.nudge_step_px,
            coarse_multiplier: self.config.nudge_coarse_multiplier,
        };
        let Some(nudge) = nudge_for_key(key, modifiers.coarse(), &grid, step) else {
            return Ok(Vec::new());
        };
        let selection = self.selection.snapshot();
        let Some(next) = self.latest_properties().and_then(|props| apply_nudge(&props, &selection, nudge)) else {
            return Ok(Vec::new());
        };
        debug!(key, axis = ?nudge.axis, shift = nudge.shift, selected = selection.len(), "nudge committed");
        let moved: Vec<Action> = next
            .cells
            .iter()
            .filter(|cell| selection.contains(&cell.name))
            .map(|cell| Action::PropertiesPushed { id: cell.name.clone() })
            .collect();
        self.sync.push_properties(next).await?;
        Ok(moved)
    }

    async fn delete_selection(&mut self) -> Result<Vec<Action>, StoreError> {
        let ids = self.selection.snapshot().ids().to_vec();
        let Some(deleted) = delete_objects(&self.sync, &ids).await? else {
            return Ok(Vec::new());
        };
        let mut actions = vec![Action::ObjectsDeleted(deleted.ids.clone())];
        if self.selection.remove_all(&deleted.ids) {
            actions.push(self.selection_changed());
        }
        Ok(actions)
    }

    // --- Lifecycle ---

    /// Tear down: cancel any gesture, clear the selection, unbind from the
    /// store, and stop every background task. Idempotent.
    pub fn destroy(&mut self) {
        self.input = InputState::Idle;
        self.selection.clear();
        self.sync.shutdown();
        if self.tasks.is_empty() {
            return;
        }
        for task in self.tasks.drain(..) {
            task.abort();
        }
        info!("sheet editor destroyed");
    }

    // --- Queries ---

    #[must_use]
    pub fn is_edit_mode(&self) -> bool {
        self.gate.is_open()
    }

    #[must_use]
    pub fn selection(&self) -> Selection {
        self.selection.snapshot()
    }

    #[must_use]
    pub fn objects(&self) -> Arc<Vec<SheetObject>> {
        self.registry.objects()
    }

    #[must_use]
    pub fn registry(&self) -> &ObjectRegistry {
        &self.registry
    }

    #[must_use]
    pub fn latest_properties(&self) -> Option<Arc<SheetProperties>> {
        self.sync.latest()
    }

    #[must_use]
    pub fn grid(&self) -> Option<GridMetrics> {
        self.grid
    }

    #[must_use]
    pub fn input(&self) -> &InputState {
        &self.input
    }

    #[must_use]
    pub fn sync(&self) -> &RemoteSync {
        &self.sync
    }

    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    // --- Helpers ---

    fn selection_changed(&self) -> Action {
        Action::SelectionChanged(self.selection.snapshot().ids().to_vec())
    }

    async fn push(&self, next: SheetProperties, id: ObjectId) -> Result<Action, StoreError> {
        self.sync.push_properties(next).await?;
        Ok(Action::PropertiesPushed { id })
    }
}

impl Drop for SheetEditor {
    fn drop(&mut self) {
        self.destroy();
    }
}

fn preview_action(step: PreviewStep) -> Action {
    if step.created { Action::PreviewShown(step.rect) } else { Action::PreviewMoved(step.rect) }
}
