//! Document model: cells, sheet properties, and the full property tree.
//!
//! These mirror what the remote document store hands out. `SheetProperties`
//! is the shallow view (the ordered `cells` list plus opaque fields);
//! `PropertyTree` is the hierarchical view that also carries one child node
//! per object definition. Fields this crate does not understand are kept in
//! flattened maps so a read-modify-write never drops them.
//!
//! Gestures never poke at cell fields directly. They build a [`CellPatch`]
//! and hand it to [`SheetProperties::patch_cell`], which is the single place
//! that knows free-form bounds must clear the grid-snap hints.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::geometry::BoundsDelta;

/// Identifier of a sheet object; equals `Cell::name` and the child node's `qId`.
pub type ObjectId = String;

/// Cell geometry in percent-of-grid units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Add a percent-space delta to every axis.
    #[must_use]
    pub fn offset(self, delta: BoundsDelta) -> Self {
        Self {
            x: self.x + delta.x,
            y: self.y + delta.y,
            width: self.width + delta.width,
            height: self.height + delta.height,
        }
    }
}

/// The store's geometry record for one object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub name: ObjectId,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub bounds: Bounds,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub col: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colspan: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rowspan: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Cell {
    /// A plain cell with no snap hints and no extra fields.
    #[must_use]
    pub fn new(name: impl Into<ObjectId>, bounds: Bounds) -> Self {
        Self {
            name: name.into(),
            kind: None,
            bounds,
            col: None,
            row: None,
            colspan: None,
            rowspan: None,
            extra: Map::new(),
        }
    }

    /// Whether any of col/row/colspan/rowspan is set.
    #[must_use]
    pub fn has_snap_hints(&self) -> bool {
        self.col.is_some() || self.row.is_some() || self.colspan.is_some() || self.rowspan.is_some()
    }

    /// Unset col/row/colspan/rowspan.
    pub fn clear_snap_hints(&mut self) {
        self.col = None;
        self.row = None;
        self.colspan = None;
        self.rowspan = None;
    }

    /// Apply a patch in place.
    pub fn apply(&mut self, patch: &CellPatch) {
        self.bounds = patch.bounds;
        if patch.clear_snap_hints {
            self.clear_snap_hints();
        }
    }
}

/// Replacement geometry for a single cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellPatch {
    pub bounds: Bounds,
    pub clear_snap_hints: bool,
}

impl CellPatch {
    /// A free-form move/resize: new bounds, snap hints cleared so the store
    /// does not re-snap the object to a coarse grid cell.
    #[must_use]
    pub fn free_form(bounds: Bounds) -> Self {
        Self { bounds, clear_snap_hints: true }
    }
}

/// Shallow sheet properties: the ordered cell list plus opaque fields.
///
/// Order of `cells` is stacking order; later entries render on top.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SheetProperties {
    #[serde(default)]
    pub cells: Vec<Cell>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SheetProperties {
    #[must_use]
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells, extra: Map::new() }
    }

    /// Look up a cell by object id.
    #[must_use]
    pub fn cell(&self, name: &str) -> Option<&Cell> {
        self.cells.iter().find(|c| c.name == name)
    }

    /// Position of a cell in stacking order.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.cells.iter().position(|c| c.name == name)
    }

    /// Patch one cell. Returns false if no cell has that name.
    pub fn patch_cell(&mut self, name: &str, patch: &CellPatch) -> bool {
        let Some(cell) = self.cells.iter_mut().find(|c| c.name == name) else {
            return false;
        };
        cell.apply(patch);
        true
    }

    /// Move a cell to the end of the list so it renders on top. Returns
    /// false if no cell has that name.
    pub fn bring_to_front(&mut self, name: &str) -> bool {
        let Some(index) = self.position(name) else {
            return false;
        };
        let cell = self.cells.remove(index);
        self.cells.push(cell);
        true
    }

    /// Whether any cell carries the given `type`.
    #[must_use]
    pub fn has_cell_of_kind(&self, kind: &str) -> bool {
        self.cells.iter().any(|c| c.kind.as_deref() == Some(kind))
    }

    /// Drop every cell whose name is in `ids`. Returns how many were removed.
    pub fn remove_cells(&mut self, ids: &[ObjectId]) -> usize {
        let before = self.cells.len();
        self.cells.retain(|c| !ids.contains(&c.name));
        before - self.cells.len()
    }
}

/// `qInfo` block identifying a child node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ObjectInfo {
    #[serde(rename = "qId")]
    pub id: ObjectId,
    #[serde(rename = "qType", default)]
    pub kind: String,
}

/// The `qProperty` block of a child node. Only `qInfo` is interpreted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChildProperty {
    #[serde(rename = "qInfo")]
    pub info: ObjectInfo,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One object definition inside the property tree.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChildNode {
    #[serde(rename = "qProperty")]
    pub property: ChildProperty,
    #[serde(rename = "qChildren", default)]
    pub children: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChildNode {
    /// A bare child node with the given identity.
    #[must_use]
    pub fn new(id: impl Into<ObjectId>, kind: impl Into<String>) -> Self {
        Self {
            property: ChildProperty {
                info: ObjectInfo { id: id.into(), kind: kind.into() },
                extra: Map::new(),
            },
            children: Vec::new(),
            extra: Map::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.property.info.id
    }
}

/// Hierarchical view of a sheet: its own properties plus child definitions.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PropertyTree {
    #[serde(rename = "qProperty")]
    pub property: SheetProperties,
    #[serde(rename = "qChildren", default)]
    pub children: Vec<ChildNode>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PropertyTree {
    #[must_use]
    pub fn new(property: SheetProperties, children: Vec<ChildNode>) -> Self {
        Self { property, children, extra: Map::new() }
    }

    /// Remove every child node and every cell whose id is in `ids`.
    ///
    /// Returns `(children_removed, cells_removed)`.
    pub fn remove_objects(&mut self, ids: &[ObjectId]) -> (usize, usize) {
        let before = self.children.len();
        self.children.retain(|child| !ids.iter().any(|id| id == child.id()));
        let children_removed = before - self.children.len();
        let cells_removed = self.property.remove_cells(ids);
        (children_removed, cells_removed)
    }
}
