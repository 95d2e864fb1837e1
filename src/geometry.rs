//! Pixel and percent-of-grid coordinate spaces.
//!
//! Pointer events arrive in screen pixels while the document store keeps cell
//! bounds as percentages of the usable grid. Everything that crosses between
//! the two goes through [`GridMetrics`].

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use serde::{Deserialize, Serialize};

use crate::consts::PERCENT;

/// A point in screen space (CSS pixels).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Vector from `origin` to `self`.
    #[must_use]
    pub fn delta_from(self, origin: Point) -> PixelDelta {
        PixelDelta { dx: self.x - origin.x, dy: self.y - origin.y }
    }
}

/// A pointer displacement in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelDelta {
    pub dx: f64,
    pub dy: f64,
}

/// Axis-aligned rectangle in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Same size, shifted by `delta`.
    #[must_use]
    pub fn translated(self, delta: PixelDelta) -> Self {
        Self { x: self.x + delta.dx, y: self.y + delta.dy, ..self }
    }

    /// Apply a per-edge adjustment expressed in pixels.
    #[must_use]
    pub fn adjusted(self, delta: BoundsDelta) -> Self {
        Self {
            x: self.x + delta.x,
            y: self.y + delta.y,
            width: self.width + delta.width,
            height: self.height + delta.height,
        }
    }
}

/// Additive change to each of x, y, width and height.
///
/// The unit is whatever the producer says it is: gestures build these in
/// pixels and convert them with [`GridMetrics::bounds_to_percent`] before
/// touching a cell.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundsDelta {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Dimensions of the usable interaction surface, in pixels.
///
/// Always strictly positive on both axes; [`GridMetrics::new`] refuses
/// anything else so percent math never divides by zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridMetrics {
    width: f64,
    height: f64,
}

impl GridMetrics {
    /// Build metrics from raw dimensions. Returns `None` for non-positive or
    /// non-finite extents.
    #[must_use]
    pub fn new(width: f64, height: f64) -> Option<Self> {
        let usable = |v: f64| v.is_finite() && v > 0.0;
        (usable(width) && usable(height)).then_some(Self { width, height })
    }

    /// Derive metrics from the host container's bounding box, trimming
    /// `inset_px` from each axis.
    #[must_use]
    pub fn from_container(container: Rect, inset_px: f64) -> Option<Self> {
        Self::new(container.width - inset_px, container.height - inset_px)
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Horizontal pixels to percent of grid width.
    #[must_use]
    pub fn x_to_percent(&self, px: f64) -> f64 {
        px / self.width * PERCENT
    }

    /// Vertical pixels to percent of grid height.
    #[must_use]
    pub fn y_to_percent(&self, px: f64) -> f64 {
        px / self.height * PERCENT
    }

    /// Percent of grid width back to horizontal pixels.
    #[must_use]
    pub fn x_to_pixels(&self, pct: f64) -> f64 {
        pct * self.width / PERCENT
    }

    /// Percent of grid height back to vertical pixels.
    #[must_use]
    pub fn y_to_pixels(&self, pct: f64) -> f64 {
        pct * self.height / PERCENT
    }

    /// Convert a pixel-space bounds delta to percent of grid.
    #[must_use]
    pub fn bounds_to_percent(&self, delta: BoundsDelta) -> BoundsDelta {
        BoundsDelta {
            x: self.x_to_percent(delta.x),
            y: self.y_to_percent(delta.y),
            width: self.x_to_percent(delta.width),
            height: self.y_to_percent(delta.height),
        }
    }

    /// Convert a percent-space bounds delta back to pixels.
    #[must_use]
    pub fn bounds_to_pixels(&self, delta: BoundsDelta) -> BoundsDelta {
        BoundsDelta {
            x: self.x_to_pixels(delta.x),
            y: self.y_to_pixels(delta.y),
            width: self.x_to_pixels(delta.width),
            height: self.y_to_pixels(delta.height),
        }
    }
}
