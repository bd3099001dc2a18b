// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! Pure clamp and deformation rules for dragging and resizing elements
//! against the canvas boundaries. Every function here is deterministic and
//! side-effect free, so the interaction controller can call them on every
//! pointer move.

use serde::{Deserialize, Serialize};

/// Smallest width or height an element may be resized to, in canvas pixels.
pub const MIN_ELEMENT_SIZE: f64 = 20.0;

/// Canvas extent used as the clamping region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// A 2D point in canvas pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle described by its top-left corner and size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Inclusive containment test.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }
}

/// Clamp a size so each dimension lies in `[MIN_ELEMENT_SIZE, canvas dimension]`.
pub fn clamp_size(width: f64, height: f64, bounds: Bounds) -> (f64, f64) {
    (
        clamp_dimension(width, bounds.width),
        clamp_dimension(height, bounds.height),
    )
}

fn clamp_dimension(value: f64, limit: f64) -> f64 {
    let value = if value.is_finite() { value } else { MIN_ELEMENT_SIZE };
    // A canvas smaller than the minimum still gets the minimum.
    value.min(limit).max(MIN_ELEMENT_SIZE)
}

fn clamp_origin(value: f64, size: f64, limit: f64) -> f64 {
    let value = if value.is_finite() { value } else { 0.0 };
    value.min(limit - size).max(0.0)
}

/// The general clamp: keeps the rectangle fully on the canvas with both
/// dimensions at least `MIN_ELEMENT_SIZE`.
pub fn clamp_rect(rect: Rect, bounds: Bounds) -> Rect {
    let (width, height) = clamp_size(rect.width, rect.height, bounds);
    Rect {
        x: clamp_origin(rect.x, width, bounds.width),
        y: clamp_origin(rect.y, height, bounds.height),
        width,
        height,
    }
}

/// Move `rect` to a proposed origin, keeping its size.
pub fn drag_to(rect: Rect, x: f64, y: f64, bounds: Bounds) -> Rect {
    clamp_rect(Rect { x, y, ..rect }, bounds)
}

/// Scale `(width, height)` down, preserving aspect ratio, until it fits in
/// `(max_width, max_height)`. Sizes that already fit are returned unchanged.
pub fn fit_within(width: f64, height: f64, max_width: f64, max_height: f64) -> (f64, f64) {
    if width <= 0.0 || height <= 0.0 {
        return (width, height);
    }
    let ratio = (max_width / width).min(max_height / height);
    if ratio >= 1.0 {
        (width, height)
    } else {
        (width * ratio, height * ratio)
    }
}

/// One of the eight resize handles on a selected element's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeHandle {
    N,
    S,
    E,
    W,
    NE,
    NW,
    SE,
    SW,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 8] = [
        ResizeHandle::NW,
        ResizeHandle::NE,
        ResizeHandle::SE,
        ResizeHandle::SW,
        ResizeHandle::N,
        ResizeHandle::E,
        ResizeHandle::S,
        ResizeHandle::W,
    ];

    /// Whether the handle moves the left edge.
    fn moves_left(self) -> bool {
        matches!(self, ResizeHandle::W | ResizeHandle::NW | ResizeHandle::SW)
    }

    /// Whether the handle moves the right edge.
    fn moves_right(self) -> bool {
        matches!(self, ResizeHandle::E | ResizeHandle::NE | ResizeHandle::SE)
    }

    /// Whether the handle moves the top edge.
    fn moves_top(self) -> bool {
        matches!(self, ResizeHandle::N | ResizeHandle::NW | ResizeHandle::NE)
    }

    /// Whether the handle moves the bottom edge.
    fn moves_bottom(self) -> bool {
        matches!(self, ResizeHandle::S | ResizeHandle::SW | ResizeHandle::SE)
    }

    /// Anchor point of this handle on `rect`.
    pub fn position(self, rect: &Rect) -> Point {
        let cx = rect.x + rect.width / 2.0;
        let cy = rect.y + rect.height / 2.0;
        match self {
            ResizeHandle::N => Point::new(cx, rect.y),
            ResizeHandle::S => Point::new(cx, rect.bottom()),
            ResizeHandle::E => Point::new(rect.right(), cy),
            ResizeHandle::W => Point::new(rect.x, cy),
            ResizeHandle::NE => Point::new(rect.right(), rect.y),
            ResizeHandle::NW => Point::new(rect.x, rect.y),
            ResizeHandle::SE => Point::new(rect.right(), rect.bottom()),
            ResizeHandle::SW => Point::new(rect.x, rect.bottom()),
        }
    }
}

/// Find the handle of `rect` within `radius` of `point`. Corners win over
/// edges when they overlap on small elements.
pub fn handle_at(rect: &Rect, point: Point, radius: f64) -> Option<ResizeHandle> {
    ResizeHandle::ALL.into_iter().find(|handle| {
        let anchor = handle.position(rect);
        (anchor.x - point.x).abs() <= radius && (anchor.y - point.y).abs() <= radius
    })
}

/// Deform `original` by dragging `handle` by `(dx, dy)`.
///
/// Start-side edges (north, west) keep the opposite edge fixed by moving the
/// origin to `originalOrigin + (originalSize - newSize)`. The minimum size is
/// enforced before the origin is recomputed, and the general clamp is
/// reapplied at the end.
pub fn resize(original: Rect, handle: ResizeHandle, dx: f64, dy: f64, bounds: Bounds) -> Rect {
    let mut rect = original;

    if handle.moves_right() {
        let max_width = bounds.width - original.x;
        rect.width = (original.width + dx).min(max_width).max(MIN_ELEMENT_SIZE);
    } else if handle.moves_left() {
        let max_width = original.right();
        rect.width = (original.width - dx).min(max_width).max(MIN_ELEMENT_SIZE);
        rect.x = original.x + (original.width - rect.width);
    }

    if handle.moves_bottom() {
        let max_height = bounds.height - original.y;
        rect.height = (original.height + dy).min(max_height).max(MIN_ELEMENT_SIZE);
    } else if handle.moves_top() {
        let max_height = original.bottom();
        rect.height = (original.height - dy).min(max_height).max(MIN_ELEMENT_SIZE);
        rect.y = original.y + (original.height - rect.height);
    }

    clamp_rect(rect, bounds)
}
