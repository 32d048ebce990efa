//! Axis-aligned geometry shared by hit-testing, movement and rendering.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle expressed in world units.
///
/// Edges follow half-open semantics: a rectangle covers `left..right` and
/// `top..bottom`, so two rectangles that merely share an edge do not collide.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

impl Rect {
    /// Creates a rectangle anchored at its top-left corner.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a square anchored at the provided top-left position.
    #[must_use]
    pub fn square(origin: Vec2, length: f32) -> Self {
        Self::new(origin.x, origin.y, length, length)
    }

    /// Top-left corner of the rectangle.
    #[must_use]
    pub const fn origin(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Horizontal extent of the rectangle.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Vertical extent of the rectangle.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Left edge.
    #[must_use]
    pub const fn left(&self) -> f32 {
        self.x
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Top edge.
    #[must_use]
    pub const fn top(&self) -> f32 {
        self.y
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Area covered by the rectangle.
    #[must_use]
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Center point of the rectangle.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Returns a copy of the rectangle moved so its top-left corner sits at `origin`.
    #[must_use]
    pub fn moved_to(self, origin: Vec2) -> Self {
        Self::new(origin.x, origin.y, self.width, self.height)
    }

    /// Returns a copy of the rectangle shifted by the provided offset.
    #[must_use]
    pub fn translated(self, offset: Vec2) -> Self {
        self.moved_to(self.origin() + offset)
    }

    /// Reports whether the point lies within the rectangle's half-open bounds.
    #[must_use]
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.left()
            && point.x < self.right()
            && point.y >= self.top()
            && point.y < self.bottom()
    }

    /// Reports whether the two rectangles share any interior area.
    #[must_use]
    pub fn intersects(&self, other: &Rect) -> bool {
        if self.width <= 0.0 || self.height <= 0.0 || other.width <= 0.0 || other.height <= 0.0 {
            return false;
        }

        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Area shared by both rectangles, zero when they do not intersect.
    #[must_use]
    pub fn overlap_area(&self, other: &Rect) -> f32 {
        if !self.intersects(other) {
            return 0.0;
        }

        let overlap_x = self.right().min(other.right()) - self.left().max(other.left());
        let overlap_y = self.bottom().min(other.bottom()) - self.top().max(other.top());
        overlap_x * overlap_y
    }
}
