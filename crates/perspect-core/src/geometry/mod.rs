//! Planar geometry primitives shared by the crop engine.
//!
//! This module provides the crop rectangle, the coordinate-space remapping
//! between texture and logical orientation, and the convex-polygon predicates
//! used for containment checks.
//!
//! # Coordinate System
//!
//! - (0.0, 0.0) = top-left corner
//! - (1.0, 1.0) = bottom-right corner
//! - All coordinates are normalized and independent of pixel dimensions

pub mod predicates;
pub mod rect;
pub mod space;

pub use predicates::{point_in_convex_polygon, rect_inside_quad};
pub use rect::{CropRect, CropSnapshot, MIN_CROP_SIZE};
pub use space::{logical_to_texture, texture_to_logical};

use serde::{Deserialize, Serialize};

/// A 2D point in normalized coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns true if both coordinates are finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// 2D cross product of the vectors `b - a` and `p - a`.
///
/// Positive when `p` lies to one side of the directed line a -> b, negative on
/// the other, zero when collinear. The sign convention depends on the y-axis
/// direction; callers only ever compare signs, never absolute orientation.
#[inline]
pub(crate) fn edge_orientation(a: Point, b: Point, p: Point) -> f64 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}
