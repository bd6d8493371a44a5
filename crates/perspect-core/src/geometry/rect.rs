//! Normalized crop rectangle and the immutable gesture snapshot.
//!
//! All crop coordinates are normalized to the range 0.0 to 1.0, making them
//! independent of the actual image dimensions. A crop rectangle exists in two
//! parallel encodings - texture space for storage and logical space for
//! interaction - related by the remap in [`crate::geometry::space`]. The rect
//! itself is encoding-agnostic; callers must keep track of which space a
//! given value lives in and convert explicitly.

use super::Point;
use serde::{Deserialize, Serialize};

/// Minimum crop width/height in normalized units.
///
/// A crop is never allowed to shrink below this size, no matter how hard the
/// perspective solver squeezes it.
pub const MIN_CROP_SIZE: f64 = 0.05;

/// An axis-aligned crop rectangle in normalized coordinates.
///
/// Invariant after [`CropRect::clamped`]: `left <= right`, `top <= bottom`,
/// all edges within [0, 1], and width/height at least the requested minimum.
///
/// # Example
/// ```ignore
/// // The center 60% of the frame
/// let crop = CropRect::from_center(0.5, 0.5, 0.6, 0.6);
/// assert_eq!(crop.left, 0.2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRect {
    /// Left edge (0.0 to 1.0)
    pub left: f64,
    /// Top edge (0.0 to 1.0)
    pub top: f64,
    /// Right edge (0.0 to 1.0)
    pub right: f64,
    /// Bottom edge (0.0 to 1.0)
    pub bottom: f64,
}

impl Default for CropRect {
    fn default() -> Self {
        Self::full()
    }
}

impl CropRect {
    /// Create a rectangle from explicit edges. No clamping is performed;
    /// call [`CropRect::clamped`] to restore the invariant after arithmetic.
    pub const fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// The full frame: (0, 0) to (1, 1).
    pub const fn full() -> Self {
        Self::new(0.0, 0.0, 1.0, 1.0)
    }

    /// Create a rectangle from center and size.
    pub fn from_center(center_x: f64, center_y: f64, width: f64, height: f64) -> Self {
        Self {
            left: center_x - width / 2.0,
            top: center_y - height / 2.0,
            right: center_x + width / 2.0,
            bottom: center_y + height / 2.0,
        }
    }

    /// Rectangle width.
    #[inline]
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    /// Rectangle height.
    #[inline]
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Center point.
    #[inline]
    pub fn center(&self) -> Point {
        Point::new(
            (self.left + self.right) / 2.0,
            (self.top + self.bottom) / 2.0,
        )
    }

    /// The four corners in winding order: top-left, top-right, bottom-right,
    /// bottom-left.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.left, self.top),
            Point::new(self.right, self.top),
            Point::new(self.right, self.bottom),
            Point::new(self.left, self.bottom),
        ]
    }

    /// Scale the rectangle uniformly about its own center.
    ///
    /// The center point is unchanged; width and height are multiplied by
    /// `scale`. This is the only resizing operation the constraint solver
    /// performs, so a solved scale never moves the crop.
    pub fn scaled_about_center(&self, scale: f64) -> Self {
        let c = self.center();
        Self::from_center(c.x, c.y, self.width() * scale, self.height() * scale)
    }

    /// Translate the rectangle by a delta, preserving size.
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self {
            left: self.left + dx,
            top: self.top + dy,
            right: self.right + dx,
            bottom: self.bottom + dy,
        }
    }

    /// Restore the rect invariant: ordered edges, clamped to [0, 1], and at
    /// least `min_size` in each dimension.
    ///
    /// Undersized rects are grown about their center; rects pushed against a
    /// frame edge are shifted back inside rather than shrunk.
    pub fn clamped(&self, min_size: f64) -> Self {
        let (l, r) = if self.left <= self.right {
            (self.left, self.right)
        } else {
            (self.right, self.left)
        };
        let (t, b) = if self.top <= self.bottom {
            (self.top, self.bottom)
        } else {
            (self.bottom, self.top)
        };

        let (left, right) = clamp_span(l, r, min_size);
        let (top, bottom) = clamp_span(t, b, min_size);
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Translate the rectangle the minimum distance needed to fit inside the
    /// unit square, preserving size. Oversized rects are centered.
    pub fn shifted_into_frame(&self) -> Self {
        let dx = shift_for_span(self.left, self.right);
        let dy = shift_for_span(self.top, self.bottom);
        self.translated(dx, dy)
    }

    /// Approximate equality within `tolerance` on every edge.
    pub fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        (self.left - other.left).abs() <= tolerance
            && (self.top - other.top).abs() <= tolerance
            && (self.right - other.right).abs() <= tolerance
            && (self.bottom - other.bottom).abs() <= tolerance
    }
}

/// Clamp a 1D span into [0, 1] with a minimum length.
fn clamp_span(lo: f64, hi: f64, min_len: f64) -> (f64, f64) {
    let mut lo = lo.clamp(0.0, 1.0);
    let mut hi = hi.clamp(0.0, 1.0);

    if hi - lo < min_len {
        let center = (lo + hi) / 2.0;
        lo = center - min_len / 2.0;
        hi = center + min_len / 2.0;
        // Growing about the center can push past a frame edge; shift back in
        if lo < 0.0 {
            hi -= lo;
            lo = 0.0;
        } else if hi > 1.0 {
            lo -= hi - 1.0;
            hi = 1.0;
        }
        lo = lo.max(0.0);
        hi = hi.min(1.0);
    }

    (lo, hi)
}

/// Shift needed to bring a span inside [0, 1], preserving length.
fn shift_for_span(lo: f64, hi: f64) -> f64 {
    if hi - lo >= 1.0 {
        // Span does not fit; center it
        0.5 - (lo + hi) / 2.0
    } else if lo < 0.0 {
        -lo
    } else if hi > 1.0 {
        1.0 - hi
    } else {
        0.0
    }
}

/// Immutable crop state captured when a gesture begins.
///
/// Stored as center + size so that gesture strategies can derive candidates
/// without re-deriving the center every drag. Discarded on commit; restored
/// verbatim when a candidate fails validation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropSnapshot {
    pub center_x: f64,
    pub center_y: f64,
    pub width: f64,
    pub height: f64,
}

impl CropSnapshot {
    /// Capture a snapshot of a rect.
    pub fn of(rect: &CropRect) -> Self {
        let c = rect.center();
        Self {
            center_x: c.x,
            center_y: c.y,
            width: rect.width(),
            height: rect.height(),
        }
    }

    /// Reconstruct the rect this snapshot was taken from.
    pub fn to_rect(&self) -> CropRect {
        CropRect::from_center(self.center_x, self.center_y, self.width, self.height)
    }
}
