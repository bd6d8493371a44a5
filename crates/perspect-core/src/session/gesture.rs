//! Gesture strategies: turning a pointer delta into a candidate crop rect.
//!
//! A gesture is a small closed set of tagged variants sharing one contract:
//! given the snapshot captured at gesture start and the accumulated pointer
//! delta (already converted into normalized logical coordinates by the input
//! layer), produce the rect the user is asking for. Strategies know nothing
//! about validity - the session model validates every candidate and decides
//! whether it sticks.

use crate::geometry::{CropRect, CropSnapshot, MIN_CROP_SIZE};
use serde::{Deserialize, Serialize};

/// The eight grab points on the crop rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResizeHandle {
    TopLeft,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
}

impl ResizeHandle {
    /// Does dragging this handle move the left edge?
    fn moves_left(self) -> bool {
        matches!(self, Self::TopLeft | Self::Left | Self::BottomLeft)
    }

    fn moves_right(self) -> bool {
        matches!(self, Self::TopRight | Self::Right | Self::BottomRight)
    }

    fn moves_top(self) -> bool {
        matches!(self, Self::TopLeft | Self::Top | Self::TopRight)
    }

    fn moves_bottom(self) -> bool {
        matches!(self, Self::BottomLeft | Self::Bottom | Self::BottomRight)
    }

    /// Corner handles adjust both axes and participate in aspect locking.
    fn is_corner(self) -> bool {
        matches!(
            self,
            Self::TopLeft | Self::TopRight | Self::BottomLeft | Self::BottomRight
        )
    }
}

/// An interactive gesture on the crop rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GestureStrategy {
    /// Drag one handle, moving the edges it owns. With `lock_aspect`, corner
    /// handles keep the snapshot's width/height ratio, anchored on the
    /// opposite corner.
    Resize {
        handle: ResizeHandle,
        lock_aspect: bool,
    },
    /// Drag the whole rect, preserving its size.
    Pan,
}

impl GestureStrategy {
    /// Whether a failed validation may be answered by shrinking the
    /// candidate instead of reverting.
    ///
    /// Panning against the valid-region boundary squeezes the crop rather
    /// than freezing it; a resize is a direct statement of intent about
    /// size, so an invalid resize candidate is rejected outright.
    pub fn allows_shrink(&self) -> bool {
        matches!(self, Self::Pan)
    }

    /// Produce the candidate rect for the accumulated drag `(dx, dy)`.
    ///
    /// The candidate is clamped to the unit square and to the minimum crop
    /// size, but not validated against the perspective bounds - that is the
    /// caller's job.
    pub fn candidate(&self, snapshot: &CropSnapshot, dx: f64, dy: f64) -> CropRect {
        match *self {
            Self::Pan => snapshot.to_rect().translated(dx, dy).shifted_into_frame(),
            Self::Resize {
                handle,
                lock_aspect,
            } => resize_candidate(snapshot, handle, lock_aspect, dx, dy),
        }
    }
}

fn resize_candidate(
    snapshot: &CropSnapshot,
    handle: ResizeHandle,
    lock_aspect: bool,
    dx: f64,
    dy: f64,
) -> CropRect {
    let mut rect = snapshot.to_rect();

    if handle.moves_left() {
        rect.left = (rect.left + dx).clamp(0.0, rect.right - MIN_CROP_SIZE);
    }
    if handle.moves_right() {
        rect.right = (rect.right + dx).clamp(rect.left + MIN_CROP_SIZE, 1.0);
    }
    if handle.moves_top() {
        rect.top = (rect.top + dy).clamp(0.0, rect.bottom - MIN_CROP_SIZE);
    }
    if handle.moves_bottom() {
        rect.bottom = (rect.bottom + dy).clamp(rect.top + MIN_CROP_SIZE, 1.0);
    }

    if lock_aspect && handle.is_corner() && snapshot.height > 0.0 {
        rect = lock_corner_aspect(rect, snapshot, handle, dx, dy);
    }

    rect.clamped(MIN_CROP_SIZE)
}

/// Re-derive the dependent axis of a corner resize so the rect keeps the
/// snapshot's aspect ratio. The dominant pointer axis drives; the opposite
/// corner stays fixed.
fn lock_corner_aspect(
    mut rect: CropRect,
    snapshot: &CropSnapshot,
    handle: ResizeHandle,
    dx: f64,
    dy: f64,
) -> CropRect {
    let ratio = snapshot.width / snapshot.height;

    if dx.abs() >= dy.abs() {
        let target_height = rect.width() / ratio;
        if handle.moves_top() {
            rect.top = (rect.bottom - target_height).max(0.0);
        } else {
            rect.bottom = (rect.top + target_height).min(1.0);
        }
    } else {
        let target_width = rect.height() * ratio;
        if handle.moves_left() {
            rect.left = (rect.right - target_width).max(0.0);
        } else {
            rect.right = (rect.left + target_width).min(1.0);
        }
    }

    rect
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> CropSnapshot {
        CropSnapshot::of(&CropRect::from_center(0.5, 0.5, 0.6, 0.6))
    }

    #[test]
    fn test_pan_translates_without_resizing() {
        let snap = snapshot();
        let c = GestureStrategy::Pan.candidate(&snap, 0.1, -0.05);
        assert!((c.width() - 0.6).abs() < 1e-12);
        assert!((c.height() - 0.6).abs() < 1e-12);
        let center = c.center();
        assert!((center.x - 0.6).abs() < 1e-12);
        assert!((center.y - 0.45).abs() < 1e-12);
    }

    #[test]
    fn test_pan_stops_at_frame_edge() {
        let snap = snapshot();
        let c = GestureStrategy::Pan.candidate(&snap, 0.9, 0.0);
        assert!((c.right - 1.0).abs() < 1e-12);
        assert!((c.width() - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_resize_right_edge_only_moves_right() {
        let snap = snapshot();
        let strategy = GestureStrategy::Resize {
            handle: ResizeHandle::Right,
            lock_aspect: false,
        };
        let c = strategy.candidate(&snap, 0.1, 0.3);
        assert!((c.right - 0.9).abs() < 1e-12);
        assert!((c.left - 0.2).abs() < 1e-12);
        assert!((c.top - 0.2).abs() < 1e-12);
        assert!((c.bottom - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_resize_corner_moves_both_edges() {
        let snap = snapshot();
        let strategy = GestureStrategy::Resize {
            handle: ResizeHandle::TopLeft,
            lock_aspect: false,
        };
        let c = strategy.candidate(&snap, 0.05, 0.1);
        assert!((c.left - 0.25).abs() < 1e-12);
        assert!((c.top - 0.3).abs() < 1e-12);
        assert!((c.right - 0.8).abs() < 1e-12);
        assert!((c.bottom - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_resize_respects_minimum_size() {
        let snap = snapshot();
        let strategy = GestureStrategy::Resize {
            handle: ResizeHandle::Right,
            lock_aspect: false,
        };
        // Drag the right edge far past the left edge
        let c = strategy.candidate(&snap, -0.9, 0.0);
        assert!(c.width() >= MIN_CROP_SIZE - 1e-12);
        assert!(c.left <= c.right);
    }

    #[test]
    fn test_resize_clamps_to_frame() {
        let snap = snapshot();
        let strategy = GestureStrategy::Resize {
            handle: ResizeHandle::BottomRight,
            lock_aspect: false,
        };
        let c = strategy.candidate(&snap, 5.0, 5.0);
        assert!((c.right - 1.0).abs() < 1e-12);
        assert!((c.bottom - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_locked_corner_keeps_aspect() {
        let snap = CropSnapshot::of(&CropRect::from_center(0.5, 0.5, 0.4, 0.2));
        let strategy = GestureStrategy::Resize {
            handle: ResizeHandle::BottomRight,
            lock_aspect: true,
        };
        let c = strategy.candidate(&snap, 0.2, 0.01);
        let ratio = c.width() / c.height();
        assert!((ratio - 2.0).abs() < 1e-9, "ratio was {}", ratio);
    }

    #[test]
    fn test_locked_corner_dominant_axis_vertical() {
        let snap = CropSnapshot::of(&CropRect::from_center(0.5, 0.5, 0.4, 0.4));
        let strategy = GestureStrategy::Resize {
            handle: ResizeHandle::TopLeft,
            lock_aspect: true,
        };
        let c = strategy.candidate(&snap, 0.01, -0.1);
        let ratio = c.width() / c.height();
        assert!((ratio - 1.0).abs() < 1e-9);
        // Opposite corner stays anchored
        assert!((c.right - 0.7).abs() < 1e-12);
        assert!((c.bottom - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_edge_handles_ignore_aspect_lock() {
        let snap = snapshot();
        let strategy = GestureStrategy::Resize {
            handle: ResizeHandle::Bottom,
            lock_aspect: true,
        };
        let c = strategy.candidate(&snap, 0.0, 0.1);
        assert!((c.bottom - 0.9).abs() < 1e-12);
        assert!((c.width() - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_shrink_policy() {
        assert!(GestureStrategy::Pan.allows_shrink());
        assert!(!GestureStrategy::Resize {
            handle: ResizeHandle::Left,
            lock_aspect: false
        }
        .allows_shrink());
    }
}
