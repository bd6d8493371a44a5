//! Perspect Core - perspective-aware crop geometry engine
//!
//! This crate provides the geometry core for Perspect's crop tool: coordinate
//! transforms between texture and logical space, construction of the
//! projective perspective matrix, computation of the valid crop region under
//! rotation/straighten/flip/keystone, and the constraint solver that keeps an
//! interactively dragged crop rectangle inside that region.
//!
//! The engine is pure and synchronous: it consumes plain numeric parameters
//! and pointer deltas, and produces rects, quads and a validity flag. It does
//! no I/O and owns no pixels. Its one hard obligation is to model the
//! renderer's per-pixel sampling formula exactly - same matrix, same
//! centering, same perspective divide - so that CPU-side validation and
//! GPU-side sampling can never disagree.

pub mod error;
pub mod geometry;
pub mod projection;
pub mod session;
pub mod solver;

pub use error::GeometryError;
pub use geometry::{CropRect, CropSnapshot, Point, MIN_CROP_SIZE};
pub use projection::{PerspectiveMatrix, ProjectedQuad};
pub use session::{CropSession, GestureStrategy, ResizeHandle, SessionParameters};
pub use solver::SafetyPadding;

use serde::{Deserialize, Serialize};

/// Perspective correction parameters for one image.
///
/// Mutated by UI actions and read every time the matrix and valid quad are
/// recomputed. `vertical` and `horizontal` are the two keystone axes;
/// `rotate_steps` counts 90-degree clockwise display rotations; the aspect
/// ratio is the *logical* (post-rotation) width over height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerspectiveParameters {
    /// Vertical keystone (-1 to 1)
    pub vertical: f64,
    /// Horizontal keystone (-1 to 1)
    pub horizontal: f64,
    /// Fine straighten angle in degrees
    pub straighten_degrees: f64,
    /// Quarter turns clockwise (0 to 3)
    pub rotate_steps: u8,
    /// Mirror the image on the x axis
    pub flip_horizontal: bool,
    /// Logical (post-rotation) width / height, > 0
    pub image_aspect_ratio: f64,
}

impl Default for PerspectiveParameters {
    fn default() -> Self {
        Self {
            vertical: 0.0,
            horizontal: 0.0,
            straighten_degrees: 0.0,
            rotate_steps: 0,
            flip_horizontal: false,
            image_aspect_ratio: 1.0,
        }
    }
}

impl PerspectiveParameters {
    /// Create parameters with all corrections at their defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if all corrections are at their defaults (aspect ratio is
    /// metadata, not a correction).
    pub fn is_default(&self) -> bool {
        self.vertical == 0.0
            && self.horizontal == 0.0
            && self.straighten_degrees == 0.0
            && self.rotate_steps == 0
            && !self.flip_horizontal
    }

    /// Return a copy with every field forced into its documented range.
    pub fn clamped(&self) -> Self {
        Self {
            vertical: self.vertical.clamp(-1.0, 1.0),
            horizontal: self.horizontal.clamp(-1.0, 1.0),
            straighten_degrees: self.straighten_degrees,
            rotate_steps: self.rotate_steps % 4,
            flip_horizontal: self.flip_horizontal,
            image_aspect_ratio: self.image_aspect_ratio.max(1e-6),
        }
    }
}
