//! Projection of a rectangle through the perspective matrix.
//!
//! Feeding the four corners of a source rect through the per-pixel formula
//! produces the convex quadrilateral that rect covers on the other side of
//! the transform. Two distinct uses matter:
//!
//! - projecting the *crop rect* through the sampling matrix yields the
//!   texture UV region that crop actually reads - the thing that must stay
//!   inside the source image;
//! - projecting the *unit square* (or the padded UV square) through the
//!   inverse matrix yields the valid region in crop space - the thing a
//!   candidate crop rect must stay inside.
//!
//! The two quads differ whenever any perspective is active. Conflating them
//! produces containment results that look plausible and are silently wrong,
//! so every call site names its source rect explicitly.

use crate::error::GeometryError;
use crate::geometry::{point_in_convex_polygon, rect_inside_quad, CropRect, Point};
use crate::projection::matrix::PerspectiveMatrix;

/// A convex quadrilateral produced by projecting a rectangle.
///
/// Points are stored in the winding order of the source rect corners
/// (top-left, top-right, bottom-right, bottom-left of the source). Both the
/// quad and anything tested against it must live in the same coordinate
/// space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedQuad {
    pub points: [Point; 4],
}

impl ProjectedQuad {
    /// Project the corners of `source_rect` through `matrix`.
    ///
    /// Each corner is centered to [-1, 1], run through the homogeneous
    /// multiply + perspective divide, and renormalized to [0, 1] - exactly
    /// the formula the renderer applies per pixel.
    pub fn project(
        matrix: &PerspectiveMatrix,
        source_rect: &CropRect,
    ) -> Result<Self, GeometryError> {
        let mut points = [Point::default(); 4];
        for (out, corner) in points.iter_mut().zip(source_rect.corners()) {
            let centered = Point::new(corner.x * 2.0 - 1.0, corner.y * 2.0 - 1.0);
            let mapped = matrix.transform_point(centered)?;
            *out = Point::new((mapped.x + 1.0) / 2.0, (mapped.y + 1.0) / 2.0);
        }
        Ok(Self { points })
    }

    /// Project the full unit square.
    pub fn project_frame(matrix: &PerspectiveMatrix) -> Result<Self, GeometryError> {
        Self::project(matrix, &CropRect::full())
    }

    /// Arithmetic mean of the four corners.
    ///
    /// For the convex quads produced here this always lies inside, which
    /// makes it a safe re-centering target when a crop has to be pulled back
    /// into the valid region.
    pub fn centroid(&self) -> Point {
        let mut x = 0.0;
        let mut y = 0.0;
        for p in &self.points {
            x += p.x;
            y += p.y;
        }
        Point::new(x / 4.0, y / 4.0)
    }

    /// Test whether a point lies inside the quad.
    pub fn contains_point(&self, point: Point) -> bool {
        point_in_convex_polygon(point, &self.points)
    }

    /// Test whether a rect lies entirely inside the quad.
    pub fn contains_rect(&self, rect: &CropRect) -> bool {
        rect_inside_quad(rect, &self.points)
    }

    /// Largest absolute coordinate difference to another quad, corner-wise.
    pub fn max_corner_delta(&self, other: &Self) -> f64 {
        self.points
            .iter()
            .zip(other.points.iter())
            .map(|(a, b)| (a.x - b.x).abs().max((a.y - b.y).abs()))
            .fold(0.0, f64::max)
    }
}
