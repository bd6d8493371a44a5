//! Texture UV bounds validation with a texel-derived safety margin.
//!
//! A crop corner that maps to UV 0.0001 is geometrically inside the texture
//! but still renders a dark edge: bilinear filtering reads a 2x2 texel
//! neighborhood, so samples within a texel of the border blend with whatever
//! lies outside. The safety padding keeps every sampled UV a few texels away
//! from the edge. One pixel is not enough to suppress the bleed; four or
//! more visibly wastes crop area; three is the balance point.

use crate::geometry::{CropRect, Point};
use crate::projection::matrix::PerspectiveMatrix;
use serde::{Deserialize, Serialize};

/// Default safety margin in texels.
pub const DEFAULT_MARGIN_PX: f64 = 3.0;

/// Per-axis UV safety margin derived from the texture dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SafetyPadding {
    /// Margin along the u axis (fraction of texture width).
    pub u: f64,
    /// Margin along the v axis (fraction of texture height).
    pub v: f64,
}

impl SafetyPadding {
    /// Derive the padding for a texture of the given pixel dimensions.
    ///
    /// The margin is capped at a quarter of the frame so pathologically tiny
    /// textures still leave a usable crop area.
    pub fn for_texture(width_px: u32, height_px: u32, margin_px: f64) -> Self {
        Self {
            u: (margin_px / f64::from(width_px.max(1))).min(0.25),
            v: (margin_px / f64::from(height_px.max(1))).min(0.25),
        }
    }

    /// Zero padding; validates against the raw [0, 1] bounds.
    pub const fn none() -> Self {
        Self { u: 0.0, v: 0.0 }
    }

    /// Padding with the u/v axes exchanged.
    ///
    /// The sampling matrix works in the logical frame; when the image is
    /// displayed rotated by an odd number of quarter turns, the logical u
    /// axis runs along the texture's pixel *rows*, so the per-axis margins
    /// swap with it.
    pub const fn swapped(self) -> Self {
        Self {
            u: self.v,
            v: self.u,
        }
    }
}

/// Map a rect-space point to texture UV through the sampling matrix.
///
/// Centers the point to [-1, 1], applies the homogeneous transform, and
/// renormalizes to [0, 1]. Returns `None` when the point projects to
/// infinity, which clamped parameters never produce.
pub fn inverse_project_point(p: Point, matrix: &PerspectiveMatrix) -> Option<Point> {
    let centered = Point::new(p.x * 2.0 - 1.0, p.y * 2.0 - 1.0);
    let mapped = matrix.transform_point(centered).ok()?;
    Some(Point::new((mapped.x + 1.0) / 2.0, (mapped.y + 1.0) / 2.0))
}

/// Check that every corner of `rect` samples safely inside the texture.
///
/// True iff each corner's UV lies within `[padding, 1 - padding]` on both
/// axes. A corner that fails to project at all fails the check.
pub fn validate_corners(
    rect: &CropRect,
    matrix: &PerspectiveMatrix,
    padding: &SafetyPadding,
) -> bool {
    rect.corners().iter().all(|&corner| {
        match inverse_project_point(corner, matrix) {
            Some(uv) => {
                uv.x >= padding.u
                    && uv.x <= 1.0 - padding.u
                    && uv.y >= padding.v
                    && uv.y <= 1.0 - padding.v
            }
            None => false,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PerspectiveParameters;

    #[test]
    fn test_padding_from_texture_size() {
        let pad = SafetyPadding::for_texture(6000, 4000, DEFAULT_MARGIN_PX);
        assert!((pad.u - 0.0005).abs() < 1e-12);
        assert!((pad.v - 0.00075).abs() < 1e-12);
    }

    #[test]
    fn test_padding_zero_sized_texture_does_not_divide_by_zero() {
        let pad = SafetyPadding::for_texture(0, 0, DEFAULT_MARGIN_PX);
        assert!(pad.u.is_finite());
        assert!(pad.v.is_finite());
    }

    #[test]
    fn test_padding_swapped() {
        let pad = SafetyPadding::for_texture(6000, 4000, DEFAULT_MARGIN_PX).swapped();
        assert!((pad.u - 0.00075).abs() < 1e-12);
        assert!((pad.v - 0.0005).abs() < 1e-12);
    }

    #[test]
    fn test_identity_projection_is_identity() {
        let p = inverse_project_point(Point::new(0.3, 0.8), &PerspectiveMatrix::IDENTITY).unwrap();
        assert!((p.x - 0.3).abs() < 1e-12);
        assert!((p.y - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_validate_full_frame_identity_no_padding() {
        assert!(validate_corners(
            &CropRect::full(),
            &PerspectiveMatrix::IDENTITY,
            &SafetyPadding::none()
        ));
    }

    #[test]
    fn test_validate_full_frame_identity_with_padding_fails() {
        // The exact frame edge is within the bilinear bleed margin
        let pad = SafetyPadding::for_texture(4000, 4000, DEFAULT_MARGIN_PX);
        assert!(!validate_corners(
            &CropRect::full(),
            &PerspectiveMatrix::IDENTITY,
            &pad
        ));
    }

    #[test]
    fn test_validate_interior_crop_with_padding() {
        let pad = SafetyPadding::for_texture(4000, 4000, DEFAULT_MARGIN_PX);
        let crop = CropRect::new(0.01, 0.01, 0.99, 0.99);
        assert!(validate_corners(&crop, &PerspectiveMatrix::IDENTITY, &pad));
    }

    #[test]
    fn test_keystone_pushes_full_frame_out_of_bounds() {
        let params = PerspectiveParameters {
            vertical: 0.5,
            ..Default::default()
        };
        let m = PerspectiveMatrix::from_parameters(&params);
        // Under keystone the frame corners sample outside the texture
        assert!(!validate_corners(
            &CropRect::full(),
            &m,
            &SafetyPadding::none()
        ));
        // A sufficiently small centered crop still validates
        let small = CropRect::from_center(0.5, 0.5, 0.4, 0.4);
        assert!(validate_corners(&small, &m, &SafetyPadding::none()));
    }

    #[test]
    fn test_corner_uv_matches_projected_quad() {
        // The validator and the quad calculator must agree - they are two
        // views of the same per-pixel formula.
        use crate::projection::quad::ProjectedQuad;

        let params = PerspectiveParameters {
            vertical: 0.7,
            horizontal: -0.2,
            straighten_degrees: 5.0,
            ..Default::default()
        };
        let m = PerspectiveMatrix::from_parameters(&params);
        let crop = CropRect::new(0.3, 0.25, 0.75, 0.8);

        let quad = ProjectedQuad::project(&m, &crop).unwrap();
        for (corner, quad_point) in crop.corners().iter().zip(quad.points.iter()) {
            let uv = inverse_project_point(*corner, &m).unwrap();
            assert!((uv.x - quad_point.x).abs() < 1e-12);
            assert!((uv.y - quad_point.y).abs() < 1e-12);
        }
    }
}
