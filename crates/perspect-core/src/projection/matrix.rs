//! The 3x3 projective matrix and its builder.
//!
//! The matrix is stored in row-major order:
//! ```text
//! [ m0 m1 m2 ]
//! [ m3 m4 m5 ]
//! [ m6 m7 m8 ]
//! ```
//! mapping a centered point `(x, y, 1)` to homogeneous coordinates
//! `(x', y', w')`; the projected point is `(x'/w', y'/w')`.
//!
//! The built matrix runs in the *inverse-projection* direction: it takes a
//! rendered/projected point (centered to [-1, 1]) back to the texture UV the
//! fragment shader should sample. This is the direction a per-pixel sampler
//! needs, and it is the direction every CPU-side validation in this crate
//! uses as well.

use crate::error::GeometryError;
use crate::geometry::Point;
use crate::PerspectiveParameters;

/// Keystone inputs are clamped to this magnitude before building the matrix.
pub const MAX_KEYSTONE: f64 = 0.95;

/// Scale applied to the clamped keystone inputs before they enter the
/// projective row. Together with [`MAX_KEYSTONE`] this keeps the perspective
/// denominator at or above `1 - 2 * 0.5 * 0.95 = 0.05` over the whole
/// [-1, 1] x [-1, 1] frame, so the divide can never blow up.
pub const KEYSTONE_STRENGTH: f64 = 0.5;

/// Homogeneous w values below this are treated as a projection to infinity.
const W_EPSILON: f64 = 1e-9;

/// Determinants below this are treated as non-invertible.
const DET_EPSILON: f64 = 1e-12;

/// A 3x3 projective transform in row-major order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveMatrix {
    pub m: [f64; 9],
}

impl Default for PerspectiveMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl PerspectiveMatrix {
    /// Identity transform (no perspective, no rotation, no flip).
    pub const IDENTITY: Self = Self {
        m: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
    };

    /// Build the inverse-projection matrix for a parameter set.
    ///
    /// Composition order is fixed: a rendered point passes through the
    /// keystone first, then the inverse straighten rotation (evaluated in
    /// aspect-corrected space so non-square images do not shear), then the
    /// horizontal mirror. Keystone inputs are clamped to [`MAX_KEYSTONE`] and
    /// scaled by [`KEYSTONE_STRENGTH`], which keeps the matrix invertible for
    /// every reachable parameter combination.
    pub fn from_parameters(params: &PerspectiveParameters) -> Self {
        let kh = KEYSTONE_STRENGTH * params.horizontal.clamp(-MAX_KEYSTONE, MAX_KEYSTONE);
        let kv = KEYSTONE_STRENGTH * params.vertical.clamp(-MAX_KEYSTONE, MAX_KEYSTONE);
        let keystone = Self {
            m: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, kh, kv, 1.0],
        };

        // Inverse direction: sampling rotates opposite to the display
        let theta = -params.straighten_degrees.to_radians();
        let (sin, cos) = theta.sin_cos();
        let aspect = params.image_aspect_ratio.max(1e-6);
        // Rotation conjugated by the aspect scale: widen x into square space,
        // rotate, and scale back, so the rotation stays a pure rotation in
        // physical pixels.
        let straighten = Self {
            m: [
                cos,
                -sin / aspect,
                0.0,
                sin * aspect,
                cos,
                0.0,
                0.0,
                0.0,
                1.0,
            ],
        };

        let flip = if params.flip_horizontal {
            Self {
                m: [-1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
            }
        } else {
            Self::IDENTITY
        };

        flip.multiply(&straighten).multiply(&keystone)
    }

    /// Matrix product: apply `other` first, then `self`.
    pub fn multiply(&self, other: &Self) -> Self {
        let mut out = [0.0f64; 9];
        for row in 0..3 {
            for col in 0..3 {
                out[row * 3 + col] = self.m[row * 3] * other.m[col]
                    + self.m[row * 3 + 1] * other.m[3 + col]
                    + self.m[row * 3 + 2] * other.m[6 + col];
            }
        }
        Self { m: out }
    }

    /// Determinant of the 3x3 matrix.
    pub fn determinant(&self) -> f64 {
        let [a, b, c, d, e, f, g, h, i] = self.m;
        a * (e * i - f * h) - b * (d * i - f * g) + c * (d * h - e * g)
    }

    /// Invert via the adjugate.
    ///
    /// Matrices produced by [`PerspectiveMatrix::from_parameters`] are always
    /// invertible; the error path exists for hand-built matrices.
    pub fn invert(&self) -> Result<Self, GeometryError> {
        let [a, b, c, d, e, f, g, h, i] = self.m;
        let det = self.determinant();
        if !det.is_finite() || det.abs() < DET_EPSILON {
            return Err(GeometryError::DegenerateMatrix(det));
        }
        let inv_det = 1.0 / det;

        Ok(Self {
            m: [
                (e * i - f * h) * inv_det,
                (c * h - b * i) * inv_det,
                (b * f - c * e) * inv_det,
                (f * g - d * i) * inv_det,
                (a * i - c * g) * inv_det,
                (c * d - a * f) * inv_det,
                (d * h - e * g) * inv_det,
                (b * g - a * h) * inv_det,
                (a * e - b * d) * inv_det,
            ],
        })
    }

    /// Apply the homogeneous multiply + perspective divide to a centered
    /// point.
    ///
    /// Returns an error if the point projects to infinity (w near zero),
    /// which cannot happen for matrices built from clamped parameters.
    pub fn transform_point(&self, p: Point) -> Result<Point, GeometryError> {
        let x = self.m[0] * p.x + self.m[1] * p.y + self.m[2];
        let y = self.m[3] * p.x + self.m[4] * p.y + self.m[5];
        let w = self.m[6] * p.x + self.m[7] * p.y + self.m[8];
        if !w.is_finite() || w.abs() < W_EPSILON {
            return Err(GeometryError::ProjectionAtInfinity);
        }
        let out = Point::new(x / w, y / w);
        if !out.is_finite() {
            return Err(GeometryError::ProjectionAtInfinity);
        }
        Ok(out)
    }

    /// Returns true if all coefficients are finite.
    pub fn is_finite(&self) -> bool {
        self.m.iter().all(|v| v.is_finite())
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn params_strategy() -> impl Strategy<Value = PerspectiveParameters> {
        (
            -1.0f64..=1.0,
            -1.0f64..=1.0,
            -45.0f64..=45.0,
            0.2f64..=5.0,
            proptest::bool::ANY,
        )
            .prop_map(|(v, h, deg, aspect, flip)| PerspectiveParameters {
                vertical: v,
                horizontal: h,
                straighten_degrees: deg,
                rotate_steps: 0,
                flip_horizontal: flip,
                image_aspect_ratio: aspect,
            })
    }

    proptest! {
        /// Property: every built matrix is finite and invertible, and the
        /// inverse round-trips interior points.
        #[test]
        fn prop_built_matrix_invertible(params in params_strategy(),
                                        x in -1.0f64..=1.0,
                                        y in -1.0f64..=1.0) {
            let m = PerspectiveMatrix::from_parameters(&params);
            prop_assert!(m.is_finite());

            let inv = m.invert();
            prop_assert!(inv.is_ok());
            let inv = inv.unwrap();

            let p = Point::new(x, y);
            let mapped = m.transform_point(p);
            prop_assert!(mapped.is_ok());
            let back = inv.transform_point(mapped.unwrap());
            prop_assert!(back.is_ok());
            let back = back.unwrap();
            prop_assert!((back.x - x).abs() < 1e-6 && (back.y - y).abs() < 1e-6,
                "round trip drifted: ({}, {}) -> {:?}", x, y, back);
        }

        /// Property: the perspective denominator stays well away from zero
        /// over the whole frame for any reachable parameter set.
        #[test]
        fn prop_denominator_bounded(params in params_strategy(),
                                    x in -1.0f64..=1.0,
                                    y in -1.0f64..=1.0) {
            let m = PerspectiveMatrix::from_parameters(&params);
            let w = m.m[6] * x + m.m[7] * y + m.m[8];
            prop_assert!(w.abs() >= 0.05 - 1e-9, "w was {}", w);
        }
    }
}
