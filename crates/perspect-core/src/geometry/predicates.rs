//! Convex containment predicates.
//!
//! These are the geometric ground truth for "no black border": a crop rect is
//! renderable exactly when it sits inside the convex quad of valid area. Both
//! arguments to a containment test must be expressed in the same coordinate
//! space; the predicates themselves are space-agnostic.

use super::rect::CropRect;
use super::{edge_orientation, Point};

/// Orientation magnitudes at or below this are treated as degenerate and the
/// edge is skipped rather than voting on a side.
pub const ORIENT_EPSILON: f64 = 1e-6;

/// Test whether a point lies inside (or on the boundary of) a convex polygon.
///
/// Walks every directed edge and computes the signed cross-product orientation
/// of the point. Degenerate results (collapsed edges, or the point sitting on
/// an edge) are skipped; all remaining signs must agree.
///
/// Polygons with fewer than 3 points cannot contain anything and always
/// return false. The winding direction of the polygon does not matter.
pub fn point_in_convex_polygon(point: Point, polygon: &[Point]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut sign = 0.0f64;
    for i in 0..polygon.len() {
        let a = polygon[i];
        let b = polygon[(i + 1) % polygon.len()];

        let orient = edge_orientation(a, b, point);
        if orient.abs() <= ORIENT_EPSILON {
            continue;
        }
        if sign == 0.0 {
            sign = orient.signum();
        } else if orient.signum() != sign {
            return false;
        }
    }

    true
}

/// Test whether a rect lies entirely inside a convex quad.
///
/// True iff all 4 rect corners pass the polygon test. Convexity of the quad
/// makes corner containment sufficient for full containment.
pub fn rect_inside_quad(rect: &CropRect, quad: &[Point; 4]) -> bool {
    rect.corners()
        .iter()
        .all(|&corner| point_in_convex_polygon(corner, quad))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: points well inside the unit quad are accepted, points
        /// clearly outside are rejected.
        #[test]
        fn prop_unit_quad_classification(x in -1.0f64..=2.0, y in -1.0f64..=2.0) {
            let quad = [
                Point::new(0.0, 0.0),
                Point::new(1.0, 0.0),
                Point::new(1.0, 1.0),
                Point::new(0.0, 1.0),
            ];
            let inside = point_in_convex_polygon(Point::new(x, y), &quad);
            let expected = (0.0..=1.0).contains(&x) && (0.0..=1.0).contains(&y);
            // Allow the epsilon band around the boundary to go either way
            let near_edge = x.abs() < 1e-5
                || (x - 1.0).abs() < 1e-5
                || y.abs() < 1e-5
                || (y - 1.0).abs() < 1e-5;
            if !near_edge {
                prop_assert_eq!(inside, expected);
            }
        }

        /// Property: a rect scaled further into a containing quad stays inside.
        #[test]
        fn prop_shrinking_preserves_containment(scale in 0.0f64..=1.0) {
            let quad = [
                Point::new(0.2, 0.0),
                Point::new(0.8, 0.0),
                Point::new(1.0, 1.0),
                Point::new(0.0, 1.0),
            ];
            let rect = CropRect::new(0.35, 0.1, 0.65, 0.9);
            prop_assert!(rect_inside_quad(&rect, &quad));
            prop_assert!(rect_inside_quad(&rect.scaled_about_center(scale), &quad));
        }
    }
}
