//! The constraint solver: maximal safe uniform scale for a crop rect.
//!
//! Two interchangeable algorithms solve the same problem - given a candidate
//! rect that (possibly) violates the valid region, find the largest uniform
//! scale about its own center that makes it safe:
//!
//! - **UV-space binary search** ([`max_scale_binary_search`]): bisect
//!   scale in [0, 1] against [`validate_corners`]. Converges in at most
//!   [`MAX_SOLVER_ITERATIONS`] steps regardless of how badly the input
//!   violates the bounds, which keeps the per-drag cost flat at extreme
//!   perspective angles. This is the algorithm the session model uses.
//! - **Ray casting** ([`max_scale_ray_cast`]): cast a ray from the rect
//!   center through each corner and intersect it with the quad boundary.
//!   Exact for affine transforms, and kept as an independent cross-check.
//!
//! Both return a scale that has actually been verified - never an
//! extrapolated guess.

use crate::geometry::{CropRect, Point};
use crate::projection::matrix::PerspectiveMatrix;
use crate::projection::quad::ProjectedQuad;
use crate::solver::uv_bounds::{validate_corners, SafetyPadding};

/// Iteration budget for the binary search.
///
/// Ten bisections of [0, 1] resolve the scale to better than 1e-3, which is
/// texel-accurate up to 8K textures. The budget is also a hard latency bound:
/// a drag validation never costs more than 10 corner checks.
pub const MAX_SOLVER_ITERATIONS: usize = 10;

/// The search stops early once the bracket is narrower than this.
pub const SCALE_TOLERANCE: f64 = 1e-3;

/// Find the maximal scale in [0, 1] at which `rect`, scaled about its own
/// center, passes [`validate_corners`].
///
/// Quick-exits at 1.0 when the rect is already valid. Otherwise bisects,
/// keeping the largest scale that actually validated; if nothing validated
/// (the rect center itself samples out of bounds) returns `None`.
pub fn max_scale_binary_search(
    rect: &CropRect,
    matrix: &PerspectiveMatrix,
    padding: &SafetyPadding,
) -> Option<f64> {
    if validate_corners(rect, matrix, padding) {
        return Some(1.0);
    }

    let mut lo = 0.0f64;
    let mut hi = 1.0f64;
    let mut best = None;

    for _ in 0..MAX_SOLVER_ITERATIONS {
        let mid = (lo + hi) / 2.0;
        if validate_corners(&rect.scaled_about_center(mid), matrix, padding) {
            best = Some(mid);
            lo = mid;
        } else {
            hi = mid;
        }
        if hi - lo < SCALE_TOLERANCE {
            break;
        }
    }

    best
}

/// Find the maximal safe scale by casting rays from the rect center through
/// each corner and intersecting them with the quad boundary.
///
/// Each corner sits at parameter 1 along its ray; the boundary intersection
/// parameter `t` is the scale at which that corner touches the quad edge
/// (equivalently, `1/t` is the zoom divisor the corner demands). The overall
/// result is the smallest per-corner `t`, clamped to at most 1.
///
/// `quad` must be the valid region expressed in the same space as `rect`.
/// Returns 0.0 when the rect center lies outside the quad - no uniform
/// scale about that center can help.
pub fn max_scale_ray_cast(rect: &CropRect, quad: &ProjectedQuad) -> f64 {
    let center = rect.center();
    if !quad.contains_point(center) {
        return 0.0;
    }

    let mut scale = 1.0f64;
    for corner in rect.corners() {
        let dir = (corner.x - center.x, corner.y - center.y);
        if dir.0.abs() < f64::EPSILON && dir.1.abs() < f64::EPSILON {
            continue;
        }
        if let Some(t) = ray_exit_parameter(center, dir, quad) {
            scale = scale.min(t);
        }
    }

    scale.clamp(0.0, 1.0)
}

/// Smallest positive parameter at which the ray `origin + t * dir` crosses a
/// quad edge.
fn ray_exit_parameter(origin: Point, dir: (f64, f64), quad: &ProjectedQuad) -> Option<f64> {
    let cross = |ax: f64, ay: f64, bx: f64, by: f64| ax * by - ay * bx;

    let mut exit: Option<f64> = None;
    for i in 0..4 {
        let a = quad.points[i];
        let b = quad.points[(i + 1) % 4];
        let edge = (b.x - a.x, b.y - a.y);

        let denom = cross(dir.0, dir.1, edge.0, edge.1);
        if denom.abs() < 1e-12 {
            // Ray parallel to this edge
            continue;
        }

        let rel = (a.x - origin.x, a.y - origin.y);
        let t = cross(rel.0, rel.1, edge.0, edge.1) / denom;
        let u = cross(rel.0, rel.1, dir.0, dir.1) / denom;

        if t > 1e-9 && (-1e-9..=1.0 + 1e-9).contains(&u) {
            exit = Some(match exit {
                Some(existing) => existing.min(t),
                None => t,
            });
        }
    }

    exit
}

/// Shrink `rect` uniformly about its own center until it passes
/// [`validate_corners`].
///
/// Returns the input unchanged when it already validates. Never returns a
/// rect larger than the input; returns `None` when no scale validates at
/// all. The result has itself been validated - the last known-good bound
/// from the search, not an interpolation.
pub fn constrain_rect_to_bounds(
    rect: &CropRect,
    matrix: &PerspectiveMatrix,
    padding: &SafetyPadding,
) -> Option<CropRect> {
    let scale = max_scale_binary_search(rect, matrix, padding)?;
    if scale >= 1.0 {
        return Some(*rect);
    }
    Some(rect.scaled_about_center(scale))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PerspectiveParameters;

    fn matrix_for(vertical: f64, horizontal: f64, straighten: f64) -> PerspectiveMatrix {
        PerspectiveMatrix::from_parameters(&PerspectiveParameters {
            vertical,
            horizontal,
            straighten_degrees: straighten,
            ..Default::default()
        })
    }

    #[test]
    fn test_valid_rect_quick_exit() {
        let rect = CropRect::from_center(0.5, 0.5, 0.4, 0.4);
        let scale =
            max_scale_binary_search(&rect, &PerspectiveMatrix::IDENTITY, &SafetyPadding::none());
        assert_eq!(scale, Some(1.0));
    }

    #[test]
    fn test_binary_search_shrinks_violating_rect() {
        let m = matrix_for(0.5, 0.0, 0.0);
        let rect = CropRect::full();
        let scale = max_scale_binary_search(&rect, &m, &SafetyPadding::none())
            .expect("centered frame must admit some scale");
        assert!(scale < 1.0);
        assert!(scale > 0.0);
        // The returned scale has been validated, not guessed
        assert!(validate_corners(
            &rect.scaled_about_center(scale),
            &m,
            &SafetyPadding::none()
        ));
    }

    #[test]
    fn test_binary_search_extreme_perspective() {
        // Full perspective range in both axes at once
        let m = matrix_for(1.0, -1.0, 0.0);
        let pad = SafetyPadding::for_texture(8192, 8192, 3.0);
        let rect = CropRect::full();

        let scale = max_scale_binary_search(&rect, &m, &pad)
            .expect("extreme keystone still admits a centered crop");
        assert!(scale > 0.0 && scale < 1.0);
        assert!(validate_corners(&rect.scaled_about_center(scale), &m, &pad));
    }

    #[test]
    fn test_constrain_never_enlarges() {
        let m = matrix_for(0.7, 0.3, 10.0);
        let rect = CropRect::from_center(0.5, 0.5, 0.9, 0.9);
        let out = constrain_rect_to_bounds(&rect, &m, &SafetyPadding::none()).unwrap();
        assert!(out.width() <= rect.width() + 1e-12);
        assert!(out.height() <= rect.height() + 1e-12);
        // Shrinking preserves the center
        let (a, b) = (out.center(), rect.center());
        assert!((a.x - b.x).abs() < 1e-12);
        assert!((a.y - b.y).abs() < 1e-12);
    }

    #[test]
    fn test_constrain_valid_rect_is_identity() {
        let rect = CropRect::from_center(0.5, 0.5, 0.3, 0.3);
        let out =
            constrain_rect_to_bounds(&rect, &PerspectiveMatrix::IDENTITY, &SafetyPadding::none())
                .unwrap();
        assert_eq!(out, rect);
    }

    #[test]
    fn test_ray_cast_identity_frame() {
        let quad = ProjectedQuad::project_frame(&PerspectiveMatrix::IDENTITY).unwrap();
        // Fits exactly
        let rect = CropRect::full();
        let scale = max_scale_ray_cast(&rect, &quad);
        assert!((scale - 1.0).abs() < 1e-9);

        // A rect poking out on the right must shrink
        let rect = CropRect::from_center(0.7, 0.5, 0.8, 0.4);
        let scale = max_scale_ray_cast(&rect, &quad);
        // Right edge at 1.1; distance from center 0.4 must scale to 0.3
        assert!((scale - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_ray_cast_center_outside_quad() {
        let quad = ProjectedQuad::project_frame(&PerspectiveMatrix::IDENTITY).unwrap();
        let rect = CropRect::from_center(1.5, 0.5, 0.4, 0.4);
        assert_eq!(max_scale_ray_cast(&rect, &quad), 0.0);
    }

    #[test]
    fn test_ray_cast_agrees_with_binary_search_on_rotation() {
        // Pure straighten: the valid region in crop space is the inverse
        // image of the UV square, and both solvers must land on the same
        // scale for the same region.
        let m = matrix_for(0.0, 0.0, 15.0);
        let inv = m.invert().unwrap();
        let quad = ProjectedQuad::project_frame(&inv).unwrap();

        let rect = CropRect::full();
        let ray = max_scale_ray_cast(&rect, &quad);
        let search = max_scale_binary_search(&rect, &m, &SafetyPadding::none()).unwrap();

        assert!(
            (ray - search).abs() < 2.0 * SCALE_TOLERANCE,
            "ray {} vs search {}",
            ray,
            search
        );
    }

    #[test]
    fn test_ray_cast_agrees_with_binary_search_on_keystone() {
        let m = matrix_for(0.8, 0.0, 0.0);
        let inv = m.invert().unwrap();
        let quad = ProjectedQuad::project_frame(&inv).unwrap();

        let rect = CropRect::from_center(0.5, 0.5, 0.9, 0.9);
        let ray = max_scale_ray_cast(&rect, &quad);
        let search = max_scale_binary_search(&rect, &m, &SafetyPadding::none()).unwrap();

        assert!(
            (ray - search).abs() < 2.0 * SCALE_TOLERANCE,
            "ray {} vs search {}",
            ray,
            search
        );
    }

    #[test]
    fn test_off_center_rect_under_keystone() {
        let m = matrix_for(1.0, 0.0, 0.0);
        // Near the top of the frame, where keystone bites hardest
        let rect = CropRect::from_center(0.5, 0.2, 0.6, 0.3);
        let out = constrain_rect_to_bounds(&rect, &m, &SafetyPadding::none());
        if let Some(out) = out {
            assert!(validate_corners(&out, &m, &SafetyPadding::none()));
            assert!(out.width() <= rect.width() + 1e-12);
        }
    }
}
