//! Crop validation and the constraint solver.
//!
//! [`uv_bounds`] answers "does this crop sample outside the source texture?"
//! by running each corner through the sampling matrix and checking the
//! resulting UV against a texel-derived safety margin. [`constrain`] answers
//! "how far must this crop shrink to become safe?" with two interchangeable
//! algorithms; the UV-space binary search is the one the session model uses.

pub mod constrain;
pub mod uv_bounds;

pub use constrain::{
    constrain_rect_to_bounds, max_scale_binary_search, max_scale_ray_cast, MAX_SOLVER_ITERATIONS,
    SCALE_TOLERANCE,
};
pub use uv_bounds::{inverse_project_point, validate_corners, SafetyPadding};
