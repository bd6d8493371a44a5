//! Projective transform construction and evaluation.
//!
//! The renderer samples the source texture through a single 3x3 projective
//! matrix: for every output pixel it multiplies the pixel's centered
//! coordinates through the matrix, performs the perspective divide, and reads
//! the texture at the resulting UV. Everything in this module exists so the
//! CPU can reason about *exactly* that formula - same matrix, same centering,
//! same divide - because any divergence between the two shows up on screen as
//! a black wedge or a misplaced crop box.
//!
//! # Transform chain
//!
//! A rendered point passes through, in order:
//! 1. the projective keystone (vertical/horizontal perspective),
//! 2. the inverse straighten rotation, evaluated in aspect-corrected space,
//! 3. an x-axis mirror when the image is flipped horizontally.

pub mod matrix;
pub mod quad;

pub use matrix::{PerspectiveMatrix, KEYSTONE_STRENGTH, MAX_KEYSTONE};
pub use quad::ProjectedQuad;
