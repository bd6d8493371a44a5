//! Interactive crop session: gesture strategies and the owning model.
//!
//! The model owns all perspective state explicitly - there is no module-level
//! matrix or shared singleton. Every interactive mutation flows through the
//! same snapshot/validate/revert cycle, so the crop can never be observed in
//! a half-applied state.

pub mod gesture;
pub mod model;

pub use gesture::{GestureStrategy, ResizeHandle};
pub use model::{CropSession, SessionParameters};
