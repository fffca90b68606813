//! Utility types and functions.
//!
//! - [`Error`] / [`Result`] - Error handling
//! - [`Axis`], [`axis_conversion`], [`BBox3f`] - Math helpers over `glam`

mod error;
mod math;

pub use error::*;
pub use math::*;
