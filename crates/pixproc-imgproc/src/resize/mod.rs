//! Resampling images to a new size
//!
//! Separable two-pass resampling driven by a [`Resampler`] kernel, with a
//! direct lookup path for nearest neighbour.

/// Reconstruction filters.
pub mod kernels;

/// Per-axis tap tables.
pub mod weights;

mod ops;
pub use ops::*;

pub use kernels::{Resampler, ResizeFilter};
pub use weights::WeightTable;
