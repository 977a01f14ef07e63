//! Filter operations
//!
//! Convolution with clamp-to-edge borders and the edge detectors built on it.

/// Filter kernels
pub mod kernels;

mod convolution;
pub use convolution::*;

mod edge;
pub use edge::*;
