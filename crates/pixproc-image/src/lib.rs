#![deny(missing_docs)]
//! Packed pixel formats, pixel buffers and the byte row boundary used by codecs.

/// Scoped read and write sessions over a pixel buffer.
pub mod accessor;

/// Runtime pixel format tags and format-erased images.
pub mod dynamic;

/// Error types for the image module.
pub mod error;

/// Pixel buffers, sizes and rectangles.
pub mod image;

/// Packed pixel formats and the canonical color vector.
pub mod pixel;

/// Conversion between raw byte rows and packed pixels.
pub mod row;

pub use crate::accessor::{PixelAccessor, PixelReader};
pub use crate::dynamic::{DynamicImage, PixelFormat};
pub use crate::error::ImageError;
pub use crate::image::{Image, ImageSize, Rectangle};
pub use crate::pixel::{Bgra32, PackedPixel, Rgba32, Rgba64};
pub use crate::row::{ComponentOrder, Endianness, RowCodec};

pub use glam::Vec4;
