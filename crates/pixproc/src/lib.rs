#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use pixproc_image as image;

#[doc(inline)]
pub use pixproc_imgproc as imgproc;
