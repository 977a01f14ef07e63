/// An error type for the image module.
#[derive(thiserror::Error, Debug)]
pub enum ImageError {
    /// A parameter is outside its documented range.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A textual pixel representation could not be parsed.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// A component order or pixel format outside the supported set.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A pixel coordinate outside the buffer bounds.
    #[error("Pixel index ({x}, {y}) is out of bounds ({width}, {height})")]
    OutOfRange {
        /// The requested column.
        x: usize,
        /// The requested row.
        y: usize,
        /// The width of the buffer.
        width: usize,
        /// The height of the buffer.
        height: usize,
    },

    /// Error when the data length does not match the image size.
    #[error("Data length ({0}) does not match the image size ({1})")]
    InvalidChannelShape(usize, usize),

    /// Error when two images that must agree in size do not.
    #[error("Image size mismatch ({0}, {1}) != ({2}, {3})")]
    InvalidImageSize(usize, usize, usize, usize),

    /// Error when a raw row buffer has the wrong number of bytes.
    #[error("Row length ({0}) does not match the expected length ({1})")]
    InvalidRowLength(usize, usize),

    /// Error raised by the underlying byte stream.
    #[error("I/O error")]
    Io(#[from] std::io::Error),
}
