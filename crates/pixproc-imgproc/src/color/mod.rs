mod gray;
mod matrix;

pub use gray::{grayscale, GrayscaleMode};
pub use matrix::{apply_color_matrix, ColorMatrix};

pub(crate) use matrix::check_percent;
