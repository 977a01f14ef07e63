use pixproc_image::{Image, ImageError, PackedPixel, Rectangle};

use crate::{color::ColorMatrix, parallel::ProgressObserver};

/// Luma weights used for grayscale conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GrayscaleMode {
    /// ITU-R BT.601: `Y = 0.299 * R + 0.587 * G + 0.114 * B`.
    Bt601,
    /// ITU-R BT.709: `Y = 0.2126 * R + 0.7152 * G + 0.0722 * B`.
    #[default]
    Bt709,
}

impl GrayscaleMode {
    /// The color matrix implementing this mode.
    pub fn matrix(&self) -> ColorMatrix {
        match self {
            GrayscaleMode::Bt601 => ColorMatrix::greyscale_bt601(),
            GrayscaleMode::Bt709 => ColorMatrix::greyscale_bt709(),
        }
    }
}

/// Convert the pixels of `rect` to grayscale, keeping alpha.
///
/// The luma value is written to all three color channels so the output stays
/// in the pixel format of the input.
///
/// # Arguments
///
/// * `src` - The input image.
/// * `dst` - The output image, the same size as `src`.
/// * `rect` - The region to convert.
/// * `mode` - Which luma weights to use.
/// * `observer` - Optional per-row progress callback.
pub fn grayscale<P: PackedPixel>(
    src: &Image<P>,
    dst: &mut Image<P>,
    rect: Rectangle,
    mode: GrayscaleMode,
    observer: Option<&dyn ProgressObserver>,
) -> Result<(), ImageError> {
    super::apply_color_matrix(src, dst, rect, &mode.matrix(), observer)
}
