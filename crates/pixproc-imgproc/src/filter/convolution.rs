use glam::Vec3;
use pixproc_image::{Image, ImageError, PackedPixel, PixelReader, Rectangle};

use crate::{
    filter::kernels::Kernel,
    parallel::{self, ProgressObserver},
};

/// Weighted sum of the RGB neighbourhood around `(x, y)`, clamping at the borders.
#[inline]
pub(crate) fn convolve_at<P: PackedPixel>(
    pixels: &PixelReader<'_, P>,
    kernel: &Kernel,
    x: usize,
    y: usize,
) -> Vec3 {
    kernel.taps().fold(Vec3::ZERO, |acc, (dx, dy, w)| {
        let p = pixels.get_clamped(x as isize + dx, y as isize + dy);
        acc + p.to_vec4().truncate() * w
    })
}

/// Convolve the RGB channels of `rect` with a square kernel.
///
/// Neighbours outside the image repeat the nearest edge pixel. Alpha is
/// copied from the source and the result is clamped when packed.
///
/// # Arguments
///
/// * `src` - The input image.
/// * `dst` - The output image, the same size as `src`.
/// * `rect` - The region to filter.
/// * `kernel` - The convolution kernel.
/// * `observer` - Optional per-row progress callback.
pub fn convolve<P: PackedPixel>(
    src: &Image<P>,
    dst: &mut Image<P>,
    rect: Rectangle,
    kernel: &Kernel,
    observer: Option<&dyn ProgressObserver>,
) -> Result<(), ImageError> {
    parallel::check_same_size(src, dst)?;

    let pixels = src.read();
    parallel::par_apply(
        src,
        dst,
        rect,
        rect,
        |x, y, pixel| {
            let rgb = convolve_at(&pixels, kernel, x, y);
            P::pack(rgb.extend(pixel.to_vec4().w))
        },
        observer,
    )
}
