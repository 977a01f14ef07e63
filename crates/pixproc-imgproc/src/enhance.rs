use glam::{Vec3, Vec4};
use pixproc_image::{Image, ImageError, PackedPixel, Rectangle};

use crate::{
    color::check_percent,
    parallel::{self, ProgressObserver},
};

/// Apply a function to the canonical color of every pixel in `rect`.
///
/// The result is packed back into the pixel format, which clamps it to
/// `[0, 1]`.
///
/// # Arguments
///
/// * `src` - The input image.
/// * `dst` - The output image, the same size as `src`.
/// * `rect` - The region to transform.
/// * `f` - The function mapping an (R, G, B, A) vector to a new one.
/// * `observer` - Optional per-row progress callback.
///
/// # Errors
///
/// Returns an error if the sizes of `src` and `dst` do not match.
pub fn map_pixels<P, F>(
    src: &Image<P>,
    dst: &mut Image<P>,
    rect: Rectangle,
    f: F,
    observer: Option<&dyn ProgressObserver>,
) -> Result<(), ImageError>
where
    P: PackedPixel,
    F: Fn(Vec4) -> Vec4 + Send + Sync,
{
    parallel::check_same_size(src, dst)?;
    parallel::par_apply(
        src,
        dst,
        rect,
        rect,
        |_, _, pixel| P::pack(f(pixel.to_vec4())),
        observer,
    )
}

fn map_rgb<P, F>(
    src: &Image<P>,
    dst: &mut Image<P>,
    rect: Rectangle,
    f: F,
    observer: Option<&dyn ProgressObserver>,
) -> Result<(), ImageError>
where
    P: PackedPixel,
    F: Fn(Vec3) -> Vec3 + Send + Sync,
{
    map_pixels(src, dst, rect, |v| f(v.truncate()).extend(v.w), observer)
}

/// Adjust the brightness of the pixels in `rect`.
///
/// Adds `value / 100` to every color channel:
///
/// dst(x,y,c) = src(x,y,c) + value / 100
///
/// # Arguments
///
/// * `value` - The brightness change in `[-100, 100]`; `0` leaves the image unchanged.
///
/// # Errors
///
/// Returns [`ImageError::InvalidArgument`] if `value` is out of range, or an
/// error if the sizes of `src` and `dst` do not match.
pub fn brightness<P: PackedPixel>(
    src: &Image<P>,
    dst: &mut Image<P>,
    rect: Rectangle,
    value: i32,
    observer: Option<&dyn ProgressObserver>,
) -> Result<(), ImageError> {
    check_percent("brightness", value, -100, 100)?;
    let offset = value as f32 / 100.0;
    map_rgb(src, dst, rect, |rgb| rgb + offset, observer)
}

/// Adjust the contrast of the pixels in `rect` around mid grey.
///
/// dst(x,y,c) = (src(x,y,c) - 0.5) * (1 + value / 100) + 0.5
///
/// # Arguments
///
/// * `value` - The contrast change in `[-100, 100]`; `-100` gives flat grey.
///
/// # Errors
///
/// Returns [`ImageError::InvalidArgument`] if `value` is out of range.
pub fn contrast<P: PackedPixel>(
    src: &Image<P>,
    dst: &mut Image<P>,
    rect: Rectangle,
    value: i32,
    observer: Option<&dyn ProgressObserver>,
) -> Result<(), ImageError> {
    check_percent("contrast", value, -100, 100)?;
    let factor = value as f32 / 100.0 + 1.0;
    map_rgb(
        src,
        dst,
        rect,
        |rgb| (rgb - 0.5) * factor + 0.5,
        observer,
    )
}

/// Invert the color channels of the pixels in `rect`, keeping alpha.
pub fn invert<P: PackedPixel>(
    src: &Image<P>,
    dst: &mut Image<P>,
    rect: Rectangle,
    observer: Option<&dyn ProgressObserver>,
) -> Result<(), ImageError> {
    map_rgb(src, dst, rect, |rgb| Vec3::ONE - rgb, observer)
}

/// Scale the alpha channel of the pixels in `rect` to `percent` of its value.
///
/// Color channels are not premultiplied and stay unchanged; `100` leaves the
/// image as it is and `0` makes it fully transparent.
///
/// # Errors
///
/// Returns [`ImageError::InvalidArgument`] if `percent` is outside `[0, 100]`.
pub fn alpha<P: PackedPixel>(
    src: &Image<P>,
    dst: &mut Image<P>,
    rect: Rectangle,
    percent: i32,
    observer: Option<&dyn ProgressObserver>,
) -> Result<(), ImageError> {
    check_percent("alpha", percent, 0, 100)?;
    let factor = percent as f32 / 100.0;
    map_pixels(
        src,
        dst,
        rect,
        |v| v.truncate().extend(v.w * factor),
        observer,
    )
}
