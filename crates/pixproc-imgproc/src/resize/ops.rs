use glam::Vec4;
use pixproc_image::{Image, ImageError, ImageSize, PackedPixel, Rectangle};

use super::{kernels::Resampler, weights::WeightTable};
use crate::parallel::{self, ExecutionStrategy, ProgressObserver};

/// Resize an image to a new size.
///
/// # Arguments
///
/// * `src` - The input image.
/// * `target_size` - The size of the output image.
/// * `kernel` - The reconstruction filter.
/// * `observer` - Optional per-row progress callback, fired for the rows of the output image.
///
/// # Returns
///
/// The resized image.
///
/// # Errors
///
/// Returns [`ImageError::InvalidArgument`] if either the source or the target is empty.
///
/// # Example
///
/// ```
/// use pixproc_image::{Image, ImageSize, Rgba32};
/// use pixproc_imgproc::resize::{resize, ResizeFilter};
///
/// let image = Image::from_size_val(ImageSize { width: 4, height: 5 }, Rgba32::RED);
///
/// let resized = resize(&image, ImageSize { width: 2, height: 3 }, &ResizeFilter::Bicubic, None).unwrap();
///
/// assert_eq!(resized.size(), ImageSize { width: 2, height: 3 });
/// assert_eq!(resized.get(1, 2).unwrap(), Rgba32::RED);
/// ```
pub fn resize<P, R>(
    src: &Image<P>,
    target_size: ImageSize,
    kernel: &R,
    observer: Option<&dyn ProgressObserver>,
) -> Result<Image<P>, ImageError>
where
    P: PackedPixel,
    R: Resampler + ?Sized,
{
    if target_size.is_empty() {
        return Err(ImageError::InvalidArgument(format!(
            "cannot resize to an empty target {target_size}"
        )));
    }

    let mut dst = Image::new(target_size);
    resize_into(
        src,
        &mut dst,
        src.bounds(),
        target_size.bounds(),
        kernel,
        observer,
    )?;
    Ok(dst)
}

/// Resample `source_rect` of `src` onto `target_rect` of `dst`.
///
/// `target_rect` may extend past the destination; only its visible part is
/// written, sampled as if the whole rectangle were rendered. Pixels of `dst`
/// outside `target_rect` are left untouched.
///
/// Nearest neighbour filters take a direct lookup path. All other filters
/// run a horizontal pass into an intermediate buffer of
/// `target_rect.width x source_rect.height` followed by a vertical pass. Each
/// output pixel is the weighted sum of its source pixels as canonical colors,
/// alpha included.
///
/// # Errors
///
/// Returns [`ImageError::InvalidArgument`] if either rectangle is empty and
/// [`ImageError::OutOfRange`] if `source_rect` does not fit inside `src`.
pub fn resize_into<P, R>(
    src: &Image<P>,
    dst: &mut Image<P>,
    source_rect: Rectangle,
    target_rect: Rectangle,
    kernel: &R,
    observer: Option<&dyn ProgressObserver>,
) -> Result<(), ImageError>
where
    P: PackedPixel,
    R: Resampler + ?Sized,
{
    if source_rect.is_empty() || target_rect.is_empty() {
        return Err(ImageError::InvalidArgument(format!(
            "cannot resample {:?} onto {:?}",
            source_rect, target_rect
        )));
    }
    if source_rect.right() > src.width() || source_rect.bottom() > src.height() {
        return Err(ImageError::OutOfRange {
            x: source_rect.right(),
            y: source_rect.bottom(),
            width: src.width(),
            height: src.height(),
        });
    }

    let visible = target_rect.intersect(&dst.bounds());

    if src.bounds() == dst.bounds() && source_rect == target_rect {
        log::debug!("resize: identity, copying {:?}", visible);
        return copy_rect(src, dst, visible, observer);
    }

    if kernel.is_nearest() {
        log::debug!("resize: nearest {:?} -> {:?}", source_rect, target_rect);
        return resize_nearest(src, dst, source_rect, target_rect, visible, observer);
    }

    log::debug!("resize: separable {:?} -> {:?}", source_rect, target_rect);
    let horizontal = WeightTable::compute(source_rect.width, target_rect.width, kernel)?;
    let vertical = WeightTable::compute(source_rect.height, target_rect.height, kernel)?;

    // horizontal pass, one row per source row of the rectangle
    let mut first_pass = vec![Vec4::ZERO; target_rect.width * source_rect.height];
    let pixels = src.read();
    parallel::par_rows_mut(
        &mut first_pass,
        target_rect.width,
        ExecutionStrategy::default(),
        |i, row| {
            let y = source_rect.y + i;
            for (out, window) in row.iter_mut().zip(horizontal.windows()) {
                *out = window.iter().fold(Vec4::ZERO, |acc, &(sx, w)| {
                    acc + pixels.vec4(source_rect.x + sx, y) * w
                });
            }
        },
    )?;

    // vertical pass straight into the destination
    let width = target_rect.width;
    parallel::for_each_row(
        dst,
        visible.y..visible.bottom(),
        ExecutionStrategy::default(),
        observer,
        |y, row| {
            let window = vertical.window(y - target_rect.y);
            for x in visible.x..visible.right() {
                let dx = x - target_rect.x;
                let color = window.iter().fold(Vec4::ZERO, |acc, &(sy, w)| {
                    acc + first_pass[sy * width + dx] * w
                });
                row[x] = P::pack(color);
            }
        },
    )
}

fn copy_rect<P: PackedPixel>(
    src: &Image<P>,
    dst: &mut Image<P>,
    rect: Rectangle,
    observer: Option<&dyn ProgressObserver>,
) -> Result<(), ImageError> {
    let width = src.width();
    let data = src.as_slice();
    parallel::for_each_row(
        dst,
        rect.y..rect.bottom(),
        ExecutionStrategy::default(),
        observer,
        |y, row| {
            let offset = y * width;
            row[rect.x..rect.right()]
                .copy_from_slice(&data[offset + rect.x..offset + rect.right()]);
        },
    )
}

fn resize_nearest<P: PackedPixel>(
    src: &Image<P>,
    dst: &mut Image<P>,
    source_rect: Rectangle,
    target_rect: Rectangle,
    visible: Rectangle,
    observer: Option<&dyn ProgressObserver>,
) -> Result<(), ImageError> {
    let factor_x = source_rect.width as f32 / target_rect.width as f32;
    let factor_y = source_rect.height as f32 / target_rect.height as f32;
    let pixels = src.read();

    // truncating the scaled offset picks the pixel whose left edge is closest
    let lookup = |offset: usize, factor: f32, extent: usize| {
        ((offset as f32 * factor) as usize).min(extent - 1)
    };

    parallel::for_each_row(
        dst,
        visible.y..visible.bottom(),
        ExecutionStrategy::default(),
        observer,
        |y, row| {
            let sy = source_rect.y + lookup(y - target_rect.y, factor_y, source_rect.height);
            for x in visible.x..visible.right() {
                let sx = source_rect.x + lookup(x - target_rect.x, factor_x, source_rect.width);
                row[x] = pixels.get_unchecked(sx, sy);
            }
        },
    )
}
