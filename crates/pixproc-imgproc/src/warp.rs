use glam::{Affine2, Mat2, Vec2};
use pixproc_image::{Image, ImageError, ImageSize, PackedPixel};

use crate::parallel::{self, ExecutionStrategy, ProgressObserver};

/// Returns the affine transform skewing by `angle_x` and `angle_y` degrees about `center`.
///
/// The forward mapping is:
///
/// x' = x + tan(angle_x) * (y - center.y)
/// y' = y + tan(angle_y) * (x - center.x)
///
/// Angles are normalised into `[0, 360)` first.
///
/// # Errors
///
/// Returns [`ImageError::InvalidArgument`] if an angle is a right angle or the
/// resulting transform cannot be inverted (e.g. 45 degrees on both axes).
pub fn get_skew_matrix2d(
    center: Vec2,
    angle_x: f32,
    angle_y: f32,
) -> Result<Affine2, ImageError> {
    let tan_x = skew_tangent(angle_x)?;
    let tan_y = skew_tangent(angle_y)?;

    let shear = Mat2::from_cols(Vec2::new(1.0, tan_y), Vec2::new(tan_x, 1.0));
    if shear.determinant().abs() < 1e-6 {
        return Err(ImageError::InvalidArgument(format!(
            "skew of ({angle_x}, {angle_y}) degrees is degenerate"
        )));
    }

    Ok(Affine2::from_translation(center)
        * Affine2::from_mat2(shear)
        * Affine2::from_translation(-center))
}

fn skew_tangent(angle: f32) -> Result<f32, ImageError> {
    let radians = angle.rem_euclid(360.0).to_radians();
    if !radians.is_finite() || radians.cos().abs() < 1e-6 {
        return Err(ImageError::InvalidArgument(format!(
            "cannot skew by {angle} degrees"
        )));
    }
    Ok(radians.tan())
}

/// Skew an image along the x and y axes about `center`, or the image centre if none is given.
///
/// Every destination pixel is mapped back through the inverse transform and
/// takes the source pixel it lands in. Pixels that land outside the source
/// are left transparent.
///
/// # Arguments
///
/// * `src` - The input image.
/// * `angle_x` - The skew angle along the x axis in degrees.
/// * `angle_y` - The skew angle along the y axis in degrees.
/// * `center` - The fixed point of the skew, in pixel coordinates.
/// * `expand` - Grow the canvas to the bounding box of the skewed image.
/// * `observer` - Optional per-row progress callback.
///
/// # Returns
///
/// The skewed image, the size of `src` unless `expand` is set.
///
/// # Example
///
/// ```
/// use pixproc_image::{Image, ImageSize, Rgba32};
/// use pixproc_imgproc::warp::skew;
///
/// let image = Image::from_size_val(ImageSize { width: 5, height: 5 }, Rgba32::RED);
///
/// let skewed = skew(&image, 45.0, 0.0, None, true, None).unwrap();
///
/// assert_eq!(skewed.size(), ImageSize { width: 10, height: 5 });
/// ```
pub fn skew<P: PackedPixel>(
    src: &Image<P>,
    angle_x: f32,
    angle_y: f32,
    center: Option<Vec2>,
    expand: bool,
    observer: Option<&dyn ProgressObserver>,
) -> Result<Image<P>, ImageError> {
    let (w, h) = (src.width() as f32, src.height() as f32);
    let center = center.unwrap_or(Vec2::new(w * 0.5, h * 0.5));
    let mut transform = get_skew_matrix2d(center, angle_x, angle_y)?;

    let size = if expand {
        let corners = [Vec2::ZERO, Vec2::new(w, 0.0), Vec2::new(0.0, h), Vec2::new(w, h)]
            .map(|c| transform.transform_point2(c));
        let min = corners.iter().fold(Vec2::MAX, |acc, c| acc.min(*c));
        let max = corners.iter().fold(Vec2::MIN, |acc, c| acc.max(*c));
        transform = Affine2::from_translation(-min) * transform;

        // drop rounding noise before taking the ceiling
        let extent = (max - min - 1e-4).ceil().max(Vec2::ONE);
        ImageSize {
            width: extent.x as usize,
            height: extent.y as usize,
        }
    } else {
        src.size()
    };

    log::debug!("skew ({angle_x}, {angle_y}) {} -> {size}", src.size());

    let inverse = transform.inverse();
    let pixels = src.read();
    let mut dst = Image::new(size);

    parallel::for_each_row(
        &mut dst,
        0..size.height,
        ExecutionStrategy::default(),
        observer,
        |y, row| {
            for (x, out) in row.iter_mut().enumerate() {
                let p = inverse
                    .transform_point2(Vec2::new(x as f32 + 0.5, y as f32 + 0.5))
                    .floor();
                if p.x >= 0.0 && p.y >= 0.0 && p.x < w && p.y < h {
                    *out = pixels.get_unchecked(p.x as usize, p.y as usize);
                }
            }
        },
    )?;

    Ok(dst)
}
