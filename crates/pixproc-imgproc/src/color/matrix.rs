use std::ops::Mul;

use glam::{Mat4, Vec3, Vec4};
use pixproc_image::{Image, ImageError, PackedPixel, Rectangle};

use crate::parallel::{self, ProgressObserver};

/// Affine transform of the RGB part of a color.
///
/// Uses the row-vector convention: a color `[r, g, b, 1]` is multiplied on
/// the left, so the first three rows hold the linear part and the fourth row
/// is a translation. Alpha never takes part and is carried over unchanged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorMatrix(Mat4);

impl Default for ColorMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ColorMatrix {
    /// The matrix that leaves every color unchanged.
    pub const IDENTITY: Self = Self(Mat4::IDENTITY);

    /// Build a matrix from its three linear rows and translation row.
    ///
    /// `rows[i][j]` is the contribution of input channel `i` to output
    /// channel `j`.
    pub fn from_rows(rows: [[f32; 3]; 3], translation: [f32; 3]) -> Self {
        Self(Mat4::from_cols(
            Vec3::from(rows[0]).extend(0.0),
            Vec3::from(rows[1]).extend(0.0),
            Vec3::from(rows[2]).extend(0.0),
            Vec3::from(translation).extend(1.0),
        ))
    }

    fn diagonal(r: f32, g: f32, b: f32, translation: [f32; 3]) -> Self {
        Self::from_rows([[r, 0.0, 0.0], [0.0, g, 0.0], [0.0, 0.0, b]], translation)
    }

    /// The underlying matrix, in column-vector form.
    pub fn as_mat4(&self) -> &Mat4 {
        &self.0
    }

    /// Apply the matrix to a canonical color vector, keeping alpha.
    #[inline]
    pub fn transform(&self, color: Vec4) -> Vec4 {
        let rgb = self.0 * color.truncate().extend(1.0);
        rgb.truncate().extend(color.w)
    }

    /// Apply `self` first and then `next`.
    pub fn then(&self, next: &ColorMatrix) -> ColorMatrix {
        ColorMatrix(next.0 * self.0)
    }

    /// Luma with ITU-R BT.601 weights replicated into every channel.
    pub fn greyscale_bt601() -> Self {
        Self::luma(0.299, 0.587, 0.114)
    }

    /// Luma with ITU-R BT.709 weights replicated into every channel.
    pub fn greyscale_bt709() -> Self {
        Self::luma(0.2126, 0.7152, 0.0722)
    }

    fn luma(r: f32, g: f32, b: f32) -> Self {
        Self::from_rows([[r; 3], [g; 3], [b; 3]], [0.0; 3])
    }

    /// Saturation adjustment by a percentage in `[-100, 100]`.
    ///
    /// `0` is the identity, `-100` removes all color and `100` doubles it.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidArgument`] outside the accepted range.
    pub fn saturation(percent: i32) -> Result<Self, ImageError> {
        check_percent("saturation", percent, -100, 100)?;
        Ok(Self::saturate(percent as f32 / 100.0 + 1.0))
    }

    fn saturate(factor: f32) -> Self {
        let comp = 1.0 - factor;
        let r = 0.3086 * comp;
        let g = 0.6094 * comp;
        let b = 0.0820 * comp;
        Self::from_rows(
            [[r + factor, r, r], [g, g + factor, g], [b, b, b + factor]],
            [0.0; 3],
        )
    }

    /// Contrast adjustment by a percentage in `[-100, 100]`, around mid grey.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidArgument`] outside the accepted range.
    pub fn contrast(percent: i32) -> Result<Self, ImageError> {
        check_percent("contrast", percent, -100, 100)?;
        Ok(Self::contrast_factor(percent as f32 / 100.0 + 1.0))
    }

    fn contrast_factor(factor: f32) -> Self {
        let offset = 0.5 - 0.5 * factor;
        Self::diagonal(factor, factor, factor, [offset; 3])
    }

    /// Multiplies every color channel by `factor`.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidArgument`] for a negative or non finite factor.
    pub fn brightness_matrix(factor: f32) -> Result<Self, ImageError> {
        if !factor.is_finite() || factor < 0.0 {
            return Err(ImageError::InvalidArgument(format!(
                "brightness factor must be finite and >= 0, got {factor}"
            )));
        }
        Ok(Self::diagonal(factor, factor, factor, [0.0; 3]))
    }

    /// Rotates hues by `degrees` around the grey axis.
    pub fn hue(degrees: f32) -> Self {
        let radians = degrees.rem_euclid(360.0).to_radians();
        let (sin, cos) = radians.sin_cos();
        Self::from_rows(
            [
                [
                    0.213 + cos * 0.787 - sin * 0.213,
                    0.213 - cos * 0.213 + sin * 0.143,
                    0.213 - cos * 0.213 - sin * 0.787,
                ],
                [
                    0.715 - cos * 0.715 - sin * 0.715,
                    0.715 + cos * 0.285 + sin * 0.140,
                    0.715 - cos * 0.715 + sin * 0.715,
                ],
                [
                    0.072 - cos * 0.072 + sin * 0.928,
                    0.072 - cos * 0.072 - sin * 0.283,
                    0.072 + cos * 0.928 + sin * 0.072,
                ],
            ],
            [0.0; 3],
        )
    }

    /// Full strength sepia toning.
    pub fn sepia() -> Self {
        Self::from_rows(
            [
                [0.393, 0.349, 0.272],
                [0.769, 0.686, 0.534],
                [0.189, 0.168, 0.131],
            ],
            [0.0; 3],
        )
    }

    /// Warm, slightly faded film look.
    pub fn kodachrome() -> Self {
        Self::diagonal(0.729_702_3, 0.610_957_7, 0.597_218, [0.105, 0.145, 0.155])
            .then(&Self::saturate(1.2))
            .then(&Self::contrast_factor(1.35))
    }

    /// Lomograph look, without the vignette.
    pub fn lomograph() -> Self {
        Self::diagonal(1.5, 1.45, 1.09, [-0.1, 0.0, -0.08])
            .then(&Self::saturate(1.1))
            .then(&Self::contrast_factor(1.33))
    }

    /// Instant camera look.
    pub fn polaroid() -> Self {
        Self::from_rows(
            [
                [1.538, -0.062, -0.262],
                [-0.022, 1.578, -0.022],
                [0.216, -0.160, 1.5831],
            ],
            [0.02, -0.05, -0.05],
        )
    }

    /// Hard black and white threshold around mid grey.
    pub fn black_white() -> Self {
        Self::from_rows([[1.5; 3], [1.5; 3], [1.5; 3]], [-1.0; 3])
    }
}

impl Mul for ColorMatrix {
    type Output = ColorMatrix;

    /// `a * b` applies `a` first, as with row vectors.
    fn mul(self, rhs: ColorMatrix) -> ColorMatrix {
        self.then(&rhs)
    }
}

pub(crate) fn check_percent(name: &str, value: i32, min: i32, max: i32) -> Result<(), ImageError> {
    if !(min..=max).contains(&value) {
        return Err(ImageError::InvalidArgument(format!(
            "{name} must be in [{min}, {max}], got {value}"
        )));
    }
    Ok(())
}

/// Recolor the pixels of `rect` with a [`ColorMatrix`].
///
/// # Arguments
///
/// * `src` - The input image.
/// * `dst` - The output image, the same size as `src`.
/// * `rect` - The region to recolor; pixels outside it keep the value `dst` already had.
/// * `matrix` - The color transform.
/// * `observer` - Optional per-row progress callback.
///
/// # Example
///
/// ```
/// use pixproc_image::{Image, ImageSize, Rgba32};
/// use pixproc_imgproc::color::{apply_color_matrix, ColorMatrix};
///
/// let src = Image::from_size_val(ImageSize { width: 2, height: 2 }, Rgba32::RED);
/// let mut dst = Image::new(src.size());
///
/// apply_color_matrix(&src, &mut dst, src.bounds(), &ColorMatrix::greyscale_bt601(), None).unwrap();
///
/// assert_eq!(dst.get(0, 0).unwrap(), Rgba32::new(76, 76, 76, 255));
/// ```
pub fn apply_color_matrix<P: PackedPixel>(
    src: &Image<P>,
    dst: &mut Image<P>,
    rect: Rectangle,
    matrix: &ColorMatrix,
    observer: Option<&dyn ProgressObserver>,
) -> Result<(), ImageError> {
    parallel::check_same_size(src, dst)?;

    parallel::par_apply(
        src,
        dst,
        rect,
        rect,
        |_, _, pixel| P::pack(matrix.transform(pixel.to_vec4())),
        observer,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pixproc_image::{Bgra32, ImageSize, Rgba32};

    fn recolor(pixel: Rgba32, matrix: &ColorMatrix) -> Result<Rgba32, ImageError> {
        let src = Image::from_size_val(
            ImageSize {
                width: 3,
                height: 2,
            },
            pixel,
        );
        let mut dst = Image::new(src.size());
        apply_color_matrix(&src, &mut dst, src.bounds(), matrix, None)?;
        dst.get(2, 1)
    }

    #[test]
    fn greyscale_of_red() -> Result<(), ImageError> {
        let red = Rgba32::RED;
        assert_eq!(
            recolor(red, &ColorMatrix::greyscale_bt601())?,
            Rgba32::new(76, 76, 76, 255)
        );
        assert_eq!(
            recolor(red, &ColorMatrix::greyscale_bt709())?,
            Rgba32::new(54, 54, 54, 255)
        );
        Ok(())
    }

    #[test]
    fn greyscale_keeps_alpha() -> Result<(), ImageError> {
        let out = recolor(Rgba32::new(255, 255, 255, 40), &ColorMatrix::greyscale_bt709())?;
        assert_eq!(out, Rgba32::new(255, 255, 255, 40));
        Ok(())
    }

    #[test]
    fn saturation_extremes() -> Result<(), ImageError> {
        let color = Rgba32::new(200, 100, 50, 255);
        assert_eq!(recolor(color, &ColorMatrix::saturation(0)?)?, color);

        let grey = recolor(color, &ColorMatrix::saturation(-100)?)?;
        assert_eq!(grey.r(), grey.g());
        assert_eq!(grey.g(), grey.b());
        Ok(())
    }

    #[test]
    fn saturation_range() {
        assert!(matches!(
            ColorMatrix::saturation(101),
            Err(ImageError::InvalidArgument(_))
        ));
        assert!(matches!(
            ColorMatrix::saturation(-101),
            Err(ImageError::InvalidArgument(_))
        ));
        assert!(ColorMatrix::contrast(150).is_err());
        assert!(ColorMatrix::brightness_matrix(-1.0).is_err());
    }

    #[test]
    fn row_vector_convention() {
        // red feeds into blue
        let m = ColorMatrix::from_rows(
            [[0.0, 0.0, 1.0], [0.0, 1.0, 0.0], [0.0, 0.0, 0.0]],
            [0.1, 0.0, 0.0],
        );
        let out = m.transform(Vec4::new(0.5, 0.25, 0.75, 0.3));
        assert_relative_eq!(out.x, 0.1);
        assert_relative_eq!(out.y, 0.25);
        assert_relative_eq!(out.z, 0.5);
        assert_relative_eq!(out.w, 0.3);
    }

    #[test]
    fn composition_order() {
        let a = ColorMatrix::diagonal(0.5, 1.0, 1.0, [0.0; 3]);
        let b = ColorMatrix::diagonal(1.0, 1.0, 1.0, [0.2, 0.0, 0.0]);
        let v = Vec4::new(1.0, 0.0, 0.0, 1.0);
        // scale then shift
        assert_relative_eq!((a * b).transform(v).x, 0.7, epsilon = 1e-6);
        // shift then scale
        assert_relative_eq!((b * a).transform(v).x, 0.6, epsilon = 1e-6);
    }

    #[test]
    fn hue_full_turn_is_identity() {
        let v = Vec4::new(0.8, 0.3, 0.1, 1.0);
        for degrees in [0.0, 360.0, -720.0] {
            let out = ColorMatrix::hue(degrees).transform(v);
            assert_relative_eq!(out.x, v.x, epsilon = 1e-5);
            assert_relative_eq!(out.y, v.y, epsilon = 1e-5);
            assert_relative_eq!(out.z, v.z, epsilon = 1e-5);
        }
    }

    #[test]
    fn filters_stay_in_range() -> Result<(), ImageError> {
        let filters = [
            ColorMatrix::sepia(),
            ColorMatrix::kodachrome(),
            ColorMatrix::lomograph(),
            ColorMatrix::polaroid(),
            ColorMatrix::black_white(),
            ColorMatrix::hue(90.0),
        ];
        let src = Image::from_size_val(
            ImageSize {
                width: 2,
                height: 2,
            },
            Bgra32::new(120, 60, 200, 128),
        );
        for filter in filters {
            let mut dst = Image::new(src.size());
            apply_color_matrix(&src, &mut dst, src.bounds(), &filter, None)?;
            assert!(dst.as_slice().iter().all(|p| p.a() == 128));
        }
        Ok(())
    }

    #[test]
    fn black_white_thresholds() -> Result<(), ImageError> {
        assert_eq!(
            recolor(Rgba32::new(200, 200, 200, 255), &ColorMatrix::black_white())?,
            Rgba32::WHITE
        );
        assert_eq!(
            recolor(Rgba32::new(40, 40, 40, 255), &ColorMatrix::black_white())?,
            Rgba32::BLACK
        );
        Ok(())
    }

    #[test]
    fn size_mismatch() {
        let src = Image::<Rgba32>::new(ImageSize {
            width: 2,
            height: 2,
        });
        let mut dst = Image::<Rgba32>::new(ImageSize {
            width: 3,
            height: 2,
        });
        let res = apply_color_matrix(&src, &mut dst, src.bounds(), &ColorMatrix::sepia(), None);
        assert!(matches!(res, Err(ImageError::InvalidImageSize(2, 2, 3, 2))));
    }
}
