use std::{borrow::Cow, fmt, str::FromStr};

use glam::Vec3;
use pixproc_image::{Image, ImageError, PackedPixel, Rectangle};

use crate::{
    color::{grayscale, GrayscaleMode},
    filter::{
        convolution::convolve_at,
        kernels::{self, Kernel},
    },
    parallel::{self, ProgressObserver},
};

/// Edge detection operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeDetector {
    /// Sobel gradient pair.
    #[default]
    Sobel,
    /// Kirsch compass pair.
    Kirsch,
    /// Prewitt gradient pair.
    Prewitt,
    /// Scharr gradient pair.
    Scharr,
    /// Single 3x3 Laplacian.
    Laplacian3x3,
    /// Single 5x5 Laplacian.
    Laplacian5x5,
    /// Single 5x5 Laplacian of Gaussian.
    LaplacianOfGaussian,
}

/// The kernels used by an [`EdgeDetector`].
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeKernels {
    /// One kernel whose response is used directly.
    Single(Kernel),
    /// A horizontal and a vertical kernel combined as `sqrt(gx² + gy²)`.
    Pair(Kernel, Kernel),
}

impl EdgeDetector {
    /// Build the kernels of this operator.
    pub fn kernels(&self) -> EdgeKernels {
        let pair = |(x, y): (Kernel, Kernel)| EdgeKernels::Pair(x, y);
        match self {
            EdgeDetector::Sobel => pair(kernels::sobel()),
            EdgeDetector::Kirsch => pair(kernels::kirsch()),
            EdgeDetector::Prewitt => pair(kernels::prewitt()),
            EdgeDetector::Scharr => pair(kernels::scharr()),
            EdgeDetector::Laplacian3x3 => EdgeKernels::Single(kernels::laplacian_3x3()),
            EdgeDetector::Laplacian5x5 => EdgeKernels::Single(kernels::laplacian_5x5()),
            EdgeDetector::LaplacianOfGaussian => {
                EdgeKernels::Single(kernels::laplacian_of_gaussian())
            }
        }
    }
}

impl fmt::Display for EdgeDetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EdgeDetector::Sobel => "sobel",
            EdgeDetector::Kirsch => "kirsch",
            EdgeDetector::Prewitt => "prewitt",
            EdgeDetector::Scharr => "scharr",
            EdgeDetector::Laplacian3x3 => "laplacian3x3",
            EdgeDetector::Laplacian5x5 => "laplacian5x5",
            EdgeDetector::LaplacianOfGaussian => "log",
        };
        f.write_str(name)
    }
}

impl FromStr for EdgeDetector {
    type Err = ImageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sobel" => Ok(EdgeDetector::Sobel),
            "kirsch" => Ok(EdgeDetector::Kirsch),
            "prewitt" => Ok(EdgeDetector::Prewitt),
            "scharr" => Ok(EdgeDetector::Scharr),
            "laplacian3x3" => Ok(EdgeDetector::Laplacian3x3),
            "laplacian5x5" => Ok(EdgeDetector::Laplacian5x5),
            "log" | "laplacianofgaussian" => Ok(EdgeDetector::LaplacianOfGaussian),
            _ => Err(ImageError::InvalidArgument(format!(
                "unknown edge detector '{s}'"
            ))),
        }
    }
}

#[inline]
fn magnitude(gx: Vec3, gy: Vec3) -> Vec3 {
    let sq = gx * gx + gy * gy;
    Vec3::new(sq.x.sqrt(), sq.y.sqrt(), sq.z.sqrt())
}

/// Detect edges in the pixels of `rect`.
///
/// Borders repeat the nearest edge pixel. Operators with two kernels combine
/// both responses per color channel as `sqrt(gx² + gy²)`. Alpha is copied
/// from the source.
///
/// # Arguments
///
/// * `src` - The input image.
/// * `dst` - The output image, the same size as `src`.
/// * `rect` - The region to filter.
/// * `detector` - The edge operator.
/// * `grayscale_first` - Convert the input to BT.709 grayscale before filtering.
/// * `observer` - Optional per-row progress callback.
///
/// # Example
///
/// ```
/// use pixproc_image::{Image, ImageSize, Rgba32};
/// use pixproc_imgproc::filter::{detect_edges, EdgeDetector};
///
/// let src = Image::from_size_val(ImageSize { width: 4, height: 4 }, Rgba32::WHITE);
/// let mut dst = Image::new(src.size());
///
/// detect_edges(&src, &mut dst, src.bounds(), EdgeDetector::Sobel, true, None).unwrap();
///
/// // a flat image has no edges
/// assert_eq!(dst.get(2, 2).unwrap(), Rgba32::BLACK);
/// ```
pub fn detect_edges<P: PackedPixel>(
    src: &Image<P>,
    dst: &mut Image<P>,
    rect: Rectangle,
    detector: EdgeDetector,
    grayscale_first: bool,
    observer: Option<&dyn ProgressObserver>,
) -> Result<(), ImageError> {
    parallel::check_same_size(src, dst)?;

    let input = if grayscale_first {
        let mut gray = Image::new(src.size());
        grayscale(src, &mut gray, src.bounds(), GrayscaleMode::Bt709, None)?;
        Cow::Owned(gray)
    } else {
        Cow::Borrowed(src)
    };
    let input: &Image<P> = &input;
    let pixels = input.read();

    log::debug!("{detector} edge detection over {:?}", rect);

    match detector.kernels() {
        EdgeKernels::Single(kernel) => parallel::par_apply(
            input,
            dst,
            rect,
            rect,
            |x, y, pixel| {
                let rgb = convolve_at(&pixels, &kernel, x, y);
                P::pack(rgb.extend(pixel.to_vec4().w))
            },
            observer,
        ),
        EdgeKernels::Pair(kx, ky) => parallel::par_apply(
            input,
            dst,
            rect,
            rect,
            |x, y, pixel| {
                let gx = convolve_at(&pixels, &kx, x, y);
                let gy = convolve_at(&pixels, &ky, x, y);
                P::pack(magnitude(gx, gy).extend(pixel.to_vec4().w))
            },
            observer,
        ),
    }
}
