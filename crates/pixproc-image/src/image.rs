use glam::Vec4;

use crate::{
    accessor::{PixelAccessor, PixelReader},
    error::ImageError,
    pixel::{convert_pixel, PackedPixel},
};

/// Image size in pixels
///
/// A plain value type: copying it is cheap and it is never mutated in place.
///
/// # Examples
///
/// ```
/// use pixproc_image::ImageSize;
///
/// let image_size = ImageSize {
///   width: 10,
///   height: 20,
/// };
///
/// assert_eq!(image_size.width, 10);
/// assert_eq!(image_size.height, 20);
/// assert_eq!(image_size.area(), 200);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ImageSize {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
}

impl ImageSize {
    /// The number of pixels covered by this size.
    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// The rectangle anchored at the origin with this size.
    pub fn bounds(&self) -> Rectangle {
        Rectangle::new(0, 0, self.width, self.height)
    }

    /// Whether either dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "ImageSize {{ width: {}, height: {} }}",
            self.width, self.height
        )
    }
}

impl From<[usize; 2]> for ImageSize {
    fn from(size: [usize; 2]) -> Self {
        ImageSize {
            width: size[0],
            height: size[1],
        }
    }
}

impl From<ImageSize> for [u32; 2] {
    fn from(size: ImageSize) -> Self {
        [size.width as u32, size.height as u32]
    }
}

/// An integer region of an image.
///
/// Used to scope both the area a transform reads from and the area it writes
/// to, so cropping and compositing never need a full image copy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rectangle {
    /// Left edge.
    pub x: usize,
    /// Top edge.
    pub y: usize,
    /// Horizontal extent.
    pub width: usize,
    /// Vertical extent.
    pub height: usize,
}

impl Rectangle {
    /// Create a new rectangle.
    pub const fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// One past the right-most column.
    pub fn right(&self) -> usize {
        self.x + self.width
    }

    /// One past the bottom-most row.
    pub fn bottom(&self) -> usize {
        self.y + self.height
    }

    /// The extent of the rectangle.
    pub fn size(&self) -> ImageSize {
        ImageSize {
            width: self.width,
            height: self.height,
        }
    }

    /// Whether the rectangle covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Whether the pixel `(x, y)` lies inside the rectangle.
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// The overlap of two rectangles; empty when they do not touch.
    pub fn intersect(&self, other: &Rectangle) -> Rectangle {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= x || bottom <= y {
            return Rectangle::new(x, y, 0, 0);
        }
        Rectangle::new(x, y, right - x, bottom - y)
    }

    /// The pixel at the centre, rounded towards the origin.
    pub fn center(&self) -> (usize, usize) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }
}

/// Represents an image as a row-major buffer of packed pixels.
///
/// The buffer always holds exactly `width * height` pixels; rows are never
/// ragged. Pixel access goes through [`Image::lock`] / [`Image::read`] or the
/// bounds-checked helpers below.
#[derive(Clone, PartialEq, Eq)]
pub struct Image<P: PackedPixel> {
    size: ImageSize,
    data: Vec<P>,
}

impl<P: PackedPixel> std::fmt::Debug for Image<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Image")
            .field("format", &P::FORMAT)
            .field("size", &self.size)
            .finish()
    }
}

impl<P: PackedPixel> Image<P> {
    /// Create a new zero-filled image.
    ///
    /// # Example
    ///
    /// ```
    /// use pixproc_image::{Image, ImageSize, pixel::Rgba32};
    ///
    /// let image = Image::<Rgba32>::new(ImageSize { width: 10, height: 20 });
    ///
    /// assert_eq!(image.width(), 10);
    /// assert_eq!(image.height(), 20);
    /// assert_eq!(image.as_slice().len(), 200);
    /// ```
    pub fn new(size: ImageSize) -> Self {
        Self::from_size_val(size, P::default())
    }

    /// Create a new image with every pixel set to `val`.
    pub fn from_size_val(size: ImageSize, val: P) -> Self {
        Self {
            size,
            data: vec![val; size.area()],
        }
    }

    /// Create a new image from row-major pixel data.
    ///
    /// # Errors
    ///
    /// If the length of the pixel data does not match the image size, an error is returned.
    pub fn from_vec(size: ImageSize, data: Vec<P>) -> Result<Self, ImageError> {
        if data.len() != size.area() {
            return Err(ImageError::InvalidChannelShape(data.len(), size.area()));
        }
        Ok(Self { size, data })
    }

    /// Create a new image by packing one canonical color vector per pixel.
    pub fn from_vec4(size: ImageSize, data: &[Vec4]) -> Result<Self, ImageError> {
        if data.len() != size.area() {
            return Err(ImageError::InvalidChannelShape(data.len(), size.area()));
        }
        Ok(Self {
            size,
            data: data.iter().map(|&v| P::pack(v)).collect(),
        })
    }

    /// Get the size of the image in pixels.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// Get the width of the image in pixels.
    pub fn width(&self) -> usize {
        self.size.width
    }

    /// Get the height of the image in pixels.
    pub fn height(&self) -> usize {
        self.size.height
    }

    /// Get the number of columns of the image.
    pub fn cols(&self) -> usize {
        self.width()
    }

    /// Get the number of rows of the image.
    pub fn rows(&self) -> usize {
        self.height()
    }

    /// The rectangle covering the whole image.
    pub fn bounds(&self) -> Rectangle {
        self.size.bounds()
    }

    /// The pixel data in row-major order.
    pub fn as_slice(&self) -> &[P] {
        &self.data
    }

    /// The pixel data in row-major order, mutably.
    pub fn as_slice_mut(&mut self) -> &mut [P] {
        &mut self.data
    }

    /// The pixel data as packed words, without copying.
    pub fn as_packed(&self) -> &[P::Packed] {
        bytemuck::cast_slice(&self.data)
    }

    /// Consume the image and return its pixels.
    pub fn into_vec(self) -> Vec<P> {
        self.data
    }

    #[inline]
    pub(crate) fn check_bounds(&self, x: usize, y: usize) -> Result<(), ImageError> {
        check_bounds(self.size, x, y)
    }

    /// Get a pixel, bounds-checked.
    pub fn get(&self, x: usize, y: usize) -> Result<P, ImageError> {
        self.check_bounds(x, y)?;
        Ok(self.data[y * self.size.width + x])
    }

    /// Set a pixel, bounds-checked.
    pub fn set(&mut self, x: usize, y: usize, value: P) -> Result<(), ImageError> {
        self.check_bounds(x, y)?;
        self.data[y * self.size.width + x] = value;
        Ok(())
    }

    /// Borrow one row of pixels.
    pub fn row(&self, y: usize) -> Result<&[P], ImageError> {
        if y >= self.size.height {
            return Err(self.out_of_range(0, y));
        }
        let w = self.size.width;
        Ok(&self.data[y * w..(y + 1) * w])
    }

    /// Borrow one row of pixels mutably.
    pub fn row_mut(&mut self, y: usize) -> Result<&mut [P], ImageError> {
        if y >= self.size.height {
            return Err(self.out_of_range(0, y));
        }
        let w = self.size.width;
        Ok(&mut self.data[y * w..(y + 1) * w])
    }

    /// Iterate over the rows of the image.
    pub fn rows_iter(&self) -> std::slice::ChunksExact<'_, P> {
        self.data.chunks_exact(self.size.width.max(1))
    }

    /// Split the image into disjoint mutable rows.
    pub fn rows_mut(&mut self) -> std::slice::ChunksExactMut<'_, P> {
        self.data.chunks_exact_mut(self.size.width.max(1))
    }

    /// Start an exclusive read/write session over the pixel buffer.
    ///
    /// The buffer cannot be resized or moved while the accessor is alive and
    /// is released when the accessor is dropped, including on early returns.
    pub fn lock(&mut self) -> PixelAccessor<'_, P> {
        PixelAccessor::new(self.size, &mut self.data)
    }

    /// Start a shared read-only session over the pixel buffer.
    pub fn read(&self) -> PixelReader<'_, P> {
        PixelReader::new(self.size, &self.data)
    }

    /// Convert the image into another pixel format.
    ///
    /// # Example
    ///
    /// ```
    /// use pixproc_image::{Image, ImageSize, pixel::{Bgra32, PackedPixel, Rgba32}};
    ///
    /// let image = Image::from_size_val(ImageSize { width: 2, height: 1 }, Rgba32::RED);
    /// let bgra: Image<Bgra32> = image.convert();
    ///
    /// assert_eq!(bgra.as_slice()[0].to_bytes(), [255, 0, 0, 255]);
    /// ```
    pub fn convert<Q: PackedPixel>(&self) -> Image<Q> {
        Image {
            size: self.size,
            data: self.data.iter().map(|&p| convert_pixel(p)).collect(),
        }
    }

    /// Copy the pixels of a rectangle into a new image.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::OutOfRange`] if the rectangle does not fit inside the image.
    pub fn crop(&self, rect: Rectangle) -> Result<Image<P>, ImageError> {
        if rect.right() > self.width() || rect.bottom() > self.height() {
            return Err(self.out_of_range(rect.right(), rect.bottom()));
        }
        let mut data = Vec::with_capacity(rect.width * rect.height);
        for y in rect.y..rect.bottom() {
            let start = y * self.width();
            data.extend_from_slice(&self.data[start + rect.x..start + rect.right()]);
        }
        Image::from_vec(rect.size(), data)
    }

    fn out_of_range(&self, x: usize, y: usize) -> ImageError {
        ImageError::OutOfRange {
            x,
            y,
            width: self.size.width,
            height: self.size.height,
        }
    }
}

#[inline]
pub(crate) fn check_bounds(size: ImageSize, x: usize, y: usize) -> Result<(), ImageError> {
    if x >= size.width || y >= size.height {
        return Err(ImageError::OutOfRange {
            x,
            y,
            width: size.width,
            height: size.height,
        });
    }
    Ok(())
}
