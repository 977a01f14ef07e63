//! Scoped pixel access sessions.
//!
//! An accessor borrows the pixel buffer of an [`Image`](crate::Image) for the
//! duration of a processing step. The borrow keeps the buffer from being
//! resized or moved; dropping the accessor ends the session on every exit
//! path. Accessors do no internal locking: concurrent writers are expected to
//! work on disjoint rows, which [`PixelAccessor::rows_mut`] hands out.

use std::ops::{Index, IndexMut};

use glam::Vec4;

use crate::{
    error::ImageError,
    image::{check_bounds, ImageSize},
    pixel::PackedPixel,
};

/// Shared read-only view over a pixel buffer.
pub struct PixelReader<'a, P: PackedPixel> {
    size: ImageSize,
    data: &'a [P],
}

impl<'a, P: PackedPixel> PixelReader<'a, P> {
    pub(crate) fn new(size: ImageSize, data: &'a [P]) -> Self {
        log::trace!("acquired reader over {size}");
        Self { size, data }
    }

    /// Width of the underlying buffer.
    pub fn width(&self) -> usize {
        self.size.width
    }

    /// Height of the underlying buffer.
    pub fn height(&self) -> usize {
        self.size.height
    }

    /// Size of the underlying buffer.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// Get a pixel, bounds-checked.
    pub fn get(&self, x: usize, y: usize) -> Result<P, ImageError> {
        check_bounds(self.size, x, y)?;
        Ok(self.data[y * self.size.width + x])
    }

    /// Get a pixel without the `OutOfRange` check.
    ///
    /// Coordinates are only verified by a debug assertion; an out of range
    /// pixel in release builds still panics on the slice index instead of
    /// reading foreign memory.
    #[inline]
    pub fn get_unchecked(&self, x: usize, y: usize) -> P {
        debug_assert!(x < self.size.width && y < self.size.height);
        self.data[y * self.size.width + x]
    }

    /// Get a pixel with signed coordinates clamped to the nearest edge.
    #[inline]
    pub fn get_clamped(&self, x: isize, y: isize) -> P {
        let cx = x.clamp(0, self.size.width as isize - 1) as usize;
        let cy = y.clamp(0, self.size.height as isize - 1) as usize;
        self.data[cy * self.size.width + cx]
    }

    /// Get a pixel as a canonical color vector.
    #[inline]
    pub fn vec4(&self, x: usize, y: usize) -> Vec4 {
        self.get_unchecked(x, y).to_vec4()
    }

    /// Borrow one row.
    pub fn row(&self, y: usize) -> Result<&'a [P], ImageError> {
        if y >= self.size.height {
            return Err(ImageError::OutOfRange {
                x: 0,
                y,
                width: self.size.width,
                height: self.size.height,
            });
        }
        let w = self.size.width;
        Ok(&self.data[y * w..(y + 1) * w])
    }
}

impl<P: PackedPixel> Drop for PixelReader<'_, P> {
    fn drop(&mut self) {
        log::trace!("released reader over {}", self.size);
    }
}

impl<P: PackedPixel> Index<(usize, usize)> for PixelReader<'_, P> {
    type Output = P;

    fn index(&self, (x, y): (usize, usize)) -> &P {
        assert!(x < self.size.width && y < self.size.height);
        &self.data[y * self.size.width + x]
    }
}

/// Exclusive read/write session over a pixel buffer.
pub struct PixelAccessor<'a, P: PackedPixel> {
    size: ImageSize,
    data: &'a mut [P],
}

impl<'a, P: PackedPixel> PixelAccessor<'a, P> {
    pub(crate) fn new(size: ImageSize, data: &'a mut [P]) -> Self {
        log::trace!("acquired accessor over {size}");
        Self { size, data }
    }

    /// Width of the underlying buffer.
    pub fn width(&self) -> usize {
        self.size.width
    }

    /// Height of the underlying buffer.
    pub fn height(&self) -> usize {
        self.size.height
    }

    /// Size of the underlying buffer.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// Get a pixel, bounds-checked.
    pub fn get(&self, x: usize, y: usize) -> Result<P, ImageError> {
        check_bounds(self.size, x, y)?;
        Ok(self.data[y * self.size.width + x])
    }

    /// Set a pixel, bounds-checked.
    pub fn set(&mut self, x: usize, y: usize, value: P) -> Result<(), ImageError> {
        check_bounds(self.size, x, y)?;
        self.data[y * self.size.width + x] = value;
        Ok(())
    }

    /// Get a pixel, checked only in debug builds.
    #[inline]
    pub fn get_unchecked(&self, x: usize, y: usize) -> P {
        debug_assert!(x < self.size.width && y < self.size.height);
        self.data[y * self.size.width + x]
    }

    /// Set a pixel, checked only in debug builds.
    #[inline]
    pub fn set_unchecked(&mut self, x: usize, y: usize, value: P) {
        debug_assert!(x < self.size.width && y < self.size.height);
        self.data[y * self.size.width + x] = value;
    }

    /// Borrow one row mutably.
    pub fn row_mut(&mut self, y: usize) -> Result<&mut [P], ImageError> {
        if y >= self.size.height {
            return Err(ImageError::OutOfRange {
                x: 0,
                y,
                width: self.size.width,
                height: self.size.height,
            });
        }
        let w = self.size.width;
        Ok(&mut self.data[y * w..(y + 1) * w])
    }

    /// Split the buffer into disjoint rows, paired with their row index.
    ///
    /// Each row can be handed to a different worker.
    pub fn rows_mut(&mut self) -> impl Iterator<Item = (usize, &mut [P])> {
        self.data
            .chunks_exact_mut(self.size.width.max(1))
            .enumerate()
    }

    /// The whole buffer in row-major order.
    pub fn as_slice_mut(&mut self) -> &mut [P] {
        &mut *self.data
    }

    /// Fill every pixel with `value`.
    pub fn fill(&mut self, value: P) {
        self.data.fill(value);
    }
}

impl<P: PackedPixel> Drop for PixelAccessor<'_, P> {
    fn drop(&mut self) {
        log::trace!("released accessor over {}", self.size);
    }
}

impl<P: PackedPixel> Index<(usize, usize)> for PixelAccessor<'_, P> {
    type Output = P;

    fn index(&self, (x, y): (usize, usize)) -> &P {
        assert!(x < self.size.width && y < self.size.height);
        &self.data[y * self.size.width + x]
    }
}

impl<P: PackedPixel> IndexMut<(usize, usize)> for PixelAccessor<'_, P> {
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut P {
        assert!(x < self.size.width && y < self.size.height);
        &mut self.data[y * self.size.width + x]
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        error::ImageError,
        image::{Image, ImageSize},
        pixel::Rgba32,
    };

    fn sample() -> Image<Rgba32> {
        Image::new(ImageSize {
            width: 3,
            height: 2,
        })
    }

    #[test]
    fn accessor_get_set() -> Result<(), ImageError> {
        let mut image = sample();
        {
            let mut pixels = image.lock();
            pixels.set(1, 1, Rgba32::RED)?;
            pixels[(2, 0)] = Rgba32::GREEN;
            assert_eq!(pixels.get(1, 1)?, Rgba32::RED);
            assert!(matches!(
                pixels.set(3, 1, Rgba32::RED),
                Err(ImageError::OutOfRange { .. })
            ));
        }
        assert_eq!(image.get(1, 1)?, Rgba32::RED);
        assert_eq!(image.get(2, 0)?, Rgba32::GREEN);
        Ok(())
    }

    #[test]
    fn accessor_released_on_error_path() -> Result<(), ImageError> {
        fn fails(image: &mut Image<Rgba32>) -> Result<(), ImageError> {
            let mut pixels = image.lock();
            pixels.set(0, 0, Rgba32::BLUE)?;
            pixels.set(10, 10, Rgba32::BLUE)?;
            Ok(())
        }

        let mut image = sample();
        assert!(fails(&mut image).is_err());
        // the session ended, so the image can be locked again
        let pixels = image.lock();
        assert_eq!(pixels.get(0, 0)?, Rgba32::BLUE);
        Ok(())
    }

    #[test]
    fn accessor_rows() -> Result<(), ImageError> {
        let mut image = sample();
        {
            let mut pixels = image.lock();
            for (y, row) in pixels.rows_mut() {
                row.fill(Rgba32::new(y as u8, 0, 0, 255));
            }
        }
        assert_eq!(image.get(2, 1)?.r(), 1);
        assert_eq!(image.get(0, 0)?.r(), 0);
        Ok(())
    }

    #[test]
    fn reader_clamped() -> Result<(), ImageError> {
        let mut image = sample();
        image.set(0, 0, Rgba32::RED)?;
        image.set(2, 1, Rgba32::BLUE)?;

        let pixels = image.read();
        assert_eq!(pixels.get_clamped(-5, -1), Rgba32::RED);
        assert_eq!(pixels.get_clamped(7, 9), Rgba32::BLUE);
        assert_eq!(pixels.row(1)?.len(), 3);
        assert!(pixels.get(0, 2).is_err());
        Ok(())
    }
}
