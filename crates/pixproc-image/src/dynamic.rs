use std::{fmt, str::FromStr};

use crate::{
    error::ImageError,
    image::{Image, ImageSize},
    pixel::{Bgra32, PackedPixel, Rgba32, Rgba64},
};

/// Runtime tag for the supported packed pixel formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// See [`Rgba32`].
    Rgba32,
    /// See [`Bgra32`].
    Bgra32,
    /// See [`Rgba64`].
    Rgba64,
}

impl PixelFormat {
    /// All supported formats.
    pub const ALL: [PixelFormat; 3] = [
        PixelFormat::Rgba32,
        PixelFormat::Bgra32,
        PixelFormat::Rgba64,
    ];

    /// Size of one packed pixel in bits.
    pub const fn bits_per_pixel(&self) -> usize {
        match self {
            PixelFormat::Rgba32 | PixelFormat::Bgra32 => 32,
            PixelFormat::Rgba64 => 64,
        }
    }

    /// Size of one packed pixel in bytes.
    pub const fn bytes_per_pixel(&self) -> usize {
        self.bits_per_pixel() / 8
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PixelFormat::Rgba32 => "Rgba32",
            PixelFormat::Bgra32 => "Bgra32",
            PixelFormat::Rgba64 => "Rgba64",
        };
        f.write_str(name)
    }
}

impl FromStr for PixelFormat {
    type Err = ImageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rgba32" => Ok(PixelFormat::Rgba32),
            "bgra32" => Ok(PixelFormat::Bgra32),
            "rgba64" => Ok(PixelFormat::Rgba64),
            _ => Err(ImageError::UnsupportedFormat(format!("pixel format '{s}'"))),
        }
    }
}

/// An image whose pixel format is only known at runtime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DynamicImage {
    /// An [`Rgba32`] image.
    Rgba32(Image<Rgba32>),
    /// A [`Bgra32`] image.
    Bgra32(Image<Bgra32>),
    /// An [`Rgba64`] image.
    Rgba64(Image<Rgba64>),
}

macro_rules! dispatch {
    ($value:expr, $image:ident => $body:expr) => {
        match $value {
            DynamicImage::Rgba32($image) => $body,
            DynamicImage::Bgra32($image) => $body,
            DynamicImage::Rgba64($image) => $body,
        }
    };
}

impl DynamicImage {
    /// Allocate a zero-filled image of the given format.
    pub fn from_format(format: PixelFormat, size: ImageSize) -> Self {
        match format {
            PixelFormat::Rgba32 => DynamicImage::Rgba32(Image::new(size)),
            PixelFormat::Bgra32 => DynamicImage::Bgra32(Image::new(size)),
            PixelFormat::Rgba64 => DynamicImage::Rgba64(Image::new(size)),
        }
    }

    /// The pixel format of the wrapped image.
    pub fn format(&self) -> PixelFormat {
        match self {
            DynamicImage::Rgba32(_) => PixelFormat::Rgba32,
            DynamicImage::Bgra32(_) => PixelFormat::Bgra32,
            DynamicImage::Rgba64(_) => PixelFormat::Rgba64,
        }
    }

    /// The size of the wrapped image.
    pub fn size(&self) -> ImageSize {
        dispatch!(self, image => image.size())
    }

    /// Convert into a concrete pixel format.
    pub fn to_image<P: PackedPixel>(&self) -> Image<P> {
        dispatch!(self, image => image.convert())
    }

    /// Convert into an 8-bit RGBA image.
    pub fn to_rgba32(&self) -> Image<Rgba32> {
        self.to_image()
    }

    /// Convert into another runtime format.
    pub fn to_format(&self, format: PixelFormat) -> DynamicImage {
        match format {
            PixelFormat::Rgba32 => DynamicImage::Rgba32(self.to_image()),
            PixelFormat::Bgra32 => DynamicImage::Bgra32(self.to_image()),
            PixelFormat::Rgba64 => DynamicImage::Rgba64(self.to_image()),
        }
    }

    /// The raw pixel bytes in native byte order.
    pub fn as_bytes(&self) -> &[u8] {
        dispatch!(self, image => bytemuck::cast_slice(image.as_slice()))
    }
}

impl From<Image<Rgba32>> for DynamicImage {
    fn from(image: Image<Rgba32>) -> Self {
        DynamicImage::Rgba32(image)
    }
}

impl From<Image<Bgra32>> for DynamicImage {
    fn from(image: Image<Bgra32>) -> Self {
        DynamicImage::Bgra32(image)
    }
}

impl From<Image<Rgba64>> for DynamicImage {
    fn from(image: Image<Rgba64>) -> Self {
        DynamicImage::Rgba64(image)
    }
}
