use std::{fmt, hash::Hash, str::FromStr};

use glam::Vec4;
use num_traits::{Bounded, NumCast, PrimInt};

use crate::{dynamic::PixelFormat, error::ImageError};

/// A pixel stored in a specific physical bit encoding.
///
/// Every format converts to and from the canonical color vector: a [`Vec4`]
/// holding (R, G, B, A) in the `[0, 1]` range. Packing is total: values are
/// clamped, scaled to the channel range and rounded half away from zero, so
/// `pack` never fails. Equality and hashing use the packed bits only.
///
/// Formats are plain `Copy` values and also [`bytemuck::Pod`], so a pixel
/// buffer can be viewed as its packed words without copying.
pub trait PackedPixel:
    Copy
    + Default
    + PartialEq
    + Eq
    + Hash
    + fmt::Debug
    + Send
    + Sync
    + bytemuck::Pod
    + 'static
{
    /// The integer word holding all four channels.
    type Packed: Copy + Eq + Hash + fmt::Debug + bytemuck::Pod;

    /// The runtime tag of this format.
    const FORMAT: PixelFormat;

    /// Pack a canonical color vector.
    fn pack(vector: Vec4) -> Self;

    /// Expand the pixel into a canonical color vector.
    fn to_vec4(&self) -> Vec4;

    /// Compose a pixel directly from 8-bit channels without float scaling.
    fn from_bytes(r: u8, g: u8, b: u8, a: u8) -> Self;

    /// The pixel as 8-bit channels in (R, G, B, A) order.
    fn to_bytes(&self) -> [u8; 4];

    /// The raw packed word.
    fn packed(&self) -> Self::Packed;

    /// Build a pixel from a raw packed word.
    fn from_packed(packed: Self::Packed) -> Self;
}

/// Round an already scaled channel value and narrow it to the channel type.
///
/// Rounds half away from zero. Anything that does not fit, NaN included,
/// becomes zero, so callers must clamp first.
#[inline]
pub(crate) fn quantize_scaled<C: PrimInt>(scaled: f32) -> C {
    <C as NumCast>::from(scaled.round()).unwrap_or_else(C::zero)
}

/// Clamp a unit value to `[0, 1]` and quantize it to the full channel range.
#[inline]
pub fn quantize<C: PrimInt + Bounded>(value: f32) -> C {
    let max = C::max_value().to_f32().unwrap_or(0.0);
    quantize_scaled(value.clamp(0.0, 1.0) * max)
}

/// Map a channel value back to the unit range.
#[inline]
pub fn normalize<C: PrimInt + Bounded>(value: C) -> f32 {
    let max = C::max_value().to_f32().unwrap_or(1.0);
    value.to_f32().unwrap_or(0.0) / max
}

macro_rules! define_packed_u32 {
    ($name:ident, $r:expr, $g:expr, $b:expr, $a:expr, $doc:expr) => {
        #[doc = $doc]
        #[repr(transparent)]
        #[derive(Clone, Copy, Default, PartialEq, Eq, Hash, bytemuck::Pod, bytemuck::Zeroable)]
        pub struct $name(u32);

        impl $name {
            /// Fully transparent black.
            pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
            /// Opaque black.
            pub const BLACK: Self = Self::new(0, 0, 0, 255);
            /// Opaque white.
            pub const WHITE: Self = Self::new(255, 255, 255, 255);
            /// Opaque red.
            pub const RED: Self = Self::new(255, 0, 0, 255);
            /// Opaque green.
            pub const GREEN: Self = Self::new(0, 255, 0, 255);
            /// Opaque blue.
            pub const BLUE: Self = Self::new(0, 0, 255, 255);

            /// Create a pixel from 8-bit channels.
            pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
                Self(
                    (r as u32) << $r
                        | (g as u32) << $g
                        | (b as u32) << $b
                        | (a as u32) << $a,
                )
            }

            /// The red channel.
            pub const fn r(&self) -> u8 {
                (self.0 >> $r) as u8
            }

            /// The green channel.
            pub const fn g(&self) -> u8 {
                (self.0 >> $g) as u8
            }

            /// The blue channel.
            pub const fn b(&self) -> u8 {
                (self.0 >> $b) as u8
            }

            /// The alpha channel.
            pub const fn a(&self) -> u8 {
                (self.0 >> $a) as u8
            }

            /// Parse a `RGB`, `RRGGBB` or `AARRGGBB` hex string, with or without `#`.
            pub fn from_hex(hex: &str) -> Result<Self, ImageError> {
                let [r, g, b, a] = parse_hex(hex)?;
                Ok(Self::new(r, g, b, a))
            }

            /// Format the pixel as an `AARRGGBB` hex string.
            pub fn to_hex(&self) -> String {
                format!(
                    "{:02X}{:02X}{:02X}{:02X}",
                    self.a(),
                    self.r(),
                    self.g(),
                    self.b()
                )
            }
        }

        impl PackedPixel for $name {
            type Packed = u32;

            const FORMAT: PixelFormat = PixelFormat::$name;

            fn pack(vector: Vec4) -> Self {
                Self::new(
                    quantize(vector.x),
                    quantize(vector.y),
                    quantize(vector.z),
                    quantize(vector.w),
                )
            }

            fn to_vec4(&self) -> Vec4 {
                Vec4::new(
                    normalize(self.r()),
                    normalize(self.g()),
                    normalize(self.b()),
                    normalize(self.a()),
                )
            }

            #[inline]
            fn from_bytes(r: u8, g: u8, b: u8, a: u8) -> Self {
                Self::new(r, g, b, a)
            }

            #[inline]
            fn to_bytes(&self) -> [u8; 4] {
                [self.r(), self.g(), self.b(), self.a()]
            }

            #[inline]
            fn packed(&self) -> u32 {
                self.0
            }

            #[inline]
            fn from_packed(packed: u32) -> Self {
                Self(packed)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("r", &self.r())
                    .field("g", &self.g())
                    .field("b", &self.b())
                    .field("a", &self.a())
                    .finish()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "#{}", self.to_hex())
            }
        }

        impl FromStr for $name {
            type Err = ImageError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_hex(s)
            }
        }
    };
}

define_packed_u32!(
    Rgba32,
    0,
    8,
    16,
    24,
    "8-bit RGBA pixel packed as `r | g << 8 | b << 16 | a << 24`."
);

define_packed_u32!(
    Bgra32,
    16,
    8,
    0,
    24,
    "8-bit BGRA pixel packed as `b | g << 8 | r << 16 | a << 24`."
);

/// 16-bit RGBA pixel packed as `r | g << 16 | b << 32 | a << 48`.
#[repr(transparent)]
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Rgba64(u64);

impl Rgba64 {
    /// Create a pixel from 16-bit channels.
    pub const fn new(r: u16, g: u16, b: u16, a: u16) -> Self {
        Self((r as u64) | (g as u64) << 16 | (b as u64) << 32 | (a as u64) << 48)
    }

    /// The 16-bit channels in (R, G, B, A) order.
    pub const fn channels(&self) -> [u16; 4] {
        [
            self.0 as u16,
            (self.0 >> 16) as u16,
            (self.0 >> 32) as u16,
            (self.0 >> 48) as u16,
        ]
    }
}

impl PackedPixel for Rgba64 {
    type Packed = u64;

    const FORMAT: PixelFormat = PixelFormat::Rgba64;

    fn pack(vector: Vec4) -> Self {
        Self::new(
            quantize(vector.x),
            quantize(vector.y),
            quantize(vector.z),
            quantize(vector.w),
        )
    }

    fn to_vec4(&self) -> Vec4 {
        let [r, g, b, a] = self.channels();
        Vec4::new(normalize(r), normalize(g), normalize(b), normalize(a))
    }

    // x * 257 maps 0..=255 exactly onto 0..=65535
    fn from_bytes(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::new(
            r as u16 * 257,
            g as u16 * 257,
            b as u16 * 257,
            a as u16 * 257,
        )
    }

    fn to_bytes(&self) -> [u8; 4] {
        self.channels()
            .map(|c| quantize_scaled::<u8>(c as f32 / 257.0))
    }

    fn packed(&self) -> u64 {
        self.0
    }

    fn from_packed(packed: u64) -> Self {
        Self(packed)
    }
}

impl fmt::Debug for Rgba64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.channels();
        f.debug_struct("Rgba64")
            .field("r", &r)
            .field("g", &g)
            .field("b", &b)
            .field("a", &a)
            .finish()
    }
}

/// Parse a hex color into (R, G, B, A) bytes.
///
/// Accepts `RGB` (each digit duplicated, opaque), `RRGGBB` (opaque) and
/// `AARRGGBB`, each optionally prefixed by `#`.
///
/// # Errors
///
/// Returns [`ImageError::InvalidFormat`] for any other length or for
/// characters that are not hex digits.
///
/// # Example
///
/// ```
/// use pixproc_image::pixel::parse_hex;
///
/// assert_eq!(parse_hex("#FFF").unwrap(), [255, 255, 255, 255]);
/// assert_eq!(parse_hex("AA336699").unwrap(), [51, 102, 153, 170]);
/// ```
pub fn parse_hex(hex: &str) -> Result<[u8; 4], ImageError> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);

    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ImageError::InvalidFormat(format!(
            "'{hex}' contains non hexadecimal characters"
        )));
    }

    let byte = |i: usize| {
        u8::from_str_radix(&digits[i..i + 2], 16)
            .map_err(|e| ImageError::InvalidFormat(format!("'{hex}': {e}")))
    };

    match digits.len() {
        3 => {
            let mut out = [255u8; 4];
            for (dst, c) in out.iter_mut().zip(digits.chars()) {
                // is_ascii_hexdigit was checked above
                let nibble = c.to_digit(16).unwrap_or(0) as u8;
                *dst = nibble * 17;
            }
            Ok(out)
        }
        6 => Ok([byte(0)?, byte(2)?, byte(4)?, 255]),
        8 => Ok([byte(2)?, byte(4)?, byte(6)?, byte(0)?]),
        n => Err(ImageError::InvalidFormat(format!(
            "'{hex}' has {n} digits, expected 3, 6 or 8"
        ))),
    }
}

/// Parse a hex color into any packed pixel format.
pub fn from_hex<P: PackedPixel>(hex: &str) -> Result<P, ImageError> {
    let [r, g, b, a] = parse_hex(hex)?;
    Ok(P::from_bytes(r, g, b, a))
}

/// Convert a pixel between formats through the canonical color vector.
#[inline]
pub fn convert_pixel<P: PackedPixel, Q: PackedPixel>(pixel: P) -> Q {
    Q::pack(pixel.to_vec4())
}
