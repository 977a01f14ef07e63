//! Conversion between raw byte rows and packed pixels.
//!
//! Encoders and decoders exchange image data one row at a time as bytes in an
//! external [`ComponentOrder`], optionally followed by padding. The functions
//! here translate such rows into packed pixels and back. The default path
//! moves every channel as an individual byte and is therefore independent of
//! the platform byte order; the `*_words` variants load each pixel as a
//! 32-bit word and take an explicit [`Endianness`].

use std::{
    fmt,
    io::{Read, Write},
    str::FromStr,
};

use crate::{error::ImageError, image::Image, pixel::PackedPixel};

/// Channel order and count of a pixel in an external byte stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComponentOrder {
    /// Red, green, blue; alpha is implied opaque.
    Rgb,
    /// Red, green, blue, alpha.
    Rgba,
    /// Blue, green, red; alpha is implied opaque.
    Bgr,
    /// Blue, green, red, alpha.
    Bgra,
}

impl ComponentOrder {
    /// Number of bytes per pixel.
    pub const fn channels(&self) -> usize {
        match self {
            ComponentOrder::Rgb | ComponentOrder::Bgr => 3,
            ComponentOrder::Rgba | ComponentOrder::Bgra => 4,
        }
    }

    /// Whether alpha is stored in the stream.
    pub const fn has_alpha(&self) -> bool {
        self.channels() == 4
    }

    /// Byte offset of the red, green, blue and alpha channels within a pixel.
    ///
    /// Alpha has no offset for three channel orders.
    pub const fn offsets(&self) -> ([usize; 3], Option<usize>) {
        match self {
            ComponentOrder::Rgb => ([0, 1, 2], None),
            ComponentOrder::Rgba => ([0, 1, 2], Some(3)),
            ComponentOrder::Bgr => ([2, 1, 0], None),
            ComponentOrder::Bgra => ([2, 1, 0], Some(3)),
        }
    }

    /// Decode a raw tag as stored in some container headers.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::UnsupportedFormat`] for tags outside `0..=3`.
    pub fn from_tag(tag: u8) -> Result<Self, ImageError> {
        match tag {
            0 => Ok(ComponentOrder::Rgb),
            1 => Ok(ComponentOrder::Rgba),
            2 => Ok(ComponentOrder::Bgr),
            3 => Ok(ComponentOrder::Bgra),
            t => Err(ImageError::UnsupportedFormat(format!(
                "component order tag {t}"
            ))),
        }
    }

    /// The raw tag understood by [`ComponentOrder::from_tag`].
    pub const fn tag(&self) -> u8 {
        match self {
            ComponentOrder::Rgb => 0,
            ComponentOrder::Rgba => 1,
            ComponentOrder::Bgr => 2,
            ComponentOrder::Bgra => 3,
        }
    }

    /// Number of bytes in a row of `width` pixels followed by `padding` bytes.
    pub const fn row_len(&self, width: usize, padding: usize) -> usize {
        width * self.channels() + padding
    }
}

impl fmt::Display for ComponentOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ComponentOrder::Rgb => "RGB",
            ComponentOrder::Rgba => "RGBA",
            ComponentOrder::Bgr => "BGR",
            ComponentOrder::Bgra => "BGRA",
        };
        f.write_str(name)
    }
}

impl FromStr for ComponentOrder {
    type Err = ImageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rgb" => Ok(ComponentOrder::Rgb),
            "rgba" => Ok(ComponentOrder::Rgba),
            "bgr" => Ok(ComponentOrder::Bgr),
            "bgra" => Ok(ComponentOrder::Bgra),
            _ => Err(ImageError::UnsupportedFormat(format!(
                "component order '{s}'"
            ))),
        }
    }
}

/// Byte order used when a pixel is loaded as a single word.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endianness {
    /// Least significant byte first.
    Little,
    /// Most significant byte first.
    Big,
}

impl Endianness {
    /// The byte order of the target platform.
    pub const NATIVE: Endianness = if cfg!(target_endian = "big") {
        Endianness::Big
    } else {
        Endianness::Little
    };

    #[inline]
    fn load(&self, bytes: [u8; 4]) -> u32 {
        match self {
            Endianness::Little => u32::from_le_bytes(bytes),
            Endianness::Big => u32::from_be_bytes(bytes),
        }
    }

    #[inline]
    fn store(&self, word: u32) -> [u8; 4] {
        match self {
            Endianness::Little => word.to_le_bytes(),
            Endianness::Big => word.to_be_bytes(),
        }
    }

    /// Shift that brings byte `index` of a loaded word into the low byte.
    #[inline]
    const fn shift(&self, index: usize) -> u32 {
        match self {
            Endianness::Little => 8 * index as u32,
            Endianness::Big => 8 * (3 - index as u32),
        }
    }
}

fn check_row(bytes: usize, width: usize, order: ComponentOrder) -> Result<usize, ImageError> {
    let expected = width * order.channels();
    if bytes < expected {
        return Err(ImageError::InvalidRowLength(bytes, expected));
    }
    Ok(expected)
}

/// Decode one row of bytes into packed pixels.
///
/// `bytes` must hold at least `out.len() * order.channels()` bytes; anything
/// after that is padding and is ignored. Three channel orders decode with an
/// opaque alpha.
///
/// # Example
///
/// ```
/// use pixproc_image::{pixel::Rgba32, row::{decode_row, ComponentOrder}};
///
/// let mut out = [Rgba32::TRANSPARENT; 2];
/// decode_row(&[3, 2, 1, 6, 5, 4, 0], ComponentOrder::Bgr, &mut out).unwrap();
///
/// assert_eq!(out, [Rgba32::new(1, 2, 3, 255), Rgba32::new(4, 5, 6, 255)]);
/// ```
pub fn decode_row<P: PackedPixel>(
    bytes: &[u8],
    order: ComponentOrder,
    out: &mut [P],
) -> Result<(), ImageError> {
    let len = check_row(bytes.len(), out.len(), order)?;
    let ([r, g, b], alpha) = order.offsets();
    let bytes = &bytes[..len];

    match alpha {
        Some(a) => {
            for (px, src) in out.iter_mut().zip(bytes.chunks_exact(4)) {
                *px = P::from_bytes(src[r], src[g], src[b], src[a]);
            }
        }
        None => {
            for (px, src) in out.iter_mut().zip(bytes.chunks_exact(3)) {
                *px = P::from_bytes(src[r], src[g], src[b], 255);
            }
        }
    }

    Ok(())
}

/// Encode packed pixels into one row of bytes.
///
/// Only the first `pixels.len() * order.channels()` bytes are written; any
/// trailing padding in `bytes` is left untouched. Three channel orders drop
/// alpha.
pub fn encode_row<P: PackedPixel>(
    pixels: &[P],
    order: ComponentOrder,
    bytes: &mut [u8],
) -> Result<(), ImageError> {
    let len = check_row(bytes.len(), pixels.len(), order)?;
    let ([r, g, b], alpha) = order.offsets();
    let bytes = &mut bytes[..len];

    match alpha {
        Some(a) => {
            for (px, dst) in pixels.iter().zip(bytes.chunks_exact_mut(4)) {
                let [pr, pg, pb, pa] = px.to_bytes();
                dst[r] = pr;
                dst[g] = pg;
                dst[b] = pb;
                dst[a] = pa;
            }
        }
        None => {
            for (px, dst) in pixels.iter().zip(bytes.chunks_exact_mut(3)) {
                let [pr, pg, pb, _] = px.to_bytes();
                dst[r] = pr;
                dst[g] = pg;
                dst[b] = pb;
            }
        }
    }

    Ok(())
}

/// Decode one row by loading every pixel as a 32-bit word.
///
/// Produces the same pixels as [`decode_row`] for either byte order; the
/// channel shifts are chosen to match `endianness`.
pub fn decode_row_words<P: PackedPixel>(
    bytes: &[u8],
    order: ComponentOrder,
    endianness: Endianness,
    out: &mut [P],
) -> Result<(), ImageError> {
    let len = check_row(bytes.len(), out.len(), order)?;
    let channels = order.channels();
    let ([r, g, b], alpha) = order.offsets();
    let [sr, sg, sb] = [r, g, b].map(|i| endianness.shift(i));
    let sa = alpha.map(|i| endianness.shift(i));

    for (px, src) in out.iter_mut().zip(bytes[..len].chunks_exact(channels)) {
        let mut group = [0u8; 4];
        group[..channels].copy_from_slice(src);
        let word = endianness.load(group);

        let a = match sa {
            Some(s) => (word >> s) as u8,
            None => 255,
        };
        *px = P::from_bytes((word >> sr) as u8, (word >> sg) as u8, (word >> sb) as u8, a);
    }

    Ok(())
}

/// Encode one row by composing every pixel as a 32-bit word.
///
/// The inverse of [`decode_row_words`]; produces the same bytes as
/// [`encode_row`] for either byte order.
pub fn encode_row_words<P: PackedPixel>(
    pixels: &[P],
    order: ComponentOrder,
    endianness: Endianness,
    bytes: &mut [u8],
) -> Result<(), ImageError> {
    let len = check_row(bytes.len(), pixels.len(), order)?;
    let channels = order.channels();
    let ([r, g, b], alpha) = order.offsets();

    for (px, dst) in pixels.iter().zip(bytes[..len].chunks_exact_mut(channels)) {
        let [pr, pg, pb, pa] = px.to_bytes();
        let mut word = (pr as u32) << endianness.shift(r)
            | (pg as u32) << endianness.shift(g)
            | (pb as u32) << endianness.shift(b);
        if let Some(a) = alpha {
            word |= (pa as u32) << endianness.shift(a);
        }
        dst.copy_from_slice(&endianness.store(word)[..channels]);
    }

    Ok(())
}

/// Read one raw row of `width * channels + padding` bytes from a stream.
pub fn read_row<R: Read>(
    stream: &mut R,
    width: usize,
    order: ComponentOrder,
    padding: usize,
) -> Result<Vec<u8>, ImageError> {
    let mut row = vec![0u8; order.row_len(width, padding)];
    stream.read_exact(&mut row)?;
    Ok(row)
}

/// Write one raw row to a stream, checking its length first.
pub fn write_row<W: Write>(
    stream: &mut W,
    bytes: &[u8],
    width: usize,
    order: ComponentOrder,
    padding: usize,
) -> Result<(), ImageError> {
    let expected = order.row_len(width, padding);
    if bytes.len() != expected {
        return Err(ImageError::InvalidRowLength(bytes.len(), expected));
    }
    stream.write_all(bytes)?;
    Ok(())
}

/// Row reader/writer bound to a fixed width, component order and padding.
///
/// Owns a single scratch row that is reused for every call, so decoding an
/// image allocates once.
pub struct RowCodec {
    width: usize,
    order: ComponentOrder,
    padding: usize,
    scratch: Vec<u8>,
}

impl RowCodec {
    /// Create a codec for rows of `width` pixels.
    pub fn new(width: usize, order: ComponentOrder, padding: usize) -> Self {
        Self {
            width,
            order,
            padding,
            scratch: vec![0u8; order.row_len(width, padding)],
        }
    }

    /// Row width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// External component order.
    pub fn order(&self) -> ComponentOrder {
        self.order
    }

    /// Trailing bytes per row.
    pub fn padding(&self) -> usize {
        self.padding
    }

    /// Total bytes per row, padding included.
    pub fn row_len(&self) -> usize {
        self.scratch.len()
    }

    /// The last row read or written, padding included.
    pub fn raw_row(&self) -> &[u8] {
        &self.scratch
    }

    /// Mutable access to the scratch row, e.g. to set padding bytes before writing.
    pub fn raw_row_mut(&mut self) -> &mut [u8] {
        &mut self.scratch
    }

    fn check_width(&self, pixels: usize) -> Result<(), ImageError> {
        if pixels != self.width {
            return Err(ImageError::InvalidArgument(format!(
                "row holds {pixels} pixels, codec expects {}",
                self.width
            )));
        }
        Ok(())
    }

    /// Read one row from the stream and decode it into `out`.
    ///
    /// The padding bytes of the row stay available through [`RowCodec::raw_row`].
    pub fn read_row<R: Read, P: PackedPixel>(
        &mut self,
        stream: &mut R,
        out: &mut [P],
    ) -> Result<(), ImageError> {
        self.check_width(out.len())?;
        stream.read_exact(&mut self.scratch)?;
        decode_row(&self.scratch, self.order, out)
    }

    /// Encode `pixels` and write the row to the stream.
    ///
    /// Padding bytes are written verbatim from the scratch row.
    pub fn write_row<W: Write, P: PackedPixel>(
        &mut self,
        stream: &mut W,
        pixels: &[P],
    ) -> Result<(), ImageError> {
        self.check_width(pixels.len())?;
        encode_row(pixels, self.order, &mut self.scratch)?;
        stream.write_all(&self.scratch)?;
        Ok(())
    }

    /// Read every row of `image` from the stream, top to bottom.
    ///
    /// One row is consumed per image row even when the image has no columns,
    /// so padding-only rows stay in step with the stream.
    pub fn read_image<R: Read, P: PackedPixel>(
        &mut self,
        stream: &mut R,
        image: &mut Image<P>,
    ) -> Result<(), ImageError> {
        self.check_width(image.width())?;
        for y in 0..image.height() {
            self.read_row(stream, image.row_mut(y)?)?;
        }
        log::debug!(
            "decoded {}x{} {} rows",
            image.width(),
            image.height(),
            self.order
        );
        Ok(())
    }

    /// Write every row of `image` to the stream, top to bottom.
    pub fn write_image<W: Write, P: PackedPixel>(
        &mut self,
        stream: &mut W,
        image: &Image<P>,
    ) -> Result<(), ImageError> {
        self.check_width(image.width())?;
        for y in 0..image.height() {
            self.write_row(stream, image.row(y)?)?;
        }
        log::debug!(
            "encoded {}x{} {} rows",
            image.width(),
            image.height(),
            self.order
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        image::ImageSize,
        pixel::{Bgra32, Rgba32, Rgba64},
    };

    const ORDERS: [ComponentOrder; 4] = [
        ComponentOrder::Rgb,
        ComponentOrder::Rgba,
        ComponentOrder::Bgr,
        ComponentOrder::Bgra,
    ];

    fn pixels() -> Vec<Rgba32> {
        vec![
            Rgba32::new(1, 2, 3, 4),
            Rgba32::new(250, 128, 0, 255),
            Rgba32::new(9, 8, 7, 0),
        ]
    }

    #[test]
    fn component_counts() {
        assert_eq!(ComponentOrder::Rgb.channels(), 3);
        assert_eq!(ComponentOrder::Bgr.channels(), 3);
        assert_eq!(ComponentOrder::Rgba.channels(), 4);
        assert_eq!(ComponentOrder::Bgra.channels(), 4);
        assert_eq!(ComponentOrder::Bgra.row_len(10, 2), 42);
    }

    #[test]
    fn unsupported_orders() {
        assert!(matches!(
            ComponentOrder::from_tag(4),
            Err(ImageError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            "argb".parse::<ComponentOrder>(),
            Err(ImageError::UnsupportedFormat(_))
        ));
        for order in ORDERS {
            assert_eq!(ComponentOrder::from_tag(order.tag()).ok(), Some(order));
            assert_eq!(order.to_string().parse::<ComponentOrder>().ok(), Some(order));
        }
    }

    #[test]
    fn decode_layouts() -> Result<(), ImageError> {
        let bytes = [10, 20, 30, 40];
        let mut out = [Rgba32::TRANSPARENT; 1];

        decode_row(&bytes, ComponentOrder::Rgba, &mut out)?;
        assert_eq!(out[0], Rgba32::new(10, 20, 30, 40));

        decode_row(&bytes, ComponentOrder::Bgra, &mut out)?;
        assert_eq!(out[0], Rgba32::new(30, 20, 10, 40));

        decode_row(&bytes, ComponentOrder::Rgb, &mut out)?;
        assert_eq!(out[0], Rgba32::new(10, 20, 30, 255));

        decode_row(&bytes, ComponentOrder::Bgr, &mut out)?;
        assert_eq!(out[0], Rgba32::new(30, 20, 10, 255));
        Ok(())
    }

    #[test]
    fn roundtrip_all_orders() -> Result<(), ImageError> {
        let src = pixels();
        for order in ORDERS {
            let mut bytes = vec![0u8; order.row_len(src.len(), 0)];
            encode_row(&src, order, &mut bytes)?;

            let mut back = vec![Bgra32::TRANSPARENT; src.len()];
            decode_row(&bytes, order, &mut back)?;

            for (a, b) in src.iter().zip(back.iter()) {
                let mut expected = a.to_bytes();
                if !order.has_alpha() {
                    expected[3] = 255;
                }
                assert_eq!(b.to_bytes(), expected, "{order}");
            }
        }
        Ok(())
    }

    #[test]
    fn padding_is_preserved() -> Result<(), ImageError> {
        let src = pixels();
        let mut bytes = vec![0xAB; ComponentOrder::Rgb.row_len(src.len(), 3)];
        encode_row(&src, ComponentOrder::Rgb, &mut bytes)?;
        assert_eq!(&bytes[9..], &[0xAB, 0xAB, 0xAB]);
        assert_eq!(&bytes[..3], &[1, 2, 3]);
        Ok(())
    }

    #[test]
    fn short_rows_are_rejected() {
        let mut out = [Rgba32::TRANSPARENT; 2];
        assert!(matches!(
            decode_row(&[0u8; 7], ComponentOrder::Rgba, &mut out),
            Err(ImageError::InvalidRowLength(7, 8))
        ));
        let mut bytes = [0u8; 5];
        assert!(matches!(
            encode_row(&out, ComponentOrder::Rgb, &mut bytes),
            Err(ImageError::InvalidRowLength(5, 6))
        ));
    }

    #[test]
    fn endianness_independent() -> Result<(), ImageError> {
        let bytes: Vec<u8> = (0..24).map(|i| i * 7 + 3).collect();
        for order in ORDERS {
            let width = 24 / order.channels();
            let mut reference = vec![Rgba32::TRANSPARENT; width];
            decode_row(&bytes, order, &mut reference)?;

            for endianness in [Endianness::Little, Endianness::Big] {
                let mut out = vec![Rgba32::TRANSPARENT; width];
                decode_row_words(&bytes, order, endianness, &mut out)?;
                assert_eq!(out, reference, "{order} {endianness:?}");

                let mut encoded = vec![0u8; bytes.len()];
                encode_row_words(&out, order, endianness, &mut encoded)?;
                assert_eq!(encoded, bytes, "{order} {endianness:?}");
            }
        }
        Ok(())
    }

    #[test]
    fn wide_pixels_decode() -> Result<(), ImageError> {
        let mut out = [Rgba64::default(); 1];
        decode_row(&[255, 0, 1], ComponentOrder::Rgb, &mut out)?;
        assert_eq!(out[0].channels(), [65535, 0, 257, 65535]);
        Ok(())
    }

    #[test]
    fn codec_stream_roundtrip() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 3,
            height: 2,
        };
        let mut data = pixels();
        data.extend(pixels().into_iter().rev());
        let image = Image::from_vec(size, data)?;

        let mut codec = RowCodec::new(3, ComponentOrder::Bgra, 2);
        let mut stream = Vec::new();
        codec.write_image(&mut stream, &image)?;
        assert_eq!(stream.len(), 2 * 14);

        let mut decoded = Image::<Rgba32>::new(size);
        let mut reader = std::io::Cursor::new(stream);
        RowCodec::new(3, ComponentOrder::Bgra, 2).read_image(&mut reader, &mut decoded)?;
        assert_eq!(decoded, image);
        Ok(())
    }

    #[test]
    fn zero_width_image_consumes_padding_rows() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 0,
            height: 3,
        };
        let mut codec = RowCodec::new(0, ComponentOrder::Rgb, 2);
        codec.raw_row_mut().copy_from_slice(&[0xCA, 0xFE]);

        let mut stream = Vec::new();
        codec.write_image(&mut stream, &Image::<Rgba32>::new(size))?;
        assert_eq!(stream, [0xCA, 0xFE].repeat(3));

        // the next row must start right after the padding rows
        stream.extend_from_slice(&[9, 8, 7]);
        let mut reader = std::io::Cursor::new(stream);
        codec.read_image(&mut reader, &mut Image::<Rgba32>::new(size))?;
        assert_eq!(
            read_row(&mut reader, 1, ComponentOrder::Rgb, 0)?,
            vec![9, 8, 7]
        );
        Ok(())
    }

    #[test]
    fn codec_rejects_wrong_width() {
        let mut codec = RowCodec::new(4, ComponentOrder::Rgb, 0);
        let mut out = [Rgba32::TRANSPARENT; 3];
        let mut stream = std::io::Cursor::new(vec![0u8; 12]);
        assert!(matches!(
            codec.read_row(&mut stream, &mut out),
            Err(ImageError::InvalidArgument(_))
        ));
    }

    #[test]
    fn truncated_stream_is_io_error() {
        let mut stream = std::io::Cursor::new(vec![0u8; 5]);
        assert!(matches!(
            read_row(&mut stream, 2, ComponentOrder::Rgb, 0),
            Err(ImageError::Io(_))
        ));
    }

    #[test]
    fn raw_row_boundary() -> Result<(), ImageError> {
        let mut stream = std::io::Cursor::new((0u8..10).collect::<Vec<_>>());
        let row = read_row(&mut stream, 2, ComponentOrder::Rgba, 2)?;
        assert_eq!(row.len(), 10);

        let mut out = Vec::new();
        write_row(&mut out, &row, 2, ComponentOrder::Rgba, 2)?;
        assert_eq!(out, row);
        assert!(write_row(&mut out, &row[..9], 2, ComponentOrder::Rgba, 2).is_err());
        Ok(())
    }
}
