//! Image loading utilities.
//!
//! Supports probing and decoding raw bytes and base64-encoded data URIs, and
//! converting decoded pixels into premultiplied surfaces for drawing.

use std::io::Cursor;

use tiny_skia::{ColorU8, IntSize, Pixmap};

use crate::error::{RenderError, RenderResult};

/// Side length of one checkerboard cell in a placeholder.
pub const PLACEHOLDER_CELL_SIZE: u32 = 16;

/// Decoded pixels in straight (non-premultiplied) RGBA8.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA pixel data (4 bytes per pixel).
    pub data: Vec<u8>,
    /// Original format of the image.
    pub format: ImageFormat,
}

impl DecodedImage {
    /// Convert to a premultiplied surface ready to be drawn.
    ///
    /// # Errors
    ///
    /// Returns an error if the dimensions are zero or do not match the data.
    pub fn to_pixmap(&self) -> RenderResult<Pixmap> {
        let size = IntSize::from_wh(self.width, self.height).ok_or_else(|| {
            RenderError::Surface(format!("invalid image size {}x{}", self.width, self.height))
        })?;

        let mut data = Vec::with_capacity(self.data.len());
        for px in self.data.chunks_exact(4) {
            let c = ColorU8::from_rgba(px[0], px[1], px[2], px[3]).premultiply();
            data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }

        Pixmap::from_vec(data, size).ok_or_else(|| {
            RenderError::Surface(format!(
                "pixel data does not match {}x{}",
                self.width, self.height
            ))
        })
    }
}

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// PNG with alpha support.
    Png,
    /// JPEG (no alpha).
    Jpeg,
    /// WebP (alpha support).
    WebP,
    /// GIF (first frame only).
    Gif,
    /// Windows bitmap.
    Bmp,
    /// Unknown/other format.
    Unknown,
}

impl ImageFormat {
    /// Detect format from magic bytes.
    #[must_use]
    pub fn from_magic_bytes(data: &[u8]) -> Self {
        if data.len() < 4 {
            return Self::Unknown;
        }

        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Self::Png;
        }
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Self::Jpeg;
        }
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Self::WebP;
        }
        if data.starts_with(b"GIF8") {
            return Self::Gif;
        }
        if data.starts_with(b"BM") {
            return Self::Bmp;
        }

        Self::Unknown
    }
}

/// Read only the image header and return its intrinsic `(width, height)`.
///
/// # Errors
///
/// Returns [`RenderError::Decode`] if the format is unknown or the header is
/// malformed.
pub fn probe_dimensions(data: &[u8]) -> RenderResult<(u32, u32)> {
    let (width, height) = image::ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| RenderError::Decode(format!("Failed to read image header: {e}")))?
        .into_dimensions()
        .map_err(|e| RenderError::Decode(format!("Failed to read image header: {e}")))?;

    if width == 0 || height == 0 {
        return Err(RenderError::Decode(format!(
            "Image has empty dimensions {width}x{height}"
        )));
    }
    Ok((width, height))
}

/// Decode an image from raw bytes.
///
/// # Errors
///
/// Returns an error if the image cannot be decoded.
pub fn decode_image(data: &[u8]) -> RenderResult<DecodedImage> {
    let format = ImageFormat::from_magic_bytes(data);

    let img = image::load_from_memory(data)
        .map_err(|e| RenderError::Decode(format!("Failed to decode image: {e}")))?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    Ok(DecodedImage {
        width,
        height,
        data: rgba.into_raw(),
        format,
    })
}

/// Extract the payload bytes of a data URI.
///
/// Supports base64 (`data:image/png;base64,iVBORw0KGgo...`) and
/// percent-encoded payloads.
///
/// # Errors
///
/// Returns an error if the data URI is malformed.
pub fn bytes_from_data_uri(uri: &str) -> RenderResult<Vec<u8>> {
    let uri_data = uri
        .strip_prefix("data:")
        .ok_or_else(|| RenderError::Resource("Not a data URI".to_string()))?;

    let (metadata, encoded) = uri_data
        .split_once(',')
        .ok_or_else(|| RenderError::Resource("Invalid data URI: missing comma".to_string()))?;

    if metadata.contains(";base64") {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| RenderError::Resource(format!("Failed to decode base64: {e}")))
    } else {
        percent_decode(encoded)
    }
}

fn percent_decode(input: &str) -> RenderResult<Vec<u8>> {
    let bytes = input.as_bytes();
    let mut result = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' {
            let byte = bytes
                .get(i + 1..i + 3)
                .and_then(|hex| std::str::from_utf8(hex).ok())
                .filter(|hex| hex.chars().all(|c| c.is_ascii_hexdigit()))
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
                .ok_or_else(|| RenderError::Resource("Invalid URL encoding".to_string()))?;
            result.push(byte);
            i += 3;
        } else {
            result.push(bytes[i]);
            i += 1;
        }
    }

    Ok(result)
}

/// Create a placeholder image with a gray checkerboard pattern.
#[must_use]
pub fn create_placeholder(width: u32, height: u32) -> DecodedImage {
    let mut data = Vec::with_capacity(width as usize * height as usize * 4);

    for y in 0..height {
        for x in 0..width {
            let cell = x / PLACEHOLDER_CELL_SIZE + y / PLACEHOLDER_CELL_SIZE;
            if cell.is_multiple_of(2) {
                data.extend_from_slice(&[200, 200, 200, 255]);
            } else {
                data.extend_from_slice(&[150, 150, 150, 255]);
            }
        }
    }

    DecodedImage {
        width,
        height,
        data,
        format: ImageFormat::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png)
            .expect("encode png");
        out.into_inner()
    }

    #[test]
    fn test_format_detection_from_magic_bytes() {
        assert_eq!(
            ImageFormat::from_magic_bytes(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]),
            ImageFormat::Png
        );
        assert_eq!(
            ImageFormat::from_magic_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]),
            ImageFormat::Jpeg
        );
        assert_eq!(
            ImageFormat::from_magic_bytes(b"RIFF\x00\x00\x00\x00WEBP"),
            ImageFormat::WebP
        );
        assert_eq!(ImageFormat::from_magic_bytes(b"GIF89a"), ImageFormat::Gif);
        assert_eq!(ImageFormat::from_magic_bytes(b"ab"), ImageFormat::Unknown);
    }

    #[test]
    fn test_probe_reads_header_dimensions() {
        let png = png_bytes(8, 5, [0, 0, 255, 255]);
        assert_eq!(probe_dimensions(&png).unwrap(), (8, 5));
        assert!(probe_dimensions(b"not an image at all").is_err());
    }

    #[test]
    fn test_decode_image() {
        let png = png_bytes(3, 2, [10, 20, 30, 255]);
        let decoded = decode_image(&png).unwrap();
        assert_eq!((decoded.width, decoded.height), (3, 2));
        assert_eq!(decoded.format, ImageFormat::Png);
        assert_eq!(&decoded.data[0..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn test_truncated_image_fails_decode() {
        let png = png_bytes(16, 16, [1, 2, 3, 255]);
        assert!(decode_image(&png[..png.len() / 2]).is_err());
    }

    #[test]
    fn test_data_uri_base64() {
        use base64::Engine;
        let png = png_bytes(2, 2, [255, 0, 0, 255]);
        let uri = format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&png)
        );
        let decoded = decode_image(&bytes_from_data_uri(&uri).unwrap()).unwrap();
        assert_eq!((decoded.width, decoded.height), (2, 2));
    }

    #[test]
    fn test_data_uri_errors() {
        assert!(bytes_from_data_uri("http://example.com/a.png").is_err());
        assert!(bytes_from_data_uri("data:image/png;base64").is_err());
        assert!(bytes_from_data_uri("data:text/plain,%zz").is_err());
        assert_eq!(bytes_from_data_uri("data:text/plain,a%20b").unwrap(), b"a b");
    }

    #[test]
    fn test_placeholder_checkerboard() {
        let placeholder = create_placeholder(32, 32);
        assert_eq!(placeholder.data.len(), 32 * 32 * 4);
        assert_eq!(&placeholder.data[0..4], &[200, 200, 200, 255]);
        let second_cell = (PLACEHOLDER_CELL_SIZE * 4) as usize;
        assert_eq!(&placeholder.data[second_cell..second_cell + 4], &[150, 150, 150, 255]);
    }

    #[test]
    fn test_pixmap_is_premultiplied() {
        let image = DecodedImage {
            width: 1,
            height: 1,
            data: vec![255, 0, 0, 128],
            format: ImageFormat::Unknown,
        };
        let pixmap = image.to_pixmap().unwrap();
        let px = pixmap.pixel(0, 0).unwrap();
        assert_eq!((px.red(), px.alpha()), (128, 128));
    }
}
