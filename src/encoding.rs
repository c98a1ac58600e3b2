//! Output encodings.
//!
//! [`OutputEncoding`] names the format of every produced file and decides
//! both its MIME type and its filename extension, so the two can never
//! disagree. Encoding itself is delegated to the `image` crate (PNG, JPEG)
//! and to `libwebp` through the `webp` crate (lossy and lossless WebP).

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::io::Cursor;

use image::{
    ExtendedColorType, ImageEncoder, RgbImage, RgbaImage,
    buffer::ConvertBuffer,
    codecs::{jpeg::JpegEncoder, png::PngEncoder},
};

use crate::error::ExtractError;

/// Quality used when none is given for a lossy encoding.
pub const DEFAULT_QUALITY: u8 = 95;

/// Target format and quality for produced images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputEncoding {
    /// Lossless PNG. This is the default.
    #[default]
    Png,
    /// Lossy JPEG with a quality factor in `1..=100`.
    Jpeg {
        /// Quality factor.
        quality: u8,
    },
    /// Lossy WebP with a quality factor in `1..=100`.
    WebP {
        /// Quality factor.
        quality: u8,
    },
    /// Lossless WebP.
    WebPLossless,
}

impl OutputEncoding {
    /// JPEG at the given quality (clamped to `1..=100`).
    pub fn jpeg(quality: u8) -> Self {
        OutputEncoding::Jpeg {
            quality: quality.clamp(1, 100),
        }
    }

    /// Lossy WebP at the given quality (clamped to `1..=100`).
    pub fn webp(quality: u8) -> Self {
        OutputEncoding::WebP {
            quality: quality.clamp(1, 100),
        }
    }

    /// Resolve a MIME type such as `image/jpeg` into an encoding.
    ///
    /// `quality` is used by lossy formats and ignored otherwise.
    pub fn from_mime_type(mime_type: &str, quality: u8) -> Option<Self> {
        match mime_type.to_ascii_lowercase().as_str() {
            "image/png" => Some(OutputEncoding::Png),
            "image/jpeg" | "image/jpg" => Some(Self::jpeg(quality)),
            "image/webp" => Some(Self::webp(quality)),
            _ => None,
        }
    }

    /// The MIME type of files produced with this encoding.
    pub fn mime_type(self) -> &'static str {
        match self {
            OutputEncoding::Png => "image/png",
            OutputEncoding::Jpeg { .. } => "image/jpeg",
            OutputEncoding::WebP { .. } | OutputEncoding::WebPLossless => "image/webp",
        }
    }

    /// Filename extension (without the dot) matching [`mime_type`](Self::mime_type).
    pub fn extension(self) -> &'static str {
        match self {
            OutputEncoding::Png => "png",
            OutputEncoding::Jpeg { .. } => "jpg",
            OutputEncoding::WebP { .. } | OutputEncoding::WebPLossless => "webp",
        }
    }

    /// Whether the encoding discards information.
    pub fn is_lossless(self) -> bool {
        matches!(self, OutputEncoding::Png | OutputEncoding::WebPLossless)
    }

    /// Quality factor of a lossy encoding.
    pub fn quality(self) -> Option<u8> {
        match self {
            OutputEncoding::Jpeg { quality } | OutputEncoding::WebP { quality } => Some(quality),
            OutputEncoding::Png | OutputEncoding::WebPLossless => None,
        }
    }

    /// Encode RGBA pixels into this format.
    pub(crate) fn encode(self, pixels: &RgbaImage) -> Result<Vec<u8>, ExtractError> {
        let (width, height) = pixels.dimensions();
        if width == 0 || height == 0 {
            return Err(ExtractError::InvalidDimensions { width, height });
        }

        match self {
            OutputEncoding::Png => {
                let mut buffer = Cursor::new(Vec::new());
                PngEncoder::new(&mut buffer).write_image(
                    pixels.as_raw(),
                    width,
                    height,
                    ExtendedColorType::Rgba8,
                )?;
                Ok(buffer.into_inner())
            }
            OutputEncoding::Jpeg { quality } => {
                // JPEG has no alpha channel.
                let rgb: RgbImage = pixels.convert();
                let mut buffer = Cursor::new(Vec::new());
                JpegEncoder::new_with_quality(&mut buffer, quality).write_image(
                    rgb.as_raw(),
                    width,
                    height,
                    ExtendedColorType::Rgb8,
                )?;
                Ok(buffer.into_inner())
            }
            OutputEncoding::WebP { quality } => encode_webp(pixels, false, quality as f32),
            OutputEncoding::WebPLossless => encode_webp(pixels, true, 100.0),
        }
    }
}

impl Display for OutputEncoding {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            OutputEncoding::Png => write!(f, "PNG"),
            OutputEncoding::Jpeg { quality } => write!(f, "JPEG (quality {quality})"),
            OutputEncoding::WebP { quality } => write!(f, "WebP (quality {quality})"),
            OutputEncoding::WebPLossless => write!(f, "WebP (lossless)"),
        }
    }
}

fn encode_webp(pixels: &RgbaImage, lossless: bool, quality: f32) -> Result<Vec<u8>, ExtractError> {
    let (width, height) = pixels.dimensions();
    let encoder = webp::Encoder::from_rgba(pixels.as_raw(), width, height);
    let memory = encoder
        .encode_simple(lossless, quality)
        .map_err(|error| ExtractError::EncodeError(format!("WebP encoder failed: {error:?}")))?;
    Ok(memory.to_vec())
}
