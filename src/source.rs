//! Source asset selection and input validation.
//!
//! A [`SourceAsset`] is the user-selected input file: its path, display
//! name, size, and detected MIME type. Construction validates the file
//! against the allow-list for its [`AssetKind`], so an asset that exists
//! has already been accepted.

use std::{
    fs::{self, File},
    io::Read,
    path::{Path, PathBuf},
};

use image::ImageFormat;

use crate::error::ExtractError;

/// Largest accepted still image (50 MiB).
pub const MAX_IMAGE_BYTES: u64 = 50 * 1024 * 1024;

/// Videos above this size are accepted but flagged by validation (2 GiB).
pub const LARGE_VIDEO_BYTES: u64 = 2 * 1024 * 1024 * 1024;

/// MIME types accepted by the image converter.
pub const SUPPORTED_IMAGE_TYPES: [&str; 6] = [
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/bmp",
    "image/tiff",
    "image/webp",
];

/// Video container extensions and their MIME types.
const VIDEO_EXTENSIONS: [(&str, &str); 8] = [
    ("mp4", "video/mp4"),
    ("m4v", "video/mp4"),
    ("webm", "video/webm"),
    ("ogg", "video/ogg"),
    ("ogv", "video/ogg"),
    ("mov", "video/quicktime"),
    ("mkv", "video/x-matroska"),
    ("avi", "video/avi"),
];

/// Number of leading bytes read to sniff an image format.
const SNIFF_BYTES: usize = 64;

/// Whether an asset is a still image or a video.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    /// A still raster image.
    Image,
    /// A video container.
    Video,
}

/// A validated, user-selected input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceAsset {
    path: PathBuf,
    display_name: String,
    mime_type: String,
    byte_size: u64,
    kind: AssetKind,
}

impl SourceAsset {
    /// Select a still image for conversion.
    ///
    /// The type is sniffed from the file's leading bytes, falling back to
    /// the extension, and must be one of [`SUPPORTED_IMAGE_TYPES`]. Files
    /// over [`MAX_IMAGE_BYTES`] are rejected.
    ///
    /// # Errors
    ///
    /// - [`ExtractError::UnsupportedInput`] for any other type.
    /// - [`ExtractError::FileTooLarge`] for oversized files.
    /// - [`ExtractError::IoError`] if the file cannot be read.
    pub fn image<P: AsRef<Path>>(path: P) -> Result<Self, ExtractError> {
        let path = path.as_ref();
        let display_name = display_name(path);
        let byte_size = fs::metadata(path)?.len();

        let mut header = Vec::with_capacity(SNIFF_BYTES);
        File::open(path)?
            .take(SNIFF_BYTES as u64)
            .read_to_end(&mut header)?;

        let format = image::guess_format(&header)
            .ok()
            .or_else(|| ImageFormat::from_path(path).ok());
        let mime_type = format.map(|format| format.to_mime_type()).unwrap_or("");

        if !SUPPORTED_IMAGE_TYPES.contains(&mime_type) {
            return Err(ExtractError::UnsupportedInput {
                name: display_name,
                reason: "not a supported image format; use JPG, PNG, BMP, TIFF, or WebP"
                    .to_string(),
            });
        }

        if byte_size > MAX_IMAGE_BYTES {
            return Err(ExtractError::FileTooLarge {
                name: display_name,
                size: byte_size,
                limit: MAX_IMAGE_BYTES,
            });
        }

        log::debug!("Selected image {display_name} ({mime_type}, {byte_size} bytes)");

        Ok(Self {
            path: path.to_path_buf(),
            display_name,
            mime_type: mime_type.to_string(),
            byte_size,
            kind: AssetKind::Image,
        })
    }

    /// Select a video for frame extraction.
    ///
    /// Accepted when the extension names a known video container. There is
    /// no size limit; see [`crate::validation`] for the large-file warning.
    ///
    /// # Errors
    ///
    /// - [`ExtractError::UnsupportedInput`] for unknown extensions.
    /// - [`ExtractError::IoError`] if the file does not exist.
    pub fn video<P: AsRef<Path>>(path: P) -> Result<Self, ExtractError> {
        let path = path.as_ref();
        let display_name = display_name(path);
        let byte_size = fs::metadata(path)?.len();

        let mime_type = video_mime_type(path).ok_or_else(|| ExtractError::UnsupportedInput {
            name: display_name.clone(),
            reason: "not a supported video file; use MP4, WebM, Ogg, MOV, MKV, or AVI".to_string(),
        })?;

        log::debug!("Selected video {display_name} ({mime_type}, {byte_size} bytes)");

        Ok(Self {
            path: path.to_path_buf(),
            display_name,
            mime_type: mime_type.to_string(),
            byte_size,
            kind: AssetKind::Video,
        })
    }

    /// Path of the file on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name shown to the user.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Detected MIME type.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Size of the file in bytes.
    pub fn byte_size(&self) -> u64 {
        self.byte_size
    }

    /// Image or video.
    pub fn kind(&self) -> AssetKind {
        self.kind
    }

    /// Read the whole file into memory.
    pub fn read_bytes(&self) -> Result<Vec<u8>, ExtractError> {
        Ok(fs::read(&self.path)?)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn video_mime_type(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    VIDEO_EXTENSIONS
        .iter()
        .find(|(known, _)| *known == extension)
        .map(|(_, mime_type)| *mime_type)
}
