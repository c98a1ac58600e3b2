//! Error types for the `framextractor` crate.
//!
//! This module defines [`ExtractError`], the unified error type returned by
//! all fallible operations in the crate, and [`FailureKind`], the coarse
//! classification callers use to decide how to react (reject the input,
//! abort the run, or fall back to per-item delivery).

use std::{io::Error as IoError, path::PathBuf, time::Duration};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;
use zip::result::ZipError;

/// The unified error type for all `framextractor` operations.
///
/// Every public method that can fail returns `Result<T, ExtractError>`.
/// Variants carry enough context to explain the problem to a user without
/// additional logging at the call site.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExtractError {
    /// The input is not an accepted image or video type.
    #[error("Unsupported input {name}: {reason}")]
    UnsupportedInput {
        /// Display name of the rejected file.
        name: String,
        /// Why the file was rejected.
        reason: String,
    },

    /// The input exceeds the size limit for its kind.
    #[error("{name} is too large ({size} bytes, limit is {limit} bytes)")]
    FileTooLarge {
        /// Display name of the rejected file.
        name: String,
        /// Size of the file in bytes.
        size: u64,
        /// Maximum accepted size in bytes.
        limit: u64,
    },

    /// The media file could not be opened.
    #[error("Failed to open media file at {path}: {reason}")]
    FileOpen {
        /// Path that was passed to the opener.
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The file does not contain a video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// A frame or image could not be decoded.
    #[error("Failed to decode frame: {0}")]
    DecodeError(String),

    /// Positioning the video at an offset failed.
    #[error("Failed to seek to {offset:?}: {reason}")]
    SeekError {
        /// The offset that was requested.
        offset: Duration,
        /// Underlying reason the seek failed.
        reason: String,
    },

    /// The raster surface could not be encoded to the requested format.
    #[error("Failed to encode image: {0}")]
    EncodeError(String),

    /// The extraction request cannot produce a finite, non-empty result.
    #[error("Invalid extraction request: {0}")]
    InvalidRequest(String),

    /// A source or target surface would have a zero dimension, or a rescaled
    /// surface would be too large to allocate.
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
    },

    /// Packaging outputs into an archive failed.
    #[error("Failed to build archive: {0}")]
    ArchiveError(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate while decoding or encoding.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),
}

/// Coarse classification of an [`ExtractError`].
///
/// Each kind implies a different recovery:
///
/// | Kind | Effect |
/// |------|--------|
/// | `UnsupportedInput` | reported immediately, the run never starts |
/// | `InvalidRequest` | reported immediately, the run never starts |
/// | `Capture` | the current run is aborted, partial results are dropped |
/// | `Archive` | outputs are offered individually instead |
/// | `Io` | surfaced as-is |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Wrong type or oversized input.
    UnsupportedInput,
    /// The request itself is unusable (zero rate, zero duration, ...).
    InvalidRequest,
    /// Decode, seek, or encode failure during a run.
    Capture,
    /// Archive generation failed.
    Archive,
    /// Filesystem failure.
    Io,
}

impl ExtractError {
    /// Classify this error.
    pub fn kind(&self) -> FailureKind {
        match self {
            ExtractError::UnsupportedInput { .. }
            | ExtractError::FileTooLarge { .. }
            | ExtractError::FileOpen { .. }
            | ExtractError::NoVideoStream => FailureKind::UnsupportedInput,
            ExtractError::InvalidRequest(_) | ExtractError::InvalidDimensions { .. } => {
                FailureKind::InvalidRequest
            }
            ExtractError::DecodeError(_)
            | ExtractError::SeekError { .. }
            | ExtractError::EncodeError(_)
            | ExtractError::ImageError(_)
            | ExtractError::FfmpegError(_) => FailureKind::Capture,
            ExtractError::ArchiveError(_) => FailureKind::Archive,
            ExtractError::IoError(_) => FailureKind::Io,
        }
    }
}

impl From<FfmpegError> for ExtractError {
    fn from(error: FfmpegError) -> Self {
        ExtractError::FfmpegError(error.to_string())
    }
}

impl From<ZipError> for ExtractError {
    fn from(error: ZipError) -> Self {
        ExtractError::ArchiveError(error.to_string())
    }
}
