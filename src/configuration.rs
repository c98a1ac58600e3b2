//! Extraction configuration.
//!
//! Two builders describe a run:
//!
//! - [`ExtractionRequest`] says *what* to produce: single frame or batch,
//!   the sampling strategy, target dimensions, and output encoding.
//! - [`ExtractOptions`] carries the operational side: progress callback,
//!   cancellation token, and reporting cadence.
//!
//! # Example
//!
//! ```no_run
//! use framextractor::{
//!     CancellationToken, ExtractOptions, ExtractionRequest, OutputEncoding, Resolution,
//!     Sampling,
//! };
//!
//! let request = ExtractionRequest::batch(Sampling::FixedRate(2.0))
//!     .with_resolution(Resolution::Width(1280))
//!     .with_encoding(OutputEncoding::jpeg(90))
//!     .with_timestamped_names(true);
//!
//! let token = CancellationToken::new();
//! let options = ExtractOptions::new().with_cancellation(token.clone());
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::{
    encoding::OutputEncoding,
    error::ExtractError,
    progress::{CancellationToken, NoOpProgress, ProgressCallback},
};

/// Smallest width a rescaled surface may have.
pub const MIN_TARGET_WIDTH: u32 = 10;

/// Largest width a rescaled surface may have (8K UHD).
pub const MAX_TARGET_WIDTH: u32 = 7680;

/// Largest pixel count a rescaled surface may have. Caps the derived height
/// of very tall sources at 256 MiB of RGBA.
pub const MAX_TARGET_PIXELS: u64 = 8192 * 8192;

/// Whether a run captures one frame or many.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractionMode {
    /// Capture the frame at offset zero.
    #[default]
    Single,
    /// Capture every offset produced by the request's [`Sampling`].
    Batch,
}

/// How batch offsets are spread across the source duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sampling {
    /// A fixed number of frames per second of source.
    FixedRate(f64),
    /// A fixed number of frames, evenly spaced from the start.
    FixedCount(u32),
}

impl Default for Sampling {
    fn default() -> Self {
        Sampling::FixedRate(1.0)
    }
}

/// Target dimensions of produced images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Resolution {
    /// Keep the source dimensions.
    #[default]
    Original,
    /// Rescale to this width, deriving the height from the aspect ratio.
    Width(u32),
}

impl Resolution {
    /// Resolve the surface dimensions for a source of the given size.
    ///
    /// A rescaled width is clamped to
    /// [`MIN_TARGET_WIDTH`]..=[`MAX_TARGET_WIDTH`] and the height is
    /// `round(source_height * width / source_width)`, never below 1.
    ///
    /// # Errors
    ///
    /// [`ExtractError::InvalidDimensions`] for a zero source dimension, or
    /// when the rescaled surface would exceed [`MAX_TARGET_PIXELS`].
    ///
    /// ```
    /// use framextractor::Resolution;
    ///
    /// assert_eq!(Resolution::Width(960).resolve(1920, 1080).unwrap(), (960, 540));
    /// ```
    pub fn resolve(self, source_width: u32, source_height: u32) -> Result<(u32, u32), ExtractError> {
        if source_width == 0 || source_height == 0 {
            return Err(ExtractError::InvalidDimensions {
                width: source_width,
                height: source_height,
            });
        }

        match self {
            Resolution::Original => Ok((source_width, source_height)),
            Resolution::Width(requested) => {
                let width = requested.clamp(MIN_TARGET_WIDTH, MAX_TARGET_WIDTH);
                let height = (source_height as f64 * width as f64 / source_width as f64)
                    .round()
                    .max(1.0);
                if width as f64 * height > MAX_TARGET_PIXELS as f64 {
                    return Err(ExtractError::InvalidDimensions {
                        width,
                        height: height as u32,
                    });
                }
                Ok((width, height as u32))
            }
        }
    }
}

/// Description of one run's desired outputs.
///
/// Built fresh for every run; nothing here is persisted.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct ExtractionRequest {
    /// Single frame or batch.
    pub mode: ExtractionMode,
    /// Offset spacing used in batch mode. Ignored in single mode.
    pub sampling: Sampling,
    /// Target dimensions.
    pub resolution: Resolution,
    /// Output format and quality.
    pub encoding: OutputEncoding,
    /// Append the capture offset to batch filenames (`frame_0003_2_50s.png`).
    pub timestamped_names: bool,
}

impl Default for ExtractionRequest {
    fn default() -> Self {
        Self::single()
    }
}

impl ExtractionRequest {
    /// Capture only the first frame, at original size, as PNG.
    pub fn single() -> Self {
        Self {
            mode: ExtractionMode::Single,
            sampling: Sampling::default(),
            resolution: Resolution::Original,
            encoding: OutputEncoding::Png,
            timestamped_names: false,
        }
    }

    /// Capture a batch using the given sampling strategy.
    pub fn batch(sampling: Sampling) -> Self {
        Self {
            mode: ExtractionMode::Batch,
            sampling,
            ..Self::single()
        }
    }

    /// Defaults of the image converter: WebP at quality 85, original size.
    pub fn image_conversion() -> Self {
        Self {
            encoding: OutputEncoding::webp(85),
            ..Self::single()
        }
    }

    /// Set the target dimensions.
    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    /// Set the output encoding.
    pub fn with_encoding(mut self, encoding: OutputEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Control whether batch filenames carry the capture offset.
    pub fn with_timestamped_names(mut self, enabled: bool) -> Self {
        self.timestamped_names = enabled;
        self
    }
}

/// Operational settings for a run.
///
/// All fields have defaults: no progress callback, no cancellation, and a
/// progress report after every item.
#[derive(Clone)]
pub struct ExtractOptions {
    pub(crate) progress: Arc<dyn ProgressCallback>,
    pub(crate) cancellation: Option<CancellationToken>,
    pub(crate) batch_size: u64,
}

impl Debug for ExtractOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ExtractOptions")
            .field("has_cancellation", &self.cancellation.is_some())
            .field("batch_size", &self.batch_size)
            .finish_non_exhaustive()
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractOptions {
    /// Options with no callback and no cancellation.
    pub fn new() -> Self {
        Self {
            progress: Arc::new(NoOpProgress),
            cancellation: None,
            batch_size: 1,
        }
    }

    /// Attach a progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Attach a cancellation token.
    ///
    /// When the token is cancelled, the batch loop stops before the next
    /// capture and returns what it has so far.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Report progress every `size` items. Clamped to a minimum of 1.
    #[must_use]
    pub fn with_batch_size(mut self, size: u64) -> Self {
        self.batch_size = size.max(1);
        self
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(|token| token.is_cancelled())
    }
}
